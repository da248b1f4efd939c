//! Per-pixel collision masks.
//!
//! A [`Bitmask`] marks the opaque pixels of a sprite. Shapes are placed in
//! playfield coordinates through [`CollisionShape`], so the simulation never
//! sees the renderer's image format.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Bitmask {
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = (width as usize).div_ceil(64);
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut opaque: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> (usize, u64) {
        let word = y as usize * self.words_per_row + (x / 64) as usize;
        (word, 1u64 << (x % 64))
    }

    pub fn set(&mut self, x: u32, y: u32, opaque: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (word, bit) = self.index(x, y);
        if opaque {
            self.bits[word] |= bit;
        } else {
            self.bits[word] &= !bit;
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (word, bit) = self.index(x, y);
        self.bits[word] & bit != 0
    }

    /// Marks a rectangle opaque, clipped to the mask.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width).min(self.width as i32);
        let y1 = (y + height).min(self.height as i32);
        for row in y0..y1 {
            for col in x0..x1 {
                self.set(col as u32, row as u32, true);
            }
        }
    }

    pub fn count(&self) -> u32 {
        self.bits.iter().map(|word| word.count_ones()).sum()
    }

    /// Whether any opaque pixel of `other`, placed at `(offset_x, offset_y)`
    /// relative to this mask's origin, coincides with one of ours.
    pub fn overlaps_at(&self, other: &Bitmask, offset_x: i32, offset_y: i32) -> bool {
        let x0 = offset_x.max(0);
        let y0 = offset_y.max(0);
        let x1 = (offset_x + other.width as i32).min(self.width as i32);
        let y1 = (offset_y + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32)
                    && other.get((x - offset_x) as u32, (y - offset_y) as u32)
                {
                    return true;
                }
            }
        }
        false
    }
}

/// A positioned opaque shape.
pub trait CollisionShape {
    /// Top-left corner in playfield pixels.
    fn origin(&self) -> (i32, i32);
    fn mask(&self) -> &Bitmask;
}

/// Per-pixel overlap test between two positioned shapes.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: CollisionShape + ?Sized,
    B: CollisionShape + ?Sized,
{
    let (ax, ay) = a.origin();
    let (bx, by) = b.origin();
    a.mask().overlaps_at(b.mask(), bx - ax, by - ay)
}

/// Axis-aligned bounding boxes intersect. Only useful as a fast reject.
pub fn bounds_intersect<A, B>(a: &A, b: &B) -> bool
where
    A: CollisionShape + ?Sized,
    B: CollisionShape + ?Sized,
{
    let (ax, ay) = a.origin();
    let (bx, by) = b.origin();
    let (am, bm) = (a.mask(), b.mask());
    ax < bx + bm.width() as i32
        && bx < ax + am.width() as i32
        && ay < by + bm.height() as i32
        && by < ay + am.height() as i32
}
