/// Xorshift32 generator. Same seed, same stream, on every platform.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    pub fn next_int(&mut self, max: u32) -> u32 {
        self.next() % max
    }

    /// Uniform draw from `0..=max`.
    pub fn next_inclusive(&mut self, max: u8) -> u8 {
        self.next_int(u32::from(max) + 1) as u8
    }
}

/// Derives an independent stream seed for lineage `index` of a session.
pub fn lineage_seed(session_seed: u32, index: usize) -> u32 {
    let mixed = session_seed ^ (index as u32).wrapping_add(1).wrapping_mul(0x9E37_79B9);
    SeededRng::new(mixed).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seed_is_remapped() {
        assert_eq!(SeededRng::new(0).state(), 0xDEAD_BEEF);
    }

    #[test]
    fn inclusive_draws_stay_in_range_and_hit_both_ends() {
        let mut rng = SeededRng::new(7);
        let mut seen = [false; 26];
        for _ in 0..10_000 {
            let value = rng.next_inclusive(25);
            assert!(value <= 25);
            seen[value as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn lineage_seeds_differ_per_index() {
        let a = lineage_seed(42, 0);
        let b = lineage_seed(42, 1);
        assert_ne!(a, b);
        assert_eq!(a, lineage_seed(42, 0));
    }
}
