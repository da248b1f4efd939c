use anyhow::{anyhow, Context, Result};

pub fn parse_seed(seed: &str) -> Result<u32> {
    let s = seed.trim();
    if s.is_empty() {
        return Err(anyhow!("empty seed"));
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).with_context(|| format!("invalid hex seed: {s}"))
    } else {
        s.parse::<u32>()
            .with_context(|| format!("invalid decimal seed: {s}"))
    }
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("0x{seed:08x}")
}

pub fn parse_seed_csv(input: &str) -> Result<Vec<u32>> {
    let seeds = input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_seed)
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        return Err(anyhow!("no seeds parsed from --seeds"));
    }
    Ok(seeds)
}

/// `count` seeds from a fixed LCG walk starting at `start`.
pub fn seed_sequence(start: u32, count: u32) -> Vec<u32> {
    let mut out = Vec::with_capacity(count as usize);
    let mut cur = start;
    for _ in 0..count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_parse_in_hex_and_decimal() {
        assert_eq!(parse_seed("0x10").expect("hex"), 16);
        assert_eq!(parse_seed(" 42 ").expect("decimal"), 42);
        assert!(parse_seed("").is_err());
        assert!(parse_seed("0xZZ").is_err());
        assert_eq!(seed_to_hex(0xF1A9_0001), "0xf1a90001");
    }

    #[test]
    fn csv_skips_blanks() {
        assert_eq!(parse_seed_csv("1, ,0x2,").expect("csv"), vec![1, 2]);
        assert!(parse_seed_csv(" , ").is_err());
    }

    #[test]
    fn sequence_is_deterministic() {
        let seeds = seed_sequence(7, 4);
        assert_eq!(seeds.len(), 4);
        assert_eq!(seeds[0], 7);
        assert_eq!(seeds, seed_sequence(7, 4));
        assert_ne!(seeds[1], seeds[2]);
    }
}
