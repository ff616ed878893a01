//! Small numeric and text helpers

/// Greatest common divisor of the absolute values
pub fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

/// Least common multiple; 0 if either side is 0, `None` past `i64`
pub fn lcm(a: i64, b: i64) -> Option<i64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b).and_then(i64::checked_abs)
}

/// Trim and turn every run of whitespace into a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop all whitespace
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(-4, 6), 2);
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(3, 1), Some(3));
        assert_eq!(lcm(0, 5), Some(0));
        assert_eq!(lcm(4_294_967_291, 4_294_967_279), None);
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(collapse_whitespace("  Ky \t rie\n"), "Ky rie");
        assert_eq!(strip_whitespace("C add 9"), "Cadd9");
    }
}
