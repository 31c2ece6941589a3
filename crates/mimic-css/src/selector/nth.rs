//! [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)

/// A parsed `An+B` formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step (A).
    pub a: i32,
    /// Offset (B).
    pub b: i32,
}

impl Nth {
    /// Create a formula.
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Read `odd`, `even`, `B`, `An`, `An+B` or `An-B` with optional signs
    /// and whitespace. A missing coefficient is 1 and a missing constant 0.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "" => return None,
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            _ => {}
        }

        let Some((coefficient, constant)) = compact.split_once('n') else {
            return parse_signed(&compact).map(|b| Self::new(0, b));
        };
        let a = match coefficient {
            "" | "+" => 1,
            "-" => -1,
            other => parse_signed(other)?,
        };
        let b = if constant.is_empty() {
            0
        } else if constant.starts_with(['+', '-']) {
            parse_signed(constant)?
        } else {
            return None;
        };
        Some(Self::new(a, b))
    }

    /// Whether the 1-based `index` is selected.
    ///
    /// With `a == 0` only `index == b` matches; otherwise `(index - b) / a`
    /// must be a non-negative integer. Computed in `i64` so extreme
    /// coefficients cannot overflow.
    #[must_use]
    pub const fn matches(self, index: i32) -> bool {
        let a = self.a as i64;
        let diff = index as i64 - self.b as i64;
        if a == 0 {
            diff == 0
        } else {
            diff % a == 0 && diff / a >= 0
        }
    }
}

fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Nth::parse("odd"), Some(Nth::new(2, 1)));
        assert_eq!(Nth::parse("EVEN"), Some(Nth::new(2, 0)));
        assert_eq!(Nth::parse("3"), Some(Nth::new(0, 3)));
        assert_eq!(Nth::parse("n"), Some(Nth::new(1, 0)));
        assert_eq!(Nth::parse("-n+3"), Some(Nth::new(-1, 3)));
        assert_eq!(Nth::parse("+2n - 1"), Some(Nth::new(2, -1)));
        assert_eq!(Nth::parse("0n+3"), Some(Nth::new(0, 3)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "n2", "2n1", "abc", "2n+", "--n", "2x+1"] {
            assert_eq!(Nth::parse(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn test_matches() {
        let odd = Nth::new(2, 1);
        assert!(odd.matches(1) && odd.matches(3) && !odd.matches(2));
        let first_three = Nth::new(-1, 3);
        assert!(first_three.matches(1) && first_three.matches(3) && !first_three.matches(4));
        let third = Nth::new(0, 3);
        assert!(third.matches(3) && !third.matches(6));
    }

    #[test]
    fn test_matches_extreme_values() {
        let far = Nth::new(1, i32::MIN);
        assert!(far.matches(1) && far.matches(i32::MAX));
        let reversed = Nth::new(-1, i32::MIN);
        assert!(!reversed.matches(1));
        let min_step = Nth::new(i32::MIN, i32::MAX);
        assert!(min_step.matches(i32::MAX) && !min_step.matches(1));
        assert_eq!(Nth::parse("n-2147483648"), Some(Nth::new(1, i32::MIN)));
    }
}
