//! CSS value utilities
//!
//! Pure helpers shared by the declaration variants and the layout
//! approximation:
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/) lengths
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/) colors
//! - [CSS Backgrounds and Borders Level 3](https://www.w3.org/TR/css-backgrounds-3/) shorthands
//!
//! Value finders never fail: an unparsable value yields `None` and the
//! caller substitutes its own default.

pub mod color;
pub mod length;
pub mod shorthand;

pub use color::{Rgba, find_color, parse_color, to_rgb_color};
pub use length::{
    DEFAULT_FONT_SIZE_PX, Length, LengthContext, LengthUnit, find_length, parse_length,
    pixel_string, pixel_value,
};
pub use shorthand::{
    BackgroundParts, BorderParts, decompose_background, decompose_border, find_border_style,
    find_border_width,
};

/// One side of a box, used to pick a component out of a box shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxSide {
    /// The top side.
    Top,
    /// The right side.
    Right,
    /// The bottom side.
    Bottom,
    /// The left side.
    Left,
}

impl BoxSide {
    /// All sides in shorthand order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Lowercase side name as used in property names (`margin-top`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Split a declaration value into its whitespace-separated components,
/// keeping parenthesized groups (`rgb(1, 2, 3)`) and quoted strings whole.
#[must_use]
pub fn split_components(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    for (i, c) in value.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                continue;
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    if start.is_none() {
                        start = Some(i);
                    }
                    continue;
                }
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            },
        }

        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                parts.push(&value[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        parts.push(&value[s..]);
    }
    parts
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// "If there is only one component value, it applies to all sides. If
/// there are two values, the top and bottom margins are set to the first
/// value and the right and left margins are set to the second. If there
/// are three values, the top is set to the first value, the left and right
/// are set to the second, and the bottom is set to the third. If there are
/// four values, they apply to the top, right, bottom, and left."
///
/// Returns `None` for an empty list or more than four components.
#[must_use]
pub fn box_side_value<'a>(components: &[&'a str], side: BoxSide) -> Option<&'a str> {
    let index = match (components.len(), side) {
        (1, _) => 0,
        (2, BoxSide::Top | BoxSide::Bottom) | (3 | 4, BoxSide::Top) => 0,
        (2 | 3, BoxSide::Right | BoxSide::Left) | (4, BoxSide::Right) => 1,
        (3 | 4, BoxSide::Bottom) => 2,
        (4, BoxSide::Left) => 3,
        _ => return None,
    };
    components.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_components_keeps_functions_whole() {
        assert_eq!(
            split_components("1px solid rgb(1, 2, 3)"),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
        assert_eq!(
            split_components("  url('a b.png')   no-repeat "),
            vec!["url('a b.png')", "no-repeat"]
        );
        assert!(split_components("   ").is_empty());
    }

    #[test]
    fn test_box_expansion() {
        let one = ["5px"];
        for side in BoxSide::ALL {
            assert_eq!(box_side_value(&one, side), Some("5px"));
        }

        let two = ["10px", "20px"];
        assert_eq!(box_side_value(&two, BoxSide::Top), Some("10px"));
        assert_eq!(box_side_value(&two, BoxSide::Bottom), Some("10px"));
        assert_eq!(box_side_value(&two, BoxSide::Left), Some("20px"));
        assert_eq!(box_side_value(&two, BoxSide::Right), Some("20px"));

        let three = ["1px", "2px", "3px"];
        assert_eq!(box_side_value(&three, BoxSide::Top), Some("1px"));
        assert_eq!(box_side_value(&three, BoxSide::Right), Some("2px"));
        assert_eq!(box_side_value(&three, BoxSide::Bottom), Some("3px"));
        assert_eq!(box_side_value(&three, BoxSide::Left), Some("2px"));

        let four = ["1px", "2px", "3px", "4px"];
        assert_eq!(box_side_value(&four, BoxSide::Left), Some("4px"));
        assert_eq!(box_side_value(&[], BoxSide::Left), None);
    }
}
