//! Length parsing and pixel conversion
//!
//! [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
//!
//! Conversions are deliberately approximate: font-relative units use a
//! fixed 16px font, and a bare percentage resolves against whatever base
//! the caller supplies (16px in media queries, the containing block in
//! layout).

use mimic_common::warning::warn_once;

/// User agent default font size ("medium").
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// Reference screen resolution.
pub const DEFAULT_DPI: f64 = 96.0;

/// The unit of a [`Length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// A unitless number (only `0` is a valid length, but others are tolerated).
    Number,
    /// `px`
    Px,
    /// `em`
    Em,
    /// `rem`
    Rem,
    /// `ex`
    Ex,
    /// `%`
    Percent,
    /// `cm`
    Cm,
    /// `mm`
    Mm,
    /// `in`
    In,
    /// `pt`
    Pt,
    /// `pc`
    Pc,
    /// `vw`
    Vw,
    /// `vh`
    Vh,
}

/// A parsed length: number plus unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    /// The numeric part.
    pub value: f64,
    /// The unit.
    pub unit: LengthUnit,
}

/// Everything a unit conversion may need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Device resolution in dots per inch.
    pub dpi: f64,
    /// Pixel size that `100%` stands for.
    pub percent_base: f64,
    /// Viewport width for `vw`.
    pub viewport_width: f64,
    /// Viewport height for `vh`.
    pub viewport_height: f64,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            percent_base: 0.0,
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }
}

impl LengthContext {
    /// Context resolving percentages against `base`.
    #[must_use]
    pub fn with_percent_base(base: f64) -> Self {
        Self {
            percent_base: base,
            ..Self::default()
        }
    }
}

impl Length {
    /// Convert to CSS pixels.
    #[must_use]
    pub fn to_px(&self, cx: &LengthContext) -> f64 {
        let v = self.value;
        match self.unit {
            LengthUnit::Number | LengthUnit::Px => v,
            LengthUnit::Em | LengthUnit::Rem => v * DEFAULT_FONT_SIZE_PX,
            LengthUnit::Ex => v * DEFAULT_FONT_SIZE_PX / 2.0,
            LengthUnit::Percent => v * cx.percent_base / 100.0,
            LengthUnit::Cm => v * cx.dpi / 2.54,
            LengthUnit::Mm => v * cx.dpi / 25.4,
            LengthUnit::In => v * cx.dpi,
            LengthUnit::Pt => v * cx.dpi / 72.0,
            LengthUnit::Pc => v * cx.dpi / 6.0,
            LengthUnit::Vw => v * cx.viewport_width / 100.0,
            LengthUnit::Vh => v * cx.viewport_height / 100.0,
        }
    }
}

/// Parse a single length token such as `12px`, `-1.5em`, `50%` or `0`.
///
/// Returns `None` for keywords, empty input and unknown units.
#[must_use]
pub fn parse_length(text: &str) -> Option<Length> {
    let text = text.trim();
    let split = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    let (number, unit) = text.split_at(split);
    if number.is_empty() || number == "-" || number == "+" {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    let unit = match unit.to_ascii_lowercase().as_str() {
        "" => LengthUnit::Number,
        "px" => LengthUnit::Px,
        "em" => LengthUnit::Em,
        "rem" => LengthUnit::Rem,
        "ex" => LengthUnit::Ex,
        "%" => LengthUnit::Percent,
        "cm" => LengthUnit::Cm,
        "mm" => LengthUnit::Mm,
        "in" => LengthUnit::In,
        "pt" => LengthUnit::Pt,
        "pc" => LengthUnit::Pc,
        "vw" => LengthUnit::Vw,
        "vh" => LengthUnit::Vh,
        other => {
            warn_once("CSS", &format!("unsupported length unit '{other}' in '{text}'"));
            return None;
        }
    };
    Some(Length { value, unit })
}

/// Convert a length string to pixels with percentages taken against
/// `percent_base`. Border-width keywords are understood.
#[must_use]
pub fn pixel_value(text: &str, percent_base: f64) -> Option<f64> {
    match text.trim().to_ascii_lowercase().as_str() {
        "thin" => return Some(1.0),
        "medium" => return Some(3.0),
        "thick" => return Some(5.0),
        _ => {}
    }
    parse_length(text).map(|len| len.to_px(&LengthContext::with_percent_base(percent_base)))
}

/// Format a pixel count the way computed values are serialized.
#[must_use]
pub fn pixel_string(px: i32) -> String {
    format!("{px}px")
}

/// First component of a space-separated value that is a length.
#[must_use]
pub fn find_length(value: &str) -> Option<&str> {
    super::split_components(value)
        .into_iter()
        .find(|part| parse_length(part).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_units() {
        assert_eq!(
            parse_length("12px"),
            Some(Length {
                value: 12.0,
                unit: LengthUnit::Px
            })
        );
        assert_eq!(parse_length("-1.5em").map(|l| l.unit), Some(LengthUnit::Em));
        assert_eq!(parse_length("50%").map(|l| l.value), Some(50.0));
        assert_eq!(parse_length("0").map(|l| l.unit), Some(LengthUnit::Number));
        assert_eq!(parse_length("auto"), None);
        assert_eq!(parse_length("px"), None);
        assert_eq!(parse_length("3furlongs"), None);
    }

    #[test]
    fn test_fixed_conversion_constants() {
        let cx = LengthContext::with_percent_base(16.0);
        assert!((parse_length("2em").unwrap().to_px(&cx) - 32.0).abs() < 1e-9);
        assert!((parse_length("100%").unwrap().to_px(&cx) - 16.0).abs() < 1e-9);
        assert!((parse_length("1in").unwrap().to_px(&cx) - 96.0).abs() < 1e-9);
        assert!((parse_length("25.4mm").unwrap().to_px(&cx) - 96.0).abs() < 1e-9);
        assert!((parse_length("72pt").unwrap().to_px(&cx) - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_value_keywords() {
        assert_eq!(pixel_value("medium", 0.0), Some(3.0));
        assert_eq!(pixel_value("50%", 200.0), Some(100.0));
        assert_eq!(pixel_value("auto", 200.0), None);
        assert_eq!(pixel_string(-4), "-4px");
    }

    #[test]
    fn test_find_length() {
        assert_eq!(find_length("solid 2px red"), Some("2px"));
        assert_eq!(find_length("solid red"), None);
    }
}
