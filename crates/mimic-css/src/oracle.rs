//! Collaborators the engine consults but does not own: the viewport and
//! font metrics. Each comes with a default implementation.

use serde::{Deserialize, Serialize};

use crate::values::{DEFAULT_FONT_SIZE_PX, LengthContext, parse_length};

/// Window and screen geometry.
pub trait Viewport {
    /// Width of the window's content area in CSS pixels.
    fn inner_width(&self) -> i32;
    /// Height of the window's content area in CSS pixels.
    fn inner_height(&self) -> i32;
    /// Width of the whole screen.
    fn screen_width(&self) -> i32;
    /// Height of the whole screen.
    fn screen_height(&self) -> i32;
    /// Screen resolution in dots per inch.
    fn dpi(&self) -> f64;
    /// Whether the document is being printed.
    fn is_print(&self) -> bool;
}

/// A fixed-size desktop window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Screen {
    /// Content area width.
    pub inner_width: i32,
    /// Content area height.
    pub inner_height: i32,
    /// Screen width.
    pub screen_width: i32,
    /// Screen height.
    pub screen_height: i32,
    /// Dots per inch.
    pub dpi: f64,
    /// Print mode.
    pub print: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            inner_width: 1256,
            inner_height: 605,
            screen_width: 1920,
            screen_height: 1080,
            dpi: 96.0,
            print: false,
        }
    }
}

impl Viewport for Screen {
    fn inner_width(&self) -> i32 {
        self.inner_width
    }
    fn inner_height(&self) -> i32 {
        self.inner_height
    }
    fn screen_width(&self) -> i32 {
        self.screen_width
    }
    fn screen_height(&self) -> i32 {
        self.screen_height
    }
    fn dpi(&self) -> f64 {
        self.dpi
    }
    fn is_print(&self) -> bool {
        self.print
    }
}

/// Text measurement.
pub trait FontMetrics {
    /// Line height in pixels for a computed `font-size` value.
    fn font_height(&self, font_size: &str) -> i32;

    /// Number of lines `text` occupies when wrapped to `width` pixels.
    fn count_wrapped_lines(&self, text: &str, width: i32, font_size: &str) -> i32;
}

/// Treats every glyph as half the font size wide and every line as
/// 1.125 times the font size high.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolute-size keywords map to the usual user agent table; lengths are
/// taken relative to the 16px default.
#[must_use]
pub fn font_size_px(value: &str) -> f64 {
    match value.trim().to_ascii_lowercase().as_str() {
        "xx-small" => 9.0,
        "x-small" => 10.0,
        "small" | "smaller" => 13.0,
        "" | "medium" => DEFAULT_FONT_SIZE_PX,
        "large" | "larger" => 18.0,
        "x-large" => 24.0,
        "xx-large" => 32.0,
        "xxx-large" => 48.0,
        other => parse_length(other).map_or(DEFAULT_FONT_SIZE_PX, |len| {
            len.to_px(&LengthContext::with_percent_base(DEFAULT_FONT_SIZE_PX))
        }),
    }
}

impl FontMetrics for ApproximateFontMetrics {
    fn font_height(&self, font_size: &str) -> i32 {
        (font_size_px(font_size) * 1.125).round().max(0.0) as i32
    }

    fn count_wrapped_lines(&self, text: &str, width: i32, font_size: &str) -> i32 {
        let glyph = font_size_px(font_size) / 2.0;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let line_width = line.chars().count() as f64 * glyph;
                if width <= 0 || line_width <= f64::from(width) {
                    1
                } else {
                    (line_width / f64::from(width)).ceil() as i32
                }
            })
            .sum()
    }
}
