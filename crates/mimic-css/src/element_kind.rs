//! Element kinds
//!
//! The handful of element distinctions the engine cares about: default
//! `display`, built-in default declarations, whether the element renders
//! at all, and intrinsic sizes of replaced and form elements. Intrinsic
//! sizes are a table; supporting a new kind is a table edit.

use mimic_dom::ElementData;

use crate::browser::{Feature, FeatureOracle};

/// Classification of an element by tag name (and `type` for inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<html>`
    Html,
    /// `<body>`
    Body,
    /// `<div>`
    Div,
    /// `<span>`
    Span,
    /// `<p>`
    Paragraph,
    /// `<h1>`..`<h6>`
    Heading(u8),
    /// `<a>`
    Anchor,
    /// `<img>`
    Image,
    /// `<canvas>`
    Canvas,
    /// `<iframe>`
    IFrame,
    /// `<button>`
    Button,
    /// `<input type=submit|reset|button>`
    InputButton,
    /// Single-line text-entry inputs (`text`, `password`, `email`, ...).
    TextInput,
    /// `<input type=checkbox>`
    Checkbox,
    /// `<input type=radio>`
    Radio,
    /// `<input type=file>`
    FileInput,
    /// `<input type=hidden>`
    HiddenInput,
    /// `<select>`
    Select,
    /// `<textarea>`
    TextArea,
    /// `<table>`
    Table,
    /// `<tr>`
    TableRow,
    /// `<td>` and `<th>`
    TableCell,
    /// `<li>`
    ListItem,
    /// `<ul>` and `<ol>`
    List,
    /// Elements that never render (`<head>`, `<script>`, ...).
    NonRendered,
    /// Other block-level elements.
    OtherBlock,
    /// Anything else.
    Other,
}

/// How an intrinsic dimension is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// A constant, with per-feature overrides (first match wins).
    Fixed {
        /// Size when no override applies.
        default: i32,
        /// Feature-dependent replacements.
        overrides: &'static [(Feature, i32)],
    },
    /// An attribute's integer value, else a constant.
    Attribute {
        /// Attribute name.
        name: &'static str,
        /// Size when the attribute is missing or unparsable.
        default: i32,
        /// Feature-dependent replacements of `default`.
        overrides: &'static [(Feature, i32)],
    },
    /// `base` plus the label length at 0.9 of the per-character width.
    Label {
        /// Padding around the label.
        base: i32,
    },
}

/// Intrinsic width and height of one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntrinsicSize {
    /// Width policy.
    pub width: SizePolicy,
    /// Height policy.
    pub height: SizePolicy,
}

const INPUT_HEIGHT: SizePolicy = SizePolicy::Fixed {
    default: 21,
    overrides: &[(Feature::InputHeight17, 17)],
};

const TOGGLE_SIZE: SizePolicy = SizePolicy::Fixed {
    default: 13,
    overrides: &[(Feature::LegacyCheckboxSize, 10)],
};

const fn fixed(size: i32) -> SizePolicy {
    SizePolicy::Fixed {
        default: size,
        overrides: &[],
    }
}

/// Intrinsic sizes of replaced and form elements.
const INTRINSIC_SIZES: &[(ElementKind, IntrinsicSize)] = &[
    (
        ElementKind::TextInput,
        IntrinsicSize {
            width: SizePolicy::Fixed {
                default: 141,
                overrides: &[
                    (Feature::InputTextWidth169, 169),
                    (Feature::InputTextWidth143, 143),
                ],
            },
            height: INPUT_HEIGHT,
        },
    ),
    (
        ElementKind::FileInput,
        IntrinsicSize {
            width: fixed(253),
            height: INPUT_HEIGHT,
        },
    ),
    (
        ElementKind::Checkbox,
        IntrinsicSize {
            width: TOGGLE_SIZE,
            height: TOGGLE_SIZE,
        },
    ),
    (
        ElementKind::Radio,
        IntrinsicSize {
            width: TOGGLE_SIZE,
            height: TOGGLE_SIZE,
        },
    ),
    (
        ElementKind::Button,
        IntrinsicSize {
            width: SizePolicy::Label { base: 10 },
            height: fixed(20),
        },
    ),
    (
        ElementKind::InputButton,
        IntrinsicSize {
            width: SizePolicy::Label { base: 10 },
            height: fixed(20),
        },
    ),
    (
        ElementKind::Select,
        IntrinsicSize {
            width: fixed(100),
            height: fixed(20),
        },
    ),
    (
        ElementKind::TextArea,
        IntrinsicSize {
            width: fixed(100),
            height: fixed(49),
        },
    ),
    (
        ElementKind::IFrame,
        IntrinsicSize {
            width: fixed(300),
            height: fixed(154),
        },
    ),
    (
        ElementKind::Canvas,
        IntrinsicSize {
            width: SizePolicy::Attribute {
                name: "width",
                default: 300,
                overrides: &[],
            },
            height: SizePolicy::Attribute {
                name: "height",
                default: 150,
                overrides: &[],
            },
        },
    ),
    (
        ElementKind::Image,
        IntrinsicSize {
            width: SizePolicy::Attribute {
                name: "width",
                default: 24,
                overrides: &[(Feature::MissingImageZeroSize, 0)],
            },
            height: SizePolicy::Attribute {
                name: "height",
                default: 24,
                overrides: &[(Feature::MissingImageZeroSize, 0)],
            },
        },
    ),
];

const NON_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "title", "noscript", "meta", "link", "base",
];

const OTHER_BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "dl", "dt", "fieldset", "figure",
    "footer", "form", "header", "hr", "main", "nav", "pre", "section",
];

impl ElementKind {
    /// Classify an element.
    #[must_use]
    pub fn of(element: &ElementData) -> Self {
        let name = element.local_name().to_ascii_lowercase();
        match name.as_str() {
            "html" => Self::Html,
            "body" => Self::Body,
            "div" => Self::Div,
            "span" => Self::Span,
            "p" => Self::Paragraph,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "a" => Self::Anchor,
            "img" => Self::Image,
            "canvas" => Self::Canvas,
            "iframe" => Self::IFrame,
            "button" => Self::Button,
            "select" => Self::Select,
            "textarea" => Self::TextArea,
            "table" => Self::Table,
            "tr" => Self::TableRow,
            "td" | "th" => Self::TableCell,
            "li" => Self::ListItem,
            "ul" | "ol" => Self::List,
            "input" => {
                let kind = element
                    .attribute("type")
                    .unwrap_or("text")
                    .trim()
                    .to_ascii_lowercase();
                match kind.as_str() {
                    "checkbox" => Self::Checkbox,
                    "radio" => Self::Radio,
                    "file" => Self::FileInput,
                    "hidden" => Self::HiddenInput,
                    "submit" | "reset" | "button" | "image" => Self::InputButton,
                    _ => Self::TextInput,
                }
            }
            other if NON_RENDERED.contains(&other) => Self::NonRendered,
            other if OTHER_BLOCKS.contains(&other) => Self::OtherBlock,
            _ => Self::Other,
        }
    }

    /// The `display` value the element has before any stylesheet applies.
    #[must_use]
    pub const fn default_display(self) -> &'static str {
        match self {
            Self::Html
            | Self::Body
            | Self::Div
            | Self::Paragraph
            | Self::Heading(_)
            | Self::List
            | Self::OtherBlock => "block",
            Self::ListItem => "list-item",
            Self::Table => "table",
            Self::TableRow => "table-row",
            Self::TableCell => "table-cell",
            Self::Button
            | Self::InputButton
            | Self::TextInput
            | Self::Checkbox
            | Self::Radio
            | Self::FileInput
            | Self::Select
            | Self::TextArea => "inline-block",
            Self::HiddenInput | Self::NonRendered => "none",
            Self::Span | Self::Anchor | Self::Image | Self::Canvas | Self::IFrame | Self::Other => {
                "inline"
            }
        }
    }

    /// Whether the element can produce a box at all.
    #[must_use]
    pub const fn may_be_displayed(self) -> bool {
        !matches!(self, Self::HiddenInput | Self::NonRendered)
    }

    /// Built-in declarations seeded before any stylesheet, besides `display`.
    #[must_use]
    pub const fn default_declarations(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Body => &[
                ("margin-top", "8px"),
                ("margin-right", "8px"),
                ("margin-bottom", "8px"),
                ("margin-left", "8px"),
            ],
            Self::Heading(1) => &[("font-size", "32px"), ("font-weight", "bold")],
            Self::Heading(2) => &[("font-size", "24px"), ("font-weight", "bold")],
            Self::Heading(3) => &[("font-size", "18.72px"), ("font-weight", "bold")],
            Self::Heading(4) => &[("font-size", "16px"), ("font-weight", "bold")],
            Self::Heading(5) => &[("font-size", "13.28px"), ("font-weight", "bold")],
            Self::Heading(_) => &[("font-size", "10.72px"), ("font-weight", "bold")],
            Self::Paragraph => &[("margin-top", "16px"), ("margin-bottom", "16px")],
            Self::List => &[
                ("margin-top", "16px"),
                ("margin-bottom", "16px"),
                ("padding-left", "40px"),
            ],
            _ => &[],
        }
    }

    /// Intrinsic size, for replaced and form elements.
    #[must_use]
    pub fn intrinsic_size(self) -> Option<&'static IntrinsicSize> {
        INTRINSIC_SIZES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, size)| size)
    }

    /// Whether the element is a replaced or form element with an intrinsic size.
    #[must_use]
    pub fn is_replaced(self) -> bool {
        self.intrinsic_size().is_some()
    }
}

fn first_override(overrides: &[(Feature, i32)], oracle: &dyn FeatureOracle) -> Option<i32> {
    overrides
        .iter()
        .find(|(feature, _)| oracle.has_feature(*feature))
        .map(|&(_, size)| size)
}

impl SizePolicy {
    /// Resolve to pixels. `label_chars` is the label length for
    /// [`SizePolicy::Label`] and `pixels_per_char` the character width.
    #[must_use]
    pub fn resolve(
        self,
        element: &ElementData,
        oracle: &dyn FeatureOracle,
        label_chars: usize,
        pixels_per_char: i32,
    ) -> i32 {
        match self {
            Self::Fixed { default, overrides } => first_override(overrides, oracle).unwrap_or(default),
            Self::Attribute {
                name,
                default,
                overrides,
            } => element
                .attribute(name)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<i32>().ok())
                .filter(|v| *v >= 0)
                .unwrap_or_else(|| first_override(overrides, oracle).unwrap_or(default)),
            Self::Label { base } => {
                base + (label_chars as f64 * f64::from(pixels_per_char) * 0.9).round() as i32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserVersion;

    #[test]
    fn test_classification() {
        assert_eq!(ElementKind::of(&ElementData::new("H3")), ElementKind::Heading(3));
        assert_eq!(
            ElementKind::of(&ElementData::new("input").with_attr("type", "Checkbox")),
            ElementKind::Checkbox
        );
        assert_eq!(ElementKind::of(&ElementData::new("input")), ElementKind::TextInput);
        assert_eq!(ElementKind::of(&ElementData::new("script")), ElementKind::NonRendered);
        assert_eq!(ElementKind::of(&ElementData::new("custom-tag")), ElementKind::Other);
    }

    #[test]
    fn test_checkbox_size_per_personality() {
        let checkbox = ElementData::new("input").with_attr("type", "checkbox");
        let size = ElementKind::Checkbox.intrinsic_size().unwrap();
        assert_eq!(size.width.resolve(&checkbox, &BrowserVersion::chrome(), 0, 10), 13);
        assert_eq!(
            size.width.resolve(&checkbox, &BrowserVersion::internet_explorer(), 0, 10),
            10
        );
    }

    #[test]
    fn test_text_input_widths() {
        let input = ElementData::new("input");
        let width = ElementKind::TextInput.intrinsic_size().unwrap().width;
        assert_eq!(width.resolve(&input, &BrowserVersion::chrome(), 0, 10), 169);
        assert_eq!(width.resolve(&input, &BrowserVersion::internet_explorer(), 0, 10), 143);
        assert_eq!(width.resolve(&input, &BrowserVersion::firefox(), 0, 10), 141);
    }

    #[test]
    fn test_image_attributes() {
        let size = ElementKind::Image.intrinsic_size().unwrap();
        let sized = ElementData::new("img").with_attr("width", "40");
        let bare = ElementData::new("img");
        assert_eq!(size.width.resolve(&sized, &BrowserVersion::chrome(), 0, 10), 40);
        assert_eq!(size.height.resolve(&bare, &BrowserVersion::chrome(), 0, 10), 24);
        assert_eq!(
            size.height.resolve(&bare, &BrowserVersion::internet_explorer(), 0, 10),
            0
        );
    }

    #[test]
    fn test_button_label_width() {
        let button = ElementData::new("button");
        let width = ElementKind::Button.intrinsic_size().unwrap().width;
        assert_eq!(width.resolve(&button, &BrowserVersion::chrome(), 2, 10), 28);
    }
}
