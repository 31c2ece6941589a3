//! Property definitions
//!
//! Every property the engine knows, its initial value under each
//! personality, whether it inherits, and which shorthands can supply it.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::browser::{Feature, FeatureOracle};
use crate::values::{BoxSide, box_side_value, decompose_background, decompose_border, split_components};

/// A known CSS property.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Definition {
    Background,
    BackgroundAttachment,
    BackgroundColor,
    BackgroundImage,
    BackgroundPosition,
    BackgroundRepeat,
    Border,
    BorderBottom,
    BorderBottomColor,
    BorderBottomStyle,
    BorderBottomWidth,
    BorderCollapse,
    BorderColor,
    BorderLeft,
    BorderLeftColor,
    BorderLeftStyle,
    BorderLeftWidth,
    BorderRight,
    BorderRightColor,
    BorderRightStyle,
    BorderRightWidth,
    BorderSpacing,
    BorderStyle,
    BorderTop,
    BorderTopColor,
    BorderTopStyle,
    BorderTopWidth,
    BorderWidth,
    Bottom,
    BoxSizing,
    CaptionSide,
    Clear,
    Color,
    Content,
    Cursor,
    Direction,
    Display,
    EmptyCells,
    Float,
    FontFamily,
    FontSize,
    FontStyle,
    FontVariant,
    FontWeight,
    Height,
    Left,
    LetterSpacing,
    LineHeight,
    ListStyle,
    ListStyleImage,
    ListStylePosition,
    ListStyleType,
    Margin,
    MarginBottom,
    MarginLeft,
    MarginRight,
    MarginTop,
    MaxHeight,
    MaxWidth,
    MinHeight,
    MinWidth,
    Opacity,
    Orphans,
    Overflow,
    OverflowX,
    OverflowY,
    Padding,
    PaddingBottom,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    Position,
    Quotes,
    Right,
    TextAlign,
    TextDecoration,
    TextIndent,
    TextTransform,
    Top,
    VerticalAlign,
    Visibility,
    WhiteSpace,
    Widows,
    Width,
    WordSpacing,
    ZIndex,
}

/// Which part of a (shorthand) value supplies a longhand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// The whole value.
    Whole,
    /// One side of a 1-to-4 value box shorthand.
    Side(BoxSide),
    /// Width part of a border shorthand.
    BorderWidth,
    /// Style part of a border shorthand.
    BorderStyle,
    /// Color part of a border shorthand.
    BorderColor,
    /// Color part of `background`.
    BackgroundColor,
    /// Image part of `background`.
    BackgroundImage,
    /// Repeat part of `background`.
    BackgroundRepeat,
    /// Attachment part of `background`.
    BackgroundAttachment,
    /// Position part of `background`.
    BackgroundPosition,
}

impl Component {
    /// Pull this component out of `value`; `None` if it is absent.
    #[must_use]
    pub fn extract(self, value: &str) -> Option<String> {
        let owned = |s: Option<&str>| s.map(str::to_string);
        match self {
            Self::Whole => Some(value.to_string()),
            Self::Side(side) => owned(box_side_value(&split_components(value), side)),
            Self::BorderWidth => owned(decompose_border(value).width),
            Self::BorderStyle => owned(decompose_border(value).style),
            Self::BorderColor => owned(decompose_border(value).color),
            Self::BackgroundColor => decompose_background(value).color,
            Self::BackgroundImage => decompose_background(value).image,
            Self::BackgroundRepeat => decompose_background(value).repeat,
            Self::BackgroundAttachment => decompose_background(value).attachment,
            Self::BackgroundPosition => decompose_background(value).position,
        }
    }
}

/// [§ 7.3.1 Inherited properties](https://www.w3.org/TR/css-cascade-4/#inheriting)
const INHERITED: &[Definition] = &[
    Definition::BorderCollapse,
    Definition::BorderSpacing,
    Definition::CaptionSide,
    Definition::Color,
    Definition::Cursor,
    Definition::Direction,
    Definition::EmptyCells,
    Definition::FontFamily,
    Definition::FontSize,
    Definition::FontStyle,
    Definition::FontVariant,
    Definition::FontWeight,
    Definition::LetterSpacing,
    Definition::LineHeight,
    Definition::ListStyle,
    Definition::ListStyleImage,
    Definition::ListStylePosition,
    Definition::ListStyleType,
    Definition::Orphans,
    Definition::Quotes,
    Definition::TextAlign,
    Definition::TextIndent,
    Definition::TextTransform,
    Definition::Visibility,
    Definition::WhiteSpace,
    Definition::Widows,
    Definition::WordSpacing,
];

impl Definition {
    /// The property name (`margin-top`).
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look up a property by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().to_ascii_lowercase().parse().ok()
    }

    /// Whether the property inherits by default.
    #[must_use]
    pub fn is_inherited(self) -> bool {
        INHERITED.contains(&self)
    }

    /// Whether this is a shorthand that only ever expands to longhands.
    #[must_use]
    pub const fn is_shorthand(self) -> bool {
        matches!(
            self,
            Self::Background
                | Self::Border
                | Self::BorderBottom
                | Self::BorderColor
                | Self::BorderLeft
                | Self::BorderRight
                | Self::BorderStyle
                | Self::BorderTop
                | Self::BorderWidth
                | Self::ListStyle
                | Self::Margin
                | Self::Overflow
                | Self::Padding
        )
    }

    /// The side a box longhand applies to (`margin-left` → left).
    #[must_use]
    pub const fn box_side(self) -> Option<BoxSide> {
        use Definition as D;
        match self {
            D::MarginTop | D::PaddingTop | D::BorderTopWidth | D::BorderTopStyle | D::BorderTopColor => {
                Some(BoxSide::Top)
            }
            D::MarginRight
            | D::PaddingRight
            | D::BorderRightWidth
            | D::BorderRightStyle
            | D::BorderRightColor => Some(BoxSide::Right),
            D::MarginBottom
            | D::PaddingBottom
            | D::BorderBottomWidth
            | D::BorderBottomStyle
            | D::BorderBottomColor => Some(BoxSide::Bottom),
            D::MarginLeft
            | D::PaddingLeft
            | D::BorderLeftWidth
            | D::BorderLeftStyle
            | D::BorderLeftColor => Some(BoxSide::Left),
            _ => None,
        }
    }

    /// `margin-<side>`
    #[must_use]
    pub const fn margin(side: BoxSide) -> Self {
        match side {
            BoxSide::Top => Self::MarginTop,
            BoxSide::Right => Self::MarginRight,
            BoxSide::Bottom => Self::MarginBottom,
            BoxSide::Left => Self::MarginLeft,
        }
    }

    /// `padding-<side>`
    #[must_use]
    pub const fn padding(side: BoxSide) -> Self {
        match side {
            BoxSide::Top => Self::PaddingTop,
            BoxSide::Right => Self::PaddingRight,
            BoxSide::Bottom => Self::PaddingBottom,
            BoxSide::Left => Self::PaddingLeft,
        }
    }

    /// `border-<side>`
    #[must_use]
    pub const fn border_side(side: BoxSide) -> Self {
        match side {
            BoxSide::Top => Self::BorderTop,
            BoxSide::Right => Self::BorderRight,
            BoxSide::Bottom => Self::BorderBottom,
            BoxSide::Left => Self::BorderLeft,
        }
    }

    /// `border-<side>-width`
    #[must_use]
    pub const fn border_width(side: BoxSide) -> Self {
        match side {
            BoxSide::Top => Self::BorderTopWidth,
            BoxSide::Right => Self::BorderRightWidth,
            BoxSide::Bottom => Self::BorderBottomWidth,
            BoxSide::Left => Self::BorderLeftWidth,
        }
    }

    /// `border-<side>-style`
    #[must_use]
    pub const fn border_style(side: BoxSide) -> Self {
        match side {
            BoxSide::Top => Self::BorderTopStyle,
            BoxSide::Right => Self::BorderRightStyle,
            BoxSide::Bottom => Self::BorderBottomStyle,
            BoxSide::Left => Self::BorderLeftStyle,
        }
    }

    /// `border-<side>-color`
    #[must_use]
    pub const fn border_color(side: BoxSide) -> Self {
        match side {
            BoxSide::Top => Self::BorderTopColor,
            BoxSide::Right => Self::BorderRightColor,
            BoxSide::Bottom => Self::BorderBottomColor,
            BoxSide::Left => Self::BorderLeftColor,
        }
    }

    /// The single box shorthand this longhand can be read from with
    /// 1-to-4 value expansion (`margin-top` → `margin`).
    #[must_use]
    pub const fn box_shorthand(self) -> Option<Self> {
        use Definition as D;
        match self {
            D::MarginTop | D::MarginRight | D::MarginBottom | D::MarginLeft => Some(D::Margin),
            D::PaddingTop | D::PaddingRight | D::PaddingBottom | D::PaddingLeft => Some(D::Padding),
            D::BorderTopWidth | D::BorderRightWidth | D::BorderBottomWidth | D::BorderLeftWidth => {
                Some(D::BorderWidth)
            }
            D::BorderTopStyle | D::BorderRightStyle | D::BorderBottomStyle | D::BorderLeftStyle => {
                Some(D::BorderStyle)
            }
            D::BorderTopColor | D::BorderRightColor | D::BorderBottomColor | D::BorderLeftColor => {
                Some(D::BorderColor)
            }
            _ => None,
        }
    }

    /// Every declared property that can supply this one, with the part of
    /// its value to use. The property itself always comes first.
    #[must_use]
    pub fn sources(self) -> Vec<(Self, Component)> {
        let mut sources = vec![(self, Component::Whole)];
        if let (Some(side), Some(shorthand)) = (self.box_side(), self.box_shorthand()) {
            let border_part = match shorthand {
                Self::BorderWidth => Some(Component::BorderWidth),
                Self::BorderStyle => Some(Component::BorderStyle),
                Self::BorderColor => Some(Component::BorderColor),
                _ => None,
            };
            if let Some(part) = border_part {
                sources.push((Self::border_side(side), part));
            }
            sources.push((shorthand, Component::Side(side)));
            if let Some(part) = border_part {
                sources.push((Self::Border, part));
            }
        }
        let background = match self {
            Self::BackgroundColor => Some(Component::BackgroundColor),
            Self::BackgroundImage => Some(Component::BackgroundImage),
            Self::BackgroundRepeat => Some(Component::BackgroundRepeat),
            Self::BackgroundAttachment => Some(Component::BackgroundAttachment),
            Self::BackgroundPosition => Some(Component::BackgroundPosition),
            _ => None,
        };
        if let Some(part) = background {
            sources.push((Self::Background, part));
        }
        if matches!(self, Self::OverflowX | Self::OverflowY) {
            sources.push((Self::Overflow, Component::Whole));
        }
        sources
    }

    /// [§ 7.1 Initial values](https://www.w3.org/TR/css-cascade-4/#initial-values)
    ///
    /// The value reported when nothing is declared. Shorthands report an
    /// empty string.
    #[must_use]
    pub fn default_value(self, oracle: &dyn FeatureOracle) -> &'static str {
        use Definition as D;
        match self {
            D::BackgroundAttachment => "scroll",
            D::BackgroundColor => {
                if oracle.has_feature(Feature::BackgroundTransparentKeyword) {
                    "transparent"
                } else {
                    "rgba(0, 0, 0, 0)"
                }
            }
            D::BackgroundImage | D::ListStyleImage | D::MaxHeight | D::MaxWidth => "none",
            D::BackgroundPosition => "0% 0%",
            D::BackgroundRepeat => "repeat",
            D::BorderTopColor
            | D::BorderRightColor
            | D::BorderBottomColor
            | D::BorderLeftColor
            | D::Color => "rgb(0, 0, 0)",
            D::BorderTopStyle
            | D::BorderRightStyle
            | D::BorderBottomStyle
            | D::BorderLeftStyle
            | D::Clear
            | D::Float
            | D::TextDecoration
            | D::TextTransform
            | D::Quotes => "none",
            D::BorderTopWidth
            | D::BorderRightWidth
            | D::BorderBottomWidth
            | D::BorderLeftWidth
            | D::MarginTop
            | D::MarginRight
            | D::MarginBottom
            | D::MarginLeft
            | D::PaddingTop
            | D::PaddingRight
            | D::PaddingBottom
            | D::PaddingLeft
            | D::MinHeight
            | D::MinWidth
            | D::TextIndent
            | D::WordSpacing => "0px",
            D::BorderCollapse => "separate",
            D::BorderSpacing => "0px 0px",
            D::Bottom | D::Left | D::Right | D::Top | D::Height | D::Width | D::Cursor | D::ZIndex => {
                "auto"
            }
            D::BoxSizing => "content-box",
            D::CaptionSide => "top",
            D::Content | D::FontStyle | D::FontVariant | D::LetterSpacing | D::LineHeight => "normal",
            D::WhiteSpace => "normal",
            D::Direction => "ltr",
            D::Display => "inline",
            D::EmptyCells => "show",
            D::FontFamily => {
                if oracle.has_feature(Feature::FontFamilyTimesNewRoman) {
                    "\"Times New Roman\""
                } else {
                    "serif"
                }
            }
            D::FontSize => "16px",
            D::FontWeight => "400",
            D::ListStylePosition => "outside",
            D::ListStyleType => "disc",
            D::Opacity => "1",
            D::Orphans | D::Widows => "2",
            D::OverflowX | D::OverflowY => "visible",
            D::Position => "static",
            D::TextAlign => "start",
            D::VerticalAlign => "baseline",
            D::Visibility => "visible",
            D::Background
            | D::Border
            | D::BorderBottom
            | D::BorderColor
            | D::BorderLeft
            | D::BorderRight
            | D::BorderStyle
            | D::BorderTop
            | D::BorderWidth
            | D::ListStyle
            | D::Margin
            | D::Overflow
            | D::Padding => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::browser::BrowserVersion;

    #[test]
    fn test_names_round_trip() {
        for def in Definition::iter() {
            assert_eq!(Definition::from_name(def.name()), Some(def));
        }
        assert_eq!(Definition::OverflowX.name(), "overflow-x");
        assert_eq!(Definition::ZIndex.name(), "z-index");
        assert_eq!(Definition::from_name("MARGIN-TOP"), Some(Definition::MarginTop));
        assert_eq!(Definition::from_name("no-such-property"), None);
    }

    #[test]
    fn test_defaults_follow_features() {
        let chrome = BrowserVersion::chrome();
        let ie = BrowserVersion::internet_explorer();
        assert_eq!(Definition::BackgroundColor.default_value(&chrome), "rgba(0, 0, 0, 0)");
        assert_eq!(Definition::BackgroundColor.default_value(&ie), "transparent");
        assert_eq!(
            Definition::FontFamily.default_value(&BrowserVersion::firefox()),
            "serif"
        );
    }

    #[test]
    fn test_only_longhands_have_defaults() {
        let chrome = BrowserVersion::chrome();
        for def in Definition::iter() {
            assert_eq!(def.is_shorthand(), def.default_value(&chrome).is_empty(), "{def}");
        }
    }

    #[test]
    fn test_sources_order() {
        assert_eq!(
            Definition::BorderLeftStyle.sources(),
            vec![
                (Definition::BorderLeftStyle, Component::Whole),
                (Definition::BorderLeft, Component::BorderStyle),
                (Definition::BorderStyle, Component::Side(BoxSide::Left)),
                (Definition::Border, Component::BorderStyle),
            ]
        );
        assert_eq!(
            Definition::MarginTop.sources(),
            vec![
                (Definition::MarginTop, Component::Whole),
                (Definition::Margin, Component::Side(BoxSide::Top)),
            ]
        );
    }

    #[test]
    fn test_component_extraction() {
        assert_eq!(
            Component::Side(BoxSide::Left).extract("1px 2px 3px"),
            Some("2px".to_string())
        );
        assert_eq!(
            Component::BorderColor.extract("1px solid red"),
            Some("red".to_string())
        );
        assert_eq!(Component::BorderWidth.extract("solid"), None);
        assert_eq!(
            Component::BackgroundColor.extract("url(x.png) #fff"),
            Some("#fff".to_string())
        );
    }
}
