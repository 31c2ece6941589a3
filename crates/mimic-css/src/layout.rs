//! Layout approximation
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/) and
//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! Not a layout engine. Scripts read `offsetWidth`, `clientHeight` and
//! friends, and those readings only need to be plausible and stable: the
//! estimates below use fixed constants (scrollbar width, intrinsic form
//! control sizes, per-character text widths) and simple sibling walks
//! instead of line boxes and formatting contexts.
//!
//! Every getter is memoized on the element's [`ComputedStyle`]; the
//! cache lives until the engine drops the style.

use std::cell::Cell;

use log::trace;
use mimic_dom::{ElementData, NodeId};

use crate::browser::{Feature, FeatureOracle};
use crate::declaration::{ComputedDeclaration, DETACHED};
use crate::definition::Definition;
use crate::element_kind::ElementKind;
use crate::values::{BoxSide, pixel_string, pixel_value};

/// Width (or height) taken from the content box by a scrollbar.
pub const SCROLLBAR_WIDTH: i32 = 17;

/// Per-sibling height used to place an absolutely positioned element
/// that only has `bottom`.
pub const SIBLING_HEIGHT: i32 = 20;

/// Border width of a side with a style but no width (`medium`).
const DEFAULT_BORDER_WIDTH: i32 = 3;

#[derive(Debug, Clone, Copy, Default)]
enum MemoState {
    #[default]
    Empty,
    Computing,
    Ready(i32),
}

/// One lazily computed pixel value.
///
/// Asking for a value while it is being computed (a layout cycle such as
/// a percentage of a shrink-to-fit parent) yields 0.
#[derive(Debug, Default)]
pub(crate) struct Memo(Cell<MemoState>);

impl Memo {
    pub(crate) fn get_or_compute(&self, compute: impl FnOnce() -> i32) -> i32 {
        match self.0.get() {
            MemoState::Ready(value) => value,
            MemoState::Computing => {
                trace!("layout cycle, using 0");
                0
            }
            MemoState::Empty => {
                self.0.set(MemoState::Computing);
                let value = compute();
                self.0.set(MemoState::Ready(value));
                value
            }
        }
    }

    #[cfg(test)]
    fn peek(&self) -> Option<i32> {
        match self.0.get() {
            MemoState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Memoized geometry of one computed style.
#[derive(Debug, Default)]
pub(crate) struct GeometryCache {
    width: Memo,
    height: Memo,
    empty_height: Memo,
    padding_horizontal: Memo,
    padding_vertical: Memo,
    border_horizontal: Memo,
    border_vertical: Memo,
    top: Memo,
    left: Memo,
}

fn is_block(display: &str) -> bool {
    matches!(display, "block" | "list-item" | "table" | "flex" | "grid")
}

fn is_auto(value: &str) -> bool {
    value.is_empty() || value == "auto"
}

fn is_out_of_flow(position: &str) -> bool {
    matches!(position, "absolute" | "fixed")
}

fn collapsed_len(text: &str) -> usize {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .count()
}

fn length_px(value: &str, base: i32) -> i32 {
    pixel_value(value, f64::from(base)).map_or(0, |px| px.round() as i32)
}

impl<'e> ComputedDeclaration<'e> {
    fn style_of(&self, node: NodeId) -> ComputedDeclaration<'e> {
        self.engine.computed_style(node, None)
    }

    fn element(&self) -> Option<&'e ElementData> {
        self.engine.tree().as_element(self.node())
    }

    fn kind(&self) -> ElementKind {
        self.element().map_or(ElementKind::Other, ElementKind::of)
    }

    fn parent_element(&self) -> Option<NodeId> {
        self.engine.tree().parent_element(self.node())
    }

    /// Whether the element and all its ancestors produce boxes.
    #[must_use]
    pub fn is_displayed(&self) -> bool {
        if !self.is_attached() || !self.kind().may_be_displayed() || self.display() == "none" {
            return false;
        }
        self.engine
            .tree()
            .ancestors(self.node())
            .filter(|&id| self.engine.tree().as_element(id).is_some())
            .all(|id| {
                let parent = self.style_of(id);
                parent.kind().may_be_displayed() && parent.display() != "none"
            })
    }

    fn is_border_box(&self) -> bool {
        self.box_sizing() == "border-box"
    }

    /// Width of `chars` characters of text in this element's font.
    fn text_width(&self, chars: usize) -> i32 {
        let browser = self.engine.browser();
        let per_char = if browser.has_feature(Feature::TextWidthFromFontHeight) {
            self.engine.font_metrics().font_height(&self.font_size()) / 2
        } else {
            browser.pixels_per_char()
        };
        (chars as i32).saturating_mul(per_char)
    }

    /// Width of the parent's content box, or the window's for the root.
    fn containing_width(&self) -> i32 {
        self.parent_element().map_or_else(
            || self.engine.viewport().inner_width(),
            |parent| self.style_of(parent).calculated_width(),
        )
    }

    fn viewport_height(&self) -> i32 {
        self.engine.viewport().inner_height()
    }

    /// Margin of one side in pixels; `auto` counts as 0.
    #[must_use]
    pub fn margin_px(&self, side: BoxSide) -> i32 {
        let value = self.margin(side);
        if is_auto(&value) {
            0
        } else {
            length_px(&value, self.containing_width())
        }
    }

    /// Padding of one side in pixels.
    #[must_use]
    pub fn padding_px(&self, side: BoxSide) -> i32 {
        length_px(&self.padding(side), self.containing_width()).max(0)
    }

    /// Border width of one side in pixels; 0 unless the side has a
    /// visible style.
    #[must_use]
    pub fn border_px(&self, side: BoxSide) -> i32 {
        let style = self.border_style(side);
        if matches!(style.as_str(), "" | "none" | "hidden") {
            return 0;
        }
        let width = self.resolve(Definition::border_width(side), false);
        if width.is_empty() {
            DEFAULT_BORDER_WIDTH
        } else {
            length_px(&width, 0).max(0)
        }
    }

    /// Left plus right padding.
    #[must_use]
    pub fn padding_horizontal(&self) -> i32 {
        self.style.geometry.padding_horizontal.get_or_compute(|| {
            if self.is_displayed() {
                self.padding_px(BoxSide::Left) + self.padding_px(BoxSide::Right)
            } else {
                0
            }
        })
    }

    /// Top plus bottom padding.
    #[must_use]
    pub fn padding_vertical(&self) -> i32 {
        self.style.geometry.padding_vertical.get_or_compute(|| {
            if self.is_displayed() {
                self.padding_px(BoxSide::Top) + self.padding_px(BoxSide::Bottom)
            } else {
                0
            }
        })
    }

    /// Left plus right border.
    #[must_use]
    pub fn border_horizontal(&self) -> i32 {
        self.style.geometry.border_horizontal.get_or_compute(|| {
            if self.is_displayed() {
                self.border_px(BoxSide::Left) + self.border_px(BoxSide::Right)
            } else {
                0
            }
        })
    }

    /// Top plus bottom border.
    #[must_use]
    pub fn border_vertical(&self) -> i32 {
        self.style.geometry.border_vertical.get_or_compute(|| {
            if self.is_displayed() {
                self.border_px(BoxSide::Top) + self.border_px(BoxSide::Bottom)
            } else {
                0
            }
        })
    }

    /// Characters of the label a button shows.
    fn label_chars(&self) -> usize {
        let Some(element) = self.element() else {
            return 0;
        };
        match self.kind() {
            ElementKind::InputButton => match element.attribute("value") {
                Some(value) => value.chars().count(),
                None => match element.attribute("type").map(str::to_ascii_lowercase).as_deref() {
                    Some("submit") => "Submit".len(),
                    Some("reset") => "Reset".len(),
                    _ => 0,
                },
            },
            _ => collapsed_len(&self.engine.tree().visible_text(self.node())),
        }
    }

    fn intrinsic_width(&self) -> Option<i32> {
        let element = self.element()?;
        let size = self.kind().intrinsic_size()?;
        Some(size.width.resolve(
            element,
            self.engine.browser(),
            self.label_chars(),
            self.engine.browser().pixels_per_char(),
        ))
    }

    fn intrinsic_height(&self) -> Option<i32> {
        let element = self.element()?;
        let size = self.kind().intrinsic_size()?;
        Some(size.height.resolve(
            element,
            self.engine.browser(),
            self.label_chars(),
            self.engine.browser().pixels_per_char(),
        ))
    }

    /// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
    ///
    /// Content width in pixels:
    /// - explicit `width` on a non-inline box: that length, percentages of
    ///   the containing block
    /// - replaced and form elements: their intrinsic width
    /// - floats and absolutely positioned boxes: their text width
    /// - block boxes: the containing block minus own margins, borders and
    ///   padding
    /// - everything else: the sum of the children
    #[must_use]
    pub fn calculated_width(&self) -> i32 {
        self.style
            .geometry
            .width
            .get_or_compute(|| self.compute_width())
    }

    fn compute_width(&self) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let display = self.display();
        let width = self.resolve(Definition::Width, true);
        if self.parent_element().is_none() {
            let viewport = self.engine.viewport().inner_width();
            return if is_auto(&width) || display == "inline" {
                viewport
            } else {
                length_px(&width, viewport)
            };
        }

        if display != "inline"
            && !is_auto(&width)
            && let Some(px) = pixel_value(&width, f64::from(self.containing_width()))
        {
            let px = px.round() as i32;
            return if self.is_border_box() {
                (px - self.border_horizontal() - self.padding_horizontal()).max(0)
            } else {
                px
            };
        }

        if let Some(width) = self.intrinsic_width() {
            return width;
        }
        let float = self.float();
        if matches!(float.as_str(), "left" | "right") || is_out_of_flow(&self.position()) {
            return self.text_width(collapsed_len(&self.engine.tree().visible_text(self.node())));
        }
        if is_block(&display) {
            let margins = self.margin_px(BoxSide::Left) + self.margin_px(BoxSide::Right);
            return (self.containing_width()
                - margins
                - self.border_horizontal()
                - self.padding_horizontal())
            .max(0);
        }
        self.content_width()
    }

    /// Sum of the children's widths: element children with border and
    /// padding, text at the per-character width.
    #[must_use]
    pub fn content_width(&self) -> i32 {
        let tree = self.engine.tree();
        tree.children(self.node())
            .iter()
            .map(|&child| {
                if tree.as_element(child).is_some() {
                    self.style_of(child).calculated_width_with(true, true)
                } else {
                    tree.as_text(child)
                        .map_or(0, |text| self.text_width(collapsed_len(text)))
                }
            })
            .sum()
    }

    fn is_scrollable(&self, horizontal: bool) -> bool {
        let overflow = if horizontal {
            self.overflow_x()
        } else {
            self.overflow_y()
        };
        let candidate =
            self.kind() == ElementKind::Body || matches!(overflow.as_str(), "scroll" | "auto");
        if !candidate {
            return false;
        }
        if horizontal {
            self.content_width() > self.calculated_width()
        } else {
            self.content_height() > self.empty_height()
        }
    }

    /// [`calculated_width`](Self::calculated_width) plus border and padding
    /// on request. Without the border, a scrollbar takes its width from the
    /// box. `box-sizing: border-box` reports the box as declared.
    #[must_use]
    pub fn calculated_width_with(&self, include_border: bool, include_padding: bool) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let mut width = self.calculated_width();
        if self.is_border_box() {
            return width + self.border_horizontal() + self.padding_horizontal();
        }
        if include_border {
            width += self.border_horizontal();
        } else if self.is_scrollable(true) {
            width -= SCROLLBAR_WIDTH;
        }
        if include_padding {
            width += self.padding_horizontal();
        }
        width
    }

    /// [§ 10.6 Calculating heights and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_heights_and_margins)
    ///
    /// Content height in pixels: images use their intrinsic height; boxes
    /// without an explicit height (and inline boxes) take their content
    /// height when they have any; otherwise the empty height.
    #[must_use]
    pub fn calculated_height(&self) -> i32 {
        self.style
            .geometry
            .height
            .get_or_compute(|| self.compute_height())
    }

    fn compute_height(&self) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let kind = self.kind();
        if kind == ElementKind::Image
            && let Some(height) = self.intrinsic_height()
        {
            return height;
        }
        let explicit = !is_auto(&self.resolve(Definition::Height, true));
        if (self.display() == "inline" && kind != ElementKind::IFrame) || !explicit {
            let content = self.content_height();
            if content > 0 {
                return content;
            }
        }
        self.empty_height()
    }

    /// Height ignoring child boxes: the window for `<body>`, intrinsic
    /// sizes for form elements, else one font height per wrapped line of
    /// text. An explicit `height` overrides all of these.
    #[must_use]
    pub fn empty_height(&self) -> i32 {
        self.style
            .geometry
            .empty_height
            .get_or_compute(|| self.compute_empty_height())
    }

    fn compute_empty_height(&self) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let kind = self.kind();
        if kind == ElementKind::Body {
            return self.viewport_height();
        }
        let tree = self.engine.tree();
        let default_height = if let Some(height) = self.intrinsic_height() {
            height
        } else if tree.children(self.node()).is_empty() {
            0
        } else {
            let text = tree.visible_text(self.node());
            if kind == ElementKind::Div && text.trim().is_empty() {
                0
            } else {
                let font_size = self.font_size();
                let fonts = self.engine.font_metrics();
                let lines = fonts
                    .count_wrapped_lines(&text, self.calculated_width(), &font_size)
                    .max(1);
                fonts.font_height(&font_size) * lines
            }
        };

        let height = self.resolve(Definition::Height, true);
        if is_auto(&height) {
            return default_height;
        }
        let base = if kind == ElementKind::Canvas {
            150
        } else {
            self.viewport_height()
        };
        pixel_value(&height, f64::from(base)).map_or(default_height, |px| {
            let px = px.round() as i32;
            if self.is_border_box() {
                (px - self.border_vertical() - self.padding_vertical()).max(0)
            } else {
                px
            }
        })
    }

    /// Bottom edge of the lowest child box: the last in-flow child plus
    /// every absolutely or fixed positioned child.
    #[must_use]
    pub fn content_height(&self) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let mut last_in_flow = None;
        let mut out_of_flow = Vec::new();
        for child in self.engine.tree().element_children(self.node()) {
            let style = self.style_of(child);
            if !style.is_displayed() {
                continue;
            }
            if is_out_of_flow(&style.position()) {
                out_of_flow.push(style);
            } else {
                last_in_flow = Some(style);
            }
        }
        last_in_flow
            .into_iter()
            .chain(out_of_flow)
            .map(|child| child.top_with(true, false, false) + child.calculated_height_with(true, true))
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// [`calculated_height`](Self::calculated_height) plus border and
    /// padding on request, mirroring
    /// [`calculated_width_with`](Self::calculated_width_with).
    #[must_use]
    pub fn calculated_height_with(&self, include_border: bool, include_padding: bool) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let mut height = self.calculated_height();
        if self.is_border_box() {
            return height + self.border_vertical() + self.padding_vertical();
        }
        if include_border {
            height += self.border_vertical();
        } else if self.is_scrollable(false) {
            height -= SCROLLBAR_WIDTH;
        }
        if include_padding {
            height += self.padding_vertical();
        }
        height
    }

    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    ///
    /// Offset of the border box from the parent's content box, plus the
    /// element's own top margin, border and padding on request.
    #[must_use]
    pub fn top_with(&self, include_margin: bool, include_border: bool, include_padding: bool) -> i32 {
        let mut top = self
            .style
            .geometry
            .top
            .get_or_compute(|| self.compute_top());
        if include_margin {
            top += self.margin_px(BoxSide::Top);
        }
        if include_border {
            top += self.border_px(BoxSide::Top);
        }
        if include_padding {
            top += self.padding_px(BoxSide::Top);
        }
        top
    }

    fn compute_top(&self) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let position = self.position();
        if is_out_of_flow(&position) {
            let top = self.resolve(Definition::Top, true);
            if !is_auto(&top) {
                return length_px(&top, self.viewport_height());
            }
            let bottom = self.resolve(Definition::Bottom, true);
            if !is_auto(&bottom) {
                let siblings = self.parent_element().map_or(1, |parent| {
                    self.engine
                        .tree()
                        .element_children(parent)
                        .filter(|&child| {
                            let style = self.style_of(child);
                            style.kind().may_be_displayed() && style.display() != "none"
                        })
                        .count()
                });
                return siblings as i32 * SIBLING_HEIGHT - length_px(&bottom, self.viewport_height());
            }
        }

        let mut top = self.static_top();
        if position == "relative" {
            let offset = self.resolve(Definition::Top, true);
            if !is_auto(&offset) {
                top += length_px(&offset, self.viewport_height());
            }
        }
        top
    }

    /// Sum of the preceding in-flow block siblings' outer heights.
    /// Relative offsets of those siblings do not move this element.
    fn static_top(&self) -> i32 {
        let tree = self.engine.tree();
        let mut top = 0;
        for sibling in tree.preceding_siblings(self.node()) {
            if tree.as_element(sibling).is_none() {
                continue;
            }
            let style = self.style_of(sibling);
            if !style.is_displayed() || !is_block(&style.display()) {
                continue;
            }
            if is_out_of_flow(&style.position()) {
                continue;
            }
            top += style.margin_px(BoxSide::Top)
                + style.calculated_height_with(true, true)
                + style.margin_px(BoxSide::Bottom);
        }
        top
    }

    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    ///
    /// Horizontal offset of the border box within the parent's content
    /// box, plus the element's own left margin, border and padding on
    /// request.
    #[must_use]
    pub fn left_with(&self, include_margin: bool, include_border: bool, include_padding: bool) -> i32 {
        let mut left = self
            .style
            .geometry
            .left
            .get_or_compute(|| self.compute_left());
        if include_margin {
            left += self.margin_px(BoxSide::Left);
        }
        if include_border {
            left += self.border_px(BoxSide::Left);
        }
        if include_padding {
            left += self.padding_px(BoxSide::Left);
        }
        left
    }

    fn compute_left(&self) -> i32 {
        if !self.is_displayed() {
            return 0;
        }
        let position = self.position();
        let left = self.resolve(Definition::Left, true);
        let right = self.resolve(Definition::Right, true);
        match position.as_str() {
            "absolute" | "fixed" if !is_auto(&left) => length_px(&left, self.containing_width()),
            "absolute" if !is_auto(&right) => {
                let parent_width = self.parent_element().map_or_else(
                    || self.engine.viewport().inner_width(),
                    |parent| self.style_of(parent).calculated_width_with(false, false),
                );
                parent_width - length_px(&right, parent_width)
            }
            "fixed" if !is_auto(&right) => {
                let viewport = self.engine.viewport().inner_width();
                viewport - self.calculated_width_with(true, true) - length_px(&right, viewport)
            }
            "fixed" => 0,
            "relative" if !is_auto(&left) => {
                self.static_left() + length_px(&left, self.containing_width())
            }
            _ => self.static_left(),
        }
    }

    /// Sum of the preceding inline siblings' outer widths, up to the
    /// nearest block sibling or table row. Block boxes start a new line.
    fn static_left(&self) -> i32 {
        if is_block(&self.display()) {
            return 0;
        }
        let tree = self.engine.tree();
        let mut left = 0;
        for sibling in tree.preceding_siblings(self.node()) {
            if let Some(text) = tree.as_text(sibling) {
                left += self.text_width(collapsed_len(text));
                continue;
            }
            if tree.as_element(sibling).is_none() {
                continue;
            }
            let style = self.style_of(sibling);
            if style.kind() == ElementKind::TableRow {
                break;
            }
            if !style.is_displayed() {
                continue;
            }
            if is_block(&style.display()) {
                break;
            }
            left += style.margin_px(BoxSide::Left)
                + style.calculated_width_with(true, true)
                + style.margin_px(BoxSide::Right);
        }
        left
    }

    /// Computed `width`: `auto` for undisplayed elements, else pixels.
    #[must_use]
    pub fn width(&self) -> String {
        self.geometry_string(|style| style.calculated_width())
    }

    /// Computed `height`: `auto` for undisplayed elements, else pixels.
    #[must_use]
    pub fn height(&self) -> String {
        self.geometry_string(|style| style.calculated_height())
    }

    /// Computed `top`: the declared offset in pixels, or `auto`.
    #[must_use]
    pub fn top(&self) -> String {
        self.offset_string(Definition::Top, self.viewport_height())
    }

    /// Computed `left`: the declared offset in pixels, or `auto`.
    #[must_use]
    pub fn left(&self) -> String {
        self.offset_string(Definition::Left, self.containing_width())
    }

    fn geometry_string(&self, measure: impl FnOnce(&Self) -> i32) -> String {
        if !self.is_attached() {
            return DETACHED.to_string();
        }
        if self.display() == "none" {
            return "auto".to_string();
        }
        pixel_string(measure(self))
    }

    fn offset_string(&self, definition: Definition, base: i32) -> String {
        if !self.is_attached() {
            return DETACHED.to_string();
        }
        let value = self.resolve(definition, true);
        if self.display() == "none" || is_auto(&value) {
            return "auto".to_string();
        }
        pixel_value(&value, f64::from(base))
            .map_or(value, |px| pixel_string(px.round() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_computes_once() {
        let memo = Memo::default();
        let mut calls = 0;
        assert_eq!(memo.peek(), None);
        assert_eq!(
            memo.get_or_compute(|| {
                calls += 1;
                42
            }),
            42
        );
        assert_eq!(memo.get_or_compute(|| 7), 42);
        assert_eq!(calls, 1);
        assert_eq!(memo.peek(), Some(42));
    }

    #[test]
    fn test_memo_reentry_yields_zero() {
        let memo = Memo::default();
        let value = memo.get_or_compute(|| memo.get_or_compute(|| 5) + 10);
        assert_eq!(value, 10);
    }

    #[test]
    fn test_offsets_are_memoized() {
        use mimic_dom::DomTree;

        use crate::browser::BrowserVersion;
        use crate::engine::StyleEngine;

        let mut tree = DomTree::new();
        let html = tree.create_element(ElementData::new("html"));
        tree.append_child(NodeId::ROOT, html);
        let body = tree.create_element(ElementData::new("body"));
        tree.append_child(html, body);
        let span = tree.create_element(ElementData::new("span"));
        tree.append_child(body, span);
        let text = tree.create_text("abc");
        tree.append_child(span, text);
        let target = tree.create_element(ElementData::new("span"));
        tree.append_child(body, target);
        let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

        let style = engine.computed_style(target, None);
        assert_eq!(style.style.geometry.left.peek(), None);
        assert_eq!(style.left_with(false, false, false), 30);
        assert_eq!(style.style.geometry.left.peek(), Some(30));
        let _ = style.top_with(false, false, false);
        assert!(style.style.geometry.top.peek().is_some());
    }

    #[test]
    fn test_collapsed_len() {
        assert_eq!(collapsed_len("  a   b\n c "), 5);
        assert_eq!(collapsed_len("   "), 0);
    }
}
