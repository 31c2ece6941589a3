//! Integration tests for the geometry estimates.

use mimic_css::{BrowserVersion, Screen, StyleEngine, Stylesheet};
use mimic_dom::{DomTree, ElementData, NodeId};

fn element(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
    let id = tree.create_element(data);
    tree.append_child(parent, id);
    id
}

fn text(tree: &mut DomTree, parent: NodeId, content: &str) -> NodeId {
    let id = tree.create_text(content);
    tree.append_child(parent, id);
    id
}

fn styled(tag: &str, style: &str) -> ElementData {
    ElementData::new(tag).with_attr("style", style)
}

/// `<html><body/></html>`, returning the tree and the body.
fn page() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, ElementData::new("html"));
    let body = element(&mut tree, html, ElementData::new("body"));
    (tree, body)
}

#[test]
fn test_block_widths_fill_the_window() {
    let (mut tree, body) = page();
    let div = element(&mut tree, body, ElementData::new("div"));
    let half = element(&mut tree, body, styled("div", "width: 50%"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    let body_style = engine.computed_style(body, None);
    assert_eq!(body_style.calculated_width(), 1240);
    assert_eq!(body_style.width(), "1240px");
    assert_eq!(engine.computed_style(div, None).calculated_width(), 1240);
    assert_eq!(engine.computed_style(half, None).calculated_width(), 620);
}

#[test]
fn test_custom_viewport() {
    let (tree, body) = page();
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome()).with_viewport(Screen {
        inner_width: 800,
        inner_height: 400,
        ..Screen::default()
    });

    let style = engine.computed_style(body, None);
    assert_eq!(style.calculated_width(), 784);
    assert_eq!(style.calculated_height(), 400);
}

#[test]
fn test_border_and_padding() {
    let (mut tree, body) = page();
    let boxed = element(&mut tree, body, styled("div", "padding: 10px; border: 2px solid black"));
    let sized = element(
        &mut tree,
        body,
        styled("div", "width: 100px; padding: 10px; box-sizing: border-box"),
    );
    let styled_only = element(&mut tree, body, styled("div", "border-style: dashed"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    let style = engine.computed_style(boxed, None);
    assert_eq!(style.border_horizontal(), 4);
    assert_eq!(style.padding_horizontal(), 20);
    assert_eq!(style.calculated_width(), 1216);
    assert_eq!(style.calculated_width_with(true, true), 1240);
    assert_eq!(style.calculated_width_with(false, true), 1236);

    let style = engine.computed_style(sized, None);
    assert_eq!(style.calculated_width(), 80);
    assert_eq!(style.calculated_width_with(true, true), 100);
    assert_eq!(style.calculated_width_with(false, false), 100);

    // A style without a width means `medium`.
    assert_eq!(engine.computed_style(styled_only, None).border_vertical(), 6);
}

#[test]
fn test_display_none_reports_auto() {
    let (mut tree, body) = page();
    let hidden = element(&mut tree, body, styled("div", "display: none; width: 100px; height: 20px"));
    let inner = element(&mut tree, hidden, ElementData::new("span"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    let style = engine.computed_style(hidden, None);
    assert_eq!(style.width(), "auto");
    assert_eq!(style.height(), "auto");
    assert_eq!(style.top(), "auto");
    assert_eq!(style.left(), "auto");
    assert_eq!(style.calculated_width(), 0);

    let inner = engine.computed_style(inner, None);
    assert!(!inner.is_displayed());
    assert_eq!(inner.calculated_width(), 0);
}

#[test]
fn test_form_control_sizes_per_personality() {
    let (mut tree, body) = page();
    let checkbox = element(&mut tree, body, ElementData::new("input").with_attr("type", "checkbox"));
    let input = element(&mut tree, body, ElementData::new("input"));

    let chrome = StyleEngine::new(&tree, BrowserVersion::chrome());
    assert_eq!(chrome.computed_style(checkbox, None).calculated_width(), 13);
    assert_eq!(chrome.computed_style(checkbox, None).calculated_height(), 13);
    assert_eq!(chrome.computed_style(input, None).calculated_width(), 169);
    assert_eq!(chrome.computed_style(input, None).calculated_height(), 21);

    let ie = StyleEngine::new(&tree, BrowserVersion::internet_explorer());
    assert_eq!(ie.computed_style(checkbox, None).calculated_width(), 10);
    assert_eq!(ie.computed_style(input, None).calculated_width(), 143);

    let firefox = StyleEngine::new(&tree, BrowserVersion::firefox());
    assert_eq!(firefox.computed_style(input, None).calculated_width(), 141);
    assert_eq!(firefox.computed_style(input, None).calculated_height(), 17);
}

#[test]
fn test_images_and_buttons() {
    let (mut tree, body) = page();
    let img = element(
        &mut tree,
        body,
        ElementData::new("img").with_attr("width", "40").with_attr("height", "30"),
    );
    let bare = element(&mut tree, body, ElementData::new("img"));
    let submit = element(&mut tree, body, ElementData::new("input").with_attr("type", "submit"));
    let button = element(&mut tree, body, ElementData::new("button"));
    let _ = text(&mut tree, button, "OK");

    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());
    assert_eq!(engine.computed_style(img, None).calculated_width(), 40);
    assert_eq!(engine.computed_style(img, None).calculated_height(), 30);
    assert_eq!(engine.computed_style(bare, None).calculated_width(), 24);
    // "Submit": 10 + round(6 * 10 * 0.9)
    assert_eq!(engine.computed_style(submit, None).calculated_width(), 64);
    assert_eq!(engine.computed_style(button, None).calculated_width(), 28);
    assert_eq!(engine.computed_style(button, None).calculated_height(), 20);

    let ie = StyleEngine::new(&tree, BrowserVersion::internet_explorer());
    assert_eq!(ie.computed_style(bare, None).calculated_width(), 0);
}

#[test]
fn test_text_heights() {
    let (mut tree, body) = page();
    let first = element(&mut tree, body, ElementData::new("div"));
    let _ = text(&mut tree, first, "Hello");
    let blank = element(&mut tree, body, ElementData::new("div"));
    let _ = text(&mut tree, blank, "   ");
    let tall = element(&mut tree, body, styled("div", "height: 50px"));
    let _ = text(&mut tree, tall, "x");
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    assert_eq!(engine.computed_style(first, None).calculated_height(), 18);
    assert_eq!(engine.computed_style(blank, None).calculated_height(), 0);
    assert_eq!(engine.computed_style(tall, None).calculated_height(), 50);
    // Body takes the bottom of its last child.
    assert_eq!(engine.computed_style(body, None).calculated_height(), 68);
}

#[test]
fn test_wrapped_text_height() {
    let (mut tree, body) = page();
    let narrow = element(&mut tree, body, styled("div", "width: 80px"));
    // 20 glyphs of 8px in an 80px box: two lines.
    let _ = text(&mut tree, narrow, "abcdefghijklmnopqrst");
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    assert_eq!(engine.computed_style(narrow, None).calculated_height(), 36);
}

#[test]
fn test_static_and_relative_tops() {
    let (mut tree, body) = page();
    let p1 = element(&mut tree, body, ElementData::new("p"));
    let _ = text(&mut tree, p1, "A");
    let p2 = element(&mut tree, body, ElementData::new("p"));
    let _ = text(&mut tree, p2, "B");
    let shifted = element(&mut tree, body, styled("div", "position: relative; top: 5px"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    let first = engine.computed_style(p1, None);
    assert_eq!(first.top_with(false, false, false), 0);
    assert_eq!(first.top_with(true, false, false), 16);

    // 16 + 18 + 16 for the first paragraph.
    let second = engine.computed_style(p2, None);
    assert_eq!(second.top_with(false, false, false), 50);
    assert_eq!(second.top_with(true, false, false), 66);

    let third = engine.computed_style(shifted, None);
    assert_eq!(third.top_with(false, false, false), 105);
    assert_eq!(third.top(), "5px");
}

#[test]
fn test_absolute_tops() {
    let (mut tree, body) = page();
    let container = element(&mut tree, body, ElementData::new("div"));
    let _ = element(&mut tree, container, ElementData::new("div"));
    let explicit = element(&mut tree, container, styled("div", "position: absolute; top: 40px"));
    let bottom = element(&mut tree, container, styled("div", "position: absolute; bottom: 10px"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    assert_eq!(engine.computed_style(explicit, None).top_with(false, false, false), 40);
    assert_eq!(engine.computed_style(bottom, None).top_with(false, false, false), 50);
}

#[test]
fn test_relative_offset_does_not_move_later_siblings() {
    let (mut tree, body) = page();
    let _ = element(&mut tree, body, styled("div", "height: 10px"));
    let shifted = element(&mut tree, body, styled("div", "height: 10px; position: relative; top: 5px"));
    let last = element(&mut tree, body, styled("div", "height: 10px"));

    let fresh = StyleEngine::new(&tree, BrowserVersion::chrome());
    assert_eq!(fresh.computed_style(last, None).top_with(false, false, false), 20);

    let warmed = StyleEngine::new(&tree, BrowserVersion::chrome());
    assert_eq!(warmed.computed_style(shifted, None).top_with(false, false, false), 15);
    assert_eq!(warmed.computed_style(last, None).top_with(false, false, false), 20);
}

#[test]
fn test_bottom_estimate_counts_displayed_siblings_only() {
    let (mut tree, body) = page();
    let container = element(&mut tree, body, ElementData::new("div"));
    let _ = element(&mut tree, container, ElementData::new("script"));
    let _ = element(&mut tree, container, ElementData::new("style"));
    let _ = element(&mut tree, container, styled("div", "display: none"));
    let _ = element(&mut tree, container, ElementData::new("input").with_attr("type", "hidden"));
    let bottom = element(&mut tree, container, styled("div", "position: absolute; bottom: 10px"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    assert_eq!(engine.computed_style(bottom, None).top_with(false, false, false), 10);
}

#[test]
fn test_inline_lefts() {
    let (mut tree, body) = page();
    let first = element(&mut tree, body, ElementData::new("span"));
    let _ = text(&mut tree, first, "abc");
    let _ = text(&mut tree, body, "de");
    let second = element(&mut tree, body, styled("span", "margin-left: 4px"));
    let block = element(&mut tree, body, ElementData::new("div"));
    let after_block = element(&mut tree, body, ElementData::new("span"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    assert_eq!(engine.computed_style(first, None).calculated_width(), 30);
    let second = engine.computed_style(second, None);
    assert_eq!(second.left_with(false, false, false), 50);
    assert_eq!(second.left_with(true, false, false), 54);
    assert_eq!(engine.computed_style(block, None).left_with(false, false, false), 0);
    assert_eq!(engine.computed_style(after_block, None).left_with(false, false, false), 0);
}

#[test]
fn test_lefts_are_stable_across_query_order() {
    let (mut tree, body) = page();
    let first = element(&mut tree, body, ElementData::new("span"));
    let _ = text(&mut tree, first, "abcd");
    let second = element(&mut tree, body, styled("span", "position: relative; left: 7px"));
    let third = element(&mut tree, body, ElementData::new("span"));

    let fresh = StyleEngine::new(&tree, BrowserVersion::chrome());
    let third_first = fresh.computed_style(third, None).left_with(false, false, false);
    assert_eq!(third_first, 40);

    let warmed = StyleEngine::new(&tree, BrowserVersion::chrome());
    let style = warmed.computed_style(second, None);
    assert_eq!(style.left_with(false, false, false), 47);
    assert_eq!(style.left_with(false, false, false), 47);
    assert_eq!(warmed.computed_style(third, None).left_with(false, false, false), third_first);
}

#[test]
fn test_floats_and_font_based_text_width() {
    let (mut tree, body) = page();
    let float = element(&mut tree, body, styled("div", "float: left"));
    let _ = text(&mut tree, float, "abcd");

    let chrome = StyleEngine::new(&tree, BrowserVersion::chrome());
    assert_eq!(chrome.computed_style(float, None).calculated_width(), 40);

    // 18px line height, half of it per character.
    let firefox = StyleEngine::new(&tree, BrowserVersion::firefox());
    assert_eq!(firefox.computed_style(float, None).calculated_width(), 36);
}

#[test]
fn test_scrollbar_takes_width() {
    let (mut tree, body) = page();
    let scroller = element(&mut tree, body, styled("div", "overflow: scroll; width: 100px"));
    let _ = element(&mut tree, scroller, styled("div", "width: 200px"));
    let roomy = element(&mut tree, body, styled("div", "overflow: scroll; width: 100px"));
    let _ = element(&mut tree, roomy, styled("div", "width: 50px"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome());

    let style = engine.computed_style(scroller, None);
    assert_eq!(style.content_width(), 200);
    assert_eq!(style.calculated_width_with(false, false), 83);
    assert_eq!(style.calculated_width_with(true, false), 100);
    assert_eq!(engine.computed_style(roomy, None).calculated_width_with(false, false), 100);
}

#[test]
fn test_stylesheet_widths() {
    let (mut tree, body) = page();
    let div = element(&mut tree, body, ElementData::new("div").with_attr("class", "box"));
    let engine = StyleEngine::new(&tree, BrowserVersion::chrome()).with_stylesheet(
        Stylesheet::new()
            .style_rule(".box", "width: 300px; margin: 0 auto")
            .unwrap(),
    );

    let style = engine.computed_style(div, None);
    assert_eq!(style.width(), "300px");
    assert_eq!(style.margin_px(mimic_css::BoxSide::Left), 0);
}
