//! Integration tests for the declaration variants and style snapshots.

use mimic_css::stylesheet::Rule;
use mimic_css::{
    BoxSide, BrowserVersion, DeclarationBlock, Definition, EngineConfig, InlineStyle, Priority,
    RuleStyle, StyleDeclaration, StyleEngine, Stylesheet,
};
use mimic_dom::{DomTree, ElementData, NodeId};

fn element(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
    let id = tree.create_element(data);
    tree.append_child(parent, id);
    id
}

fn page() -> (DomTree, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, ElementData::new("html"));
    let body = element(&mut tree, html, ElementData::new("body"));
    let div = element(&mut tree, body, ElementData::new("div"));
    (tree, body, div)
}

#[test]
fn test_inline_edits_reach_the_cascade() {
    let (mut tree, _, div) = page();
    let browser = BrowserVersion::chrome();
    {
        let mut inline = InlineStyle::new(&mut tree, div, &browser);
        inline.set("margin", "4px 8px", Priority::Normal);
        inline.set("color", "Purple", Priority::Important);
        assert_eq!(inline.get_pair(Definition::MarginLeft, Definition::Margin), "8px");
        assert_eq!(inline.get_priority("color"), Priority::Important);
        assert_eq!(inline.length(), 2);
    }
    assert_eq!(
        tree.attribute(div, "style"),
        Some("margin: 4px 8px; color: Purple !important;")
    );

    let engine = StyleEngine::new(&tree, browser.clone());
    let style = engine.computed_style(div, None);
    assert_eq!(style.margin(BoxSide::Top), "4px");
    assert_eq!(style.color(), "rgb(128, 0, 128)");
    assert_eq!(style.get("color"), "Purple");
}

#[test]
fn test_inline_text_replacement() {
    let (mut tree, _, div) = page();
    let browser = BrowserVersion::firefox();
    let mut inline = InlineStyle::new(&mut tree, div, &browser);

    inline.set_text("width: 10px; /* note */ height: 5px");
    assert_eq!(inline.get("width"), "10px");
    assert_eq!(inline.get("height"), "5px");
    assert_eq!(inline.remove("width"), "10px");
    assert_eq!(inline.get_with_default(Definition::Width, true), "auto");
    assert_eq!(inline.get_with_default(Definition::Width, false), "");
}

#[test]
fn test_rule_style_edits_a_stylesheet_block() {
    let mut block = DeclarationBlock::parse("color: red");
    let browser = BrowserVersion::chrome();
    {
        let mut style = RuleStyle::new(&mut block, &browser);
        style.set("padding-top", "3px", Priority::Normal);
        assert_eq!(style.item(1), "padding-top");
        assert_eq!(style.get_text(), "color: red; padding-top: 3px;");
    }

    let rule = Rule::style("div", &block.to_css_text()).unwrap();
    let mut sheet = Stylesheet::new();
    sheet.push_rule(rule);

    let (tree, _, div) = page();
    let engine = StyleEngine::new(&tree, browser).with_stylesheet(sheet);
    assert_eq!(engine.computed_style(div, None).padding(BoxSide::Top), "3px");
}

#[test]
fn test_snapshot_serializes() {
    let (tree, body, div) = page();
    let config = EngineConfig::from_json(r#"{ "browser": "ie" }"#).unwrap();
    let engine = StyleEngine::from_config(&tree, &config).unwrap();

    let snapshot = engine.computed_style(div, None).snapshot();
    assert_eq!(snapshot.width, 1240);
    assert_eq!(snapshot.properties.get("display").map(String::as_str), Some("block"));
    assert!(!snapshot.properties.contains_key("margin"));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["node"], div.0);
    assert_eq!(json["properties"]["background-color"], "transparent");
    assert_eq!(json["properties"]["position"], "static");
    assert_eq!(json["width"], 1240);

    let body_json = serde_json::to_value(engine.computed_style(body, None).snapshot()).unwrap();
    assert_eq!(body_json["properties"]["margin-left"], "8px");
    assert_eq!(body_json["pseudo_element"], serde_json::Value::Null);
}
