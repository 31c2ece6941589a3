//! Integration tests for selector queries and validation through the engine.

use mimic_css::{BrowserVersion, EngineConfig, Feature, SelectorError, StyleEngine};
use mimic_dom::{DomTree, ElementData, NodeId};

fn element(tree: &mut DomTree, parent: NodeId, data: ElementData) -> NodeId {
    let id = tree.create_element(data);
    tree.append_child(parent, id);
    id
}

struct Page {
    tree: DomTree,
    items: Vec<NodeId>,
    input: NodeId,
    link: NodeId,
}

/// A list of five items, a checked checkbox and a link.
fn page() -> Page {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, ElementData::new("html").with_attr("lang", "en-US"));
    let body = element(&mut tree, html, ElementData::new("body"));
    let ul = element(&mut tree, body, ElementData::new("ul"));
    let mut items = Vec::new();
    for i in 1..=5 {
        let mut data = ElementData::new("li").with_attr("id", &format!("item{i}"));
        if i == 3 {
            data = data.with_attr("class", "x selected").with_attr("data-x", "abc");
        }
        items.push(element(&mut tree, ul, data));
    }
    let input = element(
        &mut tree,
        body,
        ElementData::new("input")
            .with_attr("type", "checkbox")
            .with_attr("checked", ""),
    );
    let link = element(&mut tree, body, ElementData::new("a").with_attr("href", "/next"));
    Page {
        tree,
        items,
        input,
        link,
    }
}

#[test]
fn test_structural_queries() {
    let page = page();
    let engine = StyleEngine::new(&page.tree, BrowserVersion::chrome());
    let items = &page.items;

    assert_eq!(
        engine.query_selector_all("li:nth-child(odd)").unwrap(),
        vec![items[0], items[2], items[4]]
    );
    assert_eq!(
        engine.query_selector_all("li:nth-last-child(-n+2)").unwrap(),
        vec![items[3], items[4]]
    );
    assert_eq!(
        engine.query_selector_all("ul > li + li").unwrap(),
        items[1..].to_vec()
    );
    assert_eq!(
        engine.query_selector_all(".x ~ li:last-child").unwrap(),
        vec![items[4]]
    );
    assert_eq!(
        engine.query_selector_all("body li:first-of-type, #item2").unwrap(),
        vec![items[0], items[1]]
    );
    assert_eq!(engine.query_selector(":root").unwrap(), page.tree.document_element());
}

#[test]
fn test_extreme_nth_arguments_never_fail() {
    let page = page();
    let engine = StyleEngine::new(&page.tree, BrowserVersion::chrome());

    assert_eq!(
        engine.query_selector_all("li:nth-child(n-2147483648)").unwrap(),
        page.items
    );
    assert!(engine.query_selector_all("li:nth-child(-n-2147483648)").unwrap().is_empty());
    assert!(
        engine
            .query_selector_all("li:nth-last-of-type(-2147483648n+2147483647)")
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_attribute_queries() {
    let page = page();
    let engine = StyleEngine::new(&page.tree, BrowserVersion::chrome());
    let third = vec![page.items[2]];

    assert_eq!(engine.query_selector_all("[data-x]").unwrap(), third);
    assert_eq!(engine.query_selector_all("[data-x^=\"ab\"]").unwrap(), third);
    assert_eq!(engine.query_selector_all("[data-x$='bc']").unwrap(), third);
    assert_eq!(engine.query_selector_all("[data-x*=b]").unwrap(), third);
    assert_eq!(engine.query_selector_all("[class~=selected]").unwrap(), third);
    assert_eq!(engine.query_selector_all("[lang|=en]").unwrap().len(), 1);
    assert!(engine.query_selector_all("[data-x=ABC]").unwrap().is_empty());
}

#[test]
fn test_state_and_form_queries() {
    let page = page();
    let mut engine = StyleEngine::new(&page.tree, BrowserVersion::chrome());

    assert_eq!(engine.query_selector_all(":checked").unwrap(), vec![page.input]);
    assert_eq!(engine.query_selector_all("a:link").unwrap(), vec![page.link]);
    assert!(engine.query_selector_all(":visited").unwrap().is_empty());
    assert!(engine.query_selector_all(":focus").unwrap().is_empty());

    engine.set_focus(Some(page.input));
    assert_eq!(engine.query_selector_all(":focus").unwrap(), vec![page.input]);
    assert_eq!(engine.query_selector_all("body:focus-within").unwrap().len(), 1);

    engine.set_target(Some("item4"));
    assert_eq!(engine.query_selector_all(":target").unwrap(), vec![page.items[3]]);
}

#[test]
fn test_lang_and_not() {
    let page = page();
    let engine = StyleEngine::new(&page.tree, BrowserVersion::chrome());

    assert_eq!(engine.query_selector_all("li:lang(en)").unwrap().len(), 5);
    assert!(engine.query_selector_all("li:lang(fr)").unwrap().is_empty());
    assert_eq!(engine.query_selector_all("li:not(.x)").unwrap().len(), 4);
    assert_eq!(engine.query_selector_all("li:not(ul > .x)").unwrap().len(), 4);
}

#[test]
fn test_target_from_config() {
    let page = page();
    let config = EngineConfig {
        target: Some("item2".to_string()),
        ..EngineConfig::default()
    };
    let engine = StyleEngine::from_config(&page.tree, &config).unwrap();

    assert_eq!(engine.query_selector_all(":target").unwrap(), vec![page.items[1]]);
}

#[test]
fn test_syntax_errors() {
    let page = page();
    let engine = StyleEngine::new(&page.tree, BrowserVersion::chrome());

    assert!(matches!(
        engine.query_selector_all("div["),
        Err(SelectorError::Syntax { .. })
    ));
    assert!(matches!(
        engine.query_selector_all("li:nth-child(foo)"),
        Err(SelectorError::MalformedNth { .. })
    ));
    assert!(matches!(
        engine.query_selector_all("li:bogus"),
        Err(SelectorError::UnsupportedPseudoClass { .. })
    ));
    assert!(matches!(
        engine.validate_selector("p::before span"),
        Err(SelectorError::Syntax { .. })
    ));
}

#[test]
fn test_selector_levels_follow_personality() {
    let page = page();

    let modern = StyleEngine::new(&page.tree, BrowserVersion::chrome());
    assert!(modern.validate_selector("li:not(ul li)").is_ok());
    assert!(modern.validate_selector("input:placeholder-shown").is_ok());

    let ie = StyleEngine::new(&page.tree, BrowserVersion::internet_explorer());
    assert!(ie.validate_selector("li:nth-child(2n+1)").is_ok());
    assert!(matches!(
        ie.validate_selector("li:not(ul li)"),
        Err(SelectorError::UnsupportedConstruct { .. })
    ));
    assert!(matches!(
        ie.validate_selector("a:any-link"),
        Err(SelectorError::UnsupportedPseudoClass { .. })
    ));

    let legacy = StyleEngine::new(
        &page.tree,
        BrowserVersion::chrome().with_feature(Feature::LegacySelectorsOnly),
    );
    assert!(legacy.validate_selector("ul > li:first-child").is_ok());
    assert!(legacy.validate_selector("li ~ li").is_err());
    assert!(legacy.validate_selector("[data-x^=a]").is_err());
    assert!(legacy.validate_selector("li:last-child").is_err());
}
