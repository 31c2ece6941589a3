//! The style engine: stylesheets, interaction state and the per-element
//! style cache for one document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use log::debug;
use mimic_dom::{DomTree, NodeId};

use crate::browser::BrowserVersion;
use crate::cascade;
use crate::config::EngineConfig;
use crate::declaration::{ComputedDeclaration, ComputedStyle};
use crate::error::{ConfigError, SelectorError};
use crate::index::MatchedRule;
use crate::media::MediaQueryCache;
use crate::oracle::{ApproximateFontMetrics, FontMetrics, Screen, Viewport};
use crate::selector::matching::normalize_pseudo_element;
use crate::selector::{ElementState, MatchContext, SelectorList, parse_selector_list, validate};
use crate::stylesheet::Stylesheet;

type StyleKey = (NodeId, Option<String>);

/// Computes styles for the elements of one [`DomTree`].
///
/// Styles are built on first request and cached until [`invalidate`]
/// (or any state change) clears them. The engine is single-threaded;
/// only the stylesheets and the media cache may be shared.
///
/// [`invalidate`]: StyleEngine::invalidate
pub struct StyleEngine<'a> {
    tree: &'a DomTree,
    browser: BrowserVersion,
    sheets: Vec<Arc<Stylesheet>>,
    viewport: Box<dyn Viewport>,
    fonts: Box<dyn FontMetrics>,
    state: ElementState,
    media_cache: MediaQueryCache,
    styles: RefCell<HashMap<StyleKey, Rc<ComputedStyle>>>,
}

impl fmt::Debug for StyleEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleEngine")
            .field("browser", &self.browser)
            .field("sheets", &self.sheets.len())
            .field("state", &self.state)
            .field("cached_styles", &self.styles.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<'a> StyleEngine<'a> {
    /// An engine with the default window and font metrics.
    #[must_use]
    pub fn new(tree: &'a DomTree, browser: BrowserVersion) -> Self {
        Self {
            tree,
            browser,
            sheets: Vec::new(),
            viewport: Box::new(Screen::default()),
            fonts: Box::new(ApproximateFontMetrics),
            state: ElementState::default(),
            media_cache: MediaQueryCache::default(),
            styles: RefCell::new(HashMap::new()),
        }
    }

    /// An engine set up from `config`.
    ///
    /// # Errors
    /// Unknown browser or feature names.
    pub fn from_config(tree: &'a DomTree, config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut engine = Self::new(tree, config.browser_version()?);
        engine.viewport = Box::new(config.screen);
        engine.media_cache = MediaQueryCache::new(config.media_cache_capacity);
        engine.state.target.clone_from(&config.target);
        debug!(
            "style engine for '{}' at {}x{}",
            engine.browser.name(),
            config.screen.inner_width,
            config.screen.inner_height
        );
        Ok(engine)
    }

    /// Builder: replace the window.
    #[must_use]
    pub fn with_viewport(mut self, viewport: impl Viewport + 'static) -> Self {
        self.viewport = Box::new(viewport);
        self
    }

    /// Builder: replace the font metrics.
    #[must_use]
    pub fn with_font_metrics(mut self, fonts: impl FontMetrics + 'static) -> Self {
        self.fonts = Box::new(fonts);
        self
    }

    /// Builder: append a stylesheet.
    #[must_use]
    pub fn with_stylesheet(mut self, sheet: Stylesheet) -> Self {
        self.add_stylesheet(Arc::new(sheet));
        self
    }

    /// Append a stylesheet; later sheets win ties.
    pub fn add_stylesheet(&mut self, sheet: Arc<Stylesheet>) {
        self.sheets.push(sheet);
        self.invalidate();
    }

    /// Remove every stylesheet.
    pub fn clear_stylesheets(&mut self) {
        self.sheets.clear();
        self.invalidate();
    }

    /// The document.
    #[must_use]
    pub const fn tree(&self) -> &'a DomTree {
        self.tree
    }

    /// The browser personality.
    #[must_use]
    pub const fn browser(&self) -> &BrowserVersion {
        &self.browser
    }

    /// The stylesheets in application order.
    #[must_use]
    pub fn stylesheets(&self) -> &[Arc<Stylesheet>] {
        &self.sheets
    }

    /// The window.
    #[must_use]
    pub fn viewport(&self) -> &dyn Viewport {
        self.viewport.as_ref()
    }

    /// The font metrics.
    #[must_use]
    pub fn font_metrics(&self) -> &dyn FontMetrics {
        self.fonts.as_ref()
    }

    /// Interaction state.
    #[must_use]
    pub const fn state(&self) -> &ElementState {
        &self.state
    }

    /// The media list cache.
    #[must_use]
    pub const fn media_cache(&self) -> &MediaQueryCache {
        &self.media_cache
    }

    /// Set the focused element.
    pub fn set_focus(&mut self, node: Option<NodeId>) {
        self.state.focus = node;
        self.invalidate();
    }

    /// Set the element under the pointer.
    pub fn set_hover(&mut self, node: Option<NodeId>) {
        self.state.hover = node;
        self.invalidate();
    }

    /// Set the element being activated.
    pub fn set_active(&mut self, node: Option<NodeId>) {
        self.state.active = node;
        self.invalidate();
    }

    /// Set the URL fragment (without `#`).
    pub fn set_target(&mut self, fragment: Option<&str>) {
        self.state.target = fragment.map(str::to_string);
        self.invalidate();
    }

    /// Drop every cached style. Call after mutating the document.
    pub fn invalidate(&self) {
        let mut styles = self.styles.borrow_mut();
        if !styles.is_empty() {
            debug!("dropping {} cached styles", styles.len());
            styles.clear();
        }
    }

    /// Number of cached (element, pseudo-element) styles.
    #[must_use]
    pub fn cached_style_count(&self) -> usize {
        self.styles.borrow().len()
    }

    /// Whether a media list applies to the current window.
    #[must_use]
    pub fn media_active(&self, media: &str) -> bool {
        self.media_cache.is_active(media, self.viewport.as_ref())
    }

    /// Every rule that applies to `node` (or its `pseudo` element), in
    /// application order.
    #[must_use]
    pub fn matching_rules(&self, node: NodeId, pseudo: Option<&str>) -> Vec<MatchedRule<'_>> {
        let pseudo = pseudo.and_then(normalize_pseudo_element);
        let cx = MatchContext::new(self.tree, &self.state).with_pseudo_element(pseudo.as_deref());
        let media_active = |media: &str| self.media_active(media);
        let mut out = Vec::new();
        for sheet in &self.sheets {
            sheet.collect_matches(&cx, node, &media_active, &mut out);
        }
        out
    }

    /// The computed style of `node`, or of its pseudo-element
    /// (`"::before"`, `":after"`, ...).
    #[must_use]
    pub fn computed_style(&self, node: NodeId, pseudo: Option<&str>) -> ComputedDeclaration<'_> {
        let pseudo = pseudo.and_then(normalize_pseudo_element);
        ComputedDeclaration::new(self, self.style_data(node, pseudo.as_deref()))
    }

    /// The cached style for a normalized key, built on a miss.
    pub(crate) fn style_data(&self, node: NodeId, pseudo: Option<&str>) -> Rc<ComputedStyle> {
        let key = (node, pseudo.map(str::to_string));
        if let Some(hit) = self.styles.borrow().get(&key) {
            return Rc::clone(hit);
        }
        let style = Rc::new(cascade::compute(self, node, pseudo));
        let _ = self.styles.borrow_mut().insert(key, Rc::clone(&style));
        style
    }

    /// Parse `selectors` and check it against the personality's selector
    /// level.
    ///
    /// # Errors
    /// Syntax errors and constructs the personality does not support.
    pub fn validate_selector(&self, selectors: &str) -> Result<SelectorList, SelectorError> {
        let list = parse_selector_list(selectors)?;
        validate(&list, self.browser.selector_level())?;
        Ok(list)
    }

    /// Every attached element matching `selectors`, in document order.
    ///
    /// # Errors
    /// As [`validate_selector`](Self::validate_selector).
    pub fn query_selector_all(&self, selectors: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = self.validate_selector(selectors)?;
        let cx = MatchContext::new(self.tree, &self.state);
        let mut found = Vec::new();
        let mut stack = vec![self.tree.root()];
        while let Some(id) = stack.pop() {
            if self.tree.as_element(id).is_some() && list.matches(&cx, id) {
                found.push(id);
            }
            stack.extend(self.tree.children(id).iter().rev());
        }
        Ok(found)
    }

    /// The first element matching `selectors`.
    ///
    /// # Errors
    /// As [`validate_selector`](Self::validate_selector).
    pub fn query_selector(&self, selectors: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }
}
