//! Selector matching, cascade, computed styles and layout approximation
//! for the mimic headless browser.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Parsing, specificity and right-to-left matching with backtracking
//!   - Attribute operators, structural and state pseudo-classes, `:not()`, `:lang()`
//!   - Validation against the CSS2/CSS3/CSS4 level of a browser personality
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Importance, specificity and order of appearance
//!   - Built-in element defaults and the `style` attribute
//!   - Inheritance, `@import` and `@media`
//!
//! - **Declarations** ([CSSOM § 6.6](https://www.w3.org/TR/cssom-1/#the-cssstyledeclaration-interface))
//!   - Inline, rule and computed variants behind [`StyleDeclaration`]
//!   - Shorthand decomposition for box, border and background properties
//!
//! - **Layout approximation** ([CSS Box Model Level 3](https://www.w3.org/TR/css-box-3/))
//!   - Width, height, top and left estimates with fixed per-personality constants
//!
//! # Not Implemented
//!
//! - Tokenizing stylesheet text: callers hand in parsed rules
//! - Real line layout, font shaping or painting

/// Browser personalities and feature flags.
pub mod browser;
/// Cascade merge per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Engine configuration.
pub mod config;
/// Style declaration variants per [CSSOM](https://www.w3.org/TR/cssom-1/).
pub mod declaration;
/// Known properties, their defaults and shorthand sources.
pub mod definition;
/// Element classification for defaults and intrinsic sizes.
pub mod element_kind;
/// The per-document style engine.
pub mod engine;
/// Error types.
pub mod error;
/// Rule indexing and per-element rule collection.
pub mod index;
/// Geometry estimates per [CSS 2.1 § 10](https://www.w3.org/TR/CSS2/visudet.html).
pub mod layout;
/// Media queries per [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/).
pub mod media;
/// Window and font metric collaborators.
pub mod oracle;
/// Selector parsing, validation and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Stylesheets, rules and declaration blocks.
pub mod stylesheet;
/// Value parsing helpers per [CSS Values Level 4](https://www.w3.org/TR/css-values-4/).
pub mod values;

// Re-exports for convenience
pub use browser::{BrowserVersion, Feature, FeatureOracle};
pub use config::EngineConfig;
pub use declaration::{
    ComputedDeclaration, ComputedStyle, DETACHED, InlineStyle, Priority, RuleStyle,
    StyleDeclaration, StyleEntry, StyleSnapshot,
};
pub use definition::Definition;
pub use element_kind::ElementKind;
pub use engine::StyleEngine;
pub use error::{ConfigError, SelectorError};
pub use index::MatchedRule;
pub use media::{MediaQueryCache, MediaQueryList, parse_media_list};
pub use oracle::{ApproximateFontMetrics, FontMetrics, Screen, Viewport};
pub use selector::{
    ComplexSelector, ElementState, MatchContext, SelectorLevel, SelectorList, Specificity,
    parse_selector, parse_selector_list,
};
pub use stylesheet::{DeclarationBlock, Rule, Stylesheet};
pub use values::BoxSide;
