//! Error types for selector validation and engine configuration.

use thiserror::Error;

use crate::selector::SelectorLevel;

/// [§ 3.7 Invalid selectors](https://www.w3.org/TR/selectors-4/#invalid)
///
/// "An invalid selector represents, and therefore matches, nothing."
///
/// Scripts however observe an invalid selector as a thrown `SyntaxError`,
/// so validation reports it as a distinct condition before any matching
/// takes place. Matching itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector text could not be read.
    #[error("invalid selector '{selector}': {reason}")]
    Syntax {
        /// The offending selector text.
        selector: String,
        /// What went wrong.
        reason: String,
    },

    /// A pseudo-class that is unknown or not available at this level.
    #[error("invalid selector: pseudo-class ':{name}' is not supported at {level:?}")]
    UnsupportedPseudoClass {
        /// Pseudo-class name without the colon.
        name: String,
        /// The level the selector was validated against.
        level: SelectorLevel,
    },

    /// A construct (combinator, attribute operator) newer than the active level.
    #[error("invalid selector: '{construct}' is not supported at {level:?}")]
    UnsupportedConstruct {
        /// Description of the construct.
        construct: String,
        /// The level the selector was validated against.
        level: SelectorLevel,
    },

    /// An `:nth-*()` argument that is not `odd`, `even` or `an+b`.
    #[error("invalid selector: malformed argument '{argument}' for ':{name}()'")]
    MalformedNth {
        /// Pseudo-class name without the colon.
        name: String,
        /// The raw argument.
        argument: String,
    },
}

/// Errors raised while turning an [`crate::EngineConfig`] into an engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No browser personality with this name.
    #[error("unknown browser personality '{0}'")]
    UnknownBrowser(String),

    /// No feature flag with this name.
    #[error("unknown feature flag '{0}'")]
    UnknownFeature(String),

    /// The configuration text is not valid JSON for [`crate::EngineConfig`].
    #[error("malformed engine configuration: {0}")]
    Json(#[from] serde_json::Error),
}
