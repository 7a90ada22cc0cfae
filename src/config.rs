//! Knobs shared by the decoder and the transform layer.

use chrono::{DateTime, Utc};

/// Default bound on group and pair nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for [`crate::lexer::Lexer`] and [`crate::parser::Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Deepest allowed nesting of `( ... )` groups and chained `a:b:c` pairs.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Everything a cast may depend on besides the raw text.
///
/// The library never reads the system clock: relative dates such as
/// `@yesterday` are resolved against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformContext {
    pub now: DateTime<Utc>,
}

impl TransformContext {
    pub fn at(now: DateTime<Utc>) -> Self {
        TransformContext { now }
    }
}
