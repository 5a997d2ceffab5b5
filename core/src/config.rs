//! Editor configuration: the one real resource limit this crate enforces.
//!
//! This format has no recursion to speak of — TOML values don't nest TOML
//! values the way an expression grammar nests expressions. What it does have
//! is structural traversal (`find_next` threading a cursor across a span)
//! that can, on malformed or adversarial input, stall: a cursor that never
//! advances turns a bounded loop into an infinite one. [`EditorConfig`]
//! bounds that, the way `ParseConfig`/`RecursionGuard` bound nested-parse
//! depth in a conventional recursive-descent parser.
//!
//! # Example
//!
//! ```
//! use tomledit_core::config::EditorConfig;
//!
//! let config = EditorConfig::default();
//! assert_eq!(config.max_iterations, 1000);
//!
//! let config = EditorConfig::new().with_max_iterations(64);
//! assert_eq!(config.max_iterations, 64);
//! ```

/// Configuration for document/span traversal limits.
///
/// # Default Values
///
/// | Setting | Default | Rationale |
/// |---------|---------|-----------|
/// | `max_iterations` | 1000 | Matches the fuzz harness's depth guard |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of structural elements `find_next` (or a lexer
    /// consumer) will walk through before giving up and treating the
    /// cursor as stuck.
    ///
    /// Default: 1000.
    pub max_iterations: usize,
}

impl Default for EditorConfig {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl EditorConfig {
    /// Default configuration, usable in const contexts.
    pub const DEFAULT: Self = Self { max_iterations: 1000 };

    /// Creates a new configuration with default values.
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the maximum iteration count.
    #[inline]
    pub const fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

/// Tracks how many structural elements a traversal has consumed so far.
///
/// Pairs with [`EditorConfig::max_iterations`] the way a recursion guard
/// pairs with a max-depth setting, except this counts loop iterations
/// rather than nesting depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterationGuard {
    count: usize,
}

impl IterationGuard {
    /// Creates a new guard with a zero count.
    #[inline]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Current iteration count.
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Records one more step. Returns an error once `limit` is exceeded.
    #[inline]
    pub fn step(&mut self, limit: usize) -> crate::error::Result<()> {
        self.count = self.count.saturating_add(1);
        if self.count > limit {
            Err(crate::error::Error::Syntax {
                message: "cursor did not advance within the iteration limit",
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_iterations_is_one_thousand() {
        let config = EditorConfig::default();
        assert_eq!(config.max_iterations, 1000);
    }

    #[test]
    fn builder_overrides_default() {
        let config = EditorConfig::new().with_max_iterations(5);
        assert_eq!(config.max_iterations, 5);
    }

    #[test]
    fn guard_errors_past_limit() {
        let mut guard = IterationGuard::new();
        for _ in 0..3 {
            guard.step(3).unwrap();
        }
        assert_eq!(guard.count(), 3);
        assert!(guard.step(3).is_err());
    }
}
