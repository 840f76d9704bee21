//! Engine configuration.

/// Host-decided knobs for a firing session.
///
/// The engine itself imposes no firing bound; rule sets that never
/// stabilise run until the host's resource limits abort them. A host
/// that meters execution can set `max_firings` instead and treat the
/// resulting limit error as its abort signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    /// Abort after this many rule firings in one session, if set.
    pub max_firings: Option<usize>,
    /// When true, passing an unknown handle to fact deletion or to the
    /// update notice is an error instead of a silent no-op.
    pub strict_delete: bool,
}

impl EngineConfig {
    /// Creates the default (permissive, unbounded) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the firing bound.
    #[must_use]
    pub const fn with_max_firings(mut self, limit: usize) -> Self {
        self.max_firings = Some(limit);
        self
    }

    /// Makes unknown handles an error for deletion and update notices.
    #[must_use]
    pub const fn with_strict_delete(mut self, strict: bool) -> Self {
        self.strict_delete = strict;
        self
    }
}
