//! Per-request context handed down a decorator chain.

/// What the protocol front end extracted from a request before
/// dispatching it to an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Namespace (tenant domain) the feed lives in.
    pub namespace: String,
    /// Feed the request targets.
    pub feed_id: String,
    /// Authenticated principal, or `None` for anonymous requests.
    pub viewer: Option<String>,
}

impl RequestContext {
    /// Creates an anonymous context.
    pub fn new(namespace: impl Into<String>, feed_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            feed_id: feed_id.into(),
            viewer: None,
        }
    }

    /// Returns a copy of this context authenticated as `viewer`.
    #[must_use]
    pub fn with_viewer(mut self, viewer: impl Into<String>) -> Self {
        self.viewer = Some(viewer.into());
        self
    }

    /// The authenticated principal, if any.
    pub fn viewer(&self) -> Option<&str> {
        self.viewer.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.viewer.is_some()
    }
}
