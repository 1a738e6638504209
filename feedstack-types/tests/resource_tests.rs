use feedstack_types::{RequestContext, ResourcePath};

// ── ResourcePath ─────────────────────────────────────────────────

#[test]
fn feed_path_renders_as_slash() {
    assert_eq!(ResourcePath::Feed.to_string(), "/");
    assert!(ResourcePath::Feed.is_feed());
    assert_eq!(ResourcePath::Feed.entry_id(), None);
}

#[test]
fn entry_path_renders_with_leading_slash() {
    let path = ResourcePath::Entry("123".into());
    assert_eq!(path.to_string(), "/123");
    assert_eq!(path.entry_id(), Some("123"));
    assert!(!path.is_feed());
}

#[test]
fn for_entry_maps_none_to_feed() {
    assert_eq!(ResourcePath::for_entry(None), ResourcePath::Feed);
    assert_eq!(
        ResourcePath::for_entry(Some("abc")),
        ResourcePath::Entry("abc".into())
    );
}

#[test]
fn parse_accepts_feed_and_entry_paths() {
    assert_eq!(ResourcePath::parse("/").unwrap(), ResourcePath::Feed);
    assert_eq!(ResourcePath::parse(" /42 ").unwrap(), ResourcePath::Entry("42".into()));
}

#[test]
fn parse_rejects_malformed_paths() {
    assert!(ResourcePath::parse("42").is_err());
    assert!(ResourcePath::parse("/a/b").is_err());
    assert!(ResourcePath::parse("").is_err());
}

// ── RequestContext ───────────────────────────────────────────────

#[test]
fn new_context_is_anonymous() {
    let ctx = RequestContext::new("example.com", "contacts");
    assert_eq!(ctx.namespace, "example.com");
    assert_eq!(ctx.feed_id, "contacts");
    assert_eq!(ctx.viewer(), None);
    assert!(!ctx.is_authenticated());
}

#[test]
fn with_viewer_authenticates() {
    let ctx = RequestContext::new("example.com", "contacts").with_viewer("jane@example.com");
    assert_eq!(ctx.viewer(), Some("jane@example.com"));
    assert!(ctx.is_authenticated());
}
