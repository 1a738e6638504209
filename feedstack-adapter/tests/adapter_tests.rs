use std::sync::Arc;

use feedstack_adapter::mock::{FailingAdapter, RecordingAdapter};
use feedstack_adapter::{
    adapter_chain, AdapterContext, AdapterDescriptor, AdapterKind, AdapterRegistry, ChainBoundary,
    FeedAdapter, FeedError, MemoryAdapter, PassThroughWrapper, ID_PROPERTY, MEMORY_ADAPTER,
    PASSTHROUGH_WRAPPER,
};
use feedstack_config::ServerConfig;
use feedstack_model::Entity;
use feedstack_types::RequestContext;
use pretty_assertions::assert_eq;

fn ctx() -> RequestContext {
    RequestContext::new("example.com", "contacts").with_viewer("user1@example.com")
}

fn factory_ctx() -> AdapterContext {
    AdapterContext {
        namespace: "example.com".into(),
        adapter_name: "contacts".into(),
        server: Arc::new(ServerConfig::default()),
    }
}

// ── MemoryAdapter ────────────────────────────────────────────────

#[tokio::test]
async fn memory_crud_roundtrip() {
    let adapter = MemoryAdapter::new();
    let ctx = ctx();
    assert!(adapter.is_empty().await);

    let created = adapter
        .create_entry(&ctx, Entity::new().with("id", "1").with("name", "Ada"))
        .await
        .unwrap();
    assert_eq!(created.get_str("name"), Some("Ada"));
    assert_eq!(adapter.len().await, 1);

    let updated = adapter
        .update_entry(&ctx, "1", Entity::new().with("name", "Ada Lovelace"))
        .await
        .unwrap();
    assert_eq!(updated.get_str(ID_PROPERTY), Some("1"));
    assert_eq!(adapter.retrieve_entry(&ctx, "1").await.unwrap(), updated);

    adapter.delete_entry(&ctx, "1").await.unwrap();
    assert!(adapter.is_empty().await);
}

#[tokio::test]
async fn memory_assigns_missing_ids() {
    let adapter = MemoryAdapter::new();
    let ctx = ctx();
    let created = adapter
        .create_entry(&ctx, Entity::new().with("name", "Grace"))
        .await
        .unwrap();

    let id = created.get_str(ID_PROPERTY).unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(adapter.retrieve_entry(&ctx, &id).await.unwrap(), created);
}

#[tokio::test]
async fn memory_rejects_duplicate_ids() {
    let adapter = MemoryAdapter::new();
    let ctx = ctx();
    adapter.create_entry(&ctx, Entity::new().with("id", "1")).await.unwrap();
    let err = adapter
        .create_entry(&ctx, Entity::new().with("id", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::InvalidEntry(_)), "{err:?}");
}

#[tokio::test]
async fn memory_missing_entries_are_not_found() {
    let adapter = MemoryAdapter::new();
    let ctx = ctx();

    assert!(matches!(
        adapter.retrieve_entry(&ctx, "9").await.unwrap_err(),
        FeedError::NotFound(ref id) if id == "9"
    ));
    assert!(matches!(
        adapter.update_entry(&ctx, "9", Entity::new()).await.unwrap_err(),
        FeedError::NotFound(_)
    ));
    assert!(matches!(
        adapter.delete_entry(&ctx, "9").await.unwrap_err(),
        FeedError::NotFound(_)
    ));
}

#[tokio::test]
async fn memory_seeds_from_config_in_order() {
    let seed = "<feed>\
        <entry repeatable=\"true\"><id>1</id><name>Ada</name></entry>\
        <entry><id>2</id><name>Grace</name></entry>\
        </feed>";
    let adapter = MemoryAdapter::from_config(Some(seed)).unwrap();

    let feed = adapter.retrieve_feed(&ctx()).await.unwrap();
    let names: Vec<_> = feed.iter().filter_map(|e| e.get_str("name")).collect();
    assert_eq!(names, vec!["Ada", "Grace"]);
    assert_eq!(adapter.descriptor().config.as_deref(), Some(seed));
}

#[test]
fn memory_seed_errors() {
    let cases = [
        "<feed><entry><name>no id</name></entry></feed>",
        "<feed><entry>text only</entry></feed>",
        "<feed><entry><id>1</id></entry><entry><id>1</id></entry></feed>",
    ];
    for seed in cases {
        let err = MemoryAdapter::from_config(Some(seed)).err().unwrap();
        assert!(matches!(err, FeedError::InvalidEntry(_)), "{seed}: {err:?}");
    }

    let err = MemoryAdapter::from_config(Some("<feed><entry>")).err().unwrap();
    assert!(matches!(err, FeedError::Codec(_)), "{err:?}");
}

#[test]
fn memory_blank_config_seeds_nothing() {
    assert!(MemoryAdapter::from_config(None).is_ok());
    assert!(MemoryAdapter::from_config(Some("  ")).is_ok());
}

// ── Decorators ───────────────────────────────────────────────────

#[tokio::test]
async fn passthrough_forwards_every_operation() {
    let recording = Arc::new(RecordingAdapter::new());
    let wrapper = PassThroughWrapper::new("audit", recording.clone(), Some("<entity/>".into()));
    let ctx = ctx();

    wrapper.retrieve_feed(&ctx).await.unwrap();
    wrapper.retrieve_entry(&ctx, "a").await.unwrap();
    wrapper.create_entry(&ctx, Entity::new()).await.unwrap();
    wrapper.update_entry(&ctx, "b", Entity::new()).await.unwrap();
    wrapper.delete_entry(&ctx, "c").await.unwrap();

    assert_eq!(
        recording.calls(),
        vec![
            "retrieve_feed",
            "retrieve_entry:a",
            "create_entry",
            "update_entry:b",
            "delete_entry:c",
        ]
    );
    assert_eq!(wrapper.config(), Some("<entity/>"));
}

#[tokio::test]
async fn errors_propagate_unchanged() {
    let wrapper = PassThroughWrapper::new("audit", Arc::new(FailingAdapter::default()), None);
    let err = wrapper.retrieve_feed(&ctx()).await.unwrap_err();
    assert!(matches!(err, FeedError::Backend(_)), "{err:?}");
    assert!(!err.is_resolution_failure());
}

#[test]
fn chain_lists_layers_outermost_first() {
    let base: Arc<dyn FeedAdapter> = Arc::new(MemoryAdapter::new());
    let boundary: Arc<dyn FeedAdapter> = Arc::new(ChainBoundary::new("contacts", base.clone()));
    let outer = PassThroughWrapper::new("audit", boundary, None);

    let chain = adapter_chain(&outer);
    assert_eq!(
        chain,
        vec![
            AdapterDescriptor::wrapper("audit", None),
            AdapterDescriptor::boundary("contacts"),
            AdapterDescriptor::base(MEMORY_ADAPTER, None),
        ]
    );
    let rendered: Vec<String> = chain.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["audit", "[contacts]", "base(memory)"]);
}

#[test]
fn boundary_exposes_shared_target() {
    let base: Arc<dyn FeedAdapter> = Arc::new(MemoryAdapter::new());
    let boundary = ChainBoundary::new("contacts", base.clone());
    assert!(Arc::ptr_eq(boundary.resolved_target(), &base));
    assert_eq!(boundary.descriptor().kind, AdapterKind::Boundary);
}

// ── Registry ─────────────────────────────────────────────────────

#[test]
fn builtins_are_registered() {
    let registry = AdapterRegistry::with_builtins();
    assert_eq!(registry.adapter_ids(), vec![MEMORY_ADAPTER]);
    assert_eq!(registry.wrapper_ids(), vec![PASSTHROUGH_WRAPPER]);
    assert!(registry.is_wrapper(PASSTHROUGH_WRAPPER));
    assert!(!registry.is_wrapper(MEMORY_ADAPTER));
}

#[test]
fn base_and_wrapper_ids_are_separate() {
    let mut registry = AdapterRegistry::new();
    registry
        .register_adapter("dual", |_ctx: &AdapterContext, _config: Option<&str>| {
            Ok(Arc::new(MemoryAdapter::new()))
        })
        .register_wrapper(
            "dual",
            |_ctx: &AdapterContext, inner: Arc<dyn FeedAdapter>, _config: Option<&str>| {
                Ok(Arc::new(PassThroughWrapper::new("dual", inner, None)))
            },
        );

    let base = registry
        .adapter_factory("dual")
        .unwrap()
        .create(&factory_ctx(), None)
        .unwrap();
    assert_eq!(base.descriptor().kind, AdapterKind::Base);

    let wrapped = registry
        .wrapper_factory("dual")
        .unwrap()
        .wrap(&factory_ctx(), base, None)
        .unwrap();
    assert_eq!(wrapped.descriptor().kind, AdapterKind::Wrapper);
    assert!(registry.adapter_factory("missing").is_none());
}

#[test]
fn later_registration_replaces_factory() {
    let mut registry = AdapterRegistry::with_builtins();
    registry.register_adapter(MEMORY_ADAPTER, |_ctx: &AdapterContext, _config: Option<&str>| {
        Err(FeedError::Backend("disabled".into()))
    });
    let result = registry
        .adapter_factory(MEMORY_ADAPTER)
        .unwrap()
        .create(&factory_ctx(), None);
    assert!(matches!(result, Err(FeedError::Backend(_))));
}
