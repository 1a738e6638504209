use feedstack_config::{
    AdapterConfig, ConfigError, FeedConfig, ImplicitWrapperPolicy, MixinConfig, ServerConfig,
};
use pretty_assertions::assert_eq;
use std::borrow::Cow;

fn wrapper_ids(chain: &[&MixinConfig]) -> Vec<String> {
    chain
        .iter()
        .map(|m| m.wrapper_class_id.clone().unwrap_or_default())
        .collect()
}

// ── Mixin documents ──────────────────────────────────────────────

#[test]
fn mixin_from_document() {
    let doc = "<mixin><adapterName>contacts</adapterName>\
               <wrapperName>access-control</wrapperName>\
               <wrapperConfig>@acl/contacts.xml</wrapperConfig></mixin>";
    let mixin = MixinConfig::from_document(doc).unwrap();
    assert_eq!(mixin.target_adapter_name.as_deref(), Some("contacts"));
    assert_eq!(mixin.wrapper_class_id.as_deref(), Some("access-control"));
    assert_eq!(mixin.wrapper_config.as_deref(), Some("@acl/contacts.xml"));
    assert!(mixin.is_redirect());
}

#[test]
fn mixin_nested_under_entity_root() {
    let doc = "<entity><mixin><wrapperName>passthrough</wrapperName></mixin></entity>";
    let mixin = MixinConfig::from_document(doc).unwrap();
    assert_eq!(mixin, MixinConfig::wrapper("passthrough", None));
}

#[test]
fn mixin_rejects_foreign_root() {
    let err = MixinConfig::from_document("<adapter><name>x</name></adapter>").unwrap_err();
    assert!(matches!(err, ConfigError::UnexpectedRoot { .. }), "{err:?}");
}

#[test]
fn mixin_document_round_trip() {
    let mixin = MixinConfig::redirect("base")
        .with_wrapper("passthrough", Some("<entity><k>v &amp; w</k></entity>".to_string()));
    let back = MixinConfig::from_document(&mixin.to_document()).unwrap();
    assert_eq!(back, mixin);
}

#[test]
fn malformed_mixin_is_codec_error() {
    let err = MixinConfig::from_document("<mixin><adapterName>x</mixin>").unwrap_err();
    assert!(matches!(err, ConfigError::Codec(_)), "{err:?}");
}

// ── Adapter documents ────────────────────────────────────────────

#[test]
fn adapter_from_document() {
    let doc = r#"<adapter>
        <name>contacts</name>
        <type>memory</type>
        <configValue><feed><entry repeatable="true"><id>1</id></entry></feed></configValue>
        <mixins repeatable="true"><wrapperName>w1</wrapperName></mixins>
        <mixins><wrapperName>w2</wrapperName><wrapperConfig>cfg</wrapperConfig></mixins>
        <implicitMixins><wrapperName>audit</wrapperName></implicitMixins>
    </adapter>"#;
    let config = AdapterConfig::from_document(doc).unwrap();
    assert_eq!(config.name, "contacts");
    assert_eq!(config.implementation_id, "memory");
    assert_eq!(
        config.raw_config.as_deref(),
        Some("<feed><entry repeatable=\"true\"><id>1</id></entry></feed>")
    );
    assert_eq!(config.explicit_wrappers.len(), 2);
    assert_eq!(config.explicit_wrappers[1].wrapper_config.as_deref(), Some("cfg"));
    assert_eq!(config.implicit_wrappers, vec![MixinConfig::wrapper("audit", None)]);
    assert!(!config.is_wrapper);
}

#[test]
fn adapter_class_name_alias() {
    let doc = "<adapter><name>a</name><adapterClassName>memory</adapterClassName></adapter>";
    assert_eq!(AdapterConfig::from_document(doc).unwrap().implementation_id, "memory");
}

#[test]
fn adapter_requires_name_and_type() {
    let err = AdapterConfig::from_document("<adapter><type>memory</type></adapter>").unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "name", .. }), "{err:?}");

    let err = AdapterConfig::from_document("<adapter><name>a</name></adapter>").unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "type", .. }), "{err:?}");
}

#[test]
fn bare_text_mixin_is_rejected() {
    let doc = "<adapter><name>a</name><type>memory</type>\
               <mixins repeatable=\"true\">access-control</mixins></adapter>";
    let err = AdapterConfig::from_document(doc).unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingField { document: "mixin", field: "wrapperName" }),
        "{err:?}"
    );

    let doc = "<adapter><name>a</name><type>memory</type>\
               <mixins><wrapperName>w1</wrapperName></mixins>\
               <implicitMixins>audit</implicitMixins></adapter>";
    assert!(AdapterConfig::from_document(doc).is_err());
}

#[test]
fn empty_mixin_entries_are_skipped() {
    let doc = "<adapter><name>a</name><type>memory</type><mixins/></adapter>";
    let config = AdapterConfig::from_document(doc).unwrap();
    assert!(config.explicit_wrappers.is_empty());
}

#[test]
fn repeated_config_value_is_rejected() {
    let doc = "<adapter><name>a</name><type>memory</type>\
               <configValue>one</configValue><configValue>two</configValue></adapter>";
    let err = AdapterConfig::from_document(doc).unwrap_err();
    assert!(
        matches!(err, ConfigError::RepeatedField { document: "adapter", field: "configValue" }),
        "{err:?}"
    );
}

#[test]
fn adapter_document_round_trip() {
    let config = AdapterConfig::new("contacts", "memory")
        .with_config("<feed/>")
        .with_wrapper(MixinConfig::wrapper("w1", None))
        .with_wrapper(MixinConfig::wrapper("w2", Some("x".into())))
        .with_implicit_wrapper(MixinConfig::wrapper("audit", None));
    assert_eq!(AdapterConfig::from_document(&config.to_document()).unwrap(), config);
}

#[test]
fn indirection_record_round_trip() {
    let config = AdapterConfig::indirection("guarded", "access-control", "contacts", Some("@acl.xml".into()));
    assert!(config.is_wrapper);
    let mixin = MixinConfig::from_document(config.raw_config.as_deref().unwrap()).unwrap();
    assert_eq!(mixin.target_adapter_name.as_deref(), Some("contacts"));
    assert_eq!(mixin.wrapper_config.as_deref(), Some("@acl.xml"));
    assert_eq!(AdapterConfig::from_document(&config.to_document()).unwrap(), config);
}

// ── Wrapper lists ────────────────────────────────────────────────

fn layered() -> AdapterConfig {
    AdapterConfig::new("a", "memory")
        .with_wrapper(MixinConfig::wrapper("e1", None))
        .with_wrapper(MixinConfig::wrapper("e2", None))
        .with_implicit_wrapper(MixinConfig::wrapper("i1", None))
}

#[test]
fn wrapper_chain_follows_policy() {
    let config = layered();
    assert_eq!(wrapper_ids(&config.wrapper_chain(ImplicitWrapperPolicy::Skip)), vec!["e1", "e2"]);
    assert_eq!(
        wrapper_ids(&config.wrapper_chain(ImplicitWrapperPolicy::Before)),
        vec!["i1", "e1", "e2"]
    );
    assert_eq!(
        wrapper_ids(&config.wrapper_chain(ImplicitWrapperPolicy::After)),
        vec!["e1", "e2", "i1"]
    );
}

#[test]
fn stripping_implicit_wrappers_leaves_original() {
    let config = layered();
    let stripped = config.without_implicit_wrappers();
    assert!(matches!(stripped, Cow::Owned(_)));
    assert!(stripped.implicit_wrappers.is_empty());
    assert_eq!(stripped.explicit_wrappers, config.explicit_wrappers);
    assert_eq!(config.implicit_wrappers.len(), 1);

    let plain = AdapterConfig::new("b", "memory");
    assert!(matches!(plain.without_implicit_wrappers(), Cow::Borrowed(_)));
}

// ── Feed documents ───────────────────────────────────────────────

#[test]
fn feed_document_round_trip() {
    let feed = FeedConfig::new("contacts", "guarded-contacts");
    let doc = feed.to_document();
    assert_eq!(doc, "<feed><adapterName>guarded-contacts</adapterName></feed>");
    assert_eq!(FeedConfig::from_document("contacts", &doc).unwrap(), feed);
}

#[test]
fn feed_requires_adapter_name() {
    let err = FeedConfig::from_document("f", "<feed/>").unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "adapterName", .. }));
}

// ── Server settings ──────────────────────────────────────────────

#[test]
fn settings_from_toml() {
    let config = ServerConfig::from_toml_str(
        r#"
        [server]
        config_root = "/srv/feedstack"

        [wrappers]
        implicit = "after"

        [access_control]
        enabled = false
        "#,
    )
    .unwrap();
    assert_eq!(config.config_root, std::path::PathBuf::from("/srv/feedstack"));
    assert_eq!(config.implicit_wrappers, ImplicitWrapperPolicy::After);
    assert!(!config.access_control_enabled);
}

#[test]
fn settings_sections_are_optional() {
    assert_eq!(ServerConfig::from_toml_str("").unwrap(), ServerConfig::default());
    let config = ServerConfig::from_toml_str("[wrappers]\nimplicit = \"before\"\n").unwrap();
    assert_eq!(config.implicit_wrappers, ImplicitWrapperPolicy::Before);
    assert!(config.access_control_enabled);
}

#[test]
fn bad_settings_are_reported_strictly() {
    let err = ServerConfig::from_toml_str("[wrappers]\nimplicit = \"sideways\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Settings(_)));
}

#[test]
fn load_from_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ServerConfig::load_from(dir.path().join("missing.toml")), ServerConfig::default());

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "not = [valid").unwrap();
    assert_eq!(ServerConfig::load_from(&bad), ServerConfig::default());

    let good = dir.path().join("feedstack.toml");
    std::fs::write(&good, "[access_control]\nenabled = false\n").unwrap();
    assert!(!ServerConfig::load_from(&good).access_control_enabled);
}
