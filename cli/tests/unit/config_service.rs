//! Configuration use-cases against an in-memory store.

#![allow(clippy::expect_used)]

use runway_cli::application::ports::ConfigStore;
use runway_cli::application::services::config_service::{
    load_effective_config, require_organization, resolve_workspace, set_value,
};
use runway_cli::application::services::operation::OrchestratorSettings;
use runway_cli::domain::RunwayConfig;

use crate::mocks::MemoryConfigStore;

#[test]
fn set_value_persists_valid_setting() {
    let store = MemoryConfigStore::default();

    let cfg = set_value(&store, "remote.organization", "acme").expect("set");

    assert_eq!(cfg.remote.organization.as_deref(), Some("acme"));
    let stored = store.load().expect("load");
    assert_eq!(stored.remote.organization.as_deref(), Some("acme"));
}

#[test]
fn set_value_rejects_unknown_key_without_saving() {
    let store = MemoryConfigStore::default();

    let err = set_value(&store, "remote.password", "hunter2").expect_err("should fail");

    assert!(err.to_string().contains("Unknown setting"), "got: {err}");
    assert!(store.config.lock().expect("lock").is_none());
}

#[test]
fn set_value_rejects_bad_interval() {
    let store = MemoryConfigStore::default();
    let err = set_value(&store, "polling.interval_ms", "5").expect_err("should fail");
    assert!(err.to_string().contains("polling.interval_ms"), "got: {err}");
}

#[test]
fn token_override_replaces_stored_token() {
    let store = MemoryConfigStore::default();
    set_value(&store, "remote.token", "stored").expect("set");

    let cfg = load_effective_config(&store, Some("from-env".to_string())).expect("load");
    assert_eq!(cfg.remote.token.as_deref(), Some("from-env"));

    let cfg = load_effective_config(&store, Some(String::new())).expect("load");
    assert_eq!(cfg.remote.token.as_deref(), Some("stored"));

    let cfg = load_effective_config(&store, None).expect("load");
    assert_eq!(cfg.remote.token.as_deref(), Some("stored"));
}

#[test]
fn stored_token_is_masked_on_read() {
    let mut cfg = RunwayConfig::default();
    cfg.set("remote.token", "secret-token").expect("set");
    assert_eq!(cfg.get("remote.token").as_deref(), Some("********"));
}

#[test]
fn workspace_flag_wins_over_default() {
    let mut cfg = RunwayConfig::default();
    assert!(resolve_workspace(&cfg, None).is_err());

    cfg.set("defaults.workspace", "staging").expect("set");
    assert_eq!(resolve_workspace(&cfg, None).expect("resolve"), "staging");
    assert_eq!(resolve_workspace(&cfg, Some("prod")).expect("resolve"), "prod");
}

#[test]
fn organization_is_required() {
    let mut cfg = RunwayConfig::default();
    let err = require_organization(&cfg).expect_err("should fail");
    assert!(err.to_string().contains("No organization configured"), "got: {err}");

    cfg.set("remote.organization", "acme").expect("set");
    assert_eq!(require_organization(&cfg).expect("org"), "acme");
}

#[test]
fn polling_settings_feed_the_orchestrator() {
    let mut cfg = RunwayConfig::default();
    cfg.set("polling.interval_ms", "250").expect("set");
    cfg.set("polling.max_failures", "2").expect("set");

    let settings = OrchestratorSettings::from(cfg.polling);

    assert_eq!(settings.poll_interval.as_millis(), 250);
    assert_eq!(settings.max_poll_failures, 2);
}
