//! Trusted-context startup and whitelisted feeds.

use portal_runtime::config::{Credentials, PortalConfig, SERVICE_KEY_VAR};
use portal_runtime::gate::{PrivilegedGate, TrustedServer};
use portal_runtime::memory::{MemoryConnector, MemoryStore};
use portal_runtime::PortalError;
use portal_types::ErrorCode;
use serde_json::json;
use std::sync::Arc;

fn fixture() -> Arc<MemoryStore> {
    let store = MemoryStore::from_fixture(&json!({
        "terms": [
            { "id": "t2", "start_date": "2027-01-08" },
            { "id": "t1", "start_date": "2026-09-01" },
        ],
        "news": [
            { "id": "n1", "published_at": "2026-09-02T08:00:00Z", "profile_id": "someone" },
            { "id": "n2", "published_at": "2026-10-01T08:00:00Z" },
        ],
        "gallery": [
            { "id": "g1", "spotlight": true, "created_at": "2026-05-01T00:00:00Z" },
            { "id": "g2", "spotlight": false, "created_at": "2026-06-01T00:00:00Z" },
        ],
    }))
    .expect("fixture");
    Arc::new(store)
}

#[test]
fn missing_service_key_fails_closed_with_zero_store_operations() {
    let store = fixture();
    let connector = MemoryConnector::new(Arc::clone(&store));

    for credentials in [
        Credentials::default(),
        Credentials::from_values(Some("public-key".into()), None),
        Credentials::from_values(None, Some("   ".into())),
    ] {
        let err = TrustedServer::start(PortalConfig::default(), &credentials, &connector)
            .unwrap_err();
        assert!(matches!(err, PortalError::Configuration(_)), "got: {err}");
        assert!(err.to_string().contains(SERVICE_KEY_VAR));

        let err = PrivilegedGate::open(&credentials, &connector).unwrap_err();
        assert_eq!(err.code(), "CONFIG_INVALID");
        assert!(!err.is_recoverable());
    }

    assert_eq!(connector.connect_calls(), 0);
    assert_eq!(store.operation_count(), 0);
}

#[test]
fn feeds_bypass_row_scope() {
    let store = fixture();
    let connector = MemoryConnector::new(Arc::clone(&store));
    let credentials = Credentials::from_values(None, Some("service-role-key".into()));
    let server = TrustedServer::start(PortalConfig::default(), &credentials, &connector).unwrap();

    let terms = server.list_terms().unwrap();
    assert_eq!(terms[0]["id"], "t1");
    assert_eq!(terms[1]["id"], "t2");

    let news = server.news_feed(10).unwrap();
    assert_eq!(news.len(), 2);
    assert_eq!(news[0]["id"], "n2");

    let gallery = server.spotlight_gallery(10).unwrap();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0]["id"], "g1");

    assert_eq!(connector.connect_calls(), 1);
    assert_eq!(store.operation_count(), 3);
}

#[test]
fn credential_never_appears_in_errors_or_debug() {
    let key = "service-role-key-4f2a";
    let store = fixture();
    let connector = MemoryConnector::new(Arc::clone(&store));
    let credentials = Credentials::from_values(None, Some(key.into()));
    let server = TrustedServer::start(PortalConfig::default(), &credentials, &connector).unwrap();

    store.fail_with(format!("401: apikey {key} rejected"));
    let err = server.news_feed(5).unwrap_err();

    assert_eq!(err.code(), "UPSTREAM_UNAVAILABLE");
    assert!(!err.to_string().contains(key), "got: {err}");
    assert!(!format!("{err:?}").contains(key));
    assert!(!format!("{server:?}").contains(key));
    assert!(!format!("{credentials:?}").contains(key));
}
