// Host-side tests for canvas binding exclusivity.

use fx_core::{BindingRegistry, FxError};

#[test]
fn second_claim_on_live_canvas_fails() {
    let registry = BindingRegistry::new();
    let _guard = registry.claim("world").unwrap();
    assert_eq!(
        registry.claim("world").unwrap_err(),
        FxError::AlreadyBound("world".into())
    );
    assert!(registry.claim("grid-background").is_ok());
}

#[test]
fn dropping_the_guard_frees_the_canvas() {
    let registry = BindingRegistry::new();
    let guard = registry.claim("world").unwrap();
    assert!(registry.is_bound("world"));
    drop(guard);
    assert!(registry.is_empty());
    assert!(registry.claim("world").is_ok());
}

#[test]
fn clones_share_one_registry() {
    let registry = BindingRegistry::new();
    let other = registry.clone();
    let _guard = registry.claim("world").unwrap();
    assert!(other.claim("world").is_err());
    assert_eq!(other.len(), 1);
}

#[test]
fn guard_outliving_registry_is_harmless() {
    let registry = BindingRegistry::new();
    let guard = registry.claim("world").unwrap();
    drop(registry);
    assert_eq!(guard.key(), "world");
    drop(guard);
}
