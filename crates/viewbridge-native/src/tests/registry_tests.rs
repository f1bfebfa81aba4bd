use super::*;
use crate::tests_support::StubManager;
use std::sync::atomic::{AtomicUsize, Ordering};

fn stub_manager(name: &str) -> Arc<dyn ViewManager> {
    Arc::new(StubManager::new(name))
}

#[test]
fn eager_registry_round_trips_names() {
    let registry =
        ViewManagerRegistry::new([stub_manager("View"), stub_manager("Text"), stub_manager("Image")]).expect("registry");
    let names: Vec<String> = registry.view_manager_names().into_iter().collect();
    assert_eq!(names, vec!["View", "Text", "Image"]);
    for name in &names {
        assert_eq!(registry.get(name).expect("registered").name(), name);
    }
    assert!(registry.has_component("Text"));
}

#[test]
fn unknown_name_is_none_then_error() {
    let registry = ViewManagerRegistry::new([stub_manager("View")]).expect("registry");
    assert!(registry.view_manager("Slider").is_none());
    assert_eq!(
        registry.get("Slider").err(),
        Some(ViewError::UnknownViewType {
            name: "Slider".into()
        })
    );
}

#[test]
fn duplicate_names_are_rejected() {
    let result = ViewManagerRegistry::new([stub_manager("View"), stub_manager("View")]);
    assert_eq!(
        result.err().map(|err| err.to_string()),
        Some("view manager `View` is registered more than once".to_string())
    );

    let mut lazy = LazyViewManagers::new();
    lazy.register("View", || stub_manager("View")).expect("first");
    assert_eq!(
        lazy.register("View", || stub_manager("View")),
        Err(ViewError::DuplicateViewManager {
            name: "View".into()
        })
    );
}

#[test]
fn lazy_factories_run_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let lazy = LazyViewManagers::new()
        .with("Text", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            stub_manager("Text")
        })
        .expect("register");
    let registry = ViewManagerRegistry::lazy(lazy);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let first = registry.get("Text").expect("resolves");
    let second = registry.get("Text").expect("cached");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(registry.get("View").is_err());
    assert_eq!(
        registry.view_manager_names().into_iter().collect::<Vec<_>>(),
        vec!["Text"]
    );
}
