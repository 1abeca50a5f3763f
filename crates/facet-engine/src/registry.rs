//! The widget instance registry.
//!
//! Several independent facet widgets can coexist on one page. Each gets an
//! explicit instance id, and every lookup threads that id rather than relying
//! on ambient state. The registry owns each controller's store subscription,
//! so tearing an instance down detaches it from its store.

use std::collections::BTreeMap;

use facet_state::{SearchState, Subscription};

use crate::{AggregationController, EngineError};

/// One registered widget instance.
struct Instance {
    /// The instance's controller handle.
    controller: AggregationController,
    /// The controller's store subscription; dropped on teardown.
    _subscription: Subscription<SearchState>,
}

/// A lifecycle-scoped registry of widget instances.
///
/// Construct one per page/session, register widgets as they mount, and tear
/// them down as they unmount.
#[derive(Default)]
pub struct WidgetRegistry {
    /// Live instances keyed by id.
    instances: BTreeMap<String, Instance>,
}

impl WidgetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a widget instance under an id.
    ///
    /// `subscription` is the controller's store attachment; the registry keeps
    /// it alive until [`Self::teardown`].
    pub fn register(
        &mut self,
        id: &str,
        controller: AggregationController,
        subscription: Subscription<SearchState>,
    ) -> Result<(), EngineError> {
        if self.instances.contains_key(id) {
            return Err(EngineError::DuplicateInstance(id.to_string()));
        }
        self.instances.insert(
            id.to_string(),
            Instance {
                controller,
                _subscription: subscription,
            },
        );
        Ok(())
    }

    /// Looks up a registered controller by id.
    pub fn get(&self, id: &str) -> Result<&AggregationController, EngineError> {
        self.instances
            .get(id)
            .map(|instance| &instance.controller)
            .ok_or_else(|| EngineError::UnknownInstance(id.to_string()))
    }

    /// Removes an instance, dropping its store subscription.
    pub fn teardown(&mut self, id: &str) -> Result<(), EngineError> {
        self.instances
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::UnknownInstance(id.to_string()))
    }

    /// Returns the live instance ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.instances.keys().map(String::as_str).collect()
    }

    /// Returns the number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if no instances are registered.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use facet_state::Store;
    use serde_json::json;

    use super::*;
    use crate::FacetFieldConfig;

    fn widget(store: &Store<SearchState>) -> (AggregationController, Subscription<SearchState>) {
        let controller = AggregationController::new(vec![FacetFieldConfig::new("category")]);
        let subscription = controller.attach(store);
        (controller, subscription)
    }

    #[test]
    fn test_register_and_get() {
        let store = Store::new(SearchState::default());
        let (controller, subscription) = widget(&store);

        let mut registry = WidgetRegistry::new();
        registry.register("sidebar", controller, subscription).unwrap();

        assert!(registry.get("sidebar").is_ok());
        assert_eq!(registry.ids(), vec!["sidebar"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = Store::new(SearchState::default());
        let (first, first_sub) = widget(&store);
        let (second, second_sub) = widget(&store);

        let mut registry = WidgetRegistry::new();
        registry.register("sidebar", first, first_sub).unwrap();
        assert_eq!(
            registry.register("sidebar", second, second_sub),
            Err(EngineError::DuplicateInstance("sidebar".to_string()))
        );
    }

    #[test]
    fn test_unknown_id() {
        let registry = WidgetRegistry::new();
        assert_eq!(
            registry.get("ghost"),
            Err(EngineError::UnknownInstance("ghost".to_string()))
        );
    }

    #[test]
    fn test_teardown_detaches_from_store() {
        let store = Store::new(SearchState::with_request(
            facet_state::SearchRequest::with_term("boots"),
        ));
        let (controller, subscription) = widget(&store);

        let mut registry = WidgetRegistry::new();
        registry
            .register("sidebar", controller.clone(), subscription)
            .unwrap();
        registry.teardown("sidebar").unwrap();
        assert!(registry.is_empty());

        // A response landing after teardown no longer reaches the controller.
        store.update(|state| {
            state.record_response(
                Some(json!({"category": [{"path": "/news", "count": 5}]})),
                None,
                Some(10),
            );
        });
        assert!(controller.tree("category").unwrap().is_empty());
        assert!(controller.last_signal().is_none());
    }

    #[test]
    fn test_independent_instances() {
        let left_store = Store::new(SearchState::with_request(
            facet_state::SearchRequest::with_term("boots"),
        ));
        let right_store = Store::new(SearchState::with_request(
            facet_state::SearchRequest::with_term("hats"),
        ));
        let (left, left_sub) = widget(&left_store);
        let (right, right_sub) = widget(&right_store);

        let mut registry = WidgetRegistry::new();
        registry.register("left", left, left_sub).unwrap();
        registry.register("right", right, right_sub).unwrap();

        left_store.update(|state| {
            state.record_response(
                Some(json!({"category": [{"path": "/news", "count": 5}]})),
                None,
                Some(10),
            );
        });

        let left_tree = registry.get("left").unwrap().tree("category").unwrap();
        let right_tree = registry.get("right").unwrap().tree("category").unwrap();
        assert_eq!(left_tree.count_at("/news"), Some(5));
        assert!(right_tree.is_empty());
    }
}
