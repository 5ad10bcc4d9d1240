//! Element Store: the arena that owns every element of a network.
//!
//! Elements are keyed by [`ElementId`] and kept in insertion order. Links
//! between elements are ids looked up here, never references.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::elements::HydraulicElement;
use crate::errors::{NetworkError, NetworkResult};
use crate::id::ElementId;

/// Insertion-ordered collection of hydraulic elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementStore {
    elements: IndexMap<ElementId, HydraulicElement>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element and return its id.
    ///
    /// Links are cleared: elements enter the store unconnected and only the
    /// Connection Manager links them.
    pub fn insert(&mut self, mut element: HydraulicElement) -> ElementId {
        element.upstream_id = None;
        element.downstream_id = None;
        element.recompute_end();
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&HydraulicElement> {
        self.elements.get(&id)
    }

    /// Mutable access stays inside the crate so edits go through
    /// [`super::edit_element`] and are re-propagated.
    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut HydraulicElement> {
        self.elements.get_mut(&id)
    }

    pub(crate) fn require(&self, id: ElementId) -> NetworkResult<&HydraulicElement> {
        self.get(id).ok_or_else(|| NetworkError::not_found(id))
    }

    pub(crate) fn require_mut(&mut self, id: ElementId) -> NetworkResult<&mut HydraulicElement> {
        self.get_mut(id).ok_or_else(|| NetworkError::not_found(id))
    }

    /// Remove without touching neighbours. Use [`super::remove_element`].
    pub(crate) fn take(&mut self, id: ElementId) -> Option<HydraulicElement> {
        self.elements.shift_remove(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &HydraulicElement> {
        self.elements.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    /// Elements without an upstream neighbour
    pub fn heads(&self) -> Vec<ElementId> {
        self.iter().filter(|e| e.upstream_id.is_none()).map(|e| e.id).collect()
    }

    /// Ids from `id` to the end of its chain, following downstream links.
    ///
    /// Stops at a dangling link; the walk never visits more elements than the
    /// store holds.
    pub fn chain_from(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).map(|e| e.id);
        while let Some(cur) = current {
            if chain.len() >= self.len() {
                break;
            }
            chain.push(cur);
            current = self.get(cur).and_then(|e| e.downstream_id).filter(|next| self.contains(*next));
        }
        chain
    }

    /// Find the element whose span contains `station`, searching chain order
    /// from `head`.
    pub fn element_at_station(&self, head: ElementId, station: f64) -> Option<&HydraulicElement> {
        self.chain_from(head)
            .into_iter()
            .filter_map(|id| self.get(id))
            .find(|e| e.contains_station(station))
    }

    /// Verify link integrity: keys match element ids, every link resolves,
    /// links are symmetric, and no chain loops back on itself.
    pub fn check_links(&self) -> NetworkResult<()> {
        for (key, element) in &self.elements {
            if *key != element.id {
                return Err(NetworkError::broken_link(
                    element.id,
                    format!("stored under a different id {}", key),
                ));
            }

            if let Some(down) = element.downstream_id {
                let neighbour = self
                    .get(down)
                    .ok_or_else(|| NetworkError::broken_link(element.id, format!("downstream {} does not exist", down)))?;
                if neighbour.upstream_id != Some(element.id) {
                    return Err(NetworkError::broken_link(
                        element.id,
                        format!("downstream {} does not link back", down),
                    ));
                }
            }

            if let Some(up) = element.upstream_id {
                let neighbour = self
                    .get(up)
                    .ok_or_else(|| NetworkError::broken_link(element.id, format!("upstream {} does not exist", up)))?;
                if neighbour.downstream_id != Some(element.id) {
                    return Err(NetworkError::broken_link(
                        element.id,
                        format!("upstream {} does not link back", up),
                    ));
                }
            }
        }

        // With symmetric links every element outside a cycle hangs off a head
        let reachable: HashSet<ElementId> = self.heads().into_iter().flat_map(|h| self.chain_from(h)).collect();
        if let Some(id) = self.ids().find(|id| !reachable.contains(id)) {
            return Err(NetworkError::broken_link(id, "element is part of a cycle"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Channel, CrossSection};

    fn channel(label: &str, length: f64) -> HydraulicElement {
        HydraulicElement::channel(label, Channel::new(length, CrossSection::rectangular(2.0, 1.0)), 0.015, 0.001)
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut store = ElementStore::new();
        let a = store.insert(channel("A", 10.0));
        let b = store.insert(channel("B", 20.0));
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.heads(), vec![a, b]);
    }

    #[test]
    fn test_insert_clears_links() {
        let mut store = ElementStore::new();
        let mut el = channel("A", 10.0);
        el.downstream_id = Some(ElementId::new());
        let id = store.insert(el);
        assert!(store.get(id).unwrap().downstream_id().is_none());
        assert!(store.check_links().is_ok());
    }

    #[test]
    fn test_element_at_station_follows_chain() {
        let mut store = ElementStore::new();
        let a = store.insert(channel("A", 10.0));
        let b = store.insert(channel("B", 20.0));
        crate::network::connect(&mut store, a, b).unwrap();

        assert_eq!(store.element_at_station(a, 5.0).map(|e| e.id), Some(a));
        assert_eq!(store.element_at_station(a, 25.0).map(|e| e.id), Some(b));
        assert!(store.element_at_station(a, 31.0).is_none());
        // Searching from B never finds A
        assert!(store.element_at_station(b, 5.0).is_none());
    }

    #[test]
    fn test_check_links_detects_asymmetry() {
        let mut store = ElementStore::new();
        let a = store.insert(channel("A", 10.0));
        let b = store.insert(channel("B", 10.0));
        store.get_mut(a).unwrap().downstream_id = Some(b);
        let err = store.check_links().unwrap_err();
        assert_eq!(err.error_code(), "BROKEN_LINK");
    }

    #[test]
    fn test_check_links_detects_dangling() {
        let mut store = ElementStore::new();
        let a = store.insert(channel("A", 10.0));
        store.get_mut(a).unwrap().upstream_id = Some(ElementId::new());
        assert!(store.check_links().is_err());
    }

    #[test]
    fn test_check_links_detects_cycle() {
        let mut store = ElementStore::new();
        let a = store.insert(channel("A", 10.0));
        let b = store.insert(channel("B", 10.0));
        {
            let el = store.get_mut(a).unwrap();
            el.downstream_id = Some(b);
            el.upstream_id = Some(b);
        }
        {
            let el = store.get_mut(b).unwrap();
            el.downstream_id = Some(a);
            el.upstream_id = Some(a);
        }
        assert!(store.check_links().is_err());
        // Bounded walk even on a loop
        assert_eq!(store.chain_from(a).len(), 2);
    }

    #[test]
    fn test_serializes_as_map_by_id() {
        let mut store = ElementStore::new();
        let a = store.insert(channel("A", 10.0));
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value[a.to_string()]["label"], "A");

        let roundtrip: ElementStore = serde_json::from_value(value).unwrap();
        assert_eq!(roundtrip, store);
    }
}
