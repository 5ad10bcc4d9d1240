//! Connection Manager: the only writer of link fields.
//!
//! Every operation keeps `A.downstream_id == Some(B)` equivalent to
//! `B.upstream_id == Some(A)` and re-runs propagation where placements can
//! change. Failed operations leave the store as they found it.

use serde::{Deserialize, Serialize};

use crate::basin::{design_basin, BasinDesignInput, BasinDesignResult, BasinSelection};
use crate::basin::config::{DEFAULT_FLOOR_THICKNESS, DEFAULT_WINGWALL_ANGLE};
use crate::elements::HydraulicElement;
use crate::errors::{HydroResult, NetworkError, NetworkResult};
use crate::id::ElementId;

use super::{propagate, ElementStore};

/// Which link of an element to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSide {
    Upstream,
    Downstream,
}

/// Link `upstream -> downstream` and propagate from `upstream`.
///
/// Existing links on the affected sides are replaced; the neighbours they
/// pointed to are unlinked as well.
pub fn connect(store: &mut ElementStore, upstream: ElementId, downstream: ElementId) -> NetworkResult<()> {
    if !store.contains(upstream) || !store.contains(downstream) {
        let missing = if store.contains(upstream) { downstream } else { upstream };
        return Err(NetworkError::invalid_connection(
            upstream,
            downstream,
            format!("element {} does not exist", missing),
        ));
    }
    if upstream == downstream {
        return Err(NetworkError::invalid_connection(
            upstream,
            downstream,
            "an element cannot feed itself",
        ));
    }
    if is_ancestor(store, downstream, upstream) {
        return Err(NetworkError::invalid_connection(
            upstream,
            downstream,
            "downstream element already feeds the upstream element; link would form a cycle",
        ));
    }

    let old_down = store.require(upstream)?.downstream_id.filter(|id| *id != downstream);
    let old_up = store.require(downstream)?.upstream_id.filter(|id| *id != upstream);

    if let Some(old) = old_down {
        if let Some(el) = store.get_mut(old) {
            el.upstream_id = None;
        }
    }
    if let Some(old) = old_up {
        if let Some(el) = store.get_mut(old) {
            el.downstream_id = None;
        }
    }

    store.require_mut(upstream)?.downstream_id = Some(downstream);
    store.require_mut(downstream)?.upstream_id = Some(upstream);

    tracing::debug!(%upstream, %downstream, "connected elements");
    propagate(store, upstream)?;
    Ok(())
}

/// True when `candidate` is reached walking upstream from `start` (inclusive).
fn is_ancestor(store: &ElementStore, candidate: ElementId, start: ElementId) -> bool {
    let mut current = Some(start);
    for _ in 0..=store.len() {
        match current {
            Some(id) if id == candidate => return true,
            Some(id) => current = store.get(id).and_then(|e| e.upstream_id),
            None => return false,
        }
    }
    false
}

/// Clear one link of `id` and the matching link of its neighbour.
///
/// Placements are left as they are until the next edit or connect touches
/// the chain.
pub fn disconnect(store: &mut ElementStore, id: ElementId, side: LinkSide) -> NetworkResult<()> {
    let element = store.require_mut(id)?;
    let neighbour = match side {
        LinkSide::Upstream => element.upstream_id.take(),
        LinkSide::Downstream => element.downstream_id.take(),
    };

    let Some(neighbour) = neighbour else {
        return Ok(());
    };
    if let Some(other) = store.get_mut(neighbour) {
        match side {
            LinkSide::Upstream => other.downstream_id = None,
            LinkSide::Downstream => other.upstream_id = None,
        }
    }

    tracing::debug!(%id, %neighbour, ?side, "disconnected elements");
    Ok(())
}

/// Unlink and remove an element.
pub fn remove_element(store: &mut ElementStore, id: ElementId) -> NetworkResult<HydraulicElement> {
    disconnect(store, id, LinkSide::Upstream)?;
    disconnect(store, id, LinkSide::Downstream)?;
    let element = store.take(id).ok_or_else(|| NetworkError::not_found(id))?;
    tracing::debug!(%id, label = %element.label, "removed element");
    Ok(element)
}

/// Apply `edit` to an element, validate, and propagate.
///
/// The id and links cannot be changed through `edit`. If the edited
/// geometry fails validation the element is restored and the error
/// returned. Otherwise the element's start is re-seated on its
/// predecessor's end and the chain below is recomputed.
pub fn edit_element<F>(store: &mut ElementStore, id: ElementId, edit: F) -> HydroResult<usize>
where
    F: FnOnce(&mut HydraulicElement),
{
    let seat = match store.require(id)?.upstream_id {
        Some(up) => store.get(up).map(|e| e.placement),
        None => None,
    };

    let element = store.require_mut(id)?;
    let original = element.clone();
    edit(element);

    element.id = original.id;
    element.upstream_id = original.upstream_id;
    element.downstream_id = original.downstream_id;
    element.sync_slope();

    if let Err(e) = element.validate() {
        tracing::warn!(%id, "rejected edit: {}", e);
        *element = original;
        return Err(e.into());
    }

    if let Some(upstream) = seat {
        element.placement.start_station = upstream.end_station;
        element.placement.start_elevation = upstream.end_elevation;
    }

    Ok(propagate(store, id)?)
}

/// Flow conditions for designing a chute's basin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinRequest {
    /// Design discharge (m³/s)
    pub discharge: f64,

    #[serde(default)]
    pub tailwater_depth: f64,

    #[serde(default)]
    pub selection: BasinSelection,

    #[serde(default = "default_floor_thickness")]
    pub floor_thickness: f64,

    #[serde(default = "default_wingwall_angle")]
    pub wingwall_angle: f64,
}

fn default_floor_thickness() -> f64 {
    DEFAULT_FLOOR_THICKNESS
}

fn default_wingwall_angle() -> f64 {
    DEFAULT_WINGWALL_ANGLE
}

impl BasinRequest {
    pub fn new(discharge: f64) -> Self {
        BasinRequest {
            discharge,
            tailwater_depth: 0.0,
            selection: BasinSelection::Auto,
            floor_thickness: DEFAULT_FLOOR_THICKNESS,
            wingwall_angle: DEFAULT_WINGWALL_ANGLE,
        }
    }
}

/// Design a basin for a chute and replace the chute's basin with it.
///
/// The chute supplies width, total drop, main-section slope and roughness.
/// Placements are unaffected, so nothing is propagated.
pub fn auto_design_basin(
    store: &mut ElementStore,
    chute_id: ElementId,
    request: &BasinRequest,
) -> HydroResult<BasinDesignResult> {
    let element = store.require_mut(chute_id)?;
    let kind = element.kind.name();
    let manning_n = element.manning_n;
    let total_drop = element.total_drop();
    let chute = element.as_chute_mut().ok_or_else(|| NetworkError::NotAChute {
        id: chute_id,
        kind: kind.to_string(),
    })?;

    let input = BasinDesignInput {
        discharge: request.discharge,
        width: chute.width,
        drop: total_drop,
        slope: chute.main_slope(),
        manning_n,
        tailwater_depth: request.tailwater_depth,
        selection: request.selection,
        floor_thickness: request.floor_thickness,
        wingwall_angle: request.wingwall_angle,
    };
    let result = design_basin(&input)?;
    chute.stilling_basin = Some(result.config.clone());

    tracing::info!(
        chute = %chute_id,
        basin = result.config.basin_type.code(),
        length = result.config.length,
        warnings = result.warnings.len(),
        "designed stilling basin"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basin::StillingBasinType;
    use crate::elements::{Channel, Chute, CrossSection, ElementKind};
    use proptest::prelude::*;

    fn channel(length: f64) -> HydraulicElement {
        HydraulicElement::channel("CH", Channel::new(length, CrossSection::rectangular(2.0, 1.0)), 0.015, 0.01)
    }

    fn chain(store: &mut ElementStore, n: usize) -> Vec<ElementId> {
        let ids: Vec<_> = (0..n).map(|_| store.insert(channel(10.0))).collect();
        for pair in ids.windows(2) {
            connect(store, pair[0], pair[1]).unwrap();
        }
        ids
    }

    fn assert_chain_consistent(store: &ElementStore, head: ElementId) {
        let chain = store.chain_from(head);
        for pair in chain.windows(2) {
            let a = store.get(pair[0]).unwrap();
            let b = store.get(pair[1]).unwrap();
            assert_eq!(a.downstream_id(), Some(b.id()));
            assert_eq!(b.upstream_id(), Some(a.id()));
            assert!((a.placement.end_station - b.placement.start_station).abs() < 1e-9);
            assert!((a.placement.end_elevation - b.placement.start_elevation).abs() < 1e-9);
        }
    }

    #[test]
    fn test_connect_sets_both_links() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 2);
        assert_eq!(store.get(ids[0]).unwrap().downstream_id(), Some(ids[1]));
        assert_eq!(store.get(ids[1]).unwrap().upstream_id(), Some(ids[0]));
        assert!(store.check_links().is_ok());
    }

    #[test]
    fn test_connect_rejects_self_loop() {
        let mut store = ElementStore::new();
        let a = store.insert(channel(10.0));
        let err = connect(&mut store, a, a).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONNECTION");
        assert!(store.get(a).unwrap().downstream_id().is_none());
    }

    #[test]
    fn test_connect_rejects_cycle_and_leaves_store() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 3);
        let before = store.clone();

        let err = connect(&mut store, ids[2], ids[0]).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidConnection { .. }));
        assert_eq!(store, before);

        assert!(connect(&mut store, ids[1], ids[0]).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_connect_unknown_id() {
        let mut store = ElementStore::new();
        let a = store.insert(channel(10.0));
        let err = connect(&mut store, a, ElementId::new()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONNECTION");
    }

    #[test]
    fn test_connect_replaces_existing_links() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 2);
        let c = store.insert(channel(5.0));

        connect(&mut store, ids[0], c).unwrap();
        assert_eq!(store.get(ids[0]).unwrap().downstream_id(), Some(c));
        assert!(store.get(ids[1]).unwrap().upstream_id().is_none());
        assert!(store.check_links().is_ok());
    }

    #[test]
    fn test_disconnect_is_symmetric_and_does_not_propagate() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 2);
        let start = store.get(ids[1]).unwrap().placement;

        disconnect(&mut store, ids[1], LinkSide::Upstream).unwrap();
        assert!(store.get(ids[0]).unwrap().downstream_id().is_none());
        assert!(store.get(ids[1]).unwrap().upstream_id().is_none());
        assert_eq!(store.get(ids[1]).unwrap().placement, start);

        // Empty side is a no-op
        disconnect(&mut store, ids[1], LinkSide::Upstream).unwrap();
        assert!(disconnect(&mut store, ElementId::new(), LinkSide::Downstream).is_err());
    }

    #[test]
    fn test_remove_element_unlinks_neighbours() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 3);
        let removed = remove_element(&mut store, ids[1]).unwrap();
        assert_eq!(removed.id(), ids[1]);
        assert!(removed.upstream_id().is_none() && removed.downstream_id().is_none());
        assert!(store.get(ids[0]).unwrap().downstream_id().is_none());
        assert!(store.get(ids[2]).unwrap().upstream_id().is_none());
        assert!(store.check_links().is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_edit_propagates_downstream() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 3);

        let rewritten = edit_element(&mut store, ids[0], |el| {
            if let ElementKind::Channel(c) = &mut el.kind {
                c.length = 30.0;
            }
        })
        .unwrap();
        assert_eq!(rewritten, 3);

        let last = store.get(ids[2]).unwrap().placement;
        assert!((last.end_station - 50.0).abs() < 1e-9);
        assert!((last.end_elevation + 0.5).abs() < 1e-9);
        assert_chain_consistent(&store, ids[0]);
    }

    #[test]
    fn test_edit_rejects_invalid_geometry() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 2);
        let before = store.clone();

        let err = edit_element(&mut store, ids[0], |el| el.manning_n = -1.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(store, before);
    }

    #[test]
    fn test_edit_cannot_touch_links() {
        let mut store = ElementStore::new();
        let ids = chain(&mut store, 2);
        edit_element(&mut store, ids[1], |el| {
            el.upstream_id = None;
            el.placement.start_station = 999.0;
        })
        .unwrap();
        let el = store.get(ids[1]).unwrap();
        assert_eq!(el.upstream_id(), Some(ids[0]));
        assert!((el.placement.start_station - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_auto_design_basin_on_chute() {
        let mut store = ElementStore::new();
        let chute = store.insert(HydraulicElement::chute("R-1", Chute::new(20.0, 10.0, 2.0, 1.0), 0.014));

        let result = auto_design_basin(&mut store, chute, &BasinRequest::new(5.0)).unwrap();
        assert_eq!(result.recommended_type, StillingBasinType::TypeIII);
        assert!(result.chute_normal_depth.is_some());

        let basin = store.get(chute).unwrap().as_chute().unwrap().stilling_basin.clone();
        assert_eq!(basin, Some(result.config));
    }

    #[test]
    fn test_auto_design_basin_rejects_channel() {
        let mut store = ElementStore::new();
        let ch = store.insert(channel(10.0));
        let err = auto_design_basin(&mut store, ch, &BasinRequest::new(5.0)).unwrap_err();
        assert_eq!(err.error_code(), "NOT_A_CHUTE");
    }

    proptest! {
        #[test]
        fn connected_path_is_consistent(
            lengths in prop::collection::vec(1.0f64..100.0, 2..8),
            order in prop::collection::vec(any::<prop::sample::Index>(), 8),
        ) {
            let mut store = ElementStore::new();
            let ids: Vec<_> = lengths.iter().map(|l| store.insert(channel(*l))).collect();

            // Connect the path links in a shuffled order
            let mut links: Vec<usize> = (0..ids.len() - 1).collect();
            for (i, idx) in order.iter().enumerate().take(links.len()) {
                let j = idx.index(links.len());
                links.swap(i, j);
            }
            for i in links {
                connect(&mut store, ids[i], ids[i + 1]).unwrap();
            }

            prop_assert!(store.check_links().is_ok());
            prop_assert_eq!(store.chain_from(ids[0]), ids.clone());
            assert_chain_consistent(&store, ids[0]);

            let total: f64 = lengths.iter().sum();
            let last = store.get(ids[ids.len() - 1]).unwrap().placement;
            prop_assert!((last.end_station - total).abs() < 1e-6);
        }

        #[test]
        fn ancestors_cannot_be_connected_downstream(
            n in 2usize..8,
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
        ) {
            let mut store = ElementStore::new();
            let ids = chain(&mut store, n);
            let upstream = a.index(n);
            let target = b.index(upstream + 1);
            let before = store.clone();

            // target is upstream itself or one of its ancestors
            prop_assert!(connect(&mut store, ids[upstream], ids[target]).is_err());
            prop_assert_eq!(&store, &before);
        }
    }
}
