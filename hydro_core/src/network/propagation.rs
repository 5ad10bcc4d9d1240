//! Propagation Engine: keeps stations and invert elevations continuous along
//! a chain.
//!
//! Each element's start is its predecessor's end; its end follows from its
//! own [`Conveyance`](crate::elements::Conveyance) geometry:
//!
//! ```text
//! end_station   = start_station   + horizontal_length
//! end_elevation = start_elevation - total_drop
//! ```

use crate::errors::{NetworkError, NetworkResult};
use crate::id::ElementId;

use super::ElementStore;

/// Recompute placements from `origin` to the end of its chain.
///
/// The origin keeps its start; everything downstream is re-seated. Returns
/// the number of elements rewritten, origin included.
pub fn propagate(store: &mut ElementStore, origin: ElementId) -> NetworkResult<usize> {
    let limit = store.len();

    let element = store.require_mut(origin)?;
    element.recompute_end();
    let mut upstream = element.placement;
    let mut next = element.downstream_id;
    let mut rewritten = 1;

    while let Some(next_id) = next {
        if rewritten >= limit {
            tracing::warn!(origin = %origin, "propagation stopped after {} elements", rewritten);
            break;
        }
        let Some(element) = store.get_mut(next_id) else {
            tracing::warn!(origin = %origin, missing = %next_id, "dangling downstream link ends propagation");
            break;
        };

        element.placement.start_station = upstream.end_station;
        element.placement.start_elevation = upstream.end_elevation;
        element.recompute_end();

        upstream = element.placement;
        next = element.downstream_id;
        rewritten += 1;
    }

    tracing::debug!(origin = %origin, rewritten, "propagated placements");
    Ok(rewritten)
}

/// Move a chain head to `station` / `elevation` and propagate.
///
/// Only heads can be moved; a linked element's start belongs to its
/// predecessor.
pub fn relocate(store: &mut ElementStore, id: ElementId, station: f64, elevation: f64) -> NetworkResult<usize> {
    let element = store.require_mut(id)?;
    if let Some(upstream) = element.upstream_id {
        return Err(NetworkError::invalid_connection(
            upstream,
            id,
            "element has an upstream neighbour; its start follows that element",
        ));
    }

    element.placement.start_station = station;
    element.placement.start_elevation = elevation;
    propagate(store, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Channel, Chute, CrossSection, HydraulicElement, Transition};
    use crate::network::connect;

    fn channel(length: f64, slope: f64) -> HydraulicElement {
        HydraulicElement::channel("CH", Channel::new(length, CrossSection::rectangular(2.0, 1.0)), 0.015, slope)
    }

    #[test]
    fn test_channel_then_chute() {
        let mut store = ElementStore::new();
        let ch = store.insert(channel(50.0, 0.01));
        let chute = store.insert(HydraulicElement::chute(
            "R-1",
            Chute::new(20.0, 10.0, 2.0, 1.0).with_inlet(1.0, 0.0),
            0.014,
        ));

        connect(&mut store, ch, chute).unwrap();

        let c = store.get(ch).unwrap().placement;
        assert!((c.end_station - 50.0).abs() < 1e-9);
        assert!((c.end_elevation + 0.5).abs() < 1e-9);

        let r = store.get(chute).unwrap().placement;
        assert!((r.start_station - 50.0).abs() < 1e-9);
        assert!((r.start_elevation + 0.5).abs() < 1e-9);
        assert!((r.end_station - 71.0).abs() < 1e-9);
        assert!((r.end_elevation + 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_transition_drop_height_overrides_slope() {
        let mut store = ElementStore::new();
        let ch = store.insert(channel(50.0, 0.01));
        let transition = Transition::new(4.0, CrossSection::rectangular(2.5, 1.2), CrossSection::rectangular(2.0, 1.0));
        let tr = store.insert(HydraulicElement::transition("TR-1", transition.with_drop(0.3), 0.015, 0.005));
        let chute = store.insert(HydraulicElement::chute(
            "R-1",
            Chute::new(20.0, 10.0, 2.0, 1.0).with_inlet(1.0, 0.0),
            0.014,
        ));

        connect(&mut store, ch, tr).unwrap();
        connect(&mut store, tr, chute).unwrap();

        // 0.3 m step, not 4 * 0.005 = 0.02 m
        let t = store.get(tr).unwrap().placement;
        assert!((t.start_station - 50.0).abs() < 1e-9);
        assert!((t.start_elevation + 0.5).abs() < 1e-9);
        assert!((t.end_station - 54.0).abs() < 1e-9);
        assert!((t.end_elevation + 0.8).abs() < 1e-9);

        let r = store.get(chute).unwrap().placement;
        assert_eq!(r.start_station, t.end_station);
        assert_eq!(r.start_elevation, t.end_elevation);
        assert!((r.end_station - 75.0).abs() < 1e-9);
        assert!((r.end_elevation + 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_transition_without_drop_height_uses_slope() {
        let mut store = ElementStore::new();
        let ch = store.insert(channel(50.0, 0.01));
        let transition = Transition::new(4.0, CrossSection::rectangular(2.5, 1.2), CrossSection::rectangular(2.0, 1.0));
        let tr = store.insert(HydraulicElement::transition("TR-1", transition, 0.015, 0.005));

        connect(&mut store, ch, tr).unwrap();

        let t = store.get(tr).unwrap().placement;
        assert!((t.end_station - 54.0).abs() < 1e-9);
        assert!((t.end_elevation + 0.52).abs() < 1e-9);
    }

    #[test]
    fn test_propagate_counts_rewritten() {
        let mut store = ElementStore::new();
        let ids: Vec<_> = (0..4).map(|_| store.insert(channel(10.0, 0.01))).collect();
        for pair in ids.windows(2) {
            connect(&mut store, pair[0], pair[1]).unwrap();
        }
        assert_eq!(propagate(&mut store, ids[0]).unwrap(), 4);
        assert_eq!(propagate(&mut store, ids[2]).unwrap(), 2);

        let last = store.get(ids[3]).unwrap().placement;
        assert!((last.end_station - 40.0).abs() < 1e-9);
        assert!((last.end_elevation + 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_propagate_missing_origin() {
        let mut store = ElementStore::new();
        let err = propagate(&mut store, ElementId::new()).unwrap_err();
        assert_eq!(err.error_code(), "ELEMENT_NOT_FOUND");
    }

    #[test]
    fn test_relocate_head() {
        let mut store = ElementStore::new();
        let a = store.insert(channel(10.0, 0.01));
        let b = store.insert(channel(10.0, 0.0));
        connect(&mut store, a, b).unwrap();

        assert_eq!(relocate(&mut store, a, 100.0, 25.0).unwrap(), 2);
        let end = store.get(b).unwrap().placement;
        assert!((end.end_station - 120.0).abs() < 1e-9);
        assert!((end.end_elevation - 24.9).abs() < 1e-9);

        let err = relocate(&mut store, b, 0.0, 0.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONNECTION");
    }
}
