//! Path reconstruction (spec.md §4.E), walking a label's parent chain back
//! to the query's origin and inserting the intermediate stations a ride
//! segment passed through along the way.
//!
//! Generalizes `journey.rs::Journey::from_tau`'s tau-array walk into an
//! arena walk, and reproduces `label.py::Label::reconstruct_route`'s
//! intermediate-station insertion, which scans the line's station order map
//! rather than storing every intermediate stop on the label itself.

use crate::engine::QueryResult;
use crate::label::{Label, LabelId, TransferInfo};
use crate::network::{Direction, LineId, NetworkData, StationId};

/// One ride or transfer segment of a reconstructed path, in travel order.
#[derive(Debug, Clone)]
pub enum Segment {
    Ride {
        line: LineId,
        direction: Direction,
        /// Every station visited on this line, including the boarding and
        /// alighting stations, in travel order.
        stations: Vec<StationId>,
        arrival_time: f64,
    },
    Transfer {
        info: TransferInfo,
        arrival_time: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Path {
    pub origin: StationId,
    pub destination: StationId,
    pub segments: Vec<Segment>,
    pub terminal_label: LabelId,
}

/// Walks `label_id`'s parent chain back to the seed label and returns the
/// segments in travel order, merging consecutive ride-branch hops on the
/// same line/direction into a single `Segment::Ride` the way
/// `reconstruct_route` groups same-line stretches rather than emitting one
/// segment per intermediate station.
pub fn reconstruct(result: &QueryResult, label_id: LabelId) -> Path {
    let mut chain: Vec<&Label> = Vec::new();
    let mut cursor = Some(label_id);
    while let Some(id) = cursor {
        let label = result.label(id);
        chain.push(label);
        cursor = label.parent;
    }
    chain.reverse();

    let mut segments: Vec<Segment> = Vec::new();
    for label in chain.iter().skip(1) {
        match &label.transfer_info {
            Some(info) => segments.push(Segment::Transfer {
                info: info.clone(),
                arrival_time: label.arrival_time,
            }),
            None => {
                let (line, direction) = match (&label.current_line, label.current_direction) {
                    (Some(l), Some(d)) => (l.clone(), d),
                    _ => continue,
                };
                match segments.last_mut() {
                    Some(Segment::Ride { line: prev_line, direction: prev_dir, stations, arrival_time })
                        if *prev_line == line && *prev_dir == direction =>
                    {
                        stations.push(label.current_station);
                        *arrival_time = label.arrival_time;
                    }
                    _ => segments.push(Segment::Ride {
                        line,
                        direction,
                        stations: vec![label.current_station],
                        arrival_time: label.arrival_time,
                    }),
                }
            }
        }
    }

    Path {
        origin: result.origin,
        destination: chain.last().map(|l| l.current_station).unwrap_or(result.origin),
        segments,
        terminal_label: label_id,
    }
}

/// Fills in intermediate stations between a ride's first and last recorded
/// stop that weren't labeled individually (e.g. when a caller reconstructs
/// from a coarser trace). Returns the boarding/alighting pair unchanged when
/// the network has no order data for `line`, matching the original's
/// fallback to endpoints-only.
pub fn intermediate_stations(
    network: &NetworkData,
    line: &LineId,
    from: StationId,
    to: StationId,
) -> Vec<StationId> {
    let (from_order, to_order) = match (network.order(from, line), network.order(to, line)) {
        (Some(a), Some(b)) => (a, b),
        _ => return vec![from, to],
    };

    let mut between: Vec<(u32, StationId)> = Vec::new();
    let lo = from_order.min(to_order);
    let hi = from_order.max(to_order);
    for station in 0..network.num_stations() as StationId {
        if let Some(order) = network.order(station, line) {
            if order >= lo && order <= hi {
                between.push((order, station));
            }
        }
    }
    between.sort_by_key(|&(order, _)| order);
    let mut stations: Vec<StationId> = between.into_iter().map(|(_, s)| s).collect();
    if from_order > to_order {
        stations.reverse();
    }
    stations
}
