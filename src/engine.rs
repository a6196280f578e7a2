//! The McRAPTOR search (spec.md §4.D–§5).
//!
//! Generalizes `raptor::raptor::raptor_query`'s round-based marking loop —
//! a `Vec<tau>` of best-known arrivals, a marked-stop worklist, per-route
//! forward scans — into a multi-criteria search where each station holds a
//! bounded `Frontier` instead of a single best arrival, following
//! `mc_raptor.py::McRaptor::find_routes`.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::anp::{self, CriteriaWeights};
use crate::config;
use crate::errors::RoutingError;
use crate::geo::haversine_distance_m;
use crate::label::{Frontier, Label, LabelId, TransferInfo, VisitedSet};
use crate::network::{Direction, LineId, NetworkData, Profile, StationId};
use crate::utils::CancellationToken;

/// A frontier bucket's key: `(station, line, transfers)`, matching
/// `mc_raptor.py`'s `state_key` tuple. The origin's seed label has no
/// current line yet, so `line` is `None` only for that one bucket.
pub type FrontierKey = (StationId, Option<LineId>, u32);

/// Owns every label ever created during a query plus, per `(station, line,
/// transfers)` bucket, the frontier of non-dominated arrivals reached there.
/// `reconstruct`/`ranking` walk this by `LabelId` rather than by reference,
/// avoiding the teacher's parent-pointer `Rc` chain (spec.md §9).
pub struct QueryResult {
    pub arena: Vec<Label>,
    pub frontiers: HashMap<FrontierKey, Frontier>,
    pub origin: StationId,
    pub destinations: Vec<StationId>,
    pub profile: Profile,
    pub weights: CriteriaWeights,
}

impl QueryResult {
    pub fn label(&self, id: LabelId) -> &Label {
        &self.arena[id as usize]
    }

    /// Every non-dominated label reached at any of the query's destinations,
    /// across all rounds and every line/transfer-count bucket there.
    pub fn terminal_labels(&self) -> Vec<LabelId> {
        self.frontiers
            .iter()
            .filter(|((station, _, _), _)| self.destinations.contains(station))
            .flat_map(|(_, f)| f.members().iter().copied())
            .collect()
    }
}

fn at_elapsed_minutes(departure: NaiveDateTime, elapsed: f64) -> NaiveDateTime {
    let midnight = NaiveDateTime::new(departure.date(), NaiveTime::MIN);
    midnight + Duration::seconds((elapsed * 60.0).round() as i64)
}

fn ride_segment_minutes(network: &NetworkData, from: StationId, to: StationId) -> f64 {
    let (a, b) = match (network.station(from), network.station(to)) {
        (Some(a), Some(b)) => (a, b),
        _ => return config::MIN_SEGMENT_TIME_MIN,
    };
    let distance = haversine_distance_m(a.latitude, a.longitude, b.latitude, b.longitude);
    (distance / config::COMMERCIAL_SPEED_M_PER_MIN).max(config::MIN_SEGMENT_TIME_MIN)
}

struct Arena<'a> {
    network: &'a NetworkData,
    departure: NaiveDateTime,
    weights: CriteriaWeights,
    epsilon: f64,
    profile: Profile,
    labels: Vec<Label>,
    frontiers: HashMap<FrontierKey, Frontier>,
}

impl<'a> Arena<'a> {
    fn push_label(&mut self, mut label: Label) -> (LabelId, bool) {
        let id = self.labels.len() as LabelId;
        label.id = id;
        self.labels.push(label);
        let pushed = &self.labels[id as usize];
        let key: FrontierKey = (pushed.current_station, pushed.current_line.clone(), pushed.transfers);
        let frontier = self.frontiers.entry(key).or_default();
        let accepted = frontier.try_add(id, &self.labels, &self.weights, self.epsilon);
        (id, accepted)
    }

    fn ride_branch(&mut self, station: StationId, label: &Label, round: u32, next_marked: &mut HashSet<StationId>) {
        for line in self.network.lines_at(station).to_vec() {
            let is_circular = self.network.is_circular(&line);
            let downstream = match self.network.downstream(station, &line) {
                Some(d) => d,
                None => continue,
            };

            let continuing_same_line = label.current_line.as_ref() == Some(&line) && !label.is_first_move;
            let directions: Vec<Direction> = if continuing_same_line {
                label.current_direction.into_iter().collect()
            } else {
                if is_circular {
                    vec![Direction::In, Direction::Out]
                } else {
                    vec![Direction::Up, Direction::Down]
                }
            };

            for direction in directions {
                let stops: &[StationId] = match direction {
                    Direction::Up => &downstream.up,
                    Direction::Down => &downstream.down,
                    Direction::In => &downstream.in_,
                    Direction::Out => &downstream.out,
                };

                let mut cumulative = 0.0;
                let mut prev = station;
                for &next_station in stops {
                    let segment = ride_segment_minutes(self.network, prev, next_station);
                    cumulative += segment;
                    prev = next_station;

                    if label.visited.contains(next_station) {
                        continue;
                    }

                    let at_time = label.arrival_time + cumulative;
                    let departure_at_segment = at_elapsed_minutes(self.departure, at_time);
                    let congestion = self.network.congestion(next_station, &line, direction, departure_at_segment);
                    let convenience = self.network.station_convenience(next_station, self.profile);

                    let new_label = Label {
                        id: 0,
                        parent: Some(label.id),
                        arrival_time: at_time,
                        transfers: label.transfers,
                        convenience_sum: label.convenience_sum + convenience,
                        congestion_sum: label.congestion_sum + congestion,
                        max_transfer_difficulty: label.max_transfer_difficulty,
                        current_station: next_station,
                        current_line: Some(line.clone()),
                        current_direction: Some(direction),
                        visited: label.visited.push(next_station),
                        depth: label.depth + 1,
                        transfer_info: None,
                        is_first_move: false,
                        created_round: round,
                    };

                    let (_, accepted) = self.push_label(new_label);
                    if accepted {
                        next_marked.insert(next_station);
                    }
                }
            }
        }
    }

    /// Forbids transferring twice in a row: a label created by a transfer
    /// must ride at least one segment before transferring again, matching
    /// `mc_raptor.py`'s consecutive-transfer block.
    fn transfer_branch(&mut self, station: StationId, label: &Label, round: u32, next_marked: &mut HashSet<StationId>) {
        if label.is_first_move || label.transfer_info.is_some() {
            return;
        }
        let current_line = match &label.current_line {
            Some(l) => l.clone(),
            None => return,
        };

        for other_line in self.network.lines_at(station).to_vec() {
            if other_line == current_line {
                continue;
            }
            let target_station = match self.network.station_on_line(station, &other_line) {
                Some(s) => s,
                None => continue,
            };

            let record = self.network.transfer(station, &current_line, &other_line);
            let distance = record.map(|r| r.distance_m).unwrap_or(config::DEFAULT_TRANSFER_DISTANCE_M);
            let facility_scores = record
                .and_then(|r| r.facility_scores.get(&self.profile))
                .cloned()
                .unwrap_or_default();
            let preferences = config::default_facility_preferences(self.profile);
            let convenience = anp::facility_weighted_convenience(&preferences, &facility_scores);
            let difficulty = anp::transfer_difficulty(distance, convenience);
            let walk_minutes = anp::transfer_walking_minutes(distance, self.profile);

            let new_label = Label {
                id: 0,
                parent: Some(label.id),
                arrival_time: label.arrival_time + walk_minutes,
                transfers: label.transfers + 1,
                convenience_sum: label.convenience_sum + convenience,
                congestion_sum: label.congestion_sum,
                max_transfer_difficulty: label.max_transfer_difficulty.max(difficulty),
                current_station: target_station,
                current_line: Some(other_line.clone()),
                current_direction: None,
                visited: label.visited.clone(),
                depth: label.depth + 1,
                transfer_info: Some(TransferInfo {
                    station,
                    from_line: current_line.clone(),
                    to_line: other_line.clone(),
                }),
                is_first_move: false,
                created_round: round,
            };

            let (_, accepted) = self.push_label(new_label);
            if accepted {
                next_marked.insert(target_station);
            }
        }
    }
}

/// Finds every non-dominated accessible route from `origin` to any station
/// in `destinations`, for the given rider `profile` and `departure` time.
///
/// Returns `Ok` with an empty `terminal_labels()` when the network is
/// connected but no feasible route exists within `max_rounds` — infeasibility
/// is a result, not an error (spec.md §7). Errors only on precondition
/// violations: unknown origin or an empty destination set.
pub fn find_routes(
    network: &NetworkData,
    origin: StationId,
    destinations: &[StationId],
    profile: Profile,
    departure: NaiveDateTime,
    max_rounds: u32,
    cancel: &CancellationToken,
) -> Result<QueryResult, RoutingError> {
    if network.station(origin).is_none() {
        return Err(RoutingError::UnknownOrigin);
    }
    if destinations.is_empty() {
        return Err(RoutingError::EmptyDestinations);
    }

    let weights = anp::weights(profile);
    let epsilon = config::epsilon(profile);

    let mut state = Arena {
        network,
        departure,
        weights,
        epsilon,
        profile,
        labels: Vec::new(),
        frontiers: HashMap::new(),
    };

    // The origin's own convenience/congestion seed the running sums so
    // avg_convenience/avg_congestion describe the whole journey including
    // its starting station, not just the segments ridden after it
    // (spec.md §4.E). Congestion direction defaults to `Up`, matching the
    // original's hardcoded first-move lookup; if no line serves the origin
    // at all there's nothing to ride, so a 0.0 placeholder is harmless.
    let origin_line = network.lines_at(origin).first().cloned();
    let origin_convenience = network.station_convenience(origin, profile);
    let origin_congestion = match &origin_line {
        Some(line) => network.congestion(origin, line, Direction::Up, departure),
        None => 0.0,
    };

    let seed = Label {
        id: 0,
        parent: None,
        arrival_time: 0.0,
        transfers: 0,
        convenience_sum: origin_convenience,
        congestion_sum: origin_congestion,
        max_transfer_difficulty: 0.0,
        current_station: origin,
        current_line: None,
        current_direction: None,
        visited: VisitedSet::empty().push(origin),
        depth: 1,
        transfer_info: None,
        is_first_move: true,
        created_round: 0,
    };
    state.push_label(seed);

    let mut marked: HashSet<StationId> = HashSet::from([origin]);

    for round in 1..=max_rounds.max(1) {
        if cancel.is_cancelled() || marked.is_empty() {
            break;
        }
        log::debug!("round {round}: {} marked stations", marked.len());

        let work: Vec<(StationId, LabelId)> = state
            .frontiers
            .iter()
            .filter(|((station, _, _), _)| marked.contains(station))
            .flat_map(|(&(station, _, _), f)| f.members().iter().map(move |&id| (station, id)))
            .collect();

        let mut next_marked = HashSet::new();
        for (station, label_id) in work {
            if cancel.is_cancelled() {
                break;
            }
            let label = state.labels[label_id as usize].clone();
            state.ride_branch(station, &label, round, &mut next_marked);
            state.transfer_branch(station, &label, round, &mut next_marked);
        }
        marked = next_marked;
    }

    Ok(QueryResult {
        arena: state.labels,
        frontiers: state.frontiers,
        origin,
        destinations: destinations.to_vec(),
        profile,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{LineId, NetworkDataBuilder};
    use std::sync::Arc;

    fn linear_network() -> (NetworkData, StationId, StationId) {
        let mut b = NetworkDataBuilder::new();
        let line: LineId = Arc::from("L1");
        let a = b.add_station("A", "Alpha", line.clone(), 37.50, 127.00);
        let m = b.add_station("M", "Mid", line.clone(), 37.51, 127.01);
        let z = b.add_station("Z", "Zulu", line.clone(), 37.52, 127.02);
        b.build_line_from_order(line, &[a, m, z], false);
        (b.build(), a, z)
    }

    fn departure() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn rejects_unknown_origin() {
        let (net, _a, z) = linear_network();
        let cancel = CancellationToken::new();
        let err = find_routes(&net, 999, &[z], Profile::Eld, departure(), 5, &cancel).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownOrigin));
    }

    #[test]
    fn rejects_empty_destinations() {
        let (net, a, _z) = linear_network();
        let cancel = CancellationToken::new();
        let err = find_routes(&net, a, &[], Profile::Eld, departure(), 5, &cancel).unwrap_err();
        assert!(matches!(err, RoutingError::EmptyDestinations));
    }

    #[test]
    fn finds_a_direct_route_with_no_transfers() {
        let (net, a, z) = linear_network();
        let cancel = CancellationToken::new();
        let result = find_routes(&net, a, &[z], Profile::Eld, departure(), 5, &cancel).unwrap();
        let terminals = result.terminal_labels();
        assert!(!terminals.is_empty());
        assert!(terminals.iter().any(|&id| result.label(id).transfers == 0));
    }

    #[test]
    fn zero_rounds_still_seeds_the_origin() {
        let (net, a, z) = linear_network();
        let cancel = CancellationToken::new();
        let result = find_routes(&net, a, &[z], Profile::Eld, departure(), 0, &cancel).unwrap();
        assert!(result.terminal_labels().is_empty());
    }

    #[test]
    fn cancellation_stops_further_rounds() {
        let (net, a, z) = linear_network();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = find_routes(&net, a, &[z], Profile::Eld, departure(), 5, &cancel).unwrap();
        assert!(result.terminal_labels().is_empty());
    }
}
