//! Labels and Pareto frontiers (spec.md §3–§4.D).
//!
//! Generalizes `raptor::multicriteria::{Label, Bag}` from a 2-criterion
//! (arrival_time, cost) dominance check to the 5-criterion accessibility
//! scoring of `label.py::Label`, and replaces its parent-pointer chain with
//! an arena (`Vec<Label>` + `LabelId` index) per spec.md §9 so the frontier
//! can be cloned/truncated without cloning a linked structure.

use std::rc::Rc;

use crate::anp::CriteriaWeights;
use crate::network::{Direction, LineId, StationId};

pub type LabelId = u32;

/// A single hop's transfer metadata, kept for path reconstruction and for
/// `rank_routes`'s dedup-by-transfer-pattern step.
#[derive(Debug, Clone)]
pub struct TransferInfo {
    pub station: StationId,
    pub from_line: LineId,
    pub to_line: LineId,
}

/// Persistent, structurally-shared set of visited stations, checked on every
/// candidate extension to forbid revisits. An `Rc`-linked list rather than a
/// `HashSet` clone per label: extending is O(1) and sharing is free, which
/// matters because every round can fork a label dozens of times.
#[derive(Clone)]
pub struct VisitedSet(Option<Rc<VisitedNode>>);

struct VisitedNode {
    station: StationId,
    parent: Option<Rc<VisitedNode>>,
}

impl VisitedSet {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn contains(&self, station: StationId) -> bool {
        let mut cursor = self.0.as_ref();
        while let Some(node) = cursor {
            if node.station == station {
                return true;
            }
            cursor = node.parent.as_ref();
        }
        false
    }

    pub fn push(&self, station: StationId) -> Self {
        Self(Some(Rc::new(VisitedNode {
            station,
            parent: self.0.clone(),
        })))
    }
}

impl Default for VisitedSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// A Pareto label, one per (station, line, direction, transfer count)
/// candidate reached during the search. Mirrors `label.py::Label`'s fields;
/// `convenience_sum`/`congestion_sum` are running totals so the per-segment
/// average (`avg_convenience`/`avg_congestion`) stays O(1) to compute.
#[derive(Debug, Clone)]
pub struct Label {
    pub id: LabelId,
    pub parent: Option<LabelId>,

    pub arrival_time: f64,
    pub transfers: u32,
    pub convenience_sum: f64,
    pub congestion_sum: f64,
    pub max_transfer_difficulty: f64,

    pub current_station: StationId,
    pub current_line: Option<LineId>,
    pub current_direction: Option<Direction>,

    pub visited: VisitedSet,
    pub depth: u32,
    pub transfer_info: Option<TransferInfo>,
    pub is_first_move: bool,
    pub created_round: u32,
}

impl Label {
    /// Root labels start at `depth = 1` (spec.md §3 invariant 2), so this
    /// never divides by zero; matches `label.py::avg_convenience`.
    pub fn avg_convenience(&self) -> f64 {
        self.convenience_sum / self.depth as f64
    }

    pub fn avg_congestion(&self) -> f64 {
        self.congestion_sum / self.depth as f64
    }

    /// The 5-criterion vector in minimize-better order: transfers, max
    /// transfer difficulty, arrival time, avg congestion, and
    /// `1 - avg_convenience` (so every criterion is "lower is better"),
    /// matching `label.py::dominates`.
    fn minimizing_vector(&self) -> [f64; 5] {
        [
            self.transfers as f64,
            self.max_transfer_difficulty,
            self.arrival_time,
            self.avg_congestion(),
            1.0 - self.avg_convenience(),
        ]
    }

    /// True if `self` dominates `other`: no worse in any criterion and
    /// strictly better in at least one (`label.py::dominates`). Dominance is
    /// only meaningful between labels at the same `(current_station,
    /// current_line, transfers)` state — `label.py::dominates` returns False
    /// immediately otherwise, so a 0-transfer label on one line can never
    /// evict a 1-transfer label on another line at the same station.
    pub fn dominates(&self, other: &Label) -> bool {
        if self.current_station != other.current_station
            || self.current_line != other.current_line
            || self.transfers != other.transfers
        {
            return false;
        }
        let a = self.minimizing_vector();
        let b = other.minimizing_vector();
        let mut strictly_better = false;
        for i in 0..5 {
            if a[i] > b[i] + f64::EPSILON {
                return false;
            }
            if a[i] < b[i] - f64::EPSILON {
                strictly_better = true;
            }
        }
        strictly_better
    }

    /// Normalized criteria vector used for ε-similarity distance
    /// (`label.py::get_normalized_vector`): time/90, transfers/3, difficulty
    /// as-is, convenience/5, congestion/1.3.
    pub fn normalized_vector(&self) -> [f64; 5] {
        [
            self.arrival_time / crate::config::EPS_TIME_NORM_MIN,
            self.transfers as f64 / crate::config::EPS_TRANSFERS_NORM,
            self.max_transfer_difficulty,
            self.avg_convenience() / crate::config::EPS_CONVENIENCE_NORM,
            self.avg_congestion() / crate::config::EPS_CONGESTION_NORM,
        ]
    }

    /// Weighted Euclidean distance between two labels' normalized vectors,
    /// using the profile's ANP criteria weights in the same column order as
    /// `normalized_vector` (time/transfers/difficulty/convenience/congestion,
    /// matching `CriteriaWeights`'s field order positionally).
    pub fn weighted_distance(&self, other: &Label, weights: &CriteriaWeights) -> f64 {
        let a = self.normalized_vector();
        let b = other.normalized_vector();
        let w = [
            weights.travel_time,
            weights.transfers,
            weights.transfer_difficulty,
            weights.convenience,
            weights.congestion,
        ];
        let sum: f64 = (0..5).map(|i| w[i] * (a[i] - b[i]).powi(2)).sum();
        sum.sqrt()
    }

    pub fn epsilon_similar(&self, other: &Label, weights: &CriteriaWeights, epsilon: f64) -> bool {
        self.weighted_distance(other, weights) < epsilon
    }

    /// Scalar score used to rank and to break ties among ε-similar labels
    /// (`label.py::calculate_weighted_score`); lower is better.
    pub fn weighted_score(&self, weights: &CriteriaWeights) -> f64 {
        let time_n = (self.arrival_time / crate::config::SCORE_TIME_NORM_MIN).min(1.0);
        let transfers_n = (self.transfers as f64 / crate::config::SCORE_TRANSFERS_NORM).min(1.0);
        let convenience_n = 1.0 - (self.avg_convenience() / crate::config::SCORE_CONVENIENCE_NORM);
        let congestion_n = self.avg_congestion().min(1.0) / crate::config::SCORE_CONGESTION_NORM;

        weights.travel_time * time_n
            + weights.transfers * transfers_n
            + weights.transfer_difficulty * self.max_transfer_difficulty
            + weights.convenience * convenience_n
            + weights.congestion * congestion_n
    }
}

/// Bounded Pareto frontier for one (station, transfer count) bucket, indices
/// into the caller's label arena (spec.md §4.D). Mirrors
/// `mc_raptor.py::_update_pareto_frontier`.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    members: Vec<LabelId>,
}

impl Frontier {
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    pub fn members(&self) -> &[LabelId] {
        &self.members
    }

    /// Attempts to add `candidate` to the frontier, consulting `arena` for
    /// the actual label data (since the frontier itself only stores ids).
    /// Returns `true` if the candidate was accepted (and may have evicted
    /// existing members), matching `_update_pareto_frontier`'s five steps:
    /// 1. reject if dominated by an existing member,
    /// 2. reject if ε-similar to an existing member with an equal-or-better score,
    /// 3. otherwise drop existing members dominated by the candidate,
    /// 4. append the candidate,
    /// 5. bound to `config::MAX_LABELS_PER_STATE`, keeping the best-scoring.
    pub fn try_add(
        &mut self,
        candidate: LabelId,
        arena: &[Label],
        weights: &CriteriaWeights,
        epsilon: f64,
    ) -> bool {
        let cand = &arena[candidate as usize];

        for &existing_id in &self.members {
            let existing = &arena[existing_id as usize];
            if existing.dominates(cand) {
                return false;
            }
            if existing.epsilon_similar(cand, weights, epsilon)
                && existing.weighted_score(weights) <= cand.weighted_score(weights)
            {
                return false;
            }
        }

        self.members.retain(|&id| !cand.dominates(&arena[id as usize]));
        self.members.push(candidate);

        if self.members.len() > crate::config::MAX_LABELS_PER_STATE {
            self.members
                .sort_by(|&a, &b| {
                    arena[a as usize]
                        .weighted_score(weights)
                        .partial_cmp(&arena[b as usize].weighted_score(weights))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            self.members.truncate(crate::config::MAX_LABELS_PER_STATE);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_label(id: LabelId) -> Label {
        Label {
            id,
            parent: None,
            arrival_time: 30.0,
            transfers: 0,
            convenience_sum: 0.0,
            congestion_sum: 0.0,
            max_transfer_difficulty: 0.0,
            current_station: 0,
            current_line: None,
            current_direction: None,
            visited: VisitedSet::empty(),
            depth: 1,
            transfer_info: None,
            is_first_move: true,
            created_round: 0,
        }
    }

    #[test]
    fn visited_set_tracks_pushed_stations() {
        let set = VisitedSet::empty().push(1).push(2);
        assert!(set.contains(1));
        assert!(set.contains(2));
        assert!(!set.contains(3));
    }

    #[test]
    fn visited_set_clones_share_history_independently() {
        let base = VisitedSet::empty().push(1);
        let left = base.push(2);
        let right = base.push(3);
        assert!(left.contains(1) && left.contains(2) && !left.contains(3));
        assert!(right.contains(1) && right.contains(3) && !right.contains(2));
    }

    #[test]
    fn strictly_better_label_dominates() {
        let mut better = base_label(0);
        better.arrival_time = 20.0;
        let worse = base_label(1);
        assert!(better.dominates(&worse));
        assert!(!worse.dominates(&better));
    }

    #[test]
    fn equal_labels_do_not_dominate_each_other() {
        let a = base_label(0);
        let b = base_label(1);
        assert!(!a.dominates(&b));
        assert!(!b.dominates(&a));
    }

    #[test]
    fn frontier_rejects_dominated_candidate() {
        let weights = crate::anp::weights(crate::network::Profile::Eld);
        let mut good = base_label(0);
        good.arrival_time = 10.0;
        let mut bad = base_label(1);
        bad.arrival_time = 50.0;
        let arena = vec![good, bad];
        let mut frontier = Frontier::new();
        assert!(frontier.try_add(0, &arena, &weights, 0.02));
        assert!(!frontier.try_add(1, &arena, &weights, 0.02));
    }

    #[test]
    fn frontier_bounds_to_max_labels_per_state() {
        let weights = crate::anp::weights(crate::network::Profile::Eld);
        let mut arena = Vec::new();
        for i in 0..(crate::config::MAX_LABELS_PER_STATE + 20) {
            let mut l = base_label(i as u32);
            l.arrival_time = 100.0 - i as f64 * 0.01;
            l.transfers = (i % 5) as u32;
            arena.push(l);
        }
        let mut frontier = Frontier::new();
        for i in 0..arena.len() {
            frontier.try_add(i as u32, &arena, &weights, 0.0);
        }
        assert!(frontier.members().len() <= crate::config::MAX_LABELS_PER_STATE);
    }
}
