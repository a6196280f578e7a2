//! Analytic Network Process (ANP) weight derivation (spec.md §4.C).
//!
//! Each rider profile's 5 criteria are compared pairwise into a reciprocal
//! matrix; the principal eigenvector (via power iteration, since nothing in
//! the retrieval pack pulls in a linear-algebra crate) gives the weight
//! vector, and the consistency ratio flags an incoherent matrix without
//! ever failing the query — it's logged and the derived weights are used
//! regardless, matching `anp_weights.py::calculate_weights`.

use crate::network::{FacilityScores, Profile};

/// Criteria order used throughout: travel time, transfers, transfer
/// difficulty, convenience, congestion. Matches `anp_weights.py`'s matrix
/// row/column order and its `calculate_weights` criteria list.
pub const NUM_CRITERIA: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriteriaWeights {
    pub travel_time: f64,
    pub transfers: f64,
    pub transfer_difficulty: f64,
    pub convenience: f64,
    pub congestion: f64,
}

impl CriteriaWeights {
    fn from_vector(v: [f64; NUM_CRITERIA]) -> Self {
        Self {
            travel_time: v[0],
            transfers: v[1],
            transfer_difficulty: v[2],
            convenience: v[3],
            congestion: v[4],
        }
    }
}

type Matrix = [[f64; NUM_CRITERIA]; NUM_CRITERIA];

/// Literal pairwise-comparison matrices from `anp_weights.py`'s
/// `_get_phy_matrix`/`_get_vis_matrix`/`_get_aud_matrix`/`_get_eld_matrix`,
/// in `(travel_time, transfers, transfer_difficulty, convenience, congestion)`
/// row/column order.
fn pairwise_matrix(profile: Profile) -> Matrix {
    match profile {
        // 휠체어 사용자: 환승횟수 > 환승난이도 > 편의도 > 혼잡도 > 소요시간
        Profile::Phy => [
            [1.0, 1.0 / 7.0, 1.0 / 5.0, 1.0 / 3.0, 1.0 / 2.0],
            [7.0, 1.0, 3.0, 5.0, 4.0],
            [5.0, 1.0 / 3.0, 1.0, 3.0, 2.0],
            [3.0, 1.0 / 5.0, 1.0 / 3.0, 1.0, 2.0],
            [2.0, 1.0 / 4.0, 1.0 / 2.0, 1.0 / 2.0, 1.0],
        ],
        // 저시력자: 편의도 > 환승난이도 > 환승횟수 > 혼잡도 > 소요시간
        Profile::Vis => [
            [1.0, 1.0 / 4.0, 1.0 / 3.0, 1.0 / 7.0, 1.0 / 3.0],
            [4.0, 1.0, 1.0 / 2.0, 1.0 / 5.0, 2.0],
            [3.0, 2.0, 1.0, 1.0 / 3.0, 3.0],
            [7.0, 5.0, 3.0, 1.0, 5.0],
            [3.0, 1.0 / 2.0, 1.0 / 3.0, 1.0 / 5.0, 1.0],
        ],
        // 청각장애인: 편의도 > 소요시간 > 환승난이도 > 환승횟수 > 혼잡도
        Profile::Aud => [
            [1.0, 1.0 / 4.0, 2.0, 1.0 / 7.0, 3.0],
            [4.0, 1.0, 3.0, 1.0 / 5.0, 5.0],
            [1.0 / 2.0, 1.0 / 3.0, 1.0, 1.0 / 7.0, 2.0],
            [7.0, 5.0, 7.0, 1.0, 8.0],
            [1.0 / 3.0, 1.0 / 5.0, 1.0 / 2.0, 1.0 / 8.0, 1.0],
        ],
        // 고령자: 혼잡도 > 환승난이도 > 환승횟수 > 편의도 > 소요시간
        Profile::Eld => [
            [1.0, 1.0 / 2.0, 1.0 / 3.0, 2.0, 1.0 / 4.0],
            [2.0, 1.0, 1.0 / 2.0, 3.0, 1.0 / 3.0],
            [3.0, 2.0, 1.0, 4.0, 1.0 / 2.0],
            [1.0 / 2.0, 1.0 / 3.0, 1.0 / 4.0, 1.0, 1.0 / 5.0],
            [4.0, 3.0, 2.0, 5.0, 1.0],
        ],
    }
}

/// Principal eigenvector via power iteration: repeatedly multiply by the
/// matrix and renormalize, which converges to the dominant eigenvector for
/// any positive reciprocal matrix. Mirrors `np.linalg.eig` + `abs` +
/// L1-normalize from the original, without pulling in a linalg dependency.
fn principal_eigenvector(matrix: &Matrix) -> [f64; NUM_CRITERIA] {
    let mut v = [1.0; NUM_CRITERIA];
    for _ in 0..200 {
        let mut next = [0.0; NUM_CRITERIA];
        for (row_idx, row) in matrix.iter().enumerate() {
            next[row_idx] = row.iter().zip(v.iter()).map(|(m, x)| m * x).sum();
        }
        let norm: f64 = next.iter().map(|x| x.abs()).sum();
        if norm > 0.0 {
            for x in &mut next {
                *x = x.abs() / norm;
            }
        }
        v = next;
    }
    v
}

/// Largest eigenvalue estimate via the Rayleigh quotient `v^T A v / v^T v`,
/// used for the consistency ratio.
fn max_eigenvalue(matrix: &Matrix, weights: &[f64; NUM_CRITERIA]) -> f64 {
    let mut sum = 0.0;
    for i in 0..NUM_CRITERIA {
        let row_sum: f64 = matrix[i].iter().zip(weights.iter()).map(|(m, w)| m * w).sum();
        if weights[i] > 1e-12 {
            sum += row_sum / weights[i];
        }
    }
    sum / NUM_CRITERIA as f64
}

fn random_index(n: usize) -> f64 {
    crate::config::RANDOM_INDEX
        .iter()
        .find(|&&(order, _)| order == n)
        .map(|&(_, ri)| ri)
        .unwrap_or(1.45)
}

/// Consistency ratio `(lambda_max - n) / (n - 1) / RI`. A ratio above
/// `config::CONSISTENCY_RATIO_WARN_THRESHOLD` is logged but never rejected —
/// the derived weights are used regardless, matching the original.
pub fn consistency_ratio(profile: Profile) -> f64 {
    let matrix = pairwise_matrix(profile);
    let weights = principal_eigenvector(&matrix);
    let lambda_max = max_eigenvalue(&matrix, &weights);
    let n = NUM_CRITERIA as f64;
    let ci = (lambda_max - n) / (n - 1.0);
    ci / random_index(NUM_CRITERIA)
}

/// Derives the criteria weight vector for `profile`, logging a warning if
/// the pairwise matrix is inconsistent.
pub fn weights(profile: Profile) -> CriteriaWeights {
    let matrix = pairwise_matrix(profile);
    let vector = principal_eigenvector(&matrix);
    let cr = consistency_ratio(profile);
    if cr > crate::config::CONSISTENCY_RATIO_WARN_THRESHOLD {
        log::warn!("ANP pairwise matrix for profile {profile} has consistency ratio {cr:.3} (> 0.1)");
    }
    CriteriaWeights::from_vector(vector)
}

/// Facility-weighted convenience score in `[0, 5]` (facility scores are raw
/// 0-5 ratings, weighted by preferences that sum to ~1.0), the dot product of
/// a station's facility scores and the profile's facility preference weights
/// (`_get_default_facility_preferences` combined with
/// `calculate_convenience_score`).
pub fn facility_weighted_convenience(preferences: &FacilityScores, scores: &FacilityScores) -> f64 {
    preferences.elevator * scores.elevator
        + preferences.escalator * scores.escalator
        + preferences.transfer_walk * scores.transfer_walk
        + preferences.other_facil * scores.other_facil
        + preferences.staff_help * scores.staff_help
}

/// Transfer difficulty in `[0, 1]`: 60% distance component (saturating at
/// `config::TRANSFER_DISTANCE_NORM_M`), 40% inconvenience. `convenience` is
/// on the `[0, 5]` scale `facility_weighted_convenience` returns, so the
/// inconvenience component divides it down to `[0, 1]` first, matching
/// `calculate_transfer_difficulty`.
pub fn transfer_difficulty(distance_m: f64, convenience: f64) -> f64 {
    let distance_score = (distance_m / crate::config::TRANSFER_DISTANCE_NORM_M).min(1.0);
    let inconvenience_score = 1.0 - (convenience / crate::config::SCORE_CONVENIENCE_NORM);
    0.6 * distance_score + 0.4 * inconvenience_score
}

/// Walking time for a transfer, at the profile's walking speed. No floor is
/// applied here — the 1-minute floor (`config::MIN_SEGMENT_TIME_MIN`) is a
/// ride-segment rule only, per `_create_new_label`'s inline computation.
pub fn transfer_walking_minutes(distance_m: f64, profile: Profile) -> f64 {
    let speed_m_per_min = crate::config::walking_speed_m_per_s(profile) * 60.0;
    distance_m / speed_m_per_min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_l1_normalized_and_nonnegative() {
        for profile in crate::network::ALL_PROFILES {
            let w = weights(profile);
            let sum = w.travel_time + w.transfers + w.transfer_difficulty + w.convenience + w.congestion;
            assert!((sum - 1.0).abs() < 1e-6, "profile {profile} weights sum to {sum}");
            assert!(w.travel_time >= 0.0 && w.transfers >= 0.0 && w.transfer_difficulty >= 0.0);
        }
    }

    #[test]
    fn all_profile_matrices_are_reasonably_consistent() {
        for profile in crate::network::ALL_PROFILES {
            let cr = consistency_ratio(profile);
            assert!(cr < 0.2, "profile {profile} consistency ratio {cr} too high");
        }
    }

    #[test]
    fn eld_weighs_congestion_heaviest() {
        let w = weights(Profile::Eld);
        assert!(w.congestion > w.transfer_difficulty);
        assert!(w.congestion > w.transfers);
        assert!(w.congestion > w.convenience);
        assert!(w.congestion > w.travel_time);
    }

    #[test]
    fn transfer_difficulty_saturates_at_distance_norm() {
        let d = transfer_difficulty(10_000.0, 5.0);
        assert!((d - 0.6).abs() < 1e-9);
    }

    #[test]
    fn transfer_difficulty_is_never_negative() {
        let d = transfer_difficulty(0.0, 5.0);
        assert!(d >= 0.0);
    }

    #[test]
    fn transfer_walking_minutes_has_no_floor() {
        let m = transfer_walking_minutes(0.1, Profile::Eld);
        assert!(m < crate::config::MIN_SEGMENT_TIME_MIN);
    }
}
