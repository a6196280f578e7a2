//! Fixed constants and default tables, treated as configuration by
//! `spec.md` §6 but expressed as plain consts — the same way
//! `raptor::raptor::K` hardcodes the round count rather than reading it from
//! a config file.

use crate::network::{FacilityScores, Profile};

/// Commercial vehicle speed used to derive ride segment times (m/min).
pub const COMMERCIAL_SPEED_M_PER_MIN: f64 = 550.0;
/// Minimum duration attributed to any single ride segment (minutes).
pub const MIN_SEGMENT_TIME_MIN: f64 = 1.0;

/// Distance at which `transfer_difficulty`'s distance component saturates (m).
pub const TRANSFER_DISTANCE_NORM_M: f64 = 300.0;

/// Weighted-score normalizers (spec.md §4.D / §6).
pub const SCORE_TIME_NORM_MIN: f64 = 120.0;
pub const SCORE_TRANSFERS_NORM: f64 = 4.0;
pub const SCORE_CONVENIENCE_NORM: f64 = 5.0;
pub const SCORE_CONGESTION_NORM: f64 = 1.0;

/// ε-similarity normalizers (spec.md §4.D).
pub const EPS_TIME_NORM_MIN: f64 = 90.0;
pub const EPS_TRANSFERS_NORM: f64 = 3.0;
pub const EPS_CONVENIENCE_NORM: f64 = 5.0;
pub const EPS_CONGESTION_NORM: f64 = 1.3;

/// Fallback transfer walking distance when no transfer record exists (m).
pub const DEFAULT_TRANSFER_DISTANCE_M: f64 = 133.09;
/// Fallback congestion load when no slot is recorded.
pub const DEFAULT_CONGESTION: f64 = 0.57;
/// Fallback convenience score when a station has no facility data on file,
/// matching `_get_convenience_score`'s "역 정보 없음" default.
pub const DEFAULT_CONVENIENCE_SCORE: f64 = 2.5;

/// Bound on the number of non-dominated labels kept per (station, line, transfers) bucket.
pub const MAX_LABELS_PER_STATE: usize = 50;

/// Default round budget for `find_routes` when the caller doesn't specify one.
pub const DEFAULT_MAX_ROUNDS: u32 = 5;
/// Default number of ranked journeys `rank_routes` returns.
pub const DEFAULT_TOP_K: usize = 3;

/// AHP/ANP random-index table, keyed by matrix order (Saaty's RI values).
pub const RANDOM_INDEX: [(usize, f64); 7] = [
    (3, 0.58),
    (4, 0.90),
    (5, 1.12),
    (6, 1.24),
    (7, 1.32),
    (8, 1.41),
    (9, 1.45),
];
/// Consistency ratio above which we log a warning (still using the derived weights).
pub const CONSISTENCY_RATIO_WARN_THRESHOLD: f64 = 0.1;

/// Rider-profile walking speed, in meters per second.
pub fn walking_speed_m_per_s(profile: Profile) -> f64 {
    match profile {
        Profile::Phy => 0.79,
        Profile::Vis => 0.76,
        Profile::Aud => 0.98,
        Profile::Eld => 0.65,
    }
}

/// ε-similarity threshold per rider profile.
pub fn epsilon(profile: Profile) -> f64 {
    match profile {
        Profile::Phy => 0.04,
        Profile::Vis => 0.05,
        Profile::Aud => 0.05,
        Profile::Eld => 0.02,
    }
}

/// Mandatory fallback facility-preference weights, used when no
/// operator-supplied preference table is available. Values are the literal
/// defaults from the original source (`_get_default_facility_preferences`).
pub fn default_facility_preferences(profile: Profile) -> FacilityScores {
    match profile {
        Profile::Phy => FacilityScores {
            elevator: 0.40,
            escalator: 0.10,
            transfer_walk: 0.25,
            other_facil: 0.15,
            staff_help: 0.10,
        },
        Profile::Vis => FacilityScores {
            elevator: 0.20,
            escalator: 0.25,
            transfer_walk: 0.20,
            other_facil: 0.15,
            staff_help: 0.20,
        },
        Profile::Aud => FacilityScores {
            elevator: 0.25,
            escalator: 0.30,
            transfer_walk: 0.25,
            other_facil: 0.10,
            staff_help: 0.10,
        },
        Profile::Eld => FacilityScores {
            elevator: 0.20,
            escalator: 0.30,
            transfer_walk: 0.20,
            other_facil: 0.15,
            staff_help: 0.15,
        },
    }
}
