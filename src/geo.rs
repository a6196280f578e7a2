//! Great-circle distance between coordinates, memoized process-wide.
//!
//! Generalizes `raptor::network::NetworkPoint::distance` (which uses an
//! equirectangular approximation suited to a single small metro area) into
//! the haversine formula spec.md §4.A requires, with an explicit memo rather
//! than the teacher's un-memoized per-call computation.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Newtype so `f64` coordinates can key a `HashMap` (floats aren't `Eq`/`Hash`).
/// Equality/hash are bit-for-bit, which is fine here: memo keys come from the
/// same `Station` records every time, so bit-identical doubles recur exactly.
#[derive(Clone, Copy, Debug)]
struct OrderedCoord(f64);

impl PartialEq for OrderedCoord {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for OrderedCoord {}
impl std::hash::Hash for OrderedCoord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

type MemoKey = (OrderedCoord, OrderedCoord, OrderedCoord, OrderedCoord);

fn memo() -> &'static Mutex<HashMap<MemoKey, f64>> {
    static MEMO: OnceLock<Mutex<HashMap<MemoKey, f64>>> = OnceLock::new();
    MEMO.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Great-circle distance between two coordinates (degrees in, meters out).
/// Symmetric, non-negative, zero iff both points coincide. Memoized on the
/// 4-tuple of input coordinates in a process-wide, lock-protected cache.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let key = (
        OrderedCoord(lat1),
        OrderedCoord(lon1),
        OrderedCoord(lat2),
        OrderedCoord(lon2),
    );

    if let Some(&cached) = memo().lock().unwrap().get(&key) {
        return cached;
    }

    let (lat1_r, lon1_r, lat2_r, lon2_r) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2_r - lat1_r;
    let dlon = lon2_r - lon1_r;
    let a = (dlat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    let distance = EARTH_RADIUS_M * c;

    memo().lock().unwrap().insert(key, distance);
    distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_distance_m(37.5665, 126.9780, 37.5665, 126.9780), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = haversine_distance_m(37.5665, 126.9780, 37.4979, 127.0276);
        let b = haversine_distance_m(37.4979, 127.0276, 37.5665, 126.9780);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn non_negative_and_matches_known_value() {
        // Seoul City Hall to Gangnam station, roughly 9.4 km apart.
        let d = haversine_distance_m(37.5663, 126.9779, 37.4979, 127.0276);
        assert!(d > 0.0);
        assert!((d - 9_400.0).abs() < 1_500.0);
    }

    #[test]
    fn memoizes_repeated_queries() {
        let before = memo().lock().unwrap().len();
        haversine_distance_m(1.23456, 2.34567, 3.45678, 4.56789);
        let mid = memo().lock().unwrap().len();
        haversine_distance_m(1.23456, 2.34567, 3.45678, 4.56789);
        let after = memo().lock().unwrap().len();
        assert_eq!(mid, before + 1);
        assert_eq!(after, mid);
    }
}
