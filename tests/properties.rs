//! Property-based tests for the engine's documented invariants and laws,
//! run against randomly-sized synthetic linear networks.

use std::sync::Arc;

use access_raptor::network::{LineId, NetworkDataBuilder, Profile};
use access_raptor::utils::CancellationToken;
use access_raptor::{find_routes, rank_routes};
use proptest::prelude::*;

fn build_linear_network(num_stations: usize) -> (access_raptor::NetworkData, Vec<access_raptor::StationId>) {
    let mut builder = NetworkDataBuilder::new();
    let line: LineId = Arc::from("L1");
    let mut stations = Vec::new();
    for i in 0..num_stations {
        let code = format!("S{i}");
        let name = format!("Station{i}");
        let id = builder.add_station(&code, &name, line.clone(), 37.5 + i as f64 * 0.01, 127.0 + i as f64 * 0.01);
        stations.push(id);
    }
    builder.build_line_from_order(line, &stations, false);
    (builder.build(), stations)
}

fn any_profile() -> impl Strategy<Value = Profile> {
    prop_oneof![
        Just(Profile::Phy),
        Just(Profile::Vis),
        Just(Profile::Aud),
        Just(Profile::Eld),
    ]
}

fn departure() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(8, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn weighted_score_is_always_non_negative(num_stations in 2usize..8, profile in any_profile()) {
        let (network, stations) = build_linear_network(num_stations);
        let origin = stations[0];
        let destination = *stations.last().unwrap();
        let cancel = CancellationToken::new();

        let result = find_routes(&network, origin, &[destination], profile, departure(), 5, &cancel).unwrap();
        for ranked in rank_routes(&result, 10) {
            prop_assert!(ranked.score >= -1e-9);
        }
    }

    #[test]
    fn frontier_never_exceeds_max_labels_per_state(num_stations in 2usize..8, profile in any_profile()) {
        let (network, stations) = build_linear_network(num_stations);
        let origin = stations[0];
        let destination = *stations.last().unwrap();
        let cancel = CancellationToken::new();

        let result = find_routes(&network, origin, &[destination], profile, departure(), 5, &cancel).unwrap();
        for frontier in result.frontiers.values() {
            prop_assert!(frontier.members().len() <= access_raptor::config::MAX_LABELS_PER_STATE);
        }
    }

    #[test]
    fn more_rounds_never_makes_the_best_reachable_score_worse(num_stations in 3usize..8, profile in any_profile()) {
        let (network, stations) = build_linear_network(num_stations);
        let origin = stations[0];
        let destination = *stations.last().unwrap();
        let cancel = CancellationToken::new();

        let few = find_routes(&network, origin, &[destination], profile, departure(), 1, &cancel).unwrap();
        let many = find_routes(&network, origin, &[destination], profile, departure(), 8, &cancel).unwrap();

        let few_best = rank_routes(&few, 1).first().map(|r| r.score);
        let many_best = rank_routes(&many, 1).first().map(|r| r.score);

        if let (Some(few_best), Some(many_best)) = (few_best, many_best) {
            prop_assert!(many_best <= few_best + 1e-9);
        }
    }

    #[test]
    fn a_label_never_dominates_itself(num_stations in 2usize..8, profile in any_profile()) {
        let (network, stations) = build_linear_network(num_stations);
        let origin = stations[0];
        let destination = *stations.last().unwrap();
        let cancel = CancellationToken::new();

        let result = find_routes(&network, origin, &[destination], profile, departure(), 5, &cancel).unwrap();
        for &id in &result.terminal_labels() {
            let label = result.label(id);
            prop_assert!(!label.dominates(label));
        }
    }

    #[test]
    fn repeated_queries_are_deterministic(num_stations in 2usize..8, profile in any_profile()) {
        let (network, stations) = build_linear_network(num_stations);
        let origin = stations[0];
        let destination = *stations.last().unwrap();

        let cancel_a = CancellationToken::new();
        let result_a = find_routes(&network, origin, &[destination], profile, departure(), 5, &cancel_a).unwrap();
        let cancel_b = CancellationToken::new();
        let result_b = find_routes(&network, origin, &[destination], profile, departure(), 5, &cancel_b).unwrap();

        let scores_a: Vec<f64> = rank_routes(&result_a, 10).iter().map(|r| r.score).collect();
        let scores_b: Vec<f64> = rank_routes(&result_b, 10).iter().map(|r| r.score).collect();
        prop_assert_eq!(scores_a, scores_b);
    }
}
