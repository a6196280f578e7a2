//! Turning a query's terminal labels into a ranked, deduplicated list of
//! routes (spec.md §4.F), generalizing `mc_raptor.py::rank_routes`.

use std::collections::HashSet;

use crate::engine::QueryResult;
use crate::label::{Label, LabelId, TransferInfo};
use crate::reconstruct::{reconstruct, Path};

#[derive(Debug, Clone)]
pub struct RankedRoute {
    pub label_id: LabelId,
    pub path: Path,
    pub score: f64,
    pub arrival_time: f64,
    pub transfers: u32,
    pub avg_convenience: f64,
    pub avg_congestion: f64,
    pub max_transfer_difficulty: f64,
}

fn transfer_signature(result: &QueryResult, label_id: LabelId) -> Vec<(u32, String, String)> {
    let mut cursor = Some(label_id);
    let mut signature = Vec::new();
    while let Some(id) = cursor {
        let label = result.label(id);
        if let Some(TransferInfo { station, from_line, to_line }) = &label.transfer_info {
            signature.push((*station, from_line.to_string(), to_line.to_string()));
        }
        cursor = label.parent;
    }
    signature.reverse();
    signature
}

fn describe(result: &QueryResult, label: &Label) -> RankedRoute {
    RankedRoute {
        label_id: label.id,
        path: reconstruct(result, label.id),
        score: label.weighted_score(&result.weights),
        arrival_time: label.arrival_time,
        transfers: label.transfers,
        avg_convenience: label.avg_convenience(),
        avg_congestion: label.avg_congestion(),
        max_transfer_difficulty: label.max_transfer_difficulty,
    }
}

/// Ranks `result`'s terminal labels by weighted score (ascending — lower is
/// better) and deduplicates routes that share the same transfer pattern,
/// keeping the best-scoring one of each, then returns the top `top_k`.
/// Matches `rank_routes`'s sort-then-dedupe-by-transfer-pattern behavior.
pub fn rank_routes(result: &QueryResult, top_k: usize) -> Vec<RankedRoute> {
    let mut terminals = result.terminal_labels();
    terminals.sort_by(|&a, &b| {
        result
            .label(a)
            .weighted_score(&result.weights)
            .partial_cmp(&result.label(b).weighted_score(&result.weights))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen_signatures: HashSet<Vec<(u32, String, String)>> = HashSet::new();
    let mut ranked = Vec::new();
    for id in terminals {
        let signature = transfer_signature(result, id);
        if !seen_signatures.insert(signature) {
            continue;
        }
        ranked.push(describe(result, result.label(id)));
        if ranked.len() >= top_k {
            break;
        }
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{LineId, NetworkDataBuilder, Profile};
    use crate::utils::CancellationToken;
    use std::sync::Arc;

    #[test]
    fn ranked_routes_are_sorted_by_score_ascending() {
        let mut b = NetworkDataBuilder::new();
        let line: LineId = Arc::from("L1");
        let a = b.add_station("A", "Alpha", line.clone(), 37.50, 127.00);
        let m = b.add_station("M", "Mid", line.clone(), 37.51, 127.01);
        let z = b.add_station("Z", "Zulu", line.clone(), 37.52, 127.02);
        b.build_line_from_order(line, &[a, m, z], false);
        let network = b.build();

        let departure = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let cancel = CancellationToken::new();
        let result = crate::engine::find_routes(&network, a, &[z], Profile::Eld, departure, 5, &cancel).unwrap();

        let ranked = rank_routes(&result, 3);
        assert!(!ranked.is_empty());
        for pair in ranked.windows(2) {
            assert!(pair[0].score <= pair[1].score + 1e-9);
        }
    }

    #[test]
    fn top_k_bounds_result_length() {
        let mut b = NetworkDataBuilder::new();
        let line: LineId = Arc::from("L1");
        let a = b.add_station("A", "Alpha", line.clone(), 37.50, 127.00);
        let z = b.add_station("Z", "Zulu", line.clone(), 37.52, 127.02);
        b.build_line_from_order(line, &[a, z], false);
        let network = b.build();

        let departure = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let cancel = CancellationToken::new();
        let result = crate::engine::find_routes(&network, a, &[z], Profile::Phy, departure, 5, &cancel).unwrap();

        let ranked = rank_routes(&result, 1);
        assert!(ranked.len() <= 1);
    }
}
