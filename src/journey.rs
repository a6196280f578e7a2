//! Human-readable rendering of a ranked route (spec.md §4.F, ambient
//! presentation layer), playing the role `journey.rs::Journey`'s `Display`
//! impl played for the teacher: turning an internal reconstruction into the
//! "Board at ... / Arrive at ..." text a caller can print directly.

use std::fmt;

use crate::network::NetworkData;
use crate::ranking::RankedRoute;
use crate::reconstruct::Segment;
use crate::utils::get_time_str;

/// Borrows a ranked route and the network it was computed against just long
/// enough to render it; produced by `describe`.
pub struct JourneyDescription<'a> {
    route: &'a RankedRoute,
    network: &'a NetworkData,
}

pub fn describe<'a>(route: &'a RankedRoute, network: &'a NetworkData) -> JourneyDescription<'a> {
    JourneyDescription { route, network }
}

fn station_label(network: &NetworkData, station: crate::network::StationId) -> String {
    network
        .station(station)
        .map(|s| s.name.to_string())
        .unwrap_or_else(|| format!("station#{station}"))
}

impl fmt::Display for JourneyDescription<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-----------------------------------------------")?;
        if self.route.path.segments.is_empty() {
            writeln!(f, "No journey found.")?;
            writeln!(f, "-----------------------------------------------")?;
            return Ok(());
        }

        for segment in &self.route.path.segments {
            match segment {
                Segment::Ride { line, stations, arrival_time, .. } => {
                    let first = stations.first().copied().unwrap_or(self.route.path.origin);
                    let last = stations.last().copied().unwrap_or(self.route.path.destination);
                    writeln!(
                        f,
                        "Ride {} line from {} to {} (arrive {}).",
                        line,
                        station_label(self.network, first),
                        station_label(self.network, last),
                        get_time_str(*arrival_time),
                    )?;
                }
                Segment::Transfer { info, arrival_time } => {
                    writeln!(
                        f,
                        "Transfer at {} from {} line to {} line (arrive {}).",
                        station_label(self.network, info.station),
                        info.from_line,
                        info.to_line,
                        get_time_str(*arrival_time),
                    )?;
                }
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Arrival {}, {} transfer(s), avg convenience {:.2}, avg congestion {:.2}.",
            get_time_str(self.route.arrival_time),
            self.route.transfers,
            self.route.avg_convenience,
            self.route.avg_congestion,
        )?;
        writeln!(f, "-----------------------------------------------")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{LineId, NetworkDataBuilder, Profile};
    use crate::utils::CancellationToken;
    use std::sync::Arc;

    #[test]
    fn renders_a_route_without_panicking() {
        let mut b = NetworkDataBuilder::new();
        let line: LineId = Arc::from("L1");
        let a = b.add_station("A", "Alpha", line.clone(), 37.50, 127.00);
        let z = b.add_station("Z", "Zulu", line.clone(), 37.52, 127.02);
        b.build_line_from_order(line, &[a, z], false);
        let network = b.build();

        let departure = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let cancel = CancellationToken::new();
        let result = crate::engine::find_routes(&network, a, &[z], Profile::Vis, departure, 5, &cancel).unwrap();
        let ranked = crate::ranking::rank_routes(&result, 1);
        assert!(!ranked.is_empty());

        let text = describe(&ranked[0], &network).to_string();
        assert!(text.contains("Arrival"));
    }
}
