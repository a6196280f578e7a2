//! Shared example data for demos/benches/tests: a small synthetic metro
//! instead of a GTFS feed, since the new domain's topology, transfers, and
//! congestion aren't expressible in GTFS.

use std::sync::Arc;

use access_raptor::network::{Direction, LineId, NetworkData, NetworkDataBuilder, Profile};
use access_raptor::utils::DayType;
use access_raptor::StationId;
use chrono::NaiveDate;

pub fn get_example_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid example date")
}

pub fn get_example_start_time() -> chrono::NaiveDateTime {
    get_example_date().and_hms_opt(8, 30, 0).expect("valid example time")
}

/// Two straight lines crossing at "Central", plus a small circular line,
/// standing in for the original's Seoul subway network: `LINE_1` runs
/// Westgate..Eastgate through Central, `LINE_2` runs Northpoint..Southpoint
/// through Central, and `LOOP` is a 4-station circular line sharing its
/// "Central Loop" stop's name with Central so a transfer resolves by name.
pub fn build_example_network() -> NetworkData {
    let mut builder = NetworkDataBuilder::new();
    let line1: LineId = Arc::from("LINE_1");
    let line2: LineId = Arc::from("LINE_2");
    let loop_line: LineId = Arc::from("LOOP");
    let mut builder = builder.with_circular_lines([loop_line.clone()]);

    let westgate = builder.add_station("L1-01", "Westgate", line1.clone(), 37.550, 126.900);
    let midwest = builder.add_station("L1-02", "Midwest", line1.clone(), 37.555, 126.950);
    let central1 = builder.add_station("L1-03", "Central", line1.clone(), 37.560, 127.000);
    let mideast = builder.add_station("L1-04", "Mideast", line1.clone(), 37.565, 127.050);
    let eastgate = builder.add_station("L1-05", "Eastgate", line1.clone(), 37.570, 127.100);
    builder.build_line_from_order(line1.clone(), &[westgate, midwest, central1, mideast, eastgate], false);

    let northpoint = builder.add_station("L2-01", "Northpoint", line2.clone(), 37.620, 127.000);
    let midnorth = builder.add_station("L2-02", "Midnorth", line2.clone(), 37.590, 127.000);
    let central2 = builder.add_station("L2-03", "Central", line2.clone(), 37.560, 127.000);
    let midsouth = builder.add_station("L2-04", "Midsouth", line2.clone(), 37.530, 127.000);
    let southpoint = builder.add_station("L2-05", "Southpoint", line2.clone(), 37.500, 127.000);
    builder.build_line_from_order(line2.clone(), &[northpoint, midnorth, central2, midsouth, southpoint], false);

    let loop_a = builder.add_station("LOOP-01", "Loop Alpha", loop_line.clone(), 37.560, 127.000);
    let loop_b = builder.add_station("LOOP-02", "Loop Beta", loop_line.clone(), 37.562, 127.005);
    let loop_c = builder.add_station("LOOP-03", "Loop Gamma", loop_line.clone(), 37.560, 127.010);
    let loop_d = builder.add_station("LOOP-04", "Loop Delta", loop_line.clone(), 37.558, 127.005);
    builder.build_line_from_order(loop_line.clone(), &[loop_a, loop_b, loop_c, loop_d], true);

    builder.add_transfer(central1, line1.clone(), line2.clone(), 95.0, Default::default());
    builder.add_transfer(central2, line2.clone(), line1.clone(), 95.0, Default::default());

    for (station, line, direction) in [
        (central1, line1.clone(), Direction::Up),
        (central1, line1.clone(), Direction::Down),
        (central2, line2.clone(), Direction::Up),
        (central2, line2.clone(), Direction::Down),
    ] {
        builder.add_congestion_slot(station, line.clone(), direction, DayType::Weekday, 480, 0.85);
        builder.add_congestion_slot(station, line, direction, DayType::Weekday, 1080, 0.75);
    }

    builder.build()
}

pub fn example_origin(network: &NetworkData) -> StationId {
    network.station_id("L1-01").expect("Westgate present in example network")
}

pub fn example_destination(network: &NetworkData) -> StationId {
    network.station_id("L2-05").expect("Southpoint present in example network")
}

pub fn example_profile() -> Profile {
    Profile::Eld
}
