//! Read-only network data provider (spec.md §4.B).
//!
//! Generalizes `raptor::network::Network`: stations are interned into a
//! dense `StationId` the same way `raptor::network::Stop`/`stop_index` intern
//! GTFS stop ids, and `lines_at` is backed by the same CSR-flattened layout
//! as `Network::stop_routes`/`Stop::{routes_idx, num_routes}` — the one part
//! of the teacher's storage layout that solves the same problem here as it
//! did there. Topology, order, transfers, and congestion are instead keyed
//! exactly as spec.md §3 describes, since GTFS has no equivalent of a
//! pre-computed per-direction downstream list.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::LoadError;
use crate::utils::{time_slot, DayType};
use chrono::NaiveDateTime;

pub type StationId = u32;
/// Line identifiers are interned `Arc<str>`, exactly as `raptor::network::Route::line`
/// is — cheap to clone, and usable directly as a map key (Arc<str> forwards
/// `Hash`/`Eq` to the underlying `str`).
pub type LineId = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    In,
    Out,
}

/// Rider profile driving ANP weights, ε, walking speed, and facility preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Phy,
    Vis,
    Aud,
    Eld,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Profile::Phy => "PHY",
            Profile::Vis => "VIS",
            Profile::Aud => "AUD",
            Profile::Eld => "ELD",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Profile {
    type Err = crate::errors::RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PHY" => Ok(Profile::Phy),
            "VIS" => Ok(Profile::Vis),
            "AUD" => Ok(Profile::Aud),
            "ELD" => Ok(Profile::Eld),
            other => Err(crate::errors::RoutingError::UnknownProfile(other.to_string())),
        }
    }
}

pub const ALL_PROFILES: [Profile; 4] = [Profile::Phy, Profile::Vis, Profile::Aud, Profile::Eld];

#[derive(Debug, Clone)]
pub struct Station {
    pub code: Box<str>,
    pub name: Box<str>,
    pub line: LineId,
    pub latitude: f64,
    pub longitude: f64,
}

/// Downstream station lists for each of the four directions, per spec.md §3.
/// `up`/`down` are populated for ordinary lines, `in`/`out` for circular ones;
/// the unused pair is always empty.
#[derive(Debug, Clone, Default)]
pub struct DownstreamEntry {
    pub up: Vec<StationId>,
    pub down: Vec<StationId>,
    pub in_: Vec<StationId>,
    pub out: Vec<StationId>,
}

impl DownstreamEntry {
    pub fn directions(&self, is_circular: bool) -> [(Direction, &[StationId]); 2] {
        if is_circular {
            [(Direction::In, &self.in_), (Direction::Out, &self.out)]
        } else {
            [(Direction::Up, &self.up), (Direction::Down, &self.down)]
        }
    }

    pub fn get(&self, direction: Direction) -> &[StationId] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::In => &self.in_,
            Direction::Out => &self.out,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FacilityScores {
    pub elevator: f64,
    pub escalator: f64,
    pub transfer_walk: f64,
    pub other_facil: f64,
    pub staff_help: f64,
}

#[derive(Debug, Clone)]
pub struct TransferRecord {
    pub distance_m: f64,
    /// Facility scores (not weights) for this transfer, keyed by profile.
    pub facility_scores: HashMap<Profile, FacilityScores>,
}

/// Read-only, `Send + Sync` network snapshot, loaded once at startup and
/// shared across concurrent queries (spec.md §5).
pub struct NetworkData {
    stations: Vec<Station>,
    code_index: HashMap<Box<str>, StationId>,
    /// (station name, line) -> station id, used to resolve a transfer's
    /// destination line at the same physical location by name match.
    name_line_index: HashMap<(Box<str>, LineId), StationId>,

    // CSR-flattened station -> lines, mirroring `Network::{stop_routes, Stop::routes_idx/num_routes}`.
    station_lines: Vec<LineId>,
    station_lines_range: Vec<(u32, u32)>,

    topology: HashMap<(StationId, LineId), DownstreamEntry>,
    order: HashMap<(StationId, LineId), u32>,
    transfers: HashMap<(StationId, LineId, LineId), TransferRecord>,
    congestion: HashMap<(StationId, LineId, Direction, DayType), HashMap<u16, f64>>,
    circular_lines: HashSet<LineId>,
}

impl NetworkData {
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id as usize)
    }

    pub fn station_id(&self, code: &str) -> Option<StationId> {
        self.code_index.get(code).copied()
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn lines_at(&self, station: StationId) -> &[LineId] {
        match self.station_lines_range.get(station as usize) {
            Some(&(offset, len)) => &self.station_lines[offset as usize..(offset + len) as usize],
            None => &[],
        }
    }

    pub fn is_circular(&self, line: &LineId) -> bool {
        self.circular_lines.contains(line)
    }

    pub fn downstream(&self, station: StationId, line: &LineId) -> Option<&DownstreamEntry> {
        self.topology.get(&(station, line.clone()))
    }

    pub fn order(&self, station: StationId, line: &LineId) -> Option<u32> {
        self.order.get(&(station, line.clone())).copied()
    }

    pub fn transfer(&self, station: StationId, from_line: &LineId, to_line: &LineId) -> Option<&TransferRecord> {
        self.transfers.get(&(station, from_line.clone(), to_line.clone()))
    }

    /// Resolves the station code for the same physical location on another
    /// line, by matching on station name — the Rust equivalent of the
    /// original's `_get_station_cd_by_name`, but backed by a prebuilt index
    /// instead of a linear scan.
    pub fn station_on_line(&self, station: StationId, line: &LineId) -> Option<StationId> {
        let current = self.station(station)?;
        self.name_line_index
            .get(&(current.name.clone(), line.clone()))
            .copied()
    }

    /// Facility-weighted convenience of `station` itself, independent of any
    /// specific transfer pair — mirrors `_get_convenience_score`'s scan over
    /// every transfer recorded at the station, using the first one that has
    /// facility data for `profile`. Falls back to
    /// `config::DEFAULT_CONVENIENCE_SCORE` when the station has no facility
    /// data on file at all.
    pub fn station_convenience(&self, station: StationId, profile: Profile) -> f64 {
        let facility_scores = self
            .transfers
            .iter()
            .find(|((s, _, _), record)| *s == station && record.facility_scores.contains_key(&profile))
            .map(|(_, record)| record.facility_scores[&profile]);

        match facility_scores {
            Some(scores) => {
                let preferences = crate::config::default_facility_preferences(profile);
                crate::anp::facility_weighted_convenience(&preferences, &scores)
            }
            None => crate::config::DEFAULT_CONVENIENCE_SCORE,
        }
    }

    /// Congestion load in `[0, ~1.4]` at `(station, line, direction)` for the
    /// 30-minute slot containing `departure_instant`. Missing data
    /// substitutes `config::DEFAULT_CONGESTION`, never fails the query.
    pub fn congestion(
        &self,
        station: StationId,
        line: &LineId,
        direction: Direction,
        departure_instant: NaiveDateTime,
    ) -> f64 {
        let day_type = DayType::from_datetime(departure_instant);
        let slot = time_slot(departure_instant);
        self.congestion
            .get(&(station, line.clone(), direction, day_type))
            .and_then(|slots| slots.get(&slot))
            .copied()
            .unwrap_or(crate::config::DEFAULT_CONGESTION)
    }
}

/// Builder for an in-memory `NetworkData`, used directly by tests/demos and
/// by the CSV loader below.
#[derive(Default)]
pub struct NetworkDataBuilder {
    stations: Vec<Station>,
    code_index: HashMap<Box<str>, StationId>,
    topology: HashMap<(StationId, LineId), DownstreamEntry>,
    order: HashMap<(StationId, LineId), u32>,
    transfers: HashMap<(StationId, LineId, LineId), TransferRecord>,
    congestion: HashMap<(StationId, LineId, Direction, DayType), HashMap<u16, f64>>,
    circular_lines: HashSet<LineId>,
}

impl NetworkDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circular_lines(mut self, lines: impl IntoIterator<Item = LineId>) -> Self {
        self.circular_lines.extend(lines);
        self
    }

    /// Adds a station, returning its freshly interned `StationId`. Adding the
    /// same code twice replaces the earlier record in place.
    pub fn add_station(&mut self, code: &str, name: &str, line: LineId, latitude: f64, longitude: f64) -> StationId {
        if let Some(&existing) = self.code_index.get(code) {
            self.stations[existing as usize] = Station {
                code: code.into(),
                name: name.into(),
                line,
                latitude,
                longitude,
            };
            return existing;
        }
        let id = self.stations.len() as StationId;
        self.stations.push(Station {
            code: code.into(),
            name: name.into(),
            line,
            latitude,
            longitude,
        });
        self.code_index.insert(code.into(), id);
        id
    }

    pub fn set_order(&mut self, station: StationId, line: LineId, order: u32) {
        self.order.insert((station, line), order);
    }

    pub fn set_downstream(&mut self, station: StationId, line: LineId, entry: DownstreamEntry) {
        self.topology.insert((station, line), entry);
    }

    /// Builds `up`/`down` (or `in`/`out`, for circular lines) downstream
    /// lists for every station in `ordered_stations`, exactly the way the
    /// original's `_load_line_data` derives `line_stations` from a sorted
    /// station-order list: for station at position `i`, `up` is the reversed
    /// prefix and `down` is the suffix.
    pub fn build_line_from_order(&mut self, line: LineId, ordered_stations: &[StationId], is_circular: bool) {
        if is_circular {
            self.circular_lines.insert(line.clone());
        }
        for (i, &station) in ordered_stations.iter().enumerate() {
            self.set_order(station, line.clone(), i as u32);
            let up: Vec<StationId> = ordered_stations[..i].iter().rev().copied().collect();
            let down: Vec<StationId> = ordered_stations[i + 1..].to_vec();
            let entry = if is_circular {
                DownstreamEntry {
                    up: Vec::new(),
                    down: Vec::new(),
                    in_: down.clone(),
                    out: up.clone(),
                }
            } else {
                DownstreamEntry { up, down, in_: Vec::new(), out: Vec::new() }
            };
            self.set_downstream(station, line.clone(), entry);
        }
    }

    pub fn add_transfer(
        &mut self,
        station: StationId,
        from_line: LineId,
        to_line: LineId,
        distance_m: f64,
        facility_scores: HashMap<Profile, FacilityScores>,
    ) {
        self.transfers.insert(
            (station, from_line, to_line),
            TransferRecord { distance_m, facility_scores },
        );
    }

    pub fn add_congestion_slot(
        &mut self,
        station: StationId,
        line: LineId,
        direction: Direction,
        day_type: DayType,
        slot_minutes: u16,
        load: f64,
    ) {
        self.congestion
            .entry((station, line, direction, day_type))
            .or_default()
            .insert(slot_minutes, load);
    }

    pub fn build(self) -> NetworkData {
        let NetworkDataBuilder {
            stations,
            code_index,
            topology,
            order,
            transfers,
            congestion,
            circular_lines,
        } = self;

        // Stations sharing a name are the same physical location under
        // different lines; group them to build lines_at and the
        // name+line -> station index in one pass, mirroring how
        // `Network::new` derives `stop_routes` from `routes`.
        let mut by_name: HashMap<Box<str>, Vec<StationId>> = HashMap::new();
        for (idx, station) in stations.iter().enumerate() {
            by_name.entry(station.name.clone()).or_default().push(idx as StationId);
        }

        let mut station_lines: Vec<LineId> = Vec::new();
        let mut station_lines_range = vec![(0u32, 0u32); stations.len()];
        let mut name_line_index = HashMap::new();

        for group in by_name.values() {
            let lines: Vec<LineId> = group.iter().map(|&id| stations[id as usize].line.clone()).collect();
            for &id in group {
                let offset = station_lines.len() as u32;
                station_lines.extend(lines.iter().cloned());
                station_lines_range[id as usize] = (offset, lines.len() as u32);
            }
            for &id in group {
                name_line_index.insert((stations[id as usize].name.clone(), stations[id as usize].line.clone()), id);
            }
        }

        NetworkData {
            stations,
            code_index,
            name_line_index,
            station_lines,
            station_lines_range,
            topology,
            order,
            transfers,
            congestion,
            circular_lines,
        }
    }
}

/// Loads a network from a directory of flat CSV files, standing in for
/// "loaded once at startup from external storage" (the real relational store
/// is an explicit external collaborator per spec.md §1). Expects
/// `stations.csv`, `sections.csv`, `transfers.csv`, `congestion.csv`;
/// `circular_lines` is supplied by the caller, matching spec.md §4.B's "small
/// configuration set".
///
/// - stations.csv: code,name,line,latitude,longitude
/// - sections.csv: line,order,station_code   (pre-sorted stop order per line)
/// - transfers.csv: station_code,from_line,to_line,distance_m
/// - congestion.csv: station_code,line,direction,day_type,slot_minutes,load
pub fn load_csv_dir(dir: impl AsRef<Path>, circular_lines: HashSet<LineId>) -> Result<NetworkData, LoadError> {
    let dir = dir.as_ref();
    let mut builder = NetworkDataBuilder::new().with_circular_lines(circular_lines);

    read_stations(dir, &mut builder)?;
    read_sections(dir, &mut builder)?;
    read_transfers(dir, &mut builder)?;
    read_congestion(dir, &mut builder)?;

    Ok(builder.build())
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: path.display().to_string(),
        source,
    })
}

fn read_stations(dir: &Path, builder: &mut NetworkDataBuilder) -> Result<(), LoadError> {
    let path = dir.join("stations.csv");
    let mut reader = csv_reader(&path)?;
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv { path: path.display().to_string(), source })?;
        let (code, name, line, lat, lon) = (
            record.get(0),
            record.get(1),
            record.get(2),
            record.get(3),
            record.get(4),
        );
        match (code, name, line, lat, lon) {
            (Some(code), Some(name), Some(line), Some(lat), Some(lon)) => {
                let lat: f64 = lat.parse().map_err(|_| LoadError::MalformedRow {
                    file: "stations.csv".into(),
                    detail: format!("bad latitude for {code}"),
                })?;
                let lon: f64 = lon.parse().map_err(|_| LoadError::MalformedRow {
                    file: "stations.csv".into(),
                    detail: format!("bad longitude for {code}"),
                })?;
                builder.add_station(code, name, Arc::from(line), lat, lon);
            }
            _ => {
                return Err(LoadError::MalformedRow {
                    file: "stations.csv".into(),
                    detail: "expected code,name,line,latitude,longitude".into(),
                })
            }
        }
    }
    Ok(())
}

fn read_sections(dir: &Path, builder: &mut NetworkDataBuilder) -> Result<(), LoadError> {
    let path = dir.join("sections.csv");
    let mut reader = csv_reader(&path)?;
    let mut per_line: HashMap<LineId, Vec<(u32, StationId)>> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv { path: path.display().to_string(), source })?;
        let (line, order, code) = (record.get(0), record.get(1), record.get(2));
        match (line, order, code) {
            (Some(line), Some(order), Some(code)) => {
                let order: u32 = order.parse().map_err(|_| LoadError::MalformedRow {
                    file: "sections.csv".into(),
                    detail: format!("bad order for {code}"),
                })?;
                let station_id = builder.code_index.get(code).copied().ok_or_else(|| LoadError::MalformedRow {
                    file: "sections.csv".into(),
                    detail: format!("unknown station code {code}"),
                })?;
                per_line.entry(Arc::from(line)).or_default().push((order, station_id));
            }
            _ => {
                return Err(LoadError::MalformedRow {
                    file: "sections.csv".into(),
                    detail: "expected line,order,station_code".into(),
                })
            }
        }
    }
    for (line, mut ordered) in per_line {
        ordered.sort_by_key(|&(order, _)| order);
        let stations: Vec<StationId> = ordered.into_iter().map(|(_, s)| s).collect();
        let is_circular = builder.circular_lines.contains(&line);
        builder.build_line_from_order(line, &stations, is_circular);
    }
    Ok(())
}

fn read_transfers(dir: &Path, builder: &mut NetworkDataBuilder) -> Result<(), LoadError> {
    let path = dir.join("transfers.csv");
    if !path.exists() {
        return Ok(());
    }
    let mut reader = csv_reader(&path)?;
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv { path: path.display().to_string(), source })?;
        let (code, from_line, to_line, distance) = (
            record.get(0),
            record.get(1),
            record.get(2),
            record.get(3),
        );
        if let (Some(code), Some(from_line), Some(to_line), Some(distance)) = (code, from_line, to_line, distance) {
            let distance: f64 = distance.parse().unwrap_or(crate::config::DEFAULT_TRANSFER_DISTANCE_M);
            let station_id = builder.code_index.get(code).copied().ok_or_else(|| LoadError::MalformedRow {
                file: "transfers.csv".into(),
                detail: format!("unknown station code {code}"),
            })?;
            builder.add_transfer(station_id, Arc::from(from_line), Arc::from(to_line), distance, HashMap::new());
        }
    }
    Ok(())
}

fn read_congestion(dir: &Path, builder: &mut NetworkDataBuilder) -> Result<(), LoadError> {
    let path = dir.join("congestion.csv");
    if !path.exists() {
        return Ok(());
    }
    let mut reader = csv_reader(&path)?;
    for record in reader.records() {
        let record = record.map_err(|source| LoadError::Csv { path: path.display().to_string(), source })?;
        let fields: Vec<&str> = record.iter().collect();
        if fields.len() < 6 {
            continue;
        }
        let (code, line, direction, day_type, slot, load) =
            (fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]);
        let station_id = match builder.code_index.get(code).copied() {
            Some(id) => id,
            None => continue,
        };
        let direction = match direction {
            "up" => Direction::Up,
            "down" => Direction::Down,
            "in" => Direction::In,
            "out" => Direction::Out,
            _ => continue,
        };
        let day_type = match day_type {
            "sat" => DayType::Sat,
            "sun" => DayType::Sun,
            _ => DayType::Weekday,
        };
        let slot: u16 = slot.parse().unwrap_or(0);
        let load: f64 = load.parse().unwrap_or(crate::config::DEFAULT_CONGESTION);
        builder.add_congestion_slot(station_id, Arc::from(line), direction, day_type, slot, load);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_network() -> NetworkData {
        let mut b = NetworkDataBuilder::new();
        let line1: LineId = Arc::from("L1");
        let a = b.add_station("A", "Alpha", line1.clone(), 0.0, 0.0);
        let s = b.add_station("S1", "Sigma", line1.clone(), 0.1, 0.1);
        let d = b.add_station("D", "Delta", line1.clone(), 0.2, 0.2);
        b.build_line_from_order(line1, &[a, s, d], false);
        b.build()
    }

    #[test]
    fn lines_at_reflects_same_name_different_line_stations() {
        let mut b = NetworkDataBuilder::new();
        let l1: LineId = Arc::from("L1");
        let l2: LineId = Arc::from("L2");
        let s1 = b.add_station("S1", "Sigma", l1.clone(), 0.0, 0.0);
        let _s2 = b.add_station("S2", "Sigma", l2.clone(), 0.0, 0.0);
        let net = b.build();
        assert_eq!(net.lines_at(s1).len(), 2);
    }

    #[test]
    fn downstream_has_correct_up_down_lists() {
        let net = tiny_network();
        let s = net.station_id("S1").unwrap();
        let line: LineId = Arc::from("L1");
        let down = net.downstream(s, &line).unwrap();
        assert_eq!(down.down.len(), 1);
        assert_eq!(down.up.len(), 1);
    }

    #[test]
    fn missing_congestion_returns_default() {
        let net = tiny_network();
        let s = net.station_id("A").unwrap();
        let line: LineId = Arc::from("L1");
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(net.congestion(s, &line, Direction::Up, dt), crate::config::DEFAULT_CONGESTION);
    }
}
