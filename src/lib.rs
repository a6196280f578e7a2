//! Accessibility-aware Multi-Criteria RAPTOR (McRAPTOR) transit routing.
//!
//! `engine::find_routes` runs the search against a loaded `NetworkData` for
//! a given rider `Profile`, `reconstruct`/`ranking` turn its terminal labels
//! into ranked, human-describable routes, and `journey::describe` renders
//! one for display.

pub mod anp;
pub mod config;
pub mod engine;
pub mod errors;
pub mod geo;
pub mod journey;
pub mod label;
pub mod network;
pub mod ranking;
pub mod reconstruct;
pub mod utils;

pub use engine::{find_routes, QueryResult};
pub use errors::{LoadError, RoutingError};
pub use journey::describe;
pub use network::{Direction, LineId, NetworkData, NetworkDataBuilder, Profile, StationId};
pub use ranking::{rank_routes, RankedRoute};
pub use reconstruct::{reconstruct, Path, Segment};
pub use utils::CancellationToken;
