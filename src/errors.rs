//! Error taxonomy for the routing engine.
//!
//! Precondition violations are the only case that reaches the caller as an
//! `Err`; data gaps are always handled locally with documented defaults
//! (see `config`), and infeasibility is represented by an empty result, not
//! an error.

#[derive(thiserror::Error, Debug)]
pub enum RoutingError {
    #[error("unknown origin station")]
    UnknownOrigin,
    #[error("destination set is empty")]
    EmptyDestinations,
    #[error("unknown rider profile: {0}")]
    UnknownProfile(String),
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error reading {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("malformed row in {file}: {detail}")]
    MalformedRow { file: String, detail: String },
}
