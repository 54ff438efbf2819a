//! 💀 The error taxonomy — a field guide to everything that goes wrong.
//!
//! Per-unit fetch errors ([`FetchError`]) are recovered where they land:
//! logged, tallied, and never allowed past the worker that hit them.
//! [`SourceError`] is the only run-aborting path, and only before a single
//! request has been issued. [`SinkError`] costs a dataset its snapshot,
//! never the run. Nothing here panics. We journal our feelings instead. 🦆

use std::path::PathBuf;

use thiserror::Error;

/// 📂 Failures loading the region-code input file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("region code file '{path}' not found")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("region code file '{path}' is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// 💥 Failures of a single (region, dataset) fetch. All variants are
/// terminal for that one unit of work only — one region grieves, the
/// queue moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 📡 Network, timeout, or an HTTP status with bad vibes.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// 🚫 A well-formed response whose embedded `result_Code` was not the
    /// success sentinel. The API answered. The answer was no.
    #[error("upstream rejected request (code {code}): {message}")]
    Rejected { code: String, message: String },

    /// 🗑️ A response body that was not, despite its confident headers, XML.
    #[error("malformed upstream payload: {0}")]
    MalformedPayload(#[from] quick_xml::Error),
}

/// 🗄️ Failures writing one dataset snapshot.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write dataset file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode csv rows for '{path}'")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
