//! Photon selection for a photon + jet analysis.
//!
//! Events are read from JSON-lines files, filtered by a prioritised photon
//! trigger menu and scanned for barrel photons that pass a cut-based
//! identification. Control plots are filled for every event (`all`) and for
//! events with at least one selected photon (`sel`), then written to Parquet
//! or JSON.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod effective_area;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod histoer;
pub mod output;
pub mod photon_id;
pub mod pipeline;
pub mod trigger;

pub use config::RunConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use event_loop::{RunSummary, run_analysis};
