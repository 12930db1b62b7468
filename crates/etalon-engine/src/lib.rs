//! # Etalon Reconciliation Engine
//!
//! Builds the state table: one row per registry observable, comparing
//! a theoretical prediction with an empirically measured value and
//! classifying the pair into one of five comparison states.
//!
//! The pipeline runs in fixed stages:
//!
//! 1. [`registry`] decodes the observable registry — the comparison
//!    contract fixing tolerances, allowed sources, and authority order.
//! 2. [`snapshot`] decodes the measurement snapshot into a
//!    per-observable candidate index plus document provenance.
//! 3. [`theory`] decodes the optional prediction document.
//! 4. [`select`] picks at most one winning measurement per observable
//!    under a deterministic composite ordering.
//! 5. [`vectorize`] and [`distance`] reduce both sides to numeric
//!    vectors and measure their separation.
//! 6. [`classify`] maps the outcome onto the five states.
//! 7. [`table`] renders everything to the fixed-column CSV.
//!
//! ## Determinism
//!
//! Identical inputs must produce byte-identical output. Nothing in the
//! engine consults wall-clock time, iteration over unordered maps
//! never reaches the output, selection ties break on total ordering
//! with a stable sort, and the table renders in memory before a single
//! write. Degraded data (unparseable values, unknown sources, stale
//! measurements) never aborts a run — it surfaces per row as a
//! comparison state, keeping one bad record from hiding the other
//! rows.

pub mod classify;
pub mod distance;
pub mod document;
pub mod error;
pub mod registry;
pub mod select;
pub mod snapshot;
pub mod table;
pub mod theory;
pub mod vectorize;

pub use classify::{classify, Classification, ComparisonState};
pub use distance::{
    compute_distance, distance_abs, distance_between, distance_l2, distance_relative,
    DistanceMetric, RELATIVE_FLOOR,
};
pub use document::read_json;
pub use error::{EngineError, EngineResult};
pub use registry::{ObservableRegistry, ObservableSpec, Tolerances};
pub use select::{
    select_measurement, select_with_policy, SelectionPolicy, RANK_NO_SOURCE, RANK_UNRANKED,
};
pub use snapshot::{Measurement, MeasurementIndex, Snapshot, SnapshotProvenance};
pub use table::{build_rows, render_csv, write_table, StateRow, TABLE_COLUMNS};
pub use theory::TheorySet;
pub use vectorize::vectorize;
