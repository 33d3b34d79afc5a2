// src/core/mod.rs

// The client side of the scan-service contract. Nothing in here knows about
// the terminal; the UI only reads from these types and calls `ScanService`.

/// Scan tasks, results and their wire formats, with the invariants that keep
/// impossible states out.
pub mod models;

/// The error kinds every backend call can end in.
pub mod error;

/// The backend trait and its HTTP implementation.
pub mod backend;

/// Retry policy, stop idempotence and result gating on top of a backend.
pub mod service;

/// Last-observed task list, refreshed wholesale from the backend.
pub mod registry;

/// Request tickets that keep late responses out of the wrong view.
pub mod ticket;

/// Report artifacts and how they reach the user's disk.
pub mod report;

/// Severity breakdown, risk score and grouped recommendations for a result.
pub mod analysis;
