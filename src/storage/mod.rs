//!  Storage is organized through [interval_store::IntervalStore].
//!  The basic idea is:
//!   - There is a single append-only file of interval records.
//!   - Every record is a closed focus period for one application.
//!   - Records are never updated or deleted, only appended and scanned.

pub mod entities;
pub mod interval_store;
