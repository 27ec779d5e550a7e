//! Outbound Delivery
//!
//! Writes rendered 315 batches into per-partner folders under a drop root.
//! Downstream transfer jobs pick the files up from there.
//!
//! ```text
//! <root>/
//!   ACME/315_ACME_20151201101500123_1a2b3c4d.xml
//!   ACME_test/315_ACME_test_20151201101500456_5e6f7a8b.xml
//! ```
//!
//! Files are written under a hidden temporary name and renamed into place,
//! so a reader never observes a partial batch.

pub mod file_drop;

pub use file_drop::FileDropDelivery;
