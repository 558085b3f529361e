//! Persistence primitives: the `subscriptions` entity and pool bootstrap.
//!
//! The table is owned by an external schema process; [`SCHEMA_SQL`] is the
//! reference definition it is expected to match.

pub mod db;
pub mod subscription;

/// Reference DDL for the `subscriptions` table.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
