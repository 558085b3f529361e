//! Service layer for subscription records.
//! - `subscription`: wire/stored model, date conversion, repository seam and
//!   the `SubscriptionService` business rules.
//! - `db`: the SQL statements behind the SeaORM repository.

pub mod db;
pub mod errors;
pub mod subscription;
#[cfg(test)]
pub mod test_support;
