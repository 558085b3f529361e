//! Subscription records: wire/stored mapping, persistence seam and service.

pub mod date;
pub mod domain;
pub mod repository;
pub mod service;

pub use date::MonthDate;
pub use domain::{CostFilter, CostQuery, Subscription, SubscriptionInput, SubscriptionRecord};
pub use repository::{SeaOrmSubscriptionRepository, SubscriptionRepository};
pub use service::SubscriptionService;
