use chrono::NaiveDate;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::date::MonthDate;

/// Subscription as it travels over HTTP. Dates are `MM-YYYY` strings,
/// `""` meaning unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: String,
}

/// Create/update request body. Any `id` in the body is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl SubscriptionInput {
    pub fn with_id(self, id: i32) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Storage form of a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionRecord {
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthDate,
    pub end_date: MonthDate,
}

impl From<&Subscription> for SubscriptionRecord {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name.clone(),
            price: sub.price,
            user_id: sub.user_id,
            start_date: MonthDate::parse(&sub.start_date),
            end_date: MonthDate::parse(&sub.end_date),
        }
    }
}

impl From<SubscriptionRecord> for Subscription {
    fn from(rec: SubscriptionRecord) -> Self {
        Self {
            id: rec.id,
            service_name: rec.service_name,
            price: rec.price,
            user_id: rec.user_id,
            start_date: rec.start_date.format(),
            end_date: rec.end_date.format(),
        }
    }
}

impl From<models::subscription::Model> for SubscriptionRecord {
    fn from(m: models::subscription::Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: m.start_date.into(),
            end_date: m.end_date.into(),
        }
    }
}

impl SubscriptionRecord {
    /// Active model with every column but `id` set; the id is assigned by the
    /// sequence on insert and used as the filter on update.
    pub fn to_active_model(&self) -> models::subscription::ActiveModel {
        models::subscription::ActiveModel {
            id: NotSet,
            service_name: Set(self.service_name.clone()),
            price: Set(self.price),
            user_id: Set(self.user_id),
            start_date: Set(self.start_date.as_date()),
            end_date: Set(self.end_date.as_date()),
        }
    }
}

/// Cost query parameters as received from the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostQuery {
    pub user_id: Uuid,
    pub service_name: String,
    pub start: String,
    pub end: String,
}

/// Resolved cost filter; both bounds are real months.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostFilter {
    pub user_id: Uuid,
    pub service_name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CostFilter {
    /// `None` when either bound resolves to [`MonthDate::Unset`].
    pub fn resolve(query: &CostQuery) -> Option<Self> {
        let start = MonthDate::parse(&query.start).as_date()?;
        let end = MonthDate::parse(&query.end).as_date()?;
        Some(Self {
            user_id: query.user_id,
            service_name: query.service_name.clone(),
            start,
            end,
        })
    }

    /// Inclusive on both ends; an unset start never matches.
    pub fn matches(&self, rec: &SubscriptionRecord) -> bool {
        rec.user_id == self.user_id
            && rec.service_name == self.service_name
            && rec
                .start_date
                .as_date()
                .is_some_and(|d| self.start <= d && d <= self.end)
    }
}
