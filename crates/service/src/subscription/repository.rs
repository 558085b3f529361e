use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::domain::{CostFilter, SubscriptionRecord};
use crate::db::subscription_store;
use crate::errors::ServiceError;

/// Persistence seam for subscriptions.
///
/// Outcomes are reported precisely (empty list, `false` for no row, `None`
/// for no rows summed); mapping them to errors is the service's job.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn insert(&self, rec: &SubscriptionRecord) -> Result<i32, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<SubscriptionRecord>, ServiceError>;
    async fn list(&self) -> Result<Vec<SubscriptionRecord>, ServiceError>;
    async fn replace(&self, rec: &SubscriptionRecord) -> Result<bool, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn sum_prices(&self, filter: &CostFilter) -> Result<Option<i64>, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl SubscriptionRepository for SeaOrmSubscriptionRepository {
    async fn insert(&self, rec: &SubscriptionRecord) -> Result<i32, ServiceError> {
        subscription_store::insert_subscription(&self.db, rec).await
    }

    async fn get(&self, id: i32) -> Result<Option<SubscriptionRecord>, ServiceError> {
        subscription_store::get_subscription(&self.db, id).await
    }

    async fn list(&self) -> Result<Vec<SubscriptionRecord>, ServiceError> {
        subscription_store::list_subscriptions(&self.db).await
    }

    async fn replace(&self, rec: &SubscriptionRecord) -> Result<bool, ServiceError> {
        subscription_store::replace_subscription(&self.db, rec).await
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        subscription_store::delete_subscription(&self.db, id).await
    }

    async fn sum_prices(&self, filter: &CostFilter) -> Result<Option<i64>, ServiceError> {
        subscription_store::sum_prices(&self.db, filter).await
    }
}

/// In-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    struct Table {
        next_id: i32,
        rows: BTreeMap<i32, SubscriptionRecord>,
    }

    #[derive(Default)]
    pub struct InMemorySubscriptionRepository {
        table: Mutex<Table>,
    }

    impl InMemorySubscriptionRepository {
        fn table(&self) -> Result<MutexGuard<'_, Table>, ServiceError> {
            self.table.lock().map_err(|_| ServiceError::Db("in-memory table lock poisoned".into()))
        }
    }

    #[async_trait]
    impl SubscriptionRepository for InMemorySubscriptionRepository {
        async fn insert(&self, rec: &SubscriptionRecord) -> Result<i32, ServiceError> {
            let mut table = self.table()?;
            table.next_id += 1;
            let id = table.next_id;
            table.rows.insert(id, SubscriptionRecord { id, ..rec.clone() });
            Ok(id)
        }

        async fn get(&self, id: i32) -> Result<Option<SubscriptionRecord>, ServiceError> {
            Ok(self.table()?.rows.get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<SubscriptionRecord>, ServiceError> {
            Ok(self.table()?.rows.values().cloned().collect())
        }

        async fn replace(&self, rec: &SubscriptionRecord) -> Result<bool, ServiceError> {
            let mut table = self.table()?;
            match table.rows.get_mut(&rec.id) {
                Some(row) => {
                    *row = rec.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.table()?.rows.remove(&id).is_some())
        }

        async fn sum_prices(&self, filter: &CostFilter) -> Result<Option<i64>, ServiceError> {
            let table = self.table()?;
            let mut matched = table.rows.values().filter(|r| filter.matches(r)).peekable();
            if matched.peek().is_none() {
                return Ok(None);
            }
            Ok(Some(matched.map(|r| i64::from(r.price)).sum()))
        }
    }
}
