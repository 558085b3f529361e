use std::sync::Arc;

use tracing::{error, info, instrument};

use super::domain::{CostFilter, CostQuery, Subscription, SubscriptionRecord};
use super::repository::SubscriptionRepository;
use crate::errors::ServiceError;

/// Subscription business service independent of web framework.
///
/// Converts wire dates to stored months and back, and turns "nothing there"
/// outcomes from the repository into [`ServiceError::NotFound`].
#[derive(Clone)]
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self { Self { repo } }

    /// Store a new subscription and return its id. `sub.id` is ignored.
    ///
    /// Malformed dates are stored as unset rather than rejected.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::subscription::{repository::mock::InMemorySubscriptionRepository, Subscription, SubscriptionService};
    /// let svc = SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::default()));
    /// let sub = Subscription {
    ///     id: 0,
    ///     service_name: "Yandex Plus".into(),
    ///     price: 400,
    ///     user_id: uuid::Uuid::new_v4(),
    ///     start_date: "07-2025".into(),
    ///     end_date: "".into(),
    /// };
    /// let id = tokio_test::block_on(svc.save(sub)).unwrap();
    /// let loaded = tokio_test::block_on(svc.load(id)).unwrap();
    /// assert_eq!(loaded.start_date, "7-2025");
    /// ```
    #[instrument(skip(self, sub), fields(service_name = %sub.service_name, user_id = %sub.user_id))]
    pub async fn save(&self, sub: Subscription) -> Result<i32, ServiceError> {
        validate(&sub)?;
        let id = self
            .repo
            .insert(&SubscriptionRecord::from(&sub))
            .await
            .inspect_err(|e| error!(error = %e, "save failed"))?;
        info!(id, "subscription saved");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn load(&self, id: i32) -> Result<Subscription, ServiceError> {
        match self.repo.get(id).await {
            Ok(Some(rec)) => Ok(rec.into()),
            Ok(None) => {
                let e = ServiceError::not_found("subscription");
                error!(error = %e, "load failed");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "load failed");
                Err(e)
            }
        }
    }

    /// All subscriptions. An empty table is reported as `NotFound`.
    #[instrument(skip(self))]
    pub async fn load_list(&self) -> Result<Vec<Subscription>, ServiceError> {
        let records = self
            .repo
            .list()
            .await
            .inspect_err(|e| error!(error = %e, "list failed"))?;
        if records.is_empty() {
            let e = ServiceError::NotFound("sub list is empty".into());
            error!(error = %e, "list failed");
            return Err(e);
        }
        Ok(records.into_iter().map(Subscription::from).collect())
    }

    /// Full replace of every mutable field of `sub.id`.
    #[instrument(skip(self, sub), fields(id = sub.id))]
    pub async fn update(&self, sub: Subscription) -> Result<(), ServiceError> {
        validate(&sub)?;
        let replaced = self
            .repo
            .replace(&SubscriptionRecord::from(&sub))
            .await
            .inspect_err(|e| error!(error = %e, "update failed"))?;
        if !replaced {
            let e = ServiceError::NotFound("no rows updated".into());
            error!(error = %e, "update failed");
            return Err(e);
        }
        info!("subscription updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .inspect_err(|e| error!(error = %e, "delete failed"))?;
        if !deleted {
            let e = ServiceError::not_found("subscription");
            error!(error = %e, "delete failed");
            return Err(e);
        }
        info!("subscription deleted");
        Ok(())
    }

    /// Sum of `price` for the user and service whose start month lies in
    /// `[start, end]`.
    ///
    /// Both bounds must parse to real months. A total of zero is reported as
    /// `NotFound`, the same as no matching rows.
    #[instrument(skip(self, query), fields(user_id = %query.user_id, service_name = %query.service_name))]
    pub async fn cost(&self, query: CostQuery) -> Result<i64, ServiceError> {
        let Some(filter) = CostFilter::resolve(&query) else {
            return Err(ServiceError::Validation("invalid date, MM-YYYY format required".into()));
        };
        let total = self
            .repo
            .sum_prices(&filter)
            .await
            .inspect_err(|e| error!(error = %e, "cost failed"))?;
        match total {
            Some(sum) if sum != 0 => Ok(sum),
            _ => {
                let e = ServiceError::NotFound("no cost for the requested period".into());
                error!(error = %e, "cost failed");
                Err(e)
            }
        }
    }
}

fn validate(sub: &Subscription) -> Result<(), ServiceError> {
    if sub.service_name.trim().is_empty() {
        return Err(ServiceError::Validation("service_name must not be empty".into()));
    }
    Ok(())
}
