//! One SQL statement per operation against `subscriptions`. No business rules:
//! callers decide what an empty list, zero rows affected, or a `NULL` sum means.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use models::subscription::{self, Entity as SubscriptionEntity};

use crate::errors::ServiceError;
use crate::subscription::domain::{CostFilter, SubscriptionRecord};

/// `INSERT ... RETURNING id`.
pub async fn insert_subscription(db: &DatabaseConnection, rec: &SubscriptionRecord) -> Result<i32, ServiceError> {
    let res = SubscriptionEntity::insert(rec.to_active_model())
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(format!("failed to save sub: {e}")))?;
    if res.last_insert_id == 0 {
        return Err(ServiceError::Db("failed to save sub: no id returned".into()));
    }
    Ok(res.last_insert_id)
}

pub async fn get_subscription(db: &DatabaseConnection, id: i32) -> Result<Option<SubscriptionRecord>, ServiceError> {
    let found = SubscriptionEntity::find_by_id(id).one(db).await?;
    Ok(found.map(SubscriptionRecord::from))
}

/// All rows ordered by id. A row that fails to decode fails the whole call.
pub async fn list_subscriptions(db: &DatabaseConnection) -> Result<Vec<SubscriptionRecord>, ServiceError> {
    let rows = SubscriptionEntity::find()
        .order_by_asc(subscription::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(SubscriptionRecord::from).collect())
}

/// Replace every mutable column of row `rec.id`; returns whether a row matched.
pub async fn replace_subscription(db: &DatabaseConnection, rec: &SubscriptionRecord) -> Result<bool, ServiceError> {
    let res = SubscriptionEntity::update_many()
        .set(rec.to_active_model())
        .filter(subscription::Column::Id.eq(rec.id))
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(format!("failed to update sub: {e}")))?;
    Ok(res.rows_affected > 0)
}

/// Delete a subscription; returns true if deleted.
pub async fn delete_subscription(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = SubscriptionEntity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// `SELECT sum(price)` over the filter. `None` when no row matched.
pub async fn sum_prices(db: &DatabaseConnection, filter: &CostFilter) -> Result<Option<i64>, ServiceError> {
    let total = SubscriptionEntity::find()
        .select_only()
        .column_as(Expr::col(subscription::Column::Price).sum(), "total")
        .filter(subscription::Column::UserId.eq(filter.user_id))
        .filter(subscription::Column::ServiceName.eq(filter.service_name.as_str()))
        .filter(subscription::Column::StartDate.between(filter.start, filter.end))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;
    Ok(total.flatten())
}
