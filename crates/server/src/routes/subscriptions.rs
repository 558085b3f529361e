use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::request::Parts,
    Json,
};
use serde::Deserialize;
use service::errors::ServiceError;
use service::subscription::{CostQuery, Subscription, SubscriptionInput};
use tracing::{info, warn};
use uuid::Uuid;

use super::ServerState;
use crate::errors::{ApiError, Envelope};

/// Path `:id`; anything but a non-negative `i32` is answered with 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(pub i32);

impl SubscriptionId {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<u32>().ok().and_then(|v| i32::try_from(v).ok()).map(Self)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SubscriptionId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Path::<String>::from_request_parts(parts, state)
            .await
            .map(|Path(raw)| raw)
            .unwrap_or_else(|_| parts.uri.path().rsplit('/').next().unwrap_or_default().to_string());
        Self::parse(&raw).ok_or_else(|| {
            warn!(id = %raw, "incorrect sub id");
            ApiError::not_found("incorrect sub id")
        })
    }
}

/// Raw cost query string; every field is validated by hand so each failure
/// gets its own message.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CostParams {
    /// User ID (UUID)
    pub user_id: Option<String>,
    /// Service name
    pub service_name: Option<String>,
    /// Start month, `MM-YYYY`
    pub start: Option<String>,
    /// End month, `MM-YYYY`
    pub end: Option<String>,
}

impl CostParams {
    pub fn into_query(self) -> Result<CostQuery, ApiError> {
        let start = self.start.unwrap_or_default();
        let end = self.end.unwrap_or_default();
        if start.is_empty() || end.is_empty() {
            return Err(ApiError::bad_request("both dates are required"));
        }
        let service_name = self.service_name.unwrap_or_default();
        if service_name.is_empty() {
            return Err(ApiError::bad_request("service name is required"));
        }
        let user_id = self
            .user_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| ApiError::bad_request("wrong uuid"))?;
        Ok(CostQuery { user_id, service_name, start, end })
    }
}

fn read_body(body: Result<Json<SubscriptionInput>, JsonRejection>) -> Result<SubscriptionInput, ApiError> {
    body.map(|Json(input)| input).map_err(|e| {
        warn!(error = %e, "reading request body error");
        ApiError::bad_request("reading request body error")
    })
}

#[utoipa::path(
    post, path = "/subscriptions", tag = "Subscription",
    request_body = crate::openapi::SubscriptionInputDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::SuccessEnvelopeDoc),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<Json<Envelope<String>>, ApiError> {
    info!(handler = "create", "request to the create handler");
    let input = read_body(body)?;
    let id = state
        .subscriptions
        .save(input.with_id(0))
        .await
        .map_err(|_| ApiError::bad_request("creating sub error"))?;
    info!(id, "request completed successfully");
    Ok(Envelope::ok(format!("created new sub with id: {id}")))
}

#[utoipa::path(
    get, path = "/subscriptions/{id}", tag = "Subscription",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::SubscriptionEnvelopeDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn read(
    SubscriptionId(id): SubscriptionId,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Subscription>>, ApiError> {
    info!(handler = "read", id, "request to the read handler");
    let sub = state
        .subscriptions
        .load(id)
        .await
        .map_err(|_| ApiError::not_found("read error, sub not found"))?;
    info!(id, "request completed successfully");
    Ok(Envelope::ok(sub))
}

#[utoipa::path(
    patch, path = "/subscriptions/{id}", tag = "Subscription",
    params(("id" = i32, Path, description = "Subscription ID")),
    request_body = crate::openapi::SubscriptionInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::SuccessEnvelopeDoc),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Incorrect ID", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn update(
    SubscriptionId(id): SubscriptionId,
    State(state): State<ServerState>,
    body: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<Json<Envelope<&'static str>>, ApiError> {
    info!(handler = "update", id, "request to the update handler");
    let input = read_body(body)?;
    state
        .subscriptions
        .update(input.with_id(id))
        .await
        .map_err(|_| ApiError::bad_request("update failed, sub not found"))?;
    info!(id, "request completed successfully");
    Ok(Envelope::ok("sub updated"))
}

#[utoipa::path(
    delete, path = "/subscriptions/{id}", tag = "Subscription",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::SuccessEnvelopeDoc),
        (status = 400, description = "Delete Failed", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Incorrect ID", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn delete(
    SubscriptionId(id): SubscriptionId,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<&'static str>>, ApiError> {
    info!(handler = "delete", id, "request to the delete handler");
    state
        .subscriptions
        .delete(id)
        .await
        .map_err(|_| ApiError::bad_request("delete failed, sub not found"))?;
    info!(id, "request completed successfully");
    Ok(Envelope::ok("sub deleted"))
}

#[utoipa::path(
    get, path = "/subscriptions", tag = "Subscription",
    responses(
        (status = 200, description = "OK", body = crate::openapi::SubscriptionListEnvelopeDoc),
        (status = 400, description = "Empty", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Envelope<Vec<Subscription>>>, ApiError> {
    info!(handler = "list", "request to the list handler");
    let subs = state
        .subscriptions
        .load_list()
        .await
        .map_err(|_| ApiError::bad_request("sub list is empty"))?;
    info!(count = subs.len(), "request completed successfully");
    Ok(Envelope::ok(subs))
}

#[utoipa::path(
    get, path = "/subscriptions/cost", tag = "Subscription",
    params(CostParams),
    responses(
        (status = 200, description = "Total price", body = crate::openapi::CostEnvelopeDoc),
        (status = 400, description = "Bad Request", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "No cost", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn cost(
    State(state): State<ServerState>,
    params: Result<Query<CostParams>, QueryRejection>,
) -> Result<Json<Envelope<i64>>, ApiError> {
    info!(handler = "cost", "request to the cost handler");
    let Query(params) = params.map_err(|e| {
        warn!(error = %e, "malformed cost query");
        ApiError::bad_request("malformed query string")
    })?;
    let query = params.into_query()?;
    let total = state
        .subscriptions
        .cost(query)
        .await
        .map_err(|e| {
            let message = format!("cost request error: {e}");
            match e {
                ServiceError::Validation(_) => ApiError::bad_request(message),
                ServiceError::NotFound(_) | ServiceError::Db(_) => ApiError::not_found(message),
            }
        })?;
    info!(total, "request completed successfully");
    Ok(Envelope::ok(total))
}
