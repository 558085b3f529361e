use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SubscriptionInputDoc {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "01-2025")]
    pub start_date: String,
    #[schema(example = "02-2025")]
    pub end_date: Option<String>,
}

#[derive(ToSchema)]
pub struct SubscriptionDoc {
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "1-2025")]
    pub start_date: String,
    #[schema(example = "")]
    pub end_date: String,
}

#[derive(ToSchema)]
pub struct SuccessEnvelopeDoc {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "created new sub with id: 1")]
    pub message: String,
}

#[derive(ToSchema)]
pub struct SubscriptionEnvelopeDoc { pub success: bool, pub message: SubscriptionDoc }

#[derive(ToSchema)]
pub struct SubscriptionListEnvelopeDoc { pub success: bool, pub message: Vec<SubscriptionDoc> }

#[derive(ToSchema)]
pub struct CostEnvelopeDoc {
    pub success: bool,
    #[schema(example = 300)]
    pub message: i64,
}

#[derive(ToSchema)]
pub struct ErrorEnvelopeDoc {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "error text")]
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscription API server",
        version = "1.0",
        description = "CRUDL subscription server with a cost aggregate."
    ),
    paths(
        crate::routes::health,
        crate::routes::subscriptions::create,
        crate::routes::subscriptions::read,
        crate::routes::subscriptions::update,
        crate::routes::subscriptions::delete,
        crate::routes::subscriptions::list,
        crate::routes::subscriptions::cost,
    ),
    components(
        schemas(
            HealthResponse,
            SubscriptionInputDoc,
            SubscriptionDoc,
            SuccessEnvelopeDoc,
            SubscriptionEnvelopeDoc,
            SubscriptionListEnvelopeDoc,
            CostEnvelopeDoc,
            ErrorEnvelopeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "Subscription")
    )
)]
pub struct ApiDoc;
