use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::Instrument;

use puzzlebox_feed::{FeedEngine, FeedError, FeedMode, FeedPage, FeedRequest};

use crate::graphql::auth::{self, jwt::JwtService};
use crate::graphql::{self, AppSchema};

#[derive(Clone)]
pub struct AppState {
    engine: FeedEngine,
    schema: AppSchema,
    jwt_service: Option<JwtService>,
}

pub fn build_router(
    engine: FeedEngine,
    jwt_service: Option<JwtService>,
    allowed_origins: &[String],
) -> Router {
    let schema = graphql::build_schema(engine.clone());

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/api/feed", get(api_feed))
        .route("/health", get(health))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
        .with_state(AppState {
            engine,
            schema,
            jwt_service,
        })
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let identity = auth::extract_identity(state.jwt_service.as_ref(), &headers);

    let request = req.into_inner().data(identity);
    let response = state
        .schema
        .execute(request)
        .instrument(tracing::info_span!("graphql_request"))
        .await;
    if !response.errors.is_empty() {
        tracing::warn!(errors = ?response.errors, "GraphQL errors");
    }
    response.into()
}

async fn graphiql_handler() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    mode: Option<String>,
    limit: Option<i64>,
    before: Option<String>,
}

async fn api_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<FeedPage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mode = query
        .mode
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("mode is required".to_string()))?
        .parse::<FeedMode>()
        .map_err(ApiError::BadRequest)?;
    let identity = auth::extract_identity(state.jwt_service.as_ref(), &headers);

    let request = FeedRequest {
        mode,
        limit: query.limit,
        viewer_identity: identity.0,
        before: query.before,
    };

    let page = state.engine.feed(request).await?;
    Ok(Json(page))
}

/// REST error body: `{ "error": "...", "code": "..." }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Feed(FeedError),
}

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        Self::Feed(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Feed(e @ (FeedError::InvalidRequest(_) | FeedError::InvalidCursor(_))) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", e.to_string())
            }
            ApiError::Feed(e) => {
                tracing::error!(error = %e, "feed request failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "FEED_UNAVAILABLE",
                    "feed unavailable, retry later".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
