use std::time::Instant;

use async_graphql::http::GraphiQLSource;
use axum::{
    extract::State,
    middleware,
    response::Html,
    routing::get,
    Extension, Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::identity::Caller;

use crate::auth::{self, ServerState};
use crate::observability::{encode_metrics, GRAPHQL_REQUESTS_TOTAL, GRAPHQL_REQUEST_DURATION};

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics() -> (axum::http::StatusCode, String) {
    encode_metrics()
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Executes one GraphQL request with the caller resolved by `auth::attach_caller`.
pub async fn graphql_handler(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let started = Instant::now();
    let resp = state.schema.execute(req.data(caller)).await;
    GRAPHQL_REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
    let outcome = if resp.errors.is_empty() { "ok" } else { "error" };
    GRAPHQL_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    Json(resp)
}

/// Build the application router: GraphQL endpoint behind caller resolution,
/// plus public health and metrics.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let api = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::attach_caller));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
