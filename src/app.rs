use std::net::SocketAddr;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::extractors::require_session;
use crate::state::AppState;
use crate::{auth, entries, export};

const SERVICE_WORKER: &str = include_str!("../static/service-worker.js");

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth::router())
        .merge(entries::router())
        .merge(export::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(auth::public_router())
        .merge(entries::public_router())
        .route("/service-worker.js", get(service_worker))
        .merge(protected)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn service_worker() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        SERVICE_WORKER,
    )
}

/// Logs and flattens an infrastructure failure into a bare 500.
pub(crate) fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = %format!("{:#}", e), "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".into())
}
