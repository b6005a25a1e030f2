pub mod app_state;
pub mod config;
pub mod credential;
pub mod middleware;
pub mod params;
pub mod proxy;
pub mod response;
pub mod routes;

use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, post};
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

//
// Re-export
//
pub use app_state::AppState;
pub use config::Config;
pub use credential::{API_KEY_HEADER, extract_api_key};
pub use params::{
    ALLOWED_MODELS, ALLOWED_SECONDS, ALLOWED_SIZES, CreateJobParams, InputReference, ListJobsQuery,
    RawCreateForm, ValidationError,
};
pub use proxy::{MISSING_KEY_MESSAGE, UpstreamBody, proxy_json, proxy_stream};
pub use response::{error_response, json_response, method_not_allowed};

pub async fn run(config: Config) {
    let listen_on_port = config.listen_on_port;

    let state = AppState::new(&config.upstream_base_url);
    info!(upstream_base_url = %config.upstream_base_url, "Proxying to upstream");

    // CORS layer: the caller is a browser on another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route(
            "/jobs",
            get(routes::list_jobs)
                .post(routes::create_job)
                .options(routes::options_jobs)
                .fallback(routes::jobs_method_not_allowed),
        )
        .route(
            "/jobs/{video_id}",
            get(routes::get_job)
                .delete(routes::delete_job)
                .fallback(routes::job_method_not_allowed),
        )
        .route(
            "/jobs/{video_id}/content",
            get(routes::job_content).fallback(routes::content_method_not_allowed),
        )
        .route(
            "/jobs/{video_id}/remix",
            post(routes::remix_job).fallback(routes::remix_method_not_allowed),
        );

    // Browser UI, when present
    let static_dir = Path::new(&config.static_dir);
    if static_dir.is_dir() {
        info!(static_dir = %config.static_dir, "Serving static assets");
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    let app = app
        .layer(axum::middleware::from_fn(middleware::log_request_errors))
        .layer(cors)
        .layer(Extension(state));

    let addr = format!("0.0.0.0:{listen_on_port}");
    info!("Listening on {addr}");
    axum::serve(
        TcpListener::bind(&addr).await.expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server error");
}
