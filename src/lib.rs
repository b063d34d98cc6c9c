pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::ServerConfig;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

pub use crate::config::UploadConfig;
pub use crate::models::SelectedFile;
pub use crate::services::transport::{HttpTransport, UploadTransport};
pub use crate::services::upload_form::{SubmitOutcome, UploadForm};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::index_page,
        api::handlers::files::upload_files,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::WelcomeResponse,
        )
    ),
    tags(
        (name = "files", description = "File upload endpoint"),
        (name = "system", description = "Service information")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::handlers::health::index_page))
        .route("/upload_file", post(api::handlers::files::upload_files))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Parts are bounded one by one in the handler; the request as a whole is not.
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(state)
}
