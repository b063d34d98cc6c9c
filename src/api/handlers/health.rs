use crate::models::WelcomeResponse;
use axum::{Json, response::IntoResponse};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome document", body = WelcomeResponse)
    ),
    tag = "system"
)]
pub async fn index_page() -> impl IntoResponse {
    Json(WelcomeResponse {
        welcome: "You have entered the file-upload backend home page!".to_string(),
    })
}
