use axum::{Router, http::StatusCode, routing::post};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use upload_form::config::{ServerConfig, UploadConfig};
use upload_form::services::transport::HttpTransport;
use upload_form::{AppState, SelectedFile, SubmitOutcome, UploadForm, create_app};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_receiver(upload_dir: &Path, field_name: &str) -> SocketAddr {
    let config = ServerConfig {
        upload_dir: upload_dir.to_path_buf(),
        field_name: field_name.to_string(),
        ..ServerConfig::default()
    };
    spawn(create_app(AppState { config })).await
}

fn form_for(endpoint: &str, base: UploadConfig) -> UploadForm {
    let config = UploadConfig::new(endpoint, base.field_name, base.max_files).unwrap();
    let transport = HttpTransport::with_timeout(Duration::from_secs(5)).unwrap();
    UploadForm::new(config, Arc::new(transport))
}

#[tokio::test]
async fn test_multi_file_form_uploads_to_receiver() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_receiver(dir.path(), "file_uploads").await;
    let mut form = form_for(
        &format!("http://{addr}/upload_file"),
        UploadConfig::multi(),
    );

    form.on_files_picked(vec![
        SelectedFile::detect("a.txt", "alpha"),
        SelectedFile::detect("b.txt", "bravo"),
    ]);

    let outcome = form.on_submit().await;
    assert_eq!(outcome, SubmitOutcome::Uploaded { status: 200 });

    assert_eq!(
        tokio::fs::read_to_string(dir.path().join("a.txt")).await.unwrap(),
        "alpha"
    );
    assert_eq!(
        tokio::fs::read_to_string(dir.path().join("b.txt")).await.unwrap(),
        "bravo"
    );

    // selection survives a successful upload
    assert_eq!(form.selection().len(), 2);
}

#[tokio::test]
async fn test_single_file_form_uploads_first_pick_only() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_receiver(dir.path(), "file_uploaded").await;
    let mut form = form_for(
        &format!("http://{addr}/upload_file"),
        UploadConfig::single(),
    );

    form.on_files_picked(vec![
        SelectedFile::detect("first.txt", "1"),
        SelectedFile::detect("second.txt", "2"),
    ]);

    assert!(form.on_submit().await.is_uploaded());
    assert!(dir.path().join("first.txt").exists());
    assert!(!dir.path().join("second.txt").exists());
}

#[tokio::test]
async fn test_field_name_mismatch_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_receiver(dir.path(), "file_uploads").await;
    let mut form = form_for(
        &format!("http://{addr}/upload_file"),
        UploadConfig::single(),
    );

    form.on_files_picked(vec![SelectedFile::detect("a.txt", "alpha")]);

    let outcome = form.on_submit().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            status: 422,
            status_text: "Unprocessable Entity".to_string(),
        }
    );
    assert_eq!(form.selection().len(), 1);
}

#[tokio::test]
async fn test_server_error_status_text_is_reported() {
    let app = Router::new().route(
        "/upload_file",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let addr = spawn(app).await;
    let mut form = form_for(
        &format!("http://{addr}/upload_file"),
        UploadConfig::multi(),
    );

    form.on_files_picked(vec![SelectedFile::detect("a.txt", "alpha")]);

    let outcome = form.on_submit().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_swallowed() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut form = form_for(
        &format!("http://{addr}/upload_file"),
        UploadConfig::multi(),
    );
    form.on_files_picked(vec![SelectedFile::detect("a.txt", "alpha")]);

    let outcome = form.on_submit().await;
    assert!(matches!(outcome, SubmitOutcome::TransportFailed { .. }));
    assert_eq!(form.selection().len(), 1);
}

#[tokio::test]
async fn test_submit_without_selection_makes_no_request() {
    // Endpoint that nothing listens on: a request would fail, not report NothingSelected.
    let form = form_for("http://127.0.0.1:9/upload_file", UploadConfig::multi());
    assert_eq!(form.on_submit().await, SubmitOutcome::NothingSelected);
}
