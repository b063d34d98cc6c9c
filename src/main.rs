use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload_form::config::{ServerConfig, UploadConfig};
use upload_form::services::transport::HttpTransport;
use upload_form::{AppState, SelectedFile, SubmitOutcome, UploadForm, create_app};

#[derive(Parser)]
#[command(name = "upload-form")]
#[command(version)]
#[command(about = "Pick files and POST them as one multipart body", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select files and submit them to the upload endpoint
    Upload {
        /// Files to select, in order
        files: Vec<PathBuf>,

        /// Upload endpoint (overrides UPLOAD_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Multipart field name every file is attached under (overrides UPLOAD_FIELD_NAME)
        #[arg(long)]
        field: Option<String>,

        /// Keep at most this many of the selected files (overrides UPLOAD_MAX_FILES)
        #[arg(long)]
        max_files: Option<usize>,

        /// Use the single-file form (`file_uploaded`, one file)
        #[arg(long)]
        single: bool,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Run the receiving endpoint
    Serve {
        /// Listen port
        #[arg(short, long, env = "SERVER_PORT")]
        port: Option<u16>,

        /// Directory received files are written to
        #[arg(long, env = "UPLOAD_DIR")]
        upload_dir: Option<PathBuf>,

        /// Multipart field collected by /upload_file
        #[arg(long, env = "UPLOAD_FIELD_NAME")]
        field: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_form=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            files,
            endpoint,
            field,
            max_files,
            single,
            timeout,
        } => {
            let base = if single {
                UploadConfig::from_env_or(UploadConfig::single())?
            } else {
                UploadConfig::from_env()?
            };
            let config = UploadConfig::new(
                endpoint.as_deref().unwrap_or(base.endpoint.as_str()),
                field.unwrap_or(base.field_name),
                max_files.or(base.max_files),
            )?;
            run_upload(config, files, Duration::from_secs(timeout)).await
        }
        Commands::Serve {
            port,
            upload_dir,
            field,
        } => {
            let mut config = ServerConfig::from_env();
            if let Some(port) = port {
                config.addr.set_port(port);
            }
            if let Some(dir) = upload_dir {
                config.upload_dir = dir;
            }
            if let Some(field) = field {
                config.field_name = field;
            }
            run_server(config).await
        }
    }
}

async fn run_upload(
    config: UploadConfig,
    paths: Vec<PathBuf>,
    timeout: Duration,
) -> anyhow::Result<()> {
    let mut selected = Vec::with_capacity(paths.len());
    for path in &paths {
        selected.push(SelectedFile::from_path(path).await?);
    }

    let transport = HttpTransport::with_timeout(timeout)?;
    let mut form = UploadForm::new(config, Arc::new(transport));
    form.on_files_picked(selected);

    match form.on_submit().await {
        SubmitOutcome::Uploaded { status } => info!("Server answered {}", status),
        SubmitOutcome::NothingSelected
        | SubmitOutcome::Rejected { .. }
        | SubmitOutcome::TransportFailed { .. } => {}
    }

    Ok(())
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    info!("🚀 Starting upload receiver...");
    info!(
        "📁 Upload dir={}, field='{}', max part size={}MB",
        config.upload_dir.display(),
        config.field_name,
        config.max_part_size / 1024 / 1024
    );

    let addr = config.addr;
    let app = create_app(AppState { config }).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            })
            .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                info!("📥 {} {}", request.method(), request.uri());
            })
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &tracing::Span| {
                    info!(
                        "📤 Finished in {:?} with status {}",
                        latency,
                        response.status()
                    );
                },
            ),
    );

    info!("✅ Server ready at http://{}", addr);
    info!("📖 OpenAPI: http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
