use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use file_share::{
    api,
    config::{Config, StorageBackend},
    object_store as obj,
    storage::Database,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "file-share starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize metadata database
    let db = Database::open(&config.metadata.data_dir, &config.metadata.table_name)?;
    info!(
        data_dir = %config.metadata.data_dir,
        table = %config.metadata.table_name,
        "Metadata database opened"
    );

    // Initialize object store backend
    let (object_store, url_signer): (Arc<dyn obj::ObjectStore>, Option<Arc<obj::UrlSigner>>) =
        match config.storage.backend {
            StorageBackend::Local => {
                let secret = match config.storage.signing_secret {
                    Some(ref secret) => secret.as_bytes().to_vec(),
                    None => {
                        warn!("DOWNLOAD_SIGNING_SECRET is not set; download links will not survive a restart");
                        obj::UrlSigner::random_secret()?
                    }
                };
                let signer = Arc::new(obj::UrlSigner::new(
                    &config.server.public_base_url,
                    &secret,
                ));
                let store =
                    obj::LocalStore::new(&config.storage.local_storage_path, Arc::clone(&signer))?;
                info!(
                    "Using local storage backend at: {}",
                    config.storage.local_storage_path
                );
                (Arc::new(store) as Arc<dyn obj::ObjectStore>, Some(signer))
            }
            StorageBackend::Gcs => {
                let bucket = config
                    .storage
                    .bucket
                    .as_deref()
                    .expect("BUCKET_NAME validated in config");
                let store =
                    obj::GcsStore::new(bucket, config.storage.gcs_credentials_file.as_deref())
                        .await?;
                info!("Using GCS storage backend, bucket: {}", bucket);
                (Arc::new(store) as Arc<dyn obj::ObjectStore>, None)
            }
        };

    // Create shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        metadata: Arc::new(db),
        object_store,
        url_signer,
    });

    // Build and start the HTTP server
    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
