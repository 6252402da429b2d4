use std::sync::Arc;

use ellinaki_backend::config::Config;
use ellinaki_backend::lexicon::Lexicon;
use ellinaki_backend::logging;
use ellinaki_backend::store::JsonStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = logging::init_tracing(&config);

    let store = Arc::new(JsonStore::new(&config.data_dir));
    if let Err(err) = store.ensure_dirs().await {
        tracing::error!(error = %err, path = %config.data_dir.display(), "cannot prepare data directory");
        std::process::exit(1);
    }

    let lexicon = match config.lexicon_path.as_deref() {
        Some(path) => Arc::new(Lexicon::load_or_seed(path)),
        None => Arc::new(Lexicon::seed()),
    };
    tracing::info!(words = lexicon.len(), "lexicon loaded");

    let app = ellinaki_backend::build_app(store, lexicon);

    let addr = config.bind_addr();
    tracing::info!(%addr, "ellinaki backend listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        tracing::error!(error = %err, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
