use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tak_guide::artifacts::{ArtifactFetcher, HttpArtifactFetcher};
use tak_guide::config::GuideConfig;
use tak_guide::identity::IdentityCell;
use tak_guide::notify::LogNotifier;
use tak_guide::platform;
use tak_guide::server::{GuideParts, build_app, open_backing};

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tak-guide.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GuideConfig::from_env().context("reading TAK_GUIDE_* configuration")?;
    let log_dir = config.ensure_log_dir().context("creating log directory")?;
    let _log_guard = init_tracing(log_dir);

    eprintln!("TAK Guide v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());

    if let Some(path) = &config.catalog_path {
        eprintln!("   Catalog: {}", path.display());
    }

    // ── Storage & catalog ───────────────────────────────────────────────
    let (store, catalog) = open_backing(&config)
        .await
        .context("opening progress database and step catalog")?;

    // ── Identity & platform ─────────────────────────────────────────────
    let identity = Arc::new(IdentityCell::new(config.identity()));
    let detected = platform::detect(config.user_agent.as_deref());
    eprintln!("   Platform: {detected}");

    let fetcher: Option<Arc<dyn ArtifactFetcher>> = config.artifact_url.as_ref().map(|url| {
        eprintln!("   Packages: {url}");
        Arc::new(HttpArtifactFetcher::new(url.clone())) as Arc<dyn ArtifactFetcher>
    });
    if fetcher.is_none() {
        eprintln!("   Packages: disabled");
    }

    let (controller, app) = build_app(GuideParts {
        catalog: Arc::new(catalog),
        store,
        identity,
        notifier: Arc::new(LogNotifier),
        platform: detected,
        fetcher,
        handoff_scheme: config.handoff_scheme.clone(),
        completion_redirect: config.completion_redirect.clone(),
    });

    if !controller.lock().await.initialize().await {
        eprintln!("   Identity: pending (PUT /api/onboarding/identity)");
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    tracing::info!(port = config.port, "Guide server started");
    eprintln!("   API: http://0.0.0.0:{}/api/onboarding/status\n", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
