use std::{process, sync::Arc};

use hotfeed::{
    application::{
        error::AppError,
        feed::{FeedService, FeedSources},
        syndication::{SyndicationConfig, SyndicationService},
    },
    cache::{CacheConfig, CacheState, MemoryResponseStore},
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState, RequestOrigin},
        telemetry,
        upstream::HttpPageSource,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let page_source = HttpPageSource::new(&settings.upstream)?;
    let max_age = settings.cache.max_age_seconds;

    let syndication = SyndicationService::new(SyndicationConfig {
        source_name: settings.feed.source_name.clone(),
        stamp_fetch_time: settings.feed.stamp_fetch_time,
        ttl_minutes: Some(u64::from(max_age.get()).div_ceil(60)),
    });
    let feeds = FeedService::new(
        Arc::new(page_source),
        FeedSources::from(&settings.upstream),
        syndication,
    );

    let cache = if settings.cache.enabled {
        let config = CacheConfig::from(&settings.cache);
        let store = Arc::new(MemoryResponseStore::new(&config));
        Some(CacheState::new(config, store))
    } else {
        None
    };

    let state = HttpState {
        feeds: Arc::new(feeds),
        max_age,
    };
    let origin = RequestOrigin {
        public_url: settings.server.public_url.clone(),
        listen_addr: Some(settings.server.addr),
    };
    let router = http::build_router(state, cache, origin);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        addr = %settings.server.addr,
        movies = %settings.upstream.movies_url,
        shows = %settings.upstream.shows_url,
        cache_enabled = settings.cache.enabled,
        "serving feeds"
    );

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(grace_seconds = grace.as_secs(), "shutdown requested");
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                warn!("graceful shutdown deadline elapsed, exiting");
                process::exit(0);
            });
        })
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
