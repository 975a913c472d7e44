mod api;
mod middleware;
mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use newspulse_cache::{CacheStore, DisabledCache, GeoCache, RedisCache};
use newspulse_llm::{GeminiClient, Summarizer};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    services::{NewsService, TrendingService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = newspulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = newspulse_db::PoolConfig::from_app_config(&config);
    let pool = newspulse_db::connect_pool(&config.database_url, pool_config).await?;
    newspulse_db::run_migrations(&pool).await?;

    // The cache is optional at runtime: an unreachable endpoint degrades to
    // direct computation rather than failing startup.
    let cache_store: Arc<dyn CacheStore> = match RedisCache::connect(&config.redis_url).await {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::warn!(error = %e, "redis unavailable, trending cache disabled");
            Arc::new(DisabledCache)
        }
    };

    let summarizer: Arc<dyn Summarizer> = Arc::new(GeminiClient::new(
        &config.gemini_api_key,
        &config.llm_model,
        config.llm_request_timeout_secs,
    )?);

    let news = Arc::new(NewsService::new(pool.clone(), Arc::clone(&summarizer)));
    let trending = Arc::new(TrendingService::new(
        pool.clone(),
        GeoCache::new(cache_store),
        summarizer,
    ));

    let auth = AuthState::from_env(matches!(
        config.env,
        newspulse_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            pool,
            news,
            trending,
        },
        auth,
        default_rate_limit_state(),
    );

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting newspulse server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
