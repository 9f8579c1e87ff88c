// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use kontext_gateway::{
    api::{auth::AuthProvider, AppState, NullAuthProvider, RestAuthProvider},
    config::GatewayConfig,
    provider::GenerationGateway,
    quota::{MemoryUsageCache, QuotaService, RestUsageStore, UsageStore},
    FluxClient,
};
use std::{env, sync::Arc};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "kontext-gateway", about = "API gateway for Flux Kontext image generation")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    listen_addr: String,

    /// Substitute placeholder reference images when a submission has none
    #[arg(long, env = "DEMO_MODE", default_value_t = false)]
    demo_mode: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = GatewayConfig::from_env();

    let store: Option<Arc<dyn UsageStore>> =
        match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(Arc::new(RestUsageStore::new(url, key)?)),
            _ => {
                warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set; quota accounting is memory-only");
                None
            }
        };

    let auth: Arc<dyn AuthProvider> = match (&config.supabase_url, &config.supabase_anon_key) {
        (Some(url), Some(key)) => Arc::new(RestAuthProvider::new(url, key)?),
        _ => Arc::new(NullAuthProvider),
    };

    let gateway: Option<Arc<dyn GenerationGateway>> = match &config.fal_key {
        Some(key) => Some(Arc::new(FluxClient::new(key, args.demo_mode)?)),
        None => {
            warn!("FAL_KEY not set; image generation endpoints are disabled");
            None
        }
    };

    let quota = Arc::new(QuotaService::new(store, MemoryUsageCache::new()));

    let state = AppState {
        quota,
        gateway,
        auth,
    };

    info!("Starting kontext-gateway on {}", args.listen_addr);
    kontext_gateway::api::start_server(&args.listen_addr, state).await
}
