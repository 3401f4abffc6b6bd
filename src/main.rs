// Entry point of the prompt marketplace API.
//
// **Architecture Overview:**
// - `core/` = Business logic (moderation, submissions, votes, dashboard)
// - `infra/` = Implementations of core traits (classifiers, stores, webhooks)
// - `web/` = HTTP adapter (axum routes and error mapping)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve the router

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

mod config;

use crate::config::{AppConfig, ProviderConfig, StorageConfig};
use crate::core::moderation::{LocalKeywordAnalyzer, ModerationPipeline, ModerationProvider};
use crate::core::submissions::{AlertSink, PromptIdGenerator, SubmissionService, SubmissionStore};
use crate::core::votes::VoteService;
use crate::infra::alerts::WebhookAlertSink;
use crate::infra::moderation::{HuggingFaceClassifier, OpenAiModerationClient};
use crate::infra::sheets::{GoogleSheetsClient, GoogleSheetsSubmissionStore, ServiceAccountAuth};
use crate::infra::submissions::SqliteSubmissionStore;
use crate::infra::votes::SqliteVoteStore;
use crate::web::state::DynVoteStore;
use crate::web::AppState;
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn build_providers(config: &AppConfig, http: &reqwest::Client) -> Vec<Box<dyn ModerationProvider>> {
    config
        .providers
        .iter()
        .map(|provider| -> Box<dyn ModerationProvider> {
            match provider {
                ProviderConfig::HuggingFace { api_key, url } => Box::new(
                    HuggingFaceClassifier::new(http.clone(), api_key.clone(), url.clone()),
                ),
                ProviderConfig::OpenAi { api_key, base_url } => Box::new(
                    OpenAiModerationClient::new(http.clone(), api_key.clone(), base_url.clone()),
                ),
            }
        })
        .collect()
}

async fn build_store(
    config: &AppConfig,
    http: &reqwest::Client,
) -> anyhow::Result<Arc<dyn SubmissionStore>> {
    match &config.storage {
        StorageConfig::GoogleSheets {
            spreadsheet_id,
            range,
            credentials,
        } => {
            let auth = ServiceAccountAuth::load(credentials, http.clone())
                .await
                .context("Failed to load Google service account")?;
            tracing::info!(
                account = %auth.client_email(),
                spreadsheet = %spreadsheet_id,
                range = %range,
                "Using Google Sheets submission store"
            );
            let sheets = GoogleSheetsClient::new(http.clone(), spreadsheet_id.clone(), Arc::new(auth));
            Ok(Arc::new(GoogleSheetsSubmissionStore::new(sheets, range.clone())))
        }
        StorageConfig::Sqlite { path } => {
            tracing::info!(path = %path.display(), "Using SQLite submission store");
            let store = SqliteSubmissionStore::open(path)
                .await
                .context("Failed to open submission database")?;
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    // One pooled client for every outbound call.
    let http = reqwest::Client::builder()
        .timeout(config.outbound_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let providers = build_providers(&config, &http);
    let pipeline = Arc::new(ModerationPipeline::new(LocalKeywordAnalyzer::default(), providers));
    tracing::info!(remotes = ?pipeline.remote_names(), "Moderation pipeline ready");

    let store = build_store(&config, &http).await?;

    let alerts: Option<Arc<dyn AlertSink>> = config.alert.as_ref().map(|alert| {
        tracing::info!(kind = ?alert.kind, "Flag alerts enabled");
        Arc::new(WebhookAlertSink::new(http.clone(), alert.kind, alert.url.clone()))
            as Arc<dyn AlertSink>
    });

    let submissions = SubmissionService::new(
        pipeline.clone(),
        store.clone(),
        alerts,
        PromptIdGenerator::new(config.prompt_id_length),
    );

    let vote_store: DynVoteStore = Box::new(
        SqliteVoteStore::open(&config.votes_db_path())
            .await
            .context("Failed to open vote database")?,
    );
    let votes = Arc::new(VoteService::new(vote_store));

    let app = web::router(AppState::new(pipeline, submissions, store, votes));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
