use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::analyze::report::{summarize, IncidentSummary};
use crate::analyze::{analyze, AnalysisConfig, AnalysisReport};
use crate::config::AppConfig;
use crate::ingest::manager::SourceManager;
use crate::ingest::types::LogEntry;
use crate::store::LogStore;

#[derive(Clone)]
pub struct AppState {
    manager: Arc<tokio::sync::Mutex<SourceManager>>,
    store: Arc<LogStore>,
    analysis: AnalysisConfig,
}

impl AppState {
    pub fn new(manager: SourceManager, analysis: AnalysisConfig) -> Self {
        Self {
            manager: Arc::new(tokio::sync::Mutex::new(manager)),
            store: Arc::new(LogStore::new()),
            analysis,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&cfg.fetch.user_agent)
            .timeout(std::time::Duration::from_secs(cfg.fetch.timeout_secs))
            .build()?;
        let manager = SourceManager::new(client, cfg.fetch.clone());
        Ok(Self::new(manager, cfg.analysis))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/connect", post(connect))
        .route("/fetch", post(fetch))
        .route("/logs", get(logs))
        .route("/report", get(report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct ConnectReq {
    url: String,
}

#[derive(Serialize)]
struct ConnectResp {
    source: String,
    message: String,
}

/// Route the pasted URL to a source. An unrecognized source is a 400 and the
/// previously connected source stays active.
async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectReq>,
) -> Result<Json<ConnectResp>, (StatusCode, String)> {
    let mut manager = state.manager.lock().await;
    match manager.connect(&req.url) {
        Some(message) => Ok(Json(ConnectResp {
            source: manager.current_source(),
            message,
        })),
        None => Err((
            StatusCode::BAD_REQUEST,
            format!("unrecognized source: {:?}", req.url),
        )),
    }
}

#[derive(Serialize)]
struct FetchResp {
    source: String,
    fetched: usize,
    /// False when this result lost the race to a newer fetch and was dropped.
    applied: bool,
}

/// Run the active provider and commit the result through the staleness guard.
/// The manager lock is released before the request goes out, so overlapping
/// fetches race; the ticket decides who wins.
async fn fetch(State(state): State<AppState>) -> Result<Json<FetchResp>, (StatusCode, String)> {
    let provider = {
        let manager = state.manager.lock().await;
        manager.active()
    };
    let ticket = state.store.begin_fetch();

    match provider.fetch_logs().await {
        Ok(batch) => {
            let fetched = batch.len();
            let applied = state.store.commit(ticket, provider.label(), batch);
            Ok(Json(FetchResp {
                source: provider.label(),
                fetched,
                applied,
            }))
        }
        Err(e) => {
            metrics::counter!("ingest_provider_errors_total").increment(1);
            tracing::warn!(error = ?e, provider = provider.name(), "provider error");
            Err((StatusCode::BAD_GATEWAY, format!("{e:#}")))
        }
    }
}

#[derive(Deserialize)]
struct LogsQuery {
    #[serde(default)]
    filter: Option<String>,
}

#[derive(Serialize)]
struct LogsResp {
    source: String,
    count: usize,
    logs: Vec<LogEntry>,
}

async fn logs(State(state): State<AppState>, Query(q): Query<LogsQuery>) -> Json<LogsResp> {
    let snap = state.store.snapshot();
    let filter = q.filter.unwrap_or_default();
    let logs: Vec<LogEntry> = snap
        .logs
        .into_iter()
        .filter(|entry| entry.matches(&filter))
        .collect();
    Json(LogsResp {
        source: snap.source,
        count: logs.len(),
        logs,
    })
}

#[derive(Serialize)]
struct ReportResp {
    source: String,
    #[serde(flatten)]
    report: AnalysisReport,
    summary: IncidentSummary,
}

async fn report(State(state): State<AppState>) -> Json<ReportResp> {
    let snap = state.store.snapshot();
    let report = analyze(&snap.logs, &state.analysis);
    let summary = summarize(&report, &snap.logs);
    Json(ReportResp {
        source: snap.source,
        report,
        summary,
    })
}
