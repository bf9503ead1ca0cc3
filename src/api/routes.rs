use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiError;
use crate::{
    cache::{CachePolicy, QueryCache},
    dashboard::{Dashboard, DashboardData},
    db::{ActionShare, PeriodTotals, SummaryStats, WeeklyActivity, WeeklyNetFlow},
    query::DateRange,
};

#[derive(Clone)]
pub struct AppState {
    pub cache: QueryCache,
    /// Range used for whichever picker a request leaves out.
    pub defaults: DateRange,
    pub token_symbol: String,
}

/// Date picker values plus the cache bypass switch.
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub fresh: bool,
}

impl RangeParams {
    fn resolve(&self, defaults: &DateRange) -> Result<(DateRange, CachePolicy), ApiError> {
        let range = DateRange::resolve(self.start.as_deref(), self.end.as_deref(), defaults)
            .map_err(ApiError::BadRequest)?;
        let policy = if self.fresh { CachePolicy::Refresh } else { CachePolicy::UseCached };
        Ok((range, policy))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/staking",
            Router::new()
                .route("/dashboard", get(dashboard))
                .route("/totals", get(totals))
                .route("/summary", get(summary))
                .route("/weekly-activity", get(weekly_activity))
                .route("/weekly-net-flow", get(weekly_net_flow))
                .route("/action-share", get(action_share))
                .route("/cache/clear", post(clear_cache)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let source = state.cache.source();
    source.health_check().await.map_err(ApiError::Unavailable)?;
    Ok(Json(json!({ "status": "ok", "warehouse": source.name() })))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Dashboard>, ApiError> {
    let (range, policy) = params.resolve(&state.defaults)?;
    let data = DashboardData::load(&state.cache, range, policy).await?;
    Ok(Json(Dashboard::render(&data, &state.token_symbol)))
}

async fn totals(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<PeriodTotals>, ApiError> {
    let (range, policy) = params.resolve(&state.defaults)?;
    Ok(Json(state.cache.period_totals(&range, policy).await?))
}

async fn summary(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<SummaryStats>, ApiError> {
    let (range, policy) = params.resolve(&state.defaults)?;
    Ok(Json(state.cache.summary_stats(&range, policy).await?))
}

async fn weekly_activity(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Arc<Vec<WeeklyActivity>>>, ApiError> {
    let (range, policy) = params.resolve(&state.defaults)?;
    Ok(Json(state.cache.weekly_activity(&range, policy).await?))
}

async fn weekly_net_flow(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Arc<Vec<WeeklyNetFlow>>>, ApiError> {
    let (range, policy) = params.resolve(&state.defaults)?;
    Ok(Json(state.cache.weekly_net_flow(&range, policy).await?))
}

async fn action_share(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Arc<Vec<ActionShare>>>, ApiError> {
    let (range, policy) = params.resolve(&state.defaults)?;
    Ok(Json(state.cache.action_share(&range, policy).await?))
}

async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    let entries = state.cache.entry_count().await;
    state.cache.invalidate_all();
    Json(json!({ "cleared": true, "entries": entries }))
}
