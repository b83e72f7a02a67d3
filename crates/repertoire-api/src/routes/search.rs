//! Search query and index webhook endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use repertoire_realtime::webhook::WebhookOutcome;
use repertoire_search::domain::documents::DocumentType;
use repertoire_search::engine::SearchQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{debug, instrument};

use crate::auth::{AuthenticatedUser, has_bearer_secret};
use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Free-text query; empty matches everything.
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Document type to restrict to.
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    /// Comma-separated sort expressions, e.g. `updatedAt:desc`.
    pub sort: Option<String>,
}

impl SearchParams {
    fn into_query(self, user: AuthenticatedUser) -> Result<SearchQuery, ApiError> {
        let mut query = SearchQuery::new(self.q, user.user_id);
        query.page = self.page;
        query.page_size = self.page_size;
        query.doc_type = self
            .doc_type
            .as_deref()
            .map(str::parse::<DocumentType>)
            .transpose()?;
        query.sort = self
            .sort
            .iter()
            .flat_map(|sort| sort.split(','))
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(query)
    }
}

/// Response body for GET /search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<Value>,
    pub total_count: u64,
}

/// GET /search
#[instrument(skip_all, fields(q = %params.q))]
async fn search(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::Unauthorized);
    };
    let query = params.into_query(user)?;
    let found = state.engine.search(&query).await?;

    let results = found
        .hits
        .iter()
        .map(|hit| {
            let mut value = serde_json::to_value(hit)?;
            if let Some(fields) = value.as_object_mut() {
                fields.remove("userId");
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()
        .map_err(repertoire_core::error::DomainError::from)?;

    Ok(Json(SearchResponse {
        results,
        total_count: found.total_count,
    }))
}

/// POST /search/index-webhook
#[instrument(skip_all, fields(bytes = body.len()))]
async fn index_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    if !has_bearer_secret(&headers, &state.webhook_secret) {
        return Err(ApiError::Unauthorized);
    }
    match state.webhook.receive_body(&body).await? {
        WebhookOutcome::Notified(user_id) => debug!(%user_id, "search invalidation sent"),
        WebhookOutcome::Untracked => debug!("callback for untracked task"),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for search endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search)).route(
        "/search/index-webhook",
        post(index_webhook).layer(RequestDecompressionLayer::new()),
    )
}
