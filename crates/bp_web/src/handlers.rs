use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use bp_core::{Article, ArticleEdit, GenerationRequest, Settings, SettingsPatch};

use crate::{error::ApiError, AppState};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// One entry of a generate request. Missing fields are caught by validation
/// so they answer 400 like any other bad pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordPair {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(default)]
    pub keywords: Vec<KeywordPair>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishToTargetBody {
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsBody {
    pub keywords: Vec<String>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "message": "Blog pipeline API is running!" }))
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Article>> {
    Ok(Json(state.publishing.list_all().await?))
}

pub async fn list_published(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Article>> {
    Ok(Json(state.publishing.list_published().await?))
}

pub async fn generate_articles(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateBody>,
) -> ApiResult<Value> {
    let requests: Vec<GenerationRequest> = body
        .keywords
        .into_iter()
        .map(|pair| GenerationRequest::new(pair.keyword, pair.image_url))
        .collect();
    let created = state.batch.generate_batch(&requests).await?;
    Ok(Json(json!({
        "message": format!("{} blogs generated successfully!", created.len()),
        "blogs": created,
    })))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<ArticleEdit>,
) -> ApiResult<Value> {
    let article = state.publishing.update(&id, edit).await?;
    Ok(Json(json!({ "message": "Blog updated successfully", "blog": article })))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.publishing.delete(&id).await?;
    Ok(Json(json!({ "message": "Blog deleted successfully" })))
}

pub async fn publish_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Article> {
    Ok(Json(state.publishing.publish_now(&id).await?))
}

pub async fn schedule_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Article> {
    Ok(Json(state.publishing.schedule(&id).await?))
}

pub async fn publish_to_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<PublishToTargetBody>>,
) -> ApiResult<Article> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let article = state
        .publishing
        .publish_to_target(&id, body.destination.as_deref())
        .await?;
    Ok(Json(article))
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Settings> {
    Ok(Json(state.settings.get().await?))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Value> {
    let settings = state.settings.update(patch).await?;
    Ok(Json(json!({ "message": "Settings updated successfully", "settings": settings })))
}

pub async fn update_keywords(
    State(state): State<Arc<AppState>>,
    Json(body): Json<KeywordsBody>,
) -> ApiResult<Value> {
    let keywords = state.settings.update_keywords(body.keywords).await?;
    Ok(Json(json!({ "message": "Keywords updated successfully", "keywords": keywords })))
}

pub async fn delete_keyword(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> ApiResult<Value> {
    let keywords = state.settings.delete_keyword(index).await?;
    Ok(Json(json!({ "message": "Keyword deleted", "keywords": keywords })))
}
