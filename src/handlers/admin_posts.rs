use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::error::AppError;
use crate::handlers::parse_json;
use crate::models::{DeletePostQuery, MessageResponse, SavePostRequest};
use crate::posts::{FrontMatter, Post, generate_slug, is_valid_slug};
use crate::state::AppState;

pub async fn list_posts_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(state.posts.list_posts().await)
}

pub async fn get_post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, AppError> {
    state
        .posts
        .get_post(&slug)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", slug)))
}

pub async fn create_post_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let request: SavePostRequest = parse_json(&body)?;
    let slug = match request.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => generate_slug(&request.frontmatter.title),
    };
    let front_matter = validated(slug.as_str(), request.frontmatter)?;

    if state.posts.exists(&slug).await {
        return Err(AppError::Conflict(format!("Post '{}' already exists", slug)));
    }

    state.posts.save_post(&slug, &front_matter, &request.content).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Post created successfully"))))
}

pub async fn update_post_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let request: SavePostRequest = parse_json(&body)?;
    let slug = request
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Slug is required".to_string()))?
        .to_string();
    let front_matter = validated(&slug, request.frontmatter)?;

    if !state.posts.exists(&slug).await {
        return Err(AppError::NotFound(format!("Post '{}' not found", slug)));
    }

    state.posts.save_post(&slug, &front_matter, &request.content).await?;
    Ok(Json(MessageResponse::new("Post updated successfully")))
}

pub async fn delete_post_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeletePostQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let slug = query
        .slug
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Slug is required".to_string()))?;

    if !is_valid_slug(&slug) {
        return Err(AppError::BadRequest("Invalid slug".to_string()));
    }

    if !state.posts.delete_post(&slug).await? {
        return Err(AppError::NotFound(format!("Post '{}' not found", slug)));
    }
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

// Boundary checks before anything reaches the store
fn validated(slug: &str, front_matter: FrontMatter) -> Result<FrontMatter, AppError> {
    if !is_valid_slug(slug) {
        return Err(AppError::BadRequest(
            "Invalid slug: use lowercase letters, digits and hyphens".to_string(),
        ));
    }

    let missing = front_matter.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if front_matter.parsed_date().is_none() {
        return Err(AppError::BadRequest("Date must be YYYY-MM-DD".to_string()));
    }

    Ok(front_matter.normalized())
}
