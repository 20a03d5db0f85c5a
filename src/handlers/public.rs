use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::AppError;
use crate::models::{CategoryCount, CategoryResponse, HomeResponse};
use crate::posts::{Post, PostSummary, categories_of};
use crate::state::AppState;

const FEATURED: usize = 3;
const RECENT: usize = 6;

pub async fn home_handler(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    let posts = state.posts.list_posts().await;
    let summaries: Vec<PostSummary> = posts.iter().map(Post::summary).collect();

    Json(HomeResponse {
        featured: summaries.iter().take(FEATURED).cloned().collect(),
        recent: summaries.iter().skip(FEATURED).take(RECENT).cloned().collect(),
        categories: categories_of(&posts),
    })
}

pub async fn categories_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryCount>> {
    let posts = state.posts.list_posts().await;
    let counts = categories_of(&posts)
        .into_iter()
        .map(|name| {
            let count = posts.iter().filter(|p| p.front_matter.category == name).count();
            CategoryCount { name, count }
        })
        .collect();
    Json(counts)
}

// An unknown category is an empty listing, not an error
pub async fn category_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Json<CategoryResponse> {
    let posts: Vec<PostSummary> = state
        .posts
        .posts_by_category(&category)
        .await
        .iter()
        .map(Post::summary)
        .collect();

    Json(CategoryResponse {
        category,
        count: posts.len(),
        posts,
    })
}

pub async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, AppError> {
    state
        .posts
        .get_post(&slug)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}
