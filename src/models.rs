use serde::{Deserialize, Serialize};

use crate::posts::{FrontMatter, PostSummary};

// Login API request format
#[derive(Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

// Admin create/update request format
#[derive(Deserialize, Debug, Clone)]
pub struct SavePostRequest {
    #[serde(default)]
    pub slug: Option<String>,
    pub frontmatter: FrontMatter,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct DeletePostQuery {
    pub slug: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// Throttled login response body
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThrottledResponse {
    pub error: String,
    pub retry_after: String, // ISO-8601
}

#[derive(Serialize, Debug, Clone)]
pub struct HomeResponse {
    pub featured: Vec<PostSummary>,
    pub recent: Vec<PostSummary>,
    pub categories: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct CategoryResponse {
    pub category: String,
    pub count: usize,
    pub posts: Vec<PostSummary>,
}
