use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::AppError;
use crate::posts::model::{FrontMatter, Post};
use crate::posts::slug::is_valid_slug;

const EXTENSION: &str = "mdx";
const DELIMITER: &str = "---";

/// One `<slug>.mdx` file per post: a YAML metadata block fenced by `---`
/// lines, then the body. Reads degrade to empty results; writes and
/// deletes report their faults.
#[derive(Debug, Clone)]
pub struct PostStore {
    dir: PathBuf,
}

impl PostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", slug, EXTENSION))
    }

    /// All readable posts, newest first.
    pub async fn list_posts(&self) -> Vec<Post> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Err(e) = fs::create_dir_all(&self.dir).await {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "could not create content directory");
                }
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "could not list content directory");
                return Vec::new();
            }
        };

        let mut posts = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "stopped reading content directory");
                    break;
                }
            };

            let path = entry.path();
            let Some(slug) = slug_of(&path) else {
                continue;
            };
            if let Some(post) = self.read_post(slug, &path).await {
                posts.push(post);
            }
        }

        posts.sort_by(newest_first);
        posts
    }

    pub async fn get_post(&self, slug: &str) -> Option<Post> {
        if !is_valid_slug(slug) {
            return None;
        }
        self.read_post(slug.to_string(), &self.path_for(slug)).await
    }

    pub async fn posts_by_category(&self, category: &str) -> Vec<Post> {
        self.list_posts()
            .await
            .into_iter()
            .filter(|p| p.front_matter.category == category)
            .collect()
    }

    pub async fn exists(&self, slug: &str) -> bool {
        is_valid_slug(slug) && fs::try_exists(self.path_for(slug)).await.unwrap_or(false)
    }

    pub async fn save_post(
        &self,
        slug: &str,
        front_matter: &FrontMatter,
        content: &str,
    ) -> Result<(), AppError> {
        if !is_valid_slug(slug) {
            return Err(AppError::BadRequest(format!("Invalid slug: {}", slug)));
        }

        fs::create_dir_all(&self.dir).await?;

        let rendered = render_post(front_matter, content)?;
        let tmp = self.dir.join(format!(".{}.{}.tmp", slug, EXTENSION));
        fs::write(&tmp, rendered).await?;
        fs::rename(&tmp, self.path_for(slug)).await?;

        tracing::info!(slug, "saved post");
        Ok(())
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete_post(&self, slug: &str) -> Result<bool, AppError> {
        if !is_valid_slug(slug) {
            return Err(AppError::BadRequest(format!("Invalid slug: {}", slug)));
        }

        match fs::remove_file(self.path_for(slug)).await {
            Ok(()) => {
                tracing::info!(slug, "deleted post");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_post(&self, slug: String, path: &Path) -> Option<Post> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read post");
                return None;
            }
        };

        match parse_post(slug, &raw) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed post");
                None
            }
        }
    }
}

fn slug_of(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    is_valid_slug(stem).then(|| stem.to_string())
}

fn newest_first(a: &Post, b: &Post) -> Ordering {
    match (a.front_matter.parsed_date(), b.front_matter.parsed_date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug.cmp(&b.slug))
}

// Distinct non-empty categories, in listing order
pub fn categories_of(posts: &[Post]) -> Vec<String> {
    let mut seen = Vec::new();
    for post in posts {
        let category = &post.front_matter.category;
        if !category.is_empty() && !seen.contains(category) {
            seen.push(category.clone());
        }
    }
    seen
}

pub fn parse_post(slug: String, raw: &str) -> Result<Post, AppError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let malformed = || AppError::Internal(format!("post '{}' has no {} metadata block", slug, DELIMITER));

    let rest = raw.strip_prefix(DELIMITER).ok_or_else(malformed)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .ok_or_else(malformed)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let front_matter: FrontMatter = serde_yml::from_str(&rest[..offset])?;
            return Ok(Post {
                slug,
                front_matter,
                content: rest[offset + line.len()..].to_string(),
            });
        }
        offset += line.len();
    }

    Err(malformed())
}

pub fn render_post(front_matter: &FrontMatter, content: &str) -> Result<String, AppError> {
    let meta = serde_yml::to_string(front_matter)?;
    let meta = meta.strip_prefix("---\n").unwrap_or(&meta);
    Ok(format!("{DELIMITER}\n{meta}{DELIMITER}\n{content}"))
}
