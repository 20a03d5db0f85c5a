use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub q: String,
    pub a: String,
}

// Metadata block at the top of every post file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tldr: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<Vec<FaqItem>>,
}

impl FrontMatter {
    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("summary", &self.summary),
            ("date", &self.date),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    // Drop blank TL;DR points and half-filled FAQ entries
    pub fn normalized(mut self) -> Self {
        self.tldr = self
            .tldr
            .map(|points| {
                points
                    .into_iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|points| !points.is_empty());
        self.faq = self
            .faq
            .map(|items| {
                items
                    .into_iter()
                    .filter(|item| !item.q.trim().is_empty() && !item.a.trim().is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|items| !items.is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub slug: String,
    #[serde(flatten)]
    pub front_matter: FrontMatter,
    pub content: String,
}

impl Post {
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            title: self.front_matter.title.clone(),
            summary: self.front_matter.summary.clone(),
            date: self.front_matter.date.clone(),
            category: self.front_matter.category.clone(),
            tldr: self.front_matter.tldr.clone(),
        }
    }
}

// Listing view of a post, without body or FAQ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub date: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tldr: Option<Vec<String>>,
}
