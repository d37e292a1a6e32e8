use serde::{Deserialize, Serialize};

/// Type of content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Movie,
    TvShow,
}

impl ContentType {
    /// Maps the loose type labels sources use onto our two kinds
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "tv_show" | "tv" | "tvshow" | "tv-show" | "series" | "tv_series" | "show" => {
                ContentType::TvShow
            }
            _ => ContentType::Movie,
        }
    }
}

/// Represents a movie or TV show returned by a content source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Unique within one source's result set
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub poster_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualities: Option<Vec<String>>,
}

impl ContentItem {
    /// Creates an item with only the required fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>, poster_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            poster_url: poster_url.into(),
            backdrop_url: None,
            cast: None,
            director: None,
            rating: None,
            genres: None,
            release_year: None,
            runtime: None,
            content_type: ContentType::Movie,
            qualities: None,
        }
    }

    /// Case-insensitive match against title, description and genres
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self
                .genres
                .as_ref()
                .is_some_and(|genres| genres.iter().any(|g| g.to_lowercase().contains(&term)))
    }
}

/// A category exposed by one source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiCategory {
    pub id: String,
    pub name: String,
}

/// One page of content as returned by a source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedContentResponse {
    pub items: Vec<ContentItem>,
    pub total: u64,
    pub page_count: u32,
}

/// Query parameters understood by content sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub search_term: Option<String>,
}

impl ContentQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            page: Some(1),
            search_term: Some(term.into()),
            ..Self::default()
        }
    }

    /// Query pairs in the order sources receive them, omitting unset or blank values
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(category) = self.category_id.as_deref().filter(|c| !c.trim().is_empty()) {
            pairs.push(("categoryId", category.to_string()));
        }
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("searchTerm", term.trim().to_string()));
        }
        pairs
    }
}
