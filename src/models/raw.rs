//! Shape checking for payloads returned by user-supplied sources.
//!
//! Sources are arbitrary third-party JSON APIs, so nothing about their
//! responses is trusted until it has passed through here. Whole-payload
//! problems become a [`ShapeError`]; individual items that lack an id, title
//! or poster are dropped.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{ApiCategory, ContentItem, ContentType, PaginatedContentResponse};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ShapeError {
    #[error("expected a JSON object or array, got {0}")]
    UnexpectedRoot(&'static str),

    #[error("field `{0}` is not a list")]
    NotAList(&'static str),
}

/// Raw content entry as a source sends it.
///
/// Sources disagree on field names, so each field is looked up under a list
/// of accepted keys in priority order. An entry may carry several of them
/// (`posterUrl` and `poster`); the first non-null one wins.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct RawContentItem(Map<String, Value>);

const ID_KEYS: &[&str] = &["id"];
const TITLE_KEYS: &[&str] = &["title"];
const DESCRIPTION_KEYS: &[&str] = &["description", "overview"];
const POSTER_KEYS: &[&str] = &["posterUrl", "poster_url", "poster"];
const BACKDROP_KEYS: &[&str] = &["backdropUrl", "backdrop_url", "backdrop"];
const CAST_KEYS: &[&str] = &["cast"];
const DIRECTOR_KEYS: &[&str] = &["director"];
const RATING_KEYS: &[&str] = &["rating"];
const GENRE_KEYS: &[&str] = &["genres", "genre"];
const YEAR_KEYS: &[&str] = &["releaseYear", "release_year", "year"];
const RUNTIME_KEYS: &[&str] = &["runtime"];
const TYPE_KEYS: &[&str] = &["type", "contentType"];
const QUALITY_KEYS: &[&str] = &["qualities", "quality"];

impl RawContentItem {
    /// Wraps a JSON object; anything else is not an item
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    fn field(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }

    /// Converts to a [`ContentItem`], or `None` when a required field is missing
    pub fn into_item(self) -> Option<ContentItem> {
        let id = id_string(self.field(ID_KEYS)?)?;
        let title = non_empty_string(self.field(TITLE_KEYS)?)?;
        let poster_url = non_empty_string(self.field(POSTER_KEYS)?)?;

        Some(ContentItem {
            id,
            title,
            description: self
                .field(DESCRIPTION_KEYS)
                .and_then(non_empty_string)
                .unwrap_or_default(),
            poster_url,
            backdrop_url: self.field(BACKDROP_KEYS).and_then(non_empty_string),
            cast: self.field(CAST_KEYS).and_then(string_list),
            director: self.field(DIRECTOR_KEYS).and_then(string_list),
            rating: self.field(RATING_KEYS).and_then(number),
            genres: self.field(GENRE_KEYS).and_then(string_list),
            release_year: self
                .field(YEAR_KEYS)
                .and_then(number)
                .map(|year| year as i32),
            runtime: self.field(RUNTIME_KEYS).and_then(|v| match v {
                Value::Number(n) => Some(format!("{} min", n)),
                other => non_empty_string(other),
            }),
            content_type: self
                .field(TYPE_KEYS)
                .and_then(Value::as_str)
                .map(ContentType::from_label)
                .unwrap_or_default(),
            qualities: self.field(QUALITY_KEYS).and_then(string_list),
        })
    }
}

/// Validates a content-list payload.
///
/// Accepts `{items, total?, pageCount?}` or a bare array. A missing `total`
/// falls back to the number of valid items and a missing `pageCount` to 1.
pub fn parse_content_page(payload: Value) -> Result<PaginatedContentResponse, ShapeError> {
    let (raw_items, total, page_count) = match payload {
        Value::Array(items) => (items, None, None),
        Value::Object(mut map) => {
            let items = match map.remove("items") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => return Err(ShapeError::NotAList("items")),
            };
            let total = map.get("total").and_then(number).map(|t| t.max(0.0) as u64);
            let page_count = map
                .get("pageCount")
                .or_else(|| map.get("page_count"))
                .or_else(|| map.get("totalPages"))
                .and_then(number)
                .map(|p| p.max(0.0) as u32);
            (items, total, page_count)
        }
        other => return Err(ShapeError::UnexpectedRoot(kind(&other))),
    };

    let received = raw_items.len();
    let items: Vec<ContentItem> = raw_items
        .into_iter()
        .filter_map(RawContentItem::from_value)
        .filter_map(RawContentItem::into_item)
        .collect();

    if items.len() < received {
        tracing::debug!(
            received,
            kept = items.len(),
            "Dropped content items missing required fields"
        );
    }

    Ok(PaginatedContentResponse {
        total: total.unwrap_or(items.len() as u64),
        page_count: page_count.unwrap_or(1).max(1),
        items,
    })
}

/// Validates a category-list payload: a bare array or `{categories: [...]}`
pub fn parse_categories(payload: Value) -> Result<Vec<ApiCategory>, ShapeError> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("categories") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(ShapeError::NotAList("categories")),
            None => return Err(ShapeError::UnexpectedRoot("object")),
        },
        other => return Err(ShapeError::UnexpectedRoot(kind(&other))),
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            Some(ApiCategory {
                id: id_string(entry.get("id")?)?,
                name: non_empty_string(entry.get("name")?)?,
            })
        })
        .collect())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        other => non_empty_string(other),
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts a list of strings or a single comma-separated string
fn string_list(value: &Value) -> Option<Vec<String>> {
    let list: Vec<String> = match value {
        Value::Array(values) => values.iter().filter_map(non_empty_string).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };

    (!list.is_empty()).then_some(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_page() {
        let payload = json!({
            "items": [{
                "id": "tt1",
                "title": "Heat",
                "description": "A crew of thieves",
                "posterUrl": "https://img.example/heat.jpg",
                "backdropUrl": "https://img.example/heat-wide.jpg",
                "cast": ["Al Pacino", "Robert De Niro"],
                "director": ["Michael Mann"],
                "rating": 8.3,
                "genres": ["Crime"],
                "releaseYear": 1995,
                "runtime": "2h 50m",
                "type": "movie",
                "qualities": ["1080p", "4K"]
            }],
            "total": 40,
            "pageCount": 4
        });

        let page = parse_content_page(payload).unwrap();
        assert_eq!(page.total, 40);
        assert_eq!(page.page_count, 4);
        assert_eq!(page.items.len(), 1);

        let item = &page.items[0];
        assert_eq!(item.id, "tt1");
        assert_eq!(item.director, Some(vec!["Michael Mann".to_string()]));
        assert_eq!(item.rating, Some(8.3));
        assert_eq!(item.release_year, Some(1995));
        assert_eq!(item.qualities.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_items_missing_required_fields_are_dropped() {
        let payload = json!({
            "items": [
                { "id": 1, "title": "Kept", "poster": "https://img.example/1.jpg" },
                { "id": 2, "title": "No poster" },
                { "title": "No id", "posterUrl": "https://img.example/3.jpg" },
                { "id": 4, "title": "  ", "posterUrl": "https://img.example/4.jpg" },
                "not even an object"
            ],
            "total": 5,
            "pageCount": 1
        });

        let page = parse_content_page(payload).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "1");
        assert_eq!(page.total, 5);
    }

    #[test]
    fn test_bare_array_defaults_totals() {
        let payload = json!([
            { "id": "a", "title": "A", "posterUrl": "p" },
            { "id": "b", "title": "B", "posterUrl": "p", "type": "series" }
        ]);

        let page = parse_content_page(payload).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.page_count, 1);
        assert_eq!(page.items[1].content_type, ContentType::TvShow);
    }

    #[test]
    fn test_loose_field_types_are_coerced() {
        let payload = json!({ "items": [{
            "id": 7,
            "title": "Loose",
            "poster_url": "p",
            "rating": "7.5",
            "year": "2001",
            "runtime": 95,
            "genre": "Drama, Mystery"
        }]});

        let item = &parse_content_page(payload).unwrap().items[0];
        assert_eq!(item.rating, Some(7.5));
        assert_eq!(item.release_year, Some(2001));
        assert_eq!(item.runtime.as_deref(), Some("95 min"));
        assert_eq!(
            item.genres,
            Some(vec!["Drama".to_string(), "Mystery".to_string()])
        );
    }

    #[test]
    fn test_wrong_root_is_an_error() {
        assert_eq!(
            parse_content_page(json!("hello")),
            Err(ShapeError::UnexpectedRoot("string"))
        );
        assert_eq!(
            parse_content_page(json!({ "items": 3 })),
            Err(ShapeError::NotAList("items"))
        );
    }

    #[test]
    fn test_parse_categories() {
        let categories = parse_categories(json!([
            { "id": "action", "name": "Action" },
            { "id": 2, "name": "Drama" },
            { "id": "x" }
        ]))
        .unwrap();

        assert_eq!(
            categories,
            vec![
                ApiCategory { id: "action".to_string(), name: "Action".to_string() },
                ApiCategory { id: "2".to_string(), name: "Drama".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_wrapped_categories() {
        let categories =
            parse_categories(json!({ "categories": [{ "id": "a", "name": "A" }] })).unwrap();
        assert_eq!(categories.len(), 1);
        assert!(parse_categories(json!({ "other": [] })).is_err());
    }

    #[test]
    fn test_item_with_both_key_spellings_is_kept() {
        let payload = json!({ "items": [{
            "id": "1",
            "title": "Dune",
            "posterUrl": "https://img.example/dune.jpg",
            "poster": "https://img.example/dune-small.jpg",
            "year": 2020,
            "releaseYear": 2021,
            "genre": "Ignored",
            "genres": ["Sci-Fi"]
        }]});

        let page = parse_content_page(payload).unwrap();

        assert_eq!(page.items.len(), 1);
        let item = &page.items[0];
        assert_eq!(item.poster_url, "https://img.example/dune.jpg");
        assert_eq!(item.release_year, Some(2021));
        assert_eq!(item.genres, Some(vec!["Sci-Fi".to_string()]));
    }

    #[test]
    fn test_null_preferred_key_falls_through() {
        let payload = json!([{ "id": 3, "title": "T", "posterUrl": null, "poster": "p" }]);
        assert_eq!(parse_content_page(payload).unwrap().items[0].poster_url, "p");
    }
}
