//! Static fallback catalog.
//!
//! Substituted whenever a source fails or comes back empty so that every
//! listing has something to show. The data is fixed, which keeps fallback
//! pages deterministic.

use crate::models::{ApiCategory, ContentItem, ContentQuery, ContentType, PaginatedContentResponse};

pub const MOCK_PAGE_SIZE: usize = 6;

struct MockEntry {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    genres: &'static [&'static str],
    year: i32,
    rating: f64,
    runtime: &'static str,
    content_type: ContentType,
}

const ENTRIES: &[MockEntry] = &[
    MockEntry {
        id: "mock-1",
        title: "The Silent Harbor",
        description: "A lighthouse keeper uncovers a smuggling ring on a remote island.",
        category: "drama",
        genres: &["Drama", "Mystery"],
        year: 2019,
        rating: 7.4,
        runtime: "1h 52m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-2",
        title: "Neon Run",
        description: "A courier races across a flooded megacity before dawn.",
        category: "action",
        genres: &["Action", "Sci-Fi"],
        year: 2021,
        rating: 6.9,
        runtime: "1h 47m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-3",
        title: "Kitchen Rules",
        description: "Two rival chefs are forced to share one tiny restaurant.",
        category: "comedy",
        genres: &["Comedy"],
        year: 2018,
        rating: 6.5,
        runtime: "1h 38m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-4",
        title: "Orbital",
        description: "The last crew of a failing space station votes on who goes home.",
        category: "sci_fi",
        genres: &["Sci-Fi", "Thriller"],
        year: 2022,
        rating: 7.8,
        runtime: "2h 05m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-5",
        title: "Small Town Files",
        description: "A rookie detective reopens the cold cases nobody talks about.",
        category: "tv",
        genres: &["Crime", "Drama"],
        year: 2020,
        rating: 8.1,
        runtime: "3 seasons",
        content_type: ContentType::TvShow,
    },
    MockEntry {
        id: "mock-6",
        title: "Borderline",
        description: "An undercover agent loses track of which side she is on.",
        category: "action",
        genres: &["Action", "Thriller"],
        year: 2017,
        rating: 7.0,
        runtime: "2h 01m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-7",
        title: "Family Dinner",
        description: "Three generations, one holiday, and far too many secrets.",
        category: "comedy",
        genres: &["Comedy", "Drama"],
        year: 2023,
        rating: 6.8,
        runtime: "1h 41m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-8",
        title: "Deep Signal",
        description: "Researchers decode a transmission coming from the ocean floor.",
        category: "sci_fi",
        genres: &["Sci-Fi", "Mystery"],
        year: 2016,
        rating: 7.2,
        runtime: "1h 56m",
        content_type: ContentType::Movie,
    },
    MockEntry {
        id: "mock-9",
        title: "The Archive",
        description: "Librarians guard the records of a city that no longer exists.",
        category: "tv",
        genres: &["Drama", "Fantasy"],
        year: 2024,
        rating: 8.4,
        runtime: "1 season",
        content_type: ContentType::TvShow,
    },
    MockEntry {
        id: "mock-10",
        title: "Last Train South",
        description: "Strangers on a night train realise they share the same past.",
        category: "drama",
        genres: &["Drama", "Thriller"],
        year: 2015,
        rating: 7.6,
        runtime: "1h 49m",
        content_type: ContentType::Movie,
    },
];

const CATEGORIES: &[(&str, &str)] = &[
    ("action", "Action"),
    ("comedy", "Comedy"),
    ("drama", "Drama"),
    ("sci_fi", "Science Fiction"),
    ("tv", "TV Shows"),
];

impl MockEntry {
    fn to_item(&self) -> ContentItem {
        ContentItem {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            poster_url: format!("https://placehold.co/300x450?text={}", self.id),
            backdrop_url: Some(format!("https://placehold.co/1280x720?text={}", self.id)),
            cast: None,
            director: None,
            rating: Some(self.rating),
            genres: Some(self.genres.iter().map(|g| g.to_string()).collect()),
            release_year: Some(self.year),
            runtime: Some(self.runtime.to_string()),
            content_type: self.content_type,
            qualities: Some(vec!["720p".to_string(), "1080p".to_string()]),
        }
    }
}

pub fn mock_categories() -> Vec<ApiCategory> {
    CATEGORIES
        .iter()
        .map(|(id, name)| ApiCategory {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Every mock item, in catalog order
pub fn mock_items() -> Vec<ContentItem> {
    ENTRIES.iter().map(MockEntry::to_item).collect()
}

pub fn mock_item(id: &str) -> Option<ContentItem> {
    ENTRIES.iter().find(|e| e.id == id).map(MockEntry::to_item)
}

/// One page of mock content honouring the category and search filters.
///
/// Pages past the end come back empty with the real page count, so callers
/// can still tell how far the listing goes.
pub fn mock_page(query: &ContentQuery) -> PaginatedContentResponse {
    let category = query.category_id.as_deref().filter(|c| !c.trim().is_empty());
    let term = query.search_term.as_deref().unwrap_or("");

    let matching: Vec<ContentItem> = ENTRIES
        .iter()
        .filter(|e| category.map_or(true, |c| e.category == c))
        .map(MockEntry::to_item)
        .filter(|item| item.matches_term(term))
        .collect();

    let total = matching.len();
    let page_count = total.div_ceil(MOCK_PAGE_SIZE).max(1);
    let page = query.page.unwrap_or(1).max(1) as usize;

    let items = matching
        .into_iter()
        .skip((page - 1) * MOCK_PAGE_SIZE)
        .take(MOCK_PAGE_SIZE)
        .collect();

    PaginatedContentResponse {
        items,
        total: total as u64,
        page_count: page_count as u32,
    }
}

/// Mock content shown in place of a failed or empty fetch, with the page it
/// actually shows.
///
/// Falls back to the unfiltered first page when the filters or page number
/// match nothing, so the result is never empty.
pub fn mock_fallback(query: &ContentQuery) -> (u32, PaginatedContentResponse) {
    let filtered = mock_page(query);
    if !filtered.items.is_empty() {
        return (query.page.unwrap_or(1).max(1), filtered);
    }
    (1, mock_page(&ContentQuery::page(1)))
}
