pub mod catalog;
pub mod fetcher;
pub mod library;
pub mod mock;
pub mod preferences;
pub mod recommendations;
pub mod registry;
pub mod search;

pub use catalog::{CatalogQuery, CatalogSession, CatalogSnapshot, ScrollMode};
pub use fetcher::{ContentSource, HttpContentFetcher};
pub use library::{merge_by_id, ContentLibrary};
pub use preferences::PreferenceService;
pub use recommendations::{
    HttpRecommendationClient, RecommendationClient, RecommendationRequest, RecommendationResponse,
    UnconfiguredRecommendations,
};
pub use registry::SourceRegistry;
pub use search::{SearchSession, SearchSnapshot};
