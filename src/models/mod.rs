pub mod content;
pub mod preferences;
pub mod raw;
pub mod source;

pub use content::{ApiCategory, ContentItem, ContentQuery, ContentType, PaginatedContentResponse};
pub use preferences::{PreferencesUpdate, Theme, UserPreferences};
pub use raw::{parse_categories, parse_content_page, ShapeError};
pub use source::SourceConfig;
