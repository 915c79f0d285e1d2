pub mod app;
pub mod catalog;
pub mod config;
pub mod embed;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod format;
pub mod http;
pub mod player;
pub mod progress;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use app::App;
pub use catalog::{Catalog, CatalogLoader, Hydration, HydrationSummary, LoaderOptions, Podcast, SharedCatalog};
pub use config::{DEFAULT_MASTER_FEED, PlayerConfig};
pub use embed::{DeepLink, Dimension, EmbedCode, EmbedOptions, EmbedSettings};
pub use error::{AppError, CatalogError, EmbedError, FeedError, FetchError, PlayerError};
pub use feed::{Episode, ParsedFeed, PodcastEntry, parse_master_feed, parse_podcast_feed};
pub use fetch::{FetchResolver, Strategy, default_strategies};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use player::{
    Change, DownloadLink, MediaElement, MediaEvent, Phase, Player, PlayerState, SharedStateListener,
    StateListener, VolumeLevel,
};
pub use progress::{LoadEvent, LoadReporter, NoopReporter, SharedLoadReporter};
