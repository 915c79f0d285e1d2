mod loader;
mod model;

pub use loader::{CatalogLoader, HydrationSummary, LoaderOptions};
pub use model::{Catalog, Hydration, Podcast, SharedCatalog};
