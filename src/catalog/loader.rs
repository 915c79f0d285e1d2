// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::feed::{ParsedFeed, parse_master_feed, parse_podcast_feed};
use crate::fetch::FetchResolver;
use crate::http::HttpClient;
use crate::progress::{LoadEvent, SharedLoadReporter};

use super::model::{Catalog, SharedCatalog};

/// Options for catalog loading
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Pause between two background feed requests
    pub hydration_pause: Duration,
    /// Attempts after which a failing podcast is no longer fetched on selection
    pub max_hydration_attempts: u32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            hydration_pause: Duration::from_millis(500),
            max_hydration_attempts: 2,
        }
    }
}

/// Outcome of a background hydration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationSummary {
    /// Podcasts whose feed loaded during this pass
    pub loaded: usize,
    /// Podcasts whose feed failed during this pass
    pub failed: usize,
    /// Podcasts that needed no fetch (already loaded, or out of attempts)
    pub skipped: usize,
}

/// Builds the catalog: master feed first, then every podcast's own feed
#[derive(Clone)]
pub struct CatalogLoader<C> {
    resolver: FetchResolver<C>,
    options: LoaderOptions,
    reporter: SharedLoadReporter,
}

impl<C: HttpClient + Clone + 'static> CatalogLoader<C> {
    pub fn new(resolver: FetchResolver<C>, options: LoaderOptions, reporter: SharedLoadReporter) -> Self {
        Self {
            resolver,
            options,
            reporter,
        }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Fetch the master feed and build the index; no episodes are loaded
    pub async fn load_index(&self, master_url: &str) -> Result<Catalog, CatalogError> {
        self.reporter.report(LoadEvent::FetchingMasterFeed {
            url: master_url.to_string(),
        });
        info!(url = master_url, "Fetching master feed");

        let text = self.resolver.fetch_text(master_url).await?;
        let entries = parse_master_feed(&text)?;

        if entries.is_empty() {
            return Err(CatalogError::NoPodcasts);
        }

        info!(count = entries.len(), "Found podcast feeds in master list");
        self.reporter.report(LoadEvent::IndexReady {
            podcast_count: entries.len(),
        });

        Ok(Catalog::from_entries(entries))
    }

    /// Load the index and eagerly hydrate the first podcast
    ///
    /// A failure of the first podcast is shown to the user but does not
    /// abort: the entry stays retryable and the rest of the catalog is usable.
    pub async fn load(&self, master_url: &str) -> Result<SharedCatalog, CatalogError> {
        let catalog = self.load_index(master_url).await?.into_shared();

        let first_title = catalog
            .read()
            .await
            .get(0)
            .map(|p| p.title.clone())
            .unwrap_or_default();
        self.reporter.report(LoadEvent::LoadingStarted {
            message: format!("Loading {first_title}..."),
        });

        if let Err(e) = self.hydrate(&catalog, 0).await {
            self.reporter.report(LoadEvent::Error {
                message: e.user_message(),
            });
        }
        self.reporter.report(LoadEvent::LoadingFinished);

        Ok(catalog)
    }

    /// Fetch one podcast's feed and merge it into its catalog entry in place
    ///
    /// Returns the number of episodes found. The catalog lock is never held
    /// across the network request. If the entry got loaded by another fetch
    /// meanwhile, this result is discarded and the loaded entry left as is.
    pub async fn hydrate(&self, catalog: &SharedCatalog, id: usize) -> Result<usize, CatalogError> {
        let (title, feed_url) = {
            let catalog = catalog.read().await;
            let podcast = catalog.get(id).ok_or(CatalogError::UnknownPodcast(id))?;
            (podcast.title.clone(), podcast.feed_url.clone())
        };

        self.reporter.report(LoadEvent::Hydrating {
            podcast_id: id,
            title: title.clone(),
        });

        let result = self.fetch_feed(&feed_url).await;

        let mut catalog = catalog.write().await;
        let podcast = catalog
            .get_mut(id)
            .ok_or(CatalogError::UnknownPodcast(id))?;

        // Another fetch of the same podcast finished first; keep its episodes
        if podcast.is_hydrated() {
            debug!(podcast = %title, "Dropping late feed result for loaded podcast");
            return Ok(podcast.episodes.len());
        }

        match result {
            Ok(feed) => {
                let episode_count = feed.episodes.len();
                podcast.apply_feed(feed);
                info!(podcast = %title, episode_count, "Loaded podcast episodes");
                self.reporter.report(LoadEvent::Hydrated {
                    podcast_id: id,
                    title,
                    episode_count,
                });
                Ok(episode_count)
            }
            Err(e) => {
                podcast.record_failure();
                warn!(podcast = %title, error = %e, "Failed to load podcast");
                self.reporter.report(LoadEvent::HydrationFailed {
                    podcast_id: id,
                    title,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_feed(&self, feed_url: &str) -> Result<ParsedFeed, CatalogError> {
        let text = self.resolver.fetch_text(feed_url).await?;
        Ok(parse_podcast_feed(&text)?)
    }

    /// Hydrate a podcast on selection if it has not been loaded yet
    ///
    /// Returns whether a fetch was made. A loaded podcast, even one with no
    /// episodes, is never fetched again; a failing one is retried until it
    /// has used up its attempts.
    pub async fn ensure_hydrated(&self, catalog: &SharedCatalog, id: usize) -> Result<bool, CatalogError> {
        let title = {
            let catalog = catalog.read().await;
            let podcast = catalog.get(id).ok_or(CatalogError::UnknownPodcast(id))?;
            if !podcast.needs_hydration(self.options.max_hydration_attempts) {
                return Ok(false);
            }
            podcast.title.clone()
        };

        debug!(podcast = %title, "Hydrating podcast on demand");
        self.reporter.report(LoadEvent::LoadingStarted {
            message: format!("Loading {title}..."),
        });

        let result = self.hydrate(catalog, id).await;
        self.reporter.report(LoadEvent::LoadingFinished);

        result.map(|_| true)
    }

    /// Hydrate every podcast after the first, one at a time
    ///
    /// Failures are logged and reported, never returned: the entry simply
    /// stays retryable on selection.
    pub async fn hydrate_remaining(&self, catalog: &SharedCatalog) -> HydrationSummary {
        let total = catalog.read().await.len();
        let mut summary = HydrationSummary::default();
        let mut requested_any = false;

        for id in 1..total {
            let needs_fetch = catalog
                .read()
                .await
                .get(id)
                .is_some_and(|p| p.needs_hydration(self.options.max_hydration_attempts));

            if !needs_fetch {
                summary.skipped += 1;
                continue;
            }

            if requested_any && !self.options.hydration_pause.is_zero() {
                tokio::time::sleep(self.options.hydration_pause).await;
            }
            requested_any = true;

            match self.hydrate(catalog, id).await {
                Ok(_) => summary.loaded += 1,
                Err(_) => summary.failed += 1,
            }
            debug!(done = id + 1, total, "Background hydration progress");
        }

        let loaded = catalog
            .read()
            .await
            .podcasts()
            .iter()
            .filter(|p| p.is_hydrated())
            .count();
        info!(loaded, total, "Background hydration finished");
        self.reporter
            .report(LoadEvent::BackgroundCompleted { loaded, total });

        summary
    }

    /// Run [`CatalogLoader::hydrate_remaining`] as a background task
    pub fn spawn_background_hydration(&self, catalog: SharedCatalog) -> JoinHandle<HydrationSummary> {
        let loader = self.clone();
        tokio::spawn(async move { loader.hydrate_remaining(&catalog).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::sync::Notify;

    use crate::catalog::Hydration;
    use crate::fetch::Strategy;
    use crate::http::HttpResponse;
    use crate::progress::NoopReporter;
    use crate::progress::recording::RecordingReporter;
    use crate::testing::MockHttpClient;

    const MASTER: &str = r#"<rss><channel>
        <item><title>Alpha</title><link>https://feeds.test/alpha.xml</link></item>
        <item><title>Beta</title><link>https://feeds.test/beta.xml</link></item>
        <item><title>Gamma</title><link>https://feeds.test/gamma.xml</link></item>
    </channel></rss>"#;

    fn feed(episodes: &[&str]) -> String {
        let items: String = episodes
            .iter()
            .map(|t| format!("<item><title>{t}</title><enclosure url=\"https://cdn.test/{t}.mp3\"/></item>"))
            .collect();
        format!("<rss><channel><title>Channel</title><image><url>https://cdn.test/cover.jpg</url></image>{items}</channel></rss>")
    }

    fn loader(client: MockHttpClient) -> CatalogLoader<MockHttpClient> {
        let resolver = FetchResolver::with_strategies(
            client,
            vec![Strategy::passthrough("Direct", "https://proxy.test/?")],
        );
        CatalogLoader::new(
            resolver,
            LoaderOptions {
                hydration_pause: Duration::ZERO,
                max_hydration_attempts: 2,
            },
            NoopReporter::shared(),
        )
    }

    #[tokio::test]
    async fn load_hydrates_only_the_first_podcast() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, &feed(&["a1", "a2"]))
            .route("beta.xml", 200, &feed(&["b1"]));

        let loader = loader(client.clone());
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();
        let catalog = catalog.read().await;

        assert_eq!(catalog.len(), 3);
        let alpha = catalog.get(0).unwrap();
        assert_eq!(alpha.title, "Alpha");
        assert_eq!(alpha.episodes.len(), 2);
        assert_eq!(alpha.image, "https://cdn.test/cover.jpg");
        assert!(catalog.get(1).unwrap().episodes.is_empty());
        assert_eq!(catalog.get(1).unwrap().hydration, Hydration::Unloaded);
        assert_eq!(client.request_count("beta.xml"), 0);
    }

    #[tokio::test]
    async fn empty_master_feed_is_an_error() {
        let client = MockHttpClient::new().route("master.xml", 200, "<rss><channel/></rss>");
        let result = loader(client).load("https://feeds.test/master.xml").await;
        assert!(matches!(result, Err(CatalogError::NoPodcasts)));
    }

    #[tokio::test]
    async fn unreachable_master_feed_is_a_fetch_error() {
        let client = MockHttpClient::new().route("master.xml", 500, "");
        let result = loader(client).load("https://feeds.test/master.xml").await;
        assert!(matches!(result, Err(CatalogError::Fetch(_))));
    }

    #[tokio::test]
    async fn malformed_master_feed_is_a_feed_error() {
        let client = MockHttpClient::new().route("master.xml", 200, "<rss><channel>");
        let result = loader(client).load("https://feeds.test/master.xml").await;
        assert!(matches!(result, Err(CatalogError::Feed(_))));
    }

    #[tokio::test]
    async fn first_podcast_failure_keeps_catalog_usable() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, "<rss><broken>");
        let reporter = RecordingReporter::shared();
        let resolver = FetchResolver::with_strategies(
            client,
            vec![Strategy::passthrough("Direct", "https://proxy.test/?")],
        );
        let loader = CatalogLoader::new(resolver, LoaderOptions::default(), reporter.clone());

        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();
        assert_eq!(
            catalog.read().await.get(0).unwrap().hydration,
            Hydration::Failed { attempts: 1 }
        );
        assert!(reporter.events().iter().any(|e| matches!(
            e,
            LoadEvent::Error { message } if message.contains("Unable to read feed format")
        )));
        assert_eq!(reporter.events().last(), Some(&LoadEvent::LoadingFinished));
    }

    #[tokio::test]
    async fn background_hydration_is_sequential_and_swallows_failures() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, &feed(&["a1"]))
            .route("beta.xml", 500, "")
            .route("gamma.xml", 200, &feed(&["g1", "g2", "g3"]));

        let loader = loader(client.clone());
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();
        let summary = loader
            .spawn_background_hydration(catalog.clone())
            .await
            .unwrap();

        assert_eq!(
            summary,
            HydrationSummary {
                loaded: 1,
                failed: 1,
                skipped: 0
            }
        );

        let feeds: Vec<_> = client
            .requests()
            .into_iter()
            .filter(|u| !u.contains("master"))
            .collect();
        assert_eq!(feeds.len(), 3);
        assert!(feeds[0].contains("alpha.xml"));
        assert!(feeds[1].contains("beta.xml"));
        assert!(feeds[2].contains("gamma.xml"));

        let catalog = catalog.read().await;
        assert_eq!(catalog.get(1).unwrap().hydration, Hydration::Failed { attempts: 1 });
        assert!(catalog.get(1).unwrap().episodes.is_empty());
        assert_eq!(catalog.get(2).unwrap().episodes.len(), 3);
    }

    #[tokio::test]
    async fn background_skips_podcasts_hydrated_on_demand() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, &feed(&["a1"]))
            .route("beta.xml", 200, &feed(&["b1"]))
            .route("gamma.xml", 200, &feed(&["g1"]));

        let loader = loader(client.clone());
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();
        assert!(loader.ensure_hydrated(&catalog, 2).await.unwrap());

        let summary = loader.hydrate_remaining(&catalog).await;
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(client.request_count("gamma.xml"), 1);
    }

    #[tokio::test]
    async fn on_demand_hydration_retries_unloaded_but_not_loaded_empty() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, &feed(&["a1"]))
            .route("beta.xml", 200, &feed(&[]));

        let loader = loader(client.clone());
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();

        assert!(loader.ensure_hydrated(&catalog, 1).await.unwrap());
        assert!(catalog.read().await.get(1).unwrap().episodes.is_empty());
        assert!(!loader.ensure_hydrated(&catalog, 1).await.unwrap());
        assert!(!loader.ensure_hydrated(&catalog, 0).await.unwrap());

        assert_eq!(client.request_count("beta.xml"), 1);
        assert_eq!(client.request_count("alpha.xml"), 1);
    }

    #[tokio::test]
    async fn failing_podcast_stops_after_max_attempts() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, &feed(&["a1"]))
            .route("beta.xml", 503, "");

        let loader = loader(client.clone());
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();

        assert!(loader.ensure_hydrated(&catalog, 1).await.is_err());
        assert!(loader.ensure_hydrated(&catalog, 1).await.is_err());
        assert!(!loader.ensure_hydrated(&catalog, 1).await.unwrap());
        assert_eq!(client.request_count("beta.xml"), 2);
    }

    #[tokio::test]
    async fn unknown_podcast_is_rejected() {
        let client = MockHttpClient::new()
            .route("master.xml", 200, MASTER)
            .route("alpha.xml", 200, &feed(&["a1"]));
        let loader = loader(client);
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();

        assert!(matches!(
            loader.ensure_hydrated(&catalog, 9).await,
            Err(CatalogError::UnknownPodcast(9))
        ));
    }

    /// Holds the first request for `slow` until released, then fails it;
    /// every other request answers from the feed table
    #[derive(Clone)]
    struct GatedClient {
        slow: &'static str,
        release: Arc<Notify>,
        held: Arc<AtomicBool>,
        feeds: Arc<Vec<(&'static str, String)>>,
    }

    #[async_trait]
    impl HttpClient for GatedClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
            if url.contains(self.slow) && !self.held.swap(true, Ordering::SeqCst) {
                self.release.notified().await;
                return Ok(HttpResponse {
                    status: 503,
                    body: Bytes::new(),
                });
            }

            let body = self
                .feeds
                .iter()
                .find(|(fragment, _)| url.contains(fragment))
                .map(|(_, body)| body.clone())
                .unwrap_or_default();
            Ok(HttpResponse {
                status: 200,
                body: Bytes::from(body),
            })
        }
    }

    #[tokio::test]
    async fn late_failure_does_not_undo_an_on_demand_load() {
        let release = Arc::new(Notify::new());
        let client = GatedClient {
            slow: "beta.xml",
            release: release.clone(),
            held: Arc::new(AtomicBool::new(false)),
            feeds: Arc::new(vec![
                ("master.xml", MASTER.to_string()),
                ("alpha.xml", feed(&["a1"])),
                ("beta.xml", feed(&["b1", "b2"])),
            ]),
        };
        let resolver = FetchResolver::with_strategies(
            client,
            vec![Strategy::passthrough("Direct", "https://proxy.test/?")],
        );
        let loader = CatalogLoader::new(
            resolver,
            LoaderOptions {
                hydration_pause: Duration::ZERO,
                max_hydration_attempts: 2,
            },
            NoopReporter::shared(),
        );
        let catalog = loader.load("https://feeds.test/master.xml").await.unwrap();

        let background = loader.hydrate(&catalog, 1);
        let on_demand = async {
            let fetched = loader.ensure_hydrated(&catalog, 1).await;
            release.notify_one();
            fetched
        };
        let (background, on_demand) = tokio::join!(background, on_demand);

        assert!(on_demand.unwrap());
        assert_eq!(background.unwrap(), 2);

        let catalog = catalog.read().await;
        let beta = catalog.get(1).unwrap();
        assert_eq!(beta.hydration, Hydration::Loaded);
        assert_eq!(beta.episodes.len(), 2);
        assert!(!beta.needs_hydration(2));
    }
}
