// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application context owning the catalog and the player.

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, CatalogLoader, HydrationSummary, SharedCatalog};
use crate::config::PlayerConfig;
use crate::embed::{DeepLink, EmbedOptions};
use crate::error::{AppError, CatalogError, PlayerError};
use crate::fetch::FetchResolver;
use crate::http::HttpClient;
use crate::player::{DownloadLink, MediaElement, MediaEvent, Player};
use crate::progress::{LoadEvent, SharedLoadReporter};

/// Ties the catalog loader to the player
///
/// Every user action goes through here so the catalog and player state are
/// only changed by their own transition functions.
pub struct App<C, M> {
    catalog: SharedCatalog,
    loader: CatalogLoader<C>,
    player: Player<M>,
    reporter: SharedLoadReporter,
    display: EmbedOptions,
    background: Option<JoinHandle<HydrationSummary>>,
}

impl<C, M> App<C, M>
where
    C: HttpClient + Clone + 'static,
    M: MediaElement,
{
    pub fn new(config: &PlayerConfig, client: C, media: M, reporter: SharedLoadReporter) -> Self {
        let resolver = FetchResolver::new(client, config.local_relay.as_deref());
        let loader = CatalogLoader::new(resolver, config.loader.clone(), reporter.clone());
        let player = Player::new(media, config.embed.clone());
        Self::from_parts(loader, player, reporter)
    }

    pub fn from_parts(loader: CatalogLoader<C>, player: Player<M>, reporter: SharedLoadReporter) -> Self {
        Self {
            catalog: Catalog::default().into_shared(),
            loader,
            player,
            reporter,
            display: EmbedOptions::default(),
            background: None,
        }
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    pub fn player(&self) -> &Player<M> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player<M> {
        &mut self.player
    }

    /// Presentation options from the deep link
    pub fn display_options(&self) -> &EmbedOptions {
        &self.display
    }

    /// Load the catalog, start background hydration and select the first podcast
    pub async fn start(&mut self, master_url: &str) -> Result<(), CatalogError> {
        self.reporter.report(LoadEvent::LoadingStarted {
            message: "Loading podcasts...".to_string(),
        });

        let catalog = match self.loader.load(master_url).await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!(error = %e, "Failed to load podcasts");
                self.reporter.report(LoadEvent::Error {
                    message: e.user_message(),
                });
                self.reporter.report(LoadEvent::LoadingFinished);
                return Err(e);
            }
        };

        self.catalog = catalog;
        self.background = Some(self.loader.spawn_background_hydration(self.catalog.clone()));

        {
            let catalog = self.catalog.read().await;
            if let Some(first) = catalog.get(0) {
                self.player.select_podcast(first);
            }
        }

        self.reporter.report(LoadEvent::LoadingFinished);
        Ok(())
    }

    /// Wait for background hydration started by [`App::start`]
    pub async fn wait_for_background(&mut self) -> Option<HydrationSummary> {
        let handle = self.background.take()?;
        match handle.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Background hydration task failed");
                None
            }
        }
    }

    /// Select a podcast, loading its feed first if needed
    ///
    /// A failed feed is reported but the podcast is still selected, showing
    /// an empty episode list.
    pub async fn select_podcast(&mut self, id: usize) -> Result<(), CatalogError> {
        match self.loader.ensure_hydrated(&self.catalog, id).await {
            Ok(_) => {}
            Err(e @ CatalogError::UnknownPodcast(_)) => return Err(e),
            Err(e) => self.reporter.report(LoadEvent::Error {
                message: e.user_message(),
            }),
        }

        let catalog = self.catalog.read().await;
        let podcast = catalog.get(id).ok_or(CatalogError::UnknownPodcast(id))?;
        self.player.select_podcast(podcast);
        Ok(())
    }

    /// Load an episode of the current podcast
    pub async fn load_episode(&mut self, episode_id: usize) -> Result<(), PlayerError> {
        let podcast_id = self
            .player
            .state()
            .current_podcast
            .ok_or(PlayerError::NoPodcastSelected)?;

        let catalog = self.catalog.read().await;
        let podcast = catalog
            .get(podcast_id)
            .ok_or(PlayerError::NoPodcastSelected)?;
        self.player.load_episode(podcast, episode_id)
    }

    /// Select the linked podcast and load the linked episode
    ///
    /// Indices out of range are ignored, as are links without a podcast.
    pub async fn apply_deep_link(&mut self, link: &DeepLink) -> Result<(), AppError> {
        self.display = link.options.clone();

        let Some(podcast_id) = link.podcast else {
            return Ok(());
        };
        if podcast_id >= self.catalog.read().await.len() {
            warn!(podcast = podcast_id, "Deep link points past the catalog");
            return Ok(());
        }

        self.select_podcast(podcast_id).await?;

        if let Some(episode_id) = link.episode {
            let exists = self
                .catalog
                .read()
                .await
                .get(podcast_id)
                .and_then(|p| p.episode(episode_id))
                .is_some();

            if exists {
                self.load_episode(episode_id).await?;
                info!(podcast = podcast_id, episode = episode_id, "Applied deep link");
            } else {
                warn!(
                    podcast = podcast_id,
                    episode = episode_id,
                    "Deep link episode not found"
                );
            }
        }

        Ok(())
    }

    /// Forward an element event together with the current podcast
    pub async fn handle_media_event(&mut self, event: MediaEvent) -> Result<(), PlayerError> {
        let Some(podcast_id) = self.player.state().current_podcast else {
            return Ok(());
        };

        let catalog = self.catalog.read().await;
        match catalog.get(podcast_id) {
            Some(podcast) => self.player.handle_media_event(event, podcast),
            None => Ok(()),
        }
    }

    /// Embed code for the loaded episode
    pub fn embed_code(&self) -> Option<String> {
        self.player.state().embed_code.clone()
    }

    pub async fn download_link(&self) -> Option<DownloadLink> {
        let podcast_id = self.player.state().current_podcast?;
        let catalog = self.catalog.read().await;
        self.player.download_link(catalog.get(podcast_id)?)
    }
}
