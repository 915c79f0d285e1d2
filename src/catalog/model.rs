// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::feed::{Episode, ParsedFeed, PodcastEntry};

/// Whether a podcast's own feed has been loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hydration {
    /// Not attempted yet; `episodes` is empty because nothing was fetched
    #[default]
    Unloaded,
    /// Feed loaded; `episodes` is authoritative even when empty
    Loaded,
    /// Every attempt so far failed
    Failed { attempts: u32 },
}

/// A podcast in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Podcast {
    /// Position in the catalog, used by deep links and embed code
    pub id: usize,
    pub title: String,
    pub description: String,
    pub link: String,
    pub image: String,
    pub feed_url: String,
    /// Advisory values from the master feed, shown before hydration
    pub episode_count_hint: Option<u32>,
    pub latest_episode_date: Option<String>,
    pub episodes: Vec<Episode>,
    pub hydration: Hydration,
}

impl Podcast {
    /// Index-only podcast built from a master feed entry
    pub fn from_entry(id: usize, entry: PodcastEntry) -> Self {
        Self {
            id,
            title: entry.title,
            description: entry.description,
            link: String::new(),
            image: entry.image,
            feed_url: entry.feed_url,
            episode_count_hint: entry.episode_count,
            latest_episode_date: entry.latest_episode_date,
            episodes: Vec::new(),
            hydration: Hydration::Unloaded,
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydration == Hydration::Loaded
    }

    /// Whether selecting this podcast should trigger a fetch
    pub fn needs_hydration(&self, max_attempts: u32) -> bool {
        match self.hydration {
            Hydration::Unloaded => true,
            Hydration::Loaded => false,
            Hydration::Failed { attempts } => attempts < max_attempts,
        }
    }

    /// Merge a freshly parsed feed into this entry
    ///
    /// The master feed's title is kept. Channel image replaces the index
    /// image only when present; description and link only fill gaps.
    pub(crate) fn apply_feed(&mut self, feed: ParsedFeed) {
        if !feed.image.is_empty() {
            self.image = feed.image;
        }
        if self.description.is_empty() {
            self.description = feed.description;
        }
        if self.link.is_empty() {
            self.link = feed.link;
        }
        self.episodes = feed.episodes;
        self.hydration = Hydration::Loaded;
    }

    /// Count a failed fetch; a loaded podcast stays loaded
    pub(crate) fn record_failure(&mut self) {
        self.hydration = match self.hydration {
            Hydration::Loaded => Hydration::Loaded,
            Hydration::Failed { attempts } => Hydration::Failed {
                attempts: attempts + 1,
            },
            Hydration::Unloaded => Hydration::Failed { attempts: 1 },
        };
    }

    pub fn episode(&self, id: usize) -> Option<&Episode> {
        self.episodes.get(id)
    }

    /// Position of an episode in the list, matched by id
    pub fn position_of(&self, episode_id: usize) -> Option<usize> {
        self.episodes.iter().position(|e| e.id == episode_id)
    }

    /// Episode count for display: the real count once hydrated, else the hint
    pub fn display_episode_count(&self) -> Option<usize> {
        if self.is_hydrated() {
            Some(self.episodes.len())
        } else {
            self.episode_count_hint.map(|n| n as usize)
        }
    }
}

impl Episode {
    /// Artwork to show: the episode's own, else the podcast cover
    pub fn display_image<'a>(&'a self, podcast: &'a Podcast) -> &'a str {
        if self.image.is_empty() {
            &podcast.image
        } else {
            &self.image
        }
    }
}

/// Index-addressed list of podcasts; ids equal positions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    podcasts: Vec<Podcast>,
}

/// The catalog as shared between the loader, background task and player
pub type SharedCatalog = Arc<RwLock<Catalog>>;

impl Catalog {
    pub fn from_entries(entries: Vec<PodcastEntry>) -> Self {
        let podcasts = entries
            .into_iter()
            .enumerate()
            .map(|(id, entry)| Podcast::from_entry(id, entry))
            .collect();
        Self { podcasts }
    }

    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.podcasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.podcasts.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Podcast> {
        self.podcasts.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Podcast> {
        self.podcasts.get_mut(id)
    }

    pub fn podcasts(&self) -> &[Podcast] {
        &self.podcasts
    }
}
