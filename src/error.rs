// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors raised while retrieving a remote document through a fetch strategy
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{strategy} failed to fetch {url}: {source}")]
    RequestFailed {
        strategy: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{strategy} returned status {status} for {url}")]
    HttpStatus {
        strategy: String,
        url: String,
        status: u16,
    },

    #[error("{strategy} returned an invalid JSON envelope: {source}")]
    InvalidEnvelope {
        strategy: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{strategy} returned an envelope without contents")]
    MissingContents { strategy: String },

    #[error("{strategy} returned an undecodable base64 payload: {source}")]
    InvalidBase64 {
        strategy: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{strategy} returned a body that is not valid UTF-8")]
    InvalidUtf8 { strategy: String },

    #[error("All CORS proxies failed. Last error: {last}")]
    AllStrategiesFailed { last: Box<FetchError> },

    #[error("No fetch strategies configured")]
    NoStrategies,
}

/// Errors that can occur when parsing RSS documents
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Error parsing feed: {reason}")]
    Malformed { reason: String },

    #[error("Error parsing feed: no channel element found")]
    MissingChannel,
}

impl FeedError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the catalog loader
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("No podcasts found in feed")]
    NoPodcasts,

    #[error("Unknown podcast {0}")]
    UnknownPodcast(usize),
}

impl CatalogError {
    /// Human readable text for the error banner
    pub fn user_message(&self) -> String {
        let detail = match self {
            CatalogError::Fetch(_) => {
                "Network access blocked. Make sure the feed relay or a public proxy is reachable"
                    .to_string()
            }
            CatalogError::Feed(_) => "Unable to read feed format".to_string(),
            other => other.to_string(),
        };
        format!("Failed to load podcasts: {detail}")
    }
}

/// Errors raised while building embed code
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Invalid iframe dimension '{0}': expected a positive number with px, %, em, rem, vh or vw")]
    InvalidDimension(String),
}

/// Errors raised by player transitions
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Podcast {podcast} has no episode {episode}")]
    UnknownEpisode { podcast: usize, episode: usize },

    #[error("Media element rejected the command: {0}")]
    MediaRejected(String),

    #[error("No podcast selected")]
    NoPodcastSelected,
}

/// Errors surfaced by the application context
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Player(#[from] PlayerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_error_carries_last_failure() {
        let err = FetchError::AllStrategiesFailed {
            last: Box::new(FetchError::HttpStatus {
                strategy: "CodeTabs".to_string(),
                url: "https://example.com/feed.xml".to_string(),
                status: 502,
            }),
        };

        let text = err.to_string();
        assert!(text.starts_with("All CORS proxies failed"));
        assert!(text.contains("CodeTabs returned status 502"));
    }

    #[test]
    fn user_message_distinguishes_network_and_format() {
        let network = CatalogError::Fetch(FetchError::NoStrategies);
        assert!(network.user_message().contains("Network access blocked"));

        let format = CatalogError::Feed(FeedError::malformed("unexpected end"));
        assert_eq!(
            format.user_message(),
            "Failed to load podcasts: Unable to read feed format"
        );

        let empty = CatalogError::NoPodcasts;
        assert_eq!(
            empty.user_message(),
            "Failed to load podcasts: No podcasts found in feed"
        );
    }
}
