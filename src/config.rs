// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::catalog::LoaderOptions;
use crate::embed::EmbedSettings;

/// Master feed used when none is given
pub const DEFAULT_MASTER_FEED: &str = "https://podcast.supersoul.top/feed.php";

/// Everything needed to build an [`App`](crate::app::App)
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub master_feed_url: String,
    /// Full endpoint of a self-hosted relay (e.g. `https://host/proxy.php`),
    /// tried before the public proxies with the target in its `url` parameter
    pub local_relay: Option<String>,
    pub loader: LoaderOptions,
    pub embed: EmbedSettings,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            master_feed_url: DEFAULT_MASTER_FEED.to_string(),
            local_relay: None,
            loader: LoaderOptions::default(),
            embed: EmbedSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.master_feed_url, DEFAULT_MASTER_FEED);
        assert!(config.local_relay.is_none());
        assert_eq!(config.loader.hydration_pause, Duration::from_millis(500));
        assert_eq!(config.loader.max_hydration_attempts, 2);
        assert_eq!(config.embed.page_url, "index.html");
    }
}
