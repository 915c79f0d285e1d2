// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deep links (`?podcast=1&episode=2`) and iframe embed code.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::catalog::Podcast;
use crate::error::EmbedError;
use crate::feed::Episode;
use crate::format::parse_feed_date;

/// CSS unit accepted for iframe dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Px,
    Percent,
    Em,
    Rem,
    Vh,
    Vw,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Vh => "vh",
            Unit::Vw => "vw",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "" | "px" => Some(Unit::Px),
            "%" => Some(Unit::Percent),
            "em" => Some(Unit::Em),
            "rem" => Some(Unit::Rem),
            "vh" => Some(Unit::Vh),
            "vw" => Some(Unit::Vw),
            _ => None,
        }
    }
}

/// A width or height such as `600px` or `100%`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: Unit,
}

impl Dimension {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Dimension {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);

        let value: f64 = number
            .parse()
            .map_err(|_| EmbedError::InvalidDimension(s.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(EmbedError::InvalidDimension(s.to_string()));
        }
        let unit = Unit::from_suffix(suffix.trim())
            .ok_or_else(|| EmbedError::InvalidDimension(s.to_string()))?;

        Ok(Self { value, unit })
    }
}

/// Episode ordering in the embedded list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeOrder {
    #[default]
    Newest,
    Oldest,
}

/// Podcast ordering in the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PodcastOrder {
    #[default]
    Feed,
    Alphabetical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Presentation options carried by embed URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    pub sort: EpisodeOrder,
    pub limit: Option<usize>,
    pub podcast_order: PodcastOrder,
    pub theme: Theme,
    pub show_theme_toggle: bool,
    pub show_header: bool,
    pub show_selector: bool,
    pub show_cover: bool,
    pub show_downloads: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            sort: EpisodeOrder::Newest,
            limit: None,
            podcast_order: PodcastOrder::Feed,
            theme: Theme::Dark,
            show_theme_toggle: true,
            show_header: true,
            show_selector: true,
            show_cover: true,
            show_downloads: true,
        }
    }
}

impl EmbedOptions {
    /// Query parameters for every non-default option
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if self.sort == EpisodeOrder::Oldest {
            params.push(("sort", "oldest".to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if self.podcast_order == PodcastOrder::Alphabetical {
            params.push(("podcast_order", "alphabetical".to_string()));
        }
        if self.theme == Theme::Light {
            params.push(("theme", "light".to_string()));
        }

        let toggles = [
            ("theme_toggle", self.show_theme_toggle),
            ("header", self.show_header),
            ("selector", self.show_selector),
            ("cover", self.show_cover),
            ("download", self.show_downloads),
        ];
        for (key, shown) in toggles {
            if !shown {
                params.push((key, "false".to_string()));
            }
        }

        params
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "sort" => {
                self.sort = if value == "oldest" {
                    EpisodeOrder::Oldest
                } else {
                    EpisodeOrder::Newest
                }
            }
            "limit" => self.limit = leading_integer(value).filter(|n| *n > 0),
            "podcast_order" => {
                self.podcast_order = if value == "alphabetical" {
                    PodcastOrder::Alphabetical
                } else {
                    PodcastOrder::Feed
                }
            }
            "theme" => {
                self.theme = if value == "light" { Theme::Light } else { Theme::Dark }
            }
            "theme_toggle" => self.show_theme_toggle = value != "false",
            "header" => self.show_header = value != "false",
            "selector" => self.show_selector = value != "false",
            "cover" => self.show_cover = value != "false",
            "download" => self.show_downloads = value != "false",
            _ => {}
        }
    }

    /// Episodes in display order, truncated to the limit
    pub fn visible_episodes<'a>(&self, episodes: &'a [Episode]) -> Vec<&'a Episode> {
        let mut keyed: Vec<_> = episodes
            .iter()
            .map(|e| (parse_feed_date(&e.pub_date), e))
            .collect();

        // Undated episodes keep feed order after the dated ones
        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => match self.sort {
                EpisodeOrder::Newest => b.cmp(a),
                EpisodeOrder::Oldest => a.cmp(b),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        let limit = self.limit.unwrap_or(usize::MAX);
        keyed.into_iter().map(|(_, e)| e).take(limit).collect()
    }

    /// Podcasts in selector order
    pub fn ordered_podcasts<'a>(&self, podcasts: &'a [Podcast]) -> Vec<&'a Podcast> {
        let mut ordered: Vec<_> = podcasts.iter().collect();
        if self.podcast_order == PodcastOrder::Alphabetical {
            ordered.sort_by_key(|p| p.title.to_lowercase());
        }
        ordered
    }
}

/// Parsed `?podcast=<i>&episode=<j>` query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub podcast: Option<usize>,
    pub episode: Option<usize>,
    pub options: EmbedOptions,
}

impl DeepLink {
    /// Parse a query string, with or without its leading `?`
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut link = DeepLink::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "podcast" => link.podcast = leading_integer(&value),
                "episode" => link.episode = leading_integer(&value),
                other => link.options.apply(other, &value),
            }
        }

        link
    }

    /// Parse the query part of a full page URL
    pub fn from_url(page_url: &str) -> Self {
        match page_url.split_once('?') {
            Some((_, rest)) => {
                let query = rest.split('#').next().unwrap_or_default();
                Self::from_query(query)
            }
            None => Self::default(),
        }
    }
}

fn leading_integer(value: &str) -> Option<usize> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Page location and iframe size used when generating embed code
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedSettings {
    pub page_url: String,
    pub width: Dimension,
    pub height: Dimension,
    pub options: EmbedOptions,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            page_url: "index.html".to_string(),
            width: Dimension::new(100.0, Unit::Percent),
            height: Dimension::new(600.0, Unit::Px),
            options: EmbedOptions::default(),
        }
    }
}

impl EmbedSettings {
    pub fn code(&self, podcast: usize, episode: usize) -> EmbedCode {
        EmbedCode {
            page_url: self.page_url.clone(),
            podcast,
            episode,
            width: self.width,
            height: self.height,
            options: self.options.clone(),
        }
    }
}

/// An `<iframe>` snippet pointing at one podcast episode
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedCode {
    pub page_url: String,
    pub podcast: usize,
    pub episode: usize,
    pub width: Dimension,
    pub height: Dimension,
    pub options: EmbedOptions,
}

impl EmbedCode {
    /// The iframe `src`: the page URL without its own query, plus the deep link
    pub fn src(&self) -> String {
        let base = self
            .page_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("podcast", &self.podcast.to_string())
            .append_pair("episode", &self.episode.to_string());
        for (key, value) in self.options.params() {
            query.append_pair(key, &value);
        }

        format!("{base}?{}", query.finish())
    }
}

impl fmt::Display for EmbedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<iframe src="{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
            self.src(),
            self.width,
            self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: usize, pub_date: &str) -> Episode {
        Episode {
            id,
            title: format!("Episode {id}"),
            description: String::new(),
            pub_date: pub_date.to_string(),
            audio_url: format!("https://cdn.test/{id}.mp3"),
            duration: String::new(),
            mime_type: "audio/mpeg".to_string(),
            image: String::new(),
        }
    }

    #[test]
    fn dimension_parsing() {
        assert_eq!("600px".parse::<Dimension>().unwrap(), Dimension::new(600.0, Unit::Px));
        assert_eq!("100%".parse::<Dimension>().unwrap(), Dimension::new(100.0, Unit::Percent));
        assert_eq!("450".parse::<Dimension>().unwrap(), Dimension::new(450.0, Unit::Px));
        assert_eq!("2.5rem".parse::<Dimension>().unwrap(), Dimension::new(2.5, Unit::Rem));
        assert!("wide".parse::<Dimension>().is_err());
        assert!("10pt".parse::<Dimension>().is_err());
        assert!("0px".parse::<Dimension>().is_err());
    }

    #[test]
    fn dimension_display() {
        assert_eq!(Dimension::new(100.0, Unit::Percent).to_string(), "100%");
        assert_eq!(Dimension::new(80.5, Unit::Vh).to_string(), "80.5vh");
    }

    #[test]
    fn deep_link_reads_podcast_and_episode() {
        let link = DeepLink::from_query("?podcast=1&episode=2");
        assert_eq!(link.podcast, Some(1));
        assert_eq!(link.episode, Some(2));
        assert_eq!(link.options, EmbedOptions::default());
    }

    #[test]
    fn deep_link_tolerates_junk() {
        let link = DeepLink::from_query("podcast=3abc&episode=x&unknown=1");
        assert_eq!(link.podcast, Some(3));
        assert_eq!(link.episode, None);

        assert_eq!(DeepLink::from_url("https://player.test/index.html"), DeepLink::default());
    }

    #[test]
    fn deep_link_reads_embed_options() {
        let link = DeepLink::from_url(
            "https://player.test/index.html?podcast=0&sort=oldest&limit=5&theme=light&header=false#top",
        );
        assert_eq!(link.podcast, Some(0));
        assert_eq!(link.options.sort, EpisodeOrder::Oldest);
        assert_eq!(link.options.limit, Some(5));
        assert_eq!(link.options.theme, Theme::Light);
        assert!(!link.options.show_header);
        assert!(link.options.show_cover);
    }

    #[test]
    fn embed_code_matches_iframe_contract() {
        let code = EmbedSettings {
            page_url: "https://player.test/index.html?podcast=9&episode=9".to_string(),
            width: Dimension::new(100.0, Unit::Percent),
            height: Dimension::new(600.0, Unit::Px),
            options: EmbedOptions::default(),
        }
        .code(1, 2);

        assert_eq!(code.src(), "https://player.test/index.html?podcast=1&episode=2");
        assert_eq!(
            code.to_string(),
            r#"<iframe src="https://player.test/index.html?podcast=1&episode=2" width="100%" height="600px" frameborder="0" allowfullscreen></iframe>"#
        );
    }

    #[test]
    fn embed_code_carries_non_default_options_only() {
        let options = EmbedOptions {
            theme: Theme::Light,
            show_downloads: false,
            ..EmbedOptions::default()
        };
        let code = EmbedSettings {
            page_url: "https://player.test/".to_string(),
            options,
            ..EmbedSettings::default()
        }
        .code(0, 0);

        assert_eq!(
            code.src(),
            "https://player.test/?podcast=0&episode=0&theme=light&download=false"
        );
    }

    #[test]
    fn embed_options_round_trip_through_query() {
        let options = EmbedOptions {
            sort: EpisodeOrder::Oldest,
            limit: Some(3),
            podcast_order: PodcastOrder::Alphabetical,
            show_selector: false,
            ..EmbedOptions::default()
        };
        let src = EmbedSettings {
            options: options.clone(),
            ..EmbedSettings::default()
        }
        .code(2, 4)
        .src();

        let link = DeepLink::from_url(&src);
        assert_eq!(link.podcast, Some(2));
        assert_eq!(link.episode, Some(4));
        assert_eq!(link.options, options);
    }

    #[test]
    fn visible_episodes_sorts_and_limits() {
        let episodes = vec![
            episode(0, "Mon, 01 Jan 2024 12:00:00 +0000"),
            episode(1, ""),
            episode(2, "Fri, 01 Mar 2024 12:00:00 +0000"),
        ];

        let newest = EmbedOptions::default().visible_episodes(&episodes);
        let ids: Vec<_> = newest.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 0, 1]);

        let oldest = EmbedOptions {
            sort: EpisodeOrder::Oldest,
            limit: Some(2),
            ..EmbedOptions::default()
        }
        .visible_episodes(&episodes);
        let ids: Vec<_> = oldest.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
