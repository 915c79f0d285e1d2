// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::FeedError;

use super::text::{decode_entities, strip_html};
use super::xml::{Element, parse_document};

/// One podcast pointer from the master feed
#[derive(Debug, Clone, PartialEq)]
pub struct PodcastEntry {
    pub feed_url: String,
    pub title: String,
    pub description: String,
    /// Cover art embedded in the master feed, empty if absent
    pub image: String,
    pub episode_count: Option<u32>,
    pub latest_episode_date: Option<String>,
}

/// Parse the master feed into podcast pointers, in document order
///
/// Items without a feed link are skipped.
pub fn parse_master_feed(xml: &str) -> Result<Vec<PodcastEntry>, FeedError> {
    let root = parse_document(xml)?;

    let entries = root
        .find_all("item")
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| parse_entry(position, item))
        .collect();

    Ok(entries)
}

fn parse_entry(position: usize, item: &Element) -> Option<PodcastEntry> {
    let feed_url = item.child_text("link")?;

    let title = item
        .child_text("title")
        .map(|t| strip_html(&decode_entities(&t)))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Podcast {}", position + 1));

    let image = item
        .children_named("enclosure")
        .find(|e| e.attr("type").is_some_and(|t| t.trim().starts_with("image/")))
        .and_then(|e| e.attr("url"))
        .map(|url| url.trim().to_string())
        .unwrap_or_default();

    Some(PodcastEntry {
        feed_url,
        title,
        description: item
            .child_text("description")
            .map(|d| strip_html(&d))
            .unwrap_or_default(),
        image,
        episode_count: item
            .child_text_local("episodeCount")
            .and_then(|count| count.parse().ok()),
        latest_episode_date: item.child_text_local("latestEpisodeDate"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>All Shows</title>
    <item>
      <title>Morning &amp; Evening</title>
      <link> https://feeds.example.com/morning.xml </link>
      <description>Daily news</description>
      <enclosure url="https://example.com/morning.jpg" type="image/jpeg"/>
      <episodeCount>42</episodeCount>
      <latestEpisodeDate>2024-03-01</latestEpisodeDate>
    </item>
    <item>
      <title>No Link</title>
    </item>
    <item>
      <link>https://feeds.example.com/third.xml</link>
      <enclosure url="https://example.com/audio.mp3" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_entries_and_skips_items_without_link() {
        let entries = parse_master_feed(MASTER_FEED).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.feed_url, "https://feeds.example.com/morning.xml");
        assert_eq!(first.title, "Morning & Evening");
        assert_eq!(first.description, "Daily news");
        assert_eq!(first.image, "https://example.com/morning.jpg");
        assert_eq!(first.episode_count, Some(42));
        assert_eq!(first.latest_episode_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn untitled_entry_is_named_by_item_position() {
        let entries = parse_master_feed(MASTER_FEED).unwrap();
        let third = &entries[1];
        assert_eq!(third.title, "Podcast 3");
        assert!(third.image.is_empty(), "audio enclosures are not cover art");
        assert_eq!(third.episode_count, None);
    }

    #[test]
    fn empty_master_feed_is_not_an_error() {
        let entries = parse_master_feed("<rss><channel></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn malformed_master_feed_fails() {
        assert!(parse_master_feed("<rss><channel><item></channel>").is_err());
    }
}
