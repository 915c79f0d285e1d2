// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::FeedError;

use super::text::{decode_entities, strip_html};
use super::xml::{Element, parse_document};

const UNTITLED_EPISODE: &str = "Untitled Episode";
const UNTITLED_PODCAST: &str = "Untitled Podcast";
const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

/// Channel-level data of a podcast feed together with its episodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub title: String,
    pub description: String,
    pub link: String,
    pub image: String,
    pub episodes: Vec<Episode>,
}

/// Represents a single podcast episode
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Position within the podcast's episode list
    pub id: usize,
    pub title: String,
    pub description: String,
    /// Publication date exactly as found in the feed
    pub pub_date: String,
    /// Never empty: items without audio are dropped while parsing
    pub audio_url: String,
    /// Either plain seconds or an `HH:MM:SS` style string
    pub duration: String,
    pub mime_type: String,
    /// Episode artwork; empty when the feed has none
    pub image: String,
}

/// Parse a podcast's own RSS feed
///
/// A document that is not well-formed XML is an error. A well-formed feed
/// with no playable items is not: it yields an empty episode list.
pub fn parse_podcast_feed(xml: &str) -> Result<ParsedFeed, FeedError> {
    let root = parse_document(xml)?;
    let channel = if root.name() == "channel" {
        &root
    } else {
        root.find("channel").ok_or(FeedError::MissingChannel)?
    };

    let episodes = channel
        .children_named("item")
        .filter_map(parse_item)
        .enumerate()
        .map(|(id, mut episode)| {
            episode.id = id;
            episode
        })
        .collect();

    Ok(ParsedFeed {
        title: channel
            .child_text("title")
            .map(|t| decode_entities(&t))
            .unwrap_or_else(|| UNTITLED_PODCAST.to_string()),
        description: channel
            .child_text("description")
            .map(|d| strip_html(&d))
            .unwrap_or_default(),
        link: channel.child_text("link").unwrap_or_default(),
        image: channel_image(channel),
        episodes,
    })
}

/// Cover art: `<image><url>` first, then an iTunes style `href` image
fn channel_image(channel: &Element) -> String {
    if let Some(url) = channel
        .child("image")
        .and_then(|image| image.child_text("url"))
    {
        return url;
    }

    channel
        .elements()
        .find(|e| e.name() == "itunes:image" || (e.local_name() == "image" && e.attr("href").is_some()))
        .and_then(|image| {
            image
                .attr("href")
                .map(|href| href.trim().to_string())
                .filter(|href| !href.is_empty())
                .or_else(|| Some(image.text_content().trim().to_string()))
        })
        .unwrap_or_default()
}

fn parse_item(item: &Element) -> Option<Episode> {
    let enclosure = item.child("enclosure");

    let audio_url = enclosure
        .and_then(|e| e.attr("url"))
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .or_else(|| item.child_text("link"))?;

    let title = item
        .child_text("title")
        .map(|t| decode_entities(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED_EPISODE.to_string());

    let description = item
        .child_text("description")
        .or_else(|| item.child_text("content:encoded"))
        .or_else(|| item.child_text_local("summary"))
        .map(|d| strip_html(&d))
        .unwrap_or_default();

    let duration = item
        .child_text("itunes:duration")
        .or_else(|| item.child_text_local("duration"))
        .unwrap_or_default();

    let image = item
        .child("itunes:image")
        .and_then(|e| e.attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default();

    let mime_type = enclosure
        .and_then(|e| e.attr("type"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();

    Some(Episode {
        id: 0,
        title,
        description,
        pub_date: item.child_text("pubDate").unwrap_or_default(),
        audio_url,
        duration,
        mime_type,
        image,
    })
}
