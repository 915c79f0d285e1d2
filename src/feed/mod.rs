mod master;
mod parse;
mod text;
pub mod xml;

pub use master::{PodcastEntry, parse_master_feed};
pub use parse::{Episode, ParsedFeed, parse_podcast_feed};
pub use text::{decode_entities, strip_html};
