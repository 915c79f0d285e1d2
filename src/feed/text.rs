// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use scraper::Html;

/// Decode HTML entities left in a string (`&amp;` → `&`)
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).trim().to_string()
}

/// Render an HTML fragment as plain text, discarding all markup
pub fn strip_html(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return html.trim().to_string();
    }

    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_decodes() {
        assert_eq!(
            strip_html("<p>Hello <b>world</b> &amp; friends</p>"),
            "Hello world & friends"
        );
    }

    #[test]
    fn plain_text_is_trimmed() {
        assert_eq!(strip_html("  plain  "), "plain");
    }

    #[test]
    fn decode_entities_handles_named_and_numeric() {
        assert_eq!(decode_entities("Q&amp;A &#8211; part&nbsp;2"), "Q&A \u{2013} part\u{a0}2");
    }
}
