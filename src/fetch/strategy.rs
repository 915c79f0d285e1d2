// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::FetchError;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = "base64,";

/// One way of reaching a remote document from the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Same-origin relay endpoint taking the target in a `url` query parameter
    LocalRelay { endpoint: String },
    /// Public proxy returning the upstream body verbatim
    Passthrough { name: String, prefix: String },
    /// Public proxy wrapping the upstream body in a JSON envelope
    WrapperJson { name: String, prefix: String },
}

/// JSON envelope returned by wrapper proxies
#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
}

impl Strategy {
    pub fn passthrough(name: &str, prefix: &str) -> Self {
        Self::Passthrough {
            name: name.to_string(),
            prefix: prefix.to_string(),
        }
    }

    pub fn wrapper_json(name: &str, prefix: &str) -> Self {
        Self::WrapperJson {
            name: name.to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Display name used in logs and errors
    pub fn name(&self) -> &str {
        match self {
            Strategy::LocalRelay { .. } => "Local Proxy",
            Strategy::Passthrough { name, .. } | Strategy::WrapperJson { name, .. } => name,
        }
    }

    /// Build the URL to request for `target`
    pub fn request_url(&self, target: &str) -> String {
        let encoded = urlencoding::encode(target);
        match self {
            Strategy::LocalRelay { endpoint } => {
                let separator = if endpoint.contains('?') { '&' } else { '?' };
                format!("{endpoint}{separator}url={encoded}")
            }
            Strategy::Passthrough { prefix, .. } | Strategy::WrapperJson { prefix, .. } => {
                format!("{prefix}{encoded}")
            }
        }
    }

    /// Turn a successful response body into the document text
    pub fn extract_document(&self, body: &[u8]) -> Result<String, FetchError> {
        match self {
            Strategy::LocalRelay { .. } | Strategy::Passthrough { .. } => {
                Ok(String::from_utf8_lossy(body).into_owned())
            }
            Strategy::WrapperJson { name, .. } => unwrap_envelope(name, body),
        }
    }
}

fn unwrap_envelope(strategy: &str, body: &[u8]) -> Result<String, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidEnvelope {
            strategy: strategy.to_string(),
            source: e,
        })?;

    let contents = envelope.contents.ok_or_else(|| FetchError::MissingContents {
        strategy: strategy.to_string(),
    })?;

    if !contents.starts_with(DATA_URI_PREFIX) {
        return Ok(contents);
    }

    let Some(marker) = contents.find(BASE64_MARKER) else {
        return Ok(contents);
    };

    let payload = contents[marker + BASE64_MARKER.len()..].trim();
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| FetchError::InvalidBase64 {
            strategy: strategy.to_string(),
            source: e,
        })?;

    String::from_utf8(bytes).map_err(|_| FetchError::InvalidUtf8 {
        strategy: strategy.to_string(),
    })
}

/// The fallback chain used by the player, in the order it is tried
pub fn default_strategies(local_relay: Option<&str>) -> Vec<Strategy> {
    let mut strategies = Vec::with_capacity(4);

    if let Some(endpoint) = local_relay {
        strategies.push(Strategy::LocalRelay {
            endpoint: endpoint.to_string(),
        });
    }

    strategies.push(Strategy::passthrough("CorsProxy.io", "https://corsproxy.io/?"));
    strategies.push(Strategy::wrapper_json(
        "AllOrigins",
        "https://api.allorigins.win/get?url=",
    ));
    strategies.push(Strategy::passthrough(
        "CodeTabs",
        "https://api.codetabs.com/v1/proxy?quest=",
    ));

    strategies
}
