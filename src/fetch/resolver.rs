// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::http::HttpClient;

use super::strategy::{Strategy, default_strategies};

/// Retrieves remote documents through an ordered chain of strategies
///
/// Strategies are tried one after the other, never concurrently, and the
/// first success wins. A failing strategy never aborts the chain; only when
/// every strategy has failed is a single aggregated error returned.
#[derive(Clone)]
pub struct FetchResolver<C> {
    client: C,
    strategies: Vec<Strategy>,
}

impl<C: HttpClient> FetchResolver<C> {
    /// Resolver using the default proxy chain, optionally led by a local relay
    pub fn new(client: C, local_relay: Option<&str>) -> Self {
        Self::with_strategies(client, default_strategies(local_relay))
    }

    /// Resolver using a custom strategy chain
    pub fn with_strategies(client: C, strategies: Vec<Strategy>) -> Self {
        Self { client, strategies }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch the raw text of `url`
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = None;

        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), url, "Attempting fetch");

            match self.attempt(strategy, url).await {
                Ok(text) => {
                    info!(strategy = strategy.name(), url, "Fetched document");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), url, error = %e, "Fetch strategy failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(FetchError::AllStrategiesFailed {
                last: Box::new(last),
            }),
            None => Err(FetchError::NoStrategies),
        }
    }

    async fn attempt(&self, strategy: &Strategy, url: &str) -> Result<String, FetchError> {
        let request_url = strategy.request_url(url);

        let response =
            self.client
                .get(&request_url)
                .await
                .map_err(|e| FetchError::RequestFailed {
                    strategy: strategy.name().to_string(),
                    url: url.to_string(),
                    source: e,
                })?;

        if !response.is_success() {
            return Err(FetchError::HttpStatus {
                strategy: strategy.name().to_string(),
                url: url.to_string(),
                status: response.status,
            });
        }

        strategy.extract_document(&response.body)
    }
}
