// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::http::{HttpClient, HttpResponse};
use crate::player::MediaElement;

/// HTTP client answering from a route table and recording every request
#[derive(Clone, Default)]
pub struct MockHttpClient {
    routes: Arc<Mutex<Vec<(String, u16, String)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL contains `fragment`
    pub fn route(self, fragment: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((fragment.to_string(), status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        self.requests.lock().unwrap().push(url.to_string());

        let routes = self.routes.lock().unwrap();
        let (status, body) = routes
            .iter()
            .find(|(fragment, _, _)| url.contains(fragment.as_str()))
            .map(|(_, status, body)| (*status, body.clone()))
            .unwrap_or((404, String::new()));

        Ok(HttpResponse {
            status,
            body: Bytes::from(body),
        })
    }
}

/// Commands received by [`FakeMedia`], in order
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    SetSource(String),
    Load,
    Play,
    Pause,
    Seek(f64),
    Rate(f64),
    Volume(f64),
}

/// Media element double that records commands and never fires events itself
#[derive(Debug, Default)]
pub struct FakeMedia {
    pub commands: Vec<MediaCommand>,
    pub time: f64,
    pub duration: Option<f64>,
    pub buffered: Option<f64>,
    pub volume: f64,
    pub reject_play: bool,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::new()
        }
    }

    pub fn count(&self, command: &MediaCommand) -> usize {
        self.commands.iter().filter(|c| *c == command).count()
    }
}

impl MediaElement for FakeMedia {
    fn set_source(&mut self, url: &str) {
        self.commands.push(MediaCommand::SetSource(url.to_string()));
    }

    fn load(&mut self) {
        self.commands.push(MediaCommand::Load);
    }

    fn play(&mut self) -> Result<(), String> {
        self.commands.push(MediaCommand::Play);
        if self.reject_play {
            Err("autoplay blocked".to_string())
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.commands.push(MediaCommand::Pause);
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let upper = self.duration.unwrap_or(f64::MAX);
        self.time = seconds.clamp(0.0, upper);
        self.commands.push(MediaCommand::Seek(self.time));
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn buffered_end(&self) -> Option<f64> {
        self.buffered
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.commands.push(MediaCommand::Rate(rate));
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        self.commands.push(MediaCommand::Volume(volume));
    }
}
