// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, info, warn};

use crate::catalog::Podcast;
use crate::embed::EmbedSettings;
use crate::error::PlayerError;

use super::media::{MediaElement, MediaEvent};
use super::state::{Change, Phase, PlayRequest, PlayerState, SharedStateListener};

pub const SKIP_BACKWARD_SECONDS: f64 = 15.0;
pub const SKIP_FORWARD_SECONDS: f64 = 30.0;

/// Where to fetch an episode's audio and what to call the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    pub filename: String,
}

/// Drives a [`MediaElement`] and keeps every subscribed surface in sync
///
/// Transitions mutate one [`PlayerState`] and then notify all listeners
/// with that same state. Play and pause are only ever requested here; the
/// confirmed `is_playing` flag follows the element's own events.
pub struct Player<M> {
    media: M,
    state: PlayerState,
    listeners: Vec<SharedStateListener>,
    embed: EmbedSettings,
}

impl<M: MediaElement> Player<M> {
    pub fn new(mut media: M, embed: EmbedSettings) -> Self {
        let state = PlayerState::default();
        media.set_volume(state.volume);
        media.set_playback_rate(state.speed);

        Self {
            media,
            state,
            listeners: Vec::new(),
            embed,
        }
    }

    pub fn subscribe(&mut self, listener: SharedStateListener) {
        self.listeners.push(listener);
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.clone()
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn embed_settings(&self) -> &EmbedSettings {
        &self.embed
    }

    fn notify(&self, change: Change) {
        for listener in &self.listeners {
            listener.state_changed(change, &self.state);
        }
    }

    /// Stop whatever is running and forget the pending request
    fn halt(&mut self) {
        if self.state.is_playing || self.state.requested == Some(PlayRequest::Play) {
            self.media.pause();
        }
        self.state.is_playing = false;
        self.state.requested = None;
    }

    /// Make `podcast` current and clear the episode
    ///
    /// No episode is loaded; playback needs an explicit load.
    pub fn select_podcast(&mut self, podcast: &Podcast) {
        self.halt();
        self.state.current_podcast = Some(podcast.id);
        self.state.current_episode = None;
        self.state.phase = Phase::Idle;
        self.state.embed_code = None;
        self.state.reset_progress();

        debug!(podcast = podcast.id, title = %podcast.title, "Podcast selected");
        self.notify(Change::PodcastSelected);
    }

    /// Load an episode paused at position zero
    pub fn load_episode(&mut self, podcast: &Podcast, episode_id: usize) -> Result<(), PlayerError> {
        let episode = podcast
            .episode(episode_id)
            .ok_or(PlayerError::UnknownEpisode {
                podcast: podcast.id,
                episode: episode_id,
            })?;

        self.halt();
        self.media.set_current_time(0.0);
        self.media.set_source(&episode.audio_url);
        self.media.load();

        self.state.reset_progress();
        self.state.phase = Phase::Loaded;
        self.state.current_podcast = Some(podcast.id);
        self.state.current_episode = Some(episode.id);
        self.state.embed_code = Some(self.embed.code(podcast.id, episode.id).to_string());

        info!(
            podcast = podcast.id,
            episode = episode.id,
            title = %episode.title,
            "Episode loaded"
        );
        self.notify(Change::EpisodeLoaded);
        Ok(())
    }

    fn request_play(&mut self) -> Result<(), PlayerError> {
        self.state.requested = Some(PlayRequest::Play);
        if let Err(reason) = self.media.play() {
            warn!(%reason, "Playback request rejected");
            self.state.requested = None;
            self.notify(Change::PlayRequested);
            return Err(PlayerError::MediaRejected(reason));
        }
        self.notify(Change::PlayRequested);
        Ok(())
    }

    /// Ask the element to play or pause; a no-op without an episode
    pub fn toggle_play_pause(&mut self) -> Result<(), PlayerError> {
        if !self.state.has_episode() {
            return Ok(());
        }

        if self.state.is_playing {
            self.state.requested = Some(PlayRequest::Pause);
            self.media.pause();
            self.notify(Change::PlayRequested);
            Ok(())
        } else {
            self.request_play()
        }
    }

    /// Jump to `percent` of the duration
    pub fn seek(&mut self, percent: f64) {
        if !self.state.has_episode() {
            return;
        }
        let Some(duration) = self.media.duration() else {
            return;
        };

        let percent = percent.clamp(0.0, 100.0);
        self.media.set_current_time(percent / 100.0 * duration);
        self.sync_position();
    }

    pub fn skip_backward(&mut self) {
        if !self.state.has_episode() {
            return;
        }
        let target = (self.media.current_time() - SKIP_BACKWARD_SECONDS).max(0.0);
        self.media.set_current_time(target);
        self.sync_position();
    }

    /// Skip ahead, stopping at the end; nothing happens while the duration is unknown
    pub fn skip_forward(&mut self) {
        if !self.state.has_episode() {
            return;
        }
        let Some(duration) = self.media.duration() else {
            return;
        };
        let target = (self.media.current_time() + SKIP_FORWARD_SECONDS).min(duration);
        self.media.set_current_time(target);
        self.sync_position();
    }

    pub fn set_speed(&mut self, speed: f64) {
        if !speed.is_finite() || speed <= 0.0 {
            return;
        }
        self.media.set_playback_rate(speed);
        self.state.speed = speed;
        self.notify(Change::Speed);
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.media.set_volume(volume);
        self.state.volume = volume;
        if volume > 0.0 {
            self.state.volume_before_mute = None;
        }
        self.notify(Change::Volume);
    }

    /// Mute, remembering the level; unmute back to it (or full volume)
    pub fn toggle_mute(&mut self) {
        let volume = if self.state.volume > 0.0 {
            self.state.volume_before_mute = Some(self.state.volume);
            0.0
        } else {
            self.state.volume_before_mute.take().unwrap_or(1.0)
        };
        self.media.set_volume(volume);
        self.state.volume = volume;
        self.notify(Change::Volume);
    }

    pub fn open_modal(&mut self) {
        if self.state.modal_open {
            return;
        }
        self.state.modal_open = true;
        self.notify(Change::Modal);
    }

    pub fn close_modal(&mut self) {
        if !self.state.modal_open {
            return;
        }
        self.state.modal_open = false;
        self.notify(Change::Modal);
    }

    /// Apply an event raised by the element
    ///
    /// `podcast` is the current podcast as found in the catalog; it is only
    /// consulted to pick the next episode when playback ends.
    pub fn handle_media_event(
        &mut self,
        event: MediaEvent,
        podcast: &Podcast,
    ) -> Result<(), PlayerError> {
        match event {
            MediaEvent::Play => {
                self.state.is_playing = true;
                self.state.requested = None;
                if self.state.has_episode() {
                    self.state.phase = Phase::Playing;
                }
                self.notify(Change::PlaybackChanged);
            }
            MediaEvent::Pause => {
                self.state.is_playing = false;
                self.state.requested = None;
                // Paused at the very start is indistinguishable from freshly loaded
                if self.state.has_episode() && self.state.phase == Phase::Playing {
                    self.state.phase = if self.media.current_time() > 0.0 {
                        Phase::Paused
                    } else {
                        Phase::Loaded
                    };
                }
                self.notify(Change::PlaybackChanged);
            }
            MediaEvent::TimeUpdate => self.sync_position(),
            MediaEvent::Progress => self.sync_buffered(),
            MediaEvent::LoadedMetadata => {
                self.state.duration = self.media.duration();
                self.notify(Change::Duration);
            }
            MediaEvent::Ended => return self.handle_ended(podcast),
        }
        Ok(())
    }

    fn handle_ended(&mut self, podcast: &Podcast) -> Result<(), PlayerError> {
        self.state.is_playing = false;
        self.state.requested = None;
        self.state.phase = Phase::Ended;

        let next = match (self.state.current_podcast, self.state.current_episode) {
            (Some(current), Some(episode)) if current == podcast.id => podcast
                .position_of(episode)
                .and_then(|position| podcast.episodes.get(position + 1))
                .map(|next| next.id),
            _ => None,
        };

        match next {
            Some(next) => {
                debug!(podcast = podcast.id, next, "Advancing to next episode");
                self.load_episode(podcast, next)?;
                self.request_play()
            }
            None => {
                debug!(podcast = podcast.id, "Reached the last episode");
                self.notify(Change::Ended);
                Ok(())
            }
        }
    }

    fn sync_position(&mut self) {
        let position = self.media.current_time();
        let duration = self.media.duration();

        self.state.position = position;
        self.state.duration = duration;
        self.state.progress_percent = match duration {
            Some(d) if d > 0.0 => (position / d * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        };
        self.notify(Change::Progress);
    }

    fn sync_buffered(&mut self) {
        self.state.buffered_percent = match (self.media.buffered_end(), self.media.duration()) {
            (Some(end), Some(d)) if d > 0.0 => (end / d * 100.0).clamp(0.0, 100.0),
            _ => 0.0,
        };
        self.notify(Change::Buffered);
    }

    /// Download target for the current episode
    pub fn download_link(&self, podcast: &Podcast) -> Option<DownloadLink> {
        if self.state.current_podcast != Some(podcast.id) {
            return None;
        }
        let episode = podcast.episode(self.state.current_episode?)?;

        Some(DownloadLink {
            url: episode.audio_url.clone(),
            filename: sanitize_filename::sanitize(format!("{}.mp3", episode.title)),
        })
    }
}
