// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use crate::format::{format_time, speed_label};

/// Where the player is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No episode loaded
    #[default]
    Idle,
    /// Episode loaded, paused at the start
    Loaded,
    Playing,
    Paused,
    /// Playback reached the end and nothing followed
    Ended,
}

/// Last command sent to the media element, not yet confirmed by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRequest {
    Play,
    Pause,
}

/// Icon shown next to the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: f64) -> Self {
        if volume <= 0.0 {
            VolumeLevel::Muted
        } else if volume < 0.5 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }
}

/// The single source of truth every player surface renders from
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub current_podcast: Option<usize>,
    pub current_episode: Option<usize>,
    pub phase: Phase,
    /// Confirmed by the media element, never set optimistically
    pub is_playing: bool,
    pub requested: Option<PlayRequest>,
    pub speed: f64,
    pub volume: f64,
    pub volume_before_mute: Option<f64>,
    pub modal_open: bool,
    /// Seconds
    pub position: f64,
    pub duration: Option<f64>,
    pub progress_percent: f64,
    pub buffered_percent: f64,
    pub embed_code: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_podcast: None,
            current_episode: None,
            phase: Phase::Idle,
            is_playing: false,
            requested: None,
            speed: 1.0,
            volume: 1.0,
            volume_before_mute: None,
            modal_open: false,
            position: 0.0,
            duration: None,
            progress_percent: 0.0,
            buffered_percent: 0.0,
            embed_code: None,
        }
    }
}

impl PlayerState {
    pub fn has_episode(&self) -> bool {
        self.current_episode.is_some()
    }

    pub fn current_time_label(&self) -> String {
        format_time(self.position)
    }

    pub fn duration_label(&self) -> String {
        format_time(self.duration.unwrap_or(0.0))
    }

    pub fn speed_label(&self) -> String {
        speed_label(self.speed)
    }

    pub fn volume_level(&self) -> VolumeLevel {
        VolumeLevel::from_volume(self.volume)
    }

    /// Clear everything tied to the loaded source
    pub(crate) fn reset_progress(&mut self) {
        self.position = 0.0;
        self.duration = None;
        self.progress_percent = 0.0;
        self.buffered_percent = 0.0;
    }
}

/// What a transition changed, so surfaces can update selectively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// New podcast; episode list re-rendered and scrolled to the top
    PodcastSelected,
    EpisodeLoaded,
    PlayRequested,
    PlaybackChanged,
    Progress,
    Buffered,
    Duration,
    Speed,
    Volume,
    Modal,
    Ended,
}

/// A surface rendering the player state (inline bar, modal, ...)
pub trait StateListener: Send + Sync {
    fn state_changed(&self, change: Change, state: &PlayerState);
}

pub type SharedStateListener = Arc<dyn StateListener>;
