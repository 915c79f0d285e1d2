// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// The audio element the player drives
///
/// Commands are requests: their effect is only known once the element
/// reports the matching [`MediaEvent`].
pub trait MediaElement {
    fn set_source(&mut self, url: &str);

    /// Start fetching the current source
    fn load(&mut self);

    /// Request playback; an `Err` means the request was refused outright
    fn play(&mut self) -> Result<(), String>;

    fn pause(&mut self);

    /// Playback position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Length of the source in seconds, once known
    fn duration(&self) -> Option<f64>;

    /// End of the last buffered range in seconds
    fn buffered_end(&self) -> Option<f64>;

    fn set_playback_rate(&mut self, rate: f64);

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);
}

/// Notifications raised by the audio element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// Playback actually started
    Play,
    /// Playback actually paused
    Pause,
    /// Position moved
    TimeUpdate,
    /// More data was buffered
    Progress,
    /// Duration became known
    LoadedMetadata,
    /// Playback reached the end of the source
    Ended,
}
