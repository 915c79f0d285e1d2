// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Playback state machine driving an audio element.

mod machine;
mod media;
mod state;

pub use machine::{DownloadLink, Player, SKIP_BACKWARD_SECONDS, SKIP_FORWARD_SECONDS};
pub use media::{MediaElement, MediaEvent};
pub use state::{
    Change, Phase, PlayRequest, PlayerState, SharedStateListener, StateListener, VolumeLevel,
};
