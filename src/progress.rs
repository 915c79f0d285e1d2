use std::sync::Arc;

/// Events emitted while the catalog is being loaded
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    /// A blocking load began; the message is what the loading indicator shows
    LoadingStarted { message: String },

    /// The master feed is being fetched
    FetchingMasterFeed { url: String },

    /// The master feed has been parsed into the podcast index
    IndexReady { podcast_count: usize },

    /// A podcast feed is being fetched and parsed
    Hydrating { podcast_id: usize, title: String },

    /// A podcast's episodes are now available
    Hydrated {
        podcast_id: usize,
        title: String,
        episode_count: usize,
    },

    /// A podcast feed could not be loaded
    HydrationFailed {
        podcast_id: usize,
        title: String,
        error: String,
    },

    /// Background hydration has visited every podcast
    BackgroundCompleted { loaded: usize, total: usize },

    /// The loading indicator should be hidden
    LoadingFinished,

    /// A failure that should be shown to the user
    Error { message: String },
}

/// Trait for reporting catalog loading progress.
///
/// Implementations can use this to drive a loading indicator, log messages,
/// or collect statistics.
pub trait LoadReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: LoadEvent);
}

/// A shared reference to a load reporter
pub type SharedLoadReporter = Arc<dyn LoadReporter>;

/// A no-op reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl LoadReporter for NoopReporter {
    fn report(&self, _event: LoadEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedLoadReporter {
        Arc::new(Self)
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Reporter that keeps every event for later assertions
    #[derive(Default)]
    pub struct RecordingReporter {
        events: Mutex<Vec<LoadEvent>>,
    }

    impl RecordingReporter {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn events(&self) -> Vec<LoadEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl LoadReporter for RecordingReporter {
        fn report(&self, event: LoadEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
