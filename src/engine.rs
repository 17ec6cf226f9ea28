use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::aggregate::{ChunkAggregator, ChunkReport};
use crate::config::TrackerConfig;
use crate::error::Error;
use crate::processor::FrameProcessor;
use crate::source::{Detector, FrameSource};
use crate::store::TrackStore;
use crate::track::TrackedObject;
use crate::wingspan::WingspanTable;

type Session = Arc<Mutex<TrackStore>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-video tracking sessions over one frame source and one detector.
///
/// Each video id owns a [`TrackStore`] behind its own lock, so frames of
/// different videos can be processed from several threads at once while
/// frames of one video are applied one at a time.
pub struct Engine<S, D> {
    source: S,
    detector: Option<D>,
    processor: FrameProcessor,
    sessions: Mutex<HashMap<String, Session>>,
}

impl<S: FrameSource, D: Detector> Engine<S, D> {
    /// A `None` detector makes every request fail with [`Error::DetectorUnavailable`].
    pub fn new(
        source: S,
        detector: Option<D>,
        config: TrackerConfig,
        wingspans: WingspanTable,
    ) -> Self {
        Self {
            source,
            detector,
            processor: FrameProcessor::new(config, wingspans),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }

    /// Copy of the current tracks of `video`, if it has a session.
    pub fn snapshot(&self, video: &str) -> Option<TrackStore> {
        let session = lock(&self.sessions).get(video).cloned()?;
        let store = lock(&session).clone();

        Some(store)
    }

    /// Forgets everything tracked for `video`.
    pub fn drop_session(&self, video: &str) -> Option<TrackStore> {
        let session = lock(&self.sessions).remove(video)?;
        let store = lock(&session).clone();

        Some(store)
    }

    fn session(&self, video: &str, reset: bool) -> Session {
        let mut sessions = lock(&self.sessions);
        if reset {
            sessions.remove(video);
        }

        sessions
            .entry(video.to_string())
            .or_insert_with(|| {
                info!(target: "engine", "initialized new tracking state for {video}");
                Session::default()
            })
            .clone()
    }

    /// Tracks frame `index` of `video` and returns its live tracks.
    ///
    /// With `reset` the video's store starts over empty before the frame is
    /// processed. Only the video's own lock is held while the frame is read
    /// and detected.
    pub fn process_frame(
        &self,
        video: &str,
        index: usize,
        reset: bool,
    ) -> Result<Vec<TrackedObject>, Error> {
        let session = self.session(video, reset);
        let mut store = lock(&session);

        self.processor
            .process_frame(&self.source, self.detector.as_ref(), &mut store, video, index)
    }

    /// Analyzes the configured window of frames from `start`.
    pub fn analyze_chunk(&self, video: &str, start: usize) -> Result<ChunkReport, Error> {
        self.analyze_chunk_with_window(video, start, self.processor.config().chunk_window)
    }

    /// Analyzes `window` frames from `start`, continuing from a snapshot of
    /// the video's current tracks without touching them.
    pub fn analyze_chunk_with_window(
        &self,
        video: &str,
        start: usize,
        window: usize,
    ) -> Result<ChunkReport, Error> {
        let initial = self.snapshot(video).unwrap_or_default();

        ChunkAggregator::new(&self.processor, window).analyze(
            &self.source,
            self.detector.as_ref(),
            video,
            start,
            &initial,
        )
    }
}
