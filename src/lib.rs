//! Post-processing of per-frame bird detections into identified,
//! distance-annotated tracks.
//!
//! A frame's raw detections go through the swarm-aware [`classifier`], are
//! matched greedily by IoU against the video's [`TrackStore`], and every
//! live track gets a wingspan-based distance estimate. [`Engine`] keeps one
//! store per video and also runs multi-frame chunk reports.

pub mod aggregate;
pub mod bbox;
pub mod classifier;
pub mod config;
pub mod detection;
pub mod distance;
pub mod engine;
pub mod error;
pub mod frame;
pub mod matcher;
pub mod processor;
pub mod source;
pub mod store;
pub mod track;
pub mod wingspan;

mod circular_queue;

pub use aggregate::{ChunkAggregator, ChunkReport};
pub use config::{DetectorConfig, TrackerConfig};
pub use detection::{Detection, RawDetection};
pub use engine::Engine;
pub use error::Error;
pub use frame::Frame;
pub use processor::FrameProcessor;
pub use source::{Detector, FrameSource};
pub use store::TrackStore;
pub use track::{Track, TrackedObject};
pub use wingspan::WingspanTable;
