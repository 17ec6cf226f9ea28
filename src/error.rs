use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Detector is not loaded")]
    DetectorUnavailable,

    #[error("Could not read frame at index {index} of {video}")]
    FrameUnreadable { video: String, index: usize },

    #[error("Could not open video file: {0}")]
    VideoUnopenable(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config Error: {0}")]
    Config(#[from] serde_json::Error),
}
