//! Collaborators the tracking core consumes but does not implement.

#[cfg(test)]
use mockall::automock;

use crate::detection::RawDetection;
use crate::error::Error;
use crate::frame::Frame;

/// Random access to the frames of stored videos.
#[cfg_attr(test, automock)]
pub trait FrameSource {
    /// Number of frames in `video`.
    ///
    /// Fails with [`Error::VideoUnopenable`] if the video cannot be opened.
    fn frame_count(&self, video: &str) -> Result<usize, Error>;

    /// Decodes frame `index` of `video`.
    ///
    /// Fails with [`Error::FrameUnreadable`] if there is no such frame.
    fn read_frame(&self, video: &str, index: usize) -> Result<Frame, Error>;
}

/// Black-box object detector for a single frame.
#[cfg_attr(test, automock)]
pub trait Detector {
    /// Detects objects on `frame`. An empty list is a valid answer.
    fn detect(&self, frame: &Frame) -> Result<Vec<RawDetection>, Error>;
}
