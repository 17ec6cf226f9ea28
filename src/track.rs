use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::circular_queue::CircularQueue;
use crate::detection::Detection;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: u32,
    pub class: String,
    pub bbox: BBox<Ltrb>,
    pub confidence: f32,

    // in px
    pub max_geometric_size: f32,
    pub size_history: CircularQueue<f32>,

    // consecutive frames seen, including the last one
    pub visibility_count: u32,
    pub last_visible_frame: usize,
    pub live: bool,

    // in meters
    pub distance_m: Option<f32>,
}

impl Track {
    pub fn new(id: u32, frame: usize, det: &Detection, history_capacity: usize) -> Self {
        let mut size_history = CircularQueue::with_capacity(history_capacity);
        size_history.push(det.geometric_size);

        Self {
            id,
            class: det.class.clone(),
            bbox: det.bbox,
            confidence: det.confidence,
            max_geometric_size: det.geometric_size,
            size_history,
            visibility_count: 1,
            last_visible_frame: frame,
            live: true,
            distance_m: None,
        }
    }

    /// Whether a detection of `frame` may still continue this track.
    #[inline]
    pub fn is_matchable(&self, frame: usize, lookback: usize) -> bool {
        self.last_visible_frame + lookback >= frame
    }

    #[inline]
    pub fn is_expired(&self, frame: usize, lookback: usize) -> bool {
        frame > self.last_visible_frame + lookback
    }

    pub fn update(&mut self, frame: usize, det: &Detection) {
        if self.last_visible_frame + 1 == frame {
            self.visibility_count += 1;
        } else {
            self.visibility_count = 1;
        }

        self.bbox = det.bbox;
        self.confidence = det.confidence;
        self.last_visible_frame = frame;
        self.live = true;
        self.max_geometric_size = self.max_geometric_size.max(det.geometric_size);
        self.size_history.push(det.geometric_size);
    }
}

/// One row of a frame result: a live track ready to be annotated
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub class: String,
    pub confidence: f32,
    pub tracked_id: u32,
    pub distance_m: Option<f32>,
    pub visibility_count: u32,
    #[serde(rename = "box")]
    pub bbox: BBox<Ltrb>,
}

impl TrackedObject {
    /// Text drawn next to the box, one entry per line.
    pub fn label_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "ID {}: {} ({:.2})",
            self.tracked_id, self.class, self.confidence
        )];

        if let Some(distance) = self.distance_m {
            lines.push(format!("Dist: {distance:.2}m"));
        }

        lines.push(format!("Visible: {}", self.visibility_count));

        lines
    }
}

impl From<&Track> for TrackedObject {
    fn from(t: &Track) -> TrackedObject {
        TrackedObject {
            class: t.class.clone(),
            confidence: t.confidence,
            tracked_id: t.id,
            distance_m: t.distance_m,
            visibility_count: t.visibility_count,
            bbox: t.bbox,
        }
    }
}
