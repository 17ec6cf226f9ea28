use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

/// Scale proxy of a box: `sqrt(width * height)`, or `0` if either side is not positive.
#[inline]
pub fn geometric_size(width: f32, height: f32) -> f32 {
    if width > 0. && height > 0. {
        (width * height).sqrt()
    } else {
        0.
    }
}

/// One detector output for one frame
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub bbox: BBox<Ltrb>,
    pub class: String,
    pub confidence: f32,
    #[serde(rename = "w")]
    pub width: f32,
    #[serde(rename = "h")]
    pub height: f32,
}

impl RawDetection {
    /// Builds a detection whose pixel dimensions are taken from the box itself.
    pub fn from_ltrb<S: Into<String>>(bbox: BBox<Ltrb>, class: S, confidence: f32) -> Self {
        let ltwh = bbox.as_ltwh();

        Self {
            bbox,
            class: class.into(),
            confidence,
            width: ltwh.width(),
            height: ltwh.height(),
        }
    }

    #[inline]
    pub fn geometric_size(&self) -> f32 {
        geometric_size(self.width, self.height)
    }
}

/// A detection accepted for tracking, class possibly rewritten by the swarm rules.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BBox<Ltrb>,
    pub class: String,
    pub confidence: f32,
    pub geometric_size: f32,
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        let geometric_size = raw.geometric_size();

        Self {
            bbox: raw.bbox,
            class: raw.class,
            confidence: raw.confidence,
            geometric_size,
        }
    }
}

impl Detection {
    #[inline]
    pub fn iou(&self, other: &BBox<Ltrb>) -> f32 {
        self.bbox.iou(other)
    }
}
