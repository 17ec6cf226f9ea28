use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Thresholds for the detection, swarm, tracking and distance stages.
///
/// Every field falls back to its default when missing from a config file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Base keep threshold for a detection.
    pub detection_conf_threshold: f32,
    /// Geometric-size floor (px) for a core detection.
    pub min_geometric_size: f32,
    /// Core detections of one class that trigger a normal swarm.
    pub swarm_count: usize,
    /// Core detections of one class that trigger a bulk swarm.
    pub bulk_swarm_count: usize,
    /// Carried for config compatibility, the swarm rules do not read it.
    pub swarm_conf_threshold: f32,
    /// Class that can never trigger a bulk swarm.
    pub bulk_excluded_class: String,

    /// Minimum IoU for a detection to continue a track.
    pub iou_threshold: f32,
    /// Frames a track stays matchable after it was last seen.
    pub lookback_frames: usize,
    /// Per-track size history capacity.
    pub history_capacity: usize,

    /// Species every distance is calibrated against.
    pub reference_species: String,
    /// Geometric size (px) of the reference species at `reference_distance_m`.
    pub reference_pixel_size: f32,
    pub reference_distance_m: f32,

    /// Frames covered by one chunk analysis.
    pub chunk_window: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detection_conf_threshold: 0.25,
            min_geometric_size: 10.0,
            swarm_count: 4,
            bulk_swarm_count: 8,
            swarm_conf_threshold: 0.40,
            bulk_excluded_class: "unknown_bird".to_string(),
            iou_threshold: 0.03,
            lookback_frames: 5,
            history_capacity: 64,
            reference_species: "seagull".to_string(),
            reference_pixel_size: 42.0,
            reference_distance_m: 40.0,
            chunk_window: 30,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;

        Self::from_json_str(&src)
    }
}

/// Thresholds handed to the detector itself, before any tracking happens
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.04,
            iou_threshold: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TrackerConfig::from_json_str(r#"{"lookback_frames": 8, "chunk_window": 60}"#)
            .unwrap();

        assert_eq!(config.lookback_frames, 8);
        assert_eq!(config.chunk_window, 60);
        assert_eq!(config.swarm_count, 4);
        assert_eq!(config.reference_species, "seagull");
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = TrackerConfig::from_json_str("{lookback").unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TrackerConfig::from_json_file("/nonexistent/flocktrack.json").unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
