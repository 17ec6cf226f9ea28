//! Swarm-aware filtering of one frame's raw detections.
//!
//! A detection is *core* when it is both large and confident enough. Counting
//! core detections per class decides the frame's [`SwarmMode`]:
//!
//! * **bulk** – one class (other than the excluded one) reaches
//!   `bulk_swarm_count`: every raw detection is relabeled to it and nothing
//!   is filtered;
//! * **normal** – one class reaches `swarm_count`: the confident detections
//!   are kept and every non-core one is appended after them under the swarm
//!   class, so a small but confident detection comes out twice;
//! * otherwise only the confident detections are kept.
//!
//! When several classes qualify, the one with the most core detections wins,
//! ties going to the lexicographically smallest label.

use log::debug;
use std::collections::HashMap;

use crate::config::TrackerConfig;
use crate::detection::{Detection, RawDetection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwarmMode {
    None,
    Normal(String),
    Bulk(String),
}

#[derive(Debug, Clone)]
pub struct SwarmClassifier {
    conf_threshold: f32,
    min_geometric_size: f32,
    swarm_count: usize,
    bulk_swarm_count: usize,
    bulk_excluded_class: String,
}

impl SwarmClassifier {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            conf_threshold: config.detection_conf_threshold,
            min_geometric_size: config.min_geometric_size,
            swarm_count: config.swarm_count,
            bulk_swarm_count: config.bulk_swarm_count,
            bulk_excluded_class: config.bulk_excluded_class.clone(),
        }
    }

    #[inline]
    fn is_confident(&self, det: &Detection) -> bool {
        det.confidence >= self.conf_threshold
    }

    #[inline]
    pub fn is_core(&self, det: &Detection) -> bool {
        det.geometric_size >= self.min_geometric_size && self.is_confident(det)
    }

    /// Decides the swarm mode of a frame from its detections.
    pub fn mode(&self, dets: &[Detection]) -> SwarmMode {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for det in dets.iter().filter(|d| self.is_core(d)) {
            *counts.entry(det.class.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let bulk = ranked
            .iter()
            .find(|(class, count)| {
                *count >= self.bulk_swarm_count && *class != self.bulk_excluded_class
            })
            .map(|(class, _)| class.to_string());

        if let Some(class) = bulk {
            return SwarmMode::Bulk(class);
        }

        // ranked is sorted by count, so only the head can qualify
        match ranked.first() {
            Some((class, count)) if *count >= self.swarm_count => {
                SwarmMode::Normal(class.to_string())
            }
            _ => SwarmMode::None,
        }
    }

    /// Returns the detections to track this frame, in detector order.
    pub fn classify(&self, raw: Vec<RawDetection>) -> Vec<Detection> {
        let mut dets: Vec<Detection> = raw.into_iter().map(Detection::from).collect();

        match self.mode(&dets) {
            SwarmMode::Bulk(class) => {
                debug!(target: "classifier", "bulk swarm of {class}, relabeling {} detections", dets.len());

                for det in &mut dets {
                    det.class.clone_from(&class);
                }

                dets
            }

            SwarmMode::Normal(class) => {
                let relabel = |mut det: Detection| {
                    det.class.clone_from(&class);
                    det
                };

                // small but confident detections are in both lists
                let candidates: Vec<Detection> = dets
                    .iter()
                    .filter(|d| !self.is_core(d))
                    .cloned()
                    .map(relabel)
                    .collect();

                let mut base: Vec<Detection> = dets
                    .into_iter()
                    .filter(|d| self.is_confident(d))
                    .map(|d| if self.is_core(&d) { d } else { relabel(d) })
                    .collect();

                debug!(
                    target: "classifier",
                    "normal swarm of {class}, {} base, {} candidates appended",
                    base.len(),
                    candidates.len()
                );

                base.extend(candidates);
                base
            }

            SwarmMode::None => {
                dets.retain(|d| self.is_confident(d));
                dets
            }
        }
    }
}
