use log::trace;
use std::collections::HashSet;

use crate::config::TrackerConfig;
use crate::detection::Detection;
use crate::store::TrackStore;

/// Result of matching one frame's detections against a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    /// `(track id, detection index)`, in detection order
    pub matched: Vec<(u32, usize)>,
    /// Detection indexes that continue no track, in detection order
    pub missed: Vec<usize>,
}

/// Greedy IoU matcher.
///
/// Detections are served first come first served: each one takes the
/// unclaimed, same-class, still matchable track it overlaps most, provided
/// the overlap exceeds the threshold. This is not a globally optimal
/// assignment and depends on detection order. Equal overlaps go to the
/// lowest track id.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    iou_threshold: f32,
    lookback: usize,
}

impl Matcher {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            iou_threshold: config.iou_threshold,
            lookback: config.lookback_frames,
        }
    }

    pub fn map_detections(&self, store: &TrackStore, frame: usize, dets: &[Detection]) -> Mapping {
        let mut mapping = Mapping::default();
        let mut claimed = HashSet::new();

        for (idx, det) in dets.iter().enumerate() {
            let mut best: Option<(u32, f32)> = None;

            for track in store.iter() {
                if track.class != det.class
                    || !track.is_matchable(frame, self.lookback)
                    || claimed.contains(&track.id)
                {
                    continue;
                }

                let iou = det.iou(&track.bbox);
                if iou > self.iou_threshold && best.map_or(true, |(_, b)| iou > b) {
                    best = Some((track.id, iou));
                }
            }

            match best {
                Some((id, iou)) => {
                    trace!(target: "tracker", "detection {idx} continues track {id} (iou {iou:.3})");
                    claimed.insert(id);
                    mapping.matched.push((id, idx));
                }
                None => mapping.missed.push(idx),
            }
        }

        mapping
    }
}
