use log::debug;
use std::collections::BTreeMap;

use crate::config::TrackerConfig;
use crate::detection::Detection;
use crate::matcher::Mapping;
use crate::track::Track;

/// All tracks of one video, keyed by identity.
///
/// Identities start at 1, only grow, and are never handed out again after
/// their track is evicted. Iteration is in ascending identity order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackStore {
    tracks: BTreeMap<u32, Track>,
    next_id: u32,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    #[inline]
    pub fn live(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(|t| t.live)
    }

    /// Identity the next new track will get.
    #[inline]
    pub fn peek_id(&self) -> u32 {
        self.next_id.max(1)
    }

    fn insert(&mut self, frame: usize, det: &Detection, history_capacity: usize) -> u32 {
        let id = self.peek_id();
        self.next_id = id + 1;
        self.tracks.insert(id, Track::new(id, frame, det, history_capacity));

        id
    }

    /// Applies one frame's mapping.
    ///
    /// Matched tracks are updated, every missed detection opens a new track,
    /// everything else goes not-live, and tracks unseen for longer than the
    /// lookback window are evicted. Returns the identities touched this frame,
    /// matched ones first, both in detection order.
    pub fn update(
        &mut self,
        frame: usize,
        dets: &[Detection],
        mapping: &Mapping,
        config: &TrackerConfig,
    ) -> Vec<u32> {
        for track in self.tracks.values_mut() {
            track.live = false;
        }

        let mut touched = Vec::with_capacity(mapping.matched.len() + mapping.missed.len());

        for &(id, idx) in &mapping.matched {
            if let (Some(track), Some(det)) = (self.tracks.get_mut(&id), dets.get(idx)) {
                track.update(frame, det);
                touched.push(id);
            }
        }

        for &idx in &mapping.missed {
            if let Some(det) = dets.get(idx) {
                let id = self.insert(frame, det, config.history_capacity);
                debug!(target: "tracker", "frame {frame}: new track {id} ({})", det.class);
                touched.push(id);
            }
        }

        let expired: Vec<u32> = self
            .tracks
            .values()
            .filter(|t| !t.live && t.is_expired(frame, config.lookback_frames))
            .map(|t| t.id)
            .collect();

        if !expired.is_empty() {
            debug!(target: "tracker", "frame {frame}: evicting tracks {expired:?}");
        }

        for id in expired {
            self.tracks.remove(&id);
        }

        touched
    }
}
