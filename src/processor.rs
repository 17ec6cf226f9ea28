use log::debug;

use crate::classifier::SwarmClassifier;
use crate::config::TrackerConfig;
use crate::detection::RawDetection;
use crate::distance::DistanceEstimator;
use crate::error::Error;
use crate::matcher::Matcher;
use crate::source::{Detector, FrameSource};
use crate::store::TrackStore;
use crate::track::TrackedObject;
use crate::wingspan::WingspanTable;

/// Turns one frame's raw detections into tracked, distance-annotated rows.
///
/// The processor is stateless; all tracking state lives in the [`TrackStore`]
/// passed to each call, so frames of one video must be fed in the order the
/// caller wants them tracked.
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    config: TrackerConfig,
    classifier: SwarmClassifier,
    matcher: Matcher,
    estimator: DistanceEstimator,
}

impl FrameProcessor {
    pub fn new(config: TrackerConfig, wingspans: WingspanTable) -> Self {
        Self {
            classifier: SwarmClassifier::new(&config),
            matcher: Matcher::new(&config),
            estimator: DistanceEstimator::new(wingspans, &config),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[inline]
    pub fn estimator(&self) -> &DistanceEstimator {
        &self.estimator
    }

    /// Runs classification, matching, the store update and distance
    /// estimation for frame `index`. Rows come out matched tracks first,
    /// then new ones, each group in detector order.
    pub fn process(
        &self,
        store: &mut TrackStore,
        index: usize,
        raw: Vec<RawDetection>,
    ) -> Vec<TrackedObject> {
        let dets = self.classifier.classify(raw);
        let mapping = self.matcher.map_detections(store, index, &dets);
        debug!(
            target: "tracker",
            "frame {index}: {} detections, {} matched, {} new",
            dets.len(),
            mapping.matched.len(),
            mapping.missed.len()
        );

        let touched = store.update(index, &dets, &mapping, &self.config);

        touched
            .into_iter()
            .filter_map(|id| {
                let track = store.get_mut(id)?;
                self.estimator.apply(track);
                Some(TrackedObject::from(&*track))
            })
            .collect()
    }

    /// Reads, detects and processes frame `index` of `video`.
    ///
    /// The store is only touched once the frame was read and detected, so a
    /// failed call leaves it as the last successful one did.
    pub fn process_frame<S, D>(
        &self,
        source: &S,
        detector: Option<&D>,
        store: &mut TrackStore,
        video: &str,
        index: usize,
    ) -> Result<Vec<TrackedObject>, Error>
    where
        S: FrameSource + ?Sized,
        D: Detector + ?Sized,
    {
        let detector = detector.ok_or(Error::DetectorUnavailable)?;
        let frame = source.read_frame(video, index)?;
        let raw = detector.detect(&frame)?;

        Ok(self.process(store, index, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::frame::Frame;
    use crate::source::{MockDetector, MockFrameSource};

    fn gull(x: f32, size: f32) -> RawDetection {
        RawDetection::from_ltrb(BBox::ltrb(x, 0., x + size, size), "seagull", 0.9)
    }

    fn processor() -> FrameProcessor {
        FrameProcessor::new(
            TrackerConfig::default(),
            WingspanTable::parse("seagull: 140\ntern: 70"),
        )
    }

    #[test]
    fn same_box_keeps_identity() {
        let p = processor();
        let mut store = TrackStore::new();

        for frame in 0..4 {
            let rows = p.process(&mut store, frame, vec![gull(100., 42.)]);

            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].tracked_id, 1);
            assert_eq!(rows[0].visibility_count, frame as u32 + 1);
        }
    }

    #[test]
    fn distance_is_set_on_live_rows() {
        let p = processor();
        let mut store = TrackStore::new();

        let rows = p.process(&mut store, 0, vec![gull(100., 42.)]);

        assert!((rows[0].distance_m.unwrap() - 40.).abs() < 1e-3);
    }

    #[test]
    fn unknown_species_has_no_distance() {
        let p = processor();
        let mut store = TrackStore::new();
        let crow = RawDetection::from_ltrb(BBox::ltrb(0., 0., 30., 30.), "crow", 0.9);

        let rows = p.process(&mut store, 0, vec![crow]);

        assert_eq!(rows[0].distance_m, None);
    }

    #[test]
    fn unseen_tracks_are_not_reported() {
        let p = processor();
        let mut store = TrackStore::new();
        p.process(&mut store, 0, vec![gull(0., 20.), gull(300., 20.)]);

        let rows = p.process(&mut store, 1, vec![gull(300., 20.)]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tracked_id, 2);
        assert_eq!(store.len(), 2);
        assert!(!store.get(1).unwrap().live);
    }

    #[test]
    fn missing_detector_fails_before_reading() {
        let p = processor();
        let mut store = TrackStore::new();
        let mut source = MockFrameSource::new();
        source.expect_read_frame().never();

        let result = p.process_frame(&source, None::<&MockDetector>, &mut store, "a.mp4", 0);

        assert!(matches!(result, Err(Error::DetectorUnavailable)));
        assert!(store.is_empty());
    }

    #[test]
    fn unreadable_frame_leaves_store_untouched() {
        let p = processor();
        let mut store = TrackStore::new();
        p.process(&mut store, 0, vec![gull(0., 20.)]);
        let before = store.clone();

        let mut source = MockFrameSource::new();
        source.expect_read_frame().returning(|video, index| {
            Err(Error::FrameUnreadable {
                video: video.to_string(),
                index,
            })
        });
        let mut detector = MockDetector::new();
        detector.expect_detect().never();

        let result = p.process_frame(&source, Some(&detector), &mut store, "a.mp4", 1);

        assert!(matches!(result, Err(Error::FrameUnreadable { index: 1, .. })));
        assert_eq!(store, before);
    }

    #[test]
    fn detects_on_the_requested_frame() {
        let p = processor();
        let mut store = TrackStore::new();

        let mut source = MockFrameSource::new();
        source
            .expect_read_frame()
            .withf(|video, index| video == "a.mp4" && *index == 7)
            .returning(|_, index| Ok(Frame::new(index, (640, 480), vec![])));
        let mut detector = MockDetector::new();
        detector
            .expect_detect()
            .times(1)
            .returning(|_| Ok(vec![gull(10., 30.)]));

        let rows = p
            .process_frame(&source, Some(&detector), &mut store, "a.mp4", 7)
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(store.get(1).unwrap().last_visible_frame, 7);
    }
}
