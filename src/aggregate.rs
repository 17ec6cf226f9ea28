//! Multi-frame reports over a bounded window of a video.

use log::{info, warn};
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::Error;
use crate::processor::FrameProcessor;
use crate::source::{Detector, FrameSource};
use crate::store::TrackStore;
use crate::track::TrackedObject;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LongestStreak {
    pub track_id: u32,
    pub frames: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassSummary {
    #[serde(rename = "total_unique_birds")]
    pub unique_tracks: usize,
    #[serde(rename = "longest_tracking")]
    pub longest: LongestStreak,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChunkReport {
    /// First frame analyzed
    pub start: usize,
    /// One past the last frame analyzed
    pub end: usize,
    /// Detection instances per class, every frame counted
    pub detections: BTreeMap<String, usize>,
    pub classes: BTreeMap<String, ClassSummary>,
    /// Frames that could not be read and were treated as empty
    pub skipped_frames: Vec<usize>,
}

#[derive(Debug, Default)]
struct ClassTally {
    ids: HashSet<u32>,
    streaks: HashMap<u32, u32>,
    longest: LongestStreak,
}

/// Per-class identity bookkeeping across consecutive frames.
///
/// An identity's streak drops back to zero as soon as one frame misses it;
/// the longest streak only moves on a strictly longer one, so the first
/// identity to reach a length keeps it.
#[derive(Debug, Default)]
pub struct StreakTally {
    classes: BTreeMap<String, ClassTally>,
    detections: BTreeMap<String, usize>,
}

impl StreakTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the rows of the next frame.
    pub fn observe(&mut self, rows: &[TrackedObject]) {
        let mut seen = HashSet::with_capacity(rows.len());

        for row in rows {
            *self.detections.entry(row.class.clone()).or_insert(0) += 1;
            seen.insert(row.tracked_id);

            let tally = self.classes.entry(row.class.clone()).or_default();
            tally.ids.insert(row.tracked_id);

            let streak = tally.streaks.entry(row.tracked_id).or_insert(0);
            *streak += 1;

            if *streak > tally.longest.frames {
                tally.longest = LongestStreak {
                    track_id: row.tracked_id,
                    frames: *streak,
                };
            }
        }

        for tally in self.classes.values_mut() {
            for (id, streak) in tally.streaks.iter_mut() {
                if !seen.contains(id) {
                    *streak = 0;
                }
            }
        }
    }

    pub fn detections(&self) -> &BTreeMap<String, usize> {
        &self.detections
    }

    pub fn summary(&self) -> BTreeMap<String, ClassSummary> {
        self.classes
            .iter()
            .map(|(class, tally)| {
                let summary = ClassSummary {
                    unique_tracks: tally.ids.len(),
                    longest: tally.longest,
                };

                (class.clone(), summary)
            })
            .collect()
    }
}

/// Runs a [`FrameProcessor`] over `[start, min(start + window, frame_count))`.
#[derive(Debug, Clone)]
pub struct ChunkAggregator<'a> {
    processor: &'a FrameProcessor,
    window: usize,
}

impl<'a> ChunkAggregator<'a> {
    pub fn new(processor: &'a FrameProcessor, window: usize) -> Self {
        Self { processor, window }
    }

    /// Analyzes one chunk of `video`.
    ///
    /// Tracking continues from a private copy of `initial`, which is never
    /// modified. Unreadable frames are skipped; any other failure aborts the
    /// whole chunk and no partial report is returned.
    pub fn analyze<S, D>(
        &self,
        source: &S,
        detector: Option<&D>,
        video: &str,
        start: usize,
        initial: &TrackStore,
    ) -> Result<ChunkReport, Error>
    where
        S: FrameSource + ?Sized,
        D: Detector + ?Sized,
    {
        let detector = detector.ok_or(Error::DetectorUnavailable)?;

        let total = source.frame_count(video)?;
        if total == 0 {
            return Err(Error::VideoUnopenable(format!("{video} has no frames")));
        }

        let end = start.saturating_add(self.window).min(total);
        let mut store = initial.clone();
        let mut tally = StreakTally::new();
        let mut skipped_frames = Vec::new();

        for index in start..end {
            match self
                .processor
                .process_frame(source, Some(detector), &mut store, video, index)
            {
                Ok(rows) => tally.observe(&rows),
                Err(Error::FrameUnreadable { .. }) => {
                    warn!(target: "aggregate", "skipping frame {index} of {video}: unreadable");
                    tally.observe(&[]);
                    skipped_frames.push(index);
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            target: "aggregate",
            "analyzed frames {start}..{end} of {video}, {} classes, {} skipped",
            tally.classes.len(),
            skipped_frames.len()
        );

        Ok(ChunkReport {
            start,
            end: end.max(start),
            classes: tally.summary(),
            detections: tally.detections,
            skipped_frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::config::TrackerConfig;
    use crate::detection::RawDetection;
    use crate::frame::Frame;
    use crate::source::{MockDetector, MockFrameSource};
    use crate::wingspan::WingspanTable;

    fn row(class: &str, id: u32) -> TrackedObject {
        TrackedObject {
            class: class.to_string(),
            confidence: 0.9,
            tracked_id: id,
            distance_m: None,
            visibility_count: 1,
            bbox: BBox::ltrb(0., 0., 10., 10.),
        }
    }

    #[test]
    fn tally_counts_every_instance() {
        let mut tally = StreakTally::new();
        tally.observe(&[row("gull", 1), row("gull", 2)]);
        tally.observe(&[row("gull", 1), row("tern", 3)]);

        assert_eq!(tally.detections()["gull"], 3);
        assert_eq!(tally.detections()["tern"], 1);
    }

    #[test]
    fn tally_tracks_longest_streak() {
        let mut tally = StreakTally::new();
        tally.observe(&[row("gull", 1)]);
        tally.observe(&[row("gull", 1), row("gull", 2)]);
        tally.observe(&[row("gull", 2)]);
        tally.observe(&[row("gull", 1), row("gull", 2)]);

        let summary = &tally.summary()["gull"];
        assert_eq!(summary.unique_tracks, 2);
        assert_eq!(
            summary.longest,
            LongestStreak {
                track_id: 2,
                frames: 3
            }
        );
    }

    #[test]
    fn tally_streak_resets_on_gap() {
        let mut tally = StreakTally::new();
        tally.observe(&[row("gull", 1)]);
        tally.observe(&[row("gull", 1)]);
        tally.observe(&[]);
        tally.observe(&[row("gull", 1)]);

        assert_eq!(tally.summary()["gull"].longest.frames, 2);
    }

    #[test]
    fn tally_first_to_reach_length_keeps_it() {
        let mut tally = StreakTally::new();
        tally.observe(&[row("gull", 4), row("gull", 9)]);

        assert_eq!(tally.summary()["gull"].longest.track_id, 4);
    }

    fn processor() -> FrameProcessor {
        FrameProcessor::new(TrackerConfig::default(), WingspanTable::default())
    }

    fn source(total: usize) -> MockFrameSource {
        let mut source = MockFrameSource::new();
        source.expect_frame_count().returning(move |_| Ok(total));
        source
            .expect_read_frame()
            .returning(|_, index| Ok(Frame::new(index, (64, 64), vec![])));
        source
    }

    fn steady_gull() -> MockDetector {
        let mut detector = MockDetector::new();
        detector.expect_detect().returning(|_| {
            Ok(vec![RawDetection::from_ltrb(
                BBox::ltrb(0., 0., 30., 30.),
                "gull",
                0.9,
            )])
        });
        detector
    }

    #[test]
    fn window_is_clamped_to_video_length() {
        let p = processor();
        let report = ChunkAggregator::new(&p, 30)
            .analyze(&source(12), Some(&steady_gull()), "a.mp4", 5, &TrackStore::new())
            .unwrap();

        assert_eq!((report.start, report.end), (5, 12));
        assert_eq!(report.detections["gull"], 7);
        assert_eq!(report.classes["gull"].unique_tracks, 1);
        assert_eq!(report.classes["gull"].longest.frames, 7);
    }

    #[test]
    fn start_past_the_end_is_empty() {
        let p = processor();
        let report = ChunkAggregator::new(&p, 30)
            .analyze(&source(12), Some(&steady_gull()), "a.mp4", 40, &TrackStore::new())
            .unwrap();

        assert_eq!((report.start, report.end), (40, 40));
        assert!(report.classes.is_empty());
    }

    #[test]
    fn initial_store_is_not_modified() {
        let p = processor();
        let mut initial = TrackStore::new();
        p.process(
            &mut initial,
            0,
            vec![RawDetection::from_ltrb(BBox::ltrb(0., 0., 30., 30.), "gull", 0.9)],
        );
        let before = initial.clone();

        let report = ChunkAggregator::new(&p, 3)
            .analyze(&source(10), Some(&steady_gull()), "a.mp4", 1, &initial)
            .unwrap();

        assert_eq!(initial, before);
        // tracking carried on from the copy
        assert_eq!(report.classes["gull"].longest.track_id, 1);
    }

    #[test]
    fn unreadable_frames_are_skipped() {
        let p = processor();
        let mut source = MockFrameSource::new();
        source.expect_frame_count().returning(|_| Ok(4));
        source.expect_read_frame().returning(|video, index| {
            if index == 2 {
                Err(Error::FrameUnreadable {
                    video: video.to_string(),
                    index,
                })
            } else {
                Ok(Frame::new(index, (64, 64), vec![]))
            }
        });

        let report = ChunkAggregator::new(&p, 30)
            .analyze(&source, Some(&steady_gull()), "a.mp4", 0, &TrackStore::new())
            .unwrap();

        assert_eq!(report.skipped_frames, [2]);
        assert_eq!(report.detections["gull"], 3);
        assert_eq!(report.classes["gull"].longest.frames, 2);
    }

    #[test]
    fn missing_detector_fails_whole_chunk() {
        let p = processor();
        let mut source = MockFrameSource::new();
        source.expect_frame_count().never();

        let result = ChunkAggregator::new(&p, 30).analyze(
            &source,
            None::<&MockDetector>,
            "a.mp4",
            0,
            &TrackStore::new(),
        );

        assert!(matches!(result, Err(Error::DetectorUnavailable)));
    }

    #[test]
    fn detector_failure_mid_chunk_is_atomic() {
        let p = processor();
        let mut detector = MockDetector::new();
        detector.expect_detect().returning(|frame| {
            if frame.index < 3 {
                Ok(vec![])
            } else {
                Err(Error::DetectorUnavailable)
            }
        });

        let result = ChunkAggregator::new(&p, 30).analyze(
            &source(10),
            Some(&detector),
            "a.mp4",
            0,
            &TrackStore::new(),
        );

        assert!(matches!(result, Err(Error::DetectorUnavailable)));
    }

    #[test]
    fn unopenable_video() {
        let p = processor();
        let mut source = MockFrameSource::new();
        source
            .expect_frame_count()
            .returning(|video| Err(Error::VideoUnopenable(video.to_string())));

        let result = ChunkAggregator::new(&p, 30).analyze(
            &source,
            Some(&steady_gull()),
            "a.mp4",
            0,
            &TrackStore::new(),
        );

        assert!(matches!(result, Err(Error::VideoUnopenable(_))));
    }

    #[test]
    fn report_serializes_with_frontend_names() {
        let mut tally = StreakTally::new();
        tally.observe(&[row("gull", 1)]);
        let value = serde_json::to_value(tally.summary()).unwrap();

        assert_eq!(value["gull"]["total_unique_birds"], 1);
        assert_eq!(value["gull"]["longest_tracking"]["frames"], 1);
    }
}
