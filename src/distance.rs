use crate::config::TrackerConfig;
use crate::track::Track;
use crate::wingspan::WingspanTable;

/// Wingspan-ratio distance estimation.
///
/// A bird of the reference species whose box has geometric size
/// `reference_pixel_size` is `reference_distance_m` away; any other species
/// is scaled by its wingspan relative to the reference one.
#[derive(Debug, Clone)]
pub struct DistanceEstimator {
    wingspans: WingspanTable,
    // meters, `None` disables estimation
    reference_wingspan: Option<f32>,
    reference_pixel_size: f32,
    reference_distance_m: f32,
}

impl DistanceEstimator {
    pub fn new(wingspans: WingspanTable, config: &TrackerConfig) -> Self {
        let reference_wingspan = wingspans
            .get(&config.reference_species)
            .filter(|&w| w > 0. && config.reference_pixel_size > 0.);

        Self {
            wingspans,
            reference_wingspan,
            reference_pixel_size: config.reference_pixel_size,
            reference_distance_m: config.reference_distance_m,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.reference_wingspan.is_some()
    }

    #[inline]
    pub fn wingspans(&self) -> &WingspanTable {
        &self.wingspans
    }

    /// Distance in meters of a `species` bird whose largest observed box has
    /// geometric size `max_geometric_size`.
    pub fn estimate(&self, species: &str, max_geometric_size: f32) -> Option<f32> {
        let reference = self.reference_wingspan?;
        let wingspan = self.wingspans.get(species).filter(|&w| w > 0.)?;

        if max_geometric_size <= 0. {
            return None;
        }

        Some(
            (wingspan / reference)
                * (self.reference_pixel_size / max_geometric_size)
                * self.reference_distance_m,
        )
    }

    /// Refreshes the distance of a live track; other tracks are left alone.
    pub fn apply(&self, track: &mut Track) {
        if track.live {
            if let Some(distance) = self.estimate(&track.class, track.max_geometric_size) {
                track.distance_m = Some(distance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> DistanceEstimator {
        let table = WingspanTable::parse("seagull: 140\ntern: 70\nghost: 0\n");
        DistanceEstimator::new(table, &TrackerConfig::default())
    }

    #[test]
    fn reference_species_at_reference_size() {
        let d = estimator().estimate("seagull", 42.).unwrap();

        assert!((d - 40.).abs() < 1e-4);
    }

    #[test]
    fn scales_with_wingspan_ratio() {
        let d = estimator().estimate("Tern", 42.).unwrap();

        assert!((d - 20.).abs() < 1e-4);
    }

    #[test]
    fn larger_size_means_closer() {
        let e = estimator();
        let mut prev = f32::INFINITY;

        for size in [5., 10., 42., 80., 200.] {
            let d = e.estimate("tern", size).unwrap();
            assert!(d < prev);
            prev = d;
        }
    }

    #[test]
    fn undefined_cases() {
        let e = estimator();

        assert_eq!(e.estimate("tern", 0.), None);
        assert_eq!(e.estimate("crow", 42.), None);
        assert_eq!(e.estimate("ghost", 42.), None);
    }

    #[test]
    fn disabled_without_reference_species() {
        let e = DistanceEstimator::new(WingspanTable::parse("tern: 70"), &TrackerConfig::default());

        assert!(!e.is_enabled());
        assert_eq!(e.estimate("tern", 42.), None);
    }

    #[test]
    fn disabled_without_reference_pixel_size() {
        let config = TrackerConfig {
            reference_pixel_size: 0.,
            ..Default::default()
        };
        let e = DistanceEstimator::new(WingspanTable::parse("seagull: 140"), &config);

        assert!(!e.is_enabled());
    }
}
