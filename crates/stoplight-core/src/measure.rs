//! Running statistics for a single sensor channel
//!
//! A [`Measure`] keeps count, total, average and extrema over a stream of
//! readings without storing the readings themselves. The sampling loop keeps
//! one instance per channel (CO2, temperature, humidity).

/// Incremental running statistics over scalar readings.
///
/// Before the first reading (and after [`clear`](Self::clear)) every value
/// reads as `0.0`. That zero is a defined state, not "uninitialized".
///
/// [`reset_average`](Self::reset_average) only restarts the averaging window:
/// extrema survive it, so a following [`include`](Self::include) widens the
/// previous minimum/maximum instead of starting over.
///
/// Readings are `f32`; the total and average are kept in `f64` so months of
/// samples at the default cadence do not lose precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measure {
    current: f32,
    total: f64,
    average: f64,
    minimum: f32,
    maximum: f32,
    count: u32,
    /// Next inclusion re-seeds the extrema.
    first: bool,
}

impl Default for Measure {
    fn default() -> Self {
        Self::new()
    }
}

impl Measure {
    pub const fn new() -> Self {
        Self {
            current: 0.0,
            total: 0.0,
            average: 0.0,
            minimum: 0.0,
            maximum: 0.0,
            count: 0,
            first: true,
        }
    }

    /// Add a reading. Any value is accepted, including zero and negatives.
    pub fn include(&mut self, value: f32) {
        self.count += 1;
        self.current = value;
        self.total += f64::from(value);

        if self.first {
            self.minimum = value;
            self.maximum = value;
            self.first = false;
        } else {
            if value > self.maximum {
                self.maximum = value;
            }
            if value < self.minimum {
                self.minimum = value;
            }
        }

        // Rounding must never push the mean outside the readings seen
        let mean = self.total / f64::from(self.count);
        self.average = mean
            .min(f64::from(self.maximum))
            .max(f64::from(self.minimum));
    }

    /// Return to the pre-first-reading state, extrema included.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Restart the averaging window, keeping the extrema.
    pub fn reset_average(&mut self) {
        self.current = 0.0;
        self.total = 0.0;
        self.average = 0.0;
        self.count = 0;
    }

    /// Last included reading.
    pub const fn current(&self) -> f32 {
        self.current
    }

    pub const fn average(&self) -> f64 {
        self.average
    }

    pub const fn minimum(&self) -> f32 {
        self.minimum
    }

    pub const fn maximum(&self) -> f32 {
        self.maximum
    }

    /// Readings included since the last clear or average reset.
    pub const fn count(&self) -> u32 {
        self.count
    }

    pub const fn total(&self) -> f64 {
        self.total
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_measure_reads_zero() {
        let m = Measure::new();

        assert_eq!(m.count(), 0);
        assert_eq!(m.current(), 0.0);
        assert_eq!(m.total(), 0.0);
        assert_eq!(m.average(), 0.0);
        assert_eq!(m.minimum(), 0.0);
        assert_eq!(m.maximum(), 0.0);
        assert!(m.is_empty());
        assert_eq!(m, Measure::default());
    }

    #[test]
    fn test_first_reading_seeds_extrema() {
        // A positive first reading must not be clamped to the zero sentinel
        let mut m = Measure::new();
        m.include(612.0);

        assert_eq!(m.minimum(), 612.0);
        assert_eq!(m.maximum(), 612.0);
        assert_eq!(m.average(), 612.0);
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn test_extrema_and_mean_over_sequence() {
        let readings = [700.0, 850.0, 1100.0, 1050.0, 600.0, -3.0, 0.0];
        let mut m = Measure::new();

        for r in readings {
            m.include(r);
            assert!(m.minimum() <= r && r <= m.maximum());
            assert_eq!(m.current(), r);
        }

        let sum: f64 = readings.iter().map(|r| f64::from(*r)).sum();
        assert_eq!(m.count(), readings.len() as u32);
        assert_eq!(m.total(), sum);
        assert_eq!(m.average(), sum / readings.len() as f64);
        assert_eq!(m.minimum(), -3.0);
        assert_eq!(m.maximum(), 1100.0);
    }

    #[test]
    fn test_clear_then_include() {
        let mut m = Measure::new();
        m.include(400.0);
        m.include(1200.0);

        m.clear();
        assert_eq!(m, Measure::new());

        m.include(900.0);
        assert_eq!(m.minimum(), 900.0);
        assert_eq!(m.maximum(), 900.0);
        assert_eq!(m.current(), 900.0);
        assert_eq!(m.average(), 900.0);
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn test_reset_average_keeps_extrema() {
        let mut m = Measure::new();
        m.include(400.0);
        m.include(1200.0);

        m.reset_average();
        assert_eq!(m.count(), 0);
        assert_eq!(m.total(), 0.0);
        assert_eq!(m.average(), 0.0);
        assert_eq!(m.current(), 0.0);
        assert_eq!(m.minimum(), 400.0);
        assert_eq!(m.maximum(), 1200.0);

        m.include(900.0);
        assert_eq!(m.count(), 1);
        assert_eq!(m.average(), 900.0);
        assert_eq!(m.minimum(), 400.0);
        assert_eq!(m.maximum(), 1200.0);
    }

    #[test]
    fn test_reset_average_on_fresh_measure_keeps_first_flag() {
        // Nothing has been included yet, so the next reading still seeds extrema
        let mut m = Measure::new();
        m.reset_average();
        m.include(750.0);

        assert_eq!(m.minimum(), 750.0);
        assert_eq!(m.maximum(), 750.0);
    }

    #[test]
    fn test_reset_average_extends_old_extrema() {
        let mut m = Measure::new();
        m.include(500.0);
        m.include(600.0);
        m.reset_average();

        m.include(300.0);
        m.include(700.0);

        assert_eq!(m.minimum(), 300.0);
        assert_eq!(m.maximum(), 700.0);
        assert_eq!(m.average(), 500.0);
        assert_eq!(m.count(), 2);
    }

    #[test]
    fn test_long_run_mean_stays_exact() {
        // Three months of samples at a 40 s cadence
        let mut m = Measure::new();
        for i in 0..200_000 {
            m.include(if i % 2 == 0 { 813.0 } else { 815.0 });
        }

        assert_eq!(m.count(), 200_000);
        assert_eq!(m.total(), 162_800_000.0);
        assert_eq!(m.average(), 814.0);
        assert!(m.average() <= f64::from(m.maximum()));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn readings() -> impl Strategy<Value = Vec<f32>> {
            proptest::collection::vec(-1000.0f32..40_000.0, 1..200)
        }

        proptest! {
            #[test]
            fn extrema_bound_every_reading(values in readings()) {
                let mut m = Measure::new();
                for v in &values {
                    m.include(*v);
                }

                for v in &values {
                    prop_assert!(m.minimum() <= *v && *v <= m.maximum());
                }
                prop_assert!(values.contains(&m.minimum()));
                prop_assert!(values.contains(&m.maximum()));
                prop_assert_eq!(m.current(), values[values.len() - 1]);
            }

            #[test]
            fn average_is_the_mean(values in readings()) {
                let mut m = Measure::new();
                for v in &values {
                    m.include(*v);
                }

                let mean = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;
                prop_assert_eq!(m.count() as usize, values.len());
                prop_assert!((m.average() - mean).abs() < 1e-6);
                prop_assert!(f64::from(m.minimum()) <= m.average());
                prop_assert!(m.average() <= f64::from(m.maximum()));
            }

            #[test]
            fn clear_forgets_everything(before in readings(), after in readings()) {
                let mut m = Measure::new();
                for v in &before {
                    m.include(*v);
                }
                m.clear();

                let mut fresh = Measure::new();
                for v in &after {
                    m.include(*v);
                    fresh.include(*v);
                }
                prop_assert_eq!(m, fresh);
            }

            #[test]
            fn reset_average_keeps_extrema(before in readings(), after in readings()) {
                let mut m = Measure::new();
                for v in &before {
                    m.include(*v);
                }
                let (low, high) = (m.minimum(), m.maximum());
                m.reset_average();

                let mut window = Measure::new();
                for v in &after {
                    m.include(*v);
                    window.include(*v);
                }

                prop_assert_eq!(m.count(), window.count());
                prop_assert_eq!(m.total(), window.total());
                prop_assert_eq!(m.minimum(), low.min(window.minimum()));
                prop_assert_eq!(m.maximum(), high.max(window.maximum()));
            }
        }
    }
}
