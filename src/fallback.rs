//! Deterministic fallback values for inapplicable metrics.
//!
//! Every calculator that cannot compute its metric for real still has to
//! return something; the generator draws a plausible value from the metric's
//! preconfigured range using a seeded RNG, so repeated runs under the same
//! seed reproduce identical fallbacks.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::metric::{round2, Metric, ValueShape};

/// Seeded source of plausible stand-in values, one per metric request.
///
/// Draw order matters: the generator advances its RNG on every call, so the
/// engine creates a fresh one per `compute` invocation and consumes it in a
/// fixed metric order.
#[derive(Debug)]
pub struct FallbackGenerator {
    rng: StdRng,
}

impl FallbackGenerator {
    /// Create a generator from an engine seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a fallback value for the given metric.
    ///
    /// The value lands inside the metric's `(low, high)` range and is shaped
    /// per the metric contract: counts truncate to integers, the aggregate
    /// score rounds to the nearest integer, everything else rounds to two
    /// decimals.
    pub fn draw(&mut self, metric: Metric) -> f64 {
        let (low, high) = metric.fallback_range();
        let raw = self.rng.gen_range(low..high);
        match metric.shape() {
            ValueShape::Count => raw.trunc(),
            ValueShape::Score => raw.round(),
            ValueShape::TwoDecimal => round2(raw),
        }
    }
}
