//! Cheap total-average reads: serve a remembered value most of the time and
//! only recompute it from the stored costs every few calls.

use crate::schemas::Cost;

/// Cached serves between two recomputations.
pub const REFRESH_INTERVAL: u32 = 5;

/// Counter-gated cache for the total expenses average.
///
/// There is exactly one of these per process, so the remembered value is
/// shared across every user: a recompute triggered for one user becomes the
/// answer served to all of them until the next recompute. The counter starts
/// at the interval so the very first call always computes a fresh value.
#[derive(Debug)]
pub struct ApproximateAverage {
    serves_since_refresh: u32,
    cached: f64,
}

impl ApproximateAverage {
    pub fn new() -> Self {
        ApproximateAverage {
            serves_since_refresh: REFRESH_INTERVAL,
            cached: 0.0,
        }
    }

    /// Answer from the cache, or report that a recompute is due.
    ///
    /// `None` means the caller must fetch the costs, compute the mean and
    /// hand it to [`refresh`](Self::refresh). The counter is left untouched
    /// until then, so calls arriving in the meantime also see a recompute as
    /// due and recompute as well.
    pub fn poll(&mut self) -> Option<f64> {
        if self.serves_since_refresh == REFRESH_INTERVAL {
            None
        } else {
            self.serves_since_refresh += 1;
            Some(self.cached)
        }
    }

    /// Store a freshly computed mean and restart the serve counter.
    pub fn refresh(&mut self, average: f64) -> f64 {
        self.serves_since_refresh = 0;
        self.cached = average;
        average
    }
}

impl Default for ApproximateAverage {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic mean of the costs' sums, 0.0 when there are none.
pub fn average_sum(costs: &[Cost]) -> f64 {
    if costs.is_empty() {
        return 0.0;
    }
    let total: f64 = costs.iter().map(|cost| cost.sum).sum();
    total / costs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cost(sum: f64) -> Cost {
        Cost {
            id: None,
            description: "test".into(),
            sum,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            category: "misc".into(),
            user_id: "123".into(),
        }
    }

    #[test]
    fn first_call_always_recomputes() {
        let mut cache = ApproximateAverage::new();
        assert_eq!(cache.poll(), None);
    }

    #[test]
    fn serves_the_stored_value_five_times_then_recomputes() {
        let mut cache = ApproximateAverage::new();

        // Call 1: recompute from [10, 20, 30].
        assert_eq!(cache.poll(), None);
        let fresh = cache.refresh(average_sum(&[cost(10.0), cost(20.0), cost(30.0)]));
        assert_eq!(fresh, 20.0);

        // Calls 2-6 come back from the cache, whatever was stored meanwhile.
        for _ in 0..REFRESH_INTERVAL {
            assert_eq!(cache.poll(), Some(20.0));
        }

        // Call 7 is due for a recompute again.
        assert_eq!(cache.poll(), None);
    }

    #[test]
    fn refresh_replaces_the_cached_value() {
        let mut cache = ApproximateAverage::new();
        cache.refresh(20.0);
        for _ in 0..REFRESH_INTERVAL {
            cache.poll();
        }
        cache.refresh(77.5);
        assert_eq!(cache.poll(), Some(77.5));
    }

    #[test]
    fn mean_of_no_costs_is_zero() {
        assert_eq!(average_sum(&[]), 0.0);
    }

    #[test]
    fn mean_is_the_plain_arithmetic_mean() {
        let costs = [cost(1.5), cost(2.5), cost(8.0)];
        assert_eq!(average_sum(&costs), 4.0);
    }
}
