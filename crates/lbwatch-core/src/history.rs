//! Fixed-capacity rolling window of metric samples.

/// Number of samples kept by [`MetricHistory`].
pub const HISTORY_CAPACITY: usize = 20;

/// Most recent samples of one metric, oldest first.
///
/// Samples carry no timestamp; arrival order is the only order. Pushing past
/// [`HISTORY_CAPACITY`] evicts from the front. There is no other removal
/// besides [`reset`](MetricHistory::reset).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricHistory {
    samples: Vec<f64>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the window with `sample` appended and the oldest entries
    /// dropped beyond capacity.
    #[must_use]
    pub fn push(mut self, sample: f64) -> Self {
        self.samples.push(sample);
        if self.samples.len() > HISTORY_CAPACITY {
            let excess = self.samples.len() - HISTORY_CAPACITY;
            self.samples.drain(..excess);
        }
        self
    }

    /// Returns an empty window.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }
}

impl FromIterator<f64> for MetricHistory {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), MetricHistory::push)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity_keeps_everything() {
        let history: MetricHistory = (1..=20).map(f64::from).collect();
        assert_eq!(history.len(), 20);
        assert_eq!(history.as_slice()[0], 1.0);
        assert_eq!(history.latest(), Some(20.0));
    }

    #[test]
    fn test_push_past_capacity_evicts_oldest() {
        let history: MetricHistory = (1..=23).map(f64::from).collect();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let expected: Vec<f64> = (4..=23).map(f64::from).collect();
        assert_eq!(history.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_twenty_five_ticks_keep_ticks_six_through_twenty_five() {
        let values: Vec<f64> = (0..25).map(|i| 100.0 + (i as f64) * 10.0).collect();
        let mut history = MetricHistory::new();
        for v in &values {
            history = history.push(*v);
        }
        assert_eq!(history.as_slice(), &values[5..]);
    }

    #[test]
    fn test_reset_empties() {
        let history = MetricHistory::new().push(1.0).push(2.0).reset();
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn test_push_is_functional() {
        let before = MetricHistory::new().push(1.0);
        let after = before.clone().push(2.0);
        assert_eq!(before.as_slice(), &[1.0]);
        assert_eq!(after.as_slice(), &[1.0, 2.0]);
    }
}
