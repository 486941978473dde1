//! Bounded trailing-window storage for streaming transforms.

use crate::series::record::TimeRecord;

/// Retains the trailing portion of a sample stream.
///
/// A record survives eviction while it is one of the `max_len` most recent
/// samples OR within `max_span` time units of the newest sample. The two
/// bounds cover the two kinds of history consumers: count-windowed
/// transforms (derivative order, orthogonal window) and time-windowed ones
/// (the causal Gaussian cutoff). Eviction cost is bounded by the window
/// size, so a push is O(window) worst case and O(1) amortized.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    records: Vec<TimeRecord>,
    max_len: usize,
    max_span: f64,
}

impl SampleWindow {
    pub fn new(max_len: usize, max_span: f64) -> Self {
        Self {
            records: Vec::new(),
            max_len: max_len.max(1),
            max_span: max_span.max(0.0),
        }
    }

    pub fn push(&mut self, record: TimeRecord) {
        self.records.push(record);
        let newest = self.records[self.records.len() - 1].time;
        while self.records.len() > self.max_len
            && newest - self.records[0].time > self.max_span
        {
            self.records.remove(0);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TimeRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&TimeRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(time: f64) -> TimeRecord {
        TimeRecord::new(time, 0, vec![time])
    }

    #[test]
    fn evicts_only_past_both_bounds() {
        let mut window = SampleWindow::new(3, 10.0);
        for i in 0..6 {
            window.push(rec(i as f64));
        }
        // All six are within the 10.0 span even though max_len is 3.
        assert_eq!(window.len(), 6);

        window.push(rec(100.0));
        // Eviction stops once the count bound is met again.
        assert_eq!(window.len(), 3);
        assert_eq!(window.records()[0].time, 4.0);
    }

    #[test]
    fn count_bound_alone_keeps_records() {
        let mut window = SampleWindow::new(2, 0.0);
        for i in 0..5 {
            window.push(rec(i as f64));
        }
        assert_eq!(window.len(), 2);
        assert_eq!(window.latest().unwrap().time, 4.0);
    }
}
