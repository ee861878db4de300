//! In-memory `metrics` recorder.

use metrics::{
    Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Totals = Arc<Mutex<BTreeMap<String, u64>>>;

fn lock(totals: &Totals) -> MutexGuard<'_, BTreeMap<String, u64>> {
    totals.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sums every counter by name; labels are folded together
///
/// Gauges and histograms are accepted and dropped.
///
/// ```
/// use boxoffice_testing::CountingRecorder;
///
/// let recorder = CountingRecorder::new();
/// metrics::with_local_recorder(&recorder, || {
///     metrics::counter!("seats", "row" => "1").increment(2);
///     metrics::counter!("seats", "row" => "2").increment(1);
/// });
/// assert_eq!(recorder.counter("seats"), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CountingRecorder {
    totals: Totals,
}

impl CountingRecorder {
    /// Recorder with nothing counted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of increments to `name`, 0 if never touched
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        lock(&self.totals).get(name).copied().unwrap_or(0)
    }

    /// Names of every counter registered so far
    #[must_use]
    pub fn counters(&self) -> Vec<String> {
        lock(&self.totals).keys().cloned().collect()
    }
}

struct Tally {
    name: String,
    totals: Totals,
}

impl CounterFn for Tally {
    fn increment(&self, value: u64) {
        *lock(&self.totals).entry(self.name.clone()).or_default() += value;
    }

    fn absolute(&self, value: u64) {
        let mut totals = lock(&self.totals);
        let total = totals.entry(self.name.clone()).or_default();
        *total = (*total).max(value);
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let name = key.name().to_string();
        lock(&self.totals).entry(name.clone()).or_default();
        Counter::from_arc(Arc::new(Tally {
            name,
            totals: Arc::clone(&self.totals),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}
