//! Metric names and the worker's instruments

use std::time::{Duration, Instant};

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

pub const JOB_DURATION: &str = "job.duration";
pub const JOB_COUNT: &str = "job.count";
pub const READINESS_WAIT: &str = "backend.readiness.wait";

/// Record a duration measurement on a histogram
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}

/// Instruments recorded once per job
///
/// Created from the global meter provider, so build after telemetry init.
/// Without an exporter the instruments are no-ops.
#[derive(Clone)]
pub struct WorkerMetrics {
    job_duration: Histogram<f64>,
    job_count: Counter<u64>,
    readiness_wait: Histogram<f64>,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        let meter = global::meter("kokoro-worker");

        Self {
            job_duration: meter
                .f64_histogram(JOB_DURATION)
                .with_unit("s")
                .with_description("Wall time of a job from receipt to result")
                .build(),
            job_count: meter
                .u64_counter(JOB_COUNT)
                .with_description("Jobs processed, by outcome")
                .build(),
            readiness_wait: meter
                .f64_histogram(READINESS_WAIT)
                .with_unit("s")
                .with_description("Time spent waiting for the backend to become ready")
                .build(),
        }
    }

    /// Record a finished job; `outcome` is `completed` or an error kind
    pub fn record_job(&self, outcome: &'static str, start: Instant) {
        let attributes = [KeyValue::new("outcome", outcome)];

        self.job_count.add(1, &attributes);
        record_duration(&self.job_duration, start, &attributes);
    }

    pub fn record_readiness_wait(&self, waited: Duration, ready: bool) {
        self.readiness_wait
            .record(waited.as_secs_f64(), &[KeyValue::new("ready", ready)]);
    }
}

impl Default for WorkerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
