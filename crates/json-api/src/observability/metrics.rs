//! Prometheus metrics collection and exposition endpoint.

use std::{sync::OnceLock, time::Duration};

use dryci_app::pipeline::{FlushOutcome, PipelineObserver};
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder, core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const LATENCY_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    intents_enqueued_total: IntCounter,
    flushes_total: IntCounterVec,
    intents_flushed_total: IntCounterVec,
    flush_duration_seconds: Histogram,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        if let Some(metrics) = metrics() {
            metrics.requests_in_flight.inc();
            return Self { tracked: true };
        }

        Self { tracked: false }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Exports write pipeline activity to the process registry.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PrometheusPipelineObserver;

impl PipelineObserver for PrometheusPipelineObserver {
    fn intents_enqueued(&self, count: usize) {
        let Some(metrics) = metrics() else {
            return;
        };

        metrics.intents_enqueued_total.inc_by(widen(count));
    }

    fn flush_completed(&self, outcome: FlushOutcome, intents: usize, elapsed: Duration) {
        let Some(metrics) = metrics() else {
            return;
        };

        let outcome = outcome.as_str();

        metrics.flushes_total.with_label_values(&[outcome]).inc();
        metrics
            .intents_flushed_total
            .with_label_values(&[outcome])
            .inc_by(widen(intents));
        metrics
            .flush_duration_seconds
            .observe(elapsed.as_secs_f64());
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn build_metrics() -> Option<Metrics> {
    match try_build_metrics() {
        Ok(metrics) => Some(metrics),
        Err(source) => {
            error!("failed to set up prometheus metrics: {source}");
            None
        }
    }
}

fn try_build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "dryci_json_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        )?,
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new(
                "dryci_json_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["method", "route"],
        )?,
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::with_opts(Opts::new(
            "dryci_json_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        ))?,
    )?;

    let intents_enqueued_total = register(
        &registry,
        IntCounter::with_opts(Opts::new(
            "dryci_pipeline_intents_enqueued_total",
            "Intents accepted into the write pipeline queue.",
        ))?,
    )?;

    let flushes_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "dryci_pipeline_flushes_total",
                "Batch transactions partitioned by outcome.",
            ),
            &["outcome"],
        )?,
    )?;

    let intents_flushed_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "dryci_pipeline_intents_flushed_total",
                "Intents drained from the queue partitioned by the outcome of their batch.",
            ),
            &["outcome"],
        )?,
    )?;

    let flush_duration_seconds = register(
        &registry,
        Histogram::with_opts(
            HistogramOpts::new(
                "dryci_pipeline_flush_duration_seconds",
                "Time spent applying one batch transaction.",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )?,
    )?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        intents_enqueued_total,
        flushes_total,
        intents_flushed_total,
        flush_duration_seconds,
    })
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

fn widen(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
