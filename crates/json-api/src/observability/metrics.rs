//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use storefront_app::domain::{
    orders::{
        OrderPlacementError,
        data::OrderConfirmation,
        observer::{CompensationFailure, PlacementObserver},
    },
    products::records::ProductUuid,
};
use tracing::error;

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    orders_placed_total: IntCounter,
    order_placements_failed_total: IntCounterVec,
    order_compensations_failed_total: IntCounter,
    order_missing_products_total: IntCounter,
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

/// Feeds order placement outcomes into the Prometheus registry.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OrderMetricsObserver;

impl PlacementObserver for OrderMetricsObserver {
    fn on_missing_product(&self, _product: ProductUuid) {
        if let Some(metrics) = metrics() {
            metrics.order_missing_products_total.inc();
        }
    }

    fn on_compensation_failed(&self, _failure: &CompensationFailure) {
        if let Some(metrics) = metrics() {
            metrics.order_compensations_failed_total.inc();
        }
    }

    fn on_committed(&self, _confirmation: &OrderConfirmation) {
        if let Some(metrics) = metrics() {
            metrics.orders_placed_total.inc();
        }
    }

    fn on_failed(&self, error: &OrderPlacementError) {
        if let Some(metrics) = metrics() {
            metrics
                .order_placements_failed_total
                .with_label_values(&[error.reason()])
                .inc();
        }
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
    METRICS
        .get_or_init(|| {
            build_metrics()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

fn register<M>(registry: &Registry, metric: M) -> prometheus::Result<M>
where
    M: Collector + Clone + 'static,
{
    registry.register(Box::new(metric.clone()))?;

    Ok(metric)
}

fn build_metrics() -> prometheus::Result<Metrics> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "storefront_json_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        )?,
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new(
                "storefront_json_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        )?,
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::with_opts(Opts::new(
            "storefront_json_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        ))?,
    )?;

    let orders_placed_total = register(
        &registry,
        IntCounter::with_opts(Opts::new(
            "storefront_json_orders_placed_total",
            "Orders committed to the ledger.",
        ))?,
    )?;

    let order_placements_failed_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "storefront_json_order_placements_failed_total",
                "Order placements that ended in failure, partitioned by reason.",
            ),
            &["reason"],
        )?,
    )?;

    let order_compensations_failed_total = register(
        &registry,
        IntCounter::with_opts(Opts::new(
            "storefront_json_order_compensations_failed_total",
            "Restocks during order rollback that did not succeed.",
        ))?,
    )?;

    let order_missing_products_total = register(
        &registry,
        IntCounter::with_opts(Opts::new(
            "storefront_json_order_missing_products_total",
            "Cart lines naming products that were not found while reserving stock.",
        ))?,
    )?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        orders_placed_total,
        order_placements_failed_total,
        order_compensations_failed_total,
        order_missing_products_total,
    })
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
