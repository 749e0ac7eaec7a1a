//! Observability: Prometheus metrics (feature `metrics`) and tracing spans (feature `tracing`).

#[cfg(feature = "metrics")]
pub use prometheus_metrics::{SommyMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Encoder, Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<SommyMetrics> = Lazy::new(SommyMetrics::init);

    pub struct SommyMetrics {
        pub registry: Registry,
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
        pub connect_duration: Histogram<f64>,
        _provider: SdkMeterProvider,
    }

    impl SommyMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let mut builder = SdkMeterProvider::builder();
            match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => builder = builder.with_reader(exporter),
                Err(e) => log::warn!("Prometheus exporter unavailable, metrics will not be exported: {e}"),
            }
            let provider = builder.build();
            let meter = provider.meter("sommy");

            let queries_total = meter
                .u64_counter("sommy_queries_total")
                .with_description("Total statements executed")
                .build();

            let query_errors_total = meter
                .u64_counter("sommy_query_errors_total")
                .with_description("Statements that failed in the driver")
                .build();

            let query_duration = meter
                .f64_histogram("sommy_query_duration_seconds")
                .with_description("Duration of statements")
                .build();

            let connect_duration = meter
                .f64_histogram("sommy_connect_duration_seconds")
                .with_description("Time spent opening a connection")
                .build();

            Self {
                registry,
                queries_total,
                query_errors_total,
                query_duration,
                connect_duration,
                _provider: provider,
            }
        }

        pub fn record_query(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        pub fn record_connect(&self, elapsed: Duration) {
            self.connect_duration.record(elapsed.as_secs_f64(), &[]);
        }

        /// Prometheus text exposition of everything recorded so far.
        pub fn render(&self) -> Result<String, prometheus::Error> {
            let mut buffer = Vec::new();
            TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    pub fn connect_span(dialect: &str) -> Span {
        info_span!("sommy.connect", dialect = dialect)
    }

    pub fn execute_query_span(sql: &str) -> Span {
        info_span!("sommy.execute", sql = sql)
    }

    pub fn begin_transaction_span() -> Span {
        info_span!("sommy.transaction.begin")
    }

    pub fn commit_transaction_span() -> Span {
        info_span!("sommy.transaction.commit")
    }

    pub fn rollback_transaction_span() -> Span {
        info_span!("sommy.transaction.rollback")
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        struct SpanNames(Arc<Mutex<Vec<String>>>);

        impl<S: tracing::Subscriber> Layer<S> for SpanNames {
            fn on_new_span(
                &self,
                attrs: &tracing::span::Attributes<'_>,
                _id: &tracing::span::Id,
                _ctx: Context<'_, S>,
            ) {
                self.0.lock().unwrap().push(attrs.metadata().name().to_string());
            }
        }

        #[test]
        fn test_spans_are_named() {
            let names = Arc::new(Mutex::new(Vec::new()));
            let subscriber = tracing_subscriber::registry().with(SpanNames(names.clone()));
            tracing::subscriber::with_default(subscriber, || {
                let _connect = connect_span("sqlite").entered();
                let _query = execute_query_span("SELECT 1").entered();
                let _begin = begin_transaction_span().entered();
            });
            assert_eq!(
                *names.lock().unwrap(),
                vec!["sommy.connect", "sommy.execute", "sommy.transaction.begin"]
            );
        }
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::METRICS;
    use std::time::Duration;

    #[test]
    fn test_recording_does_not_panic() {
        METRICS.record_query(Duration::from_millis(3));
        METRICS.record_query_error();
        METRICS.record_connect(Duration::from_millis(1));
        assert!(METRICS.render().is_ok());
    }
}
