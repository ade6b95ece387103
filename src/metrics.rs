use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Counters shared by the views. Each instance owns its registry.
pub struct ViewMetrics {
    registry: Registry,
    api_requests: IntCounterVec,
    rejected_quantities: IntCounter,
}

impl ViewMetrics {
    pub fn new() -> Result<ViewMetrics, prometheus::Error> {
        let registry = Registry::new();

        let api_requests = IntCounterVec::new(
            Opts::new("gas_views_api_requests_total", "Backend API requests issued by the views"),
            &["endpoint", "outcome"],
        )?;
        let rejected_quantities = IntCounter::with_opts(Opts::new(
            "gas_views_rejected_quantities_total",
            "Quantity inputs rejected before any request was issued",
        ))?;

        registry.register(Box::new(api_requests.clone()))?;
        registry.register(Box::new(rejected_quantities.clone()))?;

        Ok(ViewMetrics {
            registry,
            api_requests,
            rejected_quantities,
        })
    }

    pub fn record_request(&self, endpoint: &str, outcome: Outcome) {
        self.api_requests
            .with_label_values(&[endpoint, outcome.label()])
            .inc();
    }

    pub fn record_rejected_quantity(&self) {
        self.rejected_quantities.inc();
    }

    pub fn requests(&self, endpoint: &str, outcome: Outcome) -> u64 {
        self.api_requests
            .with_label_values(&[endpoint, outcome.label()])
            .get()
    }

    pub fn rejected_quantities(&self) -> u64 {
        self.rejected_quantities.get()
    }

    /// Prometheus text exposition of every counter.
    pub fn render(&self) -> String {
        let mut buffer = vec![];
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            event!(Level::WARN, "Error occurred while encoding metrics: {}", e);
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_exposition() {
        let metrics = ViewMetrics::new().unwrap();
        metrics.record_request("/api/lotti", Outcome::Success);
        metrics.record_request("/api/lotti", Outcome::Success);
        metrics.record_rejected_quantity();

        assert_eq!(metrics.requests("/api/lotti", Outcome::Success), 2);
        assert_eq!(metrics.requests("/api/lotti", Outcome::Failure), 0);

        let text = metrics.render();
        assert!(text.contains(r#"gas_views_api_requests_total{endpoint="/api/lotti",outcome="success"} 2"#));
        assert!(text.contains("gas_views_rejected_quantities_total 1"));
    }
}
