//! Thin wrapper around `prometheus`, matching the shape `electrs::metrics`
//! exposes to `new_index::Mempool` (`histogram_vec`/`gauge_vec` helpers that
//! register-and-return rather than making every call site touch the
//! registry directly).

use prometheus::{Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};

/// Namespacing helper: every call site wants a plain `Opts`, never the
/// distinct `MetricOpts` marker type some `electrs`-family forks wrap it in.
pub struct MetricOpts;

impl MetricOpts {
    pub fn new(name: &str, help: &str) -> Opts {
        Opts::new(name, help)
    }
}

pub struct Metrics {
    reg: Registry,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            reg: Registry::new(),
        }
    }

    pub fn histogram_vec(&self, opts: HistogramOpts, labels: &[&str]) -> HistogramVec {
        let hist = HistogramVec::new(opts, labels).expect("failed to create histogram");
        self.reg
            .register(Box::new(hist.clone()))
            .expect("failed to register histogram");
        hist
    }

    pub fn gauge_vec(&self, opts: Opts, labels: &[&str]) -> GaugeVec {
        let gauge = GaugeVec::new(opts, labels).expect("failed to create gauge");
        self.reg
            .register(Box::new(gauge.clone()))
            .expect("failed to register gauge");
        gauge
    }

    pub fn gauge(&self, opts: Opts) -> Gauge {
        let gauge = Gauge::with_opts(opts).expect("failed to create gauge");
        self.reg
            .register(Box::new(gauge.clone()))
            .expect("failed to register gauge");
        gauge
    }

    pub fn registry(&self) -> &Registry {
        &self.reg
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
