//! Common types for metrics definitions.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Gauge => "Gauge",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

/// Resolves a counter handle from a [`MetricDef`], forwarding any labels.
///
/// `counter!(UPSTREAM_LOOKUPS, "provider" => name).increment(1);`
#[macro_export]
macro_rules! counter {
    ($def:expr $(, $($labels:tt)*)?) => {
        metrics::counter!($def.name $(, $($labels)*)?)
    };
}

#[macro_export]
macro_rules! gauge {
    ($def:expr $(, $($labels:tt)*)?) => {
        metrics::gauge!($def.name $(, $($labels)*)?)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $($labels:tt)*)?) => {
        metrics::histogram!($def.name $(, $($labels)*)?)
    };
}
