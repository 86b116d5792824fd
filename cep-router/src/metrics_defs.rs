use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Lookup request duration in seconds. Tagged with status.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of lookup requests currently being processed",
};

pub const UPSTREAM_LOOKUPS: MetricDef = MetricDef {
    name: "upstream.lookups",
    metric_type: MetricType::Counter,
    description: "Completed upstream lookups. Tagged with provider, result.",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, REQUESTS_INFLIGHT, UPSTREAM_LOOKUPS];
