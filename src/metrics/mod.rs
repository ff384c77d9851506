use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Intake queue consumption (received, completed, dead-lettered, dropped,
//   ignored, handler faults, transport errors)
// - Handler latency per topic
// - Proximity queries by outcome
//
// Scraped via GET /metrics on the HTTP server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Queue Metrics
    pub messages_received: IntCounter,
    pub messages_completed: IntCounterVec,
    pub messages_dead_lettered: IntCounterVec,
    pub messages_dropped: IntCounter,
    pub messages_ignored: IntCounter,
    pub transport_errors: IntCounter,
    pub handler_faults: IntCounter,
    pub handler_duration: HistogramVec,

    // Query Metrics
    pub proximity_queries: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let messages_received = IntCounter::new(
            "intake_messages_received_total",
            "Total messages received from the intake queue",
        )?;
        registry.register(Box::new(messages_received.clone()))?;

        let messages_completed = IntCounterVec::new(
            Opts::new("intake_messages_completed_total", "Messages handled and acknowledged"),
            &["topic"],
        )?;
        registry.register(Box::new(messages_completed.clone()))?;

        let messages_dead_lettered = IntCounterVec::new(
            Opts::new("intake_messages_dead_lettered_total", "Messages moved to the dead-letter queue"),
            &["topic"],
        )?;
        registry.register(Box::new(messages_dead_lettered.clone()))?;

        let messages_dropped = IntCounter::new(
            "intake_messages_dropped_total",
            "Undecodable messages dropped without dead-lettering",
        )?;
        registry.register(Box::new(messages_dropped.clone()))?;

        let messages_ignored = IntCounter::new(
            "intake_messages_ignored_total",
            "Messages with no registered topic, acknowledged without handling",
        )?;
        registry.register(Box::new(messages_ignored.clone()))?;

        let transport_errors = IntCounter::new(
            "intake_transport_errors_total",
            "Errors raised by the queue transport while receiving",
        )?;
        registry.register(Box::new(transport_errors.clone()))?;

        let handler_faults = IntCounter::new(
            "intake_handler_faults_total",
            "Faults re-raised by message processing after dead-lettering",
        )?;
        registry.register(Box::new(handler_faults.clone()))?;

        let handler_duration = HistogramVec::new(
            HistogramOpts::new("intake_handler_duration_seconds", "Command handler duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["topic"],
        )?;
        registry.register(Box::new(handler_duration.clone()))?;

        let proximity_queries = IntCounterVec::new(
            Opts::new("proximity_queries_total", "Events-by-location queries by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(proximity_queries.clone()))?;

        Ok(Self {
            registry,
            messages_received,
            messages_completed,
            messages_dead_lettered,
            messages_dropped,
            messages_ignored,
            transport_errors,
            handler_faults,
            handler_duration,
            proximity_queries,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_completed(&self, topic: &str, duration_secs: f64) {
        self.messages_completed.with_label_values(&[topic]).inc();
        self.handler_duration.with_label_values(&[topic]).observe(duration_secs);
    }

    pub fn record_dead_letter(&self, topic: &str, duration_secs: f64) {
        self.messages_dead_lettered.with_label_values(&[topic]).inc();
        self.handler_duration.with_label_values(&[topic]).observe(duration_secs);
    }

    pub fn record_query(&self, outcome: &str) {
        self.proximity_queries.with_label_values(&[outcome]).inc();
    }
}
