use std::net::SocketAddr;

use crate::engine::EngineError;

// ── Allocation metrics ──────────────────────────────────────────

/// Counter: reserve calls. Labels: outcome (assigned, no_capacity, rejected).
pub const RESERVATIONS_TOTAL: &str = "roomalloc_reservations_total";

/// Histogram: reserve latency in seconds, lock wait included.
pub const RESERVE_DURATION_SECONDS: &str = "roomalloc_reserve_duration_seconds";

/// Counter: release calls. Labels: outcome (freed, not_found).
pub const RELEASES_TOTAL: &str = "roomalloc_releases_total";

/// Counter: sessions whose group classroom was taken and got another one.
pub const GROUP_CONFLICTS_TOTAL: &str = "roomalloc_group_conflicts_total";

// ── State gauges ────────────────────────────────────────────────

/// Gauge: location keys known to an engine.
pub const LOCATIONS_ACTIVE: &str = "roomalloc_locations_active";

/// Gauge: number of active tenants (loaded engines).
pub const TENANTS_ACTIVE: &str = "roomalloc_tenants_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a reserve result to a short label for metrics.
pub fn reserve_outcome_label(result: &Result<Option<u32>, EngineError>) -> &'static str {
    match result {
        Ok(Some(_)) => "assigned",
        Ok(None) => "no_capacity",
        Err(_) => "rejected",
    }
}
