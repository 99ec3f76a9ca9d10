use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use roomalloc::plan;
use roomalloc::tenant::TenantManager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let metrics_port: Option<u16> = std::env::var("ROOMALLOC_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    roomalloc::observability::init(metrics_port)?;

    let plan_path: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ROOMALLOC_PLAN").ok())
        .ok_or("usage: roomalloc <plan.json> (or set ROOMALLOC_PLAN)")?
        .into();
    let default_tenant = std::env::var("ROOMALLOC_TENANT").unwrap_or_else(|_| "default".into());

    let raw = std::fs::read_to_string(&plan_path)?;
    let plan = plan::parse(&raw)?;
    let tenant = plan.tenant.clone().unwrap_or(default_tenant);

    let tenants = TenantManager::new();
    let engine = tenants.get_or_create(&tenant)?;

    info!("replaying {} ops from {}", plan.ops.len(), plan_path.display());
    info!("  tenant: {tenant}");
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let report = plan::run(&engine, &plan).await;
    info!(
        assigned = report.assigned,
        no_capacity = report.no_capacity,
        rejected = report.rejected,
        "replay finished"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
