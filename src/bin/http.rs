#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use fleet_scheduler::{http_api, SchedulingEngine};

    tracing_subscriber::fmt::init();

    let addr: SocketAddr = std::env::var("FLEET_SCHEDULER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    tracing::info!(%addr, "fleet-scheduler HTTP API listening");
    let engine = SchedulingEngine::new();
    http_api::serve(addr, engine).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
