#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = name_enricher::run_server().await {
        log::error!("Server failed: {:#}", e);
        name_enricher::logging::flush();
        return Err(e);
    }
    Ok(())
}
