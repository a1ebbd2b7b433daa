#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = studyline_attempts::run().await {
        eprintln!("studyline-attempts fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
