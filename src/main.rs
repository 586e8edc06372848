#[tokio::main]
async fn main() -> anyhow::Result<()> {
    media_relay_lib::run().await
}
