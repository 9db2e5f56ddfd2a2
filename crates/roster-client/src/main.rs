#[tokio::main]
async fn main() -> anyhow::Result<()> {
    roster_client_lib::run().await
}
