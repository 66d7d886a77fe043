#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lexideck_backend::run().await
}
