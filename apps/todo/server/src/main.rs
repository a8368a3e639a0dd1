#[tokio::main]
async fn main() -> eyre::Result<()> {
    todo_server::run().await
}
