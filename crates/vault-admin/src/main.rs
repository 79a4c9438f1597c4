#[tokio::main]
async fn main() {
    vault_admin::main().await;
}
