#[tokio::main]
async fn main() {
    frequency::start_server().await;
}
