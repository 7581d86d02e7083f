#[tokio::main]
async fn main() {
    if let Err(e) = multichat_lib::run().await {
        eprintln!("multichat: {}", e);
        std::process::exit(1);
    }
}
