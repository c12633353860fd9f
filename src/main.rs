use sqlpilot::infrastructure::config::AppConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = AppConfig::from_env();

    if let Err(err) = sqlpilot::interfaces::cli::run(config).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
