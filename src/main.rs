use knowledge_desk::config::AppConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("configuration error: {err:#}");
            std::process::exit(1);
        }
    };
    tracing::info!(api_url = %config.api_url, start = config.start_route.path(), "starting");

    dioxus::LaunchBuilder::new()
        .with_context(config)
        .launch(knowledge_desk::ui::App);
}
