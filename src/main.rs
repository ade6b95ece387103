use std::{
    fs::File,
    process::ExitCode,
    sync::{Arc, Mutex},
};

use gas_views::{
    api::ReqwestApiClient,
    cli::{self, Command},
    config::Config,
    metrics::ViewMetrics,
    notifier::TerminalNotifier,
    state::AppState,
};
use tracing::{event, Level};

fn init_tracing(config: &Config) -> Result<(), std::io::Error> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(false)
        .with_ansi(false)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_current_span(true);

    match &config.log_path {
        Some(path) => builder.with_writer(Mutex::new(File::create(path)?)).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to open log file: {}", e);
        return ExitCode::FAILURE;
    }

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let api = match ReqwestApiClient::new(&config.api) {
        Ok(api) => api,
        Err(e) => {
            event!(Level::ERROR, "Failed to create API client: {}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let metrics = match ViewMetrics::new() {
        Ok(metrics) => metrics,
        Err(e) => {
            event!(Level::ERROR, "Failed to register metrics: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = AppState {
        api: Arc::new(api),
        notifier: Arc::new(TerminalNotifier::new(command.assume_yes())),
        metrics: Arc::new(metrics),
        static_images_path: config.static_images_path.clone(),
    };

    let result = cli::run(&command, &state).await;
    event!(Level::DEBUG, "metrics:\n{}", state.metrics.render());

    match result {
        Ok(markup) => {
            println!("{}", markup.into_string());
            ExitCode::SUCCESS
        }
        Err(e) => {
            event!(Level::WARN, "Command {:?} failed: {}", command, e);
            ExitCode::FAILURE
        }
    }
}
