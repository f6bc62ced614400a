use dnsprep::{
    app::{App, AppConfig},
    backend::{resolve::SystemResolver, windows::WindowsBackend},
    cli,
    logging::{self, NullSink, WindowsEventLog},
};
use std::{env, process::ExitCode};

#[tokio::main]
async fn main() -> ExitCode {
    let argv: Vec<String> = env::args().collect();
    let mut config = AppConfig::default();
    config.event_source =
        logging::event_source_name(argv.first().map(String::as_str), &config.event_source);

    if cfg!(windows) {
        logging::init(WindowsEventLog::new(config.event_source.clone()));
    } else {
        logging::init(NullSink);
    }

    let app = App::new(config, WindowsBackend::new(), SystemResolver::new());
    ExitCode::from(cli::run(argv, &app).await)
}
