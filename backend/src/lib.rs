extern crate dashboard_frontend;
extern crate env_logger;
extern crate log;
extern crate serde_json;

pub mod config;
pub mod file_store;
pub mod http;
pub mod terminal;

use std::io::Write;

pub fn init_logger() {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

/// Startup failures of the terminal dashboard.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("could not build http client: {0}")]
    HttpClient(String),

    #[error("could not read input: {0}")]
    Input(#[from] std::io::Error),
}
