extern crate dashboard_backend;
extern crate dashboard_frontend;
extern crate log;
extern crate tokio;

use std::rc::Rc;

use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use dashboard_backend::config::Config;
use dashboard_backend::file_store::FileStore;
use dashboard_backend::http::HttpFetch;
use dashboard_backend::terminal::{parse_command, Command, Terminal, HELP};
use dashboard_backend::ShellError;
use dashboard_frontend::{Capabilities, Session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ShellError> {
    dashboard_backend::init_logger();
    let config = Config::from_env()?;
    info!("dashboard against {}", config.api_base);

    let store = FileStore::open(&config.store_path);
    info!("settings kept in {}", store.path().display());

    let terminal = Rc::new(Terminal::new(std::io::stdout()));
    let session = Session::new(
        config.session.clone(),
        Capabilities {
            fetcher: Rc::new(HttpFetch::new(&config)?),
            storage: Rc::new(store),
            render: terminal.clone(),
            notify: terminal.clone(),
        },
    );

    session.start().await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(Command::Event(event))) => session.handle(event).await,
            Ok(Some(Command::Help)) => println!("{}", HELP),
            Ok(Some(Command::Quit)) => break,
            Ok(None) => {}
            Err(err) => error!("{}", err),
        }
    }

    Ok(())
}
