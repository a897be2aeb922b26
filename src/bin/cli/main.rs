use std::process::exit;

use anyhow::Result;
use dotenvy::dotenv;

mod command_parser;
mod server;

use folio::{
    config::Config,
    controller::{SearchController, SearchSettings},
    logging,
    openlibrary::OpenLibrary,
    traits::DisplayTerminal,
};

async fn search(config: &Config, name: &str) -> Result<()> {
    // Covers are only useful to the web page.
    let settings = SearchSettings {
        cover_size: None,
        ..SearchSettings::from_config(config)
    };
    let controller = SearchController::new(OpenLibrary::from_config(config)?, settings);
    controller.search(name).await.await?;

    let state = controller.state().read().await;
    if !state.error.is_empty() {
        eprintln!("{}", config.output_error.format_str(&state.error));
        exit(1);
    }
    if state.results.is_empty() {
        println!("No books found for {:?}.", state.query);
    }
    for book in &state.results {
        println!("{}\n", book.fmt_to_string(config)?);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = command_parser::arg_parser().get_matches();

    dotenv().ok();
    logging::init()?;
    let mut config = Config::read_config()?;

    match args.subcommand() {
        Some(("serve", matches)) => {
            if let Some(port) = matches.get_one::<u16>("port") {
                config.port = *port;
            }
            server::start(&config).await?;
        }
        Some(("search", matches)) => {
            let name = matches
                .get_many::<String>("name")
                .map(|x| x.cloned().collect::<Vec<String>>())
                .unwrap_or_default()
                .join(" ");
            search(&config, &name).await?;
        }
        Some(("config", _)) => {
            print!("{}", Config::default_as_string()?);
        }
        Some((name, _)) => unimplemented!("{}", name),
        None => unreachable!("subcommand required"),
    }

    Ok(())
}
