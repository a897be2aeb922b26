use clap::{value_parser, Arg, Command};

pub fn arg_parser() -> Command {
    Command::new("folio")
        .about("Search the Open Library catalog")
        .subcommand_required(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the search page")
                .arg(
                    Arg::new("port")
                        .long("port")
                        .short('p')
                        .help("Port to listen on, overrides the configured one")
                        .value_parser(value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search once and print the results")
                .arg(
                    Arg::new("name")
                        .help("Title (or free text, depending on search_mode) to look for")
                        .required(true)
                        .num_args(1..),
                ),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
}
