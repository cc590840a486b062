use anyhow::Context;
use clap::{Arg, ArgMatches};
use std::path::PathBuf;
use url::Url;

const DEFAULT_PORT: &str = "8080";

/// Command line options of the server binary
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub providers: Option<PathBuf>,
    pub port: u16,
    pub server_url: Url,
}

pub fn command() -> clap::Command {
    clap::Command::new("EntityBroker")
        .about("Resolves entity URLs against registered providers")
        .arg(
            Arg::new("providers")
                .short('p')
                .long("providers")
                .value_name("PROVIDERS")
                .help("Path to a YAML file declaring entity providers"),
        )
        .arg(
            Arg::new("port")
                .short('P')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on")
                .value_parser(clap::value_parser!(u16))
                .default_value(DEFAULT_PORT),
        )
        .arg(
            Arg::new("server_url")
                .short('s')
                .long("server-url")
                .value_name("SERVER_URL")
                .help("Public base URL used when building entity URLs"),
        )
}

impl CliArgs {
    pub fn parse() -> anyhow::Result<Self> {
        Self::from_matches(&command().get_matches())
    }

    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let providers = matches.get_one::<String>("providers").map(PathBuf::from);
        let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

        let server_url = match matches.get_one::<String>("server_url") {
            Some(url) => Url::parse(url).with_context(|| format!("Invalid server URL: {}", url))?,
            None => Url::parse(&format!("http://localhost:{}", port))?,
        };

        Ok(Self {
            providers,
            port,
            server_url,
        })
    }
}
