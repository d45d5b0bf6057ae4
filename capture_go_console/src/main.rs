// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.
//   * "Rust-upgrade" - place where code can be improved using a Rust feature
//       that is not implemented or stabilized yet.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod network;
pub mod tui;

mod bot_main;
mod client_main;
mod server_config;
mod server_main;

use std::thread;

use anyhow::Context;
use capture_go::network::PORT;
use clap::{Command, arg};
use server_config::ServerConfig;


fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let port_arg = || {
        arg!(-'p' --"port" <port> "Server port; defaults to the standard game port")
            .value_parser(clap::value_parser!(u16))
    };
    let matches = Command::new("Capture Go")
        .version(clap::crate_version!())
        .about("Capture Go client/server console app")
        .subcommand_required(true)
        .subcommand(Command::new("server").about("Run as server").arg(
            arg!([config_file] "Path to the configuration file: yaml-serialized ServerConfig."),
        ))
        .subcommand(
            Command::new("client")
                .about("Run as client")
                .arg(arg!(<server_address> "Server address"))
                .arg(port_arg()),
        )
        .subcommand(
            Command::new("host")
                .about("Run server and client in one process")
                .arg(arg!([config_file] "Path to the configuration file: yaml-serialized ServerConfig.")),
        )
        .subcommand(
            Command::new("bot")
                .about("Run as a client that makes random moves")
                .arg(arg!(<server_address> "Server address"))
                .arg(port_arg())
                .arg(arg!(--"seed" <seed> "Random seed").value_parser(clap::value_parser!(u64))),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            let config = read_config(sub_matches.get_one::<String>("config_file"))?;
            server_main::run(config)
        }
        Some(("client", sub_matches)) => client_main::run(client_main::ClientConfig {
            server_address: sub_matches.get_one::<String>("server_address").unwrap().clone(),
            port: sub_matches.get_one::<u16>("port").copied().unwrap_or(PORT),
        }),
        Some(("host", sub_matches)) => {
            let config = read_config(sub_matches.get_one::<String>("config_file"))?;
            let port = config.port;
            // Bind before starting the client, so that it never races the listener.
            let listener = server_main::bind(port)?;
            thread::spawn(move || {
                if let Err(err) = server_main::serve(listener, config) {
                    log::error!("Server failed: {:?}", err);
                }
            });
            client_main::run(client_main::ClientConfig {
                server_address: "127.0.0.1".to_owned(),
                port,
            })
        }
        Some(("bot", sub_matches)) => bot_main::run(bot_main::BotConfig {
            server_address: sub_matches.get_one::<String>("server_address").unwrap().clone(),
            port: sub_matches.get_one::<u16>("port").copied().unwrap_or(PORT),
            seed: sub_matches.get_one::<u64>("seed").copied(),
        }),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}

fn read_config(filename: Option<&String>) -> anyhow::Result<ServerConfig> {
    let Some(filename) = filename else {
        return Ok(ServerConfig::default());
    };
    let contents = std::fs::read_to_string(filename)
        .with_context(|| format!("Failed to read config file '{filename}'"))?;
    server_config::parse(&contents).with_context(|| format!("Failed to parse config file '{filename}'"))
}
