//! lineserve - Line Server for Large Immutable Files
//!
//! Builds a sparse offset index over the target file, then serves `GET <n>`
//! requests over TCP until a client sends `SHUTDOWN` or the process is signalled.

use anyhow::Result;
use clap::{value_parser, Arg, ArgMatches, Command};
use lineserve::{ConfigOverrides, LineServer, OffsetCache, ServerConfig, ShutdownHandle};
use std::sync::Arc;

fn cli() -> Command {
    let command = Command::new("lineserve")
        .version(lineserve::VERSION)
        .about("Serve lines of a large text file over TCP")
        .long_about(
            "lineserve indexes a newline-delimited text file once at startup and answers \
             'GET <n>' requests for its lines. Other commands: QUIT, SHUTDOWN.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the text file to serve")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("cache-size")
                .long("cache-size")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Number of line offsets to keep in the index [default: 1048576]"),
        )
        .arg(
            Arg::new("server-addr")
                .long("server-addr")
                .value_name("HOST:PORT")
                .help("Address to listen on; port 0 picks a free port [default: localhost:8080]"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(value_parser!(u64))
                .help("Seed for the random extra index entries"),
        );

    #[cfg(feature = "config")]
    let command = command.arg(
        Arg::new("config")
            .long("config")
            .value_name("PATH")
            .help("TOML file with cache_size, server_addr and seed defaults"),
    );

    command
}

fn resolve_config(matches: &ArgMatches) -> Result<ServerConfig> {
    let file = matches
        .get_one::<String>("file")
        .expect("file argument is required");

    let overrides = ConfigOverrides {
        cache_size: matches.get_one::<usize>("cache-size").copied(),
        server_addr: matches.get_one::<String>("server-addr").cloned(),
        seed: matches.get_one::<u64>("seed").copied(),
    };

    #[cfg(feature = "config")]
    let overrides = {
        let explicit = matches.get_one::<String>("config").map(std::path::Path::new);
        overrides.or(ConfigOverrides::discover(explicit)?)
    };

    Ok(ServerConfig::new(file, overrides))
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}

/// Route termination signals to the same shutdown path as the SHUTDOWN command
fn spawn_signal_listener(shutdown: ShutdownHandle) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                log::info!("Received {name}");
                if shutdown.trigger() {
                    log::info!("Shutting down server...");
                }
            }
            Err(e) => log::warn!("Unable to listen for termination signals: {e}"),
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let config = resolve_config(&matches)?;
    config.validate()?;

    let cache = OffsetCache::open(&config.file, config.capacity, config.seed).await?;
    let server = LineServer::bind(&config.server_addr, Arc::new(cache)).await?;

    spawn_signal_listener(server.shutdown_handle());
    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!lineserve::VERSION.is_empty());
    }

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_resolve_config_from_args() {
        let matches = cli()
            .try_get_matches_from([
                "lineserve",
                "data.txt",
                "--cache-size",
                "3000",
                "--server-addr",
                "127.0.0.1:0",
                "--seed",
                "5",
            ])
            .unwrap();

        let config = resolve_config(&matches).unwrap();
        assert_eq!(config.file, std::path::PathBuf::from("data.txt"));
        assert_eq!(config.capacity, 3000);
        assert_eq!(config.server_addr, "127.0.0.1:0");
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_file_argument_required() {
        assert!(cli().try_get_matches_from(["lineserve"]).is_err());
    }
}
