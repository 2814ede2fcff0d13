use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "objstore",
    about = "S3-style object store on a lattice key-value store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server over an in-memory KVS
    Serve(ServeArgs),
    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured listen address
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "objstore",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--config",
            "objstore.toml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("objstore.toml")));
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_config_json() {
        let cli = Cli::try_parse_from(["objstore", "config", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Command::Config));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        assert!(Cli::try_parse_from(["objstore", "serve", "--bind", "nowhere"]).is_err());
    }
}
