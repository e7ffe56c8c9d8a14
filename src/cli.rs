//! Command-line flags
//!
//! - `--config <path>` / `-c <path>`: configuration file
//! - `--help` / `-h`: print usage and exit
//!
//! Uses clap when the `cli` feature is enabled, a small hand-rolled parser
//! otherwise.

use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

#[cfg(feature = "cli")]
use clap::{error::ErrorKind, Arg, ArgAction, Command};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config_file: Option<PathBuf>,
    /// Help (or version) was printed; the caller should exit
    pub help: bool,
}

impl CliArgs {
    pub fn parse() -> Result<Self> {
        Self::parse_from(env::args())
    }

    #[cfg(feature = "cli")]
    pub fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let command = Command::new("userboard")
            .version(env!("CARGO_PKG_VERSION"))
            .about("User directory service with a JSON API and dashboard")
            .arg(
                Arg::new("config")
                    .long("config")
                    .short('c')
                    .value_name("FILE")
                    .help("Configuration file path")
                    .value_parser(clap::value_parser!(PathBuf))
                    .action(ArgAction::Set),
            );

        match command.try_get_matches_from(args) {
            Ok(matches) => Ok(CliArgs {
                config_file: matches.get_one::<PathBuf>("config").cloned(),
                help: false,
            }),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                let _ = e.print();
                Ok(CliArgs {
                    config_file: None,
                    help: true,
                })
            }
            Err(e) => Err(Error::config(format!(
                "Failed to parse command line arguments: {}",
                e
            ))),
        }
    }

    #[cfg(not(feature = "cli"))]
    pub fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse_simple(args)
    }

    /// Parser without the clap dependency
    pub fn parse_simple<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter().skip(1); // program name

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let value = args
                        .next()
                        .ok_or_else(|| Error::config("--config flag requires a value"))?;
                    parsed.config_file = Some(PathBuf::from(value));
                }
                "--help" | "-h" => parsed.help = true,
                other => {
                    if let Some(path) = other
                        .strip_prefix("--config=")
                        .or_else(|| other.strip_prefix("-c="))
                    {
                        parsed.config_file = Some(PathBuf::from(path));
                    } else {
                        return Err(Error::config(format!("Unknown argument: {}", other)));
                    }
                }
            }
        }

        if parsed.help {
            Self::print_help();
        }

        Ok(parsed)
    }

    fn print_help() {
        println!("userboard {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("USAGE:");
        println!("    userboard [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    -c, --config <FILE>    Configuration file path");
        println!("    -h, --help             Print help information");
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }
}
