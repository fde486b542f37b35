use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "recipebook", about = "Recipe Book: recipes, favorites and imports", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API over in-memory stores
    Serve(ServeArgs),
    /// Import recipes from TheMealDB and print them
    Import(ImportArgs),
    /// Print the effective server configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Server configuration file (TOML). Falls back to $RECIPEBOOK_CONFIG.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Store uploaded images under this directory instead of memory
    #[arg(long)]
    pub blob_root: Option<PathBuf>,
    /// Seed the store from this TheMealDB category before serving
    #[arg(long)]
    pub seed_category: Option<String>,
    #[arg(long, default_value_t = 5)]
    pub seed_limit: usize,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[arg(long, default_value = "Dessert")]
    pub category: String,
    #[arg(short = 'n', long, default_value_t = 5)]
    pub limit: usize,
    /// Pause between recipes, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub delay_ms: u64,
    /// MyMemory language pair; `none` skips translation
    #[arg(long, default_value = "en|bg")]
    pub lang_pair: String,
    /// Fixed seed for the randomized fields
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["recipebook", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
            assert!(args.seed_category.is_none());
            assert_eq!(args.seed_limit, 5);
        } else {
            panic!("wrong command");
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_serve_with_seed() {
        let cli = Cli::try_parse_from([
            "recipebook",
            "serve",
            "--bind",
            "0.0.0.0:3000",
            "--seed-category",
            "Seafood",
            "--seed-limit",
            "2",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:3000".parse().unwrap()));
            assert_eq!(args.seed_category.as_deref(), Some("Seafood"));
            assert_eq!(args.seed_limit, 2);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_import() {
        let cli = Cli::try_parse_from([
            "recipebook", "import", "-n", "3", "--delay-ms", "0", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        if let Command::Import(args) = cli.command {
            assert_eq!(args.category, "Dessert");
            assert_eq!(args.limit, 3);
            assert_eq!(args.delay_ms, 0);
            assert_eq!(args.lang_pair, "en|bg");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        assert!(Cli::try_parse_from(["recipebook", "serve", "--bind", "localhost"]).is_err());
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["recipebook", "config", "-c", "server.toml"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("server.toml")));
        } else {
            panic!("wrong command");
        }
    }
}
