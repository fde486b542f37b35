use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tracing::info;

use recipebook_access::RecipeService;
use recipebook_import::{
    IdentityTranslator, ImportConfig, ImportReport, Importer, MealDbClient, MyMemoryTranslator,
    Translator,
};
use recipebook_server::{RecipeBookServer, ServerConfig};
use recipebook_store::{InMemoryBlobStore, InMemoryDocumentStore};

use crate::cli::*;

const CONFIG_ENV: &str = "RECIPEBOOK_CONFIG";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Import(args) => cmd_import(args, cli.format).await,
        Command::Config(args) => cmd_config(args),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(args.config.clone(), &args)?;
    let server = RecipeBookServer::in_memory(config);

    if let Some(category) = &args.seed_category {
        let import = ImportConfig {
            category: category.clone(),
            limit: args.seed_limit,
            ..Default::default()
        };
        let importer = importer(import, server.state().recipe_service().clone());
        let report = importer.run().await.context("seeding recipes")?;
        print_report_text(&report);
        server.state().recipes.fetch_all().await?;
    }

    println!(
        "{} Recipe Book on {} ({} token(s))",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().tokens.len()
    );
    server.serve().await?;
    Ok(())
}

async fn cmd_import(args: ImportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = import_config(&args);
    let recipes = RecipeService::new(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(InMemoryBlobStore::new()),
    );
    let report = importer(config, recipes).run().await.context("importing recipes")?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report_text(&report),
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = match config_path(args.config) {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

/// File (or defaults), then command-line overrides.
fn server_config(path: Option<PathBuf>, args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match config_path(path) {
        Some(path) => {
            info!(path = %path.display(), "loading server config");
            ServerConfig::load(&path)?
        }
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = &args.blob_root {
        config.blob_root = Some(root.clone());
    }
    Ok(config)
}

fn import_config(args: &ImportArgs) -> ImportConfig {
    ImportConfig {
        category: args.category.clone(),
        limit: args.limit,
        delay_ms: args.delay_ms,
        lang_pair: args.lang_pair.clone(),
        seed: args.seed,
        ..Default::default()
    }
}

fn importer(config: ImportConfig, recipes: RecipeService) -> Importer {
    let translator: Arc<dyn Translator> = if config.lang_pair.eq_ignore_ascii_case("none") {
        Arc::new(IdentityTranslator)
    } else {
        Arc::new(MyMemoryTranslator::new(
            config.translate_url.clone(),
            config.lang_pair.clone(),
        ))
    };
    let source = Arc::new(MealDbClient::new(config.mealdb_url.clone()));
    Importer::new(source, translator, recipes, config)
}

fn print_report_text(report: &ImportReport) {
    println!("Imported from {}:", report.category.bold());
    for recipe in &report.imported {
        println!(
            "  {} {} {} ({} min, {}, serves {})",
            "✓".green(),
            recipe.title.bold(),
            recipe.id.dimmed(),
            recipe.cooking_time,
            recipe.difficulty.to_string().cyan(),
            recipe.servings
        );
    }
    for failure in &report.failures {
        println!(
            "  {} {} ({}): {}",
            "✗".red(),
            failure.meal_name.bold(),
            failure.meal_id.dimmed(),
            failure.reason.red()
        );
    }
    println!(
        "{} imported, {} failed",
        report.imported.len().to_string().green(),
        report.failures.len().to_string().red()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let mut full = vec!["recipebook", "serve"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Serve(args) => args,
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:9000\"\nenable_cors = false\n").unwrap();

        let args = serve_args(&["--bind", "127.0.0.1:7000", "--blob-root", "/tmp/blobs"]);
        let config = server_config(Some(path), &args).unwrap();
        assert_eq!(config.bind_addr.port(), 7000);
        assert_eq!(config.blob_root, Some(PathBuf::from("/tmp/blobs")));
        assert!(!config.enable_cors);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = serve_args(&[]);
        assert!(server_config(Some(dir.path().join("absent.toml")), &args).is_err());
    }

    #[test]
    fn import_args_map_onto_config() {
        let args = match Cli::try_parse_from([
            "recipebook", "import", "--category", "Seafood", "-n", "2", "--seed", "9",
        ])
        .unwrap()
        .command
        {
            Command::Import(args) => args,
            _ => panic!("wrong command"),
        };
        let config = import_config(&args);
        assert_eq!(config.category, "Seafood");
        assert_eq!(config.limit, 2);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.owner_id, "system");
    }
}
