//! Bible Version Codes CLI
//!
//! Loads `BibleVersionCodes.xml`, reports what is wrong with it, and writes the
//! derived formats.

use std::path::PathBuf;

use anyhow::{bail, Context};
use bible_version_codes::{
    export::ExportInput, index::VIEW_NAMES, Catalog, CatalogIndexer, CatalogLoader, Checksum,
    ConverterConfig, DatasetCache, Diagnostics, ExportFormat, Exporter, IndexedCatalog,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bible-version-codes")]
#[command(about = "Load, check and convert the Bible version codes catalogue")]
struct Cli {
    /// Configuration file (layered over the default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Source XML file (overrides the configuration)
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the catalogue summary and diagnostic totals
    Summary,

    /// Print every diagnostic; exit non-zero on errors
    Validate,

    /// Print one view (or one key of it) as JSON
    Show {
        /// abbreviationList, abbreviationIndex, nameIndex, languageIndex,
        /// publisherIndex, licenceIndex or webLinkIndex
        view: String,
        /// Only this key of the view
        key: Option<String>,
    },

    /// Write the derived formats
    Export {
        /// Formats to write (defaults to the configured ones)
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<ExportFormat>,
        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ConverterConfig::load_from(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        config.source.path = source;
    }

    match cli.command {
        Commands::Summary => {
            let (catalog, diagnostics) = load(&config)?;
            println!("📖 {}", catalog);
            println!();
            print_totals(&diagnostics);
            Ok(())
        }

        Commands::Validate => {
            let (catalog, diagnostics) = load(&config)?;
            println!("🔍 Checked {} entries from {}", catalog.len(), catalog.origin);
            println!();
            if diagnostics.is_empty() {
                println!("✅ No problems found");
                return Ok(());
            }
            print!("{}", diagnostics.format_all());
            if diagnostics.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Show { view, key } => {
            let indexed = datasets(&config)?;
            let value = select_view(&indexed, &view, key.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }

        Commands::Export { format, output } => {
            let (catalog, diagnostics) = load(&config)?;
            if diagnostics.has_errors() && config.validation.fail_on_errors {
                print!("{}", diagnostics.format_all());
                bail!("Refusing to export: the catalogue has errors");
            }

            let formats = if format.is_empty() {
                config.export.formats.clone()
            } else {
                format
            };
            let output_dir = output.unwrap_or_else(|| config.output_dir());

            let indexer = CatalogIndexer::new(&catalog);
            let input = ExportInput::new(&catalog, indexer.build());
            let exporter = Exporter::new(&output_dir, config.export.base_name.as_str())
                .with_output_format(config.export.output_format);

            println!("📦 Exporting {} entries to {}", catalog.len(), output_dir.display());
            for path in exporter.write_all(&formats, &input)? {
                println!("  ✅ {}", path.display());
            }
            println!();
            print_totals(&diagnostics);
            Ok(())
        }

        Commands::Config { save } => {
            match save {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("✅ Configuration saved to {}", path.display());
                }
                None => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
    }
}

fn load(config: &ConverterConfig) -> anyhow::Result<(Catalog, Diagnostics)> {
    let path = config.source_path();
    let mut loader = CatalogLoader::bible_version_codes();
    loader
        .load_path(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(loader.into_parts()?)
}

/// Indexed datasets, from the cache when it matches the source
fn datasets(config: &ConverterConfig) -> anyhow::Result<IndexedCatalog> {
    let source_path = config.source_path();
    let text = std::fs::read_to_string(&source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;
    let cache_path = config
        .output_dir()
        .join(format!("{}.cache.json", config.export.base_name));

    if let Some(cached) = DatasetCache::read_fresh(&cache_path, &Checksum::of_text(&text))? {
        return Ok(cached);
    }

    let (catalog, _) = load(config)?;
    let indexed = CatalogIndexer::new(&catalog).build().clone();
    Ok(indexed)
}

fn select_view(
    indexed: &IndexedCatalog,
    view: &str,
    key: Option<&str>,
) -> anyhow::Result<serde_json::Value> {
    if !VIEW_NAMES.contains(&view) {
        bail!("Unknown view {:?} (expected one of {})", view, VIEW_NAMES.join(", "));
    }
    let all = serde_json::to_value(indexed)?;
    let Some(table) = all.get(view) else {
        bail!("View {:?} is missing from the datasets", view);
    };
    let Some(key) = key else {
        return Ok(table.clone());
    };
    if view == "abbreviationList" {
        bail!("abbreviationList has no keys");
    }

    // Abbreviations may be given in any case
    let resolved = if view == "abbreviationIndex" && table.get(key).is_none() {
        if indexed.abbreviation_lookup.is_ambiguous(&key.to_uppercase()) {
            bail!("Abbreviation {:?} matches more than one version", key);
        }
        indexed
            .abbreviation_lookup
            .resolve(&key.to_uppercase())
            .unwrap_or(key)
    } else {
        key
    };

    table
        .get(resolved)
        .cloned()
        .with_context(|| format!("No {:?} in {}", key, view))
}

fn print_totals(diagnostics: &Diagnostics) {
    if diagnostics.has_errors() {
        println!(
            "❌ {} error(s), {} warning(s)",
            diagnostics.error_count(),
            diagnostics.warning_count()
        );
    } else if diagnostics.warning_count() > 0 {
        println!("⚠️  {} warning(s)", diagnostics.warning_count());
    } else {
        println!("✅ No problems found");
    }
}
