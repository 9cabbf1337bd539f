use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trilha::catalog::{self, Catalog, Category, FilterState};
use trilha::{config, output, scenario, status};

#[derive(Parser)]
#[command(name = "trilha")]
#[command(about = "Slideshow and catalog filter engines for an adventure tourism site")]
#[command(long_about = "\
Slideshow and catalog filter engines for an adventure tourism site

Checks downloads catalogs, evaluates catalog filters, and replays scripted
page visits against the hero slideshow, the photo gallery and the downloads
filter under a simulated clock.

Files:

  config.toml                      # Site config (optional, stock defaults otherwise)
  fixtures/catalog.toml            # [[entries]] id, title, description, category, file_type
  fixtures/scenarios/*.toml        # Page visits: regions, [config] overlay, [[steps]]

Run 'trilha gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a catalog file and print its inventory
    Check {
        /// Catalog TOML file
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Evaluate a category + search filter once
    Filter {
        /// Catalog TOML file
        #[arg(long)]
        catalog: PathBuf,
        /// Category slug, or "all"
        #[arg(long, default_value = catalog::ALL)]
        category: String,
        /// Search text
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Replay scenario files (directories are searched for *.toml)
    Replay {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print transcripts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check { catalog: path } => {
            let site = config::load_config(&cli.config)?;
            println!("==> Checking {}", path.display());
            let loaded = Catalog::load(&path)?;
            output::print_catalog_inventory(&loaded, &site);
            println!("==> Catalog is valid");
        }
        Command::Filter {
            catalog: path,
            category,
            search,
        } => {
            let site = config::load_config(&cli.config)?;
            let loaded = Catalog::load(&path)?;
            let fold = site.catalog.fold_diacritics;
            let state = FilterState {
                category: Category::parse(&category),
                term: catalog::normalize(&search, fold),
            };
            let visible = catalog::visible_entries(&loaded, &state, fold);
            let label = (!state.category.is_all()).then(|| site.category_label(&category));
            let line = status::describe(visible.len(), loaded.len(), &state.term, label);
            output::print_filter_result(&state, &visible, &line);
        }
        Command::Replay { paths, json } => {
            let site = config::load_config(&cli.config)?;
            let files = scenario::collect_scenarios(&paths)?;
            let mut transcripts = Vec::with_capacity(files.len());
            for file in &files {
                tracing::info!(scenario = %file.display(), "replaying file");
                transcripts.push(scenario::run_file(file, &site)?);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&transcripts)?);
            } else {
                for (i, transcript) in transcripts.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    output::print_transcript(transcript);
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so `replay --json` output stays machine-readable.
///
/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
