use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use treasures::config::{self, ProjectPaths, TreasuresConfig};
use treasures::prompt::Session;
use treasures::stage::{self, MenuAction};
use treasures::taxonomy::Taxonomy;
use treasures::{generate, integrate, output, store};

#[derive(Parser)]
#[command(name = "treasures")]
#[command(about = "Curated-links manager and static page generator")]
#[command(long_about = "\
Curated-links manager and static page generator

New entries are staged interactively, integrated into a JSON store, and
rendered to a single HTML page grouped by topic and subtopic.

Project structure:

  treasures.toml                 # Optional config (see gen-config)
  sources/
  ├── types.json                 # Types and subtypes
  ├── topics.json                # Topics and subtopics
  ├── flags.json                 # Known flags
  ├── tags.json                  # Known tags
  ├── ressources.json            # Resource kinds: color, icon, label
  ├── treasures.json             # The store, keyed by title
  └── to_integrate/              # Staged entries, one <title>.json each
  docs/
  └── index.html                 # Generated page

Workflow: stage → integrate (writes the store, then the page).
Run without a command for the interactive menu.

Set RUST_LOG to adjust diagnostics, e.g. RUST_LOG=treasures=debug.")]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show debug diagnostics
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive menu (the default)
    Menu,
    /// Interactively stage a new entry
    Stage,
    /// Integrate staged entries into the store, then rebuild the page
    Integrate,
    /// Rebuild the page from the store
    Build,
    /// Validate the store against the taxonomy without changing anything
    Check,
    /// Print a stock treasures.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Command::Menu);
    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.root)?;
    let paths = ProjectPaths::resolve(&cli.root, &config.paths);

    match command {
        Command::Menu => {
            let mut session = Session::stdio();
            let action = stage::choose_action(&mut session);
            match action? {
                MenuAction::Stage => {
                    let taxonomy = Taxonomy::load(&paths.data_dir)?;
                    let (entry, path) =
                        stage::stage_entry(&mut session, &taxonomy, &paths.staging_dir)?;
                    session.close()?;
                    output::print_stage_output(&entry, &path, &cli.root);
                }
                MenuAction::Integrate => {
                    session.close()?;
                    run_integrate(&paths, &config, &cli.root)?;
                }
                MenuAction::Maintenance => {
                    session.say("Not yet implemented! :(")?;
                    session.close()?;
                }
            }
        }
        Command::Stage => {
            let taxonomy = Taxonomy::load(&paths.data_dir)?;
            let mut session = Session::stdio();
            let staged = stage::stage_entry(&mut session, &taxonomy, &paths.staging_dir);
            session.close()?;
            let (entry, path) = staged?;
            output::print_stage_output(&entry, &path, &cli.root);
        }
        Command::Integrate => run_integrate(&paths, &config, &cli.root)?,
        Command::Build => {
            let summary = generate::generate(&paths, &config)?;
            output::print_generate_output(&summary, &cli.root);
        }
        Command::Check => {
            let taxonomy = Taxonomy::load(&paths.data_dir)?;
            let entries = store::load_store(&paths.store)?;
            let issues = taxonomy.check_entries(&entries);
            output::print_check_output(&issues, entries.len());
            if !issues.is_empty() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Integrate staged entries, then regenerate the page from the new store.
fn run_integrate(
    paths: &ProjectPaths,
    config: &TreasuresConfig,
    root: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = integrate::integrate(paths, Utc::now())?;
    output::print_integration_report(&report, &paths.store, root);
    println!();
    let summary = generate::generate(paths, config)?;
    output::print_generate_output(&summary, root);
    Ok(())
}

/// Diagnostics go to stderr; stdout carries the reports and prompts.
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "treasures=debug"
    } else {
        "treasures=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
