use clap::{Parser, Subcommand};

mod classify;
mod commands;
mod env_loader;
mod error;
mod memolog;

#[derive(Parser)]
#[command(name = "memolog")]
#[command(version)]
#[command(about = "Classify dated work memos into per-project, date-sectioned markdown logs")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every inbox memo: classify per project, merge into the logs, archive
    Run {
        /// Report what would be processed without classifying, merging, or moving files
        #[arg(long)]
        dry_run: bool,
    },
    /// Show resolved paths, the catalog, and pending inbox work
    Status,
    /// Check every project log against the date-block structure invariants
    Verify {
        /// Treat any structural issue as a hard failure
        #[arg(long)]
        strict: bool,
    },
    /// Inspect or update the project catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List projects and their alias search-terms
    List,
    /// Add alias search-terms to a project and persist the catalog
    AddAlias {
        /// Canonical project name, exactly as configured
        project: String,
        /// One or more alias search-terms to add
        #[arg(required = true)]
        aliases: Vec<String>,
    },
}

fn main() {
    env_loader::load_dotenv();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { dry_run } => commands::run::run(&commands::run::RunOptions { dry_run }),
        Commands::Status => commands::status::run(),
        Commands::Verify { strict } => {
            commands::verify::run(&commands::verify::VerifyOptions { strict })
        }
        Commands::Catalog(CatalogCommands::List) => commands::catalog::list(),
        Commands::Catalog(CatalogCommands::AddAlias { project, aliases }) => {
            commands::catalog::add_alias(&project, &aliases)
        }
    };

    match result {
        Ok(report) => {
            report.print();
            if !report.ok {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
