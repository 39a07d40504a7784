pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mealpass-admin")]
#[command(about = "MealPass admin CLI - Roster and account management against the MealPass database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create a login account")]
    CreateUser(commands::users::CreateUserArgs),

    #[command(about = "Import a roster CSV (create, update, deactivate)")]
    Import {
        #[arg(help = "Roster CSV file")]
        file: std::path::PathBuf,
    },

    #[command(about = "Export the student registry as CSV")]
    Export {
        #[arg(long, short, help = "Output file path (defaults to stdout)")]
        output: Option<std::path::PathBuf>,
    },

    #[command(about = "Show registry totals and today's claims")]
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateUser(args) => commands::users::create(args, output_format).await,
        Commands::Import { file } => commands::roster::import(&file, output_format).await,
        Commands::Export { output } => commands::roster::export(output.as_deref(), output_format).await,
        Commands::Stats => commands::stats::handle(output_format).await,
    }
}
