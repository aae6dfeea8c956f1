//! gabarito CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gabarito",
    version,
    about = "Compositor de provas objetivas com correção por foto do gabarito"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and an example exam file
    Init,

    /// Scaffold a new exam TOML file
    New {
        /// Exam title
        #[arg(long)]
        title: String,

        /// Where to write the exam file (default: provas/<slug>.toml)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate an exam TOML file or directory
    Validate {
        /// Path to exam .toml file or directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// Save an exam file into the collection
    Save {
        /// Path to exam .toml file
        #[arg(long)]
        exam: PathBuf,

        /// Collection file path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List saved exams
    List {
        /// Collection file path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Remove a saved exam
    Remove {
        /// Exam id
        #[arg(long)]
        id: String,

        /// Collection file path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a saved exam in detail
    Show {
        /// Exam id
        #[arg(long)]
        id: String,

        /// Collection file path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render the printable exam sheet (and answer grid) to HTML
    Print {
        /// Id of a saved exam
        #[arg(long)]
        id: Option<String>,

        /// Path to an exam .toml file (alternative to --id)
        #[arg(long)]
        exam: Option<PathBuf>,

        /// Render the answer key instead of the student sheet
        #[arg(long)]
        answer_key: bool,

        /// Output file path (default: <output_dir>/<title>.html)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Collection file path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a photographed answer sheet
    Grade {
        /// Id of a saved exam
        #[arg(long)]
        id: Option<String>,

        /// Path to an exam .toml file (alternative to --id)
        #[arg(long)]
        exam: Option<PathBuf>,

        /// Photo of the filled answer grid (JPEG or PNG)
        #[arg(long)]
        photo: PathBuf,

        /// Provider name from config (default: config's default_provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model to use (default: config's default_model)
        #[arg(long)]
        model: Option<String>,

        /// Collection file path (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gabarito=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::New { title, output } => commands::new::execute(title, output),
        Commands::Validate { exam } => commands::validate::execute(exam),
        Commands::Save {
            exam,
            store,
            config,
        } => commands::save::execute(exam, store, config),
        Commands::List { store, config } => commands::list::execute(store, config),
        Commands::Remove { id, store, config } => commands::remove::execute(id, store, config),
        Commands::Show { id, store, config } => commands::show::execute(id, store, config),
        Commands::Print {
            id,
            exam,
            answer_key,
            output,
            store,
            config,
        } => commands::print::execute(id, exam, answer_key, output, store, config),
        Commands::Grade {
            id,
            exam,
            photo,
            provider,
            model,
            store,
            config,
        } => commands::grade::execute(id, exam, photo, provider, model, store, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
