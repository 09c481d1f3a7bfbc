use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlrecall::cli::commands;
use sqlrecall::TrainingEntry;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "sqlrecall")]
#[command(about = "sqlrecall - Training data store for text-to-SQL\nQuestion/SQL pairs, schema DDL and documentation, retrieved by similarity")]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Add a question together with the SQL that answers it
  AddSql {
    /// Natural-language question
    question: String,
    /// SQL answering the question
    sql: String,
  },
  /// Add a schema DDL statement
  AddDdl {
    /// DDL statement
    ddl: String,
  },
  /// Add free-text documentation
  AddDoc {
    /// Documentation text
    text: String,
  },
  /// Show stored question/SQL pairs similar to a question
  Similar {
    /// Question to match
    question: String,
  },
  /// Show DDL related to a question
  Ddl {
    /// Question to match
    question: String,
  },
  /// Show documentation related to a question
  Docs {
    /// Question to match
    question: String,
  },
  /// List all stored training data
  List,
  /// Remove a training record by id
  Remove {
    /// Record id as shown by `list`
    id: String,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::AddSql { question, sql } => {
      commands::add(TrainingEntry::question_sql(question, sql)).await
    }
    Command::AddDdl { ddl } => commands::add(TrainingEntry::ddl(ddl)).await,
    Command::AddDoc { text } => commands::add(TrainingEntry::documentation(text)).await,
    Command::Similar { question } => commands::similar(&question).await,
    Command::Ddl { question } => commands::related_ddl(&question).await,
    Command::Docs { question } => commands::related_docs(&question).await,
    Command::List => commands::list().await,
    Command::Remove { id } => commands::remove(&id).await,
  }
}

fn init_logging(verbose: bool) {
  let default_filter = if verbose { "sqlrecall=debug,warn" } else { "sqlrecall=warn,error" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  handle(cli.command).await
}
