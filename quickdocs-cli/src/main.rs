//! quickdocs — the QuickDocs CLI
//!
//! Ask the tracking database questions in plain English.
//!
//! # Usage
//!
//! ```bash
//! # Execute a question
//! quickdocs "show all customers"
//!
//! # Dry run (show SQL and parameters only)
//! quickdocs "documents submitted by Jane Doe" --dry-run
//!
//! # Create a database with sample data
//! quickdocs init
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::collections::HashMap;

use quickdocs_core::prelude::*;

#[derive(Parser)]
#[command(name = "quickdocs")]
#[command(version)]
#[command(about = "Plain-English queries over the QuickDocs tracking database", long_about = None)]
#[command(after_help = "EXAMPLES:
    quickdocs 'show all customers'
    quickdocs 'how many documents has Jane Doe submitted?'
    quickdocs 'customers in Onboarding' --format json
    quickdocs explain 'recent documents'")]
struct Cli {
    /// The question to translate and execute
    question: Option<String>,

    /// Don't execute, just show the generated SQL and parameters
    #[arg(short, long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Database connection URL
    #[arg(long, env = "QUICKDOCS_DATABASE_URL", default_value = "sqlite://quickdocs.db")]
    database_url: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a question translates without executing it
    Explain {
        /// The question to explain
        question: String,
    },
    /// Show the supported phrasings
    Phrases,
    /// Create the database, apply the schema, and load sample data
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Explain { question }) => {
            explain_question(question);
            Ok(())
        }
        Some(Commands::Phrases) => {
            show_phrases();
            Ok(())
        }
        Some(Commands::Init) => init_database(&cli).await,
        None => match &cli.question {
            Some(question) => run_question(question, &cli).await,
            None => {
                println!("{}", "QuickDocs — plain-English document tracking queries".cyan().bold());
                println!();
                println!("Usage: quickdocs <QUESTION> [OPTIONS]");
                println!();
                println!("Try: quickdocs --help");
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run_question(question: &str, cli: &Cli) -> QuickdocsResult<()> {
    if cli.verbose {
        println!("{} {}", "Question:".dimmed(), question.yellow());
    }

    let Some(translation) = translate(question) else {
        println!(
            "{}",
            "Could not understand the question. Please try rephrasing.".yellow()
        );
        println!("{}", "See: quickdocs phrases".dimmed());
        return Ok(());
    };

    if cli.dry_run {
        print_translation(&translation);
        return Ok(());
    }

    if cli.verbose {
        println!("{} {}", "Connecting to:".dimmed(), cli.database_url);
    }

    let db = Db::connect(&cli.database_url).await?;
    let results = db.fetch_all(&translation).await?;
    format_output(&results, &cli.format);

    Ok(())
}

fn print_translation(translation: &Translation) {
    println!("{}", "Generated SQL:".green().bold());
    println!("{}", translation.sql.white());

    if !translation.params.is_empty() {
        println!();
        println!("{}", "Parameters:".cyan());
        for (i, p) in translation.params.iter().enumerate() {
            println!("  ?{} = {}", i + 1, p.yellow());
        }
    }
}

async fn init_database(cli: &Cli) -> QuickdocsResult<()> {
    let db = Db::connect(&cli.database_url).await?;
    ensure_schema(db.pool()).await?;
    if seed_if_empty(db.pool()).await? {
        println!(
            "{} Created {} with sample data",
            "✓".green(),
            cli.database_url.cyan()
        );
    } else {
        println!(
            "{} {} already has data, schema checked",
            "✓".green(),
            cli.database_url.cyan()
        );
    }
    Ok(())
}

fn format_output(results: &[ResultRow], format: &OutputFormat) {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results).unwrap_or_default());
        }
        OutputFormat::Table => {
            // Get column names from first row
            let columns: Vec<&String> = results[0].keys().collect();

            // Calculate column widths
            let mut widths: HashMap<&String, usize> =
                columns.iter().map(|c| (*c, c.len())).collect();
            for row in results {
                for (col, val) in row {
                    let len = val_to_string(val).len();
                    if let Some(w) = widths.get_mut(col) {
                        *w = (*w).max(len);
                    }
                }
            }

            // Print header
            let header: Vec<String> = columns
                .iter()
                .map(|c| format!("{:width$}", c, width = widths[*c]))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            // Print separator
            let sep: Vec<String> = columns.iter().map(|c| "─".repeat(widths[*c])).collect();
            println!("{}", sep.join("─┼─").dimmed());

            // Print rows
            for row in results {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        let val = row.get(*c).map(val_to_string).unwrap_or_default();
                        format!("{:width$}", val, width = widths[*c])
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", results.len().to_string().cyan());
        }
    }
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

fn explain_question(question: &str) {
    println!("{}", "QuickDocs Question Explanation".cyan().bold());
    println!();
    println!("{} {}", "Question:".dimmed(), question.yellow());
    println!(
        "{} {}",
        "Normalized:".dimmed(),
        question.trim().to_lowercase().white()
    );
    println!();

    match translate(question) {
        Some(translation) => print_translation(&translation),
        None => {
            println!("{}", "No phrasing matched.".yellow());
            println!("{}", "See: quickdocs phrases".dimmed());
        }
    }
}

fn show_phrases() {
    println!("{}", "QuickDocs Supported Phrasings".cyan().bold());
    println!();

    let phrases = [
        ("show/list/get all customers", "Every customer, newest first"),
        ("list all pending processes", "Pending assignments with customer and process"),
        ("how many documents has <name> submitted", "Submission count for a customer"),
        ("documents submitted by <name>", "Same, alternate phrasing"),
        ("which process has the most documents", "Busiest process by submission count"),
        ("which customers are assigned to <process>", "Customers enrolled in a process"),
        ("customers in/for <process>", "Same, alternate phrasings"),
        ("show/list completed processes", "Finished assignments"),
        ("show/list all processes", "Every process, by name"),
        ("show/list document types", "Every document type, by name"),
        ("show recent submissions", "Ten most recent uploads"),
        ("recent documents", "Same, alternate phrasing"),
    ];

    println!(
        "{:45} {}",
        "Phrasing".white().bold(),
        "Answers".white().bold()
    );
    println!("{}", "─".repeat(90).dimmed());

    for (phrase, answer) in phrases {
        println!("{:45} {}", phrase.cyan(), answer.dimmed());
    }

    println!();
    println!(
        "{}",
        "Matching is case-insensitive; anything else is reported as not understood.".dimmed()
    );
}
