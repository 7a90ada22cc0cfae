use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand};
use sift_lang::cli::{self, CheckOptions, CheckResult, CliError};
use sift_lang::{DEFAULT_MAX_DEPTH, DecodeOptions, Schema};

#[derive(ClapParser)]
#[command(name = "sift")]
#[command(about = "Sift - A search query language for filtering JSON documents")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Schema file declaring the searchable fields
    #[arg(long, global = true, env = "SIFT_SCHEMA")]
    schema: Option<PathBuf>,

    /// Anchor for relative dates, as RFC 3339 (defaults to the current time)
    #[arg(long, global = true, env = "SIFT_NOW")]
    now: Option<String>,

    /// Deepest allowed nesting of groups and pairs
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a query and print it as a JSON query list
    Decode {
        /// The sift query to decode
        query: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Read a JSON query list and print it as a query
    Encode {
        /// JSON query list (reads from stdin if not provided)
        input: Option<String>,
    },

    /// Match a query against JSON documents
    Check {
        /// The sift query to run
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate the query, don't match
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print a query in canonical form
    Fmt {
        /// The sift query to format
        query: String,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'sift docs' to list categories)
        category: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let decode = DecodeOptions::default().with_max_depth(cli.global.max_depth);

    let result = match cli.command {
        Commands::Decode { query, pretty } => cli::query_to_query_list(&query, decode)
            .and_then(|list| print_json(&list, pretty)),
        Commands::Encode { input } => read_input(input).and_then(|json| {
            let json = json.ok_or(CliError::NoInput)?;
            println!("{}", cli::query_list_to_text(&json)?);
            Ok(())
        }),
        Commands::Check {
            query,
            input,
            pretty,
            syntax_only,
        } => run_check(&cli.global, decode, query, input, pretty, syntax_only),
        Commands::Fmt { query } => cli::format_query(&query, decode).map(|text| println!("{}", text)),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    global: &GlobalArgs,
    decode: DecodeOptions,
    query: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let schema = match &global.schema {
        Some(path) => Some(Schema::from_json(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    let now = match &global.now {
        Some(raw) => cli::parse_now(raw)?,
        None => chrono::Utc::now(),
    };

    let input = if syntax_only { input } else { read_input(input)? };

    let options = CheckOptions {
        query,
        input,
        schema,
        now,
        decode,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Matches(output) => print_json(&output, pretty)?,
    }
    Ok(())
}

/// The given argument, or stdin when it is piped.
fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}
