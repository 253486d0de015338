use clap::{Parser, ValueEnum};
use kaidoku::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI-side mirror of the output mode for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    Business,
    Technical,
}

impl From<ModeCli> for Mode {
    fn from(mode: ModeCli) -> Self {
        match mode {
            ModeCli::Business => Mode::Business,
            ModeCli::Technical => Mode::Technical,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Indented plain-text outline
    #[default]
    Outline,
    /// The full execution model as JSON
    Json,
}

/// Analyzes a vendor ETL process export and prints its execution model
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the process definition JSON file
    process_path: Option<String>,

    /// Output profile
    #[arg(short, long, value_enum)]
    mode: Option<ModeCli>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Outline)]
    format: OutputFormat,

    /// Match variable usage on whole words instead of substrings
    #[arg(long)]
    whole_word: bool,

    /// Character budget for SQL and script previews
    #[arg(long, default_value_t = 120)]
    preview_budget: usize,

    /// Treat a vendor type tag as a known kind, e.g. `--map XfrmSql=ExecuteSql`
    #[arg(long = "map", value_name = "VENDOR=KNOWN")]
    mappings: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.human {
        run_interactive(cli);
    } else {
        run_non_interactive(cli);
    }
}

/// Installs a stderr subscriber; `RUST_LOG` overrides the verbosity flag.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kaidoku={level},kaidoku_cli={level}")));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

fn run_analysis(process_path: String, mode: Mode, cli: &Cli) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let process_json = fs::read_to_string(&process_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read process file '{}': {}",
            &process_path, e
        ))
    });
    let definition = ProcessDefinition::from_json(&process_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load process definition: {}", e)));
    let load_duration = load_start.elapsed();
    info!(steps = definition.steps.len(), path = %process_path, "process definition loaded");

    // --- 2. Analysis ---
    let analyze_start = Instant::now();
    let mut builder = Analyzer::builder(definition)
        .mode(mode)
        .preview_budget(cli.preview_budget)
        .usage_matching(if cli.whole_word {
            UsageMatching::WholeWord
        } else {
            UsageMatching::Substring
        });
    for mapping in &cli.mappings {
        let Some((vendor, known)) = mapping.split_once('=') else {
            exit_with_error(&format!("Invalid mapping '{}', expected VENDOR=KNOWN", mapping));
        };
        builder = builder.with_type_mapping(vendor.trim(), known.trim());
    }
    let model = builder
        .build()
        .analyze()
        .unwrap_or_else(|e| exit_with_error(&format!("Analysis failed: {}", e)));
    let analyze_duration = analyze_start.elapsed();

    // --- 3. Output ---
    match cli.format {
        OutputFormat::Outline => print!("{}", OutlineFormatter::format(&model)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&model)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize model: {}", e)));
            println!("{}", json);
        }
    }

    // --- 4. Summary (stderr, so stdout stays machine-readable) ---
    let total_duration = total_start.elapsed();
    eprintln!("\n--- Model Summary ---");
    eprintln!("Mode:                 {}", model.mode());
    eprintln!("Nodes:                {}", model.len());
    eprintln!("Root Steps:           {}", model.execution_tree().len());
    eprintln!("Variables:            {}", model.variables().count());
    eprintln!("Tables:               {}", model.table_set().len());
    eprintln!("Step Outputs:         {}", model.step_output_set().len());
    eprintln!("\n--- Performance Summary ---");
    eprintln!("File Loading:         {:?}", load_duration);
    eprintln!("Analysis:             {:?}", analyze_duration);
    eprintln!("-----------------------------");
    eprintln!("Total Execution:      {:?}", total_duration);
}

/// Runs the CLI in non-interactive mode, taking all arguments from the command line.
fn run_non_interactive(cli: Cli) {
    let process_path = cli.process_path.clone().unwrap_or_else(|| {
        exit_with_error("Process path is required in non-interactive mode.");
    });
    let mode = cli.mode.map(Mode::from).unwrap_or_default();
    run_analysis(process_path, mode, &cli);
}

/// Runs the CLI in an interactive, human-friendly mode with prompts.
fn run_interactive(cli: Cli) {
    eprintln!("--- Kaidoku Interactive Mode ---");

    let process_path = prompt_for_input("Enter process definition path", Some("data/process.json"));

    let mode = loop {
        eprintln!("\nPlease select an output mode:");
        eprintln!("  1: Technical (all steps, SQL and script previews)");
        eprintln!("  2: Business (plain language, housekeeping omitted)");
        let choice_str = prompt_for_input("Enter choice", Some("1"));

        match choice_str.trim() {
            "1" => break Mode::Technical,
            "2" => break Mode::Business,
            _ => eprintln!("Invalid choice. Please enter 1 or 2."),
        }
    };

    run_analysis(process_path, mode, &cli);
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    eprint!("> {}{}: ", prompt_text, default_prompt);
    let _ = io::stderr().flush();

    io::stdin()
        .read_line(&mut line)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read line: {}", e)));
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
