// haengbal CLI - batch generation of NEIS 행동특성 및 종합의견 text
//
// The upstream tool is a browser form; this binary is the headless
// collaborator around the same core: read an input workbook, drive one
// Gemini call per row, write the results workbook.

mod exit_codes;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use haengbal_config::{self as config, GenSettings, KeySource};
use haengbal_gen::{
    generate_to_file, CancelToken, GeminiClient, GenError, RunError, RunState, UsageEntry, UsageLog,
};
use haengbal_io::{
    read_with_options, results_path, template_path, write_template, ImportResult, ParseError,
    ReadOptions,
};
use haengbal_model::{LengthMode, SchoolCategory};

use exit_codes::{
    EXIT_AI_KEYCHAIN_ERR, EXIT_AI_MISSING_KEY, EXIT_CANCELLED, EXIT_GEN_FAILED, EXIT_IO,
    EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "haengbal")]
#[command(about = "Batch generator for student behavior/development comments (행발)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a blank input template workbook (header + 30 numbered rows)
    #[command(after_help = "\
Examples:
  haengbal template -c ele
  haengbal template -c kinder -o ~/Desktop")]
    Template {
        /// School category
        #[arg(long, short = 'c')]
        category: CategoryArg,

        /// Output file, or a directory for the default filename
        /// (행발입력자료.xlsx). Defaults to the current directory.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Parse an input workbook and print its records
    #[command(after_help = "\
Examples:
  haengbal inspect 행발입력자료.xlsx -c ele
  haengbal inspect input.xlsx -c kinder --json | jq '.[].number'")]
    Inspect {
        /// Input workbook (.xlsx/.xls)
        input: PathBuf,

        /// School category
        #[arg(long, short = 'c')]
        category: CategoryArg,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        /// Drop rows whose characteristics are shorter than this many
        /// characters
        #[arg(long, value_name = "N")]
        min_chars: Option<usize>,
    },

    /// Generate narrative text for every row and write a results workbook
    #[command(after_help = "\
Examples:
  haengbal generate input.xlsx -c ele
  haengbal generate input.xlsx -c kinder --length detailed -o ~/Desktop
  haengbal generate input.xlsx -c mid --usage-log usage.jsonl --quiet")]
    Generate {
        /// Input workbook (.xlsx/.xls)
        input: PathBuf,

        /// School category
        #[arg(long, short = 'c')]
        category: CategoryArg,

        /// Length of the generated text
        #[arg(long, default_value = "moderate")]
        length: LengthArg,

        /// Output file, or a directory for the category default
        /// filename. Defaults to the current directory.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Model identifier
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// API key (overrides keychain and environment)
        #[arg(long)]
        api_key: Option<String>,

        /// API base URL override (testing)
        #[arg(long, hide = true)]
        endpoint: Option<String>,

        /// Drop rows whose characteristics are shorter than this many
        /// characters
        #[arg(long, value_name = "N")]
        min_chars: Option<usize>,

        /// Append one JSON line per generated row (prompt + result)
        #[arg(long, value_name = "FILE")]
        usage_log: Option<PathBuf>,

        /// Suppress progress and warnings
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Manage the stored Gemini API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a key in the system keychain
    Set { key: String },
    /// Remove the key from the system keychain
    Delete,
    /// Show where the effective key comes from
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Kinder,
    Ele,
    Mid,
}

impl From<CategoryArg> for SchoolCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Kinder => SchoolCategory::Kinder,
            CategoryArg::Ele => SchoolCategory::Ele,
            CategoryArg::Mid => SchoolCategory::Mid,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LengthArg {
    Concise,
    Moderate,
    Detailed,
    Random,
}

impl From<LengthArg> for LengthMode {
    fn from(arg: LengthArg) -> Self {
        match arg {
            LengthArg::Concise => LengthMode::Concise,
            LengthArg::Moderate => LengthMode::Moderate,
            LengthArg::Detailed => LengthMode::Detailed,
            LengthArg::Random => LengthMode::Random,
        }
    }
}

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::parse(e.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Template { category, output } => cmd_template(category.into(), output),
        Commands::Inspect { input, category, json, min_chars } => {
            cmd_inspect(&input, category.into(), json, min_chars)
        }
        Commands::Generate {
            input,
            category,
            length,
            output,
            model,
            temperature,
            api_key,
            endpoint,
            min_chars,
            usage_log,
            quiet,
        } => cmd_generate(GenerateArgs {
            input,
            category: category.into(),
            length: length.into(),
            output,
            model,
            temperature,
            api_key,
            endpoint,
            min_chars,
            usage_log,
            quiet,
        }),
        Commands::Key { action } => cmd_key(action),
    }
}

// ── template ────────────────────────────────────────────────────────

fn cmd_template(category: SchoolCategory, output: Option<PathBuf>) -> Result<(), CliError> {
    let path = resolve_output(output, |dir| template_path(dir));
    write_template(category, &path).map_err(|e| CliError::io(e.to_string()))?;
    println!("template written: {}", path.display());
    Ok(())
}

// ── inspect ─────────────────────────────────────────────────────────

fn cmd_inspect(
    input: &Path,
    category: SchoolCategory,
    json: bool,
    min_chars: Option<usize>,
) -> Result<(), CliError> {
    let result = read_input(input, category, min_chars)?;
    report_filtering(&result, min_chars, false);

    if json {
        let text = serde_json::to_string_pretty(&result.records).map_err(|e| CliError {
            code: exit_codes::EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })?;
        println!("{}", text);
    } else {
        for record in &result.records {
            match &record.activity {
                Some(activity) if !activity.is_empty() => {
                    println!("{:>4}  {}  [{}]", record.number, record.characteristics, activity)
                }
                _ => println!("{:>4}  {}", record.number, record.characteristics),
            }
        }
        eprintln!(
            "{} records ({} skipped)",
            result.records.len(),
            result.rows_skipped
        );
    }
    Ok(())
}

// ── generate ────────────────────────────────────────────────────────

struct GenerateArgs {
    input: PathBuf,
    category: SchoolCategory,
    length: LengthMode,
    output: Option<PathBuf>,
    model: Option<String>,
    temperature: Option<f32>,
    api_key: Option<String>,
    endpoint: Option<String>,
    min_chars: Option<usize>,
    usage_log: Option<PathBuf>,
    quiet: bool,
}

fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut settings = GenSettings::default();
    if let Some(model) = args.model {
        settings.model = model;
    }
    if let Some(temperature) = args.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(CliError::args(format!(
                "temperature {} out of range",
                temperature
            ))
            .with_hint("valid range is 0.0 to 2.0"));
        }
        settings.temperature = temperature;
    }

    let api_key = resolve_api_key(args.api_key)?;

    let client = match args.endpoint {
        Some(endpoint) => GeminiClient::with_base_url(api_key, &settings, endpoint),
        None => GeminiClient::new(api_key, &settings),
    }
    .map_err(gen_error_to_cli)?;

    let min_chars = args.min_chars.unwrap_or(settings.min_characteristics_chars);
    let mut result = read_input(&args.input, args.category, Some(min_chars))?;
    report_filtering(&result, Some(min_chars), args.quiet);

    let mut usage_sink = match &args.usage_log {
        Some(path) => Some(JsonlUsageLog::open(path)?),
        None => None,
    };

    let out_path = resolve_output(args.output, |dir| results_path(dir, args.category));
    let total = result.records.len();
    let quiet = args.quiet;
    let mut state = RunState::Idle;

    let run_result = generate_to_file(
        &client,
        &mut result.records,
        args.category,
        args.length,
        Some(&result.source),
        &out_path,
        &CancelToken::new(),
        usage_sink.as_mut().map(|s| s as &mut dyn UsageLog),
        &mut state,
        |progress| {
            if !quiet {
                eprint!("\rgenerating... {:>3}%", progress);
                let _ = std::io::stderr().flush();
            }
        },
    );
    if !quiet && total > 0 {
        eprintln!();
    }

    match run_result {
        Ok(()) => {
            println!("results written: {} ({} records)", out_path.display(), total);
            Ok(())
        }
        Err(RunError::Generation { row, source }) => Err(CliError {
            code: EXIT_GEN_FAILED,
            message: format!("generation failed at row {}: {}", row + 1, source),
            hint: Some(
                "no results file was written; re-running regenerates all rows".to_string(),
            ),
        }),
        Err(RunError::Cancelled { completed }) => Err(CliError {
            code: EXIT_CANCELLED,
            message: format!("cancelled after {} records", completed),
            hint: None,
        }),
        Err(RunError::Export(e)) => Err(CliError::io(e.to_string())),
    }
}

/// Key precedence: --api-key flag first, then the keychain/environment
/// lookup.
fn resolve_api_key(flag: Option<String>) -> Result<String, CliError> {
    if let Some(key) = flag {
        if !key.is_empty() {
            return Ok(key);
        }
    }
    match config::get_api_key().key {
        Some(key) => Ok(key),
        None => Err(CliError {
            code: EXIT_AI_MISSING_KEY,
            message: "missing Gemini API key".to_string(),
            hint: Some(
                "pass --api-key, set HAENGBAL_GEMINI_KEY, or store one with `haengbal key set`"
                    .to_string(),
            ),
        }),
    }
}

fn gen_error_to_cli(e: GenError) -> CliError {
    let code = match e {
        GenError::MissingKey => EXIT_AI_MISSING_KEY,
        _ => EXIT_GEN_FAILED,
    };
    CliError { code, message: e.to_string(), hint: None }
}

// ── key management ──────────────────────────────────────────────────

fn cmd_key(action: KeyAction) -> Result<(), CliError> {
    match action {
        KeyAction::Set { key } => {
            config::ai::set_api_key(&key).map_err(|e| CliError {
                code: EXIT_AI_KEYCHAIN_ERR,
                message: e,
                hint: None,
            })?;
            println!("key stored in keychain");
            Ok(())
        }
        KeyAction::Delete => {
            config::ai::delete_api_key().map_err(|e| CliError {
                code: EXIT_AI_KEYCHAIN_ERR,
                message: e,
                hint: None,
            })?;
            println!("key deleted from keychain");
            Ok(())
        }
        KeyAction::Status => {
            let lookup = config::get_api_key();
            match lookup.source {
                KeySource::None => println!("no key configured (keychain available: {})",
                    config::keychain_available()),
                source => println!("key found ({})", source.as_str()),
            }
            Ok(())
        }
    }
}

// ── shared helpers ──────────────────────────────────────────────────

fn read_input(
    input: &Path,
    category: SchoolCategory,
    min_chars: Option<usize>,
) -> Result<ImportResult, CliError> {
    let bytes = fs::read(input)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", input.display(), e)))?;
    let options = ReadOptions {
        min_characteristics_chars: min_chars,
    };
    Ok(read_with_options(&bytes, category, &options)?)
}

fn report_filtering(result: &ImportResult, min_chars: Option<usize>, quiet: bool) {
    if quiet {
        return;
    }
    if result.rows_rejected > 0 {
        let min = min_chars.unwrap_or(0);
        eprintln!(
            "warning: removed {} row(s) with characteristics shorter than {} chars",
            result.rows_rejected, min
        );
    }
}

/// An explicit file path is used as-is; a directory (or no flag at all,
/// meaning the current directory) gets the default filename.
fn resolve_output(output: Option<PathBuf>, default_name: impl Fn(&Path) -> PathBuf) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => default_name(&path),
        Some(path) => path,
        None => default_name(Path::new(".")),
    }
}

/// Usage log sink: one JSON object per line, append-only.
struct JsonlUsageLog {
    file: fs::File,
}

impl JsonlUsageLog {
    fn open(path: &Path) -> Result<Self, CliError> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CliError::io(format!("cannot open usage log {}: {}", path.display(), e)))?;
        Ok(Self { file })
    }
}

impl UsageLog for JsonlUsageLog {
    fn record(&mut self, entry: &UsageEntry<'_>) -> Result<(), String> {
        let line = serde_json::json!({
            "row": entry.row,
            "prompt": entry.prompt,
            "result": entry.result,
            "at": entry.at.to_rfc3339(),
        });
        writeln!(self.file, "{}", line).map_err(|e| e.to_string())
    }
}
