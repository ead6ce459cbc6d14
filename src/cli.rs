//! Command-line commands.
//!
//! `analyze` runs the paradox pipeline, `ask` sends one question straight to
//! the model for comparison, and `models` lists the available configs.

use std::io::{BufRead, Write};

use clap::{Args, Subcommand};
use serde_json::json;
use tracing::info;

use crate::config::ConfigLoader;
use crate::error::AppError;
use crate::llm::{ChatClient, ChatExchange, OpenAiCompatClient};
use crate::pipeline::{format_report, ParadoxDetector, DEFAULT_OUTPUT_LANGUAGE};
use crate::prompts::direct_answer_system_prompt;

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Inspect a statement for logical paradoxes
    Analyze(AnalyzeArgs),

    /// Ask the model directly, without the paradox pipeline
    Ask(AskArgs),

    /// List available model configs
    Models,
}

/// Options shared by commands that talk to a model.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model YAML config name or path, e.g. deepseek-chat or assets/models/deepseek-chat.yaml
    #[arg(long)]
    pub config: Option<String>,

    /// Output language requested from the model
    #[arg(long, default_value = DEFAULT_OUTPUT_LANGUAGE)]
    pub lang: String,
}

/// Arguments for `analyze`.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Statement or proposal to inspect (read from stdin when omitted)
    pub statement: Vec<String>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Print the structured JSON report instead of formatted text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `ask`.
#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Question for a direct model answer (read from stdin when omitted)
    pub question: Vec<String>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Custom system prompt
    #[arg(long)]
    pub system: Option<String>,

    /// Temperature override for this session
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Print JSON output instead of plain answer text
    #[arg(long)]
    pub json: bool,

    /// Multi-turn mode; type /exit to quit
    #[arg(long)]
    pub interactive: bool,
}

/// Result of CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output for stdout
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result; the message is prefixed with `[ERROR]`.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            exit_code: 1,
            message: format!("[ERROR] {}", message),
        }
    }

    /// Usage error (exit code 2).
    pub fn usage(message: impl std::fmt::Display) -> Self {
        Self {
            exit_code: 2,
            message: format!("[ERROR] {}", message),
        }
    }
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands, loader: &ConfigLoader) -> CliResult {
    match command {
        Commands::Analyze(args) => execute_analyze(args, loader).await,
        Commands::Ask(args) => execute_ask(args, loader).await,
        Commands::Models => execute_models(loader),
    }
}

/// Join positional words, or read one line from stdin when there are none.
pub fn read_input(parts: &[String], prompt: &str) -> String {
    if !parts.is_empty() {
        return parts.join(" ").trim().to_string();
    }
    eprint!("{}", prompt);
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
    line.trim().to_string()
}

async fn execute_analyze(args: AnalyzeArgs, loader: &ConfigLoader) -> CliResult {
    let statement = read_input(
        &args.statement,
        "Please enter the viewpoint or proposal to be examined: ",
    );
    if statement.is_empty() {
        return CliResult::usage("Input statement cannot be empty.");
    }

    let detector = match loader
        .load(args.model.config.as_deref())
        .and_then(|config| ParadoxDetector::from_config(config, args.model.lang.clone()))
    {
        Ok(detector) => detector,
        Err(e) => return CliResult::error(e),
    };

    let report = match detector.analyze(&statement).await {
        Ok(report) => report,
        Err(e) => return CliResult::error(e),
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => CliResult::success(text),
            Err(e) => CliResult::error(e),
        }
    } else {
        CliResult::success(format_report(&report))
    }
}

async fn execute_ask(args: AskArgs, loader: &ConfigLoader) -> CliResult {
    let client = match loader.load(args.model.config.as_deref()).and_then(|config| {
        config.validate()?;
        OpenAiCompatClient::new(config)
    }) {
        Ok(client) => client,
        Err(e) => return CliResult::error(e),
    };

    let system_prompt = args
        .system
        .clone()
        .unwrap_or_else(|| direct_answer_system_prompt(&args.model.lang));

    if args.interactive {
        info!(
            provider = %client.config().provider,
            model = %client.config().model,
            "Interactive mode on"
        );
        eprintln!(
            "[INFO] Interactive mode on | provider={} model={} | /exit to quit",
            client.config().provider,
            client.config().model
        );
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        return match run_interactive(
            &client,
            &system_prompt,
            args.temperature,
            stdin.lock(),
            stdout.lock(),
        )
        .await
        {
            Ok(()) => CliResult::success(""),
            Err(e) => CliResult::error(e),
        };
    }

    let question = read_input(&args.question, "Please enter your question: ");
    if question.is_empty() {
        return CliResult::usage("Input question cannot be empty.");
    }

    let answer = match ask_once(&client, &system_prompt, &question, args.temperature).await {
        Ok(answer) => answer,
        Err(e) => return CliResult::error(e),
    };

    if args.json {
        let payload = json!({
            "provider": client.config().provider,
            "model": client.config().model,
            "question": question,
            "answer": answer,
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => CliResult::success(text),
            Err(e) => CliResult::error(e),
        }
    } else {
        CliResult::success(answer)
    }
}

fn execute_models(loader: &ConfigLoader) -> CliResult {
    let configs = loader.list();
    if configs.is_empty() {
        return CliResult::error(format!(
            "No model YAML found under {}.",
            loader.models_dir().display()
        ));
    }
    CliResult::success(configs.join("\n"))
}

/// Send one question and return the answer text.
pub async fn ask_once<C: ChatClient>(
    client: &C,
    system_prompt: &str,
    question: &str,
    temperature: Option<f64>,
) -> Result<String, AppError> {
    let exchange = ChatExchange::new(system_prompt, question).with_optional_temperature(temperature);
    Ok(client.chat(exchange).await?)
}

/// Question/answer loop until `/exit`, `exit`, `quit` or end of input.
///
/// A failed call is reported inline and the loop continues.
pub async fn run_interactive<C, R, W>(
    client: &C,
    system_prompt: &str,
    temperature: Option<f64>,
    mut input: R,
    mut output: W,
) -> std::io::Result<()>
where
    C: ChatClient,
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "Q> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(
            question.to_lowercase().as_str(),
            "/exit" | "exit" | "quit"
        ) {
            return Ok(());
        }

        match ask_once(client, system_prompt, question, temperature).await {
            Ok(answer) => writeln!(output, "A> {}", answer)?,
            Err(e) => writeln!(output, "[ERROR] {}", e)?,
        }
    }
}
