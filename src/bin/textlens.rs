//! textlens CLI — 文本分析命令行入口：调用厂商、展示 token 与成本
//!
//! Usage:
//!   textlens analyze <provider> [--model <m>] [--task <kind>] [--text <t>]
//!   textlens tokenize [--text <t>]
//!   textlens providers
//!   textlens version

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use textlens::{
    estimate_cost, estimate_token_count, tokenize_for_display, Client, GenerationOptions,
    ProviderId, TaskKind, TaskRunner, UsageAccumulator,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "analyze" => cmd_analyze(&args[2..]).await,
        "tokenize" => cmd_tokenize(&args[2..]),
        "providers" => cmd_providers(),
        "version" | "--version" | "-V" => {
            println!("textlens {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    println!(
        r#"textlens — multi-provider text analysis

USAGE:
    textlens <COMMAND> [OPTIONS]

COMMANDS:
    analyze <provider>    Run summarize/sentiment/style against one provider
                          (groq, gemini or mistral; reads stdin unless --text given)
        --model <name>        Override the provider's default model
        --task <kind>         Run a single task kind instead of all three
        --temperature <t>     Sampling temperature in [0, 1]
        --max-tokens <n>      Completion length cap
        --text <text>         Analyze this text instead of stdin
    tokenize              Print per-scheme token breakdowns
        --text <text>         Tokenize this text instead of stdin
    providers             List provider registration records
    version               Show version information
    help                  Show this help message

ENVIRONMENT:
    GROQ_API_KEY, GEMINI_API_KEY, MISTRAL_API_KEY   provider credentials
    TEXTLENS_HTTP_TIMEOUT_SECS                      outbound request timeout
    RUST_LOG                                        tracing filter
"#
    );
}

struct AnalyzeArgs {
    provider: ProviderId,
    model: Option<String>,
    task: Option<TaskKind>,
    options: GenerationOptions,
    text: Option<String>,
}

fn parse_analyze_args(args: &[String]) -> Result<AnalyzeArgs, String> {
    let provider_arg = args.first().ok_or("analyze requires a provider argument")?;
    let provider: ProviderId = provider_arg.parse().map_err(|e| format!("{e}"))?;

    let mut parsed = AnalyzeArgs {
        provider,
        model: None,
        task: None,
        options: GenerationOptions::default(),
        text: None,
    };

    let mut iter = args[1..].iter();
    while let Some(flag) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match flag.as_str() {
            "--model" => parsed.model = Some(value("--model")?),
            "--task" => {
                parsed.task = Some(value("--task")?.parse().map_err(|e| format!("{e}"))?);
            }
            "--temperature" => {
                let raw = value("--temperature")?;
                let t: f64 = raw.parse().map_err(|_| format!("bad temperature '{raw}'"))?;
                parsed.options = parsed.options.with_temperature(t);
            }
            "--max-tokens" => {
                let raw = value("--max-tokens")?;
                let n: u32 = raw.parse().map_err(|_| format!("bad max-tokens '{raw}'"))?;
                parsed.options = parsed.options.with_max_tokens(n);
            }
            "--text" => parsed.text = Some(value("--text")?),
            other => return Err(format!("unknown flag '{other}'")),
        }
    }
    Ok(parsed)
}

async fn cmd_analyze(args: &[String]) -> ExitCode {
    let parsed = match parse_analyze_args(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::FAILURE;
        }
    };

    let text = match read_text(parsed.text) {
        Ok(text) => text,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::FAILURE;
        }
    };

    // Startup-time credential validation: fail fast, naming every missing key.
    let client = match Client::builder().build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runner = TaskRunner::new(Arc::new(client));
    let usage = UsageAccumulator::new();
    let model = parsed.model.as_deref();

    let results = match parsed.task {
        Some(kind) => vec![(
            kind,
            runner
                .run(kind, &text, parsed.provider, model, &parsed.options)
                .await,
        )],
        None => {
            runner
                .run_all(&text, parsed.provider, model, &parsed.options)
                .await
        }
    };

    let mut failures = 0;
    for (kind, result) in &results {
        println!("== {kind} ({}) ==", parsed.provider);
        match &result.error {
            Some(error) => {
                failures += 1;
                println!("  error: {error}");
            }
            None => println!("{}", result.output_text),
        }
        let cost = estimate_cost(parsed.provider, result.prompt_tokens, result.completion_tokens);
        println!(
            "  tokens: {} prompt + {} completion | latency: {:.2}s | est. cost: ${:.6}",
            result.prompt_tokens, result.completion_tokens, result.latency_seconds, cost
        );
        println!();
        if result.error.is_none() {
            usage.accumulate(result.prompt_tokens, result.completion_tokens, cost);
        }
    }

    let snapshot = usage.snapshot();
    println!(
        "session: {} tokens, est. ${:.6}",
        snapshot.total_tokens, snapshot.total_cost
    );

    if failures == results.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn cmd_tokenize(args: &[String]) -> ExitCode {
    let mut text = None;
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        if flag == "--text" {
            text = iter.next().cloned();
        }
    }
    let text = match read_text(text) {
        Ok(text) => text,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return ExitCode::FAILURE;
        }
    };

    println!("estimated tokens (cl100k): {}", estimate_token_count(&text));
    for (scheme, breakdown) in tokenize_for_display(&text) {
        println!("\n[{scheme}] {} tokens", breakdown.count);
        if !breakdown.tokens.is_empty() {
            println!("  {:?}", breakdown.tokens);
        }
    }
    ExitCode::SUCCESS
}

fn cmd_providers() -> ExitCode {
    for provider in ProviderId::ALL {
        let spec = provider.spec();
        println!(
            "{:<8} model={:<24} endpoint={}{}  ${:.4}/${:.4} per 1K",
            provider.as_str(),
            spec.default_model,
            spec.base_url,
            spec.chat_path,
            spec.pricing.prompt_per_1k,
            spec.pricing.completion_per_1k,
        );
    }
    ExitCode::SUCCESS
}

fn read_text(explicit: Option<String>) -> Result<String, String> {
    let text = match explicit {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        }
    };
    if text.trim().is_empty() {
        return Err("no input text (pass --text or pipe to stdin)".into());
    }
    Ok(text)
}
