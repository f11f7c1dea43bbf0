use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{CliArgs, Command};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::dispatch::{SearchOutcome, SearchState};
use crate::omdb::{MovieRecord, DEFAULT_BASE_URL};
use crate::output::{self, OutputFormat};
use crate::render::{DETAIL_URL_BASE, NO_IMAGE_PLACEHOLDER};
use crate::runner::{Options, RunReport, Runner};

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: Option<&'a str>, default: &'a str) -> &'a str {
    match v {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8, no_color: bool) {
    let default_level = verbosity_level(verbose);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    command: Command,
    options: Options,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(
    args: CliArgs,
    cfg: ConfigFile,
    env_api_key: Option<String>,
) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let api_key = args
        .api_key
        .or(cfg.api_key)
        .filter(|k| !k.trim().is_empty())
        .or(env_api_key);

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let debounce_ms = args.debounce_ms.or(cfg.debounce_ms).unwrap_or(500);
    let min_query_len = args.min_query_len.or(cfg.min_query_len).unwrap_or(3);
    let search_pages = args.search_pages.or(cfg.search_pages).unwrap_or(5);
    let guard_stale_results = args.guard_stale || cfg.guard_stale_results.unwrap_or(false);

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde(&p).to_string_lossy().into_owned());
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output_format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(match args.command {
                Command::Page => OutputFormat::Html,
                _ => OutputFormat::Text,
            }),
    };

    Ok(RunConfig {
        command: args.command,
        options: Options {
            api_key,
            base_url,
            timeout_seconds: timeout,
            proxy,
            debounce_ms,
            min_query_len,
            search_pages,
            placeholder_poster: cfg
                .placeholder_poster
                .unwrap_or_else(|| NO_IMAGE_PLACEHOLDER.to_string()),
            detail_url_base: cfg
                .detail_url_base
                .unwrap_or_else(|| DETAIL_URL_BASE.to_string()),
            guard_stale_results,
        },
        output,
        output_format,
        no_color,
        verbose: args.verbose,
    })
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "text",
        OutputFormat::Json => "json",
        OutputFormat::Html => "html",
    }
}

fn print_settings(run: &RunConfig) {
    let opts = &run.options;
    format_kv_line("Command", run.command.label());
    format_kv_line("Endpoint", &opts.base_url);
    format_kv_line("Timeout", &format!("{}s", opts.timeout_seconds));
    format_kv_line("Proxy", format_opt_value(opts.proxy.as_deref(), "none"));
    format_kv_line("Debounce", &format!("{}ms", opts.debounce_ms));
    format_kv_line(
        "Search",
        &format!(
            "{} pages, min {} chars, stale guard {}",
            opts.search_pages,
            opts.min_query_len,
            crate::utils::format_bool(opts.guard_stale_results)
        ),
    );
    format_kv_line(
        "Output",
        &format!(
            "{} ({})",
            format_opt_value(run.output.as_deref(), "stdout"),
            format_label(run.output_format)
        ),
    );
    eprintln!();
}

fn print_report(report: &RunReport) {
    format_kv_line("Action", &report.action.bold().to_string());
    format_kv_line("State", &report.state.to_string().cyan().to_string());
    for section in &report.sections {
        format_kv_line(
            "Section",
            &format!(
                "{} ({}) {}",
                section.heading,
                section.target,
                section.movies.len().to_string().green()
            ),
        );
    }
    if let Some(notice) = report.notice.as_deref() {
        format_kv_line("Notice", &notice.yellow().to_string());
    }
    format_kv_line("Elapsed", &format!("{}ms", report.elapsed.as_millis()));
}

fn print_outcome(outcome: &SearchOutcome) {
    let status = if outcome.applied {
        outcome.results.len().to_string().green()
    } else {
        "stale, dropped".yellow()
    };
    format_kv_line("Results", &format!("{} :: {}", outcome.query, status));
    for movie in outcome.results.iter().take(5) {
        eprintln!(
            "   {} {} [{}]",
            movie.year_text(),
            crate::utils::truncate_chars(&movie.title, 48),
            movie.rating_text()
        );
    }
}

fn spinner(message: &str) -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} :: Duration: [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress style: {e}"))?,
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

async fn emit(run: &RunConfig, runner: &Runner, report: &RunReport) -> Result<(), String> {
    let records = output::build_records(report, runner.renderer());
    let bytes = match run.output_format {
        OutputFormat::Text => output::render_text(&records),
        OutputFormat::Json => output::render_json(&records),
        OutputFormat::Html => {
            let page = runner.page();
            let page = page.lock().await;
            output::report::render_document(&page, &records)
        }
    };

    match run.output.as_deref() {
        Some(path) => {
            tokio::fs::write(path, &bytes)
                .await
                .map_err(|e| format!("failed to write output '{path}': {e}"))?;
            format_kv_line("Saved", path);
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&bytes)
                .await
                .map_err(|e| format!("failed to write stdout: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to flush stdout: {e}"))?;
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum WatchLine {
    Input(String),
    Genre(String),
    Nav(String),
    Quit,
    Unknown(String),
}

fn parse_watch_line(line: &str) -> WatchLine {
    let Some(command) = line.trim_start().strip_prefix(':') else {
        return WatchLine::Input(line.to_string());
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .unwrap_or((command, ""));
    match name.trim() {
        "q" | "quit" => WatchLine::Quit,
        "genre" if rest.trim().is_empty() => WatchLine::Unknown("genre".to_string()),
        "genre" => WatchLine::Genre(rest.trim().to_string()),
        "nav" => WatchLine::Nav(rest.trim().to_string()),
        other => WatchLine::Unknown(other.to_string()),
    }
}

/// Returns false once the session should end.
async fn handle_watch_line(runner: &Runner, line: &str) -> bool {
    match parse_watch_line(line) {
        WatchLine::Quit => return false,
        WatchLine::Input(value) => {
            let state = runner.dispatcher().input(&value).await;
            format_kv_line("Input", &format!("{:?} -> {}", value, state.to_string().cyan()));
        }
        WatchLine::Genre(name) => {
            // outcome arrives through the subscription
            runner.dispatcher().activate_genre(&name).await;
        }
        WatchLine::Nav(category) => match runner.navigate(&category).await {
            Ok((_, report)) => {
                if let Some(notice) = report.notice.as_deref() {
                    format_kv_line("Notice", &notice.yellow().to_string());
                }
                format_kv_line("State", &report.state.to_string().cyan().to_string());
            }
            Err(e) => format_kv_line("Error", &e.to_string().red().to_string()),
        },
        WatchLine::Unknown(name) => {
            format_kv_line(
                "Error",
                &format!("unknown command ':{name}' (use :genre NAME, :nav CATEGORY or :quit)")
                    .red()
                    .to_string(),
            );
        }
    }
    true
}

async fn run_watch(runner: &Runner) -> Result<RunReport, String> {
    let started_at = Instant::now();
    let home = runner.render_home().await;
    format_kv_line("Catalog", &format!("{} movies", home.movie_count()));

    let mut outcomes = runner.dispatcher().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last: Vec<MovieRecord> = Vec::new();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_watch_line(runner, &line).await {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => return Err(format!("failed to read stdin: {e}")),
            },
            outcome = outcomes.recv() => match outcome {
                Ok(outcome) => {
                    print_outcome(&outcome);
                    if outcome.applied {
                        last = outcome.results;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    // let a search that is still pending or in flight land before exiting
    let opts = runner.options();
    let grace = Duration::from_millis(opts.debounce_ms)
        + Duration::from_secs(opts.timeout_seconds as u64 * 2);
    while runner.dispatcher().state() == SearchState::Searching {
        match tokio::time::timeout(grace, outcomes.recv()).await {
            Ok(Ok(outcome)) => {
                print_outcome(&outcome);
                if outcome.applied {
                    last = outcome.results;
                }
            }
            Ok(Err(RecvError::Lagged(_))) => continue,
            _ => break,
        }
    }

    Ok(RunReport::new(started_at, "watch", runner.dispatcher().state()).with_search_results(last))
}

async fn run_command(runner: &Runner, command: &Command) -> Result<RunReport, String> {
    let report = match command {
        Command::Page => runner.render_home().await,
        Command::Catalog { list } => runner.render_list(list).await.map_err(|e| e.to_string())?,
        Command::Search { query } => runner.search(&query.join(" ")).await,
        Command::Genre { name } => runner.activate_genre(name).await,
        Command::Nav { category } => {
            let (_, report) = runner.navigate(category).await.map_err(|e| e.to_string())?;
            report
        }
        Command::Watch => run_watch(runner).await?,
        Command::Config { .. } => return Err("config does not start a runner".to_string()),
    };
    Ok(report)
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    print_settings(&run);
    let runner = Runner::new(run.options.clone()).map_err(|e| e.to_string())?;

    // watch prints its own progress lines
    let pb = match run.command {
        Command::Watch => None,
        _ => Some(spinner(&format!("Running {}", run.command.label()))?),
    };
    let result = run_command(&runner, &run.command).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let mut report = result?;
    if report.state == SearchState::Typing {
        report.notice = Some(format!(
            "query shorter than {} characters, nothing fetched",
            run.options.min_query_len
        ));
    }

    print_report(&report);
    emit(&run, &runner, &report).await
}

fn run_config_command(path: Option<PathBuf>, init: bool) -> Result<(), String> {
    let path = path
        .or_else(config::default_config_path)
        .ok_or_else(|| "could not determine config path (set HOME or pass --config)".to_string())?;
    if init {
        let created = config::ensure_default_config_file(&path)?;
        let state = if created { "created" } else { "already exists" };
        format_kv_line("Config", &format!("{} ({state})", path.display()));
        return Ok(());
    }
    let cfg = config::load_config(&path, true)?;
    format_kv_line("Config", &path.display().to_string());
    let yaml =
        serde_yaml::to_string(&cfg).map_err(|e| format!("failed to render config: {e}"))?;
    print!("{yaml}");
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{e}");
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.as_deref().map(config::expand_tilde);
    if let Command::Config { init } = args.command {
        return run_config_command(user_config_path, init);
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg, config::env_api_key())?;
    if run.no_color {
        colored::control::set_override(false);
    }
    init_tracing(run.verbose, run.no_color);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
