use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

use wikilint_lib::batch::{AutomaticFixer, CancellationFlag, FixMode, PageInput};
use wikilint_lib::check_result::{CheckErrorPage, ErrorLevel};
use wikilint_lib::config::{self as wikilint_config, Config, ConfigError};
use wikilint_lib::exit_codes::exit;
use wikilint_lib::page::Page;
use wikilint_lib::page_analysis::PageAnalysis;
use wikilint_lib::rules;

/// Default file written by `wikilint init`
const DEFAULT_CONFIG_FILE: &str = "wikilint.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"], help = "Control colored output: auto, always, never")]
    color: String,

    /// Path to configuration file
    #[arg(long, global = true, help = "Path to configuration file")]
    config: Option<String>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze wikitext files and print the errors found
    Check(CheckArgs),
    /// Apply automatic fixes to wikitext files
    Fix(FixArgs),
    /// List the available rules with their priority
    Rules,
    /// Initialize a new configuration file
    Init,
}

#[derive(Args)]
struct CheckArgs {
    /// Wikitext files to analyze
    #[arg(required = true)]
    files: Vec<String>,

    /// Page title (defaults to the file name)
    #[arg(long)]
    title: Option<String>,

    /// Only report errors that have an automatic fix
    #[arg(long)]
    only_automatic: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(Args)]
struct FixArgs {
    /// Wikitext files to fix in place
    #[arg(required = true)]
    files: Vec<String>,

    /// Page title (defaults to the file name)
    #[arg(long)]
    title: Option<String>,

    /// Which fixes to apply
    #[arg(long, value_enum, default_value_t = ModeArg::Automatic)]
    mode: ModeArg,

    /// Report what would change without writing files
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Automatic,
    Bot,
}

impl From<ModeArg> for FixMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Automatic => FixMode::Automatic,
            ModeArg::Bot => FixMode::Bot,
        }
    }
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    page: &'a str,
    errors: &'a [CheckErrorPage],
}

/// Page title for a file: the explicit title or the file stem
fn page_for(path: &str, title: Option<&str>) -> Page {
    match title {
        Some(title) => Page::new(title),
        None => {
            let stem = Path::new(path)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
            Page::new(&stem)
        }
    }
}

fn read_page(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {path}"))
}

fn load_config(config_path: Option<&str>) -> Config {
    Config::load(config_path).unwrap_or_else(|e| {
        eprintln!("{}: {}", "Config error".red().bold(), e);
        exit::tool_error();
    })
}

fn print_text_report(path: &str, analysis: &PageAnalysis, errors: &[CheckErrorPage]) {
    for error_page in errors {
        for result in &error_page.results {
            let (line, column) = analysis.offset_to_line_col(result.begin());
            let excerpt = &analysis.contents()[result.begin()..result.end()];
            let level = match result.level() {
                ErrorLevel::Error => String::new(),
                ErrorLevel::Warning => format!("{} ", "warning:".yellow()),
                ErrorLevel::Correct => format!("{} ", "info:".dimmed()),
            };
            println!(
                "{}:{}:{}: {} {}{} {}",
                path.blue().underline(),
                line.to_string().cyan(),
                column.to_string().cyan(),
                format!("[{}]", error_page.rule_name).yellow(),
                level,
                error_page.description,
                format!("{excerpt:?}").dimmed()
            );
            for replacement in result.replacements() {
                let marker = if replacement.automatic {
                    "[auto]".green().to_string()
                } else {
                    "[manual]".dimmed().to_string()
                };
                println!("    {} {:?} {}", "->".dimmed(), replacement.text, marker);
            }
        }
    }
}

fn run_check(args: &CheckArgs, config: &Config) -> Result<bool> {
    let rules = rules::interactive_rules(config);
    let mut found = false;
    let mut reports = Vec::new();

    for path in &args.files {
        let contents = read_page(path)?;
        let page = page_for(path, args.title.as_deref());
        let analysis = PageAnalysis::new(&page, &contents);
        let errors = wikilint_lib::analyze_errors(&analysis, &rules, args.only_automatic);
        found |= !errors.is_empty();
        match args.output {
            OutputFormat::Text => print_text_report(path, &analysis, &errors),
            OutputFormat::Json => reports.push((path.as_str(), page.title().to_string(), errors)),
        }
    }

    match args.output {
        OutputFormat::Json => {
            let reports: Vec<FileReport> = reports
                .iter()
                .map(|(file, page, errors)| FileReport { file, page, errors })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Text => {
            if !found {
                println!("{} No errors found in {} file(s)", "Success:".green().bold(), args.files.len());
            }
        }
    }
    Ok(found)
}

fn run_fix(args: &FixArgs, config: &Config) -> Result<bool> {
    let inputs = args
        .files
        .iter()
        .map(|path| -> Result<PageInput> {
            let contents = read_page(path)?;
            Ok(PageInput::new(page_for(path, args.title.as_deref()), contents))
        })
        .collect::<Result<Vec<_>>>()?;

    let rules = match args.mode {
        ModeArg::Bot => rules::configured_rules(config),
        ModeArg::Automatic => rules::interactive_rules(config),
    };
    let fixer = AutomaticFixer::new(rules, args.mode.into(), config.global.max_fix_iterations);
    let outcome = fixer.run(&inputs, &CancellationFlag::new());

    let mut modified = 0;
    for (path, page) in args.files.iter().zip(&outcome.pages) {
        if !page.is_modified() {
            continue;
        }
        modified += 1;
        if args.dry_run {
            println!("{} {} ({})", "Would fix".yellow(), path, page.applied_rules.join(", "));
        } else {
            fs::write(path, &page.fixed).with_context(|| format!("Failed to write file {path}"))?;
            println!("{} {} ({})", "Fixed".green(), path, page.applied_rules.join(", "));
        }
    }
    println!("{modified} of {} file(s) modified", outcome.pages.len());

    if !outcome.needs_manual_review.is_empty() {
        println!("{}", "Needs manual review:".yellow().bold());
        for title in &outcome.needs_manual_review {
            println!("  {title}");
        }
    }
    Ok(!outcome.needs_manual_review.is_empty())
}

fn run_rules(config: &Config) {
    for rule in rules::all_rules(config) {
        let enabled = config.is_rule_enabled(rule.number()) && rule.priority().is_active();
        let status = if enabled { "enabled".green() } else { "disabled".dimmed() };
        println!(
            "{} {:<20} {} - {}",
            rule.name().yellow(),
            rule.priority().label(),
            status,
            rule.short_description()
        );
        for parameter in rule.parameters() {
            let mut flags = Vec::new();
            if parameter.optional {
                flags.push("optional");
            }
            if parameter.multiple {
                flags.push("multiple");
            }
            println!(
                "    {} ({}) - {}",
                parameter.name.cyan(),
                flags.join(", "),
                parameter.description
            );
        }
    }
}

fn run_init() {
    match wikilint_config::create_default_config(DEFAULT_CONFIG_FILE) {
        Ok(()) => println!("Created default configuration file: {DEFAULT_CONFIG_FILE}"),
        Err(ConfigError::FileExists { path }) => {
            eprintln!("{}: Configuration file already exists at {}", "Error".red().bold(), path);
            exit::tool_error();
        }
        Err(e) => {
            eprintln!("{}: Failed to create config file: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    match cli.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::unset_override(),
    }

    let result = match &cli.command {
        Commands::Init => {
            run_init();
            Ok(false)
        }
        Commands::Rules => {
            run_rules(&load_config(cli.config.as_deref()));
            Ok(false)
        }
        Commands::Check(args) => run_check(args, &load_config(cli.config.as_deref())),
        Commands::Fix(args) => run_fix(args, &load_config(cli.config.as_deref())),
    };

    match result {
        Ok(false) => exit::success(),
        Ok(true) => exit::violations_found(),
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            exit::tool_error();
        }
    }
}
