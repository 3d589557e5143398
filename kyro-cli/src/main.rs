//! Kyro CLI - Command line interface
//!
//! Drives the native extension bridge from the terminal: list installed
//! modules, inspect function metadata, and call functions with literal
//! arguments through any of the three call shapes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

mod config;
mod logging;

use config::ProjectJson;
use kyro_api::{init_config, Host, KwArgs, KyroError, RunConfig};
use kyro_core::runtime::object::{alloc, ObjDict, ObjString, ObjTuple};
use kyro_core::Value;

#[derive(Parser)]
#[command(
    name = "kyro",
    about = "Kyro runtime - native extension call bridge",
    version = "0.1.0"
)]
struct Cli {
    /// Configuration file path (optional kyro.json)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: pretty, compact, json
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed extension modules and their functions
    List,
    /// Show metadata for one function (doc, calling convention)
    Doc {
        /// Call target as module.function
        target: String,
    },
    /// Call module.function with literal arguments
    Call {
        /// Call target as module.function
        target: String,
        /// Positional literals: null, true, false, ints, floats; anything else is a string
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
        /// Keyword literal name=value (repeatable)
        #[arg(long = "kw", value_name = "NAME=VALUE")]
        kw: Vec<String>,
        /// Route through the exploded/generic call shape
        #[arg(long)]
        exploded: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Read optional project file
    let project = match &cli.config {
        Some(path) => match config::read_project_json(path) {
            Ok(project) => project,
            Err(message) => {
                eprintln!("Error: {}", message);
                process::exit(1);
            }
        },
        None => ProjectJson::default(),
    };

    init_logging(&cli, &project);

    // Build run configuration: project file first, CLI stays thin
    let run_config = RunConfig {
        limits: project.runtime.limits.clone(),
        trace: project.runtime.trace.clone(),
    };
    init_config(run_config.clone());

    let host = Host::new(run_config);

    let result = match &cli.command {
        Commands::List => handle_list(&host),
        Commands::Doc { target } => handle_doc(&host, target),
        Commands::Call {
            target,
            args,
            kw,
            exploded,
        } => handle_call(&host, target, args, kw, *exploded),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err.to_report());
        process::exit(1);
    }
}

/// CLI flag wins over the project file; default is warn/compact
fn init_logging(cli: &Cli, project: &ProjectJson) {
    let level_name = cli
        .log_level
        .as_deref()
        .or(project.log_level.as_deref())
        .unwrap_or("warn");
    let level = match logging::parse_level(level_name) {
        Some(level) => level,
        None => {
            eprintln!("Error: unknown log level '{}'", level_name);
            process::exit(1);
        }
    };
    let format_name = cli
        .log_format
        .as_deref()
        .or(project.log_format.as_deref())
        .unwrap_or("compact");
    let format = match logging::parse_format(format_name) {
        Some(format) => format,
        None => {
            eprintln!("Error: unknown log format '{}'", format_name);
            process::exit(1);
        }
    };
    logging::init(level, format);
}

fn handle_list(host: &Host) -> Result<(), KyroError> {
    for module in host.modules() {
        match &module.doc {
            Some(doc) => println!("{} - {}", module.name, doc),
            None => println!("{}", module.name),
        }
        for function in &module.functions {
            match &function.doc {
                Some(doc) => println!("  {:<12} {:<18} {}", function.name, function.convention, doc),
                None => println!("  {:<12} {}", function.name, function.convention),
            }
        }
    }
    Ok(())
}

fn handle_doc(host: &Host, target: &str) -> Result<(), KyroError> {
    let info = host.describe(target)?;
    println!("{}", info.name);
    println!("  convention: {}", info.convention);
    if let Some(doc) = &info.doc {
        println!("  doc: {}", doc);
    }
    Ok(())
}

fn handle_call(
    host: &Host,
    target: &str,
    args: &[String],
    kw: &[String],
    exploded: bool,
) -> Result<(), KyroError> {
    let positional: Vec<Value> = args.iter().map(|token| parse_literal(token)).collect();
    let keywords = parse_keywords(kw)?;

    let output = if exploded {
        // 组装序列 + 映射对象，走 Generic 形态
        let seq = Value::tuple(alloc(ObjTuple::new(positional)));
        let mapping = if keywords.is_empty() {
            Value::NULL
        } else {
            let mut dict = ObjDict::new();
            for (name, value) in &keywords {
                dict.insert(name, *value);
            }
            Value::dict(alloc(dict))
        };
        host.call_exploded(target, seq, mapping)?
    } else if keywords.is_empty() {
        host.call(target, &positional)?
    } else {
        let pairs: Vec<(&str, Value)> = keywords
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        host.call_with_keywords(target, &positional, &KwArgs::new(&pairs))?
    };

    println!("{}", output.rendered);
    Ok(())
}

/// Parse one literal argument token
fn parse_literal(token: &str) -> Value {
    match token {
        "null" => Value::NULL,
        "true" => Value::TRUE,
        "false" => Value::FALSE,
        _ => {
            if let Ok(n) = token.parse::<i32>() {
                Value::int(n)
            } else if let Ok(f) = token.parse::<f64>() {
                Value::float(f)
            } else {
                Value::string(alloc(ObjString::new(token.to_string())))
            }
        }
    }
}

/// Parse repeated name=value keyword tokens
fn parse_keywords(tokens: &[String]) -> Result<Vec<(String, Value)>, KyroError> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                out.push((name.to_string(), parse_literal(value)));
            }
            _ => return Err(KyroError::BadKeyword(token.to_string())),
        }
    }
    Ok(out)
}
