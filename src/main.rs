//! Ghostwriter CLI - Command-line interface
//!
//! Commands:
//!   generate  - Run the full pipeline for a request file
//!   analyze   - Analyze an existing code file
//!   suggest   - Print improvement suggestions for a code file
//!   processes - List loaded thinking processes
//!   patterns  - List the pattern library

use ghostwriter::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]),
        "analyze" => cmd_analyze(&args[2..]),
        "suggest" => cmd_suggest(&args[2..]),
        "processes" => cmd_processes(&args[2..]),
        "patterns" => cmd_patterns(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("ghostwriter {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
Ghostwriter - context-aware code generation

USAGE:
    ghostwriter <COMMAND> [OPTIONS]

COMMANDS:
    generate <request.yaml> [--out <path>]   Run the pipeline, print or write the artifact
    analyze <code-file> [--language <id>]    Analyze an existing file
    suggest <code-file> [--language <id>]    Print improvement suggestions for a file
    processes                                List loaded thinking processes
    patterns                                 List the pattern library
    version                                  Print version
    help                                     Show this help

OPTIONS (all commands):
    --config <path>      Engine config          [default: ghostwriter.yaml]
    --patterns <path>    Pattern library JSON   [default: patterns/code_patterns.json]
    --processes <dir>    Thinking processes     [default: thinking]
"#
    );
}

/// Shared flags every command understands
struct CommonOpts {
    config: PathBuf,
    patterns: PathBuf,
    processes: PathBuf,
}

impl CommonOpts {
    fn parse(args: &[String]) -> Self {
        Self {
            config: flag_value(args, "--config")
                .unwrap_or_else(|| "ghostwriter.yaml".to_string())
                .into(),
            patterns: flag_value(args, "--patterns")
                .unwrap_or_else(|| "patterns/code_patterns.json".to_string())
                .into(),
            processes: flag_value(args, "--processes")
                .unwrap_or_else(|| "thinking".to_string())
                .into(),
        }
    }

    fn engine(&self) -> Engine {
        Engine::bootstrap(&self.config, &self.patterns, &self.processes)
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|pos| args.get(pos + 1))
        .cloned()
}

fn first_positional(args: &[String]) -> Option<&String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = true;
            continue;
        }
        return Some(arg);
    }
    None
}

fn cmd_generate(args: &[String]) -> Result<()> {
    let request_path = first_positional(args).ok_or("generate requires a request file")?;
    let opts = CommonOpts::parse(args);

    let content = std::fs::read_to_string(Path::new(request_path))?;
    let request: GenerationRequest = serde_norway::from_str(&content)?;

    let engine = opts.engine();
    let generation = engine
        .generate(&request)
        .map_err(|failure| Error::Other(failure.to_string()))?;

    eprintln!(
        "Selected process '{}' ({} optimizer rounds)",
        generation.process_id, generation.optimizer_rounds
    );

    match flag_value(args, "--out") {
        Some(out) => {
            let path = PathBuf::from(out);
            let written = write_artifact(&generation.artifact, &path)?;
            if written {
                eprintln!("Written to: {}", path.display());
            } else {
                eprintln!("Unchanged: {}", path.display());
            }
        }
        None => print!("{}", generation.artifact.content),
    }

    if !generation.suggestions.is_empty() {
        eprintln!("\nSuggestions:");
        for suggestion in &generation.suggestions {
            eprintln!("  - {}", suggestion);
        }
    }

    Ok(())
}

fn cmd_analyze(args: &[String]) -> Result<()> {
    let analysis = analyze_file(args)?;
    print!("{}", analysis.to_report());
    Ok(())
}

fn cmd_suggest(args: &[String]) -> Result<()> {
    let analysis = analyze_file(args)?;
    for suggestion in &analysis.suggestions {
        println!("{}", suggestion);
    }
    Ok(())
}

fn analyze_file(args: &[String]) -> Result<CodeAnalysis> {
    let code_path = first_positional(args).ok_or("a code file is required")?;
    let opts = CommonOpts::parse(args);

    let content = std::fs::read_to_string(Path::new(code_path))?;
    let language = flag_value(args, "--language")
        .or_else(|| language_from_extension(Path::new(code_path)))
        .unwrap_or_else(|| "typescript".to_string());

    let artifact = CodeArtifact::new(language, content);
    Ok(opts.engine().analyze(&artifact))
}

fn language_from_extension(path: &Path) -> Option<String> {
    let lang = match path.extension()?.to_str()? {
        "ts" | "tsx" => "typescript",
        "jsx" => "react",
        "py" => "python",
        _ => return None,
    };
    Some(lang.to_string())
}

fn cmd_processes(args: &[String]) -> Result<()> {
    let opts = CommonOpts::parse(args);
    let engine = opts.engine();

    if engine.registry().is_empty() {
        println!("No thinking processes loaded from {}", opts.processes.display());
        return Ok(());
    }

    for process in engine.registry().iter() {
        println!(
            "{}  ({} steps, output: {})",
            process.id,
            process.steps.len(),
            process.output_kind()
        );
    }
    Ok(())
}

fn cmd_patterns(args: &[String]) -> Result<()> {
    let opts = CommonOpts::parse(args);
    let engine = opts.engine();

    let mut languages: Vec<&str> = engine.library().languages().collect();
    languages.sort_unstable();

    for language in languages {
        let patterns = engine.library().patterns_for(language);
        println!("{} ({} patterns)", language, patterns.len());
        for id in patterns {
            println!("  {}", id);
        }
    }
    Ok(())
}
