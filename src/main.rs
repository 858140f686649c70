use clap::Parser;
use eso::cli::{generate_completions, AppConfig, Args, Commands};
use eso::diagnostic::render_file_diagnostics;
use eso::{Config, Interpreter, Object};
use owo_colors::OwoColorize;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
const LOG_VAR: &str = "ESO_LOG";

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return ExitCode::SUCCESS;
    }

    let config = AppConfig::from_args(&args, Config::from_env());
    init_tracing(config.verbose);

    let (source, file) = match read_source(&args) {
        Ok(input) => input,
        Err(e) => {
            error_message(&config, &e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(file = %file, bytes = source.len(), "running script");

    let mut interpreter = Interpreter::with_config(config.interpreter.clone());
    match interpreter.eval_source(&source, &file) {
        Ok(value) => {
            if args.eval.is_some() && !matches!(value, Object::Null) {
                println!("{}", value);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let rendered =
                render_file_diagnostics(&source, &file, &err.to_diagnostics(), config.color_enabled);
            eprint!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "eso=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// The program text and the name used for it in error positions.
fn read_source(args: &Args) -> Result<(String, String), String> {
    if let Some(source) = &args.eval {
        return Ok((source.clone(), "<eval>".to_string()));
    }
    if let Some(path) = &args.file {
        let source = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        return Ok((source, path.display().to_string()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read from stdin: {}", e))?;
    Ok((buffer, "<stdin>".to_string()))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
