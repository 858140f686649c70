use crate::config::Config;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eso")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for the eso scripting language", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    /// Script to run; reads standard input when absent
    #[arg(value_name = "FILE", conflicts_with = "eval")]
    pub file: Option<PathBuf>,

    /// Evaluate SOURCE instead of a file
    #[arg(short, long, value_name = "SOURCE")]
    pub eval: Option<String>,

    /// Directory searched for imported modules before ESOPATH
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print shell completions
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
    pub interpreter: Config,
}

impl AppConfig {
    /// Combines the environment-derived [`Config`] with command-line overrides.
    pub fn from_args(args: &Args, base: Config) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr),
        };

        let mut interpreter = base;
        for dir in args.include.iter().rev() {
            interpreter = interpreter.with_search_path(dir.clone());
        }
        if let Some(depth) = args.max_depth {
            interpreter = interpreter.with_max_depth(depth);
        }

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            interpreter,
        }
    }
}
