// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and the render and cache subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "markup-lite")]
#[command(about = "Render HTML templates with cached partials, expressions and variables")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template file, expanding partials from the template root
    Render {
        #[arg(help = "Path to the template file")]
        file: PathBuf,

        #[arg(short, long, help = "Directory holding the partial templates")]
        root: Option<PathBuf>,

        #[arg(
            short = 'V',
            long = "var",
            help = "Template variables (key=value)"
        )]
        vars: Vec<String>,

        #[arg(short, long, help = "Write the rendered HTML to this file")]
        output: Option<PathBuf>,

        #[arg(long, help = "Milliseconds to wait for the partial cache")]
        timeout_ms: Option<u64>,
    },

    /// Load the partial cache and list what it holds
    Cache {
        #[arg(help = "Directory holding the partial templates")]
        root: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,

        #[arg(long, help = "Milliseconds to wait for the partial cache")]
        timeout_ms: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Text,
    Json,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format
    pub fn parse_variables(
        vars: &[String],
    ) -> anyhow::Result<std::collections::HashMap<String, String>> {
        let mut variables = std::collections::HashMap::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                variables.insert(key.to_string(), value.to_string());
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}
