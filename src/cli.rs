//! Command-line interface implementation for solgen.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::Override;

/// Command-line arguments structure for solgen.
#[derive(Parser, Debug)]
#[command(author, version, about = "solgen: scaffold a solution from a token template", long_about = None)]
pub struct Args {
    /// Path to the template directory
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory where the generated solution will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// JSON or YAML file with the values of template tokens
    #[arg(short, long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Set a token value, e.g. `--set solution.name=Acme`. Can be repeated.
    #[arg(short = 's', long = "set", value_name = "GROUP.PROPERTY=VALUE")]
    pub overrides: Vec<Override>,

    /// Force writing into an existing output directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                if let Err(err) = write_usage(&mut io::stdout()) {
                    eprintln!("Failed to print help: {err}");
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}

/// Writes the help text shown when required arguments are missing.
pub fn write_usage<W: Write>(out: &mut W) -> io::Result<()> {
    Args::command()
        .help_template(
            r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
        )
        .write_help(out)
}
