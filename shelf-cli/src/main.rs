//! shelf CLI - a personal reading list kept in a local JSON file
//!
//! Subcommands cover the whole library lifecycle:
//! - `add`, `edit`, `remove` and `list` work on the stored books
//! - `import` and `export` move books in and out as JSON or CSV
//! - `tui` opens the interactive library view
//! - `config` manages ~/.shelf/config.toml

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;
mod tui;
mod ui;
mod util;

use commands::Context;
use tracing_setup::TracingConfig;
use util::AppError;

/// Log file written inside the data directory while the TUI owns the terminal
pub const TUI_LOG_FILE: &str = "shelf.log";

#[derive(Parser, Debug)]
#[command(
    name = "shelf",
    author,
    version,
    about = "Keep track of the books you own or want to read",
    long_about = "Add, edit, search and sort a personal book list stored as JSON on disk. \
                  Import and export JSON or CSV, from the command line or the interactive view."
)]
struct Cli {
    /// Directory holding books.json (default: ~/.shelf)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file to use instead of ~/.shelf/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress progress spinners (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a book to the end of the library
    Add(commands::books::AddArgs),

    /// Replace the title and author of a book
    Edit(commands::books::EditArgs),

    /// Delete a book
    #[command(alias = "rm")]
    Remove(commands::books::RemoveArgs),

    /// List books, optionally filtered and sorted
    #[command(alias = "ls")]
    List(commands::books::ListArgs),

    /// Import books from a .json or .csv file
    Import(commands::transfer::ImportArgs),

    /// Export the library as JSON or CSV
    Export(commands::transfer::ExportArgs),

    /// Open the interactive library view
    Tui,

    /// Manage shelf configuration
    Config(config::ConfigArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize UI quiet mode from flag, env var, and TTY detection
    ui::init_quiet_mode(cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let Cli {
        data_dir,
        config: config_flag,
        debug,
        command,
        ..
    } = cli;

    let mut tracing_config = TracingConfig {
        debug,
        log_file: None,
    };
    if !matches!(command, Commands::Tui) {
        tracing_setup::init(&tracing_config).ok();
    }

    let context = || Context::load(config_flag.as_deref(), data_dir.as_deref());

    match command {
        Commands::Add(args) => commands::books::run_add(&context()?, args),
        Commands::Edit(args) => commands::books::run_edit(&context()?, args),
        Commands::Remove(args) => commands::books::run_remove(&context()?, args),
        Commands::List(args) => commands::books::run_list(&context()?, args),
        Commands::Import(args) => commands::transfer::run_import(&context()?, args),
        Commands::Export(args) => commands::transfer::run_export(&context()?, args),
        Commands::Tui => {
            let ctx = context()?;
            tracing_config.log_file = Some(ctx.data_dir.join(TUI_LOG_FILE));
            tracing_setup::init(&tracing_config).ok();
            tui::run(&ctx).map_err(AppError::io)
        }
        Commands::Config(args) => config::run_config(args, config_flag.as_deref()),
        Commands::Completions(args) => {
            run_completions(args);
            Ok(())
        }
    }
}

fn run_completions(args: CompletionsArgs) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["shelf", "list", "--data-dir", "/tmp/x", "-q"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_edit_requires_all_fields() {
        assert!(Cli::try_parse_from(["shelf", "edit", "1", "Dune"]).is_err());
        assert!(Cli::try_parse_from(["shelf", "edit", "1", "Dune", "Herbert"]).is_ok());
    }
}
