//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Review ledger entries in your editor and commit them to the journal.
#[derive(Debug, Parser)]
#[command(name = "ledgercap", version)]
pub struct Args {
    /// Path to config file (default: ./ledgercap.toml or
    /// ~/.config/ledgercap/ledgercap.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit a capture file interactively. Usable as $EDITOR; files without
    /// the `.ledger-cap` suffix go straight to the configured editor.
    Edit {
        /// `[+LINE] FILE`, as editors are usually invoked.
        #[arg(value_name = "[+LINE] FILE", num_args = 1..=2, required = true)]
        args: Vec<String>,
    },
    /// Normalize and commit a capture file without prompting.
    Finalize { file: PathBuf },
    /// Discard a capture file's entry without prompting.
    Abort { file: PathBuf },
    /// List the terminal command bindings.
    Keys,
    /// Import a bank statement, reviewing each entry before it is appended.
    Import {
        /// Statement file to import (.csv or camt .xml).
        #[arg(long = "import-file", alias = "import_file")]
        import_file: PathBuf,
        /// `[accounts.<name>]` section to apply.
        #[arg(long)]
        account: Option<String>,
        /// Print the draft entries and change nothing.
        #[arg(long = "dryrun", alias = "dry-run")]
        dryrun: bool,
        /// Journal to append to; overrides config and LEDGERCAP_LEDGER_FILE.
        #[arg(long = "ledger-file")]
        ledger_file: Option<PathBuf>,
    },
    /// Write the default config to ~/.config/ledgercap/ledgercap.toml.
    Init {
        /// Overwrite an existing config after backing it up.
        #[arg(long)]
        force: bool,
    },
}

/// File and optional one-based line given to `ledgercap edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub file: PathBuf,
    pub line: Option<usize>,
}

impl EditTarget {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        match args {
            [file] => Ok(Self {
                file: PathBuf::from(file),
                line: None,
            }),
            [goto, file] => {
                let line = goto
                    .strip_prefix('+')
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("expected `+LINE` before the file, got `{goto}`"))?;
                Ok(Self {
                    file: PathBuf::from(file),
                    line: Some(line),
                })
            }
            _ => Err("usage: ledgercap edit [+LINE] FILE".to_string()),
        }
    }
}
