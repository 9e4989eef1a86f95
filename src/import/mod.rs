//! Statement import: turn each transfer of a bank statement into a draft
//! ledger entry, let the human review it in a capture session, and append
//! the committed result to the journal.

pub mod entry;
pub mod journal;
pub mod rules;
pub mod statement;
pub mod xml;

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::capture::interactive::{
    edit_capture_file, EditorCommand, KeySource, LineKeys, TerminalKeys,
};
use crate::capture::{completion_channel, CaptureMode, Outcome, CAPTURE_SUFFIX};
use crate::config::ImportSettings;
use crate::error::ImportError;
use crate::render::Renderer;

pub use entry::build_entry;
pub use journal::append_to_ledger;
pub use rules::{book_transfer, Rule};
pub use statement::{read_statement, Transfer};

/// Builds the key source for one capture session. Called on the blocking
/// thread that drives the session.
pub type KeySourceFactory = Arc<dyn Fn() -> Box<dyn KeySource> + Send + Sync>;

/// Keyboard when stdin is a terminal, otherwise one command per stdin line.
pub fn stdin_keys() -> KeySourceFactory {
    Arc::new(|| -> Box<dyn KeySource> {
        if io::stdin().is_terminal() {
            Box::new(TerminalKeys)
        } else {
            Box::new(LineKeys::new(io::stdin().lock()))
        }
    })
}

/// Counts reported after an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub entries: usize,
    pub appended: usize,
    pub discarded: usize,
}

pub struct Importer {
    settings: ImportSettings,
    rules: Vec<Rule>,
    mode: CaptureMode,
    editor: EditorCommand,
    keys: KeySourceFactory,
    renderer: Renderer,
}

impl Importer {
    pub fn new(
        settings: ImportSettings,
        rules: Vec<Rule>,
        mode: CaptureMode,
        editor: EditorCommand,
        keys: KeySourceFactory,
        renderer: Renderer,
    ) -> Self {
        Self {
            settings,
            rules,
            mode,
            editor,
            keys,
            renderer,
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Draft entries for every transfer in `import_file`, in processing order.
    pub fn entries(&self, import_file: &Path) -> Result<Vec<String>, ImportError> {
        let mut transfers = read_statement(import_file, &self.settings)?;
        if self.settings.reverse {
            transfers.reverse();
        }
        debug!(count = transfers.len(), file = %import_file.display(), "read statement");
        Ok(transfers
            .iter()
            .map(|transfer| {
                let matched = book_transfer(
                    transfer,
                    &self.rules,
                    self.settings.account.as_deref(),
                    &self.settings.def_asset_acc,
                );
                build_entry(transfer, &matched, self.settings.ledger_indent)
            })
            .collect())
    }

    /// Import `import_file`. With `dry_run` the drafts are printed to stdout
    /// and nothing is captured or written.
    pub async fn run(
        &self,
        import_file: &Path,
        dry_run: bool,
    ) -> Result<ImportSummary, ImportError> {
        let entries = self.entries(import_file)?;
        let mut summary = ImportSummary {
            entries: entries.len(),
            ..ImportSummary::default()
        };
        if dry_run {
            for entry in &entries {
                self.renderer.entry_block(entry);
            }
            return Ok(summary);
        }

        let ledger_file = self
            .settings
            .ledger_file
            .clone()
            .ok_or(ImportError::MissingSetting("ledger_file"))?;
        let workdir = tempfile::Builder::new().prefix("ledgercap-").tempdir()?;

        for (index, entry) in entries.into_iter().enumerate() {
            let path = workdir
                .path()
                .join(format!("entry-{}{CAPTURE_SUFFIX}", index + 1));
            fs::write(&path, &entry)?;
            self.renderer
                .section(&format!("entry {} of {}", index + 1, summary.entries));

            let (outcome, captured) = self.capture(path).await?;
            if outcome == Outcome::Committed && append_to_ledger(&ledger_file, &captured)? {
                summary.appended += 1;
            } else {
                summary.discarded += 1;
            }
        }
        info!(
            entries = summary.entries,
            appended = summary.appended,
            ledger = %ledger_file.display(),
            "import finished"
        );
        Ok(summary)
    }

    /// Run one capture session on a blocking task and wait for its signal.
    async fn capture(&self, path: PathBuf) -> Result<(Outcome, String), ImportError> {
        let (signal, waiter) = completion_channel();
        let mode = self.mode.clone();
        let editor = self.editor.clone();
        let keys = Arc::clone(&self.keys);
        let renderer = self.renderer;
        let session_path = path.clone();

        let driver = tokio::task::spawn_blocking(move || {
            let mut source = keys();
            edit_capture_file(&mode, &session_path, signal, &editor, source.as_mut(), &renderer)
        });

        let released = waiter.wait().await;
        // A driver error drops the session unsignalled; report the cause
        // rather than the abandonment.
        let outcome = driver.await.map_err(|e| ImportError::Io(io::Error::other(e)))??;
        released?;

        let captured = fs::read_to_string(&path)?;
        Ok((outcome, captured))
    }
}
