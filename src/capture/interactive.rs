//! Interactive capture: hand the buffer to a text editor, then read one
//! terminal command from the keyboard.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::process::Command;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::debug;

use super::keymap::{CaptureCommand, CommandTable, KeyChord, KeyResolution, KeySequence};
use super::mode::CaptureMode;
use super::session::{CaptureSession, Outcome};
use super::signal::CompletionSignal;
use crate::error::CaptureError;
use crate::render::Renderer;

/// External editor invocation, e.g. `vi` or `emacs -nw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    program: String,
    args: Vec<String>,
    /// Pass `+LINE` so the editor opens at the focused transaction.
    goto_line: bool,
}

impl EditorCommand {
    pub fn parse(spec: &str, goto_line: bool) -> Result<Self, CaptureError> {
        let mut words = spec.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| CaptureError::Editor("no editor configured".to_string()))?;
        Ok(Self {
            program,
            args: words.collect(),
            goto_line,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the editor on `path` and wait for it to exit. `line` is zero-based.
    pub fn edit(&self, path: &Path, line: usize) -> Result<(), CaptureError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if self.goto_line {
            command.arg(format!("+{}", line + 1));
        }
        command.arg(path);
        debug!(program = %self.program, path = %path.display(), "launching editor");

        let status = command.status().map_err(|e| {
            CaptureError::Editor(format!("failed to launch `{}`: {e}", self.program))
        })?;
        if !status.success() {
            return Err(CaptureError::Editor(format!(
                "`{}` exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

/// Source of terminal key sequences. `None` means input is closed.
pub trait KeySource {
    fn read_keys(&mut self, table: &CommandTable) -> io::Result<Option<KeySequence>>;
}

/// Raw-mode keyboard reader: collects chords until they name a command or
/// stop being a prefix of one. `C-g`/Esc cancel a partial sequence; `C-d`
/// on an empty sequence closes input.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn read_keys(&mut self, table: &CommandTable) -> io::Result<Option<KeySequence>> {
        let _raw = RawModeGuard::acquire()?;
        let mut keys = KeySequence::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            let chord = match key.code {
                KeyCode::Char('g') if ctrl => {
                    keys.clear();
                    continue;
                }
                KeyCode::Esc => {
                    keys.clear();
                    continue;
                }
                KeyCode::Char('d') if ctrl && keys.is_empty() => return Ok(None),
                KeyCode::Char(c) if ctrl => KeyChord::ctrl(c),
                KeyCode::Char(c) => KeyChord::plain(c),
                _ => continue,
            };
            keys.push(chord);
            if table.resolve(&keys) != KeyResolution::Prefix {
                return Ok(Some(keys));
            }
        }
    }
}

/// Line-based fallback for non-terminal input: each line is a command name
/// (`finalize`) or a written key sequence (`C-c C-c`).
#[derive(Debug)]
pub struct LineKeys<R> {
    reader: R,
}

impl<R: BufRead> LineKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> KeySource for LineKeys<R> {
    fn read_keys(&mut self, table: &CommandTable) -> io::Result<Option<KeySequence>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let text = line.trim();
        match table.resolve_text(text).and_then(|cmd| table.keys_for(cmd)) {
            Some(keys) => Ok(Some(keys.clone())),
            None => Ok(Some(text.parse().unwrap_or_default())),
        }
    }
}

/// Raw mode lifetime guard so terminal state is restored on any return path.
struct RawModeGuard;

impl RawModeGuard {
    fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Drive an open session to a terminal transition.
///
/// The buffer is written out for the editor, reloaded once the editor exits,
/// and then one key sequence is read and dispatched. A failed save is
/// reported and the prompt repeats so the human can retry; closed input
/// aborts the entry.
pub fn run_interactive(
    session: &mut CaptureSession,
    editor: &EditorCommand,
    keys: &mut dyn KeySource,
    renderer: &Renderer,
) -> Result<Outcome, CaptureError> {
    let path = session.location().to_path_buf();
    loop {
        fs::write(&path, session.buffer().to_text())?;
        editor.edit(&path, session.buffer().cursor().line)?;
        session.replace_text(&fs::read_to_string(&path)?)?;

        loop {
            renderer.command_hint(&session.commands().hint());
            let Some(sequence) = keys.read_keys(session.commands())? else {
                eprintln!();
                renderer.warn("input closed; discarding entry");
                session.abort()?;
                return Ok(session.outcome());
            };
            eprintln!();

            match session.dispatch(&sequence) {
                Ok(KeyResolution::Command(CaptureCommand::Edit)) => break,
                Ok(KeyResolution::Command(_)) => return Ok(session.outcome()),
                Ok(KeyResolution::Prefix | KeyResolution::Unbound) => {
                    renderer.warn(&format!("`{sequence}` is not bound"));
                }
                Err(e @ CaptureError::PersistenceFailure { .. }) => {
                    renderer.error(&e.to_string());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Open `path` through `mode` and run it interactively.
pub fn edit_capture_file(
    mode: &CaptureMode,
    path: &Path,
    signal: CompletionSignal,
    editor: &EditorCommand,
    keys: &mut dyn KeySource,
    renderer: &Renderer,
) -> Result<Outcome, CaptureError> {
    let (mut session, report) = mode.open(path, signal)?;
    if report.focus.is_none() {
        debug!(path = %path.display(), "no uncleared transaction to focus");
    }
    run_interactive(&mut session, editor, keys, renderer)
}
