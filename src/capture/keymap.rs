//! Command-dispatch table for the two terminal transitions.
//!
//! Bindings are plain data handed to a session at construction; there is no
//! process-wide keymap.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default binding for committing the entry.
pub const DEFAULT_FINALIZE_KEYS: &str = "C-c C-c";
/// Default binding for discarding the entry.
pub const DEFAULT_ABORT_KEYS: &str = "C-c C-k";
/// Default binding for returning to the editor.
pub const DEFAULT_EDIT_KEYS: &str = "C-c C-e";

/// One key press, optionally with Control held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub key: char,
}

impl KeyChord {
    pub fn ctrl(key: char) -> Self {
        Self {
            ctrl: true,
            key: key.to_ascii_lowercase(),
        }
    }

    pub fn plain(key: char) -> Self {
        Self { ctrl: false, key }
    }
}

impl FromStr for KeyChord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ctrl, rest) = match s.strip_prefix("C-") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(key), None) if ctrl => Ok(Self::ctrl(key)),
            (Some(key), None) => Ok(Self::plain(key)),
            _ => Err(format!("invalid key `{s}`")),
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-{}", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

/// Ordered chord sequence, written like `C-c C-c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyChord>);

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chord: KeyChord) {
        self.0.push(chord);
    }

    pub fn chords(&self) -> &[KeyChord] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// True when `self` is a strict prefix of `other`.
    pub fn is_strict_prefix_of(&self, other: &KeySequence) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl FromIterator<KeyChord> for KeySequence {
    fn from_iter<T: IntoIterator<Item = KeyChord>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for KeySequence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chords = s
            .split_whitespace()
            .map(KeyChord::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if chords.is_empty() {
            return Err("empty key sequence".to_string());
        }
        Ok(Self(chords))
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chord) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{chord}")?;
        }
        Ok(())
    }
}

/// User-facing commands available in a capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    Finalize,
    Abort,
    /// Return to the text editor without ending the session.
    Edit,
}

impl CaptureCommand {
    pub const ALL: [CaptureCommand; 3] = [Self::Finalize, Self::Abort, Self::Edit];

    pub fn name(self) -> &'static str {
        match self {
            Self::Finalize => "finalize",
            Self::Abort => "abort",
            Self::Edit => "edit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Finalize => "Format, mark cleared, drop comments, save, and release the waiter.",
            Self::Abort => "Discard the entry, save an empty buffer, and release the waiter.",
            Self::Edit => "Reopen the entry in the editor.",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name().eq_ignore_ascii_case(name))
    }
}

/// One key sequence bound to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBinding {
    pub keys: KeySequence,
    pub command: CaptureCommand,
}

/// What a (possibly partial) key sequence resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResolution {
    Command(CaptureCommand),
    /// More chords are needed.
    Prefix,
    Unbound,
}

/// Explicit key-sequence → command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    bindings: Vec<CommandBinding>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::from_specs(DEFAULT_FINALIZE_KEYS, DEFAULT_ABORT_KEYS, DEFAULT_EDIT_KEYS)
            .unwrap_or_else(|_| Self {
                bindings: Vec::new(),
            })
    }
}

impl CommandTable {
    /// Build a table from textual key sequences, rejecting ambiguous tables.
    pub fn from_specs(finalize: &str, abort: &str, edit: &str) -> Result<Self, ConfigError> {
        let mut bindings = Vec::with_capacity(3);
        for (spec, command) in [
            (finalize, CaptureCommand::Finalize),
            (abort, CaptureCommand::Abort),
            (edit, CaptureCommand::Edit),
        ] {
            let keys = spec.parse::<KeySequence>().map_err(|e| {
                ConfigError::Invalid(format!("keys.{}: {e}", command.name()))
            })?;
            bindings.push(CommandBinding { keys, command });
        }
        Self::from_bindings(bindings)
    }

    pub fn from_bindings(bindings: Vec<CommandBinding>) -> Result<Self, ConfigError> {
        for (i, a) in bindings.iter().enumerate() {
            for b in &bindings[i + 1..] {
                if a.keys == b.keys
                    || a.keys.is_strict_prefix_of(&b.keys)
                    || b.keys.is_strict_prefix_of(&a.keys)
                {
                    return Err(ConfigError::Invalid(format!(
                        "key bindings for `{}` ({}) and `{}` ({}) conflict",
                        a.command.name(),
                        a.keys,
                        b.command.name(),
                        b.keys
                    )));
                }
            }
        }
        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[CommandBinding] {
        &self.bindings
    }

    pub fn keys_for(&self, command: CaptureCommand) -> Option<&KeySequence> {
        self.bindings
            .iter()
            .find(|b| b.command == command)
            .map(|b| &b.keys)
    }

    pub fn resolve(&self, keys: &KeySequence) -> KeyResolution {
        if let Some(binding) = self.bindings.iter().find(|b| &b.keys == keys) {
            return KeyResolution::Command(binding.command);
        }
        if !keys.is_empty()
            && self
                .bindings
                .iter()
                .any(|b| keys.is_strict_prefix_of(&b.keys))
        {
            return KeyResolution::Prefix;
        }
        KeyResolution::Unbound
    }

    /// Resolve typed text: either a command name (`finalize`) or a written
    /// key sequence (`C-c C-c`).
    pub fn resolve_text(&self, input: &str) -> Option<CaptureCommand> {
        let input = input.trim();
        if let Some(command) = CaptureCommand::from_name(input) {
            return Some(command);
        }
        match self.resolve(&input.parse().ok()?) {
            KeyResolution::Command(command) => Some(command),
            KeyResolution::Prefix | KeyResolution::Unbound => None,
        }
    }

    /// One-line hint such as `C-c C-c finalize, C-c C-k abort`.
    pub fn hint(&self) -> String {
        self.bindings
            .iter()
            .map(|b| format!("{} {}", b.keys, b.command.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> KeySequence {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays_sequences() {
        let keys = seq("C-c  C-K");
        assert_eq!(keys.chords(), &[KeyChord::ctrl('c'), KeyChord::ctrl('k')]);
        assert_eq!(keys.to_string(), "C-c C-k");
        assert!("".parse::<KeySequence>().is_err());
        assert!("C-cc".parse::<KeySequence>().is_err());
    }

    #[test]
    fn default_table_resolves_terminal_commands() {
        let table = CommandTable::default();
        assert_eq!(
            table.resolve(&seq("C-c C-c")),
            KeyResolution::Command(CaptureCommand::Finalize)
        );
        assert_eq!(
            table.resolve(&seq("C-c C-k")),
            KeyResolution::Command(CaptureCommand::Abort)
        );
        assert_eq!(table.resolve(&seq("C-c")), KeyResolution::Prefix);
        assert_eq!(table.resolve(&seq("C-x")), KeyResolution::Unbound);
        assert_eq!(table.resolve(&KeySequence::new()), KeyResolution::Unbound);
    }

    #[test]
    fn resolve_text_accepts_names_and_sequences() {
        let table = CommandTable::default();
        assert_eq!(table.resolve_text("abort"), Some(CaptureCommand::Abort));
        assert_eq!(table.resolve_text(" C-c C-c \n"), Some(CaptureCommand::Finalize));
        assert_eq!(table.resolve_text("C-c"), None);
        assert_eq!(table.resolve_text("nonsense words"), None);
    }

    #[test]
    fn conflicting_bindings_are_rejected() {
        assert!(CommandTable::from_specs("C-c", "C-c C-k", "C-c C-e").is_err());
        assert!(CommandTable::from_specs("C-c C-c", "C-c C-c", "C-c C-e").is_err());
        assert!(CommandTable::from_specs("C-c C-c", "q", "e").is_ok());
    }

    #[test]
    fn hint_lists_every_binding() {
        let hint = CommandTable::default().hint();
        assert_eq!(hint, "C-c C-c finalize, C-c C-k abort, C-c C-e edit");
    }
}
