//! Configuration data model.
//!
//! `FileConfig` mirrors the TOML layout; `Config` is the resolved runtime
//! view handed to the rest of the crate.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::capture::keymap::{DEFAULT_ABORT_KEYS, DEFAULT_EDIT_KEYS, DEFAULT_FINALIZE_KEYS};
use crate::import::rules::Rule;
use crate::ledger::{DEFAULT_ACCOUNT_INDENT, DEFAULT_AMOUNT_COLUMN};

use super::defaults::{
    DEFAULT_ASSET_ACCOUNT, DEFAULT_CSV_DELIMITER, DEFAULT_CURRENCY, DEFAULT_LEDGER_INDENT,
    DEFAULT_REVERSE, DEFAULT_XML_AMOUNT, DEFAULT_XML_BOOK_DATE, DEFAULT_XML_CREDITOR,
    DEFAULT_XML_CURRENCY, DEFAULT_XML_DEBITOR, DEFAULT_XML_ENTRY, DEFAULT_XML_SUBJECT,
    DEFAULT_XML_VAL_DATE,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub keys: KeysConfig,
    pub display: DisplayConfig,
    pub import: ImportConfig,
    pub rules: Vec<Rule>,
}

/// Capture-session settings (`[capture]`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Editor program plus arguments. Resolved from the environment when
    /// the file leaves it out.
    pub editor: String,
    /// Pass `+LINE` so the editor opens at the focused transaction.
    pub goto_line: bool,
    pub account_indent: usize,
    pub amount_column: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            editor: String::new(),
            goto_line: true,
            account_indent: DEFAULT_ACCOUNT_INDENT,
            amount_column: DEFAULT_AMOUNT_COLUMN,
        }
    }
}

/// Terminal command bindings (`[keys]`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    pub finalize: String,
    pub abort: String,
    pub edit: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            finalize: DEFAULT_FINALIZE_KEYS.to_string(),
            abort: DEFAULT_ABORT_KEYS.to_string(),
            edit: DEFAULT_EDIT_KEYS.to_string(),
        }
    }
}

/// Terminal output settings (`[display]`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Import layers before account selection.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    /// `[main]` defaults.
    pub main: ImportLayer,
    /// `[accounts.<name>]` overrides.
    pub accounts: BTreeMap<String, ImportLayer>,
    /// Journal path from the environment; beats both layers.
    pub ledger_file_override: Option<String>,
}

/// One partial layer of import settings (`[main]` or `[accounts.<name>]`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ImportLayer {
    pub ledger_file: Option<String>,
    pub def_asset_acc: Option<String>,
    pub reverse: Option<bool>,
    pub ledger_indent: Option<usize>,
    pub csv_delimiter: Option<char>,
    pub csv_offset: Option<usize>,
    pub currency: Option<String>,
    pub columns: ColumnLayer,
    pub xml: XmlLayer,
}

/// Partial statement column mapping (`[main.columns]`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnLayer {
    pub book_date: Option<String>,
    pub val_date: Option<String>,
    pub debitor: Option<String>,
    pub creditor: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub subject: Option<Vec<String>>,
}

/// Statement header names for each transfer field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub book_date: String,
    /// Falls back to the booking date when unset.
    pub val_date: Option<String>,
    pub debitor: String,
    pub creditor: String,
    pub amount: String,
    /// Falls back to the literal `currency` setting when unset.
    pub currency: Option<String>,
    pub subject: Vec<String>,
}

/// Partial XML element paths (`[main.xml]`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct XmlLayer {
    pub entry: Option<String>,
    pub book_date: Option<String>,
    pub val_date: Option<String>,
    pub debitor: Option<String>,
    pub creditor: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub subject: Option<Vec<String>>,
}

/// Element paths for each transfer field of an XML statement, relative to
/// one `entry` element. See [`crate::import::xml`] for the path syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlMap {
    /// Local name of the element holding one transfer.
    pub entry: String,
    pub book_date: String,
    pub val_date: Option<String>,
    pub debitor: String,
    pub creditor: String,
    pub amount: String,
    pub currency: Option<String>,
    pub subject: Vec<String>,
}

impl Default for XmlMap {
    fn default() -> Self {
        Self {
            entry: DEFAULT_XML_ENTRY.to_string(),
            book_date: DEFAULT_XML_BOOK_DATE.to_string(),
            val_date: Some(DEFAULT_XML_VAL_DATE.to_string()),
            debitor: DEFAULT_XML_DEBITOR.to_string(),
            creditor: DEFAULT_XML_CREDITOR.to_string(),
            amount: DEFAULT_XML_AMOUNT.to_string(),
            currency: Some(DEFAULT_XML_CURRENCY.to_string()),
            subject: DEFAULT_XML_SUBJECT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Fully resolved settings for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Selected `[accounts.<name>]` key; also filters rules.
    pub account: Option<String>,
    pub ledger_file: Option<PathBuf>,
    pub def_asset_acc: String,
    pub reverse: bool,
    pub ledger_indent: usize,
    pub csv_delimiter: char,
    /// Rows skipped before the header row.
    pub csv_offset: usize,
    pub currency: String,
    /// CSV column mapping; `None` until `[main.columns]` is configured.
    pub columns: Option<ColumnMap>,
    pub xml: XmlMap,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            account: None,
            ledger_file: None,
            def_asset_acc: DEFAULT_ASSET_ACCOUNT.to_string(),
            reverse: DEFAULT_REVERSE,
            ledger_indent: DEFAULT_LEDGER_INDENT,
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            csv_offset: 0,
            currency: DEFAULT_CURRENCY.to_string(),
            columns: None,
            xml: XmlMap::default(),
        }
    }
}

/// Raw TOML layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(super) struct FileConfig {
    pub capture: CaptureConfig,
    pub keys: KeysConfig,
    pub display: DisplayConfig,
    pub main: ImportLayer,
    pub accounts: BTreeMap<String, ImportLayer>,
    pub rules: Vec<Rule>,
}

/// Non-fatal notes collected while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    pub warnings: Vec<String>,
}

/// Loaded config plus diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from; `None` for built-in defaults.
    pub source: Option<PathBuf>,
    pub diagnostics: ConfigDiagnostics,
}

/// Result of `ledgercap init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInitResult {
    Created {
        path: PathBuf,
    },
    /// The file already matches the template.
    Unchanged {
        path: PathBuf,
    },
    /// Left in place. `problem` says why it would not load, if it would not.
    AlreadyInitialized {
        path: PathBuf,
        problem: Option<String>,
    },
    Overwritten {
        path: PathBuf,
        backup_path: PathBuf,
        problem: Option<String>,
    },
}
