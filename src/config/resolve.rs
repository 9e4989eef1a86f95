//! Import-settings resolution.
//!
//! Layers apply in order `[main]`, then `[accounts.<name>]`, then the
//! environment, then CLI flags; later layers win field by field.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::import::rules::Rule;

use super::types::{ColumnLayer, ColumnMap, ConfigDiagnostics, ImportLayer, ImportSettings};
use super::ImportConfig;

/// CLI-level overrides for an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOverrides {
    pub account: Option<String>,
    pub ledger_file: Option<PathBuf>,
}

impl ImportConfig {
    /// Resolve settings for one import run.
    pub fn settings(&self, overrides: &ImportOverrides) -> Result<ImportSettings, ConfigError> {
        let mut settings = ImportSettings::default();
        let mut columns = ColumnLayer::default();
        let mut ledger_file = None;

        apply_layer(&mut settings, &mut columns, &mut ledger_file, &self.main);
        if let Some(name) = overrides.account.as_deref() {
            let Some(layer) = self.accounts.get(name) else {
                return Err(ConfigError::Invalid(format!(
                    "unknown account `{name}`; configured accounts: {}",
                    known_accounts(&self.accounts)
                )));
            };
            apply_layer(&mut settings, &mut columns, &mut ledger_file, layer);
            settings.account = Some(name.to_string());
        }
        if let Some(path) = &self.ledger_file_override {
            ledger_file = Some(path.clone());
        }

        settings.ledger_file = overrides
            .ledger_file
            .clone()
            .or_else(|| ledger_file.map(PathBuf::from))
            .map(|path| expand_home(&path));
        settings.columns = column_map(columns)?;
        Ok(settings)
    }
}

fn apply_layer(
    settings: &mut ImportSettings,
    columns: &mut ColumnLayer,
    ledger_file: &mut Option<String>,
    layer: &ImportLayer,
) {
    if let Some(path) = &layer.ledger_file {
        *ledger_file = Some(path.clone());
    }
    if let Some(acc) = &layer.def_asset_acc {
        settings.def_asset_acc = acc.clone();
    }
    if let Some(reverse) = layer.reverse {
        settings.reverse = reverse;
    }
    if let Some(indent) = layer.ledger_indent {
        settings.ledger_indent = indent;
    }
    if let Some(delimiter) = layer.csv_delimiter {
        settings.csv_delimiter = delimiter;
    }
    if let Some(offset) = layer.csv_offset {
        settings.csv_offset = offset;
    }
    if let Some(currency) = &layer.currency {
        settings.currency = currency.clone();
    }

    let c = &layer.columns;
    let pick = |current: &mut Option<String>, new: &Option<String>| {
        if new.is_some() {
            *current = new.clone();
        }
    };
    pick(&mut columns.book_date, &c.book_date);
    pick(&mut columns.val_date, &c.val_date);
    pick(&mut columns.debitor, &c.debitor);
    pick(&mut columns.creditor, &c.creditor);
    pick(&mut columns.amount, &c.amount);
    pick(&mut columns.currency, &c.currency);
    if c.subject.is_some() {
        columns.subject = c.subject.clone();
    }

    let x = &layer.xml;
    let xml = &mut settings.xml;
    let set = |current: &mut String, new: &Option<String>| {
        if let Some(value) = new {
            *current = value.clone();
        }
    };
    set(&mut xml.entry, &x.entry);
    set(&mut xml.book_date, &x.book_date);
    set(&mut xml.debitor, &x.debitor);
    set(&mut xml.creditor, &x.creditor);
    set(&mut xml.amount, &x.amount);
    // An empty path switches the optional fields back to their fallbacks.
    if let Some(path) = &x.val_date {
        xml.val_date = Some(path.clone()).filter(|p| !p.is_empty());
    }
    if let Some(path) = &x.currency {
        xml.currency = Some(path.clone()).filter(|p| !p.is_empty());
    }
    if x.subject.is_some() {
        xml.subject = x.subject.clone().unwrap_or_default();
    }
}

/// `None` when no column is configured at all, which is fine for XML-only
/// setups; a partial mapping is an error.
fn column_map(columns: ColumnLayer) -> Result<Option<ColumnMap>, ConfigError> {
    if columns == ColumnLayer::default() {
        return Ok(None);
    }
    let required = |value: Option<String>, name: &str| {
        value.ok_or_else(|| {
            ConfigError::Invalid(format!(
                "statement column `{name}` is not configured; set `[main.columns] {name}`"
            ))
        })
    };
    Ok(Some(ColumnMap {
        book_date: required(columns.book_date, "book_date")?,
        val_date: columns.val_date,
        debitor: required(columns.debitor, "debitor")?,
        creditor: required(columns.creditor, "creditor")?,
        amount: required(columns.amount, "amount")?,
        currency: columns.currency,
        subject: columns.subject.unwrap_or_default(),
    }))
}

fn known_accounts(accounts: &BTreeMap<String, ImportLayer>) -> String {
    if accounts.is_empty() {
        return "(none)".to_string();
    }
    accounts.keys().cloned().collect::<Vec<_>>().join(", ")
}

/// Warn about rules that can never match because they name an account
/// with no `[accounts.<name>]` section.
pub(super) fn collect_rule_warnings(
    rules: &[Rule],
    accounts: &BTreeMap<String, ImportLayer>,
    diagnostics: &mut ConfigDiagnostics,
) {
    for (index, rule) in rules.iter().enumerate() {
        if let Some(account) = &rule.account {
            if !accounts.contains_key(account) {
                diagnostics.warnings.push(format!(
                    "rule #{} names unknown account `{account}`",
                    index + 1
                ));
            }
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
