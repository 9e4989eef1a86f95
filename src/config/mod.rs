//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`LEDGERCAP_EDITOR`, `LEDGERCAP_LEDGER_FILE`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./ledgercap.toml in the current directory
//! 4. $XDG_CONFIG_HOME/ledgercap/ledgercap.toml (or
//!    ~/.config/ledgercap/ledgercap.toml)
//! 5. Built-in defaults
//!
//! Import settings are layered once more per run; see [`ImportConfig::settings`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::capture::{CaptureMode, CommandTable};
use crate::error::ConfigError;
use crate::ledger::LedgerFormatter;

mod defaults;
mod env;
mod init;
mod resolve;
mod sources;
mod types;

pub use init::initialize_default_global_config;
pub use resolve::{expand_home, ImportOverrides};
pub use sources::{config_root_dir, default_global_config_path};
pub use types::{
    CaptureConfig, ColumnLayer, ColumnMap, Config, ConfigDiagnostics, ConfigInitResult,
    DisplayConfig, ImportConfig, ImportLayer, ImportSettings, KeysConfig, LoadedConfig, XmlLayer,
    XmlMap,
};
use types::FileConfig;

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_diagnostics(path_override)?.config)
}

/// Load configuration and return non-fatal diagnostics.
pub fn load_config_with_diagnostics(
    path_override: Option<&str>,
) -> Result<LoadedConfig, ConfigError> {
    load_config_with_diagnostics_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_with_diagnostics_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        sources::read_config_text_with_sources(path_override, &read_file, &config_root)?;
    debug!(source = ?source, "loading config");
    let parsed: FileConfig = toml::from_str(&config_text)?;

    let mut diagnostics = ConfigDiagnostics::default();
    resolve::collect_rule_warnings(&parsed.rules, &parsed.accounts, &mut diagnostics);
    let mut config = resolve_config_from_file_config(parsed)?;
    env::apply_runtime_env_overrides(&mut config, &env_lookup, &mut diagnostics);

    Ok(LoadedConfig {
        config,
        source: source.path(),
        diagnostics,
    })
}

fn resolve_config_from_file_config(parsed: FileConfig) -> Result<Config, ConfigError> {
    let config = Config {
        capture: parsed.capture,
        keys: parsed.keys,
        display: parsed.display,
        import: ImportConfig {
            main: parsed.main,
            accounts: parsed.accounts,
            ledger_file_override: None,
        },
        rules: parsed.rules,
    };
    if config.capture.amount_column <= config.capture.account_indent {
        return Err(ConfigError::Invalid(format!(
            "capture.amount_column ({}) must be greater than capture.account_indent ({})",
            config.capture.amount_column, config.capture.account_indent
        )));
    }
    // Surface bad bindings at load time rather than mid-session.
    config.command_table()?;
    Ok(config)
}

impl Config {
    /// Terminal command table built from `[keys]`.
    pub fn command_table(&self) -> Result<CommandTable, ConfigError> {
        CommandTable::from_specs(&self.keys.finalize, &self.keys.abort, &self.keys.edit)
    }

    pub fn ledger_formatter(&self) -> LedgerFormatter {
        LedgerFormatter {
            account_indent: self.capture.account_indent,
            amount_column: self.capture.amount_column,
        }
    }

    /// Capture mode wired with the configured formatter and bindings.
    pub fn capture_mode(&self) -> Result<CaptureMode, ConfigError> {
        Ok(CaptureMode::new(
            Arc::new(self.ledger_formatter()),
            self.command_table()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureCommand;
    use std::collections::BTreeMap;

    const IMPORT_TOML: &str = r#"
        [main]
        ledger_file = "/books/main.ledger"
        csv_delimiter = ";"
        [main.columns]
        book_date = "Date"
        debitor = "From"
        creditor = "To"
        amount = "Amount"
        subject = ["Purpose"]

        [accounts.checking]
        def_asset_acc = "Assets:Bank:Checking"
        csv_offset = 3
        [accounts.checking.columns]
        amount = "Betrag"

        [accounts.card]
        ledger_file = "/books/card.ledger"
    "#;

    #[test]
    fn defaults_are_sensible() {
        let c = parse_file_config_for_test("").unwrap();
        assert!(c.capture.goto_line);
        assert_eq!(c.capture.account_indent, 4);
        assert_eq!(c.capture.amount_column, 52);
        assert_eq!(c.keys.finalize, "C-c C-c");
        assert!(c.display.color);
        assert!(c.rules.is_empty());
        assert_eq!(
            c.command_table()
                .unwrap()
                .keys_for(CaptureCommand::Abort)
                .unwrap()
                .to_string(),
            "C-c C-k"
        );
    }

    #[test]
    fn parse_partial_toml() {
        let c = parse_file_config_for_test(
            r#"
            [capture]
            amount_column = 60

            [keys]
            edit = "C-x C-e"

            [[rules]]
            dbtr = "Me"
            cdtr = "Grocer"
            cdtr_acc = "Expenses:Food"
            splits = [["Expenses:Food", "1.00"]]
            "#,
        )
        .unwrap();
        assert_eq!(c.ledger_formatter().amount_column, 60);
        assert_eq!(c.ledger_formatter().account_indent, 4);
        assert_eq!(c.keys.edit, "C-x C-e");
        assert_eq!(c.keys.finalize, "C-c C-c");
        assert_eq!(c.rules.len(), 1);
        assert_eq!(c.rules[0].splits[0].0, "Expenses:Food");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_file_config_for_test("[capture]\nedtior = \"vim\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn conflicting_bindings_are_rejected_at_load() {
        let err = parse_file_config_for_test("[keys]\nabort = \"C-c C-c\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    }

    #[test]
    fn amount_column_must_exceed_indent() {
        let err = parse_file_config_for_test("[capture]\naccount_indent = 8\namount_column = 8\n")
            .unwrap_err();
        assert!(err.to_string().contains("amount_column"));
    }

    #[test]
    fn injected_sources_prefer_local_over_global() {
        let mut files = BTreeMap::new();
        files.insert("ledgercap.toml".to_string(), "[capture]\neditor = \"nano\"\n".to_string());
        files.insert(
            "/cfg/ledgercap/ledgercap.toml".to_string(),
            "[capture]\neditor = \"emacs\"\n".to_string(),
        );
        let loaded =
            load_config_with_sources_for_test(None, files, BTreeMap::new(), Some("/cfg".into()))
                .unwrap();
        assert_eq!(loaded.config.capture.editor, "nano");
        assert_eq!(loaded.source, Some(PathBuf::from("ledgercap.toml")));
    }

    #[test]
    fn injected_sources_fall_back_to_global_then_defaults() {
        let mut files = BTreeMap::new();
        files.insert(
            "/cfg/ledgercap/ledgercap.toml".to_string(),
            "[capture]\neditor = \"emacs\"\n".to_string(),
        );
        let loaded = load_config_with_sources_for_test(
            None,
            files,
            BTreeMap::new(),
            Some("/cfg".into()),
        )
        .unwrap();
        assert_eq!(loaded.config.capture.editor, "emacs");

        let loaded =
            load_config_with_sources_for_test(None, BTreeMap::new(), BTreeMap::new(), None)
                .unwrap();
        assert_eq!(loaded.source, None);
        assert_eq!(loaded.config.capture.editor, "vi");
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_with_sources_for_test(
            Some("/missing.toml"),
            BTreeMap::new(),
            BTreeMap::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn editor_resolution_order() {
        let mut env = BTreeMap::new();
        env.insert("EDITOR".to_string(), "nano".to_string());
        let loaded =
            load_config_with_sources_for_test(None, BTreeMap::new(), env.clone(), None).unwrap();
        assert_eq!(loaded.config.capture.editor, "nano");

        env.insert("VISUAL".to_string(), "code --wait".to_string());
        let loaded =
            load_config_with_sources_for_test(None, BTreeMap::new(), env.clone(), None).unwrap();
        assert_eq!(loaded.config.capture.editor, "code --wait");

        let mut files = BTreeMap::new();
        files.insert("ledgercap.toml".to_string(), "[capture]\neditor = \"vim\"\n".to_string());
        let loaded =
            load_config_with_sources_for_test(None, files.clone(), env.clone(), None).unwrap();
        assert_eq!(loaded.config.capture.editor, "vim");

        env.insert("LEDGERCAP_EDITOR".to_string(), "hx".to_string());
        let loaded = load_config_with_sources_for_test(None, files, env, None).unwrap();
        assert_eq!(loaded.config.capture.editor, "hx");
    }

    #[test]
    fn import_layers_apply_main_then_account_then_env_then_cli() {
        let mut files = BTreeMap::new();
        files.insert("ledgercap.toml".to_string(), IMPORT_TOML.to_string());
        let loaded =
            load_config_with_sources_for_test(None, files.clone(), BTreeMap::new(), None)
                .unwrap();
        let import = &loaded.config.import;

        let main = import.settings(&ImportOverrides::default()).unwrap();
        assert_eq!(main.account, None);
        assert_eq!(main.csv_delimiter, ';');
        assert_eq!(main.def_asset_acc, "Assets:Checking");
        assert_eq!(main.columns.as_ref().unwrap().amount, "Amount");
        assert_eq!(main.ledger_file, Some(PathBuf::from("/books/main.ledger")));

        let checking = import
            .settings(&ImportOverrides {
                account: Some("checking".into()),
                ledger_file: None,
            })
            .unwrap();
        assert_eq!(checking.account.as_deref(), Some("checking"));
        assert_eq!(checking.def_asset_acc, "Assets:Bank:Checking");
        assert_eq!(checking.csv_offset, 3);
        assert_eq!(checking.csv_delimiter, ';');
        let columns = checking.columns.as_ref().unwrap();
        assert_eq!(columns.amount, "Betrag");
        assert_eq!(columns.book_date, "Date");

        let mut env = BTreeMap::new();
        env.insert("LEDGERCAP_LEDGER_FILE".to_string(), "/env.ledger".to_string());
        let loaded = load_config_with_sources_for_test(None, files, env, None).unwrap();
        let card = loaded
            .config
            .import
            .settings(&ImportOverrides {
                account: Some("card".into()),
                ledger_file: None,
            })
            .unwrap();
        assert_eq!(card.ledger_file, Some(PathBuf::from("/env.ledger")));

        let cli = loaded
            .config
            .import
            .settings(&ImportOverrides {
                account: Some("card".into()),
                ledger_file: Some("/cli.ledger".into()),
            })
            .unwrap();
        assert_eq!(cli.ledger_file, Some(PathBuf::from("/cli.ledger")));
    }

    #[test]
    fn unknown_account_lists_configured_ones() {
        let c = parse_file_config_for_test(IMPORT_TOML).unwrap();
        let err = c
            .import
            .settings(&ImportOverrides {
                account: Some("savings".into()),
                ledger_file: None,
            })
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("savings"));
        assert!(msg.contains("card, checking"));
    }

    #[test]
    fn xml_paths_layer_over_camt_defaults() {
        let c = parse_file_config_for_test(
            r#"
            [main.xml]
            debitor = "Dbtr/Nm"
            currency = ""

            [accounts.swiss.xml]
            entry = "Entry"
            subject = ["Info"]
            "#,
        )
        .unwrap();
        let main = c.import.settings(&ImportOverrides::default()).unwrap();
        assert_eq!(main.columns, None);
        assert_eq!(main.xml.entry, "Ntry");
        assert_eq!(main.xml.debitor, "Dbtr/Nm");
        assert_eq!(main.xml.amount, "Amt");
        assert_eq!(main.xml.currency, None);

        let swiss = c
            .import
            .settings(&ImportOverrides {
                account: Some("swiss".into()),
                ledger_file: None,
            })
            .unwrap();
        assert_eq!(swiss.xml.entry, "Entry");
        assert_eq!(swiss.xml.debitor, "Dbtr/Nm");
        assert_eq!(swiss.xml.subject, vec!["Info".to_string()]);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let c = parse_file_config_for_test("[main.columns]\nbook_date = \"Date\"\n").unwrap();
        let err = c.import.settings(&ImportOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("debitor"), "got: {err}");
    }

    #[test]
    fn rules_for_unknown_accounts_are_diagnosed() {
        let mut files = BTreeMap::new();
        files.insert(
            "ledgercap.toml".to_string(),
            concat!(
                "[accounts.checking]\n",
                "[[rules]]\naccount = \"checking\"\n",
                "[[rules]]\naccount = \"savings\"\n",
            )
            .to_string(),
        );
        let loaded =
            load_config_with_sources_for_test(None, files, BTreeMap::new(), None).unwrap();
        assert_eq!(
            loaded.diagnostics.warnings,
            vec!["rule #2 names unknown account `savings`".to_string()]
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let plain = Path::new("/tmp/x.ledger");
        assert_eq!(expand_home(plain), plain);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/x.ledger")), home.join("x.ledger"));
        }
    }

    #[test]
    fn init_creates_then_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledgercap").join("ledgercap.toml");

        let created = init::initialize_config_at_path(&path, false).unwrap();
        assert_eq!(created, ConfigInitResult::Created { path: path.clone() });
        let template = std::fs::read_to_string(&path).unwrap();
        assert!(parse_file_config_for_test(&template).is_ok());

        let again = init::initialize_config_at_path(&path, true).unwrap();
        assert_eq!(again, ConfigInitResult::Unchanged { path: path.clone() });

        std::fs::write(&path, "[capture]\neditor = \"nano\"\n").unwrap();
        let kept = init::initialize_config_at_path(&path, false).unwrap();
        assert_eq!(
            kept,
            ConfigInitResult::AlreadyInitialized {
                path: path.clone(),
                problem: None
            }
        );

        let ConfigInitResult::Overwritten {
            backup_path,
            problem,
            ..
        } = init::initialize_config_at_path(&path, true).unwrap()
        else {
            panic!("expected overwrite");
        };
        assert_eq!(problem, None);
        assert_eq!(backup_path, path.with_file_name("ledgercap.toml.bak"));
        assert_eq!(
            std::fs::read_to_string(backup_path).unwrap(),
            "[capture]\neditor = \"nano\"\n"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), template);
    }

    #[test]
    fn init_reports_why_an_existing_config_does_not_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledgercap.toml");
        std::fs::write(&path, "[keys]\nabort = \"C-c C-c\"\n").unwrap();

        let ConfigInitResult::AlreadyInitialized { problem, .. } =
            init::initialize_config_at_path(&path, false).unwrap()
        else {
            panic!("expected the file to be left alone");
        };
        let problem = problem.expect("conflicting keys should be reported");
        assert!(problem.contains("C-c C-c"), "got: {problem}");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[keys]\nabort = \"C-c C-c\"\n"
        );

        let ConfigInitResult::Overwritten { problem, .. } =
            init::initialize_config_at_path(&path, true).unwrap()
        else {
            panic!("expected overwrite");
        };
        assert!(problem.is_some());
    }

    fn load_config_with_sources_for_test(
        path_override: Option<&str>,
        files: BTreeMap<String, String>,
        env: BTreeMap<String, String>,
        config_root: Option<PathBuf>,
    ) -> Result<LoadedConfig, ConfigError> {
        load_config_with_diagnostics_from_sources(
            path_override,
            move |path| {
                let key = path.to_string_lossy().into_owned();
                files
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, key))
            },
            move |name| env.get(name).cloned(),
            move || config_root.clone(),
        )
    }

    fn parse_file_config_for_test(toml_text: &str) -> Result<Config, ConfigError> {
        let parsed: FileConfig = toml::from_str(toml_text)?;
        resolve_config_from_file_config(parsed)
    }
}
