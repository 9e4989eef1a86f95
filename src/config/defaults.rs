//! Default configuration constants.

/// Embedded default `ledgercap.toml` template written by `ledgercap init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/ledgercap.toml");
/// Config file name looked up locally and under the config root.
pub(super) const CONFIG_FILE_NAME: &str = "ledgercap.toml";
/// Directory under the config root holding `ledgercap.toml`.
pub(super) const CONFIG_DIR_NAME: &str = "ledgercap";
/// Editor used when neither config nor environment names one.
pub(super) const DEFAULT_EDITOR: &str = "vi";
/// Asset account booked against when no account setting names one.
pub(super) const DEFAULT_ASSET_ACCOUNT: &str = "Assets:Checking";
pub(super) const DEFAULT_CURRENCY: &str = "EUR";
pub(super) const DEFAULT_LEDGER_INDENT: usize = 4;
pub(super) const DEFAULT_CSV_DELIMITER: char = ',';
/// Statements list the newest transfer first, so import oldest-first.
pub(super) const DEFAULT_REVERSE: bool = true;

/// camt.053 paths used when `[main.xml]` leaves a field unset.
pub(super) const DEFAULT_XML_ENTRY: &str = "Ntry";
pub(super) const DEFAULT_XML_BOOK_DATE: &str = "BookgDt/Dt|BookgDt/DtTm";
pub(super) const DEFAULT_XML_VAL_DATE: &str = "ValDt/Dt|ValDt/DtTm";
pub(super) const DEFAULT_XML_DEBITOR: &str =
    "NtryDtls/TxDtls/RltdPties/Dbtr/Nm|NtryDtls/TxDtls/RltdPties/Dbtr/Pty/Nm";
pub(super) const DEFAULT_XML_CREDITOR: &str =
    "NtryDtls/TxDtls/RltdPties/Cdtr/Nm|NtryDtls/TxDtls/RltdPties/Cdtr/Pty/Nm";
pub(super) const DEFAULT_XML_AMOUNT: &str = "Amt";
pub(super) const DEFAULT_XML_CURRENCY: &str = "Amt@Ccy";
pub(super) const DEFAULT_XML_SUBJECT: &[&str] = &["NtryDtls/TxDtls/RmtInf/Ustrd", "AddtlNtryInf"];

pub(super) const ENV_EDITOR: &str = "LEDGERCAP_EDITOR";
pub(super) const ENV_LEDGER_FILE: &str = "LEDGERCAP_LEDGER_FILE";
