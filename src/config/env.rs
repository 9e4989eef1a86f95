//! Environment overrides.
//!
//! `LEDGERCAP_*` variables beat the config file. The editor additionally
//! falls back to the conventional `VISUAL` and `EDITOR` variables.

use std::path::Path;

use super::defaults::{DEFAULT_EDITOR, ENV_EDITOR, ENV_LEDGER_FILE};
use super::types::ConfigDiagnostics;
use super::Config;

/// Program names that start a nested ledgercap instead of an editor.
const SELF_PROGRAM_PREFIX: &str = "ledgercap";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
    diagnostics: &mut ConfigDiagnostics,
) where
    FEnv: Fn(&str) -> Option<String>,
{
    let self_exe = std::env::current_exe().ok();
    config.capture.editor = resolve_editor(
        &config.capture.editor,
        env_lookup,
        self_exe.as_deref(),
        diagnostics,
    );
    if let Some(path) = non_empty(env_lookup(ENV_LEDGER_FILE)) {
        config.import.ledger_file_override = Some(path);
    }
}

/// `LEDGERCAP_EDITOR` > configured editor > `VISUAL` > `EDITOR` > `vi`.
///
/// With ledgercap installed as `$EDITOR`, the plain fallback would launch
/// ledgercap on its own capture file. Candidates naming ledgercap are
/// skipped with a warning.
pub(super) fn resolve_editor<FEnv>(
    configured: &str,
    env_lookup: &FEnv,
    self_exe: Option<&Path>,
    diagnostics: &mut ConfigDiagnostics,
) -> String
where
    FEnv: Fn(&str) -> Option<String>,
{
    let candidates = [
        (ENV_EDITOR, env_lookup(ENV_EDITOR)),
        ("capture.editor", Some(configured.to_string())),
        ("VISUAL", env_lookup("VISUAL")),
        ("EDITOR", env_lookup("EDITOR")),
    ];
    for (origin, value) in candidates {
        let Some(spec) = non_empty(value) else {
            continue;
        };
        if invokes_self(&spec, self_exe) {
            diagnostics.warnings.push(format!(
                "ignoring editor `{spec}` from {origin}: it runs ledgercap itself"
            ));
            continue;
        }
        return spec;
    }
    DEFAULT_EDITOR.to_string()
}

fn invokes_self(spec: &str, self_exe: Option<&Path>) -> bool {
    let Some(program) = spec.split_whitespace().next().map(Path::new) else {
        return false;
    };
    let named_self = program
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(SELF_PROGRAM_PREFIX));
    named_self || self_exe.is_some_and(|exe| program == exe)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
