//! CLI entry point for ledgercap.

mod cli;

use std::path::Path;

use clap::Parser;
use ledgercap::capture::{
    completion_channel, edit_capture_file, is_capture_path, CaptureCommand, CaptureMode,
    EditorCommand, Outcome,
};
use ledgercap::config::{
    initialize_default_global_config, load_config_with_diagnostics, Config, ConfigInitResult,
    ImportOverrides,
};
use ledgercap::import::{stdin_keys, Importer};
use ledgercap::render::Renderer;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing(args.verbose);

    let loaded = match load_config_with_diagnostics(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let mut config = loaded.config;
    if args.no_color {
        config.display.color = false;
    }
    let renderer = Renderer::new(config.display.color);
    for warning in &loaded.diagnostics.warnings {
        renderer.warn(warning);
    }
    if let Some(source) = &loaded.source {
        debug!(path = %source.display(), "config loaded");
    }

    if let Err(msg) = run(args.command, &config, &renderer).await {
        renderer.error(&msg);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: cli::Command, config: &Config, renderer: &Renderer) -> Result<(), String> {
    match command {
        cli::Command::Edit { args } => {
            let target = cli::EditTarget::from_args(&args)?;
            edit(config, renderer, target).await
        }
        cli::Command::Finalize { file } => {
            close(config, renderer, &file, CaptureCommand::Finalize)
        }
        cli::Command::Abort { file } => close(config, renderer, &file, CaptureCommand::Abort),
        cli::Command::Keys => {
            let table = config.command_table().map_err(|e| e.to_string())?;
            renderer.section("key bindings");
            for binding in table.bindings() {
                renderer.field(&binding.keys.to_string(), binding.command.description());
            }
            Ok(())
        }
        cli::Command::Import {
            import_file,
            account,
            dryrun,
            ledger_file,
        } => {
            let settings = config
                .import
                .settings(&ImportOverrides {
                    account,
                    ledger_file,
                })
                .map_err(|e| e.to_string())?;
            let importer = Importer::new(
                settings,
                config.rules.clone(),
                capture_mode(config)?,
                editor(config)?,
                stdin_keys(),
                *renderer,
            );
            let summary = importer
                .run(&import_file, dryrun)
                .await
                .map_err(|e| e.to_string())?;
            if !dryrun {
                renderer.activity(&format!(
                    "imported {} of {} entries ({} discarded)",
                    summary.appended, summary.entries, summary.discarded
                ));
            }
            Ok(())
        }
        cli::Command::Init { force } => {
            match initialize_default_global_config(force).map_err(|e| e.to_string())? {
                ConfigInitResult::Created { path } => {
                    renderer.activity(&format!("wrote {}", path.display()));
                }
                ConfigInitResult::Unchanged { path } => {
                    renderer.activity(&format!("{} is already the default", path.display()));
                }
                ConfigInitResult::AlreadyInitialized { path, problem } => {
                    if let Some(problem) = problem {
                        renderer.warn(&format!("{} does not load: {problem}", path.display()));
                    }
                    renderer.warn(&format!(
                        "{} already exists; use --force to overwrite",
                        path.display()
                    ));
                }
                ConfigInitResult::Overwritten {
                    path,
                    backup_path,
                    problem,
                } => {
                    if let Some(problem) = problem {
                        renderer.warn(&format!("previous config did not load: {problem}"));
                    }
                    renderer.activity(&format!(
                        "wrote {} (previous config saved to {})",
                        path.display(),
                        backup_path.display()
                    ));
                }
            }
            Ok(())
        }
    }
}

fn capture_mode(config: &Config) -> Result<CaptureMode, String> {
    config.capture_mode().map_err(|e| e.to_string())
}

fn editor(config: &Config) -> Result<EditorCommand, String> {
    EditorCommand::parse(&config.capture.editor, config.capture.goto_line)
        .map_err(|e| e.to_string())
}

/// Interactive session on a capture file; any other file is handed to the
/// editor untouched.
async fn edit(config: &Config, renderer: &Renderer, target: cli::EditTarget) -> Result<(), String> {
    let cli::EditTarget { file, line } = target;
    if !is_capture_path(&file) {
        let plain = EditorCommand::parse(&config.capture.editor, line.is_some())
            .map_err(|e| e.to_string())?;
        let line = line.map_or(0, |n| n - 1);
        return plain.edit(&file, line).map_err(|e| e.to_string());
    }
    if line.is_some() {
        debug!(path = %file.display(), "capture files open at their first uncleared entry");
    }

    let mode = capture_mode(config)?;
    let editor = editor(config)?;
    let keys = stdin_keys();
    let session_renderer = *renderer;
    let path = file.clone();
    // Nobody in this process waits; the caller waits on our exit.
    let (signal, _waiter) = completion_channel();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut source = keys();
        edit_capture_file(&mode, &path, signal, &editor, source.as_mut(), &session_renderer)
    })
    .await
    .map_err(|e| e.to_string())?
    .map_err(|e| e.to_string())?;

    report_outcome(renderer, &file, outcome);
    Ok(())
}

/// Open `file` and end it with `command` without prompting.
fn close(
    config: &Config,
    renderer: &Renderer,
    file: &Path,
    command: CaptureCommand,
) -> Result<(), String> {
    let mode = capture_mode(config)?;
    let (signal, _waiter) = completion_channel();
    let (mut session, _report) = mode
        .open_existing(file, signal)
        .map_err(|e| e.to_string())?;
    session.run_command(command).map_err(|e| e.to_string())?;
    report_outcome(renderer, file, session.outcome());
    Ok(())
}

fn report_outcome(renderer: &Renderer, file: &Path, outcome: Outcome) {
    match outcome {
        Outcome::Committed => renderer.activity(&format!("committed {}", file.display())),
        Outcome::Aborted => renderer.activity(&format!("discarded {}", file.display())),
        Outcome::Pending => renderer.warn(&format!("{} left pending", file.display())),
    }
}
