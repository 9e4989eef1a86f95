//! Terminal status output.
//!
//! Status lines go to stderr so stdout stays clean for entries printed by
//! `import --dryrun`.

use crossterm::style::{Color, Stylize};

const LABEL_WARNING: &str = "warning:";
const LABEL_ERROR: &str = "error:";
const GLYPH_SECTION_BULLET: &str = "•";
const INDENT_1: &str = "  ";

/// Status renderer with optional color.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("\r{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("\r{LABEL_WARNING} {msg}");
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("\r{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("\r{LABEL_ERROR} {msg}");
        }
    }

    /// Render a titled section divider.
    pub fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                GLYPH_SECTION_BULLET.with(Color::DarkGrey),
                title.with(Color::Cyan).bold()
            );
        } else {
            eprintln!("\r{title}:");
        }
    }

    pub fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                GLYPH_SECTION_BULLET.with(Color::DarkGrey),
                text.with(Color::Green)
            );
        } else {
            eprintln!("\r{text}");
        }
    }

    /// Render one key/value row.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "\r{INDENT_1}{} {}",
                format!("{key}:").with(Color::DarkGrey),
                value.with(Color::White),
            );
        } else {
            eprintln!("\r{INDENT_1}{key}: {value}");
        }
    }

    /// Prompt line listing the available terminal commands.
    pub fn command_hint(&self, hint: &str) {
        if self.color {
            eprint!("\r{} ", hint.with(Color::DarkGrey));
        } else {
            eprint!("\r{hint} ");
        }
    }

    /// Print an entry verbatim to stdout.
    pub fn entry_block(&self, text: &str) {
        println!("{}", text.trim_end());
        println!();
    }
}
