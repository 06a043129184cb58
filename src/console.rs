//! Console output with ANSI color support.
//!
//! Progress goes to stdout and errors to stderr. Colors are used only on a
//! terminal, and never when `NO_COLOR` is set.

use std::io::{self, IsTerminal};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Kind of message, which decides label, color and stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Ok,
    Warn,
    Error,
    Step,
}

impl Level {
    fn label(self) -> (&'static str, Style) {
        match self {
            Level::Info => ("INFO", Style::Blue),
            Level::Ok => ("OK", Style::Green),
            Level::Warn => ("WARN", Style::Yellow),
            Level::Error => ("ERROR", Style::Red),
            Level::Step => ("STEP", Style::Cyan),
        }
    }
}

/// Console output handler with color support detection.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a console, enabling colors only for a terminal without
    /// `NO_COLOR`.
    pub fn new() -> Self {
        let colors_enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        format!("[{}]", self.style(label, &[color, Style::Bold]))
    }

    fn line(&self, level: Level, message: &str) -> String {
        let (label, color) = level.label();
        format!("{} {}", self.label(label, color), message)
    }

    fn emit(&self, level: Level, message: &str) {
        let line = self.line(level, message);
        if level == Level::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.emit(Level::Ok, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    /// Prints to stderr.
    pub fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    pub fn step(&self, message: &str) {
        self.emit(Level::Step, message);
    }

    /// Prints a blank line and a magenta bold header.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Returns text styled as muted (dim gray).
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Formats a count in bold green.
    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }
}
