//! Terminal output helpers.

use owo_colors::OwoColorize;

/// Status types for consistent formatting.
#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Error,
    Info,
}

impl Status {
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Error => "✗",
            Status::Info => "→",
        }
    }

    /// Formats a status message with symbol and color.
    pub fn format(&self, message: &str) -> String {
        match self {
            Status::Success => format!("{} {}", self.symbol().green(), message.green().bold()),
            Status::Error => format!("{} {}", self.symbol().red(), message.red().bold()),
            Status::Info => format!("{} {}", self.symbol().cyan(), message.cyan()),
        }
    }
}

pub fn print_success(message: &str) {
    println!("{}", Status::Success.format(message));
}

pub fn print_error(message: &str) {
    println!("{}", Status::Error.format(message));
}

/// Prints a key-value pair with consistent formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}

/// Prints the banner shown above each transformed file.
pub fn print_file_header(path: &str, transformer: Option<&str>) {
    let transformer = transformer.unwrap_or("passthrough");
    println!(
        "{} {}",
        Status::Info.format(path),
        format!("({})", transformer).bright_black()
    );
}
