//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use shelf_core::{DisplayedBook, DisplayedBookList, SessionState};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print the displayed book list
    pub fn print_books(&self, list: &DisplayedBookList) {
        match self.format {
            OutputFormat::Human => {
                if list.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in list.iter() {
                    println!("{}", book_line(book));
                }
                println!("\n{} book(s)", list.len());
            }
            OutputFormat::Json => print_json(list.books()),
            OutputFormat::Quiet => {
                for book in list.iter() {
                    println!("{}", book.entry.key());
                }
            }
        }
    }

    /// Print who is logged in
    pub fn print_session(&self, session: &SessionState, library_size: usize) {
        match self.format {
            OutputFormat::Human => {
                println!("User:    {}", session.display_name());
                if session.is_authenticated() {
                    println!("Library: {} book(s)", library_size);
                } else {
                    println!();
                    println!("Log in with: shelf login <username>");
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "authenticated": session.is_authenticated(),
                        "username": session.username(),
                        "library_size": library_size
                    })
                );
            }
            OutputFormat::Quiet => println!("{}", session.display_name()),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// One-line listing: membership marker, title, author, year, key
///
/// The key is printed in full since `add` and `remove` take it.
fn book_line(book: &DisplayedBook) -> String {
    let marker = if book.is_member { "✓" } else { " " };
    let entry = &book.entry;
    let key = if entry.has_key() { entry.key() } else { "-" };
    format!(
        "{} {} | {} | {} | {}",
        marker,
        truncate(entry.title(), 40),
        truncate(entry.author(), 25),
        entry.year(),
        key
    )
}

/// Truncate a string to max characters, adding "..." if truncated
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
