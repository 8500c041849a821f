//! Human-readable error formatting.

use std::fmt::Write;
use std::path::Path;

use super::error::{AssetError, SourceLocation};
use crate::resource::Registry;
use crate::resource::file::read_text;

// ============================================================================
// Options
// ============================================================================

/// Display style for error output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayStyle {
    /// Message, location trace and the offending source line.
    #[default]
    Rich,
    /// Single `path:line: message` line.
    Short,
}

/// Options for controlling error formatting.
///
/// # Example
///
/// ```ignore
/// use asset_batch::diagnostic::{DiagnosticOptions, DisplayStyle};
///
/// // Plain text (no ANSI colors) for logging
/// let opts = DiagnosticOptions::plain();
///
/// // Short format for CI/IDE integration
/// let opts = DiagnosticOptions::short();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticOptions {
    /// Whether to use ANSI colors in output.
    pub colored: bool,
    /// Display style.
    pub style: DisplayStyle,
    /// Whether to print the source line at the innermost location.
    pub snippets: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            colored: true,
            style: DisplayStyle::Rich,
            snippets: true,
        }
    }
}

impl DiagnosticOptions {
    /// Create options for colored terminal output.
    pub fn colored() -> Self {
        Self::default()
    }

    /// Create options for plain text output (no colors).
    pub fn plain() -> Self {
        Self {
            colored: false,
            ..Self::default()
        }
    }

    /// Create options for short, single-line output.
    pub fn short() -> Self {
        Self {
            colored: false,
            style: DisplayStyle::Short,
            snippets: false,
        }
    }

    /// Set whether to use colors.
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Set the display style.
    pub fn with_style(mut self, style: DisplayStyle) -> Self {
        self.style = style;
        self
    }

    /// Set whether to include source snippets.
    pub fn with_snippets(mut self, snippets: bool) -> Self {
        self.snippets = snippets;
        self
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Format an error for display.
///
/// Rich output:
///
/// ```text
/// error: erb: undefined method `name'
///   --> /app/assets/broken.js.erb:4
///    |
///  4 | var name = <%= user.name %>;
///   --> /app/assets/application.js:1
/// ```
///
/// Snippets are read from disk. Use [`format_error_with_sources`] when the
/// files live behind a custom [`Registry`].
pub fn format_error(error: &AssetError, options: &DiagnosticOptions) -> String {
    render(error, options, &|path: &Path| read_text(path).ok())
}

/// Format an error, reading snippet sources through `registry`.
pub fn format_error_with_sources(
    error: &AssetError,
    options: &DiagnosticOptions,
    registry: &dyn Registry,
) -> String {
    render(error, options, &|path: &Path| registry.read_unicode_text(path).ok())
}

type SourceReader<'a> = dyn Fn(&Path) -> Option<String> + 'a;

fn render(error: &AssetError, options: &DiagnosticOptions, read: &SourceReader<'_>) -> String {
    let message = error.message();
    let trace = error.trace();

    if options.style == DisplayStyle::Short {
        return match trace.first() {
            Some(location) => format!("{location}: {message}"),
            None => message,
        };
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {message}",
        paint_error("error", options.colored)
    );

    for (index, location) in trace.iter().enumerate() {
        let _ = writeln!(out, "  {} {location}", paint_help("-->", options.colored));
        if index == 0 && options.snippets {
            write_snippet(&mut out, location, options.colored, read);
        }
    }

    out
}

/// Write the source line at `location`, if it can be read.
fn write_snippet(
    out: &mut String,
    location: &SourceLocation,
    colored: bool,
    read: &SourceReader<'_>,
) {
    let Some(line) = location.line else {
        return;
    };
    let Some(text) = read(&location.path).and_then(|content| source_line(&content, line)) else {
        return;
    };

    let width = line.to_string().len();
    let gutter = paint_help("|", colored);
    let _ = writeln!(out, "  {:width$} {gutter}", "");
    let _ = writeln!(out, "  {} {gutter} {text}", paint_help(&line.to_string(), colored));
}

fn source_line(content: &str, line: usize) -> Option<String> {
    content
        .lines()
        .nth(line.checked_sub(1)?)
        .map(str::to_owned)
}

// ============================================================================
// Internal Coloring (private)
// ============================================================================

#[cfg(feature = "colored-diagnostics")]
fn paint_error(text: &str, colored: bool) -> String {
    use owo_colors::OwoColorize;
    if colored {
        text.red().bold().to_string()
    } else {
        text.to_owned()
    }
}

#[cfg(feature = "colored-diagnostics")]
fn paint_help(text: &str, colored: bool) -> String {
    use owo_colors::OwoColorize;
    if colored {
        text.cyan().to_string()
    } else {
        text.to_owned()
    }
}

#[cfg(not(feature = "colored-diagnostics"))]
fn paint_error(text: &str, _colored: bool) -> String {
    text.to_owned()
}

#[cfg(not(feature = "colored-diagnostics"))]
fn paint_help(text: &str, _colored: bool) -> String {
    text.to_owned()
}
