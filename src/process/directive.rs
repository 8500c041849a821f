//! Dependency directives in a file's leading comment header.
//!
//! ```text
//! //= require lib
//! //= depend_on config.json
//! /*
//!  *= require "vendor/reset"
//!  *= stub legacy
//!  */
//! # also accepted in hash-comment languages:
//! #= depend_on_asset logo.svg
//! ```
//!
//! The header ends at the first line that is neither blank nor a comment.
//! Every line inside a `/* ... */` block belongs to the header, whatever it
//! starts with. Directive lines are removed from the output; other header
//! lines are kept, and a directive that closes a block leaves its `*/`.

use tracing::trace;

use super::processor::Processor;
use crate::context::Context;
use crate::diagnostic::{AssetError, Result};

const NAME: &str = "directives";
const DIRECTIVES: [&str; 4] = ["require", "depend_on", "depend_on_asset", "stub"];

/// Processor that applies `require`, `depend_on`, `depend_on_asset` and
/// `stub` directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectiveProcessor;

impl DirectiveProcessor {
    /// Create the processor.
    pub fn new() -> Self {
        Self
    }
}

impl Processor for DirectiveProcessor {
    fn name(&self) -> &str {
        NAME
    }

    fn render(&self, context: &mut Context<'_>, input: String) -> Result<String> {
        let mut output = String::with_capacity(input.len());
        let mut header = Header::default();

        for (index, line) in input.split_inclusive('\n').enumerate() {
            let Some(closes_block) = header.advance(line) else {
                output.push_str(line);
                continue;
            };
            let Some((name, argument)) = parse_directive(line) else {
                output.push_str(line);
                continue;
            };

            context.set_line(index + 1);
            apply(context, name, argument)?;

            // Keep the comment balanced when the directive line closed it
            if closes_block {
                output.push_str("*/");
                if line.ends_with('\n') {
                    output.push('\n');
                }
            }
        }

        context.clear_line();
        Ok(output)
    }
}

/// Leading comment header state.
#[derive(Debug, Default)]
struct Header {
    in_block: bool,
    ended: bool,
}

impl Header {
    /// Classify the next line.
    ///
    /// Returns `None` once the header has ended, otherwise whether this line
    /// closes a multi-line `/* ... */` comment.
    fn advance(&mut self, line: &str) -> Option<bool> {
        if self.ended {
            return None;
        }
        let line = line.trim();

        if self.in_block {
            let closes = line.contains("*/");
            self.in_block = !closes;
            return Some(closes);
        }

        if let Some(rest) = line.strip_prefix("/*") {
            self.in_block = !rest.contains("*/");
            return Some(false);
        }
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            return Some(false);
        }

        self.ended = true;
        None
    }
}

fn apply(context: &mut Context<'_>, name: &str, argument: &str) -> Result<()> {
    if !DIRECTIVES.contains(&name) {
        return Err(AssetError::processor(NAME, format!("unknown directive `{name}`")));
    }
    if argument.is_empty() {
        return Err(AssetError::processor(NAME, format!("`{name}` needs an argument")));
    }
    trace!(name, argument, path = %context.pathname().display(), "directive");

    match name {
        "require" => context.require_asset(argument)?,
        "depend_on" => context.depend_on(argument)?,
        "depend_on_asset" => context.depend_on_asset(argument)?,
        _ => context.stub_asset(argument)?,
    };
    Ok(())
}

/// Split `//= name arg` into `("name", "arg")`.
fn parse_directive(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let body = ["//=", "#=", "/*=", "*="]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))?;
    let body = body.strip_suffix("*/").unwrap_or(body).trim();

    let (name, argument) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    if name.is_empty() {
        return None;
    }
    Some((name, unquote(argument.trim())))
}

fn unquote(argument: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|quote| {
            argument
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(argument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;
    use crate::test_utils::StubRegistry;
    use std::path::{Path, PathBuf};

    fn registry() -> StubRegistry {
        StubRegistry::new("/assets")
            .with_file("/assets/app.js", "")
            .with_file("/assets/lib.js", "")
            .with_file("/assets/vendor/reset.js", "")
            .with_file("/assets/legacy.js", "")
            .with_file("/assets/config.json", "")
            .with_file("/assets/logo.svg", "")
    }

    fn render<'a>(reg: &'a StubRegistry, input: &str) -> (Result<String>, Context<'a>) {
        let mut ctx = Context::new(reg, Path::new("/assets/app.js"), "app.js");
        let out = DirectiveProcessor.render(&mut ctx, input.to_string());
        (out, ctx)
    }

    #[test]
    fn test_parse_directive() {
        assert_eq!(parse_directive("//= require lib\n"), Some(("require", "lib")));
        assert_eq!(parse_directive(" *= stub 'legacy'"), Some(("stub", "legacy")));
        assert_eq!(parse_directive("#= depend_on \"a b.json\""), Some(("depend_on", "a b.json")));
        assert_eq!(parse_directive("// require lib"), None);
        assert_eq!(parse_directive("//="), None);
        assert_eq!(parse_directive("/*= require lib */"), Some(("require", "lib")));
        assert_eq!(parse_directive(" *= require 'lib' */\n"), Some(("require", "lib")));
    }

    #[test]
    fn test_block_comment_prose_keeps_header_open() {
        let reg = registry();
        let input = "/*\n Application bundle\n *= require lib\n */\nvar app;\n";
        let (out, ctx) = render(&reg, input);

        assert_eq!(out.unwrap(), "/*\n Application bundle\n */\nvar app;\n");
        assert_eq!(ctx.recorder().required_paths(), [PathBuf::from("/assets/lib.js")]);
    }

    #[test]
    fn test_directive_closing_block() {
        let reg = registry();
        let (out, ctx) = render(&reg, "/*\n *= require lib */\nvar app;\n");

        assert_eq!(out.unwrap(), "/*\n*/\nvar app;\n");
        assert_eq!(ctx.recorder().required_paths(), [PathBuf::from("/assets/lib.js")]);
    }

    #[test]
    fn test_single_line_block_directive() {
        let reg = registry();
        let (out, ctx) = render(&reg, "/*= require lib */\n/* plain */\n//= stub legacy\nvar app;\n");

        assert_eq!(out.unwrap(), "/* plain */\nvar app;\n");
        assert_eq!(ctx.recorder().required_paths(), [PathBuf::from("/assets/lib.js")]);
        assert!(ctx
            .recorder()
            .record()
            .stubbed_assets
            .contains(Path::new("/assets/legacy.js")));
    }

    #[test]
    fn test_directives_applied_and_stripped() {
        let reg = registry();
        let input = "//= require lib\n/*\n *= require \"vendor/reset\"\n *= stub legacy\n */\n#= depend_on config.json\nvar app;\n";
        let (out, ctx) = render(&reg, input);

        assert_eq!(out.unwrap(), "/*\n */\nvar app;\n");
        let record = ctx.into_record();
        assert_eq!(
            record.required_paths,
            [PathBuf::from("/assets/lib.js"), PathBuf::from("/assets/vendor/reset.js")]
        );
        assert!(record.stubbed_assets.contains(Path::new("/assets/legacy.js")));
        assert!(record.dependency_paths.contains(Path::new("/assets/config.json")));
    }

    #[test]
    fn test_directives_after_header_ignored() {
        let reg = registry();
        let input = "var a;\n//= require lib\n";
        let (out, ctx) = render(&reg, input);

        assert_eq!(out.unwrap(), input);
        assert!(ctx.recorder().required_paths().is_empty());
    }

    #[test]
    fn test_depend_on_asset_directive() {
        let reg = registry();
        let (out, ctx) = render(&reg, "//= depend_on_asset logo.svg\n");

        assert_eq!(out.unwrap(), "");
        assert!(ctx
            .recorder()
            .record()
            .dependency_assets
            .contains(Path::new("/assets/logo.svg")));
    }

    #[test]
    fn test_unknown_directive_fails_at_line() {
        let reg = registry();
        let (out, ctx) = render(&reg, "// header\n//= require_everything\n");

        let err = out.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processor);
        assert_eq!(ctx.line(), Some(2));
    }

    #[test]
    fn test_unknown_directive_with_argument() {
        let reg = registry();
        let (out, _) = render(&reg, "//= include lib\n");

        let err = out.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Processor);
        assert!(err.to_string().contains("unknown directive `include`"));
    }

    #[test]
    fn test_failed_require_keeps_kind() {
        let reg = registry();
        let (out, ctx) = render(&reg, "\n//= require config.json\n");

        assert_eq!(out.unwrap_err().kind(), ErrorKind::ContentTypeMismatch);
        assert_eq!(ctx.line(), Some(2));
    }
}
