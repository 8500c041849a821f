//! Processing step trait.

use std::fmt;

use crate::context::Context;
use crate::diagnostic::Result;

/// One transformation step in a processor chain.
///
/// A step receives the previous step's output and the context of the file
/// being transformed, and returns new content. Steps may call back into the
/// context to resolve, depend on, require or evaluate other assets, and may
/// report the line they are rendering with [`Context::set_line`].
pub trait Processor: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str;

    /// Transform `input`.
    fn render(&self, context: &mut Context<'_>, input: String) -> Result<String>;
}

/// A [`Processor`] backed by a closure.
///
/// # Example
///
/// ```ignore
/// let upcase = FnProcessor::new("upcase", |_, input| Ok(input.to_uppercase()));
/// ```
pub struct FnProcessor<F = fn(&mut Context<'_>, String) -> Result<String>> {
    name: String,
    render: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&mut Context<'_>, String) -> Result<String> + Send + Sync,
{
    /// Create a processor named `name`.
    pub fn new(name: impl Into<String>, render: F) -> Self {
        Self {
            name: name.into(),
            render,
        }
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: Fn(&mut Context<'_>, String) -> Result<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, context: &mut Context<'_>, input: String) -> Result<String> {
        (self.render)(context, input)
    }
}

impl<F> fmt::Debug for FnProcessor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor").field("name", &self.name).finish()
    }
}
