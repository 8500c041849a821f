//! Processor chain runner.
//!
//! Content is threaded through the chain in order; each step runs against
//! the context of the file being transformed. A failing step is annotated
//! with that file and its current line, and propagated with its kind intact.

use std::sync::Arc;

use tracing::debug;

use super::processor::Processor;
use crate::context::{Context, DependencyRecord, ResolveOptions};
use crate::diagnostic::Result;

/// Options for [`Context::evaluate`].
#[derive(Clone, Default)]
pub struct EvaluateOptions {
    /// Initial content. When absent, the file is read as text.
    pub data: Option<String>,
    /// Processor chain override. When absent, the registry's chain is used.
    pub processors: Option<Vec<Arc<dyn Processor>>>,
}

impl EvaluateOptions {
    /// Default options: read the file, use the registry's chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `data` as the initial content instead of reading the file.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Use `processors` instead of the registry's chain.
    pub fn with_processors(mut self, processors: Vec<Arc<dyn Processor>>) -> Self {
        self.processors = Some(processors);
        self
    }
}

/// Output of a nested evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Final content.
    pub content: String,
    /// Bookkeeping of the nested context, for the evaluated file's own
    /// cache entry.
    pub record: DependencyRecord,
}

impl Evaluation {
    /// Discard the nested bookkeeping.
    pub fn into_content(self) -> String {
        self.content
    }
}

/// Evaluate `reference` from `parent` in a fresh child context.
pub(crate) fn evaluate(
    parent: &mut Context<'_>,
    reference: &str,
    options: EvaluateOptions,
) -> Result<Evaluation> {
    let pathname = parent.resolve(reference, &ResolveOptions::any())?;
    let mut child = parent.child(&pathname, reference)?;

    let registry = parent.registry();
    let processors = match options.processors {
        Some(processors) => processors,
        None => registry.attributes_for(&pathname).processors,
    };
    let input = match options.data {
        Some(data) => data,
        None => {
            let text = registry.read_unicode_text(&pathname)?;
            parent.record_dependency(pathname.clone());
            text
        }
    };

    debug!(
        from = %parent.pathname().display(),
        path = %pathname.display(),
        steps = processors.len(),
        "evaluate"
    );
    let content = run_chain(&mut child, &processors, input)?;

    Ok(Evaluation {
        content,
        record: child.into_record(),
    })
}

/// Thread `input` through `processors` within `context`.
pub(crate) fn run_chain(
    context: &mut Context<'_>,
    processors: &[Arc<dyn Processor>],
    input: String,
) -> Result<String> {
    processors.iter().try_fold(input, |content, processor| {
        processor
            .render(context, content)
            .map_err(|err| err.annotate(context.location()))
    })
}
