//! Rendering predictions into completions
//!
//! A [`Renderer`] takes one prediction through the whole pipeline: indentation
//! probe for indentation-sensitive languages, token merge, then formatting in
//! place. Renders are synchronous; [`Renderer::render_stream`] drives a
//! stream of predictions and [`Renderer::format_with_deadline`] bounds one
//! formatting call in time.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::{pin_mut, Stream, StreamExt};
use tabstop_parsers::ParserRegistry;
use tracing::{debug, warn};

use crate::cursor::CursorContext;
use crate::dialect::Dialect;
use crate::error::{RenderError, RenderResult};
use crate::format::format;
use crate::merge::merge;
use crate::types::{Completion, MatchOption, Prediction, ReplaceRange, Snippet, Token};

/// Renders predictions for one dialect
pub struct Renderer<D: Dialect> {
    dialect: D,
    style: D::Style,
    registry: ParserRegistry,
}

impl<D: Dialect> Renderer<D> {
    pub fn new(dialect: D, style: D::Style, registry: ParserRegistry) -> Self {
        Self {
            dialect,
            style,
            registry,
        }
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn style(&self) -> &D::Style {
        &self.style
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Cursor context for `tokens` of `buffer`, with this dialect's prefix rules
    pub fn context(&self, buffer: &str, tokens: &[Token<D::Kind>], cursor: usize) -> CursorContext<D::Kind> {
        CursorContext::for_dialect(&self.dialect, buffer, tokens, cursor)
    }

    /// Format `snippet` in place of `replace` in `buffer`
    pub fn format(
        &self,
        buffer: &str,
        replace: ReplaceRange,
        snippet: &Snippet,
        option: MatchOption,
    ) -> RenderResult<Snippet> {
        format(&self.dialect, &self.style, &self.registry, buffer, replace, snippet, option)
    }

    /// Render one prediction at the cursor
    ///
    /// `Ok(None)` means the prediction was rejected; errors are reserved for
    /// parser failures and invalid ranges.
    pub fn render(
        &self,
        buffer: &str,
        context: &CursorContext<D::Kind>,
        prediction: &Prediction<D::Kind>,
    ) -> RenderResult<Option<Completion>> {
        if prediction.ends_incomplete {
            debug!("Skipping incomplete prediction");
            return Ok(None);
        }
        let prefix = context.prefix.as_str();
        if let Some(first) = prediction.tokens.first() {
            if !first.literal.starts_with(prefix) {
                debug!(prefix, literal = %first.literal, "Prediction does not extend the prefix");
                return Ok(None);
            }
        }

        let adjusted;
        let dialect = if D::INDENT_SENSITIVE {
            let tree = self.registry.parse(D::LANGUAGE, buffer)?;
            match self.dialect.at_cursor(buffer, tree.root_node(), context.offset) {
                Ok(Some(found)) => {
                    adjusted = found;
                    &adjusted
                }
                Ok(None) => &self.dialect,
                Err(err @ RenderError::InconsistentIndentation { .. }) => {
                    debug!(error = %err, "Skipping prediction");
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        } else {
            &self.dialect
        };

        let predicted: Vec<Token<D::Kind>> = prediction.tokens.iter().map(|t| t.as_token()).collect();
        let options = context.merge_options();
        let Ok(snippet) = merge(dialect, &context.line_context, &predicted, options) else {
            return Ok(None);
        };

        let replace = ReplaceRange::new(context.replace_begin(), context.offset);
        let option = if options.has_prefix || options.preceded_by_space {
            MatchOption::MatchStart
        } else {
            MatchOption::MatchEnd
        };
        let snippet = format(dialect, &self.style, &self.registry, buffer, replace, &snippet, option)?;
        Ok(Some(Completion { snippet, replace }))
    }

    /// Render every prediction of `predictions` in order, dropping rejected
    /// ones and repeated snippet texts
    ///
    /// Stops at the first stream error and returns it with the completions
    /// rendered so far.
    pub async fn render_stream<S, E>(
        &self,
        buffer: &str,
        context: &CursorContext<D::Kind>,
        predictions: S,
    ) -> (Vec<Completion>, Option<E>)
    where
        S: Stream<Item = Result<Prediction<D::Kind>, E>>,
    {
        pin_mut!(predictions);
        let mut seen = HashSet::new();
        let mut completions = Vec::new();

        while let Some(item) = predictions.next().await {
            let prediction = match item {
                Ok(prediction) => prediction,
                Err(err) => return (completions, Some(err)),
            };
            match self.render(buffer, context, &prediction) {
                Ok(Some(completion)) => {
                    if seen.insert(completion.snippet.text.clone()) {
                        completions.push(completion);
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "Failed to render prediction"),
            }
        }
        (completions, None)
    }
}

impl<D: Dialect + 'static> Renderer<D> {
    /// [`Renderer::format`] on the blocking pool, abandoned after `deadline`
    pub async fn format_with_deadline(
        self: Arc<Self>,
        buffer: String,
        replace: ReplaceRange,
        snippet: Snippet,
        option: MatchOption,
        deadline: Duration,
    ) -> RenderResult<Snippet> {
        run_with_deadline(deadline, move || self.format(&buffer, replace, &snippet, option)).await
    }

    /// [`Renderer::render`] on the blocking pool, abandoned after `deadline`
    pub async fn render_with_deadline(
        self: Arc<Self>,
        buffer: String,
        context: CursorContext<D::Kind>,
        prediction: Prediction<D::Kind>,
        deadline: Duration,
    ) -> RenderResult<Option<Completion>> {
        run_with_deadline(deadline, move || self.render(&buffer, &context, &prediction)).await
    }
}

/// Run a synchronous render job on the blocking pool, racing it against a
/// timer
///
/// A job that misses the deadline keeps running to completion; its result is
/// discarded.
pub async fn run_with_deadline<T, F>(deadline: Duration, job: F) -> RenderResult<T>
where
    F: FnOnce() -> RenderResult<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RenderError::TaskFailed(join_error.to_string())),
        Err(_) => {
            let millis = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
            debug!(millis, "Render deadline exceeded");
            Err(RenderError::DeadlineExceeded { millis })
        }
    }
}
