//! Token merging
//!
//! Joins predicted tokens onto the tokens already on the cursor line,
//! deciding between abutting and separating each pair from the affinity
//! table of the dialect, validating the brackets opened by the prediction and
//! closing the ones left open with a placeholder inside.

use tracing::debug;

use crate::dialect::{Dialect, Flow, MergeStep};
use crate::error::Rejection;
use crate::types::{Affinity, MergeOptions, Snippet, SnippetBuilder, Token};

/// Merge `predicted` after `context` into a snippet holding only the
/// predicted text
pub fn merge<D: Dialect>(
    dialect: &D,
    context: &[Token<D::Kind>],
    predicted: &[Token<D::Kind>],
    options: MergeOptions,
) -> Result<Snippet, Rejection> {
    let result = merge_tokens(dialect, context, predicted, options);
    if let Err(reason) = &result {
        debug!(language = %D::LANGUAGE, %reason, "prediction rejected");
    }
    result
}

fn merge_tokens<D: Dialect>(
    dialect: &D,
    context: &[Token<D::Kind>],
    predicted: &[Token<D::Kind>],
    options: MergeOptions,
) -> Result<Snippet, Rejection> {
    match predicted {
        [] => return Err(Rejection::EmptyPrediction),
        [only] if dialect.is_literal(only.kind) && !options.has_prefix => {
            return Err(Rejection::LoneLiteral)
        }
        _ => {}
    }
    dialect.screen(context, predicted)?;

    let tokens: Vec<&Token<D::Kind>> = context.iter().chain(predicted).collect();
    let last = tokens.len() - 1;

    let mut out = SnippetBuilder::new();
    let mut stack: Vec<D::Kind> = Vec::new();
    let mut scratch = D::Scratch::default();
    let mut last_right = Affinity::Must;
    let mut newline = false;
    let mut in_completion = false;

    for index in 0..tokens.len() {
        let token = tokens[index];
        let aff = dialect.affinity(token.kind);
        let first = index == context.len();

        // Merging onto text typed before a space would change that text.
        if first
            && options.preceded_by_space
            && dialect.guards_forced_merge(index)
            && (last_right == Affinity::Must || aff.left == Affinity::Must)
        {
            return Err(Rejection::ForcedMerge);
        }

        if first {
            out.clear();
            in_completion = true;
            if options.has_prefix || options.preceded_by_space {
                last_right = Affinity::Must;
            }
        }

        if newline {
            out.push_str("\n");
            newline = false;
        }

        let mut step = MergeStep {
            tokens: &tokens,
            index,
            context_len: context.len(),
            options,
            in_completion,
            last_right,
            newline,
            out: &mut out,
        };
        let flow = dialect.layout(&mut scratch, &mut step)?;
        last_right = step.last_right;
        newline = step.newline;
        if flow == Flow::Handled {
            continue;
        }

        // e.g. `foo(bar,` is only useful ending in an argument or the closer
        if index == last {
            if let Some(&open) = stack.last() {
                let closes = dialect.closer_of(open) == Some(token.kind);
                if !dialect.is_literal(token.kind) && !dialect.is_identifier(token.kind) && !closes {
                    return Err(Rejection::DanglingSeparator);
                }
            }
        }

        if in_completion {
            if dialect.closer_of(token.kind).is_some() {
                stack.push(token.kind);
            }
            if dialect.is_closer(token.kind) {
                let open = stack.last().copied().ok_or(Rejection::UnopenedCloser)?;
                if dialect.closer_of(open) != Some(token.kind) {
                    return Err(Rejection::MismatchedCloser);
                }
                stack.pop();
            }
        }

        let mut step = MergeStep {
            tokens: &tokens,
            index,
            context_len: context.len(),
            options,
            in_completion,
            last_right,
            newline,
            out: &mut out,
        };
        let flow = dialect.special(&mut scratch, &mut step)?;
        last_right = step.last_right;
        newline = step.newline;
        if flow == Flow::Handled {
            continue;
        }

        if !last_right.merges(aff.left) {
            out.push_str(" ");
        }
        dialect.render_token(token, &mut out);
        last_right = aff.right;
    }

    while let Some(open) = stack.pop() {
        if last_right == Affinity::Never {
            out.push_str(" ");
        }
        out.push_hole("");
        out.push_str(dialect.closer_text(open));
    }

    Ok(out.build())
}
