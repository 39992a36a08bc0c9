//! tabstop rendering core
//!
//! Turns predicted token sequences into formatted completion snippets with
//! tab-stop placeholders, for Go, JavaScript and Python.
//!
//! # Pipeline
//!
//! 1. **Indentation probe**: for indentation-sensitive languages, recover the
//!    indent unit and block depth of the cursor line ([`indent::inspect`])
//! 2. **Token merge**: join the predicted tokens onto the cursor line, choosing
//!    between abutting and separating each pair from the dialect's affinity
//!    table, and close brackets the prediction leaves open ([`merge::merge`])
//! 3. **Pretty printing**: splice the merged text into the buffer, parse it
//!    and re-print the syntax tree around the insertion, recording offset
//!    mappings from the spliced source to the output ([`Dialect::prettify`])
//! 4. **Translation**: carry the replace range and every placeholder across
//!    the mappings and cut the formatted snippet out ([`format::format`])
//!
//! Formatting never loses a completion: whenever a position cannot be carried
//! over, the unformatted snippet is returned instead.
//!
//! # Dialects
//!
//! The algorithms are written once over the [`Dialect`] trait. A dialect
//! supplies the token kinds of its language, their affinities and bracket
//! pairs, merge hooks for language-specific cases and a pretty printer:
//!
//! - [`Go`]: automatic semicolons, statement braces and case labels
//! - [`JavaScript`]: JSX tags, regex and template literals, ASI
//! - [`Python`]: indentation tokens and blank lines between definitions
//!
//! # Configuration
//!
//! Each dialect takes an immutable style record ([`GoStyle`],
//! [`JavaScriptStyle`], [`PythonStyle`]) passed explicitly to every call.
//! [`ConfigLoader`] reads all of them from YAML or JSON.
//!
//! # Example
//!
//! ```ignore
//! use tabstop_render::{CursorContext, Go, GoStyle, Renderer};
//! use tabstop_parsers::ParserRegistry;
//!
//! let renderer = Renderer::new(Go, GoStyle::default(), ParserRegistry::new());
//! let context = CursorContext::find(&buffer, &tokens, cursor);
//! if let Some(completion) = renderer.render(&buffer, &context, &prediction)? {
//!     println!("{}", completion.snippet.to_tabstop_string());
//! }
//! ```
pub mod config;
pub mod cursor;
pub mod dialect;
pub mod error;
pub mod format;
pub mod indent;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod prettify;
pub mod types;

pub use config::{ConfigFormat, ConfigLoader, GoStyle, JavaScriptStyle, Layout, PythonStyle, RenderConfig};
pub use cursor::CursorContext;
pub use dialect::{Dialect, DialectStyle, Go, GoKind, JavaScript, JsKind, PyKind, Python};
pub use error::{Rejection, RenderError, RenderResult};
pub use format::{format, translate};
pub use indent::{inspect, Indentation};
pub use logging::init_logging;
pub use merge::merge;
pub use pipeline::{run_with_deadline, Renderer};
pub use types::{
    Affinity, AffinityPair, Completion, MatchOption, MergeOptions, OffsetMapping, PredictedToken, Prediction,
    ReplaceRange, Snippet, SnippetBuilder, Token,
};
