//! Style configuration for the pretty printers
//!
//! Every style is an immutable value passed explicitly to each render call.
//! Files may override any subset of fields; missing fields take the
//! built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tabstop_parsers::Language;

use crate::dialect::DialectStyle;
use crate::error::{RenderError, RenderResult};

/// Tri-state layout knob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Always,
    Never,
    /// Decide from the content and from the user's own layout
    #[default]
    Auto,
}

/// Go printer style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoStyle {
    pub indent: String,
    pub space_after_comma: bool,
}

impl Default for GoStyle {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            space_after_comma: true,
        }
    }
}

/// JavaScript printer style
///
/// Knobs follow the common stylistic lint rules, e.g. `array_bracket_spacing`
/// turns `[1,2]` into `[ 1,2 ]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaScriptStyle {
    pub indent: String,
    pub array_bracket_newline: Layout,
    pub array_bracket_spacing: bool,
    pub array_element_newline: Layout,
    pub arrow_spacing_before: bool,
    pub arrow_spacing_after: bool,
    pub block_spacing: bool,
    pub comma_spacing_before: bool,
    pub comma_spacing_after: bool,
    pub computed_property_spacing: bool,
    pub func_call_spacing: bool,
    pub func_param_argument_newline: Layout,
    pub func_paren_newline: Layout,
    /// Put an arrow's expression body on the next line
    pub implicit_arrow_linebreak: bool,
    pub key_spacing_before_colon: bool,
    pub key_spacing_after_colon: bool,
    /// Space before keywords following `}` or `)`
    pub keyword_spacing_before: bool,
    /// Space after keywords preceding `{` or `(`
    pub keyword_spacing_after: bool,
    /// Put a non-block statement body on the next line
    pub non_block_statement_body_linebreak: bool,
    pub object_curly_newline: Layout,
    pub object_curly_spacing: bool,
    pub object_property_newline: Layout,
    /// Print `;` where statements end instead of a newline
    pub semicolon: bool,
    pub space_before_blocks: bool,
    pub space_before_func_paren: bool,
    pub space_in_parens: bool,
    pub space_infix_ops: bool,
    pub space_unary_ops_words: bool,
    pub space_unary_ops_non_words: bool,
    /// Each statement on its own line
    pub statement_newline: bool,
    pub switch_colon_spacing_before: bool,
    pub switch_colon_spacing_after: bool,
    pub switch_colon_newline: bool,
    pub template_tag_spacing: bool,
    pub jsx_fragment_children_newline: bool,
    pub jsx_element_children_newline: Layout,
    pub jsx_attribute_newline: Layout,
}

impl Default for JavaScriptStyle {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            array_bracket_newline: Layout::Auto,
            array_bracket_spacing: false,
            array_element_newline: Layout::Auto,
            arrow_spacing_before: true,
            arrow_spacing_after: true,
            block_spacing: false,
            comma_spacing_before: false,
            comma_spacing_after: true,
            computed_property_spacing: false,
            func_call_spacing: false,
            func_param_argument_newline: Layout::Auto,
            func_paren_newline: Layout::Auto,
            implicit_arrow_linebreak: false,
            key_spacing_before_colon: false,
            key_spacing_after_colon: true,
            keyword_spacing_before: true,
            keyword_spacing_after: true,
            non_block_statement_body_linebreak: false,
            object_curly_newline: Layout::Auto,
            object_curly_spacing: true,
            object_property_newline: Layout::Auto,
            semicolon: false,
            space_before_blocks: true,
            space_before_func_paren: false,
            space_in_parens: false,
            space_infix_ops: true,
            space_unary_ops_words: true,
            space_unary_ops_non_words: false,
            statement_newline: true,
            switch_colon_spacing_before: false,
            switch_colon_spacing_after: false,
            switch_colon_newline: true,
            template_tag_spacing: false,
            jsx_fragment_children_newline: true,
            jsx_element_children_newline: Layout::Auto,
            jsx_attribute_newline: Layout::Auto,
        }
    }
}

/// Python printer style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonStyle {
    pub indent: String,
    pub space_after_comma: bool,
    pub space_after_colon_in_pair: bool,
    pub space_after_colon_in_slice: bool,
    pub space_after_colon_in_typed_param: bool,
    pub space_after_colon_in_lambda: bool,
    pub space_around_arrow: bool,
    pub space_infix_ops: bool,
    pub space_in_keyword_arguments: bool,
    pub blank_lines_before_class_def: usize,
    pub blank_lines_before_top_func_def: usize,
    pub blank_lines_between_methods: usize,
    pub list_items_newline: Layout,
    pub dictionary_items_newline: Layout,
    pub func_params_newline: Layout,
}

impl Default for PythonStyle {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            space_after_comma: true,
            space_after_colon_in_pair: true,
            space_after_colon_in_slice: false,
            space_after_colon_in_typed_param: true,
            space_after_colon_in_lambda: true,
            space_around_arrow: true,
            space_infix_ops: true,
            space_in_keyword_arguments: false,
            blank_lines_before_class_def: 2,
            blank_lines_before_top_func_def: 2,
            blank_lines_between_methods: 1,
            list_items_newline: Layout::Auto,
            dictionary_items_newline: Layout::Auto,
            func_params_newline: Layout::Auto,
        }
    }
}

/// Top-level configuration of the rendering core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub go: GoStyle,
    pub javascript: JavaScriptStyle,
    pub python: PythonStyle,
    /// Budget for formatting one completion
    pub deadline_ms: u64,
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub log_level: String,
    /// Idle parsers kept per language
    pub max_parsers: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            go: GoStyle::default(),
            javascript: JavaScriptStyle::default(),
            python: PythonStyle::default(),
            deadline_ms: 100,
            log_level: "info".to_string(),
            max_parsers: tabstop_parsers::pool::DEFAULT_MAX_IDLE,
        }
    }
}

impl RenderConfig {
    /// Built-in style for `language`, with any overrides from this config
    pub fn style_for(&self, language: Language) -> DialectStyle {
        match language {
            Language::Go => DialectStyle::Go(self.go.clone()),
            Language::JavaScript => DialectStyle::JavaScript(self.javascript.clone()),
            Language::Python => DialectStyle::Python(self.python.clone()),
        }
    }
}

/// Render configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> RenderResult<RenderConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: RenderConfig = serde_yaml::from_str(&content)?;
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> RenderResult<RenderConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: RenderConfig = serde_json::from_str(&content)?;
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(content: &str, format: ConfigFormat) -> RenderResult<RenderConfig> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Validate render configuration
    pub fn validate_config(config: &RenderConfig) -> RenderResult<()> {
        let indents = [
            ("go", &config.go.indent),
            ("javascript", &config.javascript.indent),
            ("python", &config.python.indent),
        ];
        for (language, indent) in indents {
            if indent.is_empty() || !indent.chars().all(char::is_whitespace) {
                return Err(RenderError::Config(format!(
                    "Indent for {} must be non-empty whitespace, got {:?}",
                    language, indent
                )));
            }
        }

        if config.deadline_ms == 0 {
            return Err(RenderError::Config("Deadline must be positive".to_string()));
        }

        if config.max_parsers == 0 {
            return Err(RenderError::Config(
                "Parser pool size must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Built-in style for a language
    pub fn default_for_language(language: Language) -> DialectStyle {
        RenderConfig::default().style_for(language)
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}
