//! Pooled tree-sitter parsers
//!
//! A tree-sitter parser keeps mutable state between calls and must not be
//! used by two threads at once. The pool hands out parsers exclusively: a
//! [`PooledParser`] guard owns its parser until dropped, at which point the
//! parser goes back to the idle list (or is discarded if the pool is full).

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};
use tree_sitter::{Parser, Tree};

use crate::error::{ParserError, ParserResult};
use crate::languages::Language;

/// Default number of idle parsers kept per language
pub const DEFAULT_MAX_IDLE: usize = 8;

/// Pool of parsers for a single language
pub struct ParserPool {
    language: Language,
    max_idle: usize,
    idle: Mutex<Vec<Parser>>,
}

impl ParserPool {
    /// Create an empty pool with the default idle capacity
    pub fn new(language: Language) -> Self {
        Self::with_capacity(language, DEFAULT_MAX_IDLE)
    }

    /// Create an empty pool keeping at most `max_idle` parsers around
    pub fn with_capacity(language: Language, max_idle: usize) -> Self {
        Self {
            language,
            max_idle,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Language of the parsers in this pool
    pub fn language(&self) -> Language {
        self.language
    }

    /// Number of parsers currently waiting in the pool
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Check out a parser for exclusive use
    pub fn checkout(&self) -> ParserResult<PooledParser<'_>> {
        let parser = match self.idle.lock().pop() {
            Some(parser) => parser,
            None => {
                debug!(language = %self.language, "creating parser");
                self.create_parser()?
            }
        };
        Ok(PooledParser {
            pool: self,
            parser: Some(parser),
        })
    }

    /// Parse `src` with a parser checked out for the duration of the call
    pub fn parse(&self, src: &str) -> ParserResult<Tree> {
        let mut parser = self.checkout()?;
        parser.parse(src, None).ok_or_else(|| ParserError::ParseError {
            message: format!("{} parser returned no tree", self.language),
        })
    }

    fn create_parser(&self) -> ParserResult<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language.grammar())
            .map_err(|e| ParserError::GrammarError {
                language: self.language.to_string(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }

    fn release(&self, mut parser: Parser) {
        parser.reset();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(parser);
        } else {
            trace!(language = %self.language, "pool full, dropping parser");
        }
    }
}

/// A parser checked out of a [`ParserPool`]
pub struct PooledParser<'p> {
    pool: &'p ParserPool,
    parser: Option<Parser>,
}

impl Deref for PooledParser<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        // Only taken in drop.
        self.parser.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledParser<'_> {
    fn deref_mut(&mut self) -> &mut Parser {
        self.parser.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledParser<'_> {
    fn drop(&mut self) {
        if let Some(parser) = self.parser.take() {
            self.pool.release(parser);
        }
    }
}

/// One lazily created pool per language, shareable across tasks
#[derive(Clone, Default)]
pub struct ParserRegistry {
    max_idle: Option<usize>,
    pools: Arc<Mutex<HashMap<Language, Arc<ParserPool>>>>,
}

impl ParserRegistry {
    /// Create a registry whose pools use the default idle capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose pools keep at most `max_idle` parsers each
    pub fn with_capacity(max_idle: usize) -> Self {
        Self {
            max_idle: Some(max_idle),
            pools: Arc::default(),
        }
    }

    /// Get (creating on first use) the pool for a language
    pub fn pool(&self, language: Language) -> Arc<ParserPool> {
        let max_idle = self.max_idle.unwrap_or(DEFAULT_MAX_IDLE);
        self.pools
            .lock()
            .entry(language)
            .or_insert_with(|| Arc::new(ParserPool::with_capacity(language, max_idle)))
            .clone()
    }

    /// Parse `src` as `language`
    pub fn parse(&self, language: Language, src: &str) -> ParserResult<Tree> {
        self.pool(language).parse(src)
    }
}
