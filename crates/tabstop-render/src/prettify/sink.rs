//! Output sink with deferred whitespace and deferred indentation
//!
//! Whitespace is never written immediately. The most recent whitespace
//! request waits in a pending slot so duplicates collapse and a newline wins
//! over a space. Indentation changes accumulate in a pending delta that is
//! applied only when a newline is actually written, so an opener and its
//! closer on the same line leave the depth untouched.

use std::fmt;

use crate::error::RenderError;

/// Whitespace waiting to be written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pending {
    #[default]
    Nothing,
    Space,
    Newline,
    /// Any other whitespace run, e.g. a gap copied from source
    Raw(String),
}

impl Pending {
    fn classify(s: &str) -> Self {
        match s {
            " " => Pending::Space,
            "\n" => Pending::Newline,
            _ => Pending::Raw(s.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Pending::Nothing => "",
            Pending::Space => " ",
            Pending::Newline => "\n",
            Pending::Raw(s) => s,
        }
    }

    fn contains_newline(&self) -> bool {
        self.as_str().contains('\n')
    }
}

/// Per-dialect variations of the sink's state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkPolicy {
    /// Consecutive line breaks produce blank lines instead of collapsing,
    /// and any whitespace run containing a newline counts as a line break
    pub keep_blank_lines: bool,
    /// After a dedenting newline, further decreases are ignored until the
    /// next increase or newline
    pub lock_after_dedent: bool,
    /// A newline increases depth by at most one level
    pub single_step_indent: bool,
    /// Writing without a line break discards the pending delta
    pub reset_delta_inline: bool,
}

/// Writes formatted output and tracks the byte position reached
pub struct OutputSink<'w> {
    out: &'w mut dyn fmt::Write,
    indent: String,
    policy: SinkPolicy,
    pos: usize,
    pending: Pending,
    depth: usize,
    delta: i32,
    locked: bool,
    pending_semi: bool,
    error: Option<RenderError>,
}

impl<'w> OutputSink<'w> {
    pub fn new(out: &'w mut dyn fmt::Write, indent: impl Into<String>, policy: SinkPolicy) -> Self {
        Self {
            out,
            indent: indent.into(),
            policy,
            pos: 0,
            pending: Pending::Nothing,
            depth: 0,
            delta: 0,
            locked: false,
            pending_semi: false,
            error: None,
        }
    }

    /// Bytes written so far
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// The first error hit, if any; the sink ignores writes after it
    pub fn take_error(&mut self) -> Option<RenderError> {
        self.error.take()
    }

    /// Print `s`, routing whitespace-only strings through the pending slot
    pub fn print(&mut self, s: &str) {
        if self.error.is_some() || s.is_empty() {
            return;
        }
        if s.trim().is_empty() {
            self.whitespace(s);
        } else {
            self.text(s);
        }
    }

    /// Print `s` as content even if it is whitespace
    pub fn verbatim(&mut self, s: &str) {
        if self.error.is_some() || s.is_empty() {
            return;
        }
        self.text(s);
    }

    /// Record an intended indentation increase
    pub fn increase(&mut self, n: i32) {
        if self.locked {
            self.locked = false;
            self.delta = 1;
            return;
        }
        self.delta += n;
    }

    /// Record an intended indentation decrease
    pub fn decrease(&mut self, n: i32) {
        if self.locked {
            return;
        }
        self.delta -= n;
    }

    /// Queue a newline standing in for a semicolon. It is dropped if a line
    /// break is already pending or the next write is `;` or `}`.
    pub fn semicolon_newline(&mut self) {
        self.pending_semi = true;
        self.locked = false;
    }

    fn breaks_line(&self, p: &Pending) -> bool {
        match p {
            Pending::Newline => true,
            Pending::Raw(s) => self.policy.keep_blank_lines && s.contains('\n'),
            _ => false,
        }
    }

    fn whitespace(&mut self, s: &str) {
        if self.locked && s.contains('\n') {
            self.locked = false;
        }

        let incoming = Pending::classify(s);
        let pending_breaks = self.breaks_line(&self.pending);
        let incoming_breaks = self.breaks_line(&incoming);
        let keep = self.policy.keep_blank_lines;

        if incoming == Pending::Space && (self.pending == Pending::Space || pending_breaks) {
            return;
        }
        if !keep && incoming == Pending::Newline && self.pending == Pending::Newline {
            return;
        }
        if keep && pending_breaks && incoming_breaks {
            // The earlier break becomes a blank line without indentation.
            let blank = std::mem::replace(&mut self.pending, incoming);
            self.apply_delta();
            self.write(blank.as_str());
            return;
        }
        if self.pending == Pending::Nothing || (self.pending == Pending::Space && incoming_breaks) {
            self.pending = incoming;
            return;
        }
        self.error = Some(RenderError::UnexpectedPending {
            pending: self.pending.as_str().to_string(),
            incoming: s.to_string(),
        });
    }

    fn text(&mut self, s: &str) {
        if self.pending_semi {
            self.pending_semi = false;
            if !self.pending.contains_newline() && s != ";" && s != "}" {
                self.pending = Pending::Newline;
            }
        }
        self.flush();
        self.write(s);
    }

    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if self.breaks_line(&pending) {
            self.apply_delta();
            let indent = self.indent.repeat(self.depth);
            self.write(pending.as_str());
            self.write(&indent);
        } else {
            if self.policy.reset_delta_inline {
                self.delta = 0;
            }
            self.write(pending.as_str());
        }
    }

    fn apply_delta(&mut self) {
        let delta = std::mem::take(&mut self.delta);
        if delta > 0 {
            let step = if self.policy.single_step_indent { 1 } else { delta };
            self.depth += step as usize;
        } else if delta < 0 {
            self.depth = self.depth.saturating_sub(delta.unsigned_abs() as usize);
            if self.policy.lock_after_dedent {
                self.locked = true;
            }
        }
    }

    fn write(&mut self, s: &str) {
        if s.is_empty() || self.error.is_some() {
            return;
        }
        match self.out.write_str(s) {
            Ok(()) => self.pos += s.len(),
            Err(e) => self.error = Some(e.into()),
        }
    }
}
