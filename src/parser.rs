//! Context-tracking parser for configuration dumps
//!
//! Consumes reassembled text line by line and tags every command with the
//! scope it belongs to. Scope state lives in a [`ContextTracker`] owned by a
//! single parse call, so parsers can run concurrently without coordination.

use crate::context::{
    Context, ContextKind, belongs_to_parent_tunnel, detect_context_open, is_context_exit,
    is_contextual,
};
use crate::error::ConfigError;
use crate::model::{Command, ParsedConfig};
use crate::reassembler::{normalize_line_endings, reassemble};
use indexmap::IndexSet;
use smallvec::SmallVec;

/// Configuration options for the parser
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Repair terminal line wraps before classification
    pub reassemble_wrapped_lines: bool,
    /// Keep a copy of the input in `ParsedConfig::raw_text`
    pub keep_raw_text: bool,
    /// Upper bound on input size for the checked entry points
    pub max_input_bytes: Option<usize>,
}

impl ParserConfig {
    /// Creates a new parser configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether wrapped lines are reassembled
    pub fn with_reassemble_wrapped_lines(mut self, enabled: bool) -> Self {
        self.reassemble_wrapped_lines = enabled;
        self
    }

    /// Sets whether the raw input is retained
    pub fn with_keep_raw_text(mut self, keep: bool) -> Self {
        self.keep_raw_text = keep;
        self
    }

    /// Sets the maximum accepted input size in bytes
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }

    /// Checks `size` against the configured limit
    pub fn check_input_size(&self, size: usize) -> Result<(), ConfigError> {
        match self.max_input_bytes {
            Some(limit) if size > limit => Err(ConfigError::InputTooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reassemble_wrapped_lines: true,
            keep_raw_text: true,
            max_input_bytes: None,
        }
    }
}

/// Active scope plus suspended outer scopes.
///
/// At most one scope is ever suspended: a `tunnel select` waiting for its
/// nested `ipsec tunnel` to finish.
#[derive(Debug, Default)]
pub struct ContextTracker {
    current: Option<Context>,
    stack: SmallVec<[Context; 2]>,
    seen: IndexSet<Context>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active scope
    pub fn current(&self) -> Option<&Context> {
        self.current.as_ref()
    }

    /// Number of suspended outer scopes
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Feeds one trimmed, non-comment line and returns the context the line
    /// is tagged with
    pub fn observe(&mut self, trimmed_line: &str, indent_level: usize) -> Option<Context> {
        if let Some(opened) = detect_context_open(trimmed_line) {
            self.open(opened.clone());
            return Some(opened);
        }

        if self.current.is_some() && is_context_exit(trimmed_line) {
            self.reclaim_parent(trimmed_line);
            let tag = self.current.take();
            self.stack.clear();
            if let Some(closed) = &tag {
                tracing::trace!("'{}' closed context {}", trimmed_line, closed);
            }
            return tag;
        }

        if indent_level == 0 {
            if let Some(current) = &self.current {
                if !is_contextual(trimmed_line, current) {
                    tracing::trace!(
                        "'{}' left context {} at column 0, {} suspended",
                        trimmed_line,
                        current,
                        self.stack.len()
                    );
                    self.current = self.stack.pop();
                }
            }
        }

        self.reclaim_parent(trimmed_line);
        self.current.clone()
    }

    /// Consumes the tracker and returns the distinct contexts seen
    pub fn into_contexts(self) -> Vec<Context> {
        self.seen.into_iter().collect()
    }

    fn open(&mut self, opened: Context) {
        match opened.kind {
            ContextKind::NestedIPsecTunnel => {
                if let Some(outer) = self
                    .current
                    .take_if(|c| c.kind == ContextKind::Tunnel)
                {
                    self.stack.push(outer);
                }
            }
            kind if kind.is_top_level() => self.stack.clear(),
            _ => {}
        }
        debug_assert!(self.stack.len() <= 1);

        tracing::trace!("entered context {}", opened);
        self.seen.insert(opened.clone());
        self.current = Some(opened);
    }

    /// Returns to the enclosing tunnel when a nested IPsec scope sees a
    /// line that belongs to the tunnel itself
    fn reclaim_parent(&mut self, trimmed_line: &str) {
        let nested = self
            .current
            .as_ref()
            .is_some_and(|c| c.kind == ContextKind::NestedIPsecTunnel);
        if nested && !self.stack.is_empty() && belongs_to_parent_tunnel(trimmed_line) {
            self.current = self.stack.pop();
            tracing::trace!("'{}' returned to enclosing tunnel", trimmed_line);
        }
    }
}

/// Parser for RTX "show config" dumps
#[derive(Debug, Clone, Default)]
pub struct ConfigParser {
    config: ParserConfig,
}

impl ConfigParser {
    /// Creates a parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the parser configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a dump. Never fails: unknown lines are kept and tagged with
    /// the active context. The size limit is not checked here.
    pub fn parse(&self, raw: &str) -> ParsedConfig {
        let text = if self.config.reassemble_wrapped_lines {
            reassemble(raw)
        } else {
            normalize_line_endings(raw)
        };

        let mut result = ParsedConfig {
            raw_text: if self.config.keep_raw_text {
                raw.to_string()
            } else {
                String::new()
            },
            ..ParsedConfig::default()
        };
        let mut tracker = ContextTracker::new();

        for (index, line) in text.split('\n').enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            result.non_empty_line_count += 1;

            if trimmed.starts_with('#') {
                continue;
            }

            let indent_level = indent_level(line);
            let context = tracker.observe(trimmed, indent_level);
            result.commands.push(Command {
                text: trimmed.to_string(),
                context,
                line_number: index + 1,
                indent_level,
            });
        }

        result.command_count = result.commands.len();
        result.contexts = tracker.into_contexts();

        tracing::debug!(
            "parsed {} line(s) into {} command(s) across {} context(s)",
            result.non_empty_line_count,
            result.command_count,
            result.contexts.len()
        );
        result
    }

    /// Parses a dump after enforcing `max_input_bytes`
    pub fn try_parse(&self, raw: &str) -> Result<ParsedConfig, ConfigError> {
        self.config.check_input_size(raw.len())?;
        Ok(self.parse(raw))
    }
}

/// Number of leading spaces and tabs
fn indent_level(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}
