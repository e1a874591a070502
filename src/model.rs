//! Parsed configuration model
//!
//! The output of a parse: every logical command line tagged with the scope
//! it belongs to, plus the distinct scopes in first-seen order. Downstream
//! extractors filter this model by scope and by keyword prefix and run their
//! own pattern matching on the narrowed text.

use crate::context::{Context, ContextKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One logical configuration line after wrap repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Trimmed command text
    pub text: String,
    /// Scope of the command; `None` means global
    pub context: Option<Context>,
    /// Line number (1-based) in the reassembled text
    pub line_number: usize,
    /// Count of leading spaces and tabs
    pub indent_level: usize,
}

impl Command {
    /// Returns true if the command is outside every scope
    pub fn is_global(&self) -> bool {
        self.context.is_none()
    }

    /// Returns true if the command is tagged with `context`
    pub fn in_context(&self, context: &Context) -> bool {
        self.context.as_ref() == Some(context)
    }

    /// Returns true if the text starts with any of `prefixes`
    pub fn starts_with_any(&self, prefixes: &[&str]) -> bool {
        prefixes.iter().any(|p| self.text.starts_with(p))
    }
}

/// Result of parsing a complete configuration dump
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedConfig {
    /// Input as given, before any normalization
    pub raw_text: String,
    /// Non-blank lines after reassembly, comments included
    pub non_empty_line_count: usize,
    /// Number of commands; comments excluded
    pub command_count: usize,
    /// Distinct contexts in order of first appearance
    pub contexts: Vec<Context>,
    /// Commands in input order
    pub commands: Vec<Command>,
}

impl ParsedConfig {
    /// Returns all commands tagged with `context`, in input order
    pub fn commands_in_context(&self, context: &Context) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|cmd| cmd.in_context(context))
            .collect()
    }

    /// Returns all commands outside every scope, in input order
    pub fn global_commands(&self) -> Vec<&Command> {
        self.commands.iter().filter(|cmd| cmd.is_global()).collect()
    }

    /// Returns global commands whose text starts with any of `prefixes`
    pub fn global_commands_with_prefix(&self, prefixes: &[&str]) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|cmd| cmd.is_global() && cmd.starts_with_any(prefixes))
            .collect()
    }

    /// Joins matching global command lines with `\n`.
    ///
    /// This is the narrowed sub-document an extractor feeds to its own
    /// matcher, e.g. `global_section(&["ip route "])`. Returns `None` when
    /// no line matches.
    pub fn global_section(&self, prefixes: &[&str]) -> Option<String> {
        join_lines(self.global_commands_with_prefix(prefixes))
    }

    /// Joins every command line of `context` with `\n`, opening line
    /// included. Returns `None` for a context with no commands.
    pub fn context_section(&self, context: &Context) -> Option<String> {
        join_lines(self.commands_in_context(context))
    }

    /// Returns the distinct contexts of one kind, in first-seen order
    pub fn contexts_of_kind(&self, kind: ContextKind) -> impl Iterator<Item = &Context> + '_ {
        self.contexts.iter().filter(move |ctx| ctx.kind == kind)
    }

    /// Finds a numbered context
    pub fn find_context(&self, kind: ContextKind, id: u32) -> Option<&Context> {
        let wanted = Context::numbered(kind, id);
        self.contexts.iter().find(|ctx| **ctx == wanted)
    }

    /// Finds the `pp select anonymous` context
    pub fn anonymous_pp(&self) -> Option<&Context> {
        let wanted = Context::pp_anonymous();
        self.contexts.iter().find(|ctx| **ctx == wanted)
    }

    /// Groups the tagged commands by context.
    ///
    /// Keys follow the order of `contexts`; global commands are omitted.
    pub fn commands_by_context(&self) -> IndexMap<Context, Vec<&Command>> {
        let mut groups: IndexMap<Context, Vec<&Command>> = self
            .contexts
            .iter()
            .map(|ctx| (ctx.clone(), Vec::new()))
            .collect();
        for cmd in &self.commands {
            if let Some(ctx) = &cmd.context {
                groups.entry(ctx.clone()).or_default().push(cmd);
            }
        }
        groups
    }

    /// Returns true if no command was found
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn join_lines(commands: Vec<&Command>) -> Option<String> {
    if commands.is_empty() {
        return None;
    }
    let lines: Vec<&str> = commands.iter().map(|cmd| cmd.text.as_str()).collect();
    Some(lines.join("\n"))
}
