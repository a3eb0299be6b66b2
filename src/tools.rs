//! Tool-use outcome classification.
//!
//! Structured outcome flags dominate text heuristics: an explicit
//! `interrupted: true` decides immediately; otherwise rejection phrasing in the
//! result text, then the block's `is_error` flag, mark the call as interrupted.

use crate::models::{ContentItem, LogEntry, ToolOutcome};

/// Substrings written into a tool result when the user declined the call.
pub const REJECTION_PHRASES: [&str; 2] = ["user doesn't want to proceed", "tool use was rejected"];

/// Structured outcome attached to the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredOutcome {
    Absent,
    Present { interrupted: bool },
}

/// Every input the classifier looks at, already extracted from the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSignals {
    pub structured: StructuredOutcome,
    pub rejection_text: bool,
    pub is_error: bool,
}

impl ToolSignals {
    pub fn from_item(entry: &LogEntry, item: &ContentItem) -> Self {
        let structured = match entry.structured_interrupted() {
            Some(interrupted) => StructuredOutcome::Present { interrupted },
            None => StructuredOutcome::Absent,
        };
        Self {
            structured,
            rejection_text: item
                .result_text()
                .is_some_and(|text| contains_rejection(&text)),
            is_error: item.is_error.unwrap_or(false),
        }
    }
}

pub fn contains_rejection(text: &str) -> bool {
    REJECTION_PHRASES.iter().any(|p| text.contains(p))
}

pub fn classify(signals: ToolSignals) -> ToolOutcome {
    if let StructuredOutcome::Present { interrupted: true } = signals.structured {
        return ToolOutcome::Interrupted;
    }
    // Present-but-not-interrupted and Absent fall through to the same checks.
    if signals.rejection_text || signals.is_error {
        ToolOutcome::Interrupted
    } else {
        ToolOutcome::Accepted
    }
}

/// Outcomes for every `tool_result` block carried by a user entry.
pub fn classify_entry(entry: &LogEntry) -> Vec<ToolOutcome> {
    if !entry.is_user() {
        return Vec::new();
    }
    entry
        .tool_results()
        .map(|item| classify(ToolSignals::from_item(entry, item)))
        .collect()
}
