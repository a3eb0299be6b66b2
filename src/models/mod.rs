pub mod entry;
pub mod message;
pub mod records;
pub mod timestamp;

pub use entry::{EntryKind, LogEntry};
pub use message::{ContentItem, Message, MessageContent, Usage};
pub use records::{
    DailyAggregate, ProjectRecord, SessionRecord, TokenCounts, ToolOutcome, ToolUseStats,
};
pub use timestamp::{LocalCalendarFields, Timestamp};
