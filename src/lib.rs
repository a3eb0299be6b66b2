//! # Claude Costs
//!
//! Usage and cost analytics over the newline-delimited JSON session logs that
//! Claude Code writes under `~/.claude/projects`.
//!
//! ## Overview
//!
//! A scan walks every session log, decodes each line independently and folds
//! the entries into one [`aggregate::UsageReport`] containing:
//! - API-equivalent cost and cache savings per day, session and project
//! - Token totals and their cache / output shares
//! - Hour-of-day and weekday activity
//! - Response latency between a user turn and the assistant reply
//! - Tool-use acceptance versus interruption
//!
//! ## Features
//!
//! - `colors` (default): Enables terminal color output via owo-colors

/// Fold of decoded entries into the final report
pub mod aggregate;

/// Command-line argument parsing and configuration
pub mod cli;

/// Display formatting for text and JSON output
pub mod display;

/// Scan error kinds
pub mod error;

/// Response-latency linking and statistics
pub mod latency;

/// Data models for log lines and aggregate records
pub mod models;

/// Model-specific pricing calculations
pub mod pricing;

/// Project directory name decoding
pub mod project;

/// Session log decoding
pub mod reader;

/// Directory walk driving a full scan
pub mod scan;

/// Tool-use outcome classification
pub mod tools;

/// Utility functions for paths and formatting
pub mod utils;
