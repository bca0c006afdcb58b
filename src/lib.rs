//! locanote - relevance-ranked search over a directory of notes.
//!
//! This library scans a directory of markdown and text notes, parses each
//! file into a [`notes::Note`] (front matter, title, body, timestamps) and
//! answers free-text queries with an additive keyword/substring score. It
//! also derives collection statistics, tag lookups and note summaries.
//!
//! # Modules
//!
//! - [`notes`] - Note type, front-matter parsing and the loader
//! - [`search`] - Relevance scoring, summaries and the search engine
//! - [`storage`] - Storage backend trait and the local filesystem backend
//! - [`commands`] - Operations and text rendering shared by CLI and MCP server
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions

pub mod cli;
pub mod commands;
pub mod config;
pub mod notes;
pub mod search;
pub mod storage;

#[cfg(feature = "mcp")]
pub mod mcp;
