//! Typed Jira REST client crate used by the changelog report binary.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{Changelog, ChangelogEntry, ChangelogItem, Issue, IssueFields, SearchPage};
