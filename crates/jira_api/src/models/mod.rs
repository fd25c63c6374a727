mod issue;

pub use issue::{Changelog, ChangelogEntry, ChangelogItem, Issue, IssueFields, SearchPage};
