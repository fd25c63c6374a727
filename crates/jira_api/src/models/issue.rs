use serde::Deserialize;

/// One page of the search response when `expand=changelog` is requested.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchPage {
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Issue {
    pub key: String,
    pub fields: IssueFields,
    #[serde(default)]
    pub changelog: Changelog,
}

/// Current-state snapshot of an issue. Timestamps stay as source strings;
/// parsing happens at the reporting boundary.
#[derive(Debug, Deserialize, Clone)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
    pub created: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Changelog {
    #[serde(default)]
    pub histories: Vec<ChangelogEntry>,
}

/// One timestamped batch of field edits. The source does not guarantee any
/// ordering across entries.
#[derive(Debug, Deserialize, Clone)]
pub struct ChangelogEntry {
    pub created: String,
    #[serde(default)]
    pub items: Vec<ChangelogItem>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChangelogItem {
    pub field: String,
    #[serde(rename = "fromString")]
    pub from: Option<String>,
    #[serde(rename = "toString")]
    pub to: Option<String>,
}
