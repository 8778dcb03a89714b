use serde::{Deserialize, Serialize};

pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub quota: Option<usize>,
}

impl SplitSpec {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            quota: None,
        }
    }

    pub fn with_quota(name: &str, label: &str, quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new(name, label)
        }
    }

    /// Quota treated as binding; absent or zero means "share the leftovers".
    pub fn explicit_quota(&self) -> Option<usize> {
        match self.quota {
            Some(q) if q > 0 => Some(q),
            _ => None,
        }
    }

    pub fn group_key(&self) -> String {
        format!("{}_{}", self.name, self.label)
    }
}

#[derive(Debug, Clone)]
pub struct SplitGroup {
    pub key: String,
    pub account: String,
    pub sent: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default)]
pub struct Allocation {
    pub headers: Vec<String>,
    pub groups: Vec<SplitGroup>,
}

impl Allocation {
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn group(&self, key: &str) -> Option<&SplitGroup> {
        self.groups.iter().find(|g| g.key == key)
    }
}
