use serde::{Deserialize, Serialize};

/// A single row as handed over by the relational store: a flat key/value map.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The table families mirrored into the context snapshot.
///
/// Declaration order is the order tables appear in the snapshot document
/// and in the budgeter's static schema description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedTable {
    Users,
    Profiles,
    Media,
    Topics,
    Contents,
    Tasks,
    Subscriptions,
    Submissions,
    Purchases,
}

impl TrackedTable {
    pub const ALL: [TrackedTable; 9] = [
        TrackedTable::Users,
        TrackedTable::Profiles,
        TrackedTable::Media,
        TrackedTable::Topics,
        TrackedTable::Contents,
        TrackedTable::Tasks,
        TrackedTable::Subscriptions,
        TrackedTable::Submissions,
        TrackedTable::Purchases,
    ];

    /// Key used in the snapshot document (and file name for file-backed stores).
    pub fn name(self) -> &'static str {
        match self {
            TrackedTable::Users => "users",
            TrackedTable::Profiles => "profiles",
            TrackedTable::Media => "media",
            TrackedTable::Topics => "topics",
            TrackedTable::Contents => "contents",
            TrackedTable::Tasks => "tasks",
            TrackedTable::Subscriptions => "subscriptions",
            TrackedTable::Submissions => "submissions",
            TrackedTable::Purchases => "purchases",
        }
    }

    /// Human-readable column list published under the snapshot's `schema` key.
    pub fn columns(self) -> &'static str {
        match self {
            TrackedTable::Users => "id, email, display_name, role, created_at",
            TrackedTable::Profiles => "id, user_id, bio, country, avatar_url",
            TrackedTable::Media => "id, topic_id, title, kind, url, duration_secs",
            TrackedTable::Topics => "id, title, description, owner_id, price",
            TrackedTable::Contents => "id, topic_id, title, body, position",
            TrackedTable::Tasks => "id, topic_id, title, instructions, due_at",
            TrackedTable::Subscriptions => "id, user_id, topic_id, status, started_at",
            TrackedTable::Submissions => "id, task_id, user_id, grade, submitted_at",
            TrackedTable::Purchases => "id, user_id, topic_id, amount, purchased_at",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for TrackedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for table in TrackedTable::ALL {
            assert_eq!(TrackedTable::from_name(table.name()), Some(table));
        }
        assert_eq!(TrackedTable::from_name("schema"), None);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = TrackedTable::ALL.iter().map(|t| t.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), TrackedTable::ALL.len());
    }
}
