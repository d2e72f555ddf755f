use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata stored alongside a part spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Stable identity, kept across saves.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl DocumentMetadata {
    /// Fresh metadata with a new id and the current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created: now,
            modified: now,
        }
    }

    /// Mark the document as modified now.
    pub fn touch(&mut self) {
        self.modified = Utc::now().max(self.created);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metadata_timestamps_match() {
        let m = DocumentMetadata::new("drawer set");
        assert_eq!(m.created, m.modified);
        assert_eq!(m.name, "drawer set");
        assert_ne!(m.id, DocumentMetadata::new("drawer set").id);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut m = DocumentMetadata::new("a");
        let id = m.id;
        m.touch();
        assert!(m.modified >= m.created);
        assert_eq!(m.id, id);
    }
}
