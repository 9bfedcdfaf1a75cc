use serde::ser::{Serialize, SerializeStruct, Serializer};
use sqlx::FromRow;

use crate::database::DatabaseError;
use crate::types::{ComplaintKind, ComplaintStatus};

/// Raw `complaints` row as stored
#[derive(Debug, Clone, FromRow)]
pub struct ComplaintRow {
    pub id: i32,
    pub enterprise_id: i32,
    pub complaint: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub status: String,
    pub timestamp: String,
    pub filepath: Option<String>,
    pub blob_ref: Option<String>,
}

/// Text and voice payloads are mutually exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintPayload {
    Text {
        complaint: String,
    },
    Voice {
        filepath: String,
        /// Reference the blob store deletes by. Older rows may lack it.
        blob_ref: Option<String>,
    },
}

impl ComplaintPayload {
    pub fn kind(&self) -> ComplaintKind {
        match self {
            ComplaintPayload::Text { .. } => ComplaintKind::Text,
            ComplaintPayload::Voice { .. } => ComplaintKind::Voice,
        }
    }

    /// Column values in (complaint, filepath, blob_ref) order
    pub fn columns(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self {
            ComplaintPayload::Text { complaint } => (Some(complaint.as_str()), None, None),
            ComplaintPayload::Voice { filepath, blob_ref } => {
                (None, Some(filepath.as_str()), blob_ref.as_deref())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
    pub id: i32,
    pub enterprise_id: i32,
    pub payload: ComplaintPayload,
    pub status: ComplaintStatus,
    pub timestamp: String,
}

impl Complaint {
    pub fn kind(&self) -> ComplaintKind {
        self.payload.kind()
    }

    pub fn blob_ref(&self) -> Option<&str> {
        match &self.payload {
            ComplaintPayload::Voice { blob_ref, .. } => blob_ref.as_deref(),
            ComplaintPayload::Text { .. } => None,
        }
    }
}

/// Everything needed for an insert; new complaints always start open
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub payload: ComplaintPayload,
    pub timestamp: String,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = DatabaseError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |what: String| DatabaseError::Corrupt(format!("complaint {}: {}", id, what));

        let kind = row.kind.parse::<ComplaintKind>().map_err(|e| corrupt(e.to_string()))?;
        let status = row.status.parse::<ComplaintStatus>().map_err(|e| corrupt(e.to_string()))?;

        let payload = match (kind, row.complaint, row.filepath) {
            (ComplaintKind::Text, Some(complaint), None) => ComplaintPayload::Text { complaint },
            (ComplaintKind::Voice, None, Some(filepath)) => ComplaintPayload::Voice {
                filepath,
                blob_ref: row.blob_ref,
            },
            (kind, _, _) => return Err(corrupt(format!("payload does not match type {}", kind.as_str()))),
        };

        Ok(Complaint {
            id,
            enterprise_id: row.enterprise_id,
            payload,
            status,
            timestamp: row.timestamp,
        })
    }
}

// Flattened wire shape: { id, enterprise_id, type, complaint | filepath, status, timestamp }
impl Serialize for Complaint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Complaint", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("enterprise_id", &self.enterprise_id)?;
        state.serialize_field("type", &self.kind())?;
        match &self.payload {
            ComplaintPayload::Text { complaint } => state.serialize_field("complaint", complaint)?,
            ComplaintPayload::Voice { filepath, .. } => state.serialize_field("filepath", filepath)?,
        }
        state.serialize_field("status", &self.status)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, complaint: Option<&str>, filepath: Option<&str>) -> ComplaintRow {
        ComplaintRow {
            id: 9,
            enterprise_id: 1,
            complaint: complaint.map(str::to_string),
            kind: kind.to_string(),
            status: "open".to_string(),
            timestamp: "1/5/2024, 1:04:05 PM".to_string(),
            filepath: filepath.map(str::to_string),
            blob_ref: filepath.map(|_| "complaints/abc".to_string()),
        }
    }

    #[test]
    fn text_row_becomes_text_payload() {
        let complaint = Complaint::try_from(row("text", Some("broken elevator"), None)).unwrap();
        assert_eq!(complaint.kind(), ComplaintKind::Text);
        assert_eq!(complaint.blob_ref(), None);

        let json = serde_json::to_value(&complaint).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["complaint"], "broken elevator");
        assert!(json.get("filepath").is_none());
    }

    #[test]
    fn voice_row_keeps_blob_ref() {
        let complaint =
            Complaint::try_from(row("voice", None, Some("https://cdn.example/a.webm"))).unwrap();
        assert_eq!(complaint.blob_ref(), Some("complaints/abc"));

        let json = serde_json::to_value(&complaint).unwrap();
        assert_eq!(json["filepath"], "https://cdn.example/a.webm");
        assert!(json.get("complaint").is_none());
    }

    #[test]
    fn mixed_payload_is_corrupt() {
        let err = Complaint::try_from(row("text", Some("x"), Some("https://cdn.example/a"))).unwrap_err();
        assert!(matches!(err, DatabaseError::Corrupt(_)));

        let mut bad_status = row("text", Some("x"), None);
        bad_status.status = "archived".to_string();
        assert!(Complaint::try_from(bad_status).is_err());
    }
}
