use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::mapping::{Attributes, FieldSpec, MappingError, Value};

/// Current time at the precision the database keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fields shared by every persisted record, composed in front of each
/// entity's own fields.
pub fn base_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("id", "varchar").primary_key(),
        FieldSpec::new("created_at", "timestamp"),
        FieldSpec::new("modified_at", "timestamp"),
        FieldSpec::new("deleted", "boolean"),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseEntity {
    id: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    deleted: bool,
}

impl BaseEntity {
    /// Fresh identity for an insert.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_id(Uuid::new_v4().simple().to_string(), now)
    }

    pub fn with_id(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: now,
            modified_at: now,
            deleted: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Records a mutating write. The modified timestamp never moves backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.modified_at {
            self.modified_at = now;
        }
    }

    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted = true;
        self.touch(now);
    }

    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            "modified_at" => Some(self.modified_at.into()),
            "deleted" => Some(self.deleted.into()),
            _ => None,
        }
    }

    pub fn from_attributes(attributes: &Attributes) -> Result<Self, MappingError> {
        let base = Self {
            id: attributes.required("id")?,
            created_at: attributes.required("created_at")?,
            modified_at: attributes.required("modified_at")?,
            deleted: attributes.required("deleted")?,
        };
        if base.modified_at < base.created_at {
            return Err(MappingError::InvalidRecord {
                table: attributes.table().to_string(),
                reason: format!("`{}` modified before it was created", base.id),
            });
        }
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_assigns_id_and_equal_timestamps() {
        let at = now();
        let base = BaseEntity::new(at);

        assert_eq!(base.id().len(), 32);
        assert_eq!(base.created_at(), at);
        assert_eq!(base.modified_at(), at);
        assert!(!base.is_deleted());
    }

    #[test]
    fn touch_never_moves_modified_backwards() {
        let at = now();
        let mut base = BaseEntity::with_id("u1", at);

        base.touch(at - Duration::seconds(5));
        assert_eq!(base.modified_at(), at);

        base.touch(at + Duration::seconds(5));
        assert_eq!(base.modified_at(), at + Duration::seconds(5));
        assert_eq!(base.created_at(), at);
        assert_eq!(base.id(), "u1");
    }

    #[test]
    fn mark_deleted_sets_flag_and_touches() {
        let at = now();
        let mut base = BaseEntity::with_id("u1", at);
        base.mark_deleted(at + Duration::seconds(1));

        assert!(base.is_deleted());
        assert_eq!(base.modified_at(), at + Duration::seconds(1));
    }

    #[test]
    fn now_is_truncated_to_microseconds() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000, 0);
    }
}
