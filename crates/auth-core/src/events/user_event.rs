//! User events - published by the user service whenever an account changes
//!
//! Every message on the bus is an [`EventEnvelope`] whose `data` field holds one of the
//! typed payloads below. [`EventEnvelope::decode`] turns the envelope into the closed
//! [`UserEvent`] enum so handlers can dispatch with a single `match`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::serde_util::{empty_as_none, empty_string_as_none};
use crate::value_objects::TenantContext;

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";

/// Wire envelope shared by all services on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EventEnvelope {
    pub fn new<T: Serialize>(
        event_type: &str,
        source: &str,
        data: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.to_string(),
            source: source.to_string(),
            timestamp: Utc::now(),
            correlation_id: None,
            data: serde_json::to_value(data)?,
        })
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Parse an envelope from raw message bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DomainError> {
        serde_json::from_slice(bytes).map_err(|e| DomainError::MalformedEvent(e.to_string()))
    }

    /// Decode the payload according to the envelope type
    pub fn decode(&self) -> Result<UserEvent, DomainError> {
        let data = self.data.clone();
        let malformed = |e: serde_json::Error| {
            DomainError::MalformedEvent(format!("{}: {e}", self.event_type))
        };

        match self.event_type.as_str() {
            USER_CREATED => serde_json::from_value(data)
                .map(UserEvent::Created)
                .map_err(malformed),
            USER_UPDATED => serde_json::from_value(data)
                .map(UserEvent::Updated)
                .map_err(malformed),
            USER_DELETED => serde_json::from_value(data)
                .map(UserEvent::Deleted)
                .map_err(malformed),
            other => Ok(UserEvent::Unknown(other.to_string())),
        }
    }
}

/// Closed set of events the lookup projection reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    Created(UserCreatedEvent),
    Updated(UserUpdatedEvent),
    Deleted(UserDeletedEvent),
    /// Any other type on the stream; acknowledged and ignored
    Unknown(String),
}

impl UserEvent {
    pub fn event_type(&self) -> &str {
        match self {
            Self::Created(_) => USER_CREATED,
            Self::Updated(_) => USER_UPDATED,
            Self::Deleted(_) => USER_DELETED,
            Self::Unknown(event_type) => event_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedEvent {
    pub user_id: Uuid,
    pub email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role_name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub tenant_slug: String,
    #[serde(default)]
    pub tenant_schema: String,
}

impl UserCreatedEvent {
    pub fn tenant(&self) -> Option<TenantContext> {
        TenantContext::from_parts(self.tenant_id, &self.tenant_slug, &self.tenant_schema)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdatedEvent {
    pub user_id: Uuid,
    /// Changed profile fields; informational only for the lookup projection
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub old_email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub new_email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub tenant_slug: String,
    #[serde(default)]
    pub tenant_schema: String,
}

impl UserUpdatedEvent {
    pub fn tenant(&self) -> Option<TenantContext> {
        TenantContext::from_parts(self.tenant_id, &self.tenant_slug, &self.tenant_schema)
    }

    /// `(old, new)` when the update moved the user to a different email
    pub fn email_change(&self) -> Option<(&str, &str)> {
        match (self.old_email.as_deref(), self.new_email.as_deref()) {
            (Some(old), Some(new)) if !old.trim().eq_ignore_ascii_case(new.trim()) => {
                Some((old, new))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeletedEvent {
    pub user_id: Uuid,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub tenant_slug: String,
    #[serde(default)]
    pub tenant_schema: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(event_type: &str, data: serde_json::Value) -> EventEnvelope {
        EventEnvelope {
            id: "evt-1".to_string(),
            event_type: event_type.to_string(),
            source: "user-service".to_string(),
            timestamp: Utc::now(),
            correlation_id: None,
            data,
        }
    }

    #[test]
    fn test_decode_created() {
        let tenant_id = Uuid::new_v4();
        let env = envelope(
            USER_CREATED,
            json!({
                "user_id": Uuid::new_v4(),
                "email": "admin@clinic-a.de",
                "username": "admin",
                "tenant_id": tenant_id,
                "tenant_slug": "clinic-a",
                "tenant_schema": "tenant_clinic_a"
            }),
        );
        let UserEvent::Created(created) = env.decode().unwrap() else {
            panic!("expected created event");
        };
        assert_eq!(created.username.as_deref(), Some("admin"));
        assert_eq!(created.tenant().unwrap().tenant_id(), tenant_id);
    }

    #[test]
    fn test_created_without_tenant_has_no_context() {
        let env = envelope(
            USER_CREATED,
            json!({ "user_id": Uuid::new_v4(), "email": "a@b.de", "tenant_id": "" }),
        );
        let UserEvent::Created(created) = env.decode().unwrap() else {
            panic!("expected created event");
        };
        assert!(created.tenant().is_none());
    }

    #[test]
    fn test_email_change_requires_both_and_distinct() {
        let mut updated: UserUpdatedEvent = serde_json::from_value(json!({
            "user_id": Uuid::new_v4(),
            "fields": { "first_name": "Anna" },
            "old_email": "old@x.de",
            "new_email": "new@x.de"
        }))
        .unwrap();
        assert_eq!(updated.email_change(), Some(("old@x.de", "new@x.de")));

        updated.new_email = Some("OLD@x.de".to_string());
        assert_eq!(updated.email_change(), None);

        updated.new_email = None;
        assert_eq!(updated.email_change(), None);
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let env = envelope("user.role_changed", json!({}));
        assert_eq!(
            env.decode().unwrap(),
            UserEvent::Unknown("user.role_changed".to_string())
        );
    }

    #[test]
    fn test_malformed_payload() {
        let env = envelope(USER_DELETED, json!({ "email": "a@b.de" }));
        assert!(matches!(env.decode(), Err(DomainError::MalformedEvent(_))));
        assert!(EventEnvelope::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_envelope_wire_format() {
        let env = EventEnvelope::new(USER_DELETED, "user-service", &json!({"user_id": "x"}))
            .unwrap()
            .with_correlation_id("req-9");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["type"], USER_DELETED);
        assert_eq!(value["correlation_id"], "req-9");
    }
}
