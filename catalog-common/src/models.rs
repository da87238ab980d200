use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Anything else the server attached to the record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            bio: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Publisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            country: None,
            extra: Map::new(),
        }
    }
}

/// The logged-in user, as returned by the login function and kept in the
/// session store. Missing fields in a reply are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub gmail: String,
    pub name: Option<String>,
}

/// Login payload. Only ever sent, never persisted.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub gmail: String,
    pub password: String,
}

impl Credentials {
    pub fn new(gmail: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            gmail: gmail.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gmail", &self.gmail)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server-side account record. Callers may build one as a payload for the
/// queue functions; the client never stores or returns it.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub gmail: String,
    pub password: String,
    pub name: String,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("gmail", &self.gmail)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };

        write!(f, "{}", str)
    }
}

/// Body posted to the queue functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueRequest {
    pub action: Action,
    pub payload: Value,
}

/// Envelope the serverless functions document for their replies. Nothing
/// checks that a reply actually has this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn author_keeps_unknown_fields() {
        let body = json!({"_id": "1", "name": "Ada", "born": 1815});
        let author: Author = serde_json::from_value(body.clone()).unwrap();

        assert_eq!(author.id.as_deref(), Some("1"));
        assert_eq!(author.bio, None);
        assert_eq!(serde_json::to_value(&author).unwrap(), body);
    }

    #[test]
    fn new_publisher_serializes_without_id() {
        let publisher = Publisher {
            country: Some("UK".to_string()),
            ..Publisher::new("Penguin")
        };

        assert_eq!(
            serde_json::to_value(&publisher).unwrap(),
            json!({"name": "Penguin", "country": "UK"})
        );
    }

    #[test]
    fn session_user_accepts_null_name() {
        let user: SessionUser =
            serde_json::from_value(json!({"_id": "u1", "gmail": "a@b.com", "name": null}))
                .unwrap();

        assert_eq!(user.name, None);
    }

    #[test]
    fn missing_required_fields_default_to_empty() {
        let author: Author = serde_json::from_value(json!({"_id": "1"})).unwrap();
        assert_eq!(author.name, "");

        let user: SessionUser = serde_json::from_value(json!({})).unwrap();
        assert_eq!(user, SessionUser::default());
    }

    #[test]
    fn queue_request_uses_lowercase_action() {
        let request = QueueRequest {
            action: Action::Delete,
            payload: json!({"_id": "7"}),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "delete", "payload": {"_id": "7"}})
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials::new("a@b.com", "hunter2");
        let printed = format!("{:?}", credentials);

        assert!(printed.contains("a@b.com"));
        assert!(!printed.contains("hunter2"));
    }
}
