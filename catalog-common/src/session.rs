//! Persistence of the currently logged-in user.
//!
//! Absence of a stored record means "not logged in". A record that no longer
//! deserializes is treated the same way.

use crate::db::Database;
use crate::models::SessionUser;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Key the session record is stored under.
pub const SESSION_KEY: &str = "auth:user";

#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn save(&self, user: &SessionUser) -> anyhow::Result<()>;

    async fn get(&self) -> anyhow::Result<Option<SessionUser>>;

    async fn clear(&self) -> anyhow::Result<()>;
}

fn decode(raw: &str) -> Option<SessionUser> {
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!("Ignoring unreadable session record: {}", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SessionStore for SqliteSessionStore {
    async fn save(&self, user: &SessionUser) -> anyhow::Result<()> {
        let raw = serde_json::to_string(user)?;
        self.db.set_item(SESSION_KEY, &raw).await
    }

    async fn get(&self) -> anyhow::Result<Option<SessionUser>> {
        let stored = self.db.get_item(SESSION_KEY).await?;

        Ok(stored.and_then(|stored| {
            debug!("Found session saved at {}", stored.saved_at.to_rfc3339());
            decode(&stored.value)
        }))
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.db.remove_item(SESSION_KEY).await
    }
}

/// Session store that only lives as long as the process.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    raw: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.raw
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    async fn save(&self, user: &SessionUser) -> anyhow::Result<()> {
        let raw = serde_json::to_string(user)?;
        *self.slot()? = Some(raw);
        Ok(())
    }

    async fn get(&self) -> anyhow::Result<Option<SessionUser>> {
        Ok(self.slot()?.as_deref().and_then(decode))
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
