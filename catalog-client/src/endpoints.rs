use crate::error::Result;
use crate::gateway::Gateway;
use catalog_common::{Action, Author, Credentials, Publisher, QueueRequest, SessionUser};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use tracing::{info, warn};

/// The serverless functions this client knows about.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Function {
    AuthorsGet,
    PublishersGet,
    QueueAuthors,
    QueuePublishers,
    RunQueue,
    Login,
}

impl Function {
    pub fn path(self) -> &'static str {
        match self {
            Function::AuthorsGet => "/authors-get",
            Function::PublishersGet => "/publishers-get",
            Function::QueueAuthors => "/queue-authors",
            Function::QueuePublishers => "/queue-publishers",
            Function::RunQueue => "/run-queue",
            Function::Login => "/login",
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path().trim_start_matches('/'))
    }
}

/// Typed view of a successful reply. Reply shapes are advisory: anything
/// that does not fit reads as the type's default instead of failing the call.
fn lenient<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Reply does not match the expected shape ({}), using defaults", e);
        T::default()
    })
}

fn lenient_list<T: DeserializeOwned + Default>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items.into_iter().map(lenient).collect(),
        other => {
            warn!("Expected a list reply, got {}", other);
            vec![]
        }
    }
}

impl Gateway {
    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        info!("Fetching authors");
        let authors: Vec<Author> = lenient_list(self.get(Function::AuthorsGet.path()).await?);
        info!("Fetched {} authors", authors.len());
        Ok(authors)
    }

    pub async fn list_publishers(&self) -> Result<Vec<Publisher>> {
        info!("Fetching publishers");
        let publishers: Vec<Publisher> =
            lenient_list(self.get(Function::PublishersGet.path()).await?);
        info!("Fetched {} publishers", publishers.len());
        Ok(publishers)
    }

    pub async fn enqueue_author(&self, action: Action, payload: Value) -> Result<Value> {
        self.enqueue(Function::QueueAuthors, action, payload).await
    }

    pub async fn enqueue_publisher(&self, action: Action, payload: Value) -> Result<Value> {
        self.enqueue(Function::QueuePublishers, action, payload).await
    }

    async fn enqueue(&self, function: Function, action: Action, payload: Value) -> Result<Value> {
        info!("Queueing {} via {}", action, function);
        self.post_json(function.path(), &QueueRequest { action, payload }).await
    }

    pub async fn run_queue(&self) -> Result<Value> {
        info!("Triggering queue run");
        self.post(Function::RunQueue.path()).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<SessionUser> {
        info!("Logging in as {}", credentials.gmail);
        let reply = self.post_json(Function::Login.path(), credentials).await?;
        Ok(lenient(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn function_paths() {
        assert_eq!(Function::AuthorsGet.path(), "/authors-get");
        assert_eq!(Function::QueuePublishers.to_string(), "queue-publishers");
    }

    #[test]
    fn lenient_list_keeps_partial_records() {
        let authors: Vec<Author> = lenient_list(json!([{"_id": "1"}, {"name": "Ada"}]));

        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].id.as_deref(), Some("1"));
        assert_eq!(authors[0].name, "");
        assert_eq!(authors[1].name, "Ada");
    }

    #[test]
    fn non_list_reply_reads_as_empty_list() {
        let authors: Vec<Author> = lenient_list(json!({}));
        assert!(authors.is_empty());
    }

    #[test]
    fn mistyped_record_reads_as_default() {
        let user: SessionUser = lenient(json!({"_id": 42, "gmail": "a@b.com"}));
        assert_eq!(user, SessionUser::default());
    }
}
