pub mod db;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use db::Database;
pub use models::{
    Action, ApiResponse, Author, Credentials, Publisher, QueueRequest, SessionUser, User,
};
pub use session::{MemorySessionStore, SessionStore, SqliteSessionStore};
