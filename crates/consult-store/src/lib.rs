//! Consult Store - Document persistence
//!
//! Provides the persistence service behind the back office: four record
//! types (users, clients, messages, prompts) with CRUD operations, backed by
//! SurrealDB in production and an in-process store for development and tests.
//!
//! Every write touches a single record. Unique fields (user email, client
//! email, prompt title) are enforced by the backend itself, so concurrent
//! duplicate inserts lose with `ConsultError::Duplicate` regardless of any
//! pre-check done by callers.

use async_trait::async_trait;
use consult_core::{
    Client, ClientInput, DatabaseConfig, Message, MessageStatus, NewMessage,
    NewUser, Prompt, PromptInput, Result, User, UserUpdate,
};
use std::sync::Arc;

pub mod memory;
pub mod surrealdb_store;

pub use memory::MemoryStore;
pub use surrealdb_store::SurrealStore;

/// Unique field names reported through `ConsultError::Duplicate`
pub mod unique {
    pub const USER_EMAIL: &str = "email";
    pub const CLIENT_EMAIL: &str = "email";
    pub const PROMPT_TITLE: &str = "title";
}

/// User account persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `Duplicate { field: "email" }` if the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Find user by exact email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find user by ID
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// All users, newest first
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Apply an admin update; `None` if the user does not exist
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>>;

    /// Replace the password hash if the user's reset generation still equals
    /// `expected_generation`, incrementing the generation in the same write.
    ///
    /// Returns `false` when the user is gone or the generation moved on.
    async fn reset_password(
        &self,
        id: &str,
        password_hash: &str,
        expected_generation: u64,
    ) -> Result<bool>;

    /// Delete a user; `false` if there was nothing to delete
    async fn delete_user(&self, id: &str) -> Result<bool>;

    async fn count_users(&self) -> Result<u64>;
}

/// Client persistence
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Insert a client; fails with `Duplicate { field: "email" }` if the email is taken
    async fn create_client(&self, input: ClientInput) -> Result<Client>;

    /// All clients, newest first
    async fn list_clients(&self) -> Result<Vec<Client>>;

    /// Overwrite name, email and company; `None` if the client does not exist
    async fn update_client(&self, id: &str, input: ClientInput) -> Result<Option<Client>>;

    async fn delete_client(&self, id: &str) -> Result<bool>;

    async fn count_clients(&self) -> Result<u64>;
}

/// Contact message persistence
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_message(&self, input: NewMessage) -> Result<Message>;

    /// All messages, newest first
    async fn list_messages(&self) -> Result<Vec<Message>>;

    async fn update_message_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<Option<Message>>;

    async fn delete_message(&self, id: &str) -> Result<bool>;

    async fn count_messages(&self) -> Result<u64>;
}

/// Prompt template persistence
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Insert a prompt; fails with `Duplicate { field: "title" }` if the title is taken
    async fn create_prompt(&self, input: PromptInput) -> Result<Prompt>;

    /// All prompts, newest first
    async fn list_prompts(&self) -> Result<Vec<Prompt>>;

    async fn update_prompt(&self, id: &str, input: PromptInput) -> Result<Option<Prompt>>;

    async fn delete_prompt(&self, id: &str) -> Result<bool>;

    async fn count_prompts(&self) -> Result<u64>;
}

/// The complete persistence service
#[async_trait]
pub trait Store: UserStore + ClientStore + MessageStore + PromptStore {
    /// Backend name for logs and readiness output
    fn backend(&self) -> &'static str;

    /// Check connectivity
    async fn ping(&self) -> Result<()>;
}

/// Open the store selected by `config.url`
///
/// `mem://` yields a fresh [`MemoryStore`]; any other URL connects to
/// SurrealDB and initializes the schema (tables and unique indexes).
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    if config.is_memory() {
        tracing::warn!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SurrealStore::connect(config).await?;
    store.init_schema().await?;
    tracing::info!(url = %config.url, namespace = %config.namespace, "Connected to SurrealDB");
    Ok(Arc::new(store))
}
