//! SurrealDB implementation of the record store
//!
//! Provides connection management, schema setup and CRUD operations for
//! users, clients, messages and prompts. Unique fields are backed by
//! `UNIQUE` indexes so concurrent duplicate writes fail in the database.

use crate::{unique, ClientStore, MessageStore, PromptStore, Store, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use consult_core::{
    Client, ClientInput, ConsultError, DatabaseConfig, Message, MessageStatus, NewMessage,
    NewUser, Prompt, PromptInput, Result, Role, User, UserUpdate,
};
use serde::{Deserialize, Serialize};
use surrealdb::engine::remote::ws::{Client as WsClient, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::sql::Thing;
use surrealdb::Surreal;

const USERS: &str = "users";
const CLIENTS: &str = "clients";
const MESSAGES: &str = "messages";
const PROMPTS: &str = "prompts";

/// SurrealDB store implementation
pub struct SurrealStore {
    client: Surreal<WsClient>,
}

impl SurrealStore {
    /// Open a WebSocket connection, sign in as root and select namespace/database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        // The ws engine adds the scheme itself
        let url = config
            .url
            .strip_prefix("ws://")
            .or_else(|| config.url.strip_prefix("wss://"))
            .unwrap_or(&config.url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("SurrealDB connection failed: {e}")))?;

        client
            .signin(Root {
                username: &config.user,
                password: &config.pass,
            })
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("SurrealDB auth failed: {e}")))?;

        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("SurrealDB namespace error: {e}")))?;

        Ok(Self { client })
    }

    /// Define tables and unique indexes. Safe to run on every start.
    pub async fn init_schema(&self) -> Result<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS users SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS users_email ON users FIELDS email UNIQUE;
                DEFINE TABLE IF NOT EXISTS clients SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS clients_email ON clients FIELDS email UNIQUE;
                DEFINE TABLE IF NOT EXISTS messages SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS prompts SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS prompts_title ON prompts FIELDS title UNIQUE;
            "#,
            )
            .await
            .and_then(|response| response.check())
            .map_err(|e| ConsultError::DatabaseError(format!("Schema init failed: {e}")))?;

        Ok(())
    }

    async fn list<R>(&self, table: &'static str) -> Result<Vec<R>>
    where
        R: for<'de> Deserialize<'de>,
    {
        self.client
            .query("SELECT * FROM type::table($table) ORDER BY created_at DESC")
            .bind(("table", table))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("List {table} failed: {e}")))?
            .take(0)
            .map_err(|e| ConsultError::DatabaseError(format!("Result extraction failed: {e}")))
    }

    async fn count(&self, table: &'static str) -> Result<u64> {
        let rows: Vec<CountRow> = self
            .client
            .query("SELECT count() FROM type::table($table) GROUP ALL")
            .bind(("table", table))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Count {table} failed: {e}")))?
            .take(0)
            .map_err(|e| ConsultError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }

    async fn delete<R>(&self, table: &'static str, id: &str) -> Result<bool>
    where
        R: for<'de> Deserialize<'de>,
    {
        let deleted: Option<R> = self
            .client
            .delete((table, id))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Delete from {table} failed: {e}")))?;

        Ok(deleted.is_some())
    }
}

/// Map a write failure, recognizing unique-index violations on `field`
fn write_error(context: &str, field: &str, err: surrealdb::Error) -> ConsultError {
    let message = err.to_string();
    if message.contains("already contains") {
        ConsultError::duplicate(field)
    } else {
        ConsultError::DatabaseError(format!("{context}: {message}"))
    }
}

fn record_id(id: Option<Thing>) -> String {
    id.map(|thing| thing.id.to_raw()).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    full_name: Option<String>,
    email: String,
    password_hash: String,
    role: Role,
    #[serde(default)]
    reset_generation: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: None,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            reset_generation: user.reset_generation,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: record_id(r.id),
            full_name: r.full_name,
            email: r.email,
            password_hash: r.password_hash,
            role: r.role,
            reset_generation: r.reset_generation,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClientRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    name: String,
    email: String,
    company: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&Client> for ClientRecord {
    fn from(client: &Client) -> Self {
        Self {
            id: None,
            name: client.name.clone(),
            email: client.email.clone(),
            company: client.company.clone(),
            created_at: client.created_at,
        }
    }
}

impl From<ClientRecord> for Client {
    fn from(r: ClientRecord) -> Self {
        Self {
            id: record_id(r.id),
            name: r.name,
            email: r.email,
            company: r.company,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    name: String,
    email: String,
    message: String,
    status: MessageStatus,
    created_at: DateTime<Utc>,
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: None,
            name: message.name.clone(),
            email: message.email.clone(),
            message: message.message.clone(),
            status: message.status,
            created_at: message.created_at,
        }
    }
}

impl From<MessageRecord> for Message {
    fn from(r: MessageRecord) -> Self {
        Self {
            id: record_id(r.id),
            name: r.name,
            email: r.email,
            message: r.message,
            status: r.status,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    title: String,
    description: String,
    template: String,
    category: String,
    created_at: DateTime<Utc>,
}

impl From<&Prompt> for PromptRecord {
    fn from(prompt: &Prompt) -> Self {
        Self {
            id: None,
            title: prompt.title.clone(),
            description: prompt.description.clone(),
            template: prompt.template.clone(),
            category: prompt.category.clone(),
            created_at: prompt.created_at,
        }
    }
}

impl From<PromptRecord> for Prompt {
    fn from(r: PromptRecord) -> Self {
        Self {
            id: record_id(r.id),
            title: r.title,
            description: r.description,
            template: r.template,
            category: r.category,
            created_at: r.created_at,
        }
    }
}

// Partial updates sent with MERGE; absent fields are left untouched

#[derive(Debug, Serialize)]
struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ClientPatch {
    name: String,
    email: String,
    company: Option<String>,
}

#[derive(Debug, Serialize)]
struct PromptPatch {
    title: String,
    description: String,
    template: String,
    category: String,
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: MessageStatus,
}

// ============================================================================
// Store implementations
// ============================================================================

#[async_trait]
impl UserStore for SurrealStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = User::new(user);
        let created: Option<UserRecord> = self
            .client
            .create((USERS, user.id.as_str()))
            .content(UserRecord::from(&user))
            .await
            .map_err(|e| write_error("Failed to create user", unique::USER_EMAIL, e))?;

        created
            .map(User::from)
            .ok_or_else(|| ConsultError::DatabaseError("User create returned nothing".to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let records: Vec<UserRecord> = self
            .client
            .query("SELECT * FROM users WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Query failed: {e}")))?
            .take(0)
            .map_err(|e| ConsultError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(records.into_iter().next().map(User::from))
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let record: Option<UserRecord> = self
            .client
            .select((USERS, id))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Failed to get user: {e}")))?;

        Ok(record.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let records: Vec<UserRecord> = self.list(USERS).await?;
        Ok(records.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>> {
        let patch = UserPatch {
            full_name: update.full_name,
            role: update.role,
            updated_at: Utc::now(),
        };
        let updated: Option<UserRecord> = self
            .client
            .update((USERS, id))
            .merge(patch)
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Failed to update user: {e}")))?;

        Ok(updated.map(User::from))
    }

    async fn reset_password(
        &self,
        id: &str,
        password_hash: &str,
        expected_generation: u64,
    ) -> Result<bool> {
        let updated: Vec<UserRecord> = self
            .client
            .query(
                "UPDATE type::thing('users', $id) \
                 SET password_hash = $hash, reset_generation = reset_generation + 1, updated_at = $now \
                 WHERE reset_generation = $generation RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("hash", password_hash.to_string()))
            .bind(("now", Utc::now()))
            .bind(("generation", expected_generation))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Password reset failed: {e}")))?
            .take(0)
            .map_err(|e| ConsultError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(!updated.is_empty())
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        self.delete::<UserRecord>(USERS, id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count(USERS).await
    }
}

#[async_trait]
impl ClientStore for SurrealStore {
    async fn create_client(&self, input: ClientInput) -> Result<Client> {
        let client = Client::new(input);
        let created: Option<ClientRecord> = self
            .client
            .create((CLIENTS, client.id.as_str()))
            .content(ClientRecord::from(&client))
            .await
            .map_err(|e| write_error("Failed to create client", unique::CLIENT_EMAIL, e))?;

        created
            .map(Client::from)
            .ok_or_else(|| ConsultError::DatabaseError("Client create returned nothing".to_string()))
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        let records: Vec<ClientRecord> = self.list(CLIENTS).await?;
        Ok(records.into_iter().map(Client::from).collect())
    }

    async fn update_client(&self, id: &str, input: ClientInput) -> Result<Option<Client>> {
        let patch = ClientPatch {
            name: input.name,
            email: input.email,
            company: input.company,
        };
        let updated: Option<ClientRecord> = self
            .client
            .update((CLIENTS, id))
            .merge(patch)
            .await
            .map_err(|e| write_error("Failed to update client", unique::CLIENT_EMAIL, e))?;

        Ok(updated.map(Client::from))
    }

    async fn delete_client(&self, id: &str) -> Result<bool> {
        self.delete::<ClientRecord>(CLIENTS, id).await
    }

    async fn count_clients(&self) -> Result<u64> {
        self.count(CLIENTS).await
    }
}

#[async_trait]
impl MessageStore for SurrealStore {
    async fn create_message(&self, input: NewMessage) -> Result<Message> {
        let message = Message::new(input);
        let created: Option<MessageRecord> = self
            .client
            .create((MESSAGES, message.id.as_str()))
            .content(MessageRecord::from(&message))
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Failed to store message: {e}")))?;

        created
            .map(Message::from)
            .ok_or_else(|| ConsultError::DatabaseError("Message create returned nothing".to_string()))
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        let records: Vec<MessageRecord> = self.list(MESSAGES).await?;
        Ok(records.into_iter().map(Message::from).collect())
    }

    async fn update_message_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<Option<Message>> {
        let updated: Option<MessageRecord> = self
            .client
            .update((MESSAGES, id))
            .merge(StatusPatch { status })
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("Failed to update message: {e}")))?;

        Ok(updated.map(Message::from))
    }

    async fn delete_message(&self, id: &str) -> Result<bool> {
        self.delete::<MessageRecord>(MESSAGES, id).await
    }

    async fn count_messages(&self) -> Result<u64> {
        self.count(MESSAGES).await
    }
}

#[async_trait]
impl PromptStore for SurrealStore {
    async fn create_prompt(&self, input: PromptInput) -> Result<Prompt> {
        let prompt = Prompt::new(input);
        let created: Option<PromptRecord> = self
            .client
            .create((PROMPTS, prompt.id.as_str()))
            .content(PromptRecord::from(&prompt))
            .await
            .map_err(|e| write_error("Failed to create prompt", unique::PROMPT_TITLE, e))?;

        created
            .map(Prompt::from)
            .ok_or_else(|| ConsultError::DatabaseError("Prompt create returned nothing".to_string()))
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let records: Vec<PromptRecord> = self.list(PROMPTS).await?;
        Ok(records.into_iter().map(Prompt::from).collect())
    }

    async fn update_prompt(&self, id: &str, input: PromptInput) -> Result<Option<Prompt>> {
        let category = input.category_or_default();
        let patch = PromptPatch {
            title: input.title,
            description: input.description,
            template: input.template,
            category,
        };
        let updated: Option<PromptRecord> = self
            .client
            .update((PROMPTS, id))
            .merge(patch)
            .await
            .map_err(|e| write_error("Failed to update prompt", unique::PROMPT_TITLE, e))?;

        Ok(updated.map(Prompt::from))
    }

    async fn delete_prompt(&self, id: &str) -> Result<bool> {
        self.delete::<PromptRecord>(PROMPTS, id).await
    }

    async fn count_prompts(&self) -> Result<u64> {
        self.count(PROMPTS).await
    }
}

#[async_trait]
impl Store for SurrealStore {
    fn backend(&self) -> &'static str {
        "surrealdb"
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .health()
            .await
            .map_err(|e| ConsultError::DatabaseError(format!("SurrealDB health check failed: {e}")))
    }
}
