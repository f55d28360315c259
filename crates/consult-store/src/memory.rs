//! In-process store
//!
//! Keeps every table behind one `RwLock`, so the uniqueness check and the
//! insert happen under the same write guard. Records are kept in insertion
//! order; listings walk them backwards to return newest first.

use crate::{unique, ClientStore, MessageStore, PromptStore, Store, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use consult_core::{
    Client, ClientInput, ConsultError, Message, MessageStatus, NewMessage, NewUser, Prompt,
    PromptInput, Result, User, UserUpdate,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    clients: Vec<Client>,
    messages: Vec<Message>,
    prompts: Vec<Prompt>,
}

/// Memory-backed implementation of [`Store`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn remove_by_id<T>(rows: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &str) -> bool {
    let before = rows.len();
    rows.retain(|row| id_of(row) != id);
    rows.len() != before
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(ConsultError::duplicate(unique::USER_EMAIL));
        }

        let user = User::new(user);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().rev().cloned().collect())
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn reset_password(
        &self,
        id: &str,
        password_hash: &str,
        expected_generation: u64,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) if user.reset_generation == expected_generation => {
                user.password_hash = password_hash.to_string();
                user.reset_generation += 1;
                user.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_user(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.users, id, |u| &u.id))
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn create_client(&self, input: ClientInput) -> Result<Client> {
        let mut tables = self.tables.write().await;
        if tables.clients.iter().any(|c| c.email == input.email) {
            return Err(ConsultError::duplicate(unique::CLIENT_EMAIL));
        }

        let client = Client::new(input);
        tables.clients.push(client.clone());
        Ok(client)
    }

    async fn list_clients(&self) -> Result<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(tables.clients.iter().rev().cloned().collect())
    }

    async fn update_client(&self, id: &str, input: ClientInput) -> Result<Option<Client>> {
        let mut tables = self.tables.write().await;
        if tables
            .clients
            .iter()
            .any(|c| c.id != id && c.email == input.email)
        {
            return Err(ConsultError::duplicate(unique::CLIENT_EMAIL));
        }

        let Some(client) = tables.clients.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        client.name = input.name;
        client.email = input.email;
        client.company = input.company;

        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.clients, id, |c| &c.id))
    }

    async fn count_clients(&self) -> Result<u64> {
        Ok(self.tables.read().await.clients.len() as u64)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, input: NewMessage) -> Result<Message> {
        let message = Message::new(input);
        self.tables.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        Ok(tables.messages.iter().rev().cloned().collect())
    }

    async fn update_message_status(
        &self,
        id: &str,
        status: MessageStatus,
    ) -> Result<Option<Message>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .map(|message| {
                message.status = status;
                message.clone()
            }))
    }

    async fn delete_message(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.messages, id, |m| &m.id))
    }

    async fn count_messages(&self) -> Result<u64> {
        Ok(self.tables.read().await.messages.len() as u64)
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn create_prompt(&self, input: PromptInput) -> Result<Prompt> {
        let mut tables = self.tables.write().await;
        if tables.prompts.iter().any(|p| p.title == input.title) {
            return Err(ConsultError::duplicate(unique::PROMPT_TITLE));
        }

        let prompt = Prompt::new(input);
        tables.prompts.push(prompt.clone());
        Ok(prompt)
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let tables = self.tables.read().await;
        Ok(tables.prompts.iter().rev().cloned().collect())
    }

    async fn update_prompt(&self, id: &str, input: PromptInput) -> Result<Option<Prompt>> {
        let mut tables = self.tables.write().await;
        if tables
            .prompts
            .iter()
            .any(|p| p.id != id && p.title == input.title)
        {
            return Err(ConsultError::duplicate(unique::PROMPT_TITLE));
        }

        let category = input.category_or_default();
        let Some(prompt) = tables.prompts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        prompt.title = input.title;
        prompt.description = input.description;
        prompt.template = input.template;
        prompt.category = category;

        Ok(Some(prompt.clone()))
    }

    async fn delete_prompt(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(remove_by_id(&mut tables.prompts, id, |p| &p.id))
    }

    async fn count_prompts(&self) -> Result<u64> {
        Ok(self.tables.read().await.prompts.len() as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_core::Role;
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: None,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    fn prompt(title: &str) -> PromptInput {
        PromptInput {
            title: title.to_string(),
            description: "desc".to_string(),
            template: "template".to_string(),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let store = MemoryStore::new();
        assert_ok!(store.create_user(new_user("a@x.com")).await);

        let err = store.create_user(new_user("a@x.com")).await.unwrap_err();
        assert!(err.is_duplicate_of(unique::USER_EMAIL));

        // Emails are compared as stored, without case folding
        assert_ok!(store.create_user(new_user("A@x.com")).await);
        assert_eq!(store.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration_has_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user(new_user("race@x.com")).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) if e.is_duplicate_of(unique::USER_EMAIL) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
    }

    #[tokio::test]
    async fn test_user_lookup_and_update() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("b@x.com")).await.unwrap();

        let by_email = store.find_user_by_email("b@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(store.find_user_by_email("nobody@x.com").await.unwrap().is_none());

        let updated = store
            .update_user(
                &user.id,
                UserUpdate {
                    role: Some(Role::Admin),
                    full_name: Some("Bea".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.full_name.as_deref(), Some("Bea"));

        assert!(store
            .update_user("missing", UserUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reset_password_compare_and_set() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("c@x.com")).await.unwrap();

        assert!(store.reset_password(&user.id, "new-hash", 0).await.unwrap());
        let reloaded = store.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");
        assert_eq!(reloaded.reset_generation, 1);

        // Stale generation is rejected and leaves the record alone
        assert!(!store.reset_password(&user.id, "other", 0).await.unwrap());
        let reloaded = store.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");

        assert!(!store.reset_password("missing", "x", 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("d@x.com")).await.unwrap();

        assert!(store.delete_user(&user.id).await.unwrap());
        assert!(!store.delete_user(&user.id).await.unwrap());
        assert!(store.find_user_by_id(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_listings_are_newest_first() {
        let store = MemoryStore::new();
        store.create_prompt(prompt("first")).await.unwrap();
        store.create_prompt(prompt("second")).await.unwrap();

        let titles: Vec<_> = store
            .list_prompts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_prompt_title_unique_on_update() {
        let store = MemoryStore::new();
        let first = store.create_prompt(prompt("first")).await.unwrap();
        store.create_prompt(prompt("second")).await.unwrap();

        let err = store
            .update_prompt(&first.id, prompt("second"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(unique::PROMPT_TITLE));

        // Keeping its own title is fine
        let same = store.update_prompt(&first.id, prompt("first")).await.unwrap();
        assert!(same.is_some());
    }

    #[tokio::test]
    async fn test_client_crud() {
        let store = MemoryStore::new();
        let input = ClientInput {
            name: "Acme".to_string(),
            email: "ops@acme.test".to_string(),
            company: None,
        };
        let client = store.create_client(input.clone()).await.unwrap();
        assert!(store
            .create_client(input)
            .await
            .unwrap_err()
            .is_duplicate_of(unique::CLIENT_EMAIL));

        let updated = store
            .update_client(
                &client.id,
                ClientInput {
                    name: "Acme Corp".to_string(),
                    email: "ops@acme.test".to_string(),
                    company: Some("Acme".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.company.as_deref(), Some("Acme"));

        assert_eq!(store.count_clients().await.unwrap(), 1);
        assert!(store.delete_client(&client.id).await.unwrap());
        assert_eq!(store.count_clients().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_message_status_update() {
        let store = MemoryStore::new();
        let message = store
            .create_message(NewMessage {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                message: "Hello".to_string(),
            })
            .await
            .unwrap();

        let updated = store
            .update_message_status(&message.id, MessageStatus::Resolved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, MessageStatus::Resolved);
        assert!(store
            .update_message_status("missing", MessageStatus::Read)
            .await
            .unwrap()
            .is_none());
    }
}
