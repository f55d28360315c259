//! Domain records for the consulting back office
//!
//! Four record types are persisted:
//! - User: identity record used by authentication
//! - Client: a customer tracked by the admin panel
//! - Message: a contact-form submission
//! - Prompt: a prompt template published in the prompt kit
//!
//! JSON uses camelCase field names to match the web front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Default category assigned to prompts created without one
pub const DEFAULT_PROMPT_CATEGORY: &str = "General";

/// Generate a fresh record identifier
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Users
// ============================================================================

/// User role
///
/// Two access levels exist:
/// - User: default for every registration
/// - Admin: may use the back-office resource routes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Convert role to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user account
///
/// Never serialized directly; API responses go through [`UserPublic`].
#[derive(Debug, Clone)]
pub struct User {
    /// Opaque identifier, assigned at creation
    pub id: String,
    pub full_name: Option<String>,
    /// Unique across all users, compared exactly as stored
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
    /// Incremented on every password reset; embedded in reset tokens so each
    /// token can be redeemed at most once
    pub reset_generation: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Materialize a new user record from a creation request
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            reset_generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Convert user to public representation (without credential fields)
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Public user representation (safe for API responses)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// User creation request, with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Admin-side user update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.role.is_none()
    }
}

// ============================================================================
// Clients
// ============================================================================

/// Customer record managed from the admin panel
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    /// Unique across all clients
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(input: ClientInput) -> Self {
        Self {
            id: new_record_id(),
            name: input.name,
            email: input.email,
            company: input.company,
            created_at: Utc::now(),
        }
    }
}

/// Client create/update body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
}

// ============================================================================
// Contact messages
// ============================================================================

/// Processing state of a contact message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Unread,
    Read,
    Resolved,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
            MessageStatus::Resolved => "resolved",
        }
    }
}

/// Contact-form submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(input: NewMessage) -> Self {
        Self {
            id: new_record_id(),
            name: input.name,
            email: input.email,
            message: input.message,
            status: MessageStatus::Unread,
            created_at: Utc::now(),
        }
    }
}

/// Public contact-form body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewMessage {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email"), length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 1000, message = "Message is required"))]
    pub message: String,
}

impl NewMessage {
    /// Strip surrounding whitespace; validation applies to the trimmed values
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

// ============================================================================
// Prompt templates
// ============================================================================

/// Prompt template shown in the prompt kit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    /// Unique across all prompts
    pub title: String,
    pub description: String,
    pub template: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    pub fn new(input: PromptInput) -> Self {
        let category = input.category_or_default();
        Self {
            id: new_record_id(),
            title: input.title,
            description: input.description,
            template: input.template,
            category,
            created_at: Utc::now(),
        }
    }
}

/// Prompt create/update body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromptInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Template is required"))]
    pub template: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl PromptInput {
    pub fn category_or_default(&self) -> String {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_PROMPT_CATEGORY.to_string(),
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Record counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub messages: u64,
    pub clients: u64,
    pub prompts: u64,
    /// Pricing plans are not persisted; always zero
    pub pricing: u64,
    pub users: u64,
}
