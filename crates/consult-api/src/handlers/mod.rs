//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod messages;
pub mod prompts;
pub mod users;
