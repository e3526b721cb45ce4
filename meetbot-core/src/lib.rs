// src/lib.rs

pub mod auth;
pub mod config;
pub mod dialogs;
pub mod platforms;
pub mod scheduling;
pub mod services;
pub mod utils;

pub use config::BotConfig;
pub use meetbot_common::error::Error;
pub use services::ConversationService;
