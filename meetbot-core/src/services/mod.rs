
// File: src/services/mod.rs

pub mod builtin_commands;
pub mod command_router;
pub mod conversation_service;

pub use command_router::{route, RoutedCommand, Verb};
pub use conversation_service::{ConversationService, ConversationSession};
