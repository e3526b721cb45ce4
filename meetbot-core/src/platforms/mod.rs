// File: src/platforms/mod.rs

use async_trait::async_trait;
use meetbot_common::models::{
    AccessToken, CalendarEvent, Contact, CreatedEvent, EventPayload, FoundRoom, MailMessage,
    Room, ScheduleItem, ScheduleWindow, UserProfile,
};
use crate::Error;

/// The directory & calendar service, seen from the bot.
///
/// Each call carries the token fetched for the current turn; implementations
/// must not hold on to it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn get_me(&self, token: &AccessToken) -> Result<UserProfile, Error>;

    /// `Ok(None)` when the user has no manager on record.
    async fn get_manager(&self, token: &AccessToken) -> Result<Option<UserProfile>, Error>;

    async fn get_contacts(&self, token: &AccessToken) -> Result<Vec<Contact>, Error>;

    /// Schedule of a mailbox (usually the user's own) over `window`.
    async fn get_schedule(
        &self,
        token: &AccessToken,
        address: &str,
        window: &ScheduleWindow,
    ) -> Result<Vec<ScheduleItem>, Error>;

    async fn get_room_schedule(
        &self,
        token: &AccessToken,
        room: &Room,
        window: &ScheduleWindow,
    ) -> Result<Vec<ScheduleItem>, Error>;

    /// Rooms whose given name starts with `prefix`.
    async fn list_rooms(&self, token: &AccessToken, prefix: &str) -> Result<Vec<Room>, Error>;

    async fn find_rooms(&self, token: &AccessToken) -> Result<Vec<FoundRoom>, Error>;

    async fn create_event(
        &self,
        token: &AccessToken,
        event: &EventPayload,
    ) -> Result<CreatedEvent, Error>;

    async fn get_events(&self, token: &AccessToken) -> Result<Vec<CalendarEvent>, Error>;

    async fn get_recent_mail(&self, token: &AccessToken, top: usize) -> Result<Vec<MailMessage>, Error>;

    async fn send_mail(
        &self,
        token: &AccessToken,
        to_address: &str,
        subject: &str,
        content: &str,
    ) -> Result<(), Error>;
}

pub mod graph;
