// tests/test_utils/mod.rs
//
// In-memory stand-ins for the identity provider and the directory service,
// shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use dashmap::DashMap;

use meetbot_common::models::{
    AccessToken, CalendarEvent, Contact, CreatedEvent, DateTimeTimeZone, EventPayload, FoundRoom,
    IncomingMessage, MailMessage, Reply, Room, ScheduleItem, ScheduleStatus, ScheduleWindow,
    UserProfile,
};
use meetbot_core::auth::{CredentialGate, IdentityProvider};
use meetbot_core::platforms::DirectoryService;
use meetbot_core::{BotConfig, ConversationService, Error};

pub const MAGIC_CODE: &str = "424242";
pub const SIGN_IN_LINK: &str = "https://login.example/start";

/// Tokens per user; a user without one can sign in by typing [`MAGIC_CODE`].
#[derive(Default)]
pub struct FakeIdentityProvider {
    pub tokens: DashMap<String, AccessToken>,
    pub calls: AtomicUsize,
    /// Time every token request takes.
    pub delay: Option<Duration>,
}

impl FakeIdentityProvider {
    pub fn with_token(user_id: &str) -> Self {
        let provider = Self::default();
        provider.tokens.insert(user_id.to_string(), AccessToken::new(format!("tok-{user_id}")));
        provider
    }

    pub fn slow(user_id: &str, delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::with_token(user_id) }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn get_user_token(&self, user_id: &str, magic_code: Option<&str>) -> Result<Option<AccessToken>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if magic_code == Some(MAGIC_CODE) {
            self.tokens.insert(user_id.to_string(), AccessToken::new(format!("tok-{user_id}")));
        }
        Ok(self.tokens.get(user_id).map(|t| t.value().clone()))
    }

    async fn sign_in_link(&self, _user_id: &str) -> Result<String, Error> {
        Ok(SIGN_IN_LINK.to_string())
    }

    async fn sign_out(&self, user_id: &str) -> Result<(), Error> {
        self.tokens.remove(user_id);
        Ok(())
    }
}

/// Directory with a fixed user, contacts and rooms. Busy slots are stored as
/// clock times and placed on whatever day a schedule is asked for.
#[derive(Default)]
pub struct FakeDirectory {
    pub me: UserProfile,
    pub manager: Option<UserProfile>,
    pub contacts: Vec<Contact>,
    pub rooms: Vec<Room>,
    pub found_rooms: Vec<FoundRoom>,
    pub busy: DashMap<String, Vec<(NaiveTime, NaiveTime)>>,
    pub mail: Vec<MailMessage>,
    pub created: Mutex<Vec<EventPayload>>,
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub failing: AtomicBool,
}

impl FakeDirectory {
    pub fn office() -> Self {
        Self {
            me: UserProfile {
                id: "u1".into(),
                display_name: Some("Dana".into()),
                mail: Some("dana@corp.example".into()),
                user_principal_name: None,
            },
            manager: Some(UserProfile {
                display_name: Some("Morgan".into()),
                ..Default::default()
            }),
            contacts: vec![
                Contact::new("Alice", "alice@corp.example"),
                Contact::new("Bob", "bob@corp.example"),
            ],
            rooms: vec![Room {
                id: "room-1".into(),
                display_name: "SH-Lotus".into(),
                given_name: Some("SH-Lotus".into()),
                mail: Some("sh-lotus@corp.example".into()),
            }],
            found_rooms: vec![FoundRoom {
                name: "Lotus".into(),
                address: Some("SH-Lotus@corp.example".into()),
            }],
            ..Default::default()
        }
    }

    pub fn busy_room(self, room_id: &str, start: (u32, u32), end: (u32, u32)) -> Self {
        let slot = (hm(start), hm(end));
        self.busy.entry(room_id.to_string()).or_default().push(slot);
        self
    }

    pub fn created_events(&self) -> Vec<EventPayload> {
        self.created.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Platform("directory unavailable".into()));
        }
        Ok(())
    }
}

fn hm((h, m): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn get_me(&self, _token: &AccessToken) -> Result<UserProfile, Error> {
        self.check()?;
        Ok(self.me.clone())
    }

    async fn get_manager(&self, _token: &AccessToken) -> Result<Option<UserProfile>, Error> {
        self.check()?;
        Ok(self.manager.clone())
    }

    async fn get_contacts(&self, _token: &AccessToken) -> Result<Vec<Contact>, Error> {
        self.check()?;
        Ok(self.contacts.clone())
    }

    async fn get_schedule(&self, _token: &AccessToken, _address: &str, _window: &ScheduleWindow) -> Result<Vec<ScheduleItem>, Error> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_room_schedule(&self, _token: &AccessToken, room: &Room, window: &ScheduleWindow) -> Result<Vec<ScheduleItem>, Error> {
        self.check()?;
        let day = window.start.date();
        let slots = self.busy.get(&room.id).map(|s| s.value().clone()).unwrap_or_default();
        Ok(slots
            .into_iter()
            .map(|(s, e)| ScheduleItem {
                status: ScheduleStatus::Busy,
                subject: Some("Taken".into()),
                location: Some(room.display_name.clone()),
                start: DateTimeTimeZone::from_naive(day.and_time(s), &window.time_zone),
                end: DateTimeTimeZone::from_naive(day.and_time(e), &window.time_zone),
            })
            .collect())
    }

    async fn list_rooms(&self, _token: &AccessToken, prefix: &str) -> Result<Vec<Room>, Error> {
        self.check()?;
        Ok(self
            .rooms
            .iter()
            .filter(|r| r.given_name.as_deref().is_some_and(|g| g.starts_with(prefix)))
            .cloned()
            .collect())
    }

    async fn find_rooms(&self, _token: &AccessToken) -> Result<Vec<FoundRoom>, Error> {
        self.check()?;
        Ok(self.found_rooms.clone())
    }

    async fn create_event(&self, _token: &AccessToken, event: &EventPayload) -> Result<CreatedEvent, Error> {
        self.check()?;
        let mut created = self.created.lock().unwrap();
        created.push(event.clone());
        Ok(CreatedEvent {
            id: format!("evt-{}", created.len()),
            subject: Some(event.subject.clone()),
            ..Default::default()
        })
    }

    async fn get_events(&self, _token: &AccessToken) -> Result<Vec<CalendarEvent>, Error> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn get_recent_mail(&self, _token: &AccessToken, top: usize) -> Result<Vec<MailMessage>, Error> {
        self.check()?;
        Ok(self.mail.iter().take(top).cloned().collect())
    }

    async fn send_mail(&self, _token: &AccessToken, to_address: &str, subject: &str, content: &str) -> Result<(), Error> {
        self.check()?;
        self.sent
            .lock()
            .unwrap()
            .push((to_address.to_string(), subject.to_string(), content.to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub service: ConversationService,
    pub provider: Arc<FakeIdentityProvider>,
    pub directory: Arc<FakeDirectory>,
}

impl Harness {
    pub fn new(provider: FakeIdentityProvider, directory: FakeDirectory) -> Self {
        let provider = Arc::new(provider);
        let directory = Arc::new(directory);
        let gate = CredentialGate::new(provider.clone(), Duration::from_secs(300));
        let service = ConversationService::new(gate, directory.clone(), Arc::new(BotConfig::default()));
        Self { service, provider, directory }
    }

    /// Sends one line on conversation `c1` as user `u1` and returns the text replies.
    pub async fn say(&self, text: &str) -> Vec<String> {
        self.say_in("c1", text).await
    }

    pub async fn say_in(&self, conversation_id: &str, text: &str) -> Vec<String> {
        let replies = self
            .service
            .handle_turn(IncomingMessage::new(conversation_id, "u1", text))
            .await
            .expect("turn failed");
        replies
            .into_iter()
            .map(|r| match r {
                Reply::Text(t) => t,
                Reply::Carousel(cards) => format!("<{} cards>", cards.len()),
            })
            .collect()
    }
}
