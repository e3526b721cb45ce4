use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use meetbot_common::models::{
    AccessToken, CalendarEvent, Contact, CreatedEvent, DateTimeTimeZone, EmailAddress,
    EventPayload, FoundRoom, ItemBody, MailMessage, Recipient, Room, ScheduleItem,
    ScheduleWindow, UserProfile,
};
use crate::platforms::DirectoryService;
use crate::Error;

/// Encapsulates the Microsoft Graph REST calls the bot makes.
///
/// The client itself is token-free; each call authorizes with the token the
/// caller obtained for the current turn.
pub struct GraphClient {
    pub base_url: Url,
    pub http_client: Client,
}

/// Graph wraps collections as `{ "value": [...] }`.
#[derive(Debug, Deserialize)]
struct ODataList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequest {
    schedules: Vec<String>,
    start_time: DateTimeTimeZone,
    end_time: DateTimeTimeZone,
    availability_view_interval: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleInformation {
    #[serde(default)]
    schedule_id: Option<String>,
    #[serde(default)]
    schedule_items: Vec<ScheduleItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingMessage {
    subject: String,
    body: ItemBody,
    to_recipients: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
struct SendMailRequest {
    message: OutgoingMessage,
}

impl GraphClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent("MeetBot/0.1")
            .build()
            .map_err(|e| Error::Platform(format!("Failed to build reqwest client: {e}")))?;

        Ok(Self {
            base_url: Url::parse(base_url)?,
            http_client: client,
        })
    }

    /// `{base}/{version}/{path}`, e.g. `https://graph.microsoft.com/beta/me/contacts`.
    fn endpoint(&self, version: &str, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{version}/{}", path.trim_start_matches('/')))?)
    }

    async fn send_json<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T, Error> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Platform(format!("{what}: request failed => {e}")))?;

        if !resp.status().is_success() {
            let st = resp.status();
            let txt = resp.text().await.unwrap_or_default();
            error!("Graph {} failed: HTTP {}", what, st);
            return Err(Error::Platform(format!("Graph {what} failed: HTTP {st} => {txt}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::Platform(format!("Parsing {what} response => {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        what: &str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);
        let req = self.http_client.get(url).bearer_auth(token.secret()).query(query);
        self.send_json(what, req).await
    }

    async fn fetch_schedule(
        &self,
        token: &AccessToken,
        url: Url,
        address: &str,
        window: &ScheduleWindow,
        interval_minutes: u32,
    ) -> Result<Vec<ScheduleItem>, Error> {
        let body = ScheduleRequest {
            schedules: vec![address.to_string()],
            start_time: DateTimeTimeZone::from_naive(window.start, &window.time_zone),
            end_time: DateTimeTimeZone::from_naive(window.end, &window.time_zone),
            availability_view_interval: interval_minutes,
        };
        debug!("POST {} for '{}' {:?}", url, address, window);
        let req = self
            .http_client
            .post(url)
            .bearer_auth(token.secret())
            .header("Prefer", format!("outlook.timezone=\"{}\"", window.time_zone))
            .json(&body);
        let resp: ODataList<ScheduleInformation> = self.send_json("getSchedule", req).await?;
        Ok(first_schedule_items(resp))
    }
}

/// Only one mailbox is ever asked for, so only the first entry matters.
fn first_schedule_items(resp: ODataList<ScheduleInformation>) -> Vec<ScheduleItem> {
    resp.value
        .into_iter()
        .next()
        .map(|info| {
            debug!("Schedule for {:?} has {} item(s)", info.schedule_id, info.schedule_items.len());
            info.schedule_items
        })
        .unwrap_or_default()
}

/// Quote a value for an OData string literal.
fn odata_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl DirectoryService for GraphClient {
    async fn get_me(&self, token: &AccessToken) -> Result<UserProfile, Error> {
        let url = self.endpoint("v1.0", "me")?;
        self.get_json(token, "me", url, &[]).await
    }

    async fn get_manager(&self, token: &AccessToken) -> Result<Option<UserProfile>, Error> {
        let url = self.endpoint("beta", "me/manager")?;
        let resp = self
            .http_client
            .get(url)
            .bearer_auth(token.secret())
            .query(&[("$select", "displayName")])
            .send()
            .await
            .map_err(|e| Error::Platform(format!("manager: request failed => {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let st = resp.status();
            let txt = resp.text().await.unwrap_or_default();
            return Err(Error::Platform(format!("Graph manager failed: HTTP {st} => {txt}")));
        }
        let manager: UserProfile = resp
            .json()
            .await
            .map_err(|e| Error::Platform(format!("Parsing manager response => {e}")))?;
        Ok(Some(manager))
    }

    async fn get_contacts(&self, token: &AccessToken) -> Result<Vec<Contact>, Error> {
        let url = self.endpoint("beta", "me/contacts")?;
        let list: ODataList<Contact> = self
            .get_json(token, "contacts", url, &[("$select", "displayName,emailAddresses".to_string())])
            .await?;
        Ok(list.value)
    }

    async fn get_schedule(
        &self,
        token: &AccessToken,
        address: &str,
        window: &ScheduleWindow,
    ) -> Result<Vec<ScheduleItem>, Error> {
        let url = self.endpoint("beta", "me/calendar/getSchedule")?;
        self.fetch_schedule(token, url, address, window, 60).await
    }

    async fn get_room_schedule(
        &self,
        token: &AccessToken,
        room: &Room,
        window: &ScheduleWindow,
    ) -> Result<Vec<ScheduleItem>, Error> {
        let path = format!("users/{}/calendar/getSchedule", urlencoding::encode(&room.id));
        let url = self.endpoint("v1.0", &path)?;
        let address = room.mail.as_deref().unwrap_or(&room.display_name);
        self.fetch_schedule(token, url, address, window, 30).await
    }

    async fn list_rooms(&self, token: &AccessToken, prefix: &str) -> Result<Vec<Room>, Error> {
        let url = self.endpoint("v1.0", "users")?;
        let filter = format!("startswith(givenName,{})", odata_literal(prefix));
        let list: ODataList<Room> = self.get_json(token, "rooms", url, &[("$filter", filter)]).await?;
        Ok(list.value)
    }

    async fn find_rooms(&self, token: &AccessToken) -> Result<Vec<FoundRoom>, Error> {
        let url = self.endpoint("beta", "me/findRooms")?;
        let list: ODataList<FoundRoom> = self.get_json(token, "findRooms", url, &[]).await?;
        Ok(list.value)
    }

    async fn create_event(
        &self,
        token: &AccessToken,
        event: &EventPayload,
    ) -> Result<CreatedEvent, Error> {
        let url = self.endpoint("v1.0", "me/events")?;
        debug!("POST {} subject='{}'", url, event.subject);
        let req = self
            .http_client
            .post(url)
            .bearer_auth(token.secret())
            .header("Prefer", format!("outlook.timezone=\"{}\"", event.start.time_zone))
            .json(event);
        self.send_json("create event", req).await
    }

    async fn get_events(&self, token: &AccessToken) -> Result<Vec<CalendarEvent>, Error> {
        let url = self.endpoint("beta", "me/events")?;
        let list: ODataList<CalendarEvent> = self
            .get_json(
                token,
                "events",
                url,
                &[("$select", "subject,organizer,attendees,start,end,location".to_string())],
            )
            .await?;
        Ok(list.value)
    }

    async fn get_recent_mail(&self, token: &AccessToken, top: usize) -> Result<Vec<MailMessage>, Error> {
        let url = self.endpoint("beta", "me/messages")?;
        let list: ODataList<MailMessage> = self
            .get_json(token, "messages", url, &[("$top", top.to_string())])
            .await?;
        Ok(list.value)
    }

    async fn send_mail(
        &self,
        token: &AccessToken,
        to_address: &str,
        subject: &str,
        content: &str,
    ) -> Result<(), Error> {
        if to_address.trim().is_empty() {
            return Err(Error::Platform("send_mail: empty recipient address".into()));
        }
        let url = self.endpoint("v1.0", "me/sendMail")?;
        let body = SendMailRequest {
            message: OutgoingMessage {
                subject: subject.to_string(),
                body: ItemBody { content_type: "Text".into(), content: content.to_string() },
                to_recipients: vec![Recipient { email_address: EmailAddress::from_address(to_address) }],
            },
        };
        let resp = self
            .http_client
            .post(url)
            .bearer_auth(token.secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Platform(format!("sendMail: request failed => {e}")))?;

        if !resp.status().is_success() {
            let st = resp.status();
            let txt = resp.text().await.unwrap_or_default();
            return Err(Error::Platform(format!("Graph sendMail failed: HTTP {st} => {txt}")));
        }
        Ok(())
    }
}
