// File: meetbot-core/src/config.rs
//
// Runtime settings for the bot. Values come from the process environment
// (optionally seeded from a `.env` file) and fall back to the Shanghai
// office defaults.

use std::time::Duration;
use chrono::{NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, warn};
use crate::Error;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// A prefix of a room's address, and the office it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRegion {
    pub prefix: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Name of the OAuth connection the identity provider signs users into.
    pub connection_name: String,
    pub sign_in_url: String,
    pub graph_base_url: String,

    /// `givenName` prefix used when looking up a meeting's room.
    pub room_prefix: String,
    /// Regions listed by the `rooms` command.
    pub room_regions: Vec<RoomRegion>,

    /// Zone in which users type clock times.
    pub time_zone: Tz,
    /// The same zone under the name the calendar service expects. Must agree
    /// with `time_zone`; checked on load.
    pub graph_time_zone: String,

    pub login_timeout: Duration,
    pub recent_mail_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            connection_name: "graph".to_string(),
            sign_in_url: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize".to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            room_prefix: "SH".to_string(),
            room_regions: vec![
                RoomRegion { prefix: "SH".into(), label: "ShangHai".into() },
                RoomRegion { prefix: "DL".into(), label: "DaLian".into() },
            ],
            time_zone: chrono_tz::Asia::Shanghai,
            graph_time_zone: "China Standard Time".to_string(),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            recent_mail_limit: 5,
        }
    }
}

impl BotConfig {
    /// Loads `.env` if present, then reads `MEETBOT_*` variables over the defaults.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BotConfig::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = BotConfig::default();

        if let Some(v) = lookup("MEETBOT_CONNECTION_NAME") {
            cfg.connection_name = v;
        }
        if let Some(v) = lookup("MEETBOT_SIGN_IN_URL") {
            cfg.sign_in_url = v;
        }
        if let Some(v) = lookup("MEETBOT_GRAPH_BASE_URL") {
            cfg.graph_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("MEETBOT_ROOM_PREFIX") {
            cfg.room_prefix = v;
        }
        if let Some(v) = lookup("MEETBOT_ROOM_REGIONS") {
            cfg.room_regions = parse_room_regions(&v)?;
        }
        if let Some(v) = lookup("MEETBOT_TIME_ZONE") {
            cfg.time_zone = v
                .parse::<Tz>()
                .map_err(|e| Error::Config(format!("MEETBOT_TIME_ZONE='{v}': {e}")))?;
        }
        if let Some(v) = lookup("MEETBOT_GRAPH_TIME_ZONE") {
            cfg.graph_time_zone = v;
        }
        if let Some(v) = lookup("MEETBOT_LOGIN_TIMEOUT_SECS") {
            let secs = v
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("MEETBOT_LOGIN_TIMEOUT_SECS='{v}': {e}")))?;
            cfg.login_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("MEETBOT_RECENT_MAIL_LIMIT") {
            cfg.recent_mail_limit = v
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("MEETBOT_RECENT_MAIL_LIMIT='{v}': {e}")))?;
        }

        check_zone_pair(&cfg.graph_time_zone, cfg.time_zone)?;
        debug!("Loaded BotConfig: {:?}", cfg);
        Ok(cfg)
    }
}

/// Windows zone names the calendar service uses, with an IANA zone that
/// follows the same offsets.
const WINDOWS_ZONES: &[(&str, Tz)] = &[
    ("China Standard Time", chrono_tz::Asia::Shanghai),
    ("Tokyo Standard Time", chrono_tz::Asia::Tokyo),
    ("Singapore Standard Time", chrono_tz::Asia::Singapore),
    ("India Standard Time", chrono_tz::Asia::Kolkata),
    ("W. Europe Standard Time", chrono_tz::Europe::Berlin),
    ("GMT Standard Time", chrono_tz::Europe::London),
    ("Eastern Standard Time", chrono_tz::America::New_York),
    ("Pacific Standard Time", chrono_tz::America::Los_Angeles),
    ("UTC", chrono_tz::UTC),
];

/// The calendar zone name and the local zone must agree in winter and in
/// summer. Names we cannot map are let through with a warning.
pub fn check_zone_pair(graph_zone: &str, local: Tz) -> Result<(), Error> {
    let resolved = WINDOWS_ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(graph_zone.trim()))
        .map(|(_, tz)| *tz)
        .or_else(|| graph_zone.trim().parse::<Tz>().ok());

    let Some(graph_tz) = resolved else {
        warn!(
            "Cannot verify MEETBOT_GRAPH_TIME_ZONE '{}'; it must describe the same zone as {}",
            graph_zone, local
        );
        return Ok(());
    };

    if same_offsets(graph_tz, local) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "MEETBOT_GRAPH_TIME_ZONE '{graph_zone}' ({graph_tz}) does not match MEETBOT_TIME_ZONE '{local}'"
        )))
    }
}

fn same_offsets(a: Tz, b: Tz) -> bool {
    [(1, 15), (7, 15)].iter().all(|&(month, day)| {
        let Some(instant) = NaiveDate::from_ymd_opt(2024, month, day).and_then(|d| d.and_hms_opt(12, 0, 0)) else {
            return false;
        };
        a.offset_from_utc_datetime(&instant).fix() == b.offset_from_utc_datetime(&instant).fix()
    })
}

/// Parses `SH=ShangHai,DL=DaLian`.
pub fn parse_room_regions(raw: &str) -> Result<Vec<RoomRegion>, Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (prefix, label) = pair
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("room region '{pair}' is not PREFIX=Label")))?;
            Ok(RoomRegion {
                prefix: prefix.trim().to_string(),
                label: label.trim().to_string(),
            })
        })
        .collect()
}
