// File: meetbot-core/src/services/command_router.rs
//! Maps a free-text utterance to at most one command verb.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Meeting,
    Send,
    Me,
    Recent,
    Rooms,
    Schedule,
    Event,
}

impl Verb {
    /// Recognizes an already lower-cased token.
    pub fn from_token(token: &str) -> Option<Verb> {
        match token {
            "meeting" => Some(Verb::Meeting),
            "send" => Some(Verb::Send),
            "me" => Some(Verb::Me),
            "recent" => Some(Verb::Recent),
            "rooms" => Some(Verb::Rooms),
            "schedule" => Some(Verb::Schedule),
            "event" => Some(Verb::Event),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Meeting => "meeting",
            Verb::Send => "send",
            Verb::Me => "me",
            Verb::Recent => "recent",
            Verb::Rooms => "rooms",
            Verb::Schedule => "schedule",
            Verb::Event => "event",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCommand {
    pub verb: Verb,
    /// Only `send` takes one: the token right after the verb.
    pub argument: Option<String>,
}

/// First recognized verb wins; everything after it (bar `send`'s address)
/// is ignored.
pub fn route(utterance: &str) -> Option<RoutedCommand> {
    let lowered = utterance.to_lowercase();
    let mut tokens = lowered.split_whitespace();

    while let Some(token) = tokens.next() {
        if let Some(verb) = Verb::from_token(token) {
            let argument = match verb {
                Verb::Send => tokens.next().map(str::to_string),
                _ => None,
            };
            return Some(RoutedCommand { verb, argument });
        }
    }
    None
}
