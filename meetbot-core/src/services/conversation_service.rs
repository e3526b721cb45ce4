use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};

use meetbot_common::models::{IncomingMessage, Reply};
use crate::auth::CredentialGate;
use crate::config::BotConfig;
use crate::dialogs::{
    BotDialogs, ConversationState, DialogStack, DialogTurnStatus, TurnContext, WaterfallEngine,
    WaterfallId,
};
use crate::platforms::DirectoryService;
use crate::Error;

/// Per-conversation dialog state.
#[derive(Debug, Default)]
pub struct ConversationSession {
    pub stack: DialogStack,
}

impl ConversationSession {
    pub fn state(&self) -> ConversationState {
        ConversationState::of(&self.stack)
    }
}

type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Entry point for every user turn. Holds one session per conversation id;
/// turns of the same conversation run one at a time, different conversations
/// run independently.
pub struct ConversationService {
    engine: WaterfallEngine<BotDialogs>,
    sessions: DashMap<String, SessionHandle>,
}

impl ConversationService {
    pub fn new(gate: CredentialGate, directory: Arc<dyn DirectoryService>, config: Arc<BotConfig>) -> Self {
        debug!("ConversationService::new() called");
        let dialogs = BotDialogs::new(gate, directory, config);
        Self {
            engine: WaterfallEngine::new(WaterfallId::Main, dialogs),
            sessions: DashMap::new(),
        }
    }

    /// Processes one incoming message and returns everything the bot says back.
    ///
    /// Step failures do not escape: the session is dropped and the user gets
    /// an apology carrying the error text. Only a failing sign-out during
    /// `logout` is returned as `Err`.
    pub async fn handle_turn(&self, msg: IncomingMessage) -> Result<Vec<Reply>, Error> {
        let (handle, mut session) = self.lock_session(&msg.conversation_id).await;
        let mut turn = TurnContext::new(&msg.conversation_id, &msg.user_id, &msg.text);

        if msg.text.trim().eq_ignore_ascii_case("logout") {
            session.stack.clear();
            self.release_if_idle(&msg.conversation_id, &handle, &session);
            self.engine.handler().gate().sign_out(&msg.user_id).await?;
            info!("[{}] user '{}' signed out", msg.conversation_id, msg.user_id);
            turn.send_text("You have been signed out.");
            return Ok(turn.replies);
        }

        match self.engine.continue_or_start(&mut session.stack, &mut turn).await {
            Ok(DialogTurnStatus::Waiting) => {
                debug!("[{}] waiting in {:?}", msg.conversation_id, session.state());
            }
            Ok(DialogTurnStatus::Complete(_)) => {
                debug!("[{}] dialog complete", msg.conversation_id);
            }
            Err(e) => {
                error!("[{}] turn failed: {}", msg.conversation_id, e);
                session.stack.clear();
                turn.send_text(format!("Sorry, it looks like something went wrong: {e}"));
            }
        }

        self.release_if_idle(&msg.conversation_id, &handle, &session);
        Ok(turn.replies)
    }

    /// Locks the session registered for `conversation_id`, creating it if
    /// needed. A session that was retired while we waited for its lock is
    /// skipped and the lookup starts over.
    async fn lock_session(&self, conversation_id: &str) -> (SessionHandle, OwnedMutexGuard<ConversationSession>) {
        loop {
            let handle = self
                .sessions
                .entry(conversation_id.to_string())
                .or_default()
                .clone();
            let guard = handle.clone().lock_owned().await;

            let still_registered = self
                .sessions
                .get(conversation_id)
                .is_some_and(|current| Arc::ptr_eq(current.value(), &handle));
            if still_registered {
                return (handle, guard);
            }
            debug!("[{}] session retired while waiting, retrying", conversation_id);
        }
    }

    /// Drops the registry entry once the dialog is over. Runs while the lock
    /// is still held, and only removes the entry if it is still ours.
    fn release_if_idle(&self, conversation_id: &str, handle: &SessionHandle, session: &ConversationSession) {
        if session.stack.is_empty() {
            self.sessions
                .remove_if(conversation_id, |_, current| Arc::ptr_eq(current, handle));
        }
    }

    /// Current state of a conversation; `Idle` if it has no session.
    pub async fn state(&self, conversation_id: &str) -> ConversationState {
        let session = match self.sessions.get(conversation_id) {
            Some(s) => s.clone(),
            None => return ConversationState::Idle,
        };
        let guard = session.lock().await;
        guard.state()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
