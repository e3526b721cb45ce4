// File: meetbot-core/src/dialogs/mod.rs
//! The bot's conversations: a generic waterfall engine plus the three
//! waterfalls (main, meeting, sign-in) wired into one step table.

pub mod engine;
pub mod main_dialog;
pub mod meeting_dialog;
pub mod sign_in;

use std::sync::Arc;
use async_trait::async_trait;

use meetbot_common::models::MeetingField;
use crate::auth::CredentialGate;
use crate::config::BotConfig;
use crate::platforms::DirectoryService;
use crate::scheduling::MeetingOrchestrator;
use crate::Error;

pub use engine::{
    DialogFrame, DialogResult, DialogStack, DialogTurnStatus, StepAction, StepContext,
    StepHandler, StepId, TurnContext, WaterfallEngine, WaterfallId,
};

/// Step table for every waterfall the bot runs.
pub struct BotDialogs {
    pub(crate) gate: CredentialGate,
    pub(crate) directory: Arc<dyn DirectoryService>,
    pub(crate) orchestrator: MeetingOrchestrator,
    pub(crate) config: Arc<BotConfig>,
}

impl BotDialogs {
    pub fn new(gate: CredentialGate, directory: Arc<dyn DirectoryService>, config: Arc<BotConfig>) -> Self {
        let orchestrator = MeetingOrchestrator::new(directory.clone(), config.clone());
        Self { gate, directory, orchestrator, config }
    }

    pub fn gate(&self) -> &CredentialGate {
        &self.gate
    }
}

#[async_trait]
impl StepHandler for BotDialogs {
    async fn run_step(
        &self,
        step: StepId,
        ctx: &mut StepContext<'_>,
        result: DialogResult,
    ) -> Result<StepAction, Error> {
        match step {
            StepId::MainPrompt => main_dialog::prompt(),
            StepId::MainLogin => main_dialog::login(ctx, result),
            StepId::MainCommand => main_dialog::command(ctx, result),
            StepId::MainProcess => main_dialog::process(self, ctx, result).await,

            StepId::MeetingSubject
            | StepId::MeetingContent
            | StepId::MeetingStartTime
            | StepId::MeetingEndTime
            | StepId::MeetingRoom
            | StepId::MeetingParticipants
            | StepId::MeetingLogin => meeting_dialog::run(step, ctx, result),

            StepId::SignInBegin => sign_in::begin(&self.gate, ctx).await,
            StepId::SignInVerify => sign_in::verify(&self.gate, ctx, result).await,
        }
    }
}

/// Where a conversation is parked between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingLogin,
    AwaitingCommand,
    AwaitingMeetingField(MeetingField),
    AwaitingLoginForAction,
}

impl ConversationState {
    pub fn of(stack: &DialogStack) -> ConversationState {
        let frames = stack.frames();
        let Some(top) = frames.last() else {
            return ConversationState::Idle;
        };
        let step = top.waterfall.steps().get(top.step_index).copied();

        match top.waterfall {
            WaterfallId::Main => ConversationState::AwaitingCommand,
            WaterfallId::Meeting => step
                .and_then(meeting_dialog::answered_by)
                .map(ConversationState::AwaitingMeetingField)
                .unwrap_or(ConversationState::AwaitingLoginForAction),
            WaterfallId::SignIn => {
                let parent = frames.len().checked_sub(2).and_then(|i| frames.get(i));
                match parent {
                    Some(p) if p.waterfall == WaterfallId::Main && p.step_index == 0 => {
                        ConversationState::AwaitingLogin
                    }
                    _ => ConversationState::AwaitingLoginForAction,
                }
            }
        }
    }
}
