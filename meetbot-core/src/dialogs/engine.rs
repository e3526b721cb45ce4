// =============================================================================
// meetbot-core/src/dialogs/engine.rs
//   Waterfall engine: a stack of frames, each walking an ordered list of steps.
// =============================================================================

use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{debug, trace};

use meetbot_common::models::{AccessToken, MeetingDraft, Reply};
use crate::Error;

/// The waterfalls the bot knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaterfallId {
    Main,
    Meeting,
    SignIn,
}

/// Every step of every waterfall. Steps are addressed by their index in
/// [`WaterfallId::steps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    MainPrompt,
    MainLogin,
    MainCommand,
    MainProcess,

    MeetingSubject,
    MeetingContent,
    MeetingStartTime,
    MeetingEndTime,
    MeetingRoom,
    MeetingParticipants,
    MeetingLogin,

    SignInBegin,
    SignInVerify,
}

impl WaterfallId {
    pub fn steps(&self) -> &'static [StepId] {
        match self {
            WaterfallId::Main => &[
                StepId::MainPrompt,
                StepId::MainLogin,
                StepId::MainCommand,
                StepId::MainProcess,
            ],
            WaterfallId::Meeting => &[
                StepId::MeetingSubject,
                StepId::MeetingContent,
                StepId::MeetingStartTime,
                StepId::MeetingEndTime,
                StepId::MeetingRoom,
                StepId::MeetingParticipants,
                StepId::MeetingLogin,
            ],
            WaterfallId::SignIn => &[StepId::SignInBegin, StepId::SignInVerify],
        }
    }
}

/// What a step (or a finished child waterfall) hands to the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResult {
    None,
    Text(String),
    Token(AccessToken),
}

impl DialogResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            DialogResult::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_token(self) -> Option<AccessToken> {
        match self {
            DialogResult::Token(t) => Some(t),
            _ => None,
        }
    }
}

/// The next thing the engine should do after running a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Send the question and wait; the answer goes to the following step.
    Prompt(String),
    /// Send the question again and wait; the same step receives the answer.
    Reprompt(String),
    /// Push a nested waterfall and run it right away.
    BeginDialog(WaterfallId),
    /// Pop this frame, handing the result to the parent.
    End(DialogResult),
}

/// How the turn left the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// A step is waiting for the user's next message.
    Waiting,
    /// The root waterfall finished; the stack is empty.
    Complete(DialogResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogFrame {
    pub waterfall: WaterfallId,
    /// Index of the step that runs when this frame resumes.
    pub step_index: usize,
    /// Answers scoped to this frame.
    pub values: HashMap<String, String>,
}

impl DialogFrame {
    fn new(waterfall: WaterfallId) -> Self {
        Self { waterfall, step_index: 0, values: HashMap::new() }
    }
}

/// The active frames of one conversation, most recent last.
///
/// The meeting form belongs to the root frame: it is reset when a root frame
/// is pushed and dropped when the stack empties. While a child frame runs it
/// gets the form on loan through [`StepContext::form`], which is how the
/// booking waterfall's answers outlive the booking waterfall itself.
#[derive(Debug, Default, Clone)]
pub struct DialogStack {
    frames: Vec<DialogFrame>,
    form: MeetingDraft,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[DialogFrame] {
        &self.frames
    }

    pub fn top(&self) -> Option<&DialogFrame> {
        self.frames.last()
    }

    pub fn form(&self) -> &MeetingDraft {
        &self.form
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.form = MeetingDraft::default();
    }

    fn push(&mut self, waterfall: WaterfallId) {
        if self.frames.is_empty() {
            self.form = MeetingDraft::default();
        }
        self.frames.push(DialogFrame::new(waterfall));
    }

    fn pop(&mut self) -> Option<DialogFrame> {
        let frame = self.frames.pop();
        if self.frames.is_empty() {
            self.form = MeetingDraft::default();
        }
        frame
    }
}

/// Everything a step may touch while it runs.
pub struct StepContext<'a> {
    pub conversation_id: &'a str,
    pub user_id: &'a str,
    /// Values of the frame the step belongs to.
    pub values: &'a mut HashMap<String, String>,
    /// The root frame's meeting form.
    pub form: &'a mut MeetingDraft,
    outbox: &'a mut Vec<Reply>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        conversation_id: &'a str,
        user_id: &'a str,
        values: &'a mut HashMap<String, String>,
        form: &'a mut MeetingDraft,
        outbox: &'a mut Vec<Reply>,
    ) -> Self {
        Self { conversation_id, user_id, values, form, outbox }
    }

    pub fn send_reply(&mut self, reply: Reply) {
        self.outbox.push(reply);
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.outbox.push(Reply::Text(text.into()));
    }
}

/// Step table: maps a [`StepId`] to its behavior.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn run_step(
        &self,
        step: StepId,
        ctx: &mut StepContext<'_>,
        result: DialogResult,
    ) -> Result<StepAction, Error>;
}

/// One turn's worth of input and output.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub conversation_id: String,
    pub user_id: String,
    pub text: String,
    pub replies: Vec<Reply>,
}

impl TurnContext {
    pub fn new(conversation_id: impl Into<String>, user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id: user_id.into(),
            text: text.into(),
            replies: Vec::new(),
        }
    }

    pub fn send_text(&mut self, text: impl Into<String>) {
        self.replies.push(Reply::Text(text.into()));
    }
}

pub struct WaterfallEngine<H: StepHandler> {
    root: WaterfallId,
    handler: H,
}

impl<H: StepHandler> WaterfallEngine<H> {
    pub fn new(root: WaterfallId, handler: H) -> Self {
        Self { root, handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Start the root waterfall on an empty stack, otherwise feed the user's
    /// message to the step the top frame is waiting on.
    ///
    /// Any step error clears the whole stack before it is returned.
    pub async fn continue_or_start(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
    ) -> Result<DialogTurnStatus, Error> {
        let outcome = if stack.is_empty() {
            debug!("[{}] starting {:?}", turn.conversation_id, self.root);
            stack.push(self.root);
            self.drive(stack, turn, DialogResult::None).await
        } else {
            let answer = DialogResult::Text(turn.text.clone());
            self.drive(stack, turn, answer).await
        };

        if outcome.is_err() {
            stack.clear();
        }
        outcome
    }

    async fn drive(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
        mut input: DialogResult,
    ) -> Result<DialogTurnStatus, Error> {
        loop {
            let Some(top) = stack.frames.last() else {
                return Ok(DialogTurnStatus::Complete(input));
            };
            let waterfall = top.waterfall;
            let index = top.step_index;
            let steps = waterfall.steps();

            let action = match steps.get(index) {
                // Falling off the end returns whatever the last step was resumed with.
                None => StepAction::End(input),
                Some(&step) => {
                    trace!("[{}] running {:?} ({:?}#{})", turn.conversation_id, step, waterfall, index);
                    let DialogStack { frames, form } = &mut *stack;
                    let frame = frames
                        .last_mut()
                        .ok_or_else(|| Error::Dialog("stack emptied while running a step".into()))?;
                    let mut ctx = StepContext {
                        conversation_id: &turn.conversation_id,
                        user_id: &turn.user_id,
                        values: &mut frame.values,
                        form,
                        outbox: &mut turn.replies,
                    };
                    self.handler.run_step(step, &mut ctx, input).await?
                }
            };

            match action {
                StepAction::Prompt(text) => {
                    turn.send_text(text);
                    if let Some(frame) = stack.frames.last_mut() {
                        frame.step_index = index + 1;
                    }
                    return Ok(DialogTurnStatus::Waiting);
                }
                StepAction::Reprompt(text) => {
                    turn.send_text(text);
                    return Ok(DialogTurnStatus::Waiting);
                }
                StepAction::BeginDialog(child) => {
                    debug!("[{}] {:?} begins {:?}", turn.conversation_id, waterfall, child);
                    stack.push(child);
                    input = DialogResult::None;
                }
                StepAction::End(result) => {
                    debug!("[{}] {:?} ended", turn.conversation_id, waterfall);
                    stack.pop();
                    // The parent was parked on the step that began the child.
                    if let Some(parent) = stack.frames.last_mut() {
                        parent.step_index += 1;
                    }
                    input = result;
                }
            }
        }
    }
}
