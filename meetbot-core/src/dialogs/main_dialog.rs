// File: meetbot-core/src/dialogs/main_dialog.rs
//! Root waterfall: sign in, take one command, sign in again, run it.

use tracing::{debug, info};

use crate::dialogs::engine::{DialogResult, StepAction, StepContext, WaterfallId};
use crate::dialogs::BotDialogs;
use crate::services::builtin_commands::{handle_builtin_command, CommandContext};
use crate::services::command_router::{route, Verb};
use crate::Error;

pub const COMMAND_MENU: &str =
    "What would you like to do? (type 'me', 'send <EMAIL>', 'recent', 'rooms', 'meeting', 'event' or 'schedule')";

const COMMAND_KEY: &str = "command";

pub fn prompt() -> Result<StepAction, Error> {
    Ok(StepAction::BeginDialog(WaterfallId::SignIn))
}

pub fn login(ctx: &mut StepContext<'_>, result: DialogResult) -> Result<StepAction, Error> {
    match result {
        DialogResult::Token(_) => {
            ctx.send_text("You are now logged in.");
            Ok(StepAction::Prompt(COMMAND_MENU.to_string()))
        }
        _ => {
            ctx.send_text("Login was not successful please try again.");
            Ok(StepAction::End(DialogResult::None))
        }
    }
}

pub fn command(ctx: &mut StepContext<'_>, result: DialogResult) -> Result<StepAction, Error> {
    let utterance = result.text().unwrap_or_default().to_string();
    let routed = route(&utterance);
    debug!("[{}] '{}' routed to {:?}", ctx.conversation_id, utterance, routed);
    ctx.values.insert(COMMAND_KEY.to_string(), utterance);

    match routed {
        Some(cmd) if cmd.verb == Verb::Meeting => Ok(StepAction::BeginDialog(WaterfallId::Meeting)),
        // every other command runs on a freshly fetched token
        _ => Ok(StepAction::BeginDialog(WaterfallId::SignIn)),
    }
}

pub async fn process(
    dialogs: &BotDialogs,
    ctx: &mut StepContext<'_>,
    result: DialogResult,
) -> Result<StepAction, Error> {
    let Some(token) = result.into_token() else {
        ctx.send_text("We couldn't log you in. Please try again later.");
        return Ok(StepAction::End(DialogResult::None));
    };

    let utterance = ctx.values.get(COMMAND_KEY).cloned().unwrap_or_default();
    let Some(cmd) = route(&utterance) else {
        debug!("[{}] nothing to do for '{}'", ctx.conversation_id, utterance);
        return Ok(StepAction::End(DialogResult::None));
    };

    info!("[{}] running '{}' for '{}'", ctx.conversation_id, cmd.verb, ctx.user_id);
    let command_ctx = CommandContext {
        directory: dialogs.directory.as_ref(),
        orchestrator: &dialogs.orchestrator,
        config: &dialogs.config,
        token: &token,
    };
    let replies = handle_builtin_command(&cmd, &command_ctx, ctx.form).await?;
    for reply in replies {
        ctx.send_reply(reply);
    }
    Ok(StepAction::End(DialogResult::None))
}
