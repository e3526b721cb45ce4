// File: meetbot-core/src/dialogs/sign_in.rs
//! The login waterfall: ask the gate once, and if that fails, show the
//! sign-in link and try again with whatever the user pastes back.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::auth::CredentialGate;
use crate::dialogs::engine::{DialogResult, StepAction, StepContext};
use crate::Error;

const STARTED_AT: &str = "started_at";

pub async fn begin(gate: &CredentialGate, ctx: &mut StepContext<'_>) -> Result<StepAction, Error> {
    if let Some(token) = gate.request_token(ctx.user_id, None).await?.into_token() {
        debug!("[{}] token already available", ctx.conversation_id);
        return Ok(StepAction::End(DialogResult::Token(token)));
    }

    ctx.values.insert(STARTED_AT.to_string(), Utc::now().to_rfc3339());
    let link = gate.sign_in_link(ctx.user_id).await?;
    Ok(StepAction::Prompt(format!("Please login\n{link}")))
}

pub async fn verify(
    gate: &CredentialGate,
    ctx: &mut StepContext<'_>,
    result: DialogResult,
) -> Result<StepAction, Error> {
    if login_expired(ctx.values.get(STARTED_AT).map(String::as_str), gate, Utc::now()) {
        warn!("[{}] sign-in answer arrived after {:?}", ctx.conversation_id, gate.timeout());
        return Ok(StepAction::End(DialogResult::None));
    }

    let code = result.text().map(str::trim).filter(|c| !c.is_empty());
    match gate.request_token(ctx.user_id, code).await?.into_token() {
        Some(token) => {
            info!("[{}] user '{}' signed in", ctx.conversation_id, ctx.user_id);
            Ok(StepAction::End(DialogResult::Token(token)))
        }
        None => Ok(StepAction::End(DialogResult::None)),
    }
}

fn login_expired(started_at: Option<&str>, gate: &CredentialGate, now: DateTime<Utc>) -> bool {
    let Some(started) = started_at.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) else {
        return false;
    };
    match (now - started.with_timezone(&Utc)).to_std() {
        Ok(elapsed) => elapsed > gate.timeout(),
        Err(_) => false,
    }
}
