// tests/conversation_tests.rs

mod test_utils;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use meetbot_common::models::{MeetingField, TokenOutcome};
use meetbot_core::auth::CredentialGate;
use meetbot_core::dialogs::main_dialog::COMMAND_MENU;
use meetbot_core::dialogs::ConversationState;
use meetbot_core::utils::time::today_in;
use meetbot_core::Error;

use test_utils::{FakeDirectory, FakeIdentityProvider, Harness, MAGIC_CODE, SIGN_IN_LINK};

async fn fill_meeting_form(h: &Harness, start: &str, end: &str) -> Vec<String> {
    let mut last = Vec::new();
    for answer in ["Budget review", "Q3 numbers", start, end, "SH-Lotus", "Alice, Bob"] {
        last = h.say(answer).await;
    }
    last
}

#[tokio::test]
async fn test_meeting_is_booked_end_to_end() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());

    // 1) First contact signs in straight away
    assert_eq!(h.say("hi").await, vec!["You are now logged in.".to_string(), COMMAND_MENU.to_string()]);
    assert_eq!(h.service.state("c1").await, ConversationState::AwaitingCommand);

    // 2) The booking questions
    assert_eq!(h.say("meeting").await, vec!["Meeting's subject is?"]);
    assert_eq!(
        h.service.state("c1").await,
        ConversationState::AwaitingMeetingField(MeetingField::Subject)
    );

    // 3) Last answer triggers sign-in, which succeeds silently, then the commit
    let replies = fill_meeting_form(&h, "09:30", "10:00").await;
    assert_eq!(replies, vec!["Meeting 'Budget review' has been booked (id: evt-1)."]);

    let created = h.directory.created_events();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].subject, "Budget review");
    assert_eq!(created[0].location.display_name, "SH-Lotus");
    assert_eq!(created[0].attendees.len(), 2);
    assert_eq!(created[0].attendees[1].email_address.address.as_deref(), Some("bob@corp.example"));
    assert_eq!(created[0].organizer.email_address.address.as_deref(), Some("dana@corp.example"));

    // 4) Back to idle, session gone
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);
    assert_eq!(h.service.active_sessions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_busy_room_is_reported_and_nothing_is_booked() -> Result<(), Error> {
    let directory = FakeDirectory::office().busy_room("room-1", (9, 0), (10, 0));
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), directory);

    h.say("hi").await;
    h.say("meeting").await;
    let replies = fill_meeting_form(&h, "09:30", "09:45").await;

    let day = today_in(chrono_tz::Asia::Shanghai).format("%Y-%m-%d");
    assert_eq!(
        replies,
        vec![format!("Room 'SH-Lotus' is busy at {day} 09:00:00 to {day} 10:00:00.")]
    );
    assert!(h.directory.created_events().is_empty());
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_unknown_participant_aborts_booking() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());
    h.say("hi").await;
    h.say("meeting").await;
    let mut replies = Vec::new();
    for answer in ["Sync", "weekly", "14:00", "15:00", "", "Alice, Ghost"] {
        replies = h.say(answer).await;
    }

    assert_eq!(replies, vec!["Cannot find 'Ghost' in your contacts. Known contacts: Alice"]);
    assert!(h.directory.created_events().is_empty());
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_failed_login_ends_the_session() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::default(), FakeDirectory::office());

    assert_eq!(h.say("hi").await, vec![format!("Please login\n{SIGN_IN_LINK}")]);
    assert_eq!(h.service.state("c1").await, ConversationState::AwaitingLogin);

    assert_eq!(h.say("not-the-code").await, vec!["Login was not successful please try again."]);
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_magic_code_signs_in() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::default(), FakeDirectory::office());
    h.say("hi").await;
    assert_eq!(h.say(MAGIC_CODE).await[0], "You are now logged in.");

    assert_eq!(h.say("me").await, vec!["You are Dana and you report to Morgan."]);
    Ok(())
}

#[tokio::test]
async fn test_token_lost_before_commit_discards_booking() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());
    h.say("hi").await;
    h.say("meeting").await;
    for answer in ["Budget review", "Q3 numbers", "09:30", "10:00", "SH-Lotus"] {
        h.say(answer).await;
    }

    // 1) Token revoked while the form is being filled
    h.provider.tokens.remove("u1");
    assert_eq!(h.say("Alice").await, vec![format!("Please login\n{SIGN_IN_LINK}")]);
    assert_eq!(h.service.state("c1").await, ConversationState::AwaitingLoginForAction);

    // 2) Wrong code: both waterfalls are dropped
    assert_eq!(h.say("nope").await, vec!["We couldn't log you in. Please try again later."]);
    assert!(h.directory.created_events().is_empty());
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_logout_interrupts_any_dialog() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());
    h.say("hi").await;
    h.say("meeting").await;
    h.say("Budget review").await;

    assert_eq!(h.say("Logout").await, vec!["You have been signed out."]);
    assert!(!h.provider.tokens.contains_key("u1"));
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);

    // next message starts over and has to sign in
    assert_eq!(h.say("hi").await, vec![format!("Please login\n{SIGN_IN_LINK}")]);
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_apologizes_and_resets() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());
    h.say("hi").await;

    h.directory.failing.store(true, Ordering::SeqCst);
    assert_eq!(
        h.say("me").await,
        vec!["Sorry, it looks like something went wrong: Platform error: directory unavailable"]
    );
    assert_eq!(h.service.active_sessions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_send_and_unknown_commands() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());

    h.say("hi").await;
    assert_eq!(
        h.say("send carol@example.com please").await,
        vec!["I sent a message to carol@example.com from your account."]
    );
    let sent = h.directory.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "Message from a bot!");
    assert!(sent[0].2.ends_with("Your friend, Dana"));

    // unknown commands are dropped without a word
    h.say("hi").await;
    assert!(h.say("dance").await.is_empty());
    assert_eq!(h.service.state("c1").await, ConversationState::Idle);
    Ok(())
}

#[tokio::test]
async fn test_rooms_lists_known_regions() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());
    h.say("hi").await;
    assert_eq!(
        h.say("rooms").await,
        vec!["rooms[ShangHai]: \nname: Lotus\naddress: SH-Lotus@corp.example"]
    );
    Ok(())
}

#[tokio::test]
async fn test_conversations_do_not_share_state() -> Result<(), Error> {
    let h = Harness::new(FakeIdentityProvider::with_token("u1"), FakeDirectory::office());
    h.say_in("a", "hi").await;
    h.say_in("a", "meeting").await;
    h.say_in("b", "hi").await;

    assert_eq!(
        h.service.state("a").await,
        ConversationState::AwaitingMeetingField(MeetingField::Subject)
    );
    assert_eq!(h.service.state("b").await, ConversationState::AwaitingCommand);
    assert_eq!(h.service.active_sessions(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_turn_waiting_on_a_finishing_session_keeps_its_dialog() -> Result<(), Error> {
    let provider = FakeIdentityProvider::slow("u1", Duration::from_millis(50));
    let h = Harness::new(provider, FakeDirectory::office());
    h.say("hi").await;

    // 1) "me" finishes the dialog while "hello" is queued behind it
    let (first, second) = tokio::join!(h.say("me"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.say("hello").await
    });
    assert_eq!(first, vec!["You are Dana and you report to Morgan."]);
    assert_eq!(second, vec!["You are now logged in.".to_string(), COMMAND_MENU.to_string()]);

    // 2) The dialog "hello" started is the registered one
    assert_eq!(h.service.state("c1").await, ConversationState::AwaitingCommand);
    assert_eq!(h.service.active_sessions(), 1);
    assert_eq!(h.say("me").await, vec!["You are Dana and you report to Morgan."]);
    Ok(())
}

#[tokio::test]
async fn test_request_token_is_not_cached() -> Result<(), Error> {
    let provider = Arc::new(FakeIdentityProvider::with_token("u1"));
    let gate = CredentialGate::new(provider.clone(), Duration::from_secs(5));

    let first = gate.request_token("u1", None).await?;
    let second = gate.request_token("u1", None).await?;
    assert_eq!(first, second);
    assert!(matches!(first, TokenOutcome::Authenticated(_)));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

    provider.tokens.remove("u1");
    assert_eq!(gate.request_token("u1", None).await?, TokenOutcome::Unauthenticated);
    Ok(())
}
