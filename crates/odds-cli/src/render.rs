//! Message text posted by the console front-end.

use odds_core::{Action, CustomId, ExpireReason, Session};
use std::time::Duration;

fn mention(user_id: &str) -> String {
    format!("@{user_id}")
}

fn button(label: &str, action: Action, game_id: &str) -> String {
    format!("[{label}: {}]", CustomId::new(action, game_id))
}

pub fn challenge_sent(target_id: &str) -> String {
    format!(
        "Challenge sent to {}. Waiting for them to accept or decline...",
        mention(target_id)
    )
}

pub fn challenge(session: &Session, timeout: Duration) -> String {
    format!(
        "{} challenged {} to **What are the odds?**\n\
         Prompt: \"{}\"\n\
         Range: 1 to **{}**\n\n\
         Only {} can accept/decline. Timeout: {}s.\n\
         {} {}",
        mention(&session.challenger_id),
        mention(&session.target_id),
        session.prompt,
        session.max,
        mention(&session.target_id),
        timeout.as_secs(),
        button("Accept Challenge", Action::Accept, &session.id),
        button("Decline", Action::Decline, &session.id),
    )
}

pub fn accepted(session: &Session) -> String {
    format!(
        "{} accepted!\n\
         Both players must click **Enter Number** and submit a pick from 1 to **{}**.\n\
         Players: {} vs {}\n\
         Prompt: \"{}\"\n\
         {}",
        mention(&session.target_id),
        session.max,
        mention(&session.challenger_id),
        mention(&session.target_id),
        session.prompt,
        button("Enter Number", Action::Enter, &session.id),
    )
}

pub fn declined(session: &Session) -> String {
    format!(
        "{} declined the challenge from {}.",
        mention(&session.target_id),
        mention(&session.challenger_id)
    )
}

pub fn pick_dialog(session: &Session) -> String {
    format!(
        "What are the odds? Enter a number (1-{}): submit {}",
        session.max,
        CustomId::new(Action::Submit, &session.id)
    )
}

pub fn pick_submitted(pick: i64) -> String {
    format!("Your pick `{pick}` has been submitted.")
}

/// Final result once both picks are in. `None` if a pick is missing.
pub fn result(session: &Session, matched: bool) -> Option<String> {
    let challenger_pick = session.challenger_pick?;
    let target_pick = session.target_pick?;
    let line = if matched {
        format!(
            "Numbers matched at **{challenger_pick}**. {} loses and must do: \"{}\"",
            mention(&session.target_id),
            session.prompt
        )
    } else {
        format!(
            "No match. {} chose **{challenger_pick}**, {} chose **{target_pick}**.",
            mention(&session.challenger_id),
            mention(&session.target_id)
        )
    };
    Some(format!(
        "Odds result for {} vs {}:\n{line}",
        mention(&session.challenger_id),
        mention(&session.target_id)
    ))
}

pub fn expired(session: &Session, reason: ExpireReason) -> String {
    let reason_text = match reason {
        ExpireReason::Pending => "Challenge timed out before it was accepted.",
        ExpireReason::Active => "Game timed out before both numbers were submitted.",
    };
    format!(
        "Odds game cancelled: {reason_text} ({} vs {})",
        mention(&session.challenger_id),
        mention(&session.target_id)
    )
}
