//! Inbound message routing tests

use relaybot::{Command, Inbound, IncomingMessage};

fn msg(text: &str) -> IncomingMessage {
    IncomingMessage::new(10, 20, 30, text)
}

#[test]
fn test_commands_are_routed_as_commands() {
    assert_eq!(
        Inbound::classify(msg("/start")),
        Inbound::Command(Command::Start, msg("/start"))
    );
    assert_eq!(
        Inbound::classify(msg("/reset")),
        Inbound::Command(Command::Reset, msg("/reset"))
    );
    assert_eq!(
        Inbound::classify(msg("/help@relay_bot")),
        Inbound::Command(Command::Help, msg("/help@relay_bot"))
    );
}

#[test]
fn test_plain_and_unknown_slash_text_go_to_the_model() {
    assert_eq!(Inbound::classify(msg("hello")), Inbound::Text(msg("hello")));
    assert_eq!(Inbound::classify(msg("/weather")), Inbound::Text(msg("/weather")));
}

#[test]
fn test_preview_truncates_long_text() {
    let long = "a".repeat(120);
    let message = msg(&long);
    assert_eq!(message.preview(50).len(), 50);
}
