use super::*;

fn chat_config(restricted: bool) -> Config {
    Config {
        chat_restricted: restricted,
        roster_hidden: false,
        equipment_effect_enabled: false,
        countdown_enabled: false,
        ..base_config()
    }
}

fn say(d: &mut Dispatcher<RecordingHost>, id: EntityId) -> EventOutcome {
    d.handle_event(&PlatformEvent::Chat {
        entity: id,
        message: "hello".to_string(),
    })
}

#[test]
fn test_restricted_chat_is_cancelled_with_a_warning() {
    let mut d = dispatcher(INTERMEDIATE, chat_config(true));
    let id = join(&mut d, 1, "alice");

    assert_eq!(say(&mut d, id), EventOutcome::Cancel);
    assert_eq!(
        d.host().messages_of(id, NotifyKind::Warning),
        vec!["Chat is currently restricted."]
    );
}

#[test]
fn test_bypass_permission_lets_messages_through() {
    let mut d = dispatcher(INTERMEDIATE, chat_config(true));
    let id = join(&mut d, 1, "alice");
    d.host_mut().grant(id, "warden.chat.bypass");

    assert_eq!(say(&mut d, id), EventOutcome::Allow);
    assert!(d.host().messages_of(id, NotifyKind::Warning).is_empty());
}

#[test]
fn test_unrestricted_chat_is_untouched_on_every_tier() {
    for version in [BASELINE, INTERMEDIATE, CURRENT] {
        let mut d = dispatcher(version, chat_config(false));
        let id = join(&mut d, 1, "alice");
        assert_eq!(say(&mut d, id), EventOutcome::Allow, "{version}");
    }
}

#[test]
fn test_reload_toggles_restriction_live() {
    let mut d = dispatcher(CURRENT, chat_config(false));
    let id = join(&mut d, 1, "alice");
    assert_eq!(say(&mut d, id), EventOutcome::Allow);

    d.reload(chat_config(true));
    assert_eq!(say(&mut d, id), EventOutcome::Cancel);

    d.reload(chat_config(false));
    assert_eq!(say(&mut d, id), EventOutcome::Allow);
}
