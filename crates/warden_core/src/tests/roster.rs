use super::*;

fn roster_config() -> Config {
    Config {
        chat_restricted: false,
        equipment_effect_enabled: false,
        countdown_enabled: false,
        ..base_config()
    }
}

#[test]
fn test_join_hides_immediately_and_refreshes_on_interval() {
    let mut d = dispatcher(CURRENT, roster_config());
    let id = join(&mut d, 1, "alice");
    assert!(d.host().roster_hidden.contains(&id));
    assert!(d.is_active(id, TaskKind::RosterHide));
    assert_eq!(d.host().roster_writes, 1);

    run_ticks(&mut d, 20);
    assert_eq!(d.host().roster_writes, 2);
    run_ticks(&mut d, 40);
    assert_eq!(d.host().roster_writes, 4);
}

#[test]
fn test_repeated_join_does_not_duplicate_the_task() {
    let mut d = dispatcher(CURRENT, roster_config());
    let who = entity_ref(1, "alice");
    d.host_mut().join(who.id, "alice", spawn());
    d.handle_event(&PlatformEvent::Join { entity: who.clone() });
    d.handle_event(&PlatformEvent::Join { entity: who.clone() });
    assert_eq!(d.active_tasks(TaskKind::RosterHide), 1);
    assert_eq!(d.host().roster_writes, 1);
}

#[test]
fn test_disabling_by_reload_restores_visibility() {
    let mut d = dispatcher(CURRENT, roster_config());
    let alice = join(&mut d, 1, "alice");
    let bob = join(&mut d, 2, "bob");

    d.apply(AdminCommand::Reload {
        config: Box::new(Config {
            roster_hidden: false,
            ..roster_config()
        }),
    });
    assert_eq!(d.active_tasks(TaskKind::RosterHide), 0);
    assert!(!d.host().roster_hidden.contains(&alice));
    assert!(!d.host().roster_hidden.contains(&bob));

    let writes = d.host().roster_writes;
    run_ticks(&mut d, 60);
    assert_eq!(d.host().roster_writes, writes);
}

#[test]
fn test_enabling_by_reload_hides_everyone_online() {
    let config = Config {
        roster_hidden: false,
        ..roster_config()
    };
    let mut d = dispatcher(CURRENT, config);
    let alice = join(&mut d, 1, "alice");
    assert!(!d.is_active(alice, TaskKind::RosterHide));

    d.reload(roster_config());
    assert!(d.is_active(alice, TaskKind::RosterHide));
    assert!(d.host().roster_hidden.contains(&alice));
}

#[test]
fn test_changed_refresh_interval_reschedules() {
    let mut d = dispatcher(CURRENT, roster_config());
    let id = join(&mut d, 1, "alice");
    run_ticks(&mut d, 10);

    d.reload(Config {
        roster_refresh_ticks: 5,
        ..roster_config()
    });
    assert!(d.is_active(id, TaskKind::RosterHide));
    assert!(d.host().roster_hidden.contains(&id));

    let writes = d.host().roster_writes;
    run_ticks(&mut d, 5);
    assert_eq!(d.host().roster_writes, writes + 1);
}

#[test]
fn test_quit_cancels_without_touching_the_departed_entity() {
    let mut d = dispatcher(CURRENT, roster_config());
    let id = join(&mut d, 1, "alice");
    let writes = d.host().roster_writes;

    quit(&mut d, id);
    assert!(!d.is_active(id, TaskKind::RosterHide));
    assert_eq!(d.host().roster_writes, writes);
    run_ticks(&mut d, 40);
    assert_eq!(d.host().roster_writes, writes);
}
