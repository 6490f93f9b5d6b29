use super::*;

fn quiet_config() -> Config {
    Config {
        chat_restricted: false,
        roster_hidden: false,
        equipment_effect_enabled: false,
        ..base_config()
    }
}

fn waypoint(name: &str, owner: &str, x: f64) -> Destination {
    Destination {
        name: name.to_string(),
        owner: owner.to_string(),
        location: Location::new("world", x, 70.0, 0.0),
    }
}

fn with_waypoints(config: Config) -> Dispatcher<RecordingHost> {
    let mut store = DestinationStore::new();
    store.insert(waypoint("gate", "Steve", 10.0)).unwrap();
    store.insert(waypoint("mine", "alex", 20.0)).unwrap();
    store.insert(waypoint("farm", "steve", 30.0)).unwrap();
    store.insert(waypoint("tower", "STEVE", 40.0)).unwrap();
    Dispatcher::initialize(CURRENT, config, RecordingHost::default(), store).unwrap()
}

#[test]
fn test_tier_is_detected_once_from_the_version_string() {
    let cases = [
        (BASELINE, Tier::Baseline),
        ("1.12.2", Tier::Baseline),
        ("1.13", Tier::Intermediate),
        (INTERMEDIATE, Tier::Intermediate),
        ("1.19.4", Tier::Intermediate),
        (CURRENT, Tier::Current),
        ("1.21.1-R0.1-SNAPSHOT", Tier::Current),
        ("not a version", Tier::Baseline),
        ("", Tier::Baseline),
    ];
    for (version, expected) in cases {
        assert_eq!(dispatcher(version, quiet_config()).tier(), expected, "{version}");
    }
}

#[test]
fn test_entities_online_at_startup_are_set_up() {
    let mut host = RecordingHost::default();
    let alice = entity(1);
    host.join(alice, "alice", spawn());
    host.wear(alice, EquipmentSlot::Helmet, Some("IRON_HELMET"));

    let config = Config {
        chat_restricted: false,
        countdown_enabled: false,
        ..base_config()
    };
    let d = Dispatcher::initialize(CURRENT, config, host, DestinationStore::new()).unwrap();
    assert!(d.is_active(alice, TaskKind::EquipmentEffect));
    assert!(d.is_active(alice, TaskKind::RosterHide));
    assert!(d.host().roster_hidden.contains(&alice));
}

#[test]
fn test_release_notice_reaches_privileged_entities_only() {
    let mut d = dispatcher(CURRENT, quiet_config());
    let admin = entity_ref(1, "admin");
    d.host_mut().join(admin.id, "admin", spawn());
    d.host_mut().grant(admin.id, "warden.update.notify");
    d.handle_event(&PlatformEvent::Join {
        entity: admin.clone(),
    });
    let player = join(&mut d, 2, "player");

    d.set_release_notice(Some("Version 2.1.0 is available.".to_string()));
    assert_eq!(d.release_notice(), Some("Version 2.1.0 is available."));
    assert_eq!(
        d.host().messages_of(admin.id, NotifyKind::Info),
        vec!["Version 2.1.0 is available."]
    );
    assert!(d.host().messages_of(player, NotifyKind::Info).is_empty());

    // Later joins with the permission are told on join.
    let late = entity_ref(3, "moderator");
    d.host_mut().join(late.id, "moderator", spawn());
    d.host_mut().grant(late.id, "warden.update.notify");
    d.handle_event(&PlatformEvent::Join { entity: late.clone() });
    assert_eq!(d.host().messages_of(late.id, NotifyKind::Info).len(), 1);
}

#[test]
fn test_absent_release_notice_stays_silent() {
    let mut d = dispatcher(CURRENT, quiet_config());
    let admin = join(&mut d, 1, "admin");
    d.host_mut().grant(admin, "warden.update.notify");
    d.set_release_notice(None);
    assert!(d.host().notifications.is_empty());
    assert_eq!(d.release_notice(), None);
}

#[test]
fn test_first_and_last_follow_registration_order() {
    let mut d = with_waypoints(quiet_config());
    let id = join(&mut d, 1, "alice");

    let chosen = d
        .teleport_to_owner(id, "steve", Some(DestinationPolicy::Last))
        .unwrap();
    assert_eq!(chosen.name, "tower");
    d.cancel_freeze(id);

    let chosen = d
        .teleport_to_owner(id, "STEVE", Some(DestinationPolicy::First))
        .unwrap();
    assert_eq!(chosen.name, "gate");
    assert!(d.is_frozen(id));
}

#[test]
fn test_configured_policy_applies_when_none_is_given() {
    let config = Config {
        multi_destination_policy: DestinationPolicy::Last,
        ..quiet_config()
    };
    let mut d = with_waypoints(config);
    let id = join(&mut d, 1, "alice");

    let outcome = d.apply(AdminCommand::ResolveAndTeleport {
        entity: id,
        owner: "Steve".to_string(),
        policy: None,
    });
    match outcome {
        CommandOutcome::Resolved(destination) => assert_eq!(destination.name, "tower"),
        other => panic!("unexpected outcome {other:?}"),
    }

    run_ticks(&mut d, 5);
    assert_eq!(
        d.host().position(id),
        Some(Location::new("world", 40.0, 70.0, 0.0))
    );
}

#[test]
fn test_random_policy_stays_within_candidates() {
    let mut d = with_waypoints(quiet_config());
    let id = join(&mut d, 1, "alice");
    for _ in 0..20 {
        let chosen = d
            .teleport_to_owner(id, "steve", Some(DestinationPolicy::Random))
            .unwrap();
        assert!(["gate", "farm", "tower"].contains(&chosen.name.as_str()));
        d.cancel_freeze(id);
    }
}

#[test]
fn test_unknown_owner_and_empty_candidates_are_rejected() {
    let mut d = with_waypoints(quiet_config());
    let id = join(&mut d, 1, "alice");

    assert_eq!(
        d.teleport_to_owner(id, "herobrine", None),
        Err(Rejection::NoCandidates("herobrine".to_string()))
    );
    assert_eq!(
        d.resolve_and_teleport(id, &[], DestinationPolicy::First),
        Err(Rejection::EmptyCandidates)
    );
    assert!(!d.is_frozen(id));
}

#[test]
fn test_destinations_can_be_added_and_removed() {
    let mut d = with_waypoints(quiet_config());
    assert_eq!(
        d.add_destination(waypoint("GATE", "alex", 0.0)),
        Err(Rejection::DuplicateDestination("GATE".to_string()))
    );
    d.add_destination(waypoint("lake", "alex", 50.0)).unwrap();
    assert_eq!(d.destinations().candidates_for("alex").len(), 2);

    let removed = d.remove_destination("Mine").unwrap();
    assert_eq!(removed.name, "mine");
    assert_eq!(
        d.remove_destination("mine"),
        Err(Rejection::UnknownDestination("mine".to_string()))
    );
}

#[test]
fn test_reload_rederives_the_equipment_rule() {
    let config = Config {
        chat_restricted: false,
        roster_hidden: false,
        countdown_enabled: false,
        ..base_config()
    };
    let mut d = dispatcher(CURRENT, config.clone());
    let id = join(&mut d, 1, "alice");
    d.host_mut().wear(id, EquipmentSlot::Helmet, Some("IRON_HELMET"));
    assert_eq!(
        d.apply(AdminCommand::RefreshEquipmentTasks),
        CommandOutcome::Refreshed { active: 1 }
    );

    d.reload(Config {
        equipment_materials: vec!["netherite_helmet".to_string()],
        ..config
    });
    assert!(!d.is_active(id, TaskKind::EquipmentEffect));

    d.host_mut()
        .wear(id, EquipmentSlot::Helmet, Some("NETHERITE_HELMET"));
    assert_eq!(d.refresh_equipment_tasks(), 1);
}

#[test]
fn test_reload_with_new_interval_restarts_the_schedule() {
    let config = Config {
        chat_restricted: false,
        roster_hidden: false,
        countdown_enabled: false,
        ..base_config()
    };
    let mut d = dispatcher(CURRENT, config.clone());
    let id = join(&mut d, 1, "alice");
    d.host_mut().wear(id, EquipmentSlot::Helmet, Some("IRON_HELMET"));
    d.refresh_equipment_tasks();
    run_ticks(&mut d, 15);

    d.reload(Config {
        damage_interval_ticks: 10,
        ..config
    });
    assert!(d.is_active(id, TaskKind::EquipmentEffect));
    run_ticks(&mut d, 9);
    assert_eq!(d.host().damage_count(id), 0);
    run_ticks(&mut d, 1);
    assert_eq!(d.host().damage_count(id), 1);
}

#[test]
fn test_reload_keeps_the_startup_bundle() {
    let mut d = dispatcher(CURRENT, quiet_config());
    assert_eq!(d.bundle().equipment, EquipmentSignal::Disabled);
    d.reload(Config {
        equipment_effect_enabled: true,
        ..quiet_config()
    });
    assert_eq!(d.bundle().equipment, EquipmentSignal::Disabled);
    assert!(d.config().equipment_effect_enabled);
}

#[test]
fn test_shutdown_cancels_everything_and_restores_rosters() {
    let config = Config {
        chat_restricted: false,
        ..base_config()
    };
    let mut d = dispatcher(CURRENT, config);
    let alice = join(&mut d, 1, "alice");
    let bob = join(&mut d, 2, "bob");
    d.host_mut().wear(alice, EquipmentSlot::Helmet, Some("IRON_HELMET"));
    d.refresh_equipment_tasks();
    d.request_countdown_teleport(bob, nether()).unwrap();
    d.handle_event(&PlatformEvent::InventoryClick { entity: alice });

    d.shutdown();
    for kind in TaskKind::ALL {
        assert_eq!(d.active_tasks(kind), 0, "{kind:?}");
    }
    assert!(d.freeze().is_empty());
    assert!(d.host().roster_hidden.is_empty());

    run_ticks(&mut d, 40);
    assert!(d.host().teleports.is_empty());
    assert_eq!(d.host().damage_count(alice), 0);
}
