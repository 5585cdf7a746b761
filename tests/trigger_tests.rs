//! Integration tests for the trigger strategies
//!
//! Verifies proximity scans (range, scale, arming policy), that a holder
//! never gilds itself, that overlapping holders share one record, and that a
//! scan passing over a touched target leaves the contact hold in place.

use bevy::prelude::*;
use std::time::Duration;

use gilding::ability::{AbilityConfig, AbilityHolder, EyeOffset, ScanArming};
use gilding::affliction::{
    AfflictionLog, AfflictionLogEventType, AfflictionRegistry, ContactEvent, ContactPhase, Gildable, RoundStarted,
};
use gilding::systems::GildingPlugin;
use gilding::trigger::TriggerStrategy;
use gilding::visual::Gilded;

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(GildingPlugin::default());
    app.init_resource::<Time>();
    app
}

fn step(app: &mut App, secs: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
    app.update();
}

fn spawn_scanner(app: &mut App, config: AbilityConfig, at: Vec3) -> Entity {
    app.world_mut()
        .spawn((AbilityHolder { config }, Transform::from_translation(at)))
        .id()
}

fn spawn_prop(app: &mut App, at: Vec3) -> Entity {
    app.world_mut().spawn((Gildable, Transform::from_translation(at))).id()
}

fn registry(app: &App) -> &AfflictionRegistry {
    app.world().resource::<AfflictionRegistry>()
}

#[test]
fn test_scan_gilds_only_within_radius() {
    let mut app = test_app();
    spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    // scan centre sits half way up the default eye height, 32 units up
    let near = spawn_prop(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let far = spawn_prop(&mut app, Vec3::new(100.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert!(registry(&app).contains(near));
    assert!(!registry(&app).contains(far));
    assert!(app.world().get::<Gilded>(near).is_some());
}

#[test]
fn test_scan_radius_grows_with_scale() {
    let mut app = test_app();
    let holder = spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    app.world_mut()
        .entity_mut(holder)
        .insert(Transform::from_scale(Vec3::splat(3.0)));
    let prop = spawn_prop(&mut app, Vec3::new(100.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert!(registry(&app).contains(prop));
}

#[test]
fn test_eye_offset_moves_scan_centre() {
    let mut app = test_app();
    let holder = spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    app.world_mut()
        .entity_mut(holder)
        .insert(EyeOffset(Vec3::new(0.0, 200.0, 0.0)));
    let ground = spawn_prop(&mut app, Vec3::new(10.0, 0.0, 0.0));
    let ledge = spawn_prop(&mut app, Vec3::new(0.0, 100.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert!(!registry(&app).contains(ground));
    assert!(registry(&app).contains(ledge));
}

#[test]
fn test_holder_never_gilds_itself() {
    let mut app = test_app();
    let holder = spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    app.world_mut().entity_mut(holder).insert(Gildable);

    app.world_mut().send_event(RoundStarted);
    app.update();
    app.world_mut().send_event(ContactEvent {
        holder,
        other: holder,
        phase: ContactPhase::Began,
    });
    step(&mut app, 1.0);

    assert!(registry(&app).is_empty());
}

#[test]
fn test_target_held_in_view_then_counts_down_after_leaving() {
    let mut app = test_app();
    spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    let prop = spawn_prop(&mut app, Vec3::new(10.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();
    for _ in 0..40 {
        step(&mut app, 1.0);
    }
    // seen every tick for 40s, longer than the object countdown
    let state = registry(&app).get(prop).cloned().unwrap();
    assert!(!state.timer_armed);

    app.world_mut().get_mut::<Transform>(prop).unwrap().translation.x = 500.0;
    step(&mut app, 1.0);
    let state = registry(&app).get(prop).cloned().unwrap();
    assert!(state.timer_armed);
    assert_eq!(state.expires_at, Some(71.0));
    assert_eq!(app.world().resource::<AfflictionLog>().count(AfflictionLogEventType::Armed), 1);

    step(&mut app, 29.5);
    assert!(registry(&app).contains(prop));
    step(&mut app, 0.5);
    assert!(!registry(&app).contains(prop));
    assert!(app.world().get::<Gilded>(prop).is_none());
}

#[test]
fn test_target_coming_back_into_view_cancels_countdown() {
    let mut app = test_app();
    spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    let prop = spawn_prop(&mut app, Vec3::new(10.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();

    app.world_mut().get_mut::<Transform>(prop).unwrap().translation.x = 500.0;
    step(&mut app, 1.0);
    assert!(registry(&app).get(prop).unwrap().timer_armed);

    app.world_mut().get_mut::<Transform>(prop).unwrap().translation.x = 10.0;
    step(&mut app, 1.0);
    assert!(!registry(&app).get(prop).unwrap().timer_armed);

    step(&mut app, 60.0);
    assert!(registry(&app).contains(prop));
}

#[test]
fn test_on_scan_arming_restarts_countdown_each_scan() {
    let mut app = test_app();
    let config = AbilityConfig {
        scan_arming: ScanArming::OnScan,
        ..Default::default()
    };
    spawn_scanner(&mut app, config, Vec3::ZERO);
    let prop = spawn_prop(&mut app, Vec3::new(10.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();
    assert_eq!(registry(&app).get(prop).unwrap().expires_at, Some(30.0));

    step(&mut app, 10.0);
    assert_eq!(registry(&app).get(prop).unwrap().expires_at, Some(40.0));
    assert_eq!(
        app.world().resource::<AfflictionLog>().count(AfflictionLogEventType::Refreshed),
        1
    );
}

#[test]
fn test_two_holders_same_tick_share_one_record() {
    let mut app = test_app();
    let on_scan = AbilityConfig {
        scan_arming: ScanArming::OnScan,
        ..Default::default()
    };
    spawn_scanner(&mut app, on_scan.clone(), Vec3::new(-5.0, 0.0, 0.0));
    spawn_scanner(&mut app, on_scan, Vec3::new(5.0, 0.0, 0.0));
    let prop = spawn_prop(&mut app, Vec3::ZERO);

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert_eq!(registry(&app).len(), 1);
    let state = registry(&app).get(prop).cloned().unwrap();
    assert!(state.active);
    assert!(state.timer_armed);
    assert_eq!(state.expires_at, Some(30.0));

    let log = app.world().resource::<AfflictionLog>();
    assert_eq!(log.count(AfflictionLogEventType::Applied), 1);
    assert_eq!(log.count(AfflictionLogEventType::Refreshed), 1);
}

#[test]
fn test_two_default_holders_same_tick_share_one_record() {
    let mut app = test_app();
    spawn_scanner(&mut app, AbilityConfig::default(), Vec3::new(-5.0, 0.0, 0.0));
    spawn_scanner(&mut app, AbilityConfig::default(), Vec3::new(5.0, 0.0, 0.0));
    let prop = spawn_prop(&mut app, Vec3::ZERO);

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert_eq!(registry(&app).len(), 1);
    let state = registry(&app).get(prop).cloned().unwrap();
    assert!(state.active);
    assert!(!state.timer_armed);
    assert!(app.world().get::<Gilded>(prop).is_some());

    let log = app.world().resource::<AfflictionLog>();
    assert_eq!(log.count(AfflictionLogEventType::Applied), 1);
    assert_eq!(log.count(AfflictionLogEventType::Refreshed), 0);
}

/// A contact holder touching a vase, and a scanner at the origin the vase
/// drifts past for one tick.
fn touched_vase_passing_scanner(app: &mut App, scanner: AbilityConfig) -> (Entity, Entity) {
    let hand = spawn_scanner(app, AbilityConfig::contact(), Vec3::new(1000.0, 0.0, 0.0));
    spawn_scanner(app, scanner, Vec3::ZERO);
    let vase = spawn_prop(app, Vec3::new(500.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();
    app.world_mut().send_event(ContactEvent {
        holder: hand,
        other: vase,
        phase: ContactPhase::Began,
    });
    app.update();
    assert!(registry(app).contains(vase));

    app.world_mut().get_mut::<Transform>(vase).unwrap().translation.x = 10.0;
    step(app, 1.0);
    app.world_mut().get_mut::<Transform>(vase).unwrap().translation.x = 500.0;
    step(app, 1.0);
    (hand, vase)
}

#[test]
fn test_scan_passing_over_touched_target_keeps_contact_hold() {
    let mut app = test_app();
    let (hand, vase) = touched_vase_passing_scanner(&mut app, AbilityConfig::default());

    // still touching, longer than the object countdown
    for _ in 0..40 {
        step(&mut app, 1.0);
    }
    let state = registry(&app).get(vase).cloned().unwrap();
    assert!(!state.timer_armed);
    assert!(app.world().get::<Gilded>(vase).is_some());
    assert_eq!(app.world().resource::<AfflictionLog>().count(AfflictionLogEventType::Armed), 0);

    app.world_mut().send_event(ContactEvent {
        holder: hand,
        other: vase,
        phase: ContactPhase::Ended,
    });
    step(&mut app, 1.0);
    let state = registry(&app).get(vase).cloned().unwrap();
    assert!(state.timer_armed);
    assert_eq!(state.expires_at, Some(73.0));
}

#[test]
fn test_on_scan_holder_does_not_arm_touched_target() {
    let mut app = test_app();
    let on_scan = AbilityConfig {
        scan_arming: ScanArming::OnScan,
        ..Default::default()
    };
    let (_, vase) = touched_vase_passing_scanner(&mut app, on_scan);

    for _ in 0..40 {
        step(&mut app, 1.0);
    }
    assert!(registry(&app).contains(vase));
    assert!(!registry(&app).get(vase).unwrap().timer_armed);
    assert_eq!(
        app.world().resource::<AfflictionLog>().count(AfflictionLogEventType::Refreshed),
        0
    );
}

#[test]
fn test_despawned_contact_holder_releases_target() {
    let mut app = test_app();
    let hand = spawn_scanner(&mut app, AbilityConfig::contact(), Vec3::new(1000.0, 0.0, 0.0));
    let vase = spawn_prop(&mut app, Vec3::new(500.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();
    app.world_mut().send_event(ContactEvent {
        holder: hand,
        other: vase,
        phase: ContactPhase::Began,
    });
    app.update();

    app.world_mut().despawn(hand);
    step(&mut app, 1.0);
    let state = registry(&app).get(vase).cloned().unwrap();
    assert!(state.timer_armed);
    assert_eq!(state.expires_at, Some(31.0));
}

#[test]
fn test_scanner_ignores_contact_events() {
    let mut app = test_app();
    let holder = spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    let far = spawn_prop(&mut app, Vec3::new(500.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();
    app.world_mut().send_event(ContactEvent {
        holder,
        other: far,
        phase: ContactPhase::Began,
    });
    app.update();

    assert!(!registry(&app).contains(far));
}

#[test]
fn test_contact_holder_does_not_scan() {
    let mut app = test_app();
    spawn_scanner(&mut app, AbilityConfig::contact(), Vec3::ZERO);
    let near = spawn_prop(&mut app, Vec3::new(1.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert!(!registry(&app).contains(near));
}

#[test]
fn test_round_start_counts_only_installed_holders() {
    let mut app = test_app();
    spawn_scanner(&mut app, AbilityConfig::default(), Vec3::ZERO);
    let broken = AbilityConfig {
        radius: 0.0,
        ..Default::default()
    };
    let skipped = spawn_scanner(&mut app, broken, Vec3::new(100.0, 0.0, 0.0));

    app.world_mut().send_event(RoundStarted);
    app.update();

    assert!(app.world().get::<TriggerStrategy>(skipped).is_none());
    let log = app.world().resource::<AfflictionLog>();
    let rounds = log.filter_by_type(AfflictionLogEventType::RoundEvent);
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].message, "Round started with 1 ability holder(s)");
}
