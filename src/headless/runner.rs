//! Headless scenario execution
//!
//! Steps a gilding scenario at a fixed tick rate without any graphical output.
//! The app is driven with `app.update()` directly so the result can be read
//! back out of the world once the last tick has run.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::ability::{AbilityHolder, EyeOffset};
use crate::affliction::constants::DEFAULT_EYE_HEIGHT;
use crate::affliction::events::{ContactEvent, RoundEnded, RoundStarted};
use crate::affliction::log::{AfflictionLog, AfflictionLogEventType};
use crate::affliction::state::AfflictionRegistry;
use crate::affliction::target::{Character, Gildable, MovementControl, ViewerId};
use crate::settings::GildingSettings;
use crate::systems::{GildingPhase, GildingPlugin};
use crate::visual::{Gilded, OverrideBuffer};

use super::config::{HolderSpec, ScenarioConfig, TargetSpec};

/// Result of a completed headless scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Ticks simulated
    pub ticks: u32,
    /// Simulated seconds at the last tick
    pub elapsed: f32,
    /// Every gildable target, in spawn order
    pub targets: Vec<TargetResult>,
    /// Fresh gildings over the whole run
    pub applied: usize,
    /// Records deleted over the whole run
    pub removed: usize,
    /// View commands handed to viewers
    pub view_commands_delivered: usize,
}

impl ScenarioResult {
    pub fn target(&self, name: &str) -> Option<&TargetResult> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn gilded_count(&self) -> usize {
        self.targets.iter().filter(|t| t.gilded).count()
    }
}

/// Final state of one target
#[derive(Debug, Clone)]
pub struct TargetResult {
    pub name: String,
    /// Still has a gilding record
    pub gilded: bool,
    /// Countdown running at the end
    pub armed: bool,
    /// Seconds left on the countdown, if armed
    pub remaining: Option<f32>,
    /// `None` for targets that cannot move
    pub speed_multiplier: Option<f32>,
    pub parts: usize,
    /// Sub-objects currently showing the gold override
    pub gilded_parts: usize,
}

/// Per-tick movement for scripted entities, in units per second.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec3);

/// Resource to track headless scenario state
#[derive(Resource)]
pub struct HeadlessScenarioState {
    pub config: ScenarioConfig,
    /// Index of the tick currently being simulated
    pub tick: u32,
    /// View commands handed to viewers so far
    pub delivered: usize,
}

/// Plugin for headless scenario execution
pub struct HeadlessPlugin {
    pub config: ScenarioConfig,
    pub settings: GildingSettings,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GildingPlugin {
            settings: self.settings.clone(),
        })
        .insert_resource(HeadlessScenarioState {
            config: self.config.clone(),
            tick: 0,
            delivered: 0,
        });

        app.add_systems(Startup, headless_setup_scenario)
            .add_systems(
                Update,
                (headless_move_entities, headless_inject_contacts)
                    .chain()
                    .after(GildingPhase::Lifecycle)
                    .before(GildingPhase::Triggers),
            )
            .add_systems(
                Update,
                (headless_deliver_view_commands, headless_advance_tick)
                    .chain()
                    .after(GildingPhase::Sync),
            );
    }
}

/// Spawn holders, targets and scattered props, then start the round.
fn headless_setup_scenario(
    mut commands: Commands,
    state: Res<HeadlessScenarioState>,
    settings: Res<GildingSettings>,
    mut log: ResMut<AfflictionLog>,
    mut rounds: EventWriter<RoundStarted>,
) {
    let config = &state.config;
    log.clear();
    log.log(
        AfflictionLogEventType::RoundEvent,
        None,
        "Scenario started (headless mode)".to_string(),
    );

    for holder in &config.holders {
        spawn_holder(&mut commands, holder, &settings);
    }
    for target in &config.targets {
        spawn_target(&mut commands, target);
    }

    if let Some(scatter) = config.scatter {
        info!("Scattering {} prop(s) with seed {}", scatter.count, scatter.seed);
        let mut rng = StdRng::seed_from_u64(scatter.seed);
        for i in 0..scatter.count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = scatter.radius * rng.gen::<f32>().sqrt();
            commands.spawn((
                Name::new(format!("prop-{}", i)),
                Gildable,
                Transform::from_xyz(distance * angle.cos(), 0.0, distance * angle.sin()),
            ));
        }
    }

    rounds.send(RoundStarted);
    info!(
        "Headless scenario setup complete: {} holder(s), {} target(s)",
        config.holders.len(),
        config.targets.len()
    );
}

fn spawn_holder(commands: &mut Commands, spec: &HolderSpec, settings: &GildingSettings) {
    let config = spec.ability.clone().unwrap_or_else(|| settings.ability.clone());
    let eye_height = spec.eye_height.unwrap_or(DEFAULT_EYE_HEIGHT);
    commands.spawn((
        Name::new(spec.name.clone()),
        AbilityHolder { config },
        EyeOffset(Vec3::Y * eye_height),
        Transform::from_translation(Vec3::from_array(spec.position)).with_scale(Vec3::splat(spec.scale)),
        Velocity(Vec3::from_array(spec.velocity)),
    ));
}

fn spawn_target(commands: &mut Commands, spec: &TargetSpec) {
    let mut entity = commands.spawn((
        Name::new(spec.name.clone()),
        Gildable,
        Transform::from_translation(Vec3::from_array(spec.position)),
        Velocity(Vec3::from_array(spec.velocity)),
    ));
    if let Some(viewer) = spec.viewer {
        entity.insert(Character {
            viewer: ViewerId(viewer),
        });
    }
    if let Some(speed_multiplier) = spec.speed_multiplier {
        entity.insert(MovementControl { speed_multiplier });
    }
    if spec.parts > 0 {
        let name = spec.name.clone();
        entity.with_children(|parent| {
            for i in 0..spec.parts {
                parent.spawn(Name::new(format!("{}/part-{}", name, i)));
            }
        });
    }
}

/// Move scripted entities along their velocity.
fn headless_move_entities(time: Res<Time>, mut movers: Query<(&mut Transform, &Velocity)>) {
    let dt = time.delta_secs();
    for (mut transform, velocity) in movers.iter_mut() {
        transform.translation += velocity.0 * dt;
    }
}

/// Deliver the contacts scripted for this tick.
fn headless_inject_contacts(
    state: Res<HeadlessScenarioState>,
    named: Query<(Entity, &Name)>,
    mut contacts: EventWriter<ContactEvent>,
) {
    let due: Vec<_> = state
        .config
        .contacts
        .iter()
        .filter(|c| c.tick == state.tick)
        .collect();
    if due.is_empty() {
        return;
    }

    let by_name: HashMap<&str, Entity> = named.iter().map(|(e, n)| (n.as_str(), e)).collect();
    for contact in due {
        let (Some(&holder), Some(&other)) = (
            by_name.get(contact.holder.as_str()),
            by_name.get(contact.target.as_str()),
        ) else {
            warn!(
                "Scripted contact {} -> {} names a missing entity",
                contact.holder, contact.target
            );
            continue;
        };
        debug!("Tick {}: {:?} contact {} -> {}", state.tick, contact.phase, contact.holder, contact.target);
        contacts.send(ContactEvent {
            holder,
            other,
            phase: contact.phase,
        });
    }
}

/// Stand-in transport: hand every queued view command to its viewer.
fn headless_deliver_view_commands(
    mut buffer: ResMut<OverrideBuffer>,
    mut state: ResMut<HeadlessScenarioState>,
) {
    let viewers: Vec<ViewerId> = buffer.outbox.viewers().collect();
    for viewer in viewers {
        for command in buffer.outbox.drain(viewer) {
            debug!("Viewer {:?} <- {:?}", viewer, command);
            state.delivered += 1;
        }
    }
}

fn headless_advance_tick(mut state: ResMut<HeadlessScenarioState>) {
    state.tick += 1;
}

/// Build the scenario app without running it.
pub fn build_scenario_app(config: ScenarioConfig, settings: GildingSettings) -> Result<App, String> {
    config.validate()?;
    settings.validate()?;

    let tick = Duration::from_secs_f32(config.tick_seconds());
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(HierarchyPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .add_plugins(HeadlessPlugin { config, settings });

    // Slow tick rates must not be clamped by the virtual clock
    {
        let mut virtual_time = app.world_mut().resource_mut::<Time<Virtual>>();
        let max_delta = virtual_time.max_delta().max(tick);
        virtual_time.set_max_delta(max_delta);
    }

    Ok(app)
}

/// Step a built scenario app to completion and collect the result.
pub fn run_scenario_app(app: &mut App) -> Result<ScenarioResult, String> {
    let (ticks, end_round) = {
        let state = app
            .world()
            .get_resource::<HeadlessScenarioState>()
            .ok_or_else(|| "app was not built with HeadlessPlugin".to_string())?;
        (state.config.ticks, state.config.end_round)
    };

    app.finish();
    app.cleanup();
    for _ in 0..ticks {
        app.update();
    }
    if end_round {
        app.world_mut().send_event(RoundEnded);
        app.update();
    }

    Ok(collect_result(app.world_mut(), ticks))
}

fn collect_result(world: &mut World, ticks: u32) -> ScenarioResult {
    let now = world.resource::<Time>().elapsed_secs();

    let mut query =
        world.query_filtered::<(Entity, &Name, Option<&MovementControl>, Option<&Children>), With<Gildable>>();
    let mut rows: Vec<(Entity, String, Option<f32>, Vec<Entity>)> = query
        .iter(world)
        .map(|(entity, name, movement, children)| {
            (
                entity,
                name.to_string(),
                movement.map(|m| m.speed_multiplier),
                children.map(|c| c.to_vec()).unwrap_or_default(),
            )
        })
        .collect();
    rows.sort_by_key(|(entity, ..)| *entity);

    let registry = world.resource::<AfflictionRegistry>();
    let targets = rows
        .into_iter()
        .map(|(entity, name, speed_multiplier, parts)| {
            let state = registry.get(entity);
            TargetResult {
                name,
                gilded: state.is_some(),
                armed: state.is_some_and(|s| s.timer_armed),
                remaining: state.and_then(|s| s.remaining(now)),
                speed_multiplier,
                parts: parts.len(),
                gilded_parts: parts
                    .iter()
                    .filter(|part| world.get::<Gilded>(**part).is_some())
                    .count(),
            }
        })
        .collect();

    let log = world.resource::<AfflictionLog>();
    let delivered = world.resource::<HeadlessScenarioState>().delivered;
    ScenarioResult {
        ticks,
        elapsed: now,
        targets,
        applied: log.count(AfflictionLogEventType::Applied),
        removed: log.count(AfflictionLogEventType::Removed),
        view_commands_delivered: delivered,
    }
}

/// Run a headless scenario, print a summary and save the log if asked to.
pub fn run_headless_scenario(config: ScenarioConfig, settings: GildingSettings) -> Result<ScenarioResult, String> {
    println!("Starting headless gilding scenario...");
    println!("  Holders: {}", config.holders.len());
    println!("  Targets: {}", config.targets.len());
    if let Some(scatter) = config.scatter {
        println!("  Scattered props: {} (seed {})", scatter.count, scatter.seed);
    }
    println!("  Ticks: {} at {:.1} Hz", config.ticks, config.tick_rate);

    let output_path = config.output_path.clone();
    let mut app = build_scenario_app(config, settings)?;
    app.add_plugins(LogPlugin::default());
    let result = run_scenario_app(&mut app)?;

    println!(
        "Scenario complete after {:.1}s: {} gilding(s), {} removal(s), {} still gilded",
        result.elapsed,
        result.applied,
        result.removed,
        result.gilded_count()
    );
    for target in &result.targets {
        println!(
            "  {:<16} gilded: {:<5} armed: {:<5} speed: {}",
            target.name,
            target.gilded,
            target.armed,
            target
                .speed_multiplier
                .map_or_else(|| "-".to_string(), |s| format!("{:.2}", s))
        );
    }

    if let Some(path) = output_path {
        app.world()
            .resource::<AfflictionLog>()
            .save_to_file(Path::new(&path))
            .map_err(|e| format!("Failed to save affliction log: {}", e))?;
        println!("Log saved to: {}", path);
    }

    Ok(result)
}
