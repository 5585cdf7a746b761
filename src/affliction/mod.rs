//! Gold affliction core
//!
//! One status effect, at most one record per target:
//! - `state`: `AfflictionState` and the `AfflictionRegistry` resource
//! - `target`: optional capabilities a target may expose
//! - `controller`: the only writer of affliction state
//! - `systems`: the per-target tick
//! - `events` / `log`: notifications and the transition log

pub mod constants;
pub mod controller;
pub mod events;
pub mod log;
pub mod state;
pub mod systems;
pub mod target;

pub use controller::{AfflictionController, Applied, TickOutcome};
pub use events::{AfflictionApplied, AfflictionRemoved, ContactEvent, ContactPhase, RemovalReason, RoundEnded, RoundStarted};
pub use log::{AfflictionLog, AfflictionLogEventType};
pub use state::{AfflictionRegistry, AfflictionState, Hold};
pub use target::{Character, Gildable, MovementControl, Target, ViewerId};
