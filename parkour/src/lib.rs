pub mod action;
pub mod bitmask_flags;
pub mod body;
pub mod component;
pub mod config;
pub mod constants;
pub mod detection;
pub mod execution;
pub mod hooks;
pub mod ik;
pub mod intent;
pub mod probes;
pub mod rapier_world;
pub mod result;
pub mod snapshot;
pub mod state;
pub mod tags;
pub mod trace;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    ClimbStyle, LogicalState, ParkourAction, Phase, ResultType, Side, TraversalDirection,
};
pub use body::{BodySample, CharacterBody, MovementMode, RootMotionAligner};
pub use component::{ParkourComponent, ParkourContext};
pub use config::{ConfigError, ParkourConfig};
pub use detection::GateRejection;
pub use hooks::{ActivationKind, DefaultHooks, NetRole, ParkourHooks, ParkourListener};
pub use intent::ClimbIntent;
pub use rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
pub use result::{LimbContact, ParkourResult, RuntimeWarpTarget};
pub use snapshot::{ObserverMirror, ParkourSnapshot, SnapshotReader};
pub use state::{AbortReason, StateChange};
pub use tags::{GameplayTag, TagResolver, TagTable};
pub use trace::{
    BodyId, BudgetExhausted, TelemetrySink, TraceShape, TraceStats, Transform, Vec3, WorldQuery,
};
