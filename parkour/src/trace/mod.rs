/*!
Shape-cast plumbing shared by every probe.

- types:   math aliases, transforms, cast/contact value types
- settings: numeric guards (what counts as a wall, walkable, negligible)
- query:   the world-query capability implemented by backends
- budget:  per-step cast governor and its stats
- tracer:  budget-gated wrapper every probe casts through
*/

pub mod budget;
pub mod query;
pub mod settings;
pub mod tracer;
pub mod types;

pub use budget::{TelemetrySink, TraceBudget, TraceStats};
pub use query::WorldQuery;
pub use tracer::{BudgetExhausted, TraceResult, Tracer};
pub use types::{
    BodyId, CapsuleSpec, CapsuleTraceSettings, Iso, Quat, TraceHit, TraceShape, Transform, Vec3,
};
