//! Budget-gated cast wrapper.
//!
//! Detection, the sub-probes and IK never touch a [`WorldQuery`] directly; they go
//! through a [`Tracer`], which charges the shared [`TraceBudget`] before every cast and
//! fails with [`BudgetExhausted`] once the step's allowance is spent. Probe code
//! propagates that with `?`, so an exhausted budget unwinds the whole pass.

use log::trace;

use super::{
    budget::TraceBudget,
    query::WorldQuery,
    types::{BodyId, CapsuleTraceSettings, TraceHit, TraceShape, Vec3},
};

/// The current pass ran out of casts for this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("trace budget exhausted for this step")]
pub struct BudgetExhausted;

pub type TraceResult<T> = Result<T, BudgetExhausted>;

pub struct Tracer<'a> {
    world: &'a dyn WorldQuery,
    budget: &'a mut TraceBudget,
    ignore: Option<BodyId>,
    issued: u32,
}

impl<'a> Tracer<'a> {
    pub fn new(
        world: &'a dyn WorldQuery,
        budget: &'a mut TraceBudget,
        ignore: Option<BodyId>,
    ) -> Self {
        Self {
            world,
            budget,
            ignore,
            issued: 0,
        }
    }

    /// Would `n` more casts fit in this step's budget?
    #[inline]
    pub fn can_afford(&self, n: u32) -> bool {
        self.budget.can_consume(n)
    }

    /// Casts issued through this tracer.
    #[inline]
    pub fn issued(&self) -> u32 {
        self.issued
    }

    fn charge(&mut self) -> TraceResult<()> {
        if !self.budget.consume(1) {
            trace!("trace refused: budget exhausted after {} casts", self.issued);
            return Err(BudgetExhausted);
        }
        self.issued += 1;
        Ok(())
    }

    pub fn sweep(
        &mut self,
        shape: TraceShape,
        start: Vec3,
        end: Vec3,
    ) -> TraceResult<Option<TraceHit>> {
        self.charge()?;
        let hit = self.world.sweep(shape, start, end, self.ignore);
        trace!(
            "sweep {:?} from {:?} to {:?} -> {:?}",
            shape,
            start.as_slice(),
            end.as_slice(),
            hit.map(|h| h.point)
        );
        Ok(hit)
    }

    #[inline]
    pub fn sweep_sphere(
        &mut self,
        radius: f32,
        start: Vec3,
        end: Vec3,
    ) -> TraceResult<Option<TraceHit>> {
        self.sweep(TraceShape::Sphere { radius }, start, end)
    }

    #[inline]
    pub fn sweep_capsule(
        &mut self,
        settings: &CapsuleTraceSettings,
    ) -> TraceResult<Option<TraceHit>> {
        self.sweep(settings.shape(), settings.start, settings.end)
    }

    pub fn overlap(&mut self, shape: TraceShape, center: Vec3) -> TraceResult<bool> {
        self.charge()?;
        let blocked = self.world.overlap(shape, center, self.ignore);
        trace!(
            "overlap {:?} at {:?} -> {}",
            shape,
            center.as_slice(),
            blocked
        );
        Ok(blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BoxWorld;

    #[test]
    fn refuses_casts_past_the_budget() {
        let world = BoxWorld::new();
        let mut budget = TraceBudget::new(2);
        budget.begin_step(1);
        let mut tracer = Tracer::new(&world, &mut budget, None);

        let a = Vec3::zeros();
        let b = Vec3::new(0.0, 0.0, -100.0);
        assert_eq!(tracer.sweep_sphere(5.0, a, b), Ok(None));
        assert_eq!(tracer.overlap(TraceShape::Sphere { radius: 5.0 }, a), Ok(false));
        assert_eq!(tracer.sweep_sphere(5.0, a, b), Err(BudgetExhausted));
        assert_eq!(tracer.issued(), 2);
        assert_eq!(world.query_count(), 2);
    }
}
