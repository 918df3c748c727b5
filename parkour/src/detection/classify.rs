//! The prioritized classification table.
//!
//! Bands are evaluated first-match-wins in a fixed order:
//! drop, depth out of range, height out of range, ambiguous height, vault, mantle,
//! default. A band whose sub-probe fails falls through to the next one; each sub-probe
//! family runs at most once per pass (tracked in an [`Attempted`] set).

use log::{debug, trace};

use crate::action::{ClimbStyle, ParkourAction, Side, TraversalDirection};
use crate::bitmask_flags::BitmaskFlags;
use crate::define_bitmask_flags;
use crate::intent::ClimbIntent;
use crate::probes::confirm::confirm_surface;
use crate::probes::drop_hang::drop_hang;
use crate::probes::ledge::detect_hang_move;
use crate::probes::predictive::predictive_jump;
use crate::probes::tic_tac::tic_tac;
use crate::probes::{ClimbAnchor, LedgeFind, ProbeContext};
use crate::trace::{TraceHit, TraceResult, Tracer, Vec3};

use super::forward::WallProbe;

define_bitmask_flags!(
    /// Sub-probe families that may run at most once per pass.
    pub SubProbe, u8, {
        HangFamily,
        Predictive,
        TicTac,
        DropHang,
        ClimbFallback,
    }
);

pub type Attempted = BitmaskFlags<SubProbe>;

/// A successful classification, ready to be written into the result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub action: ParkourAction,
    pub climb_style: ClimbStyle,
    pub direction: TraversalDirection,
    pub world_location: Vec3,
    pub world_normal: Vec3,
    pub target_location: Vec3,
    pub surface_normal: Vec3,
    pub height_delta: f32,
    pub xy_distance: f32,
    pub wall_depth: f32,
    pub primary: TraceHit,
    pub climb_ledge: Option<TraceHit>,
}

/// Outcome of the table: maybe a classification, and whether the auto-climb jump is due.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DetectionOutcome {
    pub classification: Option<Classification>,
    pub auto_climb: bool,
}

impl DetectionOutcome {
    fn found(c: Classification) -> Self {
        Self {
            classification: Some(c),
            auto_climb: false,
        }
    }
}

/// Per-pass inputs beyond the probe itself.
#[derive(Clone, Copy, Debug)]
pub struct ClassifyInput<'a> {
    pub probe: &'a WallProbe,
    pub climbing: bool,
    pub intent: ClimbIntent,
    /// World-space planar input direction.
    pub input: Vec3,
    /// Ledge held before this pass (used when the probe found no top).
    pub held_ledge: Option<ClimbAnchor>,
    pub held_style: ClimbStyle,
}

struct Table<'p, 't, 'w, 'c> {
    tracer: &'p mut Tracer<'w>,
    ctx: &'p ProbeContext<'c>,
    input: &'p ClassifyInput<'t>,
    attempted: &'p mut Attempted,
    ledge_usable: bool,
}

pub fn classify(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    input: &ClassifyInput<'_>,
    attempted: &mut Attempted,
) -> TraceResult<DetectionOutcome> {
    let b = &ctx.config.bands;
    let probe = input.probe;
    let ledge_usable = probe.ledge_known()
        && !(ctx.body.is_falling() && probe.height_delta > b.airborne_max_ledge_height);
    let mut table = Table {
        tracer,
        ctx,
        input,
        attempted,
        ledge_usable,
    };
    let outcome = table.run()?;
    debug!(
        "classified {:?} (height {:.1}, depth {:.1}, xy {:.1}, auto-climb {})",
        outcome.classification.map(|c| c.action),
        probe.height_delta,
        probe.wall_depth,
        probe.xy_distance,
        outcome.auto_climb
    );
    Ok(outcome)
}

impl Table<'_, '_, '_, '_> {
    fn probe(&self) -> &WallProbe {
        self.input.probe
    }

    fn auto_climb(&self) -> DetectionOutcome {
        let p = &self.ctx.config.probes;
        DetectionOutcome {
            classification: None,
            auto_climb: p.auto_climb_enabled && self.ctx.body.is_grounded(),
        }
    }

    fn style_for_xy(&self) -> ClimbStyle {
        if self.probe().xy_distance <= self.ctx.config.bands.braced_climb_max_xy_distance {
            ClimbStyle::Braced
        } else {
            ClimbStyle::FreeHang
        }
    }

    fn make(
        &self,
        action: ParkourAction,
        climb_style: ClimbStyle,
        direction: TraversalDirection,
        target: Vec3,
        normal: Vec3,
        climb_ledge: Option<TraceHit>,
    ) -> Classification {
        let probe = self.probe();
        Classification {
            action,
            climb_style,
            direction,
            world_location: probe.lip(),
            world_normal: probe.wall_normal(),
            target_location: target,
            surface_normal: normal,
            height_delta: target.y - self.ctx.body.feet().y,
            xy_distance: probe.xy_distance,
            wall_depth: probe.wall_depth,
            primary: probe.hit,
            climb_ledge,
        }
    }

    fn from_find(
        &self,
        action: ParkourAction,
        climb_style: ClimbStyle,
        direction: TraversalDirection,
        find: &LedgeFind,
    ) -> Classification {
        let mut lip = find.wall.point;
        lip.y = find.top.point.y;
        self.make(action, climb_style, direction, lip, find.wall_normal(), Some(find.top))
    }

    fn run(&mut self) -> TraceResult<DetectionOutcome> {
        let ctx = self.ctx;
        let b = &ctx.config.bands;
        let probe = *self.probe();
        let climbing = self.input.climbing;
        let h = probe.height_delta;
        let depth = probe.wall_depth;

        // Drop onto a lower ledge.
        if self.ledge_usable && h < 0.0 && -h <= b.drop_max_height {
            let style = self.style_for_xy();
            return Ok(DetectionOutcome::found(self.make(
                ParkourAction::Drop,
                style,
                TraversalDirection::Forward,
                probe.lip(),
                probe.wall_normal(),
                probe.ledge,
            )));
        }

        // Wall depth outside both the mantle and the vault windows.
        let (m_lo, m_hi) = b.mantle_depth(climbing);
        let (v_lo, v_hi) = b.vault_depth(climbing);
        let depth_mantle = (m_lo..=m_hi).contains(&depth);
        let depth_vault = (v_lo..=v_hi).contains(&depth);
        if !depth_mantle && !depth_vault {
            if let Some(c) = self.try_predictive()? {
                return Ok(DetectionOutcome::found(c));
            }
            return Ok(self.auto_climb());
        }

        // Height outside both the vault and the mantle bands.
        let h_vault = self.ledge_usable && (b.vault_min_height..=b.vault_max_height).contains(&h);
        let h_mantle =
            self.ledge_usable && (b.mantle_min_height..=b.mantle_max_height).contains(&h);
        if !h_vault && !h_mantle {
            if let Some(c) = self.traversal_chain()? {
                return Ok(DetectionOutcome::found(c));
            }
        }

        let vault_ok = h_vault && depth_vault && !climbing && ctx.body.speed() >= b.vault_min_speed;
        let mantle_ok = h_mantle && depth_mantle && (!climbing || self.input.intent.is_up());

        // Depth fine, height in a band whose other conditions fail.
        if (h_vault || h_mantle) && !vault_ok && !mantle_ok {
            if let Some(c) = self.try_tic_tac()? {
                return Ok(DetectionOutcome::found(c));
            }
            if let Some(c) = self.try_drop_hang()? {
                return Ok(DetectionOutcome::found(c));
            }
        }

        if vault_ok {
            let action = if h <= b.vault_thin_height_max {
                ParkourAction::ThinVault
            } else if h >= b.vault_high_height_min {
                ParkourAction::HighVault
            } else {
                ParkourAction::Vault
            };
            return self.confirmed(action, TraversalDirection::Forward);
        }

        if mantle_ok {
            let action = if probe.xy_distance >= b.distance_mantle_min_xy {
                ParkourAction::DistanceMantle
            } else if h <= b.low_mantle_max_height {
                ParkourAction::LowMantle
            } else {
                ParkourAction::Mantle
            };
            let direction = if climbing {
                TraversalDirection::Up
            } else {
                TraversalDirection::Forward
            };
            return self.confirmed(action, direction);
        }

        if let Some(c) = self.traversal_chain()? {
            return Ok(DetectionOutcome::found(c));
        }
        Ok(self.auto_climb())
    }

    /// Surface-confirm a mantle / vault; failure is the auto-climb fallback.
    fn confirmed(
        &mut self,
        action: ParkourAction,
        direction: TraversalDirection,
    ) -> TraceResult<DetectionOutcome> {
        let probe = *self.probe();
        let normal = probe.wall_normal();
        let lip = probe.lip();
        match confirm_surface(self.tracer, self.ctx, action, probe.hit.point, normal, lip.y)? {
            Some(warp) => Ok(DetectionOutcome::found(self.make(
                action,
                ClimbStyle::None,
                direction,
                warp,
                normal,
                probe.ledge,
            ))),
            None => {
                debug!("{} confirmation failed", action.name());
                Ok(self.auto_climb())
            }
        }
    }

    /// Hanging family, then predictive jump, then climb fallbacks.
    fn traversal_chain(&mut self) -> TraceResult<Option<Classification>> {
        if let Some(c) = self.try_hang_family()? {
            return Ok(Some(c));
        }
        if let Some(c) = self.try_predictive()? {
            return Ok(Some(c));
        }
        self.climb_fallbacks()
    }

    fn climb_fallbacks(&mut self) -> TraceResult<Option<Classification>> {
        if let Some(c) = self.try_tic_tac()? {
            return Ok(Some(c));
        }
        if let Some(c) = self.try_drop_hang()? {
            return Ok(Some(c));
        }
        if !self.grab_allowed() || !self.attempted.mark(SubProbe::ClimbFallback) {
            return Ok(None);
        }
        let probe = *self.probe();
        let style = self.style_for_xy();
        let action = if style == ClimbStyle::Braced && self.ctx.body.is_grounded() {
            ParkourAction::VaultToBraced
        } else {
            ParkourAction::AirHang
        };
        trace!("climb fallback: {} ({})", action.name(), style.name());
        Ok(Some(self.make(
            action,
            style,
            TraversalDirection::Forward,
            probe.lip(),
            probe.wall_normal(),
            probe.ledge,
        )))
    }

    /// Grabbing the probed ledge needs a known top within the climb band, and not
    /// already hanging.
    fn grab_allowed(&self) -> bool {
        let b = &self.ctx.config.bands;
        !self.input.climbing
            && self.ledge_usable
            && (b.climb_min_height..=b.climb_max_height).contains(&self.probe().height_delta)
    }

    fn try_hang_family(&mut self) -> TraceResult<Option<Classification>> {
        if !self.input.climbing || !self.attempted.mark(SubProbe::HangFamily) {
            return Ok(None);
        }
        let probe = *self.probe();
        let anchor = if probe.ledge_known() {
            Some(ClimbAnchor {
                ledge: probe.lip(),
                normal: probe.wall_normal(),
            })
        } else {
            self.input.held_ledge
        };
        let Some(anchor) = anchor else {
            return Ok(None);
        };
        let found = detect_hang_move(
            self.tracer,
            self.ctx,
            &anchor,
            self.input.intent,
            &self.input.input,
        )?;
        let style = match self.input.held_style {
            ClimbStyle::None => ClimbStyle::Braced,
            style => style,
        };
        Ok(found.map(|m| self.from_find(m.action, style, m.direction, &m.find)))
    }

    fn try_predictive(&mut self) -> TraceResult<Option<Classification>> {
        if self.input.climbing || !self.attempted.mark(SubProbe::Predictive) {
            return Ok(None);
        }
        let probe = *self.probe();
        let ledge_height = self.ledge_usable.then_some(probe.height_delta);
        let found = predictive_jump(self.tracer, self.ctx, probe.direction, ledge_height)?;
        let style = self.style_for_xy();
        Ok(found.map(|f| {
            self.from_find(ParkourAction::PredictJump, style, TraversalDirection::Forward, &f)
        }))
    }

    fn try_tic_tac(&mut self) -> TraceResult<Option<Classification>> {
        let ctx = self.ctx;
        let p = &ctx.config.probes;
        if self.input.climbing
            || self.ctx.body.speed() < p.tic_tac_min_speed
            || self.probe().xy_distance > p.tic_tac_max_xy_distance
            || !self.attempted.mark(SubProbe::TicTac)
        {
            return Ok(None);
        }
        let lateral = self.input.input.dot(&self.ctx.body.right());
        let preferred = if lateral.abs() > 0.1 {
            Some(if lateral < 0.0 { Side::Left } else { Side::Right })
        } else {
            None
        };
        let gain = p.tic_tac_height_gain;
        let Some(found) = tic_tac(self.tracer, self.ctx, preferred)? else {
            return Ok(None);
        };
        let target = found.hit.point + Vec3::y() * gain;
        Ok(Some(self.make(
            ParkourAction::TicTac,
            ClimbStyle::None,
            TraversalDirection::lateral(found.side.sign()),
            target,
            found.hit.planar_normal(),
            None,
        )))
    }

    fn try_drop_hang(&mut self) -> TraceResult<Option<Classification>> {
        if !self.grab_allowed_for_drop() || !self.attempted.mark(SubProbe::DropHang) {
            return Ok(None);
        }
        let probe = *self.probe();
        let normal = probe.wall_normal();
        let Some(hit) = drop_hang(self.tracer, self.ctx, probe.hit.point, normal, probe.lip().y)?
        else {
            return Ok(None);
        };
        let action = if self.ctx.body.is_grounded() && probe.height_delta < 0.0 {
            ParkourAction::Drop
        } else {
            ParkourAction::AirHang
        };
        let style = self.style_for_xy();
        let mut target = probe.hit.point;
        target.y = hit.point.y;
        Ok(Some(self.make(
            action,
            style,
            TraversalDirection::Forward,
            target,
            normal,
            Some(hit),
        )))
    }

    /// Drop-hang also grabs ledges below the feet (within the drop ceiling).
    fn grab_allowed_for_drop(&self) -> bool {
        let b = &self.ctx.config.bands;
        let h = self.probe().height_delta;
        let below = h < 0.0 && -h <= b.drop_max_height;
        self.grab_allowed() || (!self.input.climbing && self.ledge_usable && below)
    }
}
