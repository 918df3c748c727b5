//! Per-step shape-cast budget.
//!
//! Every cast issued by detection, the sub-probes and IK is charged here first. The
//! counters reset lazily: [`TraceBudget::begin_step`] compares the step sequence number
//! against the last one it saw, so calling it any number of times within one step
//! resets exactly once.

/// Snapshot of the budget counters, for tuning `max_traces_per_step`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Step the counters belong to.
    pub step: u64,
    /// Casts issued so far this step.
    pub current: u32,
    /// Highest per-step count observed since creation.
    pub peak: u32,
    /// Casts issued since the current detection pass / action began (this step).
    pub this_action: u32,
    /// Casts issued since creation.
    pub total: u64,
}

/// Optional consumer of [`TraceStats`], fed once per step boundary.
pub trait TelemetrySink {
    fn record(&mut self, stats: &TraceStats);
}

#[derive(Clone, Debug)]
pub struct TraceBudget {
    /// Cap per step; `<= 0` disables the cap.
    max_per_step: i32,
    last_step: Option<u64>,
    queries_this_step: u32,
    queries_this_action: u32,
    peak_per_step: u32,
    total: u64,
}

impl TraceBudget {
    pub fn new(max_per_step: i32) -> Self {
        Self {
            max_per_step,
            last_step: None,
            queries_this_step: 0,
            queries_this_action: 0,
            peak_per_step: 0,
            total: 0,
        }
    }

    #[inline]
    pub fn max_per_step(&self) -> i32 {
        self.max_per_step
    }

    pub fn set_max_per_step(&mut self, max_per_step: i32) {
        self.max_per_step = max_per_step;
    }

    /// Reset the per-step counters if `step` differs from the last step seen.
    ///
    /// Returns `true` when a reset happened.
    pub fn begin_step(&mut self, step: u64) -> bool {
        if self.last_step == Some(step) {
            return false;
        }
        self.last_step = Some(step);
        self.queries_this_step = 0;
        self.queries_this_action = 0;
        true
    }

    /// Restart the per-action counter (start of a detection pass).
    pub fn begin_action(&mut self) {
        self.queries_this_action = 0;
    }

    #[inline]
    pub fn is_capped(&self) -> bool {
        self.max_per_step > 0
    }

    /// `queries_this_step + n <= max_per_step`, or always true when uncapped.
    #[inline]
    pub fn can_consume(&self, n: u32) -> bool {
        if !self.is_capped() {
            return true;
        }
        u64::from(self.queries_this_step) + u64::from(n) <= self.max_per_step as u64
    }

    /// Charge `n` casts if the budget allows it. Nothing is charged on refusal.
    pub fn consume(&mut self, n: u32) -> bool {
        if !self.can_consume(n) {
            return false;
        }
        self.queries_this_step += n;
        self.queries_this_action += n;
        self.total += u64::from(n);
        self.peak_per_step = self.peak_per_step.max(self.queries_this_step);
        true
    }

    /// Casts still available this step (`None` when uncapped).
    pub fn remaining(&self) -> Option<u32> {
        if !self.is_capped() {
            return None;
        }
        Some((self.max_per_step as u32).saturating_sub(self.queries_this_step))
    }

    pub fn stats(&self) -> TraceStats {
        TraceStats {
            step: self.last_step.unwrap_or(0),
            current: self.queries_this_step,
            peak: self.peak_per_step,
            this_action: self.queries_this_action,
            total: self.total,
        }
    }
}
