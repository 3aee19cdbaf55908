// src/building/construction/progress.rs
//! Construction clock and bottom-up part reveal. No ECS here; the systems
//! drive these per building.

/// Lifecycle of one placed building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConstructionPhase {
    /// Instantiated, nothing shown yet.
    #[default]
    Built0,
    Constructing,
    /// Terminal.
    Complete,
}

/// What one `tick` did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// Not constructing (not started, finished, or a preview).
    Idle,
    Advanced { progress: f32 },
    /// Reached progress 1 on this tick.
    Completed,
}

/// Elapsed time -> progress in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructionClock {
    duration: f32,
    elapsed: f32,
    progress: f32,
    phase: ConstructionPhase,
    frozen: bool,
}

impl ConstructionClock {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            progress: 0.0,
            phase: ConstructionPhase::Built0,
            frozen: false,
        }
    }

    /// Built0 -> Constructing. Ignored in any other phase.
    pub fn start(&mut self) -> bool {
        if self.frozen || self.phase != ConstructionPhase::Built0 {
            return false;
        }
        self.phase = ConstructionPhase::Constructing;
        true
    }

    /// Permanently stop progression (preview instances).
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        if self.frozen || self.phase != ConstructionPhase::Constructing {
            return TickOutcome::Idle;
        }

        if self.duration <= 0.0 {
            self.progress = 1.0;
            self.phase = ConstructionPhase::Complete;
            return TickOutcome::Completed;
        }

        self.elapsed += dt.max(0.0);
        self.progress = (self.elapsed / self.duration).clamp(0.0, 1.0);

        if self.elapsed >= self.duration {
            self.progress = 1.0;
            self.phase = ConstructionPhase::Complete;
            TickOutcome::Completed
        } else {
            TickOutcome::Advanced { progress: self.progress }
        }
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn phase(&self) -> ConstructionPhase {
        self.phase
    }
}

/// Part base heights plus the building's min/max, for threshold reveals.
#[derive(Clone, Debug, PartialEq)]
pub struct PartReveal {
    base_heights: Vec<f32>,
    min: f32,
    max: f32,
}

impl PartReveal {
    pub fn new(base_heights: Vec<f32>) -> Self {
        let (min, max) = base_heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)));
        if base_heights.is_empty() {
            return Self { base_heights, min: 0.0, max: 0.0 };
        }
        Self { base_heights, min, max }
    }

    /// Height up to which parts are shown at `progress`.
    #[inline]
    pub fn threshold(&self, progress: f32) -> f32 {
        self.min + progress.clamp(0.0, 1.0) * (self.max - self.min)
    }

    /// Visible/solid flag per part at `progress`, in part order.
    pub fn revealed(&self, progress: f32) -> impl Iterator<Item = bool> + '_ {
        let t = self.threshold(progress);
        self.base_heights
            .iter()
            .map(move |&h| h.clamp(self.min, self.max) <= t)
    }
}
