use crate::simulation::wave::Forcing;

/// Decides which render frames advance the simulation
#[derive(Debug, Clone)]
pub struct SimulationClock {
    frames: u32,
    interval: u32,
}

impl SimulationClock {
    /// One step every `max(1, 7 - speed)` frames
    pub fn new(speed: u32) -> Self {
        Self::with_interval(7u32.saturating_sub(speed))
    }

    pub fn with_interval(interval: u32) -> Self {
        Self {
            frames: 0,
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Count a render frame; true when a simulation step is due
    pub fn should_step(&mut self) -> bool {
        self.frames += 1;
        if self.frames >= self.interval {
            self.frames = 0;
            true
        } else {
            false
        }
    }
}

/// Pairs the clock with forcing waiting for the next step.
///
/// A step that is due but never submitted keeps both the due step and the
/// latched forcing, so an accepted press is only dropped once a step carrying
/// it has actually run.
#[derive(Debug, Clone)]
pub struct StepScheduler {
    clock: SimulationClock,
    due: bool,
    pending: Forcing,
}

impl StepScheduler {
    pub fn new(speed: u32) -> Self {
        Self {
            clock: SimulationClock::new(speed),
            due: false,
            pending: Forcing::None,
        }
    }

    /// Hold an accepted forcing until a step consumes it
    pub fn latch(&mut self, forcing: Forcing) {
        if forcing.is_active() {
            self.pending = forcing;
        }
    }

    /// Count a presented frame; the forcing for the step to run on it, if one is due
    pub fn frame(&mut self) -> Option<Forcing> {
        if !self.due {
            self.due = self.clock.should_step();
        }
        self.due.then_some(self.pending)
    }

    /// The step returned by `frame` was submitted
    pub fn committed(&mut self) {
        self.due = false;
        self.pending = Forcing::None;
    }
}
