//! Pointer input to world-space forcing, throttled by a cooldown.

use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};

use crate::simulation::domain::Domain;
use crate::simulation::wave::Forcing;

/// World-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Intersection with the horizontal plane at `height`, if it lies ahead of the origin
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<Vec3> {
        if self.direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then(|| self.origin + self.direction * t)
    }
}

/// Turns a normalized pointer position into a world-space ray
pub trait Raycaster {
    fn ray(&self, ndc: Vec2) -> Ray;
}

/// Screen pixels to [-1, 1] with y pointing up
pub fn normalize_pointer(screen: Vec2, viewport: Vec2) -> Vec2 {
    let viewport = viewport.max(Vec2::ONE);
    Vec2::new(
        screen.x / viewport.x * 2.0 - 1.0,
        -(screen.y / viewport.y) * 2.0 + 1.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Input observed during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Latest pointer position in normalized device coordinates
    pub pointer: Vec2,
    /// A press edge happened: a down, or a move while held
    pub pressed: bool,
}

/// Accumulates pointer events between frames
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pointer: Vec2,
    held: bool,
    pressed: bool,
}

impl PointerState {
    pub fn handle(&mut self, phase: PointerPhase, screen: Vec2, viewport: Vec2) {
        self.pointer = normalize_pointer(screen, viewport);
        match phase {
            PointerPhase::Down => {
                self.held = true;
                self.pressed = true;
            }
            PointerPhase::Move => {
                if self.held {
                    self.pressed = true;
                }
            }
            PointerPhase::Up => self.held = false,
        }
    }

    /// Take this frame's input; the press edge is consumed
    pub fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            pointer: self.pointer,
            pressed: self.pressed,
        };
        self.pressed = false;
        snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CooldownState {
    Idle,
    Cooling { until: Instant },
}

/// Emits at most one forcing per cooldown window
pub struct ForcingController {
    domain: Domain,
    cooldown: Duration,
    state: CooldownState,
}

impl ForcingController {
    pub fn new(domain: Domain, cooldown: Duration) -> Self {
        Self {
            domain,
            cooldown,
            state: CooldownState::Idle,
        }
    }

    pub fn is_cooling(&self) -> bool {
        matches!(self.state, CooldownState::Cooling { .. })
    }

    /// Forcing for this frame. Presses arriving while cooling are dropped.
    pub fn update<R: Raycaster>(
        &mut self,
        input: InputSnapshot,
        raycaster: &R,
        now: Instant,
    ) -> Forcing {
        if let CooldownState::Cooling { until } = self.state {
            if now < until {
                return Forcing::None;
            }
            self.state = CooldownState::Idle;
        }

        if !input.pressed {
            return Forcing::None;
        }

        let hit = raycaster
            .ray(input.pointer)
            .intersect_horizontal_plane(0.0)
            .map(|p| Vec2::new(p.x, p.z))
            .filter(|p| self.domain.contains(*p));

        match hit {
            Some(position) => {
                log::debug!("Forcing at ({:.3}, {:.3})", position.x, position.y);
                self.state = CooldownState::Cooling {
                    until: now + self.cooldown,
                };
                Forcing::At(position)
            }
            None => Forcing::None,
        }
    }
}
