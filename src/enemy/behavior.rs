//! # Behavior Module
//!
//! Archetype-specific steering. Each behavior decides what velocity the
//! creature wants this frame and whether it moves at all; the enemy then
//! applies that velocity against the terrain.

use crate::{AiBehavior, Vec2};
use rand::Rng;

/// Length of a wandering dart, in seconds.
const DART_BURST: f32 = 0.3;
/// Range of the randomized pause between wandering darts.
const DART_PAUSE: (f32, f32) = (0.5, 1.0);
/// Standstill between darts while chasing.
const DART_CHASE_PAUSE: f32 = 0.2;
/// Length of a dart while chasing.
const DART_CHASE_BURST: f32 = 0.15;
const DART_CHASE_SPEED: f32 = 1.5;

/// Angular frequency of the horizontal drift, rad/s.
const DRIFT_FREQUENCY: f32 = 2.0;
/// Vertical drift runs slower than horizontal so the path never closes.
const DRIFT_VERTICAL_RATIO: f32 = 0.7;
const DRIFT_SPEED_FACTOR: f32 = 0.3;
const DRIFT_WOBBLE_FREQUENCY: f32 = 3.0;
const DRIFT_WOBBLE_ANGLE: f32 = 30.0;
const DRIFT_WOBBLE_SPEED: f32 = 10.0;

/// Fraction of the aggro radius under which a patroller commits to a charge.
const CHARGE_TRIGGER: f32 = 0.6;
const CHARGE_SPEED: f32 = 2.0;
/// Charges last this long before the patroller re-aims.
const CHARGE_DURATION: f32 = 0.5;

/// One straight leg of a patrol loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolLeg {
    pub direction: Vec2,
    pub duration: f32,
}

const fn leg(dx: f32, dy: f32, duration: f32) -> PatrolLeg {
    PatrolLeg {
        direction: Vec2::new(dx, dy),
        duration,
    }
}

/// The canned closed loops a patroller can be born with.
pub const PATROL_PATTERNS: [&[PatrolLeg]; 3] = [
    // square
    &[
        leg(1.0, 0.0, 0.4),
        leg(0.0, 1.0, 0.4),
        leg(-1.0, 0.0, 0.4),
        leg(0.0, -1.0, 0.4),
    ],
    // triangle
    &[leg(1.0, 0.0, 0.5), leg(-0.5, 1.0, 0.5), leg(-0.5, -1.0, 0.5)],
    // zigzag
    &[
        leg(1.0, 0.5, 0.35),
        leg(0.0, -0.5, 0.35),
        leg(-1.0, 0.5, 0.35),
        leg(0.0, -0.5, 0.35),
    ],
];

/// Darting burst/pause cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DartState {
    pub bursting: bool,
    pub timer: f32,
    /// Pause between wandering darts, fixed at birth
    pub pause: f32,
}

/// Drifting phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftState {
    pub phase: f32,
}

/// Patrol loop progress and charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolState {
    /// Index into [`PATROL_PATTERNS`]
    pub pattern: usize,
    pub leg: usize,
    pub leg_timer: f32,
    pub charging: bool,
    pub charge_direction: Vec2,
    pub charge_timer: f32,
}

impl PatrolState {
    pub fn legs(&self) -> &'static [PatrolLeg] {
        PATROL_PATTERNS[self.pattern % PATROL_PATTERNS.len()]
    }
}

/// Per-instance behavioral sub-state.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Darting(DartState),
    Drifting(DriftState),
    Patrolling(PatrolState),
}

impl Behavior {
    /// Rolls the individual quirks of a newborn creature.
    pub fn new<R: Rng + ?Sized>(kind: AiBehavior, rng: &mut R) -> Self {
        match kind {
            AiBehavior::Darting => Behavior::Darting(DartState {
                bursting: false,
                timer: 0.0,
                pause: rng.gen_range(DART_PAUSE.0..=DART_PAUSE.1),
            }),
            AiBehavior::Drifting => Behavior::Drifting(DriftState {
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
            }),
            AiBehavior::Patrolling => Behavior::Patrolling(PatrolState {
                pattern: rng.gen_range(0..PATROL_PATTERNS.len()),
                leg: 0,
                leg_timer: 0.0,
                charging: false,
                charge_direction: Vec2::ZERO,
                charge_timer: 0.0,
            }),
        }
    }

    pub fn kind(&self) -> AiBehavior {
        match self {
            Behavior::Darting(_) => AiBehavior::Darting,
            Behavior::Drifting(_) => AiBehavior::Drifting,
            Behavior::Patrolling(_) => AiBehavior::Patrolling,
        }
    }

    /// Whether a patroller is mid-charge.
    pub fn is_charging(&self) -> bool {
        matches!(self, Behavior::Patrolling(p) if p.charging)
    }

    /// Drops any committed charge.
    pub fn cancel_charge(&mut self) {
        if let Behavior::Patrolling(patrol) = self {
            patrol.charging = false;
            patrol.charge_timer = 0.0;
        }
    }

    /// Steering while wandering. Returns whether the creature moves this frame.
    pub fn steer_wander<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        speed: f32,
        age: f32,
        velocity: &mut Vec2,
        rng: &mut R,
    ) -> bool {
        match self {
            Behavior::Darting(dart) => {
                dart.timer += dt;
                if dart.bursting {
                    if dart.timer >= DART_BURST {
                        dart.bursting = false;
                        dart.timer = 0.0;
                        *velocity = Vec2::ZERO;
                        false
                    } else {
                        true
                    }
                } else {
                    if dart.timer >= dart.pause {
                        dart.bursting = true;
                        dart.timer = 0.0;
                        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                        *velocity = Vec2::from_angle(angle) * speed;
                    }
                    false
                }
            }
            Behavior::Drifting(drift) => {
                let t = age * DRIFT_FREQUENCY + drift.phase;
                let t_vertical = age * DRIFT_FREQUENCY * DRIFT_VERTICAL_RATIO + drift.phase;
                *velocity = Vec2::new(t.sin(), t_vertical.cos()) * (speed * DRIFT_SPEED_FACTOR);
                true
            }
            Behavior::Patrolling(patrol) => {
                let legs = patrol.legs();
                let current = legs[patrol.leg % legs.len()];
                patrol.leg_timer += dt;
                if patrol.leg_timer >= current.duration {
                    patrol.leg_timer = 0.0;
                    patrol.leg = (patrol.leg + 1) % legs.len();
                }
                *velocity = current.direction * speed;
                true
            }
        }
    }

    /// Steering while chasing. `toward` is the unit vector to the player.
    pub fn steer_chase(
        &mut self,
        dt: f32,
        speed: f32,
        age: f32,
        toward: Vec2,
        distance: f32,
        aggro_radius: f32,
        velocity: &mut Vec2,
    ) -> bool {
        match self {
            Behavior::Darting(dart) => {
                dart.timer += dt;
                if dart.bursting {
                    if dart.timer >= DART_CHASE_BURST {
                        dart.bursting = false;
                        dart.timer = 0.0;
                        *velocity = Vec2::ZERO;
                        return false;
                    }
                } else if dart.timer >= DART_CHASE_PAUSE {
                    dart.bursting = true;
                    dart.timer = 0.0;
                } else {
                    *velocity = Vec2::ZERO;
                    return false;
                }
                *velocity = toward * (speed * DART_CHASE_SPEED);
                true
            }
            Behavior::Drifting(_) => {
                let wobble = (age * DRIFT_WOBBLE_FREQUENCY).sin() * DRIFT_WOBBLE_ANGLE;
                *velocity = toward * speed + Vec2::from_angle(wobble) * DRIFT_WOBBLE_SPEED;
                true
            }
            Behavior::Patrolling(patrol) => {
                if !patrol.charging && distance < aggro_radius * CHARGE_TRIGGER {
                    patrol.charging = true;
                    patrol.charge_direction = toward;
                    patrol.charge_timer = 0.0;
                }
                if patrol.charging {
                    *velocity = patrol.charge_direction * (speed * CHARGE_SPEED);
                    patrol.charge_timer += dt;
                    if patrol.charge_timer > CHARGE_DURATION {
                        patrol.charging = false;
                        patrol.charge_timer = 0.0;
                    }
                } else {
                    *velocity = toward * speed;
                }
                true
            }
        }
    }
}
