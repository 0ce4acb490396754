//! # Effects Module
//!
//! Presentation hints produced by the simulation: particles, floating damage
//! numbers, and screen impact. Nothing here feeds back into gameplay; the
//! renderer reads these and the engine ages them every frame.

use crate::Vec2;
use rand::Rng;

/// A short-lived decorative particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining lifetime in seconds
    pub life: f32,
    /// Lifetime at emission, for fading
    pub max_life: f32,
    /// Lifetime consumed per second of simulation
    pub decay_rate: f32,
    /// Upward acceleration in px/s²
    pub lift: f32,
    pub size: f32,
}

impl Particle {
    /// Advances the particle. Returns false once it has expired.
    pub fn update(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.velocity.y -= self.lift * dt;
        self.life -= self.decay_rate * dt;
        self.life > 0.0
    }

    /// Opacity in `[0, 1]` derived from the remaining lifetime.
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Ages every particle and drops the expired ones.
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    particles.retain_mut(|p| p.update(dt));
}

/// Burst of particles flying out of a point in random directions.
pub fn burst<R: Rng + ?Sized>(
    rng: &mut R,
    origin: Vec2,
    count: usize,
    spread: f32,
    speed: (f32, f32),
    life: (f32, f32),
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let max_life = rng.gen_range(life.0..=life.1);
            Particle {
                position: origin
                    + Vec2::new(
                        rng.gen_range(-spread..=spread),
                        rng.gen_range(-spread..=spread),
                    ),
                velocity: Vec2::from_angle(angle) * rng.gen_range(speed.0..=speed.1),
                life: max_life,
                max_life,
                decay_rate: 1.0,
                lift: 0.0,
                size: rng.gen_range(1.0..=3.0),
            }
        })
        .collect()
}

/// Red motes rising from a released creature.
pub fn release_plume<R: Rng + ?Sized>(rng: &mut R, origin: Vec2) -> Vec<Particle> {
    (0..15)
        .map(|_| Particle {
            position: origin + Vec2::new(rng.gen_range(-10.0..=10.0), rng.gen_range(-5.0..=5.0)),
            velocity: Vec2::new(rng.gen_range(-7.5..=7.5), -30.0 - rng.gen_range(0.0..=40.0)),
            life: 1.0 + rng.gen_range(0.0..=0.5),
            max_life: 1.5,
            decay_rate: 1.0,
            lift: 5.0,
            size: rng.gen_range(1.0..=4.0),
        })
        .collect()
}

/// A floating number shown where an enemy was struck.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageNumber {
    pub position: Vec2,
    pub amount: u32,
    pub life: f32,
}

impl DamageNumber {
    pub const LIFETIME: f32 = 0.8;
    const RISE_SPEED: f32 = 30.0;

    pub fn new(position: Vec2, amount: u32) -> Self {
        Self {
            position,
            amount,
            life: Self::LIFETIME,
        }
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.position.y -= Self::RISE_SPEED * dt;
        self.life -= dt;
        self.life > 0.0
    }

    pub fn alpha(&self) -> f32 {
        (self.life / Self::LIFETIME).clamp(0.0, 1.0)
    }
}

/// Camera impact: a decaying random offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenShake {
    intensity: f32,
    duration: f32,
    elapsed: f32,
    offset: Vec2,
}

impl ScreenShake {
    /// Starts a shake, keeping the stronger of the current and new values.
    pub fn trigger(&mut self, intensity: f32, duration: f32) {
        self.intensity = self.intensity.max(intensity);
        self.duration = self.duration.max(duration);
        self.elapsed = 0.0;
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if self.duration <= 0.0 {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            *self = Self::default();
        } else {
            let decay = 1.0 - self.elapsed / self.duration;
            let reach = self.intensity * decay;
            self.offset = Vec2::new(rng.gen_range(-reach..=reach), rng.gen_range(-reach..=reach));
        }
    }

    pub fn is_active(&self) -> bool {
        self.duration > 0.0
    }

    /// Offset to apply to the camera this frame.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}
