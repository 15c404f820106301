use bevy::log::{debug, info};
use bevy::math::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::engine::tween::easing::Easing;
use crate::engine::tween::tween::Tween;

/// Axis-aligned extents of a scene node, queried once to size the bound.
pub trait BoundingVolume {
    fn extents(&self) -> Option<(Vec3, Vec3)>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub group_id: usize,
    pub size: f32,
    pub base_opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Explosion {
    scale: Tween,
    opacity: Tween,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleGroup {
    members: Vec<usize>,
    visible: bool,
    scale: f32,
    opacity: f32,
    velocity_multiplier: f32,
    threshold: Option<f32>,
    explosion: Option<Explosion>,
    exploded: bool,
}

impl ParticleGroup {
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn velocity_multiplier(&self) -> f32 {
        self.velocity_multiplier
    }

    pub fn is_exploding(&self) -> bool {
        self.explosion.is_some()
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub count: usize,
    /// One entry per group.
    pub group_multipliers: Vec<f32>,
    /// Zoom progress at which each group explodes; groups past the end of
    /// this list never explode on their own.
    pub explosion_thresholds: Vec<f32>,
    pub explosion_scale: f32,
    pub explosion_duration: f32,
    pub fade_duration: f32,
    pub base_speed: f32,
    pub particle_size: f32,
    pub bound_radius: f32,
    pub bound_radius_factor: f32,
    pub seed: u64,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        use constants::particles::*;
        Self {
            count: PARTICLE_COUNT,
            group_multipliers: GROUP_VELOCITY_MULTIPLIERS.to_vec(),
            explosion_thresholds: EXPLOSION_THRESHOLDS.to_vec(),
            explosion_scale: EXPLOSION_SCALE,
            explosion_duration: EXPLOSION_DURATION,
            fade_duration: OPACITY_FADE_DURATION,
            base_speed: BASE_PARTICLE_SPEED,
            particle_size: PARTICLE_SIZE,
            bound_radius: DEFAULT_BOUND_RADIUS,
            bound_radius_factor: BOUND_RADIUS_FACTOR,
            seed: PARTICLE_SEED,
        }
    }
}

/// Size the bounding sphere from a node's extents: half the diagonal scaled
/// by `factor`. `None` for missing or empty volumes.
pub fn bound_radius_from<B: BoundingVolume + ?Sized>(volume: &B, factor: f32) -> Option<f32> {
    let (min, max) = volume.extents()?;
    let radius = (max - min).length() * 0.5 * factor;
    (radius.is_finite() && radius > 0.0).then_some(radius)
}

/// Fixed pool of drifting points partitioned into groups.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    groups: Vec<ParticleGroup>,
    opacity: f32,
    opacity_tween: Option<Tween>,
    bound_radius: f32,
    settings: ParticleSettings,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(settings: ParticleSettings) -> Self {
        let group_count = settings.group_multipliers.len().max(1);
        let mut groups: Vec<ParticleGroup> = (0..group_count)
            .map(|index| ParticleGroup {
                members: Vec::new(),
                visible: true,
                scale: 1.0,
                opacity: 1.0,
                velocity_multiplier: settings.group_multipliers.get(index).copied().unwrap_or(1.0),
                threshold: settings.explosion_thresholds.get(index).copied(),
                explosion: None,
                exploded: false,
            })
            .collect();

        let particles = (0..settings.count)
            .map(|index| {
                let group_id = index % group_count;
                groups[group_id].members.push(index);
                Particle {
                    position: Vec3::ZERO,
                    velocity: Vec3::ZERO,
                    group_id,
                    size: settings.particle_size,
                    base_opacity: 1.0,
                }
            })
            .collect();

        let mut system = Self {
            particles,
            groups,
            opacity: 1.0,
            opacity_tween: None,
            bound_radius: settings.bound_radius,
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
        };
        system.randomize_positions();
        system
    }

    /// Resize the bound from a bounding volume, keeping the configured radius
    /// if the volume is unusable.
    pub fn fit_bounds<B: BoundingVolume + ?Sized>(&mut self, volume: &B) {
        if let Some(radius) = bound_radius_from(volume, self.settings.bound_radius_factor) {
            info!("Particle bound radius sized to {:.2}", radius);
            self.bound_radius = radius;
            self.randomize_positions();
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    pub fn group(&self, group_id: usize) -> Option<&ParticleGroup> {
        self.groups.get(group_id)
    }

    pub fn bound_radius(&self) -> f32 {
        self.bound_radius
    }

    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    /// Shared opacity applied to every particle.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Shared opacity multiplied by the group's own fade.
    pub fn group_opacity(&self, group_id: usize) -> f32 {
        self.groups
            .get(group_id)
            .map_or(0.0, |group| group.opacity * self.opacity)
    }

    pub fn any_exploded(&self) -> bool {
        self.groups.iter().any(|g| g.exploded || g.explosion.is_some())
    }

    /// Integrate one frame of motion for every visible group, reflecting
    /// particles that leave the bounding sphere.
    pub fn update(&mut self) {
        let radius = self.bound_radius;
        for group in self.groups.iter().filter(|g| g.visible) {
            for &index in &group.members {
                let particle = &mut self.particles[index];
                particle.position += particle.velocity;
                if particle.position.length() > radius {
                    particle.velocity = -particle.velocity;
                }
            }
        }
    }

    /// Advance opacity and explosion tweens.
    pub fn tick(&mut self, dt: f32) {
        if let Some(tween) = self.opacity_tween.as_mut() {
            self.opacity = tween.tick(dt);
            if tween.is_finished() {
                self.opacity_tween = None;
            }
        }

        for (index, group) in self.groups.iter_mut().enumerate() {
            let Some(explosion) = group.explosion.as_mut() else {
                continue;
            };
            group.scale = explosion.scale.tick(dt);
            group.opacity = explosion.opacity.tick(dt);
            if explosion.scale.is_finished() && explosion.opacity.is_finished() {
                group.explosion = None;
                group.exploded = true;
                group.visible = false;
                debug!("Particle group {} exploded and hidden", index);
            }
        }
    }

    /// Ramp the shared opacity of every particle to `target`.
    pub fn tween_opacity(&mut self, target: f32, duration: f32) {
        let tween = Tween::new(
            self.opacity,
            target.clamp(0.0, 1.0),
            duration,
            Easing::QuadraticInOut,
        );
        if tween.is_finished() {
            self.opacity = tween.value();
            self.opacity_tween = None;
        } else {
            self.opacity_tween = Some(tween);
        }
    }

    /// Scale a group up while fading it out, then hide it. Returns `false`
    /// for unknown groups and groups already exploding or exploded.
    pub fn tween_explosion(&mut self, duration: f32, group_id: usize) -> bool {
        let scale_target = self.settings.explosion_scale;
        let Some(group) = self.groups.get_mut(group_id) else {
            return false;
        };
        if group.exploded || group.explosion.is_some() || !group.visible {
            return false;
        }

        group.explosion = Some(Explosion {
            scale: Tween::new(group.scale, scale_target, duration, Easing::QuadraticOut),
            opacity: Tween::new(group.opacity, 0.0, duration, Easing::QuadraticIn),
        });
        debug!("Particle group {} exploding over {:.2}s", group_id, duration);
        true
    }

    /// Explode every group whose threshold `progress` has reached. Returns
    /// the groups that started exploding.
    pub fn trigger_explosions(&mut self, progress: f32) -> Vec<usize> {
        let duration = self.settings.explosion_duration;
        let due: Vec<usize> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.threshold.is_some_and(|t| progress >= t))
            .map(|(index, _)| index)
            .collect();

        due.into_iter()
            .filter(|index| self.tween_explosion(duration, *index))
            .collect()
    }

    /// Scatter every particle inside the bound with a fresh velocity and
    /// bring every group back: visible, unit scale, fully opaque.
    pub fn randomize_positions(&mut self) {
        let radius = self.bound_radius;
        let base_speed = self.settings.base_speed;

        for particle in self.particles.iter_mut() {
            let multiplier = self.groups[particle.group_id].velocity_multiplier;
            let direction = random_unit_vector(&mut self.rng);
            let distance = radius * 0.9 * self.rng.random::<f32>().cbrt();
            particle.position = direction * distance;
            particle.velocity = random_unit_vector(&mut self.rng) * base_speed * multiplier;
        }

        for group in self.groups.iter_mut() {
            group.visible = true;
            group.scale = 1.0;
            group.opacity = 1.0;
            group.explosion = None;
            group.exploded = false;
        }
    }
}

fn random_unit_vector(rng: &mut Pcg32) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let length_squared = candidate.length_squared();
        if length_squared > 1e-6 && length_squared <= 1.0 {
            return candidate / length_squared.sqrt();
        }
    }
}
