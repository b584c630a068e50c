//! Per-leaf physics step
//!
//! Attached leaves sway around their anchor as a pure function of time, so
//! they can never drift. Falling leaves are integrated with semi-implicit
//! Euler: forces update velocity first, then velocity moves the leaf. Every
//! force is scaled by the tick delta so the result does not depend on how
//! often the step runs.

use std::f64::consts::TAU;
use rand::Rng;
use serde::Deserialize;
use crate::math::Vec2;
use super::leaf::{Leaf, LeafState};

/// Speed range (percent per tick) a leaf falls at right after letting go
const DETACH_FALL_SPEED: (f32, f32) = (0.005, 0.02);

/// Tunable force model. Units are viewport percent and ticks (1/60 s).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Added to vertical velocity every tick
    pub gravity: f32,
    /// Horizontal velocity retained per tick, in (0, 1]
    pub air_resistance: f32,
    /// Terminal vertical velocity
    pub max_fall_speed: f32,
    pub wind_amplitude: f32,
    pub gust_amplitude: f32,
    pub spiral_amplitude: f32,
    /// Peak random horizontal acceleration per tick
    pub horizontal_noise: f32,
    /// Peak random vertical acceleration per tick
    pub vertical_noise: f32,
    /// Multiplier on a falling leaf's rotation speed
    pub rotation_damping: f32,
    /// Degrees of rotation per unit of attached sway
    pub sway_coupling: f32,
    /// Multiplier on every leaf's detachment chance
    pub detachment_scale: f32,
    /// Leaves below this y start fading
    pub fade_start_y: f32,
    /// Leaves further than this outside [0, 100] horizontally start fading
    pub side_fade_margin: f32,
    /// Leaves with less life than this start fading
    pub lifetime_fade_threshold: f32,
    pub bottom_fade_rate: f32,
    pub side_fade_rate: f32,
    pub lifetime_fade_rate: f32,
    /// Opacity at or below which a leaf is retired
    pub retire_opacity: f32,
    /// Leaves at or below this y are retired
    pub retire_y: f32,
    /// Leaves further than this outside [0, 100] horizontally are retired
    pub retire_side_margin: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: 0.008,
            air_resistance: 0.996,
            max_fall_speed: 0.35,
            wind_amplitude: 0.0004,
            gust_amplitude: 0.0002,
            spiral_amplitude: 0.00015,
            horizontal_noise: 0.0004,
            vertical_noise: 0.0002,
            rotation_damping: 0.5,
            sway_coupling: 2.5,
            detachment_scale: 1.0,
            fade_start_y: 95.0,
            side_fade_margin: 10.0,
            lifetime_fade_threshold: 60.0,
            bottom_fade_rate: 0.04,
            side_fade_rate: 0.03,
            lifetime_fade_rate: 0.02,
            retire_opacity: 0.05,
            retire_y: 110.0,
            retire_side_margin: 15.0,
        }
    }
}

impl PhysicsParams {
    /// Gravity and drag only: no wind, gusts, spiral or noise
    pub fn still_air() -> Self {
        Self {
            wind_amplitude: 0.0,
            gust_amplitude: 0.0,
            spiral_amplitude: 0.0,
            horizontal_noise: 0.0,
            vertical_noise: 0.0,
            ..Default::default()
        }
    }
}

/// Shared inputs for one step of the whole population
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    /// Elapsed ticks, already clamped
    pub delta_ticks: f32,
    /// Wall-clock time in milliseconds
    pub time_ms: f64,
    /// Multiplier on detachment chance (0 disables detachment)
    pub detachment_scale: f32,
}

/// Advance one leaf. Returns true if the leaf let go of its branch this step.
pub fn step_leaf<R: Rng + ?Sized>(
    leaf: &mut Leaf,
    params: &PhysicsParams,
    ctx: &StepContext,
    rng: &mut R,
) -> bool {
    let dt = ctx.delta_ticks;
    let mut detached = false;

    if let LeafState::Attached { anchor, rest_rotation, .. } = leaf.state() {
        let chance = leaf.detachment_chance * dt * ctx.detachment_scale;
        if chance > 0.0 && rng.gen::<f32>() < chance {
            let fall = rng.gen_range(DETACH_FALL_SPEED.0..DETACH_FALL_SPEED.1);
            leaf.detach(Vec2::new(0.0, fall));
            detached = true;
        } else {
            let sway = sway_offset(ctx.time_ms, leaf.swing_phase, leaf.sway_amplitude);
            leaf.position = anchor + sway;
            leaf.rotation = rest_rotation + sway.x * params.sway_coupling;
        }
    }

    if !leaf.is_attached() {
        integrate_falling(leaf, params, ctx, rng);
        if let Some(life) = leaf.life_time.as_mut() {
            *life -= dt;
        }
    }

    apply_fade(leaf, params, dt);
    detached
}

/// Offset from the anchor of an attached leaf at `time_ms`
pub fn sway_offset(time_ms: f64, phase: f32, amplitude: f32) -> Vec2 {
    let phase = phase as f64;
    let slow = (TAU * time_ms / 12000.0 + phase).sin();
    let quick = (TAU * time_ms / 8000.0 + phase * 1.3).sin();
    let drift = (TAU * time_ms / 20000.0 + phase * 0.7).sin();

    let dx = slow + 0.5 * quick + 0.3 * drift;
    let dy = 0.3 * (TAU * time_ms / 8000.0 + phase).sin();
    Vec2::new(dx as f32 * amplitude, dy as f32 * amplitude)
}

/// Horizontal acceleration from wind, gusts and spiral drift at `time_ms`
pub fn horizontal_force(leaf: &Leaf, params: &PhysicsParams, time_ms: f64) -> f32 {
    let id = leaf.id as f64;
    let wind = (time_ms / 15000.0 + leaf.swing_phase as f64).sin() as f32 * params.wind_amplitude;
    let gust = (time_ms / 8000.0 + id * 0.1).sin() as f32 * params.gust_amplitude;
    let spiral = (time_ms / 12000.0 + id * 0.3).sin() as f32 * params.spiral_amplitude;
    wind + gust + spiral
}

fn integrate_falling<R: Rng + ?Sized>(
    leaf: &mut Leaf,
    params: &PhysicsParams,
    ctx: &StepContext,
    rng: &mut R,
) {
    let dt = ctx.delta_ticks;
    let noise_x = symmetric(rng) * params.horizontal_noise;
    let noise_y = symmetric(rng) * params.vertical_noise;

    let push = horizontal_force(leaf, params, ctx.time_ms) + noise_x;
    leaf.velocity.x = leaf.velocity.x * params.air_resistance.powf(dt) + push * dt;
    leaf.velocity.y = (leaf.velocity.y + (params.gravity + noise_y) * dt).min(params.max_fall_speed);

    leaf.position = leaf.position + leaf.velocity * dt;
    leaf.rotation += leaf.rotation_speed * dt * params.rotation_damping;
}

fn apply_fade(leaf: &mut Leaf, params: &PhysicsParams, dt: f32) {
    let mut rate = 0.0;
    if leaf.position.y > params.fade_start_y {
        rate += params.bottom_fade_rate;
    }
    let margin = params.side_fade_margin;
    if leaf.position.x < -margin || leaf.position.x > 100.0 + margin {
        rate += params.side_fade_rate;
    }
    if leaf.life_time.is_some_and(|life| life < params.lifetime_fade_threshold) {
        rate += params.lifetime_fade_rate;
    }

    let faded = (leaf.opacity - rate * dt).clamp(0.0, 1.0);
    // NaN from upstream collapses to fully transparent so the leaf is retired
    leaf.opacity = if faded.is_nan() { 0.0 } else { faded.min(leaf.opacity) };
}

/// Whether a leaf should leave the population
pub fn should_retire(leaf: &Leaf, params: &PhysicsParams) -> bool {
    let margin = params.retire_side_margin;
    !leaf.position.is_finite()
        || leaf.opacity.is_nan()
        || leaf.opacity <= params.retire_opacity
        || leaf.position.y >= params.retire_y
        || leaf.position.x < -margin
        || leaf.position.x > 100.0 + margin
}

/// Uniform sample in [-1, 1)
fn symmetric<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}
