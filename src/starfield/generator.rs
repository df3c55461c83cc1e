use super::{Star, trail::Trail};
use crate::config::StarfieldConfig;
use std::f32::consts::TAU;

/// Rejection-sampling budget per star before falling back to the exclusion
/// boundary.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;

/// Number of stars a `width` x `height` canvas holds at `density`.
pub fn star_count(width: f32, height: f32, density: f32) -> usize {
    // `as` saturates negatives and NaN to zero
    (width * height * density).floor() as usize
}

pub fn generate_stars(
    width: f32,
    height: f32,
    config: &StarfieldConfig,
    rng: &mut fastrand::Rng,
) -> Vec<Star> {
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let count = star_count(width, height, config.star_density);
    let center_x = width / 2.0;
    let center_y = height / 2.0;
    let exclusion_radius = config.exclusion_radius();
    let fade_dist = exclusion_radius * 1.5;
    let fade_span = fade_dist - exclusion_radius;

    let mut fallbacks = 0usize;
    let mut stars = Vec::with_capacity(count);

    for _ in 0..count {
        let (x, y) = match place_outside(rng, width, height, center_x, center_y, exclusion_radius) {
            Some(pos) => pos,
            None => {
                fallbacks += 1;
                boundary_point(rng, width, height, center_x, center_y, exclusion_radius)
            }
        };

        let dist = (x - center_x).hypot(y - center_y);
        let d_factor = if fade_span > 0.0 {
            ((dist - exclusion_radius) / fade_span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let twinkles = config.all_stars_twinkle || rng.f32() < config.twinkle_probability;
        let twinkle_speed = twinkles.then(|| {
            lerp(config.min_twinkle_speed, config.max_twinkle_speed, rng.f32())
        });

        stars.push(Star {
            x,
            y,
            radius: lerp(0.5, 0.55, rng.f32()),
            opacity: lerp(0.5, 1.0, rng.f32()) * d_factor,
            twinkle_speed,
            trail: Trail::default(),
        });
    }

    if fallbacks > 0 {
        log::debug!(
            "{fallbacks} of {count} stars fell back to the exclusion boundary (radius {exclusion_radius} on {width}x{height})"
        );
    }

    stars
}

fn place_outside(
    rng: &mut fastrand::Rng,
    width: f32,
    height: f32,
    center_x: f32,
    center_y: f32,
    exclusion_radius: f32,
) -> Option<(f32, f32)> {
    (0..MAX_PLACEMENT_ATTEMPTS)
        .map(|_| (rng.f32() * width, rng.f32() * height))
        .find(|&(x, y)| (x - center_x).hypot(y - center_y) >= exclusion_radius)
}

/// Best-effort placement when the exclusion disc swallows the canvas: a
/// random sample pushed out radially onto the disc edge, never inside it.
fn boundary_point(
    rng: &mut fastrand::Rng,
    width: f32,
    height: f32,
    center_x: f32,
    center_y: f32,
    exclusion_radius: f32,
) -> (f32, f32) {
    let dx = rng.f32() * width - center_x;
    let dy = rng.f32() * height - center_y;
    let angle = if dx == 0.0 && dy == 0.0 {
        rng.f32() * TAU
    } else {
        dy.atan2(dx)
    };
    let (sin, cos) = angle.sin_cos();

    // rounding can land the projection just inside the circle
    let mut radius = exclusion_radius;
    let mut bump = f32::EPSILON;
    loop {
        let x = center_x + cos * radius;
        let y = center_y + sin * radius;
        if (x - center_x).hypot(y - center_y) >= exclusion_radius || !radius.is_finite() {
            return (x, y);
        }
        radius *= 1.0 + bump;
        bump *= 2.0;
    }
}

fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}
