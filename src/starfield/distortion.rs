use super::Point;
use crate::config::StarfieldConfig;

/// The gravity well parameters, lifted out of [`StarfieldConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityParams {
    pub gravity_strength: f32,
    pub swirl_strength: f32,
    pub gravity_radius_factor: f32,
    pub inner_gravity_radius_factor: f32,
    pub swirl_rotation_speed: f32,
}

impl From<&StarfieldConfig> for GravityParams {
    fn from(config: &StarfieldConfig) -> Self {
        Self {
            gravity_strength: config.gravity_strength,
            swirl_strength: config.swirl_strength,
            gravity_radius_factor: config.gravity_radius_factor,
            inner_gravity_radius_factor: config.inner_gravity_radius_factor,
            swirl_rotation_speed: config.swirl_rotation_speed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distortion {
    pub x: f32,
    pub y: f32,
    /// Effect strength in `[0, 1]`.
    pub norm: f32,
    pub in_gravity_zone: bool,
}

impl Distortion {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Lensed position of a star at `time_ms`.
///
/// Stars inside the inner radius get the full effect, then strength falls off
/// linearly to zero at the outer radius. The star is pushed outward by
/// `gravity_strength * norm` and rotated by a fixed swirl plus a time-driven
/// rotation, both scaled by `norm`. Pure: the same inputs always give the
/// same output.
///
/// The angle is accumulated in `f64` so the rotation keeps advancing after
/// days of uptime.
pub fn distort(home: Point, width: f32, height: f32, params: &GravityParams, time_ms: f64) -> Distortion {
    let center_x = width / 2.0;
    let center_y = height / 2.0;
    let dx = home.x - center_x;
    let dy = home.y - center_y;
    let dist = dx.hypot(dy);

    let min_side = width.min(height);
    let outer_radius = min_side * params.gravity_radius_factor;
    let inner_radius = min_side * params.inner_gravity_radius_factor;

    if dist >= outer_radius {
        return Distortion {
            x: home.x,
            y: home.y,
            norm: 0.0,
            in_gravity_zone: false,
        };
    }

    let norm = if dist < inner_radius {
        1.0
    } else {
        (outer_radius - dist) / (outer_radius - inner_radius)
    };

    let new_dist = dist * (1.0 + params.gravity_strength * norm);
    let rotation = time_ms * params.swirl_rotation_speed as f64;
    let angle = dy.atan2(dx) as f64 + (params.swirl_strength * norm) as f64 + rotation * norm as f64;
    let (sin, cos) = angle.sin_cos();

    Distortion {
        x: center_x + cos as f32 * new_dist,
        y: center_y + sin as f32 * new_dist,
        norm,
        in_gravity_zone: true,
    }
}
