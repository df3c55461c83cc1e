pub mod distortion;
pub mod generator;
pub mod trail;
pub mod twinkle;

use crate::config::StarfieldConfig;
use trail::Trail;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub struct Star {
    /// Home position; distortion is derived from it every frame.
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub opacity: f32,
    pub twinkle_speed: Option<f32>,
    pub trail: Trail,
}

impl Star {
    pub fn home(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// All stars for one canvas size.
///
/// A resize swaps in a freshly generated `Vec`; individual stars are never
/// added or removed.
pub struct StarField {
    stars: Vec<Star>,
    width: f32,
    height: f32,
    generation: u64,
}

impl StarField {
    pub fn new(width: f32, height: f32, config: &StarfieldConfig, rng: &mut fastrand::Rng) -> Self {
        Self {
            stars: generator::generate_stars(width, height, config, rng),
            width,
            height,
            generation: 0,
        }
    }

    pub fn regenerate(&mut self, width: f32, height: f32, config: &StarfieldConfig, rng: &mut fastrand::Rng) {
        self.stars = generator::generate_stars(width, height, config, rng);
        self.width = width;
        self.height = height;
        self.generation += 1;
        log::debug!(
            "starfield generation {}: {} stars on {}x{}",
            self.generation,
            self.stars.len(),
            width,
            height
        );
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn stars_mut(&mut self) -> &mut [Star] {
        &mut self.stars
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
