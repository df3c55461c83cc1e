use crate::config::StarfieldConfig;
use crate::scheduler::{FrameRequest, FrameScheduler};
use crate::starfield::{
    StarField,
    distortion::{GravityParams, distort},
    twinkle::twinkle,
};
use crate::surface::{Rgb, Surface};

pub const STAR_COLOR: Rgb = (255, 255, 255);

enum DriverState<S> {
    /// No drawable surface, or unmounted.
    Idle,
    Running {
        surface: S,
        field: StarField,
        pending: Option<FrameRequest>,
    },
}

/// Drives the starfield one frame at a time on a mounted surface.
///
/// Frames only run when the host hands back the request this animator last
/// made, so cancelled or stale requests are ignored.
pub struct Animator<S, F> {
    config: StarfieldConfig,
    params: GravityParams,
    scheduler: F,
    rng: fastrand::Rng,
    state: DriverState<S>,
}

impl<S: Surface, F: FrameScheduler> Animator<S, F> {
    pub fn new(config: StarfieldConfig, scheduler: F) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            params: GravityParams::from(&config),
            config,
            scheduler,
            rng,
            state: DriverState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    #[cfg(test)]
    pub fn surface(&self) -> Option<&S> {
        match &self.state {
            DriverState::Running { surface, .. } => Some(surface),
            DriverState::Idle => None,
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        match &mut self.state {
            DriverState::Running { surface, .. } => Some(surface),
            DriverState::Idle => None,
        }
    }

    pub fn field(&self) -> Option<&StarField> {
        match &self.state {
            DriverState::Running { field, .. } => Some(field),
            DriverState::Idle => None,
        }
    }

    /// Starts animating on `surface`. Without a surface the animator quietly
    /// stays idle.
    pub fn mount(&mut self, surface: Option<S>) {
        if self.is_running() {
            self.unmount();
        }
        let Some(surface) = surface else {
            log::debug!("no drawable surface, starfield stays idle");
            return;
        };

        let (width, height) = surface.size();
        let field = StarField::new(width as f32, height as f32, &self.config, &mut self.rng);
        log::debug!("mounted on {}x{} with {} stars", width, height, field.stars().len());

        let pending = Some(self.scheduler.request_frame());
        self.state = DriverState::Running { surface, field, pending };
    }

    /// Stops animating and hands the surface back.
    pub fn unmount(&mut self) -> Option<S> {
        match std::mem::replace(&mut self.state, DriverState::Idle) {
            DriverState::Running { surface, pending, .. } => {
                if let Some(request) = pending {
                    self.scheduler.cancel(request);
                }
                log::debug!("unmounted");
                Some(surface)
            }
            DriverState::Idle => None,
        }
    }

    /// Host resize notification. Swaps in a whole new star array; the next
    /// frame picks it up.
    pub fn resize(&mut self, width: usize, height: usize) {
        let DriverState::Running { surface, field, .. } = &mut self.state else {
            return;
        };
        surface.resize(width, height);
        field.regenerate(width as f32, height as f32, &self.config, &mut self.rng);
    }

    /// Reseeds the field at the current size.
    pub fn regenerate(&mut self) {
        let DriverState::Running { field, .. } = &mut self.state else {
            return;
        };
        let (width, height) = field.size();
        field.regenerate(width, height, &self.config, &mut self.rng);
    }

    /// Frame callback. Every star is lensed, its trail advanced and drawn,
    /// the star drawn, then its twinkle applied, so a frame shows the opacity
    /// computed on the frame before.
    pub fn frame(&mut self, request: FrameRequest, time_ms: f64) {
        let DriverState::Running { surface, field, pending } = &mut self.state else {
            return;
        };
        if *pending != Some(request) {
            return;
        }

        surface.clear();

        let (width, height) = field.size();
        let trail_length = self.config.trail_length;
        let min_trail_strength = self.config.min_trail_strength;

        for star in field.stars_mut() {
            let distortion = distort(star.home(), width, height, &self.params, time_ms);

            star.trail.advance(&distortion, trail_length, min_trail_strength);
            star.trail.draw(surface, star.opacity, distortion.norm, trail_length);
            surface.fill_circle(distortion.position(), star.radius, STAR_COLOR, star.opacity);

            if let Some(opacity) = twinkle(star.twinkle_speed, time_ms) {
                star.opacity = opacity;
            }
        }

        *pending = Some(self.scheduler.request_frame());
    }
}
