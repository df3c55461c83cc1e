use super::{Point, distortion::Distortion};
use crate::surface::{Rgb, Surface};
use std::collections::VecDeque;

pub const TRAIL_COLOR: Rgb = (255, 255, 255);

/// Recent distorted positions of one star, oldest first.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    points: VecDeque<Point>,
}

impl Trail {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[cfg(test)]
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Records this frame's position, or drops the whole trail once the star
    /// is outside the well or the pull is too weak to show.
    pub fn advance(&mut self, distortion: &Distortion, trail_length: usize, min_trail_strength: f32) {
        if distortion.in_gravity_zone && distortion.norm >= min_trail_strength {
            self.points.push_back(distortion.position());
            while self.points.len() > trail_length {
                self.points.pop_front();
            }
        } else {
            self.points.clear();
        }
    }

    /// Draws the trail as connected segments that brighten toward the newest
    /// point and dim with the effect strength.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, star_opacity: f32, norm: f32, trail_length: usize) {
        if self.points.len() < 2 {
            return;
        }
        let span = trail_length.saturating_sub(1);

        for (i, (from, to)) in self.points.iter().zip(self.points.iter().skip(1)).enumerate() {
            let alpha = segment_alpha(i, span, star_opacity, norm);
            surface.draw_line(*from, *to, TRAIL_COLOR, alpha);
        }
    }
}

fn segment_alpha(index: usize, span: usize, star_opacity: f32, norm: f32) -> f32 {
    let progress = if span == 0 { 0.0 } else { index as f32 / span as f32 };
    ((0.1 + progress * 0.3) * star_opacity) * norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCall, RecordingSurface};

    fn inside(x: f32, norm: f32) -> Distortion {
        Distortion { x, y: 0.0, norm, in_gravity_zone: true }
    }

    fn outside() -> Distortion {
        Distortion { x: 0.0, y: 0.0, norm: 0.0, in_gravity_zone: false }
    }

    #[test]
    fn bounded_fifo() {
        let mut trail = Trail::default();
        for i in 0..10 {
            trail.advance(&inside(i as f32, 1.0), 3, 0.1);
            assert!(trail.len() <= 3);
        }
        let xs: Vec<f32> = trail.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn leaving_the_zone_clears() {
        let mut trail = Trail::default();
        trail.advance(&inside(1.0, 1.0), 5, 0.1);
        trail.advance(&inside(2.0, 1.0), 5, 0.1);
        trail.advance(&outside(), 5, 0.1);
        assert!(trail.is_empty());
    }

    #[test]
    fn weak_pull_clears() {
        let mut trail = Trail::default();
        trail.advance(&inside(1.0, 0.9), 5, 0.3);
        assert_eq!(trail.len(), 1);
        trail.advance(&inside(2.0, 0.2), 5, 0.3);
        assert!(trail.is_empty());
        // threshold is inclusive
        trail.advance(&inside(3.0, 0.3), 5, 0.3);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn zero_length_never_retains() {
        let mut trail = Trail::default();
        trail.advance(&inside(1.0, 1.0), 0, 0.0);
        assert!(trail.is_empty());
    }

    #[test]
    fn single_point_draws_nothing() {
        let mut trail = Trail::default();
        trail.advance(&inside(1.0, 1.0), 4, 0.0);
        let mut surface = RecordingSurface::new(10, 10);
        trail.draw(&mut surface, 1.0, 1.0, 4);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn segments_fade_toward_the_oldest() {
        let mut trail = Trail::default();
        for i in 0..4 {
            trail.advance(&inside(i as f32, 1.0), 4, 0.0);
        }
        let mut surface = RecordingSurface::new(10, 10);
        trail.draw(&mut surface, 0.8, 0.5, 4);

        let alphas: Vec<f32> = surface
            .calls
            .iter()
            .map(|call| match call {
                DrawCall::Line { alpha, .. } => *alpha,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(alphas.len(), 3);
        for (i, alpha) in alphas.iter().enumerate() {
            let expected = (0.1 + (i as f32 / 3.0) * 0.3) * 0.8 * 0.5;
            assert!((alpha - expected).abs() < 1e-6);
        }
        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn segments_connect_consecutive_points() {
        let mut trail = Trail::default();
        for i in 0..3 {
            trail.advance(&inside(i as f32 * 2.0, 1.0), 5, 0.0);
        }
        let mut surface = RecordingSurface::new(10, 10);
        trail.draw(&mut surface, 1.0, 1.0, 5);
        match &surface.calls[..] {
            [DrawCall::Line { from: a, to: b, .. }, DrawCall::Line { from: c, to: d, .. }] => {
                assert_eq!((a.x, b.x), (0.0, 2.0));
                assert_eq!((c.x, d.x), (2.0, 4.0));
            }
            calls => panic!("unexpected calls {calls:?}"),
        }
    }
}
