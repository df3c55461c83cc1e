/// Opacity a twinkling star should show at `time_ms`, or `None` to leave it
/// alone.
///
/// `speed` is the oscillation period scale in seconds; the result stays in
/// `[0.8, 1.3]`. Time stays `f64` until the phase is taken.
pub fn twinkle(speed: Option<f32>, time_ms: f64) -> Option<f32> {
    let speed = speed?;
    let phase = (time_ms * 0.001) / speed as f64;
    Some(0.8 + phase.sin().abs() as f32 * 0.5)
}
