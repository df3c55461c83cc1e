use std::time::{Duration, Instant};

/// Handle for a requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// "Run my frame callback before the next repaint."
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel(&mut self, request: FrameRequest);
}

/// Fixed-rate frame pacing for the terminal event loop.
///
/// At most one request is pending. Frames that arrive late are not caught up:
/// the next deadline is measured from when the late frame was handed out.
pub struct FramePacer {
    interval: Duration,
    next_deadline: Instant,
    pending: Option<FrameRequest>,
    next_id: u64,
}

impl FramePacer {
    pub fn new(fps: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            next_deadline: now,
            pending: None,
            next_id: 0,
        }
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// How long the event loop may block before the pending frame is due.
    /// `None` when nothing is pending.
    pub fn until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|_| self.next_deadline.saturating_duration_since(now))
    }

    /// Hands out the pending request once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameRequest> {
        if now < self.next_deadline {
            return None;
        }
        let request = self.pending.take()?;
        self.next_deadline += self.interval;
        if self.next_deadline < now {
            self.next_deadline = now + self.interval;
        }
        Some(request)
    }
}

impl FrameScheduler for FramePacer {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

/// Scheduler that only records requests; tests fire frames by hand.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct ManualScheduler {
    pub(crate) pending: Option<FrameRequest>,
    pub(crate) cancelled: Vec<FrameRequest>,
    next_id: u64,
}

#[cfg(test)]
impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel(&mut self, request: FrameRequest) {
        self.cancelled.push(request);
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_due_without_a_request() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(60, now);
        assert_eq!(pacer.until_due(now), None);
        assert_eq!(pacer.take_due(now + Duration::from_secs(1)), None);
    }

    #[test]
    fn first_request_is_due_immediately() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(60, now);
        let request = pacer.request_frame();
        assert_eq!(pacer.until_due(now), Some(Duration::ZERO));
        assert_eq!(pacer.take_due(now), Some(request));
        assert_eq!(pacer.pending(), None);
    }

    #[test]
    fn subsequent_frames_wait_one_interval() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(50, start);
        pacer.request_frame();
        pacer.take_due(start).unwrap();

        let next = pacer.request_frame();
        assert_eq!(pacer.take_due(start + Duration::from_millis(5)), None);
        assert_eq!(pacer.until_due(start + Duration::from_millis(5)), Some(Duration::from_millis(15)));
        assert_eq!(pacer.take_due(start + Duration::from_millis(20)), Some(next));
    }

    #[test]
    fn late_frames_are_not_caught_up() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(100, start);
        pacer.request_frame();
        let late = start + Duration::from_millis(500);
        pacer.take_due(late).unwrap();

        pacer.request_frame();
        assert_eq!(pacer.take_due(late + Duration::from_millis(1)), None);
        assert!(pacer.take_due(late + Duration::from_millis(10)).is_some());
    }

    #[test]
    fn cancelled_request_never_fires() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(60, now);
        let request = pacer.request_frame();
        pacer.cancel(request);
        assert_eq!(pacer.take_due(now + Duration::from_secs(1)), None);
    }

    #[test]
    fn stale_cancel_keeps_newer_request() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(60, now);
        let old = pacer.request_frame();
        let new = pacer.request_frame();
        pacer.cancel(old);
        assert_eq!(pacer.take_due(now), Some(new));
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        let pacer = FramePacer::new(0, Instant::now());
        assert_eq!(pacer.interval(), Duration::from_secs(1));
    }
}
