/// One fired frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTick {
    /// Milliseconds since the previous fired frame (0 on the first).
    pub delta: f64,
    /// The host timestamp this frame fired at, in milliseconds.
    pub time: f64,
}

/// Host-driven frame loop.
///
/// The host calls [`tick`](Self::tick) with its animation-frame timestamp
/// and runs the per-frame work whenever a [`FrameTick`] comes back. In
/// variable mode every tick fires. In fixed mode ([`with_fps`](Self::with_fps))
/// a tick fires only once more than the interval has passed since the last
/// fired frame; skipped ticks leave that timestamp alone, so the next eligible
/// tick fires immediately with the full elapsed time.
///
/// ```
/// use phanto::FrameLoop;
///
/// let mut frames = FrameLoop::with_fps(30.0);
/// frames.start();
/// assert!(frames.tick(0.0).is_none());
/// assert!(frames.tick(16.0).is_none());
/// assert_eq!(frames.tick(40.0).map(|t| t.delta), Some(40.0));
/// ```
#[derive(Debug, Clone)]
pub struct FrameLoop {
    interval: Option<f64>,
    last: Option<f64>,
    running: bool,
    frame_index: u64,
}

impl FrameLoop {
    /// A stopped loop that fires on every tick.
    pub fn new() -> Self {
        Self {
            interval: None,
            last: None,
            running: false,
            frame_index: 0,
        }
    }

    /// A stopped loop capped at `fps` frames per second.
    ///
    /// A non-positive or non-finite `fps` gives a variable loop.
    pub fn with_fps(fps: f64) -> Self {
        let interval = (fps.is_finite() && fps > 0.0).then(|| 1000.0 / fps);
        if interval.is_none() {
            log::warn!("ignoring frame rate cap of {fps}; running uncapped");
        }
        Self {
            interval,
            ..Self::new()
        }
    }

    /// Target interval in milliseconds, if capped.
    pub fn interval(&self) -> Option<f64> {
        self.interval
    }

    /// Starts (or restarts) the loop. The next tick is treated as the first.
    pub fn start(&mut self) {
        self.running = true;
        self.last = None;
    }

    /// Stops the loop. No tick fires until [`start`](Self::start) is called
    /// again, including ticks the host already scheduled.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frames fired since creation.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Advances the loop to `time` (milliseconds) and reports whether this
    /// frame should run.
    pub fn tick(&mut self, time: f64) -> Option<FrameTick> {
        if !self.running {
            return None;
        }

        let last = *self.last.get_or_insert(time);
        let delta = time - last;

        if let Some(interval) = self.interval {
            if delta <= interval {
                return None;
            }
        }

        self.last = Some(time);
        self.frame_index = self.frame_index.wrapping_add(1);
        Some(FrameTick { delta, time })
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
