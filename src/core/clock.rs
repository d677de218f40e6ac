use std::time::Instant;

/// Timing for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started; never decreases
    pub elapsed: f64,
    /// Seconds since the previous tick
    pub delta: f32,
}

/// Session clock, read once per frame
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Sample elapsed and delta time
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let time = FrameTime {
            elapsed: now.duration_since(self.start).as_secs_f64(),
            delta: now.duration_since(self.last_tick).as_secs_f32(),
        };
        self.last_tick = now;
        time
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames-per-second estimate refreshed once per interval
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    interval: f32,
    frames: u32,
    accumulated: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            frames: 0,
            accumulated: 0.0,
            fps: 0.0,
        }
    }

    /// Count a frame; returns the new estimate when the interval rolls over
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.accumulated += delta;

        if self.accumulated >= self.interval {
            self.fps = self.frames as f32 / self.accumulated;
            self.frames = 0;
            self.accumulated = 0.0;
            Some(self.fps)
        } else {
            None
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let time = clock.tick();

        // Should be roughly 10ms = 0.01s
        assert!(time.delta >= 0.009);
        assert!(time.elapsed >= 0.009);
    }

    #[test]
    fn elapsed_is_monotonic() {
        let mut clock = Clock::new();
        let first = clock.tick();
        thread::sleep(Duration::from_millis(2));
        let second = clock.tick();

        assert!(second.elapsed > first.elapsed);
        assert!(second.delta >= 0.001);
    }

    #[test]
    fn fps_reports_after_interval() {
        let mut counter = FpsCounter::new(1.0);
        for _ in 0..59 {
            assert_eq!(counter.tick(1.0 / 60.0), None);
        }
        let fps = counter.tick(1.0 / 60.0 + 0.001).unwrap();
        assert!((fps - 60.0).abs() < 0.1);
        assert_eq!(counter.fps(), fps);
    }
}
