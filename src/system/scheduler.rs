//! Frame admission: cadence throttling and the reentrancy guard.
//!
//! The host pushes a callback for every camera frame, far more often than
//! inference is worth running. The scheduler admits every n-th arrival,
//! sheds arrivals that land while a frame is still being processed (no
//! queueing, worst-case backlog is one in-flight frame), and owns the
//! logical frame counter that anchor eviction is measured against.

use crate::config::SchedulerConfig;

/// Verdict on one frame arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAdmission {
    /// Process this frame.
    Admitted,
    /// Dropped by the skip-frame cadence.
    Throttled,
    /// Dropped because a previous frame is still in flight.
    Busy,
}

pub struct FrameScheduler {
    skip_factor: u32,
    arrivals: u32,
    current_frame: u64,
    in_flight: bool,
}

impl FrameScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            skip_factor: config.skip_factor.max(1),
            arrivals: 0,
            current_frame: 0,
            in_flight: false,
        }
    }

    /// Register a frame arrival. An `Admitted` verdict must be balanced by
    /// [`complete_frame`](Self::complete_frame) or
    /// [`abort_frame`](Self::abort_frame).
    pub fn on_frame(&mut self) -> FrameAdmission {
        if self.in_flight {
            return FrameAdmission::Busy;
        }
        self.arrivals += 1;
        if self.arrivals % self.skip_factor != 0 {
            return FrameAdmission::Throttled;
        }
        self.arrivals = 0;
        self.in_flight = true;
        FrameAdmission::Admitted
    }

    /// Logical number the currently admitted frame will carry once it
    /// completes. Observations made during processing are stamped with it.
    pub fn upcoming_frame(&self) -> u64 {
        self.current_frame + 1
    }

    /// Finish the admitted frame: release the guard, advance the counter.
    pub fn complete_frame(&mut self) -> u64 {
        self.in_flight = false;
        self.current_frame += 1;
        self.current_frame
    }

    /// Give up on the admitted frame without advancing the counter
    /// (acquisition or inference failure).
    pub fn abort_frame(&mut self) {
        self.in_flight = false;
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    #[cfg(test)]
    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(skip_factor: u32) -> FrameScheduler {
        FrameScheduler::new(&SchedulerConfig { skip_factor })
    }

    #[test]
    fn test_every_fifth_arrival_is_admitted() {
        let mut scheduler = scheduler(5);

        for _ in 0..4 {
            assert_eq!(scheduler.on_frame(), FrameAdmission::Throttled);
        }
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);
        scheduler.complete_frame();

        // the counter restarts after a processed frame
        for _ in 0..4 {
            assert_eq!(scheduler.on_frame(), FrameAdmission::Throttled);
        }
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);
    }

    #[test]
    fn test_skip_factor_one_admits_everything() {
        let mut scheduler = scheduler(1);
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);
        scheduler.complete_frame();
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);
    }

    #[test]
    fn test_overlapping_arrival_is_shed() {
        let mut scheduler = scheduler(1);
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);

        // still in flight: shed, and the arrival is not even counted
        assert_eq!(scheduler.on_frame(), FrameAdmission::Busy);
        assert_eq!(scheduler.on_frame(), FrameAdmission::Busy);

        scheduler.complete_frame();
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);
    }

    #[test]
    fn test_complete_advances_frame_counter() {
        let mut scheduler = scheduler(1);
        assert_eq!(scheduler.current_frame(), 0);

        scheduler.on_frame();
        assert_eq!(scheduler.upcoming_frame(), 1);
        assert_eq!(scheduler.complete_frame(), 1);
        assert_eq!(scheduler.current_frame(), 1);
    }

    #[test]
    fn test_abort_does_not_advance_frame_counter() {
        let mut scheduler = scheduler(1);
        scheduler.on_frame();
        scheduler.abort_frame();

        assert_eq!(scheduler.current_frame(), 0);
        // guard released: the next arrival can be admitted again
        assert_eq!(scheduler.on_frame(), FrameAdmission::Admitted);
    }
}
