//! Frames shown while the door is held open.
//!
//! The schedule is pure data: it knows the frame cycle, the window and the
//! cadence, and hands out `(frame, hold)` steps. Writing the frames and
//! sleeping for the holds is the access session's job.
//!
//! For a window `W` and cadence `C` the schedule yields `ceil(W / C)` steps.
//! Every step holds for `C` except the last, which holds for whatever is left
//! of the window, so the holds add up to exactly `W`.

use crate::messages::{self, DisplayMessages};
use latchkey_hardware::DisplayFrame;
use std::time::Duration;
use tokio::time::Instant;

/// The open window of one granted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWindow {
    pub opened_at: Instant,
    pub duration: Duration,
}

impl OpenWindow {
    /// Window starting now.
    pub fn start(duration: Duration) -> Self {
        Self {
            opened_at: Instant::now(),
            duration,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.opened_at.elapsed()
    }

    /// Time left before the window closes (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.duration
    }
}

/// One entry of the rotation: what to show and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStep {
    pub frame: DisplayFrame,
    pub hold: Duration,
}

/// Restartable rotation over the open-window frames.
///
/// # Examples
///
/// ```
/// use latchkey_controller::RotationSchedule;
/// use std::time::Duration;
///
/// let schedule = RotationSchedule::new("Ana", Duration::from_secs(5), Duration::from_millis(1500));
/// let steps: Vec<_> = schedule.iter().collect();
///
/// assert_eq!(steps.len(), 4);
/// assert_eq!(steps[0].frame.line1, "Welcome");
/// assert_eq!(steps[1].frame.line1, "Door Open");
/// assert_eq!(steps[3].hold, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSchedule {
    cycle: Vec<DisplayFrame>,
    window: Duration,
    cadence: Duration,
}

impl RotationSchedule {
    /// Two-frame cycle: a welcome frame with the person's name, then the
    /// door-open frame with the window length.
    pub fn new(name: &str, window: Duration, cadence: Duration) -> Self {
        Self::with_cycle(
            vec![
                DisplayFrame::new(DisplayMessages::WELCOME, name),
                DisplayFrame::new(DisplayMessages::DOOR_OPEN, messages::open_for(window)),
            ],
            window,
            cadence,
        )
    }

    /// Schedule over an arbitrary frame cycle.
    pub fn with_cycle(cycle: Vec<DisplayFrame>, window: Duration, cadence: Duration) -> Self {
        Self {
            cycle,
            window,
            cadence,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Frames in one period of the rotation.
    pub fn cycle(&self) -> &[DisplayFrame] {
        &self.cycle
    }

    /// Number of steps the schedule yields.
    ///
    /// A zero cadence is treated as a single step spanning the whole window.
    pub fn step_count(&self) -> usize {
        if self.window.is_zero() || self.cycle.is_empty() {
            return 0;
        }
        if self.cadence.is_zero() {
            return 1;
        }
        let window = self.window.as_nanos();
        let cadence = self.cadence.as_nanos();
        usize::try_from(window.div_ceil(cadence)).unwrap_or(usize::MAX)
    }

    /// Iterate from the first frame. Each call starts over.
    pub fn iter(&self) -> RotationIter<'_> {
        RotationIter {
            schedule: self,
            index: 0,
            count: self.step_count(),
        }
    }
}

impl<'a> IntoIterator for &'a RotationSchedule {
    type Item = RotationStep;
    type IntoIter = RotationIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over a [`RotationSchedule`].
#[derive(Debug, Clone)]
pub struct RotationIter<'a> {
    schedule: &'a RotationSchedule,
    index: usize,
    count: usize,
}

impl Iterator for RotationIter<'_> {
    type Item = RotationStep;

    fn next(&mut self) -> Option<RotationStep> {
        if self.index >= self.count {
            return None;
        }

        let schedule = self.schedule;
        let frame = schedule.cycle[self.index % schedule.cycle.len()].clone();
        let hold = if self.count == 1 {
            schedule.window
        } else {
            let elapsed = schedule
                .cadence
                .saturating_mul(u32::try_from(self.index).unwrap_or(u32::MAX));
            schedule
                .window
                .saturating_sub(elapsed)
                .min(schedule.cadence)
        };

        self.index += 1;
        Some(RotationStep { frame, hold })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RotationIter<'_> {}
