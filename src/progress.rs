/// Milestone granularity, in percent.
pub const STEP: u32 = 5;

/// Counts visited cells across every layer of a render and reports each crossed multiple
/// of [`STEP`] percent exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    total: u64,
    completed: u64,
    /// Highest milestone reported so far, if any.
    reported: Option<u32>,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        ProgressTracker {
            total,
            completed: 0,
            reported: None,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Records one finished unit of work and returns the milestones it crossed, lowest first.
    pub fn advance(&mut self) -> impl Iterator<Item = u32> {
        self.completed = (self.completed + 1).min(self.total);
        let percent = if self.total == 0 {
            0
        } else {
            (self.completed * 100 / self.total) as u32
        };
        self.report_through(percent / STEP * STEP)
    }

    /// Reports 100% if it has not been reported yet. Call once all work is done.
    pub fn finish(&mut self) -> Option<u32> {
        self.completed = self.total;
        if self.reported == Some(100) {
            return None;
        }
        self.reported = Some(100);
        Some(100)
    }

    fn report_through(&mut self, milestone: u32) -> impl Iterator<Item = u32> {
        let first = self.reported.map_or(STEP, |r| r + STEP);
        if milestone >= first {
            self.reported = Some(milestone);
        }
        (first..=milestone).step_by(STEP as usize)
    }
}
