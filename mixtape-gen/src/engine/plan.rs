//! Timeline planning with overlapping crossfades
//!
//! Places an ordered list of resolved segments on a single output timeline.
//! Adjacent segments overlap by `min(fade_out, next.fade_in)`, so the
//! crossfade window never exceeds either segment's own fade length: every
//! fade curve completes fully inside the overlap, with no abrupt volume jump
//! and no silent gap. All arithmetic is integer milliseconds, so planning the
//! same segment list twice yields an identical plan.

use thiserror::Error;

use super::segment::Segment;

/// Planning failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Nothing to mix
    #[error("no segments to mix")]
    EmptyInput,
}

/// One segment placed on the output timeline
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlanEntry {
    /// The resolved segment
    pub segment: Segment,
    /// Where this segment begins playing on the output timeline (ms);
    /// its fade-in ramp starts here
    pub output_start_ms: u64,
    /// Duration this segment's tail plays simultaneously with the next
    /// segment's head (ms); 0 for the last entry
    pub overlap_with_next_ms: u64,
}

/// Ordered placement of segments on the single output timeline
#[derive(Debug, Clone, PartialEq)]
pub struct MixPlan {
    entries: Vec<MixPlanEntry>,
    total_duration_ms: u64,
}

impl MixPlan {
    /// Plan the timeline for an ordered segment list.
    ///
    /// The entry order is the input order; the planner never reorders.
    ///
    /// # Examples
    ///
    /// Two segments, A (10 s, fade-out 3 s) then B (8 s, fade-in 2 s):
    /// the overlap is `min(3, 2) = 2 s`, B starts at `10 - 2 = 8 s`, and the
    /// total is `10 + 8 - 2 = 16 s`.
    pub fn build(segments: &[Segment]) -> Result<MixPlan, PlanError> {
        if segments.is_empty() {
            return Err(PlanError::EmptyInput);
        }

        let mut entries = Vec::with_capacity(segments.len());
        let mut output_start_ms = 0u64;
        for (i, segment) in segments.iter().enumerate() {
            let overlap_with_next_ms = match segments.get(i + 1) {
                Some(next) => segment.fade_out_ms.min(next.fade_in_ms),
                None => 0,
            };
            entries.push(MixPlanEntry {
                segment: segment.clone(),
                output_start_ms,
                overlap_with_next_ms,
            });
            // overlap <= fade_out <= duration, so this never underflows
            output_start_ms += segment.duration_ms() - overlap_with_next_ms;
        }

        // The loop leaves output_start_ms at last.start + last.duration,
        // which equals sum(durations) - sum(overlaps)
        let total_duration_ms = output_start_ms;

        Ok(MixPlan {
            entries,
            total_duration_ms,
        })
    }

    /// Entries in output order
    pub fn entries(&self) -> &[MixPlanEntry] {
        &self.entries
    }

    /// Total duration of the mixed output in milliseconds
    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// Number of placed segments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the plan holds no entries (never produced by [`MixPlan::build`])
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
