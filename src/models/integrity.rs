//! Measure-level integrity checks shared by the parser, the importer and
//! the transformation validator

use std::fmt;

use super::core::Measure;
use super::elements::Event;
use num_traits::CheckedAdd;

use super::time::{checked_sum, format_rational, zero, Rational};

/// A measure-level violation of the score invariants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasureProblem {
    /// Two sounding events overlap; onsets of the earlier and later event
    Overlap { earlier: Rational, later: Rational },
    /// Summed note/rest duration is larger than the time signature allows
    OverCapacity { total: Rational, capacity: Rational },
    /// A note or rest runs past the end of the measure
    PastEnd { onset: Rational },
    NegativeOnset { onset: Rational },
    NonPositiveDuration { onset: Rational },
    /// Times too finely divided to add up exactly
    Unmeasurable { onset: Rational },
}

impl fmt::Display for MeasureProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureProblem::Overlap { earlier, later } => write!(
                f,
                "event at t={} starts before the event at t={} has ended",
                format_rational(later),
                format_rational(earlier)
            ),
            MeasureProblem::OverCapacity { total, capacity } => write!(
                f,
                "notes and rests add up to {} but the time signature allows {}",
                format_rational(total),
                format_rational(capacity)
            ),
            MeasureProblem::PastEnd { onset } => {
                write!(f, "event at t={} runs past the end of the measure", format_rational(onset))
            }
            MeasureProblem::NegativeOnset { onset } => {
                write!(f, "onset t={} is negative", format_rational(onset))
            }
            MeasureProblem::NonPositiveDuration { onset } => {
                write!(f, "event at t={} has no positive duration", format_rational(onset))
            }
            MeasureProblem::Unmeasurable { onset } => write!(
                f,
                "times from t={} on are divided too finely to add up exactly",
                format_rational(onset)
            ),
        }
    }
}

/// Overlaps between sounding events (notes and rests), in onset order
pub fn find_overlaps(measure: &Measure) -> Vec<MeasureProblem> {
    let mut sounding: Vec<(Rational, Rational)> = measure
        .events
        .iter()
        .filter_map(|e| e.duration().map(|d| (e.onset(), d)))
        .collect();
    sounding.sort_by_key(|(onset, _)| *onset);

    let mut problems = Vec::new();
    for pair in sounding.windows(2) {
        let (earlier, length) = pair[0];
        match earlier.checked_add(&length) {
            Some(end) if pair[1].0 < end => problems.push(MeasureProblem::Overlap { earlier, later: pair[1].0 }),
            Some(_) => {}
            None => problems.push(MeasureProblem::Unmeasurable { onset: earlier }),
        }
    }
    problems
}

/// Capacity problems: summed duration over `num/den`, or events running
/// past the barline
pub fn find_capacity_problems(measure: &Measure) -> Vec<MeasureProblem> {
    let capacity = measure.time_signature.capacity();
    let mut problems = Vec::new();

    match checked_sum(measure.events.iter().filter_map(Event::duration)) {
        Some(total) if total > capacity => problems.push(MeasureProblem::OverCapacity { total, capacity }),
        Some(_) => {}
        None => problems.push(MeasureProblem::Unmeasurable { onset: zero() }),
    }

    for event in measure.sorted_events() {
        if let Some(duration) = event.duration() {
            match event.onset().checked_add(&duration) {
                Some(end) if end > capacity => problems.push(MeasureProblem::PastEnd { onset: event.onset() }),
                Some(_) => {}
                None => problems.push(MeasureProblem::Unmeasurable { onset: event.onset() }),
            }
        }
    }
    problems
}

/// Negative onsets and non-positive durations
pub fn find_value_problems(measure: &Measure) -> Vec<MeasureProblem> {
    let mut problems = Vec::new();
    for event in &measure.events {
        if event.onset() < zero() {
            problems.push(MeasureProblem::NegativeOnset { onset: event.onset() });
        }
        if let Some(duration) = event.duration() {
            if duration <= zero() {
                problems.push(MeasureProblem::NonPositiveDuration { onset: event.onset() });
            }
        }
    }
    problems
}

/// Every problem of a measure; capacity is only checked when `strict_capacity`
pub fn check_measure(measure: &Measure, strict_capacity: bool) -> Vec<MeasureProblem> {
    let mut problems = find_value_problems(measure);
    problems.extend(find_overlaps(measure));
    if strict_capacity {
        problems.extend(find_capacity_problems(measure));
    }
    problems
}
