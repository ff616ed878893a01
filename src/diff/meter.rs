//! Time signature changes per (part, measure)

use std::collections::BTreeMap;

use super::structure::find_part;
use super::{ChangeKind, DiffEntry, DiffScope, Location};
use crate::models::{Part, Score, TimeSignature};

/// Coarse meter family; declaration order is the complexity order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MeterClass {
    Simple,
    Compound,
    Irregular,
}

impl MeterClass {
    pub fn of(time_signature: &TimeSignature) -> Self {
        match time_signature.numerator {
            1..=4 => MeterClass::Simple,
            6 | 9 | 12 => MeterClass::Compound,
            _ => MeterClass::Irregular,
        }
    }
}

/// First declared signature of each measure number across the part's voices
fn signatures(part: &Part) -> BTreeMap<u32, TimeSignature> {
    let mut map = BTreeMap::new();
    for voice in part.sorted_voices() {
        for measure in &voice.measures {
            map.entry(measure.number).or_insert(measure.time_signature);
        }
    }
    map
}

pub fn classify(before: &TimeSignature, after: &TimeSignature) -> Option<(ChangeKind, String)> {
    if before == after {
        return None;
    }
    if before.capacity() == after.capacity() {
        return Some((
            ChangeKind::SubdivisionChange,
            format!("Meter regrouped from {} to {} with the same measure length", before, after),
        ));
    }
    if before.denominator == after.denominator {
        let simpler = (MeterClass::of(after), after.numerator) < (MeterClass::of(before), before.numerator);
        return Some(if simpler {
            (ChangeKind::MeterSimplification, format!("Meter simplified from {} to {}", before, after))
        } else {
            (ChangeKind::MeterComplexification, format!("Meter made more complex from {} to {}", before, after))
        });
    }
    Some((
        ChangeKind::MeterChange,
        format!("Meter changed from {} to {} (beat count and beat unit both differ)", before, after),
    ))
}

pub fn compare_meters(before: &Score, after: &Score) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    for old_part in before.sorted_parts() {
        let Some(new_part) = find_part(after, &old_part.name) else {
            continue;
        };
        let new_signatures = signatures(new_part);
        for (number, old_sig) in signatures(old_part) {
            let Some(new_sig) = new_signatures.get(&number) else {
                continue;
            };
            if let Some((kind, description)) = classify(&old_sig, new_sig) {
                let location = Location::measure(&old_part.name, None, number);
                entries.push(
                    DiffEntry::new(DiffScope::Measure, location, kind, description)
                        .with_values(old_sig.to_string(), new_sig.to_string()),
                );
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(before: (u32, u32), after: (u32, u32)) -> Option<ChangeKind> {
        classify(&TimeSignature::new(before.0, before.1), &TimeSignature::new(after.0, after.1)).map(|(k, _)| k)
    }

    #[test]
    fn test_meter_classification() {
        assert_eq!(kind((4, 4), (4, 4)), None);
        assert_eq!(kind((6, 8), (3, 4)), Some(ChangeKind::SubdivisionChange));
        assert_eq!(kind((6, 8), (3, 8)), Some(ChangeKind::MeterSimplification));
        assert_eq!(kind((7, 8), (6, 8)), Some(ChangeKind::MeterSimplification));
        assert_eq!(kind((3, 4), (4, 4)), Some(ChangeKind::MeterComplexification));
        assert_eq!(kind((4, 4), (5, 4)), Some(ChangeKind::MeterComplexification));
        assert_eq!(kind((4, 4), (6, 8)), Some(ChangeKind::MeterChange));
    }

    #[test]
    fn test_compare_by_part_and_measure() {
        let text = |sig: &str| {
            format!(
                "PART Alto ROLE choir\nVOICE 1\nMEASURE 1 TIME 4/4\nREST t=0 dur=1/2\nMEASURE 2 TIME {}\n\
                 REST t=0 dur=1/4\n",
                sig
            )
        };
        let before = crate::parse::parse_text(&text("3/4")).unwrap();
        let after = crate::parse::parse_text(&text("2/4")).unwrap();
        let entries = compare_meters(&before, &after);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location.measure, Some(2));
        assert_eq!(entries[0].description, "Meter simplified from 3/4 to 2/4");
    }
}
