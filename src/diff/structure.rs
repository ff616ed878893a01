//! Parts, voices and measures present in only one version

use std::collections::BTreeSet;

use super::{ChangeKind, DiffEntry, DiffScope, Location};
use crate::models::{Part, Score, Voice};

pub fn compare_structure(before: &Score, after: &Score) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for part in after.sorted_parts() {
        if find_part(before, &part.name).is_none() {
            entries.push(
                DiffEntry::new(
                    DiffScope::Part,
                    Location::part(&part.name),
                    ChangeKind::Added,
                    format!("Added part {} ({})", part.name, part.role),
                )
                .with_values("", part.name.clone()),
            );
        }
    }

    for old in before.sorted_parts() {
        match find_part(after, &old.name) {
            None => entries.push(
                DiffEntry::new(
                    DiffScope::Part,
                    Location::part(&old.name),
                    ChangeKind::Removed,
                    format!("Removed part {}", old.name),
                )
                .with_values(old.name.clone(), ""),
            ),
            Some(new) => entries.extend(compare_part(old, new)),
        }
    }
    entries
}

fn compare_part(old: &Part, new: &Part) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    if old.role != new.role {
        entries.push(
            DiffEntry::new(
                DiffScope::Part,
                Location::part(&old.name),
                ChangeKind::Changed,
                format!("{} changed from {} part to {} part", old.name, old.role, new.role),
            )
            .with_values(old.role.as_str(), new.role.as_str()),
        );
    }

    for voice in new.sorted_voices() {
        if find_voice(old, &voice.id).is_none() {
            entries.push(DiffEntry::new(
                DiffScope::Voice,
                Location::voice(&old.name, &voice.id),
                ChangeKind::Added,
                format!("Added voice {} to {}", voice.id, old.name),
            ));
        }
    }
    for voice in old.sorted_voices() {
        match find_voice(new, &voice.id) {
            None => entries.push(DiffEntry::new(
                DiffScope::Voice,
                Location::voice(&old.name, &voice.id),
                ChangeKind::Removed,
                format!("Removed voice {} from {}", voice.id, old.name),
            )),
            Some(new_voice) => entries.extend(compare_measures(&old.name, voice, new_voice)),
        }
    }
    entries
}

fn compare_measures(part: &str, old: &Voice, new: &Voice) -> Vec<DiffEntry> {
    let old_numbers: BTreeSet<u32> = old.measures.iter().map(|m| m.number).collect();
    let new_numbers: BTreeSet<u32> = new.measures.iter().map(|m| m.number).collect();

    let added = new_numbers.difference(&old_numbers).map(|n| (*n, ChangeKind::Added, "Added"));
    let removed = old_numbers.difference(&new_numbers).map(|n| (*n, ChangeKind::Removed, "Removed"));
    added
        .chain(removed)
        .map(|(number, kind, verb)| {
            DiffEntry::new(
                DiffScope::Measure,
                Location::measure(part, Some(&old.id), number),
                kind,
                format!("{} measure {} in {} voice {}", verb, number, part, old.id),
            )
        })
        .collect()
}

/// Voices present in both versions of a shared part, canonical order
pub(crate) fn shared_voices<'a>(before: &'a Score, after: &'a Score) -> Vec<(&'a str, &'a Voice, &'a Voice)> {
    let mut shared = Vec::new();
    for old_part in before.sorted_parts() {
        let Some(new_part) = find_part(after, &old_part.name) else {
            continue;
        };
        for old_voice in old_part.sorted_voices() {
            if let Some(new_voice) = find_voice(new_part, &old_voice.id) {
                shared.push((old_part.name.as_str(), old_voice, new_voice));
            }
        }
    }
    shared
}

pub(crate) fn find_part<'a>(score: &'a Score, name: &str) -> Option<&'a Part> {
    score.parts.iter().find(|p| p.name == name)
}

pub(crate) fn find_voice<'a>(part: &'a Part, id: &str) -> Option<&'a Voice> {
    part.voices.iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_text;

    #[test]
    fn test_added_removed_parts_and_voices() {
        let before = parse_text(
            "PART Alto ROLE choir\nVOICE 1\nMEASURE 1 TIME 2/4\nPART Tenor ROLE choir\nVOICE 1\nMEASURE 1 TIME 2/4\n\
             VOICE 2\nMEASURE 1 TIME 2/4\n",
        )
        .unwrap();
        let after = parse_text(
            "PART Bass ROLE choir\nVOICE 1\nMEASURE 1 TIME 2/4\nPART Tenor ROLE choir\nVOICE 1\nMEASURE 1 TIME 2/4\n\
             MEASURE 2 TIME 2/4\n",
        )
        .unwrap();

        let entries = compare_structure(&before, &after);
        let summary: Vec<(DiffScope, ChangeKind)> = entries.iter().map(|e| (e.scope, e.kind)).collect();
        assert_eq!(
            summary,
            vec![
                (DiffScope::Part, ChangeKind::Added),
                (DiffScope::Part, ChangeKind::Removed),
                (DiffScope::Measure, ChangeKind::Added),
                (DiffScope::Voice, ChangeKind::Removed),
            ]
        );
        assert_eq!(entries[0].description, "Added part Bass (choir)");
        assert_eq!(entries[2].description, "Added measure 2 in Tenor voice 1");
    }
}
