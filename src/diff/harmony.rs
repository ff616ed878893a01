//! Chord symbols compared by location

use std::collections::{BTreeMap, BTreeSet};

use super::structure::shared_voices;
use super::{ChangeKind, DiffEntry, DiffScope, Location};
use crate::models::time::Rational;
use crate::models::{HarmonyEvent, Score, TimeSignature, Voice};

fn harmony_map(voice: &Voice) -> BTreeMap<(u32, Rational), (&HarmonyEvent, TimeSignature)> {
    let mut map = BTreeMap::new();
    for measure in &voice.measures {
        for harmony in measure.events.iter().filter_map(|e| e.as_harmony()) {
            map.insert((measure.number, harmony.onset), (harmony, measure.time_signature));
        }
    }
    map
}

pub fn compare_harmony(before: &Score, after: &Score) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for (part, old_voice, new_voice) in shared_voices(before, after) {
        let old_map = harmony_map(old_voice);
        let new_map = harmony_map(new_voice);
        let keys: BTreeSet<&(u32, Rational)> = old_map.keys().chain(new_map.keys()).collect();

        for key in keys {
            let (measure, onset) = *key;
            match (old_map.get(key), new_map.get(key)) {
                (Some((old, time)), Some((new, _))) if old.symbol != new.symbol => entries.push(
                    DiffEntry::new(
                        DiffScope::Harmony,
                        Location::event(part, &old_voice.id, measure, onset, time),
                        ChangeKind::Changed,
                        format!("Chord changed from {} to {}", old.symbol, new.symbol),
                    )
                    .with_values(old.symbol.clone(), new.symbol.clone()),
                ),
                (None, Some((new, time))) => entries.push(
                    DiffEntry::new(
                        DiffScope::Harmony,
                        Location::event(part, &old_voice.id, measure, onset, time),
                        ChangeKind::Added,
                        format!("Added chord {}", new.symbol),
                    )
                    .with_values("", new.symbol.clone()),
                ),
                (Some((old, time)), None) => entries.push(
                    DiffEntry::new(
                        DiffScope::Harmony,
                        Location::event(part, &old_voice.id, measure, onset, time),
                        ChangeKind::Removed,
                        format!("Removed chord {}", old.symbol),
                    )
                    .with_values(old.symbol.clone(), ""),
                ),
                _ => {}
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_text;

    #[test]
    fn test_chord_changes() {
        let before = parse_text(
            "PART Piano ROLE instrument\nVOICE 1\nMEASURE 1 TIME 4/4\nHARMONY t=0 symbol=C\n\
             HARMONY t=1/2 symbol=G7\nREST t=0 dur=1\n",
        )
        .unwrap();
        let after = parse_text(
            "PART Piano ROLE instrument\nVOICE 1\nMEASURE 1 TIME 4/4\nHARMONY t=0 symbol=Cmaj7\n\
             HARMONY t=1/4 symbol=Am7\nREST t=0 dur=1\n",
        )
        .unwrap();

        let entries = compare_harmony(&before, &after);
        let descriptions: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Chord changed from C to Cmaj7", "Added chord Am7", "Removed chord G7"]);
        assert_eq!(entries[1].location.beat.as_deref(), Some("beat 2"));
    }
}
