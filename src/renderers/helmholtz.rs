//! Read-only text view with Helmholtz pitch names
//!
//! Same layout as the text form, but pitches use Helmholtz spelling
//! (`c'` is middle C, `c` the octave below, `C` and `C,` further down) and
//! note values are named. Meant for people reading a score; it is not
//! parseable and never goes back to the model.

use crate::models::time::{duration_name, format_rational};
use crate::models::{Event, Pitch, Score};

fn accidental_sign(alteration: i8) -> &'static str {
    match alteration {
        2 => "𝄪",
        1 => "♯",
        -1 => "♭",
        -2 => "𝄫",
        _ => "",
    }
}

/// Helmholtz spelling of a pitch
pub fn helmholtz_name(pitch: &Pitch) -> String {
    let letter = pitch.step.as_char();
    let name = if pitch.octave >= 3 {
        let primes = "'".repeat((pitch.octave - 3) as usize);
        format!("{}{}", letter.to_ascii_lowercase(), primes)
    } else {
        let commas = ",".repeat((2 - pitch.octave).max(0) as usize);
        format!("{}{}", letter, commas)
    };
    format!("{}{}", name, accidental_sign(pitch.alteration))
}

pub fn to_helmholtz_text(score: &Score) -> String {
    let mut lines = Vec::new();
    for part in score.sorted_parts() {
        lines.push(format!("PART {} ROLE {}", part.name, part.role));
        for voice in part.sorted_voices() {
            lines.push(format!("VOICE {}", voice.id));
            for measure in voice.sorted_measures() {
                lines.push(format!("MEASURE {} TIME {}", measure.number, measure.time_signature));
                for event in measure.sorted_events() {
                    lines.push(helmholtz_line(event));
                }
                lines.push(String::new());
            }
        }
    }
    lines.join("\n").trim().to_string()
}

fn helmholtz_line(event: &Event) -> String {
    match event {
        Event::Note(note) => {
            let tie = if note.tie.is_some() { "~" } else { "" };
            format!(
                "NOTE t={} {}{} ({})",
                format_rational(&note.onset),
                helmholtz_name(&note.pitch),
                tie,
                duration_name(&note.duration)
            )
        }
        Event::Rest(rest) => format!("REST t={} ({})", format_rational(&rest.onset), duration_name(&rest.duration)),
        Event::Harmony(harmony) => format!("HARMONY t={} {}", format_rational(&harmony.onset), harmony.symbol),
        Event::Lyric(lyric) => format!("LYRIC t={} \"{}\"", format_rational(&lyric.onset), lyric.text),
    }
}
