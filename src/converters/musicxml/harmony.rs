//! Chord symbols to and from MusicXML `<harmony>` parts

use once_cell::sync::Lazy;
use regex::Regex;

/// (MusicXML kind value, symbol suffix)
const KINDS: &[(&str, &str)] = &[
    ("major", ""),
    ("minor", "m"),
    ("augmented", "aug"),
    ("diminished", "dim"),
    ("dominant", "7"),
    ("major-seventh", "maj7"),
    ("minor-seventh", "m7"),
    ("diminished-seventh", "dim7"),
    ("augmented-seventh", "aug7"),
    ("half-diminished", "m7b5"),
    ("major-minor", "m(maj7)"),
    ("major-sixth", "6"),
    ("minor-sixth", "m6"),
    ("dominant-ninth", "9"),
    ("major-ninth", "maj9"),
    ("minor-ninth", "m9"),
    ("dominant-11th", "11"),
    ("minor-11th", "m11"),
    ("dominant-13th", "13"),
    ("suspended-second", "sus2"),
    ("suspended-fourth", "sus4"),
    ("power", "5"),
];

static SYMBOL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-G])(#|b)?(.*?)(?:/([A-G])(#|b)?)?$").expect("chord symbol pattern is valid")
});

/// Chord symbol split into the parts `<harmony>` stores
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonyParts {
    pub root_step: char,
    pub root_alter: i32,
    /// MusicXML kind value; "other" when the suffix is not a known kind
    pub kind: &'static str,
    /// Suffix exactly as written, stored in the kind's `text` attribute
    pub suffix: String,
    pub bass: Option<(char, i32)>,
}

fn alter_from_sign(sign: Option<&str>) -> i32 {
    match sign {
        Some("#") => 1,
        Some("b") => -1,
        _ => 0,
    }
}

fn sign_from_alter(alter: i32) -> &'static str {
    match alter {
        a if a > 0 => "#",
        a if a < 0 => "b",
        _ => "",
    }
}

/// Split a symbol such as "Bbm7/F"; `None` when it has no recognisable root
pub fn split_symbol(symbol: &str) -> Option<HarmonyParts> {
    let caps = SYMBOL_SHAPE.captures(symbol.trim())?;
    let root_step = caps.get(1)?.as_str().chars().next()?;
    let suffix = caps.get(3).map(|m| m.as_str()).unwrap_or_default().to_string();
    let kind = KINDS.iter().find(|(_, s)| *s == suffix).map(|(k, _)| *k).unwrap_or("other");
    let bass = caps
        .get(4)
        .and_then(|m| m.as_str().chars().next())
        .map(|step| (step, alter_from_sign(caps.get(5).map(|m| m.as_str()))));

    Some(HarmonyParts {
        root_step,
        root_alter: alter_from_sign(caps.get(2).map(|m| m.as_str())),
        kind,
        suffix,
        bass,
    })
}

/// Rebuild a symbol; an explicit `text` wins over the kind's usual suffix
pub fn join_symbol(
    root_step: char,
    root_alter: i32,
    kind: &str,
    text: Option<&str>,
    bass: Option<(char, i32)>,
) -> String {
    let suffix = match text {
        Some(text) => text.to_string(),
        None => KINDS.iter().find(|(k, _)| *k == kind).map(|(_, s)| s.to_string()).unwrap_or_default(),
    };
    let mut symbol = format!("{}{}{}", root_step, sign_from_alter(root_alter), suffix);
    if let Some((step, alter)) = bass {
        symbol.push('/');
        symbol.push(step);
        symbol.push_str(sign_from_alter(alter));
    }
    symbol
}
