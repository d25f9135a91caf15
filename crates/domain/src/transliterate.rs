//! ASCII transliteration used when deriving throttle keys.

use deunicode::deunicode_with_tofu;

/// Replacement for characters with no ASCII rendering.
pub const UNKNOWN_CHARACTER: &str = "?";

/// Converts `input` to its canonical ASCII form.
///
/// Every character is mapped through a per-character transliteration table,
/// so `é` becomes `e`, `ß` becomes `ss` and `д` becomes `d`. Characters the
/// table has no rendering for become `?`.
#[must_use]
pub fn transliterate(input: &str) -> String {
    deunicode_with_tofu(input, UNKNOWN_CHARACTER)
}
