//! Comparison keys: the normalized projection of unit text used for
//! equality during alignment. Keys never feed back into geometry.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::reconstruct::collapse_whitespace;

/// Optional folds applied on top of whitespace collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyOptions {
    /// Lowercase before comparing.
    pub fold_case: bool,
    /// Strip combining marks ("café" == "cafe").
    pub fold_diacritics: bool,
    /// Apply NFKC, folding full-width and other compatibility forms.
    pub fold_compatibility: bool,
}

/// Build the comparison key for a unit's text.
pub fn comparison_key(text: &str, options: &KeyOptions) -> String {
    let mut key = if options.fold_compatibility {
        text.nfkc().collect::<String>()
    } else {
        text.to_string()
    };

    if options.fold_diacritics {
        key = key.nfd().filter(|ch| !is_combining_mark(*ch)).nfc().collect();
    }

    if options.fold_case {
        key = key.to_lowercase();
    }

    collapse_whitespace(&key)
}
