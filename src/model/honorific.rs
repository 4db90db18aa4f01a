//! Honorific suffixes for client names.
//!
//! The form offers three quick buttons that end the client name with 小姐,
//! 女士 or 先生. Pressing one replaces whatever honorific the name already
//! ends with, so switching between them or pressing twice never stacks.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One of the three honorific suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Honorific {
    /// 小姐
    Miss,
    /// 女士
    Madam,
    /// 先生
    Mister,
}

impl Honorific {
    pub const ALL: [Honorific; 3] = [Honorific::Miss, Honorific::Madam, Honorific::Mister];

    pub fn suffix(&self) -> &'static str {
        match self {
            Honorific::Miss => "小姐",
            Honorific::Madam => "女士",
            Honorific::Mister => "先生",
        }
    }
}

impl fmt::Display for Honorific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

static TRAILING_HONORIFICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:小姐|女士|先生)+$").expect("honorific pattern is valid"));

/// Strip any trailing honorifics from `name` and append `honorific`.
pub fn apply_name_suffix(name: &str, honorific: Honorific) -> String {
    let base = TRAILING_HONORIFICS.replace(name, "");
    format!("{}{}", base, honorific.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_to_bare_name() {
        assert_eq!(apply_name_suffix("陳", Honorific::Miss), "陳小姐");
    }

    #[test]
    fn idempotent_for_same_suffix() {
        for h in Honorific::ALL {
            let once = apply_name_suffix("陳大文", h);
            let twice = apply_name_suffix(&once, h);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn switching_replaces_previous_suffix() {
        let name = apply_name_suffix("陳", Honorific::Miss);
        let name = apply_name_suffix(&name, Honorific::Madam);
        assert_eq!(name, "陳女士");
        let name = apply_name_suffix(&name, Honorific::Mister);
        assert_eq!(name, "陳先生");
    }

    #[test]
    fn already_stacked_suffixes_collapse() {
        assert_eq!(apply_name_suffix("陳小姐女士", Honorific::Mister), "陳先生");
    }

    #[test]
    fn never_two_suffixes_in_a_row() {
        let mut name = String::from("李");
        for h in [
            Honorific::Mister,
            Honorific::Mister,
            Honorific::Miss,
            Honorific::Madam,
            Honorific::Madam,
        ] {
            name = apply_name_suffix(&name, h);
            let suffix_count = Honorific::ALL
                .iter()
                .map(|x| name.matches(x.suffix()).count())
                .sum::<usize>();
            assert_eq!(suffix_count, 1, "{}", name);
        }
    }

    #[test]
    fn suffix_in_the_middle_is_kept() {
        assert_eq!(apply_name_suffix("先生堂 陳", Honorific::Miss), "先生堂 陳小姐");
    }

    #[test]
    fn empty_name_gets_only_suffix() {
        assert_eq!(apply_name_suffix("", Honorific::Madam), "女士");
    }
}
