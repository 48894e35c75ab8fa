//! Purpose: Map message severity to its presentation (color token and icon glyph).
//! Exports: `Severity`, `SeverityPolicy`, `Presentation`, `color_token_for_tag`, `icon_glyph_for_tag`.
//! Role: Leaf lookup table shared by the renderer, intake, and the `palette` command.
//! Invariants: Every severity maps to exactly one of `danger`, `info`, `warning`, `success`.
//! Invariants: Unrecognized tags resolve to `Info` unless the caller asks for strict parsing.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Danger,
    Confirmation,
}

/// How intake treats a severity tag it does not recognize.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SeverityPolicy {
    /// Present the message as `Info` and log the unknown tag.
    #[default]
    Fallback,
    /// Reject the message with an `Invalid` error.
    Strict,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Presentation {
    pub color_token: &'static str,
    pub icon_glyph: &'static str,
}

// Shared circular badge drawn behind every mark.
macro_rules! badge {
    () => {
        r##"<circle fill="#000000" opacity="0.3" cx="12" cy="12" r="10" />"##
    };
}

const DANGER_GLYPH: &str = concat!(
    badge!(),
    r##"<path d="M12.0355339,10.6213203 L14.863961,7.79289322 C15.2544853,7.40236893 15.8876503,7.40236893 16.2781746,7.79289322 C16.6686989,8.18341751 16.6686989,8.81658249 16.2781746,9.20710678 L13.4497475,12.0355339 L16.2781746,14.863961 C16.6686989,15.2544853 16.6686989,15.8876503 16.2781746,16.2781746 C15.8876503,16.6686989 15.2544853,16.6686989 14.863961,16.2781746 L12.0355339,13.4497475 L9.20710678,16.2781746 C8.81658249,16.6686989 8.18341751,16.6686989 7.79289322,16.2781746 C7.40236893,15.8876503 7.40236893,15.2544853 7.79289322,14.863961 L10.6213203,12.0355339 L7.79289322,9.20710678 C7.40236893,8.81658249 7.40236893,8.18341751 7.79289322,7.79289322 C8.18341751,7.40236893 8.81658249,7.40236893 9.20710678,7.79289322 L12.0355339,10.6213203 Z" fill="#000000" />"##,
);

const INFO_GLYPH: &str = concat!(
    badge!(),
    r##"<rect fill="#000000" x="11" y="10" width="2" height="7" rx="1" />"##,
    r##"<rect fill="#000000" x="11" y="7" width="2" height="2" rx="1" />"##,
);

const WARNING_GLYPH: &str = concat!(
    badge!(),
    r##"<rect fill="#000000" x="11" y="7" width="2" height="8" rx="1" />"##,
    r##"<rect fill="#000000" x="11" y="16" width="2" height="2" rx="1" />"##,
);

const CONFIRMATION_GLYPH: &str = concat!(
    badge!(),
    r##"<path d="M16.7689447,7.81768175 C17.1457787,7.41393107 17.7785676,7.39211077 18.1823183,7.76894473 C18.5860689,8.1457787 18.6078892,8.77856757 18.2310553,9.18231825 L11.2310553,16.6823183 C10.8654446,17.0740439 10.2560456,17.107974 9.84920863,16.7592566 L6.34920863,13.7592566 C5.92988278,13.3998345 5.88132125,12.7685345 6.2407434,12.3492086 C6.60016555,11.9298828 7.23146553,11.8813212 7.65079137,12.2407434 L10.4229928,14.616916 L16.7689447,7.81768175 Z" fill="#000000" fill-rule="nonzero" />"##,
);

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Danger,
        Severity::Confirmation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Confirmation => "confirmation",
        }
    }

    /// Numeric code used by queues that serialize severity as an integer.
    pub fn code(self) -> u64 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Danger => 2,
            Severity::Confirmation => 3,
        }
    }

    pub fn color_token(self) -> &'static str {
        self.presentation().color_token
    }

    pub fn icon_glyph(self) -> &'static str {
        self.presentation().icon_glyph
    }

    pub fn presentation(self) -> Presentation {
        match self {
            Severity::Danger => Presentation {
                color_token: "danger",
                icon_glyph: DANGER_GLYPH,
            },
            Severity::Info => Presentation {
                color_token: "info",
                icon_glyph: INFO_GLYPH,
            },
            Severity::Warning => Presentation {
                color_token: "warning",
                icon_glyph: WARNING_GLYPH,
            },
            Severity::Confirmation => Presentation {
                color_token: "success",
                icon_glyph: CONFIRMATION_GLYPH,
            },
        }
    }

    pub fn from_code(code: u64) -> Option<Severity> {
        Severity::ALL.into_iter().find(|severity| severity.code() == code)
    }

    fn from_known_tag(tag: &str) -> Option<Severity> {
        let tag = tag.trim();
        let by_name = Severity::ALL.into_iter().find(|severity| {
            tag.eq_ignore_ascii_case(severity.as_str())
                || tag.eq_ignore_ascii_case(severity.color_token())
        });
        by_name.or_else(|| tag.parse::<u64>().ok().and_then(Severity::from_code))
    }

    /// Resolves a serialized tag. Under `Fallback` this never fails.
    pub fn resolve_tag(tag: &str, policy: SeverityPolicy) -> Result<Severity, Error> {
        if let Some(severity) = Severity::from_known_tag(tag) {
            return Ok(severity);
        }
        match policy {
            SeverityPolicy::Fallback => {
                tracing::warn!(tag, "unrecognized severity; presenting as info");
                Ok(Severity::Info)
            }
            SeverityPolicy::Strict => Err(unknown_tag_error(tag)),
        }
    }
}

fn unknown_tag_error(tag: &str) -> Error {
    Error::new(ErrorKind::Invalid)
        .with_message(format!("unrecognized severity `{tag}`"))
        .with_hint("Use one of: info, warning, danger, confirmation (or 0-3).")
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Severity::resolve_tag(tag, SeverityPolicy::Strict)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn color_token_for_tag(tag: &str) -> &'static str {
    Severity::from_known_tag(tag)
        .unwrap_or_default()
        .color_token()
}

pub fn icon_glyph_for_tag(tag: &str) -> &'static str {
    Severity::from_known_tag(tag)
        .unwrap_or_default()
        .icon_glyph()
}

#[cfg(test)]
mod tests {
    use super::{Severity, SeverityPolicy, color_token_for_tag, icon_glyph_for_tag};
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    #[test]
    fn color_tokens_match_table() {
        let cases = [
            (Severity::Danger, "danger"),
            (Severity::Info, "info"),
            (Severity::Warning, "warning"),
            (Severity::Confirmation, "success"),
        ];
        for (severity, token) in cases {
            assert_eq!(severity.color_token(), token);
        }
    }

    #[test]
    fn default_severity_is_info() {
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[test]
    fn glyphs_are_distinct_and_badged() {
        let glyphs: HashSet<_> = Severity::ALL.iter().map(|s| s.icon_glyph()).collect();
        assert_eq!(glyphs.len(), Severity::ALL.len());
        for severity in Severity::ALL {
            assert!(severity.icon_glyph().starts_with(badge!()));
        }
    }

    #[test]
    fn unknown_tags_fall_back_to_info() {
        assert_eq!(color_token_for_tag("critical"), "info");
        assert_eq!(icon_glyph_for_tag(""), Severity::Info.icon_glyph());
        assert_eq!(
            Severity::resolve_tag("9", SeverityPolicy::Fallback).expect("fallback"),
            Severity::Info
        );
    }

    #[test]
    fn strict_policy_rejects_unknown_tags() {
        let err = Severity::resolve_tag("critical", SeverityPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert!(err.message().unwrap_or_default().contains("critical"));
        assert!("nope".parse::<Severity>().is_err());
    }

    #[test]
    fn tags_accept_names_tokens_and_codes() {
        let cases = [
            ("Danger", Severity::Danger),
            (" WARNING ", Severity::Warning),
            ("success", Severity::Confirmation),
            ("confirmation", Severity::Confirmation),
            ("0", Severity::Info),
            ("2", Severity::Danger),
        ];
        for (tag, expected) in cases {
            assert_eq!(tag.parse::<Severity>().expect("known tag"), expected);
        }
    }

    #[test]
    fn codes_round_trip_through_lookup() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_code(severity.code()), Some(severity));
        }
        assert_eq!(Severity::from_code(4), None);
    }
}
