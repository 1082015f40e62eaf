//! Per-category privacy rules.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Privacy category tracked by the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyKey {
    LastSeen,
    Calls,
    Invites,
}

impl PrivacyKey {
    pub const ALL: [Self; 3] = [Self::LastSeen, Self::Calls, Self::Invites];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastSeen => "last_seen",
            Self::Calls => "calls",
            Self::Invites => "invites",
        }
    }
}

impl fmt::Display for PrivacyKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for PrivacyKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_seen" => Ok(Self::LastSeen),
            "calls" => Ok(Self::Calls),
            "invites" | "group_invites" => Ok(Self::Invites),
            other => Err(Error::InvalidInput(format!("unknown privacy key '{other}'"))),
        }
    }
}

/// Base visibility policy of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyOption {
    #[default]
    Everyone,
    Contacts,
    Nobody,
}

/// Peer identifier used in rule exception lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub u64);

/// Visibility policy plus explicit deny (`never`) and allow (`always`) lists.
///
/// The two lists never share a peer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPrivacyRule")]
pub struct PrivacyRule {
    option: PrivacyOption,
    never: BTreeSet<PeerId>,
    always: BTreeSet<PeerId>,
}

impl PrivacyRule {
    #[must_use]
    pub const fn new(option: PrivacyOption) -> Self {
        Self {
            option,
            never: BTreeSet::new(),
            always: BTreeSet::new(),
        }
    }

    pub fn with_exceptions(
        option: PrivacyOption,
        never: impl IntoIterator<Item = PeerId>,
        always: impl IntoIterator<Item = PeerId>,
    ) -> Result<Self, Error> {
        let never: BTreeSet<PeerId> = never.into_iter().collect();
        let always: BTreeSet<PeerId> = always.into_iter().collect();
        if let Some(peer) = never.intersection(&always).next() {
            return Err(Error::InvalidInput(format!(
                "peer {} is in both never and always lists",
                peer.0
            )));
        }
        Ok(Self {
            option,
            never,
            always,
        })
    }

    pub const fn option(&self) -> PrivacyOption {
        self.option
    }

    pub const fn never(&self) -> &BTreeSet<PeerId> {
        &self.never
    }

    pub const fn always(&self) -> &BTreeSet<PeerId> {
        &self.always
    }
}

#[derive(Deserialize)]
struct RawPrivacyRule {
    option: PrivacyOption,
    #[serde(default)]
    never: Vec<PeerId>,
    #[serde(default)]
    always: Vec<PeerId>,
}

impl TryFrom<RawPrivacyRule> for PrivacyRule {
    type Error = Error;

    fn try_from(raw: RawPrivacyRule) -> Result<Self, Self::Error> {
        Self::with_exceptions(raw.option, raw.never, raw.always)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_lists_are_rejected() {
        let error = PrivacyRule::with_exceptions(
            PrivacyOption::Contacts,
            [PeerId(1), PeerId(2)],
            [PeerId(2)],
        )
        .unwrap_err();
        assert!(error.to_string().contains("peer 2"));
    }

    #[test]
    fn deserialize_validates_disjoint_lists() {
        let ok: PrivacyRule =
            serde_json::from_str(r#"{"option":"nobody","never":[],"always":[5,6]}"#).unwrap();
        assert_eq!(ok.option(), PrivacyOption::Nobody);
        assert_eq!(ok.always().len(), 2);

        let raw = r#"{"option":"everyone","never":[1],"always":[1]}"#;
        let overlapping = serde_json::from_str::<PrivacyRule>(raw);
        assert!(overlapping.is_err());
    }

    #[test]
    fn key_parses_cli_spellings() {
        assert_eq!("last-seen".parse::<PrivacyKey>().unwrap(), PrivacyKey::LastSeen);
        assert_eq!("group_invites".parse::<PrivacyKey>().unwrap(), PrivacyKey::Invites);
        assert!("birthday".parse::<PrivacyKey>().is_err());
    }
}
