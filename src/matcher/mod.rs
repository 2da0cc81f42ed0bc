//! Fuzzy pairing of source and destination member names.
//!
//! For each source name, in source order:
//!
//! 1. a case-insensitive exact match in the remaining pool,
//! 2. else the first pool entry where either name contains the other
//!    (case-insensitive),
//! 3. else the source name stays unmatched.
//!
//! A matched destination leaves the pool before the next source name is
//! considered, so every destination is used at most once. Whatever is left
//! in the pool is the unmatched destination side.

#[cfg(test)]
mod proptest;

use serde::{Deserialize, Serialize};

use crate::resolver::MemberName;

/// How a pair was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Containment,
}

/// What a source member was paired with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "destination", rename_all = "snake_case")]
pub enum Counterpart {
    Exact(MemberName),
    Containment(MemberName),
    Unmatched,
}

/// One source member and its counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub source: MemberName,
    pub counterpart: Counterpart,
}

impl Pairing {
    pub fn destination(&self) -> Option<&MemberName> {
        match &self.counterpart {
            Counterpart::Exact(member) | Counterpart::Containment(member) => Some(member),
            Counterpart::Unmatched => None,
        }
    }

    pub fn kind(&self) -> Option<MatchKind> {
        match self.counterpart {
            Counterpart::Exact(_) => Some(MatchKind::Exact),
            Counterpart::Containment(_) => Some(MatchKind::Containment),
            Counterpart::Unmatched => None,
        }
    }
}

/// Result of matching two member lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// One entry per source member, in source order.
    pub pairings: Vec<Pairing>,
    /// Destination members never consumed, in destination order.
    pub unmatched_destination: Vec<MemberName>,
}

impl MatchOutcome {
    /// Matched `(source, destination)` pairs in source order.
    pub fn matched(&self) -> impl Iterator<Item = (&MemberName, &MemberName)> {
        self.pairings
            .iter()
            .filter_map(|pairing| Some((&pairing.source, pairing.destination()?)))
    }

    /// Source members with no counterpart, in source order.
    pub fn unmatched_source(&self) -> impl Iterator<Item = &MemberName> {
        self.pairings
            .iter()
            .filter(|pairing| pairing.counterpart == Counterpart::Unmatched)
            .map(|pairing| &pairing.source)
    }

    /// Destination name paired with the first source called `source`.
    pub fn destination_for(&self, source: &str) -> Option<&str> {
        self.pairings
            .iter()
            .find(|pairing| pairing.source.name == source)
            .and_then(Pairing::destination)
            .map(|member| member.name.as_str())
    }

    /// Whether both sides were fully paired.
    pub fn is_complete(&self) -> bool {
        self.unmatched_source().next().is_none() && self.unmatched_destination.is_empty()
    }
}

/// Destinations not yet consumed.
#[derive(Debug, Clone, Default)]
struct Pool {
    available: Vec<MemberName>,
}

impl Pool {
    /// Take the best candidate for `name`, handing back the pool that remains.
    fn take(mut self, name: &str) -> (Counterpart, Pool) {
        let wanted = name.to_lowercase();
        let lowered: Vec<String> = self
            .available
            .iter()
            .map(|candidate| candidate.name.to_lowercase())
            .collect();

        if let Some(idx) = lowered.iter().position(|candidate| *candidate == wanted) {
            let taken = self.available.remove(idx);
            return (Counterpart::Exact(taken), self);
        }

        let contained = lowered.iter().position(|candidate| {
            candidate.contains(wanted.as_str()) || wanted.contains(candidate.as_str())
        });
        match contained {
            Some(idx) => {
                let taken = self.available.remove(idx);
                (Counterpart::Containment(taken), self)
            }
            None => (Counterpart::Unmatched, self),
        }
    }
}

/// Pair `source` members with `destination` members.
pub fn match_members(source: &[MemberName], destination: &[MemberName]) -> MatchOutcome {
    let mut pairings = Vec::with_capacity(source.len());
    let mut pool = Pool {
        available: destination.to_vec(),
    };

    for member in source {
        let (counterpart, rest) = pool.take(&member.name);
        pool = rest;
        pairings.push(Pairing {
            source: member.clone(),
            counterpart,
        });
    }

    MatchOutcome {
        pairings,
        unmatched_destination: pool.available,
    }
}

/// [`match_members`] over plain names.
pub fn match_names(source: &[&str], destination: &[&str]) -> MatchOutcome {
    let wrap = |names: &[&str]| {
        names
            .iter()
            .map(|name| MemberName::new(*name))
            .collect::<Vec<_>>()
    };
    match_members(&wrap(source), &wrap(destination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_insensitive_exact() {
        let outcome = match_names(&["Id", "Name"], &["name", "id"]);
        assert_eq!(outcome.destination_for("Id"), Some("id"));
        assert_eq!(outcome.destination_for("Name"), Some("name"));
        assert!(outcome.is_complete());
        assert!(outcome
            .pairings
            .iter()
            .all(|pairing| pairing.kind() == Some(MatchKind::Exact)));
    }

    #[test]
    fn test_containment_leaves_unrelated() {
        let outcome = match_names(&["ContainsFrom"], &["ContainsFromContains", "Unrelated"]);
        assert_eq!(outcome.destination_for("ContainsFrom"), Some("ContainsFromContains"));
        assert_eq!(outcome.pairings[0].kind(), Some(MatchKind::Containment));
        assert_eq!(outcome.unmatched_source().count(), 0);
        assert_eq!(outcome.unmatched_destination, vec![MemberName::new("Unrelated")]);
    }

    #[test]
    fn test_containment_either_direction() {
        let outcome = match_names(&["CustomerName"], &["Name"]);
        assert_eq!(outcome.destination_for("CustomerName"), Some("Name"));
    }

    #[test]
    fn test_exact_beats_earlier_containment() {
        let outcome = match_names(&["Name"], &["FullName", "NAME"]);
        assert_eq!(outcome.destination_for("Name"), Some("NAME"));
        assert_eq!(outcome.unmatched_destination, vec![MemberName::new("FullName")]);
    }

    #[test]
    fn test_greedy_per_name_preference() {
        // "Name" takes "NameId" by containment before "Id" is considered.
        let outcome = match_names(&["Name", "Id"], &["NameId"]);
        assert_eq!(outcome.destination_for("Name"), Some("NameId"));
        assert_eq!(
            outcome.unmatched_source().collect::<Vec<_>>(),
            vec![&MemberName::new("Id")]
        );
    }

    #[test]
    fn test_unmatched_keep_source_position() {
        let outcome = match_names(&["A", "Id", "B"], &["ID"]);
        let counterparts: Vec<Option<&str>> = outcome
            .pairings
            .iter()
            .map(|pairing| pairing.destination().map(|m| m.name.as_str()))
            .collect();
        assert_eq!(counterparts, vec![None, Some("ID"), None]);
    }

    #[test]
    fn test_disjoint_lists() {
        let outcome = match_names(&["A", "B"], &["X", "Y"]);
        assert_eq!(outcome.matched().count(), 0);
        assert_eq!(outcome.unmatched_source().count(), 2);
        assert_eq!(outcome.unmatched_destination.len(), 2);
    }

    #[test]
    fn test_collection_flag_travels_with_pair() {
        let outcome = match_members(
            &[MemberName::collection("Items")],
            &[MemberName::collection("items")],
        );
        let (source, destination) = outcome.matched().next().unwrap();
        assert!(source.is_collection_shaped);
        assert!(destination.is_collection_shaped);
    }
}
