//! Property-based tests for member name matching.
//!
//! - Every destination is consumed at most once
//! - There is exactly one pairing per source member, in source order
//! - Matching a list against itself pairs each name with itself
//! - Matching is deterministic

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::matcher::{match_members, Counterpart, MatchKind};
    use crate::resolver::MemberName;

    // Short identifiers so containment and case collisions actually occur
    fn member_name() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z][a-z]{0,3}",
            Just("Id".to_string()),
            Just("id".to_string()),
            Just("Name".to_string()),
            Just("FullName".to_string()),
        ]
    }

    fn member_list() -> impl Strategy<Value = Vec<MemberName>> {
        prop::collection::vec(
            (member_name(), any::<bool>()).prop_map(|(name, collection)| MemberName {
                name,
                is_collection_shaped: collection,
            }),
            0..8,
        )
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    proptest! {
        /// Paired and leftover destinations together are exactly the input.
        #[test]
        fn destinations_consumed_at_most_once(
            source in member_list(),
            destination in member_list()
        ) {
            let outcome = match_members(&source, &destination);

            let mut seen: Vec<String> = outcome
                .matched()
                .map(|(_, destination)| destination.name.clone())
                .collect();
            seen.extend(outcome.unmatched_destination.iter().map(|m| m.name.clone()));

            let input: Vec<String> = destination.iter().map(|m| m.name.clone()).collect();
            prop_assert_eq!(sorted(seen), sorted(input));
        }

        /// One pairing per source member, in source order.
        #[test]
        fn pairings_follow_source(
            source in member_list(),
            destination in member_list()
        ) {
            let outcome = match_members(&source, &destination);
            let sources: Vec<&MemberName> = outcome.pairings.iter().map(|p| &p.source).collect();
            let expected: Vec<&MemberName> = source.iter().collect();
            prop_assert_eq!(sources, expected);
        }

        /// A list matched against itself pairs every name with itself.
        #[test]
        fn self_match_is_identity(list in member_list()) {
            let outcome = match_members(&list, &list);
            prop_assert!(outcome.is_complete());
            for (pairing, member) in outcome.pairings.iter().zip(&list) {
                prop_assert_eq!(&pairing.counterpart, &Counterpart::Exact(member.clone()));
            }
        }

        /// The same inputs always give the same outcome.
        #[test]
        fn matching_is_deterministic(
            source in member_list(),
            destination in member_list()
        ) {
            prop_assert_eq!(
                match_members(&source, &destination),
                match_members(&source, &destination)
            );
        }

        /// Exact pairs agree ignoring case; containment pairs nest one name
        /// inside the other.
        #[test]
        fn pair_kinds_are_honest(
            source in member_list(),
            destination in member_list()
        ) {
            for pairing in match_members(&source, &destination).pairings {
                let Some(destination) = pairing.destination() else {
                    continue;
                };
                let s = pairing.source.name.to_lowercase();
                let d = destination.name.to_lowercase();
                match pairing.kind() {
                    Some(MatchKind::Exact) => prop_assert_eq!(s, d),
                    Some(MatchKind::Containment) => {
                        prop_assert!(s != d);
                        prop_assert!(s.contains(&d) || d.contains(&s));
                    }
                    None => prop_assert!(false, "destination without a kind"),
                }
            }
        }
    }
}
