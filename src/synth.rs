//! Assertion synthesis: a match outcome to an ordered statement list.
//!
//! The scenario opens with null guards on both instances. Each source
//! member then contributes, in source order, a value equality against its
//! counterpart, or a null guard plus count equality when the source member
//! is collection-shaped. Unmatched members on either side are asserted
//! against the mismatch placeholder so the generated test fails until
//! someone maps them by hand.

use crate::matcher::MatchOutcome;
use crate::resolver::MemberName;
use crate::syntax::{Operand, Role, Statement};

/// Build the assertion statements for a match outcome.
pub fn synthesize(outcome: &MatchOutcome) -> Vec<Statement> {
    let mut statements = vec![
        Statement::not_null(Operand::instance(Role::Tested)),
        Statement::not_null(Operand::instance(Role::Expected)),
    ];

    for pairing in &outcome.pairings {
        let source = &pairing.source;
        let expected = Operand::member(Role::Expected, &source.name);
        let actual = match pairing.destination() {
            Some(destination) => Operand::member(Role::Tested, &destination.name),
            None => Operand::mismatch(Role::Tested),
        };

        if source.is_collection_shaped {
            statements.push(Statement::not_null(expected.clone()));
            statements.push(Statement::count_equal(actual, expected));
        } else {
            statements.push(Statement::equal(actual, expected));
        }
    }

    for destination in &outcome.unmatched_destination {
        statements.extend(unmatched_destination(destination));
    }

    statements
}

fn unmatched_destination(destination: &MemberName) -> Vec<Statement> {
    let actual = Operand::member(Role::Tested, &destination.name);
    let expected = Operand::mismatch(Role::Expected);
    if destination.is_collection_shaped {
        vec![
            Statement::not_null(actual.clone()),
            Statement::count_equal(actual, expected),
        ]
    } else {
        vec![Statement::equal(actual, expected)]
    }
}
