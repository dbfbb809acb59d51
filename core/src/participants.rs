//! Attribute extraction over reaction participants.
//!
//! Pure lookups against a context of metabolites, compartments and roles.
//! Absent criteria impose no constraint, so `Criteria::default()` selects
//! every participant.

use crate::model::{Participant, Role};

/// Selection criteria for participants. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Criteria<'c> {
    pub metabolites: Option<&'c [String]>,
    pub compartments: Option<&'c [String]>,
    pub roles: Option<&'c [Role]>,
}

impl<'c> Criteria<'c> {
    pub fn metabolites(mut self, metabolites: &'c [String]) -> Self {
        self.metabolites = Some(metabolites);
        self
    }

    pub fn compartments(mut self, compartments: &'c [String]) -> Self {
        self.compartments = Some(compartments);
        self
    }

    pub fn roles(mut self, roles: &'c [Role]) -> Self {
        self.roles = Some(roles);
        self
    }

    fn matches(&self, participant: &Participant) -> bool {
        let metabolite = self
            .metabolites
            .map_or(true, |set| set.iter().any(|m| *m == participant.metabolite));
        let compartment = self
            .compartments
            .map_or(true, |set| set.iter().any(|c| *c == participant.compartment));
        let role = self.roles.map_or(true, |set| set.contains(&participant.role));
        metabolite && compartment && role
    }
}

/// Participants that satisfy every given criterion.
pub fn filter_participants<'a, I>(participants: I, criteria: &Criteria<'_>) -> Vec<&'a Participant>
where
    I: IntoIterator<Item = &'a Participant>,
{
    participants
        .into_iter()
        .filter(|p| criteria.matches(p))
        .collect()
}

/// Unique metabolites of the given participants, in first-seen order.
pub fn collect_metabolites<'a, I>(participants: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Participant>,
{
    unique(participants.into_iter().map(|p| p.metabolite.clone()))
}

/// Unique compartments of the given participants, in first-seen order.
pub fn collect_compartments<'a, I>(participants: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Participant>,
{
    unique(participants.into_iter().map(|p| p.compartment.clone()))
}

/// Whether any participant carries the given role.
pub fn has_role<'a, I>(participants: I, role: Role) -> bool
where
    I: IntoIterator<Item = &'a Participant>,
{
    participants.into_iter().any(|p| p.role == role)
}

/// Deduplicate while keeping first-seen order.
pub fn unique<T, I>(values: I) -> Vec<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut result: Vec<T> = Vec::new();
    for value in values {
        if !result.contains(&value) {
            result.push(value);
        }
    }
    result
}

/// Whether every element of each list appears in the other.
pub fn mutually_inclusive<T: PartialEq>(first: &[T], second: &[T]) -> bool {
    first.iter().all(|a| second.contains(a)) && second.iter().all(|b| first.contains(b))
}
