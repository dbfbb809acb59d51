use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use metanet_core::{
    collect_compartments, collect_metabolites, enhance_reactions, filter_participants, Criteria,
    Metabolite, Model, Reaction,
};
use tracing::info;

use crate::config::{matches_filter, Filter};
use crate::error::Result;

/// Reactions and metabolites that pass the current value-set filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredModel {
    pub reactions: BTreeMap<String, Reaction>,
    pub metabolites: BTreeMap<String, Metabolite>,
}

/// Read a model from JSON.
pub fn read_model(path: &Path) -> Result<Model> {
    let start = Instant::now();
    let text = std::fs::read_to_string(path)?;
    let model: Model = serde_json::from_str(&text)?;
    info!(
        path = %path.display(),
        reactions = model.reactions.len(),
        metabolites = model.metabolites.len(),
        load_time_ms = start.elapsed().as_secs_f64() * 1000.0,
        "loaded model"
    );
    Ok(model)
}

/// Fill in derived reaction behaviors when requested.
pub fn prepare_model(mut model: Model, derive_behaviors: bool) -> Model {
    if derive_behaviors {
        model.reactions = enhance_reactions(&model.reactions);
    }
    model
}

/// Restrict a model to the entities passing both filters.
///
/// A reaction passes when one of its processes passes and at least one
/// participant sits in a passing compartment. Its `metabolites` and
/// `compartments` are narrowed to those passing participants. Metabolites
/// pass when a passing reaction still references them.
pub fn filter_model(model: &Model, compartments: &Filter, processes: &Filter) -> FilteredModel {
    let mut reactions = BTreeMap::new();
    let mut referenced: BTreeSet<String> = BTreeSet::new();

    for reaction in model.reactions.values() {
        let process_pass = match processes {
            Filter::All => true,
            Filter::Set(_) => reaction.processes.iter().any(|p| matches_filter(p, processes)),
        };
        if !process_pass {
            continue;
        }

        let criteria = Criteria::default();
        let criteria = if reaction.metabolites.is_empty() {
            criteria
        } else {
            criteria.metabolites(&reaction.metabolites)
        };
        let passing: Vec<_> = filter_participants(&reaction.participants, &criteria)
            .into_iter()
            .filter(|p| matches_filter(&p.compartment, compartments))
            .filter(|p| {
                reaction.compartments.is_empty() || reaction.compartments.contains(&p.compartment)
            })
            .collect();
        if passing.is_empty() {
            continue;
        }

        let mut novel = reaction.clone();
        novel.metabolites = collect_metabolites(passing.iter().copied());
        novel.compartments = collect_compartments(passing.iter().copied());
        referenced.extend(novel.metabolites.iter().cloned());
        reactions.insert(reaction.identifier.clone(), novel);
    }

    let metabolites = model
        .metabolites
        .iter()
        .filter(|(id, _)| referenced.contains(*id))
        .map(|(id, m)| (id.clone(), m.clone()))
        .collect();

    FilteredModel {
        reactions,
        metabolites,
    }
}
