use metanet_core::{Combination, Direction, Entity, SimplificationMethod};

use crate::error::{ExplorerError, Result};

/// Parse a traversal direction.
///
/// Accepts: "successors", "predecessors", "neighbors" and the short forms
/// "out", "in", "both" (case-insensitive).
pub fn parse_direction(s: &str) -> Result<Direction> {
    match s.to_lowercase().as_str() {
        "successors" | "out" => Ok(Direction::Successors),
        "predecessors" | "in" => Ok(Direction::Predecessors),
        "neighbors" | "both" => Ok(Direction::Neighbors),
        _ => Err(ExplorerError::InvalidDirection(s.to_string())),
    }
}

pub fn parse_strategy(s: &str) -> Result<SimplificationMethod> {
    match s.to_lowercase().as_str() {
        "omission" | "omit" => Ok(SimplificationMethod::Omission),
        "replication" | "replicate" => Ok(SimplificationMethod::Replication),
        _ => Err(ExplorerError::InvalidStrategy(s.to_string())),
    }
}

pub fn parse_entity(s: &str) -> Result<Entity> {
    match s.to_lowercase().as_str() {
        "metabolite" | "m" => Ok(Entity::Metabolite),
        "reaction" | "r" => Ok(Entity::Reaction),
        _ => Err(ExplorerError::InvalidEntity(s.to_string())),
    }
}

pub fn parse_combination(s: &str) -> Result<Combination> {
    match s.to_lowercase().as_str() {
        "union" => Ok(Combination::Union),
        "difference" => Ok(Combination::Difference),
        _ => Err(ExplorerError::InvalidCombination(s.to_string())),
    }
}

/// Split `entity:identifier`. Only the first colon separates, so
/// identifiers may contain colons.
pub fn parse_designation(s: &str) -> Result<(Entity, String)> {
    match s.split_once(':') {
        Some((entity, identifier)) if !identifier.is_empty() => {
            Ok((parse_entity(entity)?, identifier.to_string()))
        }
        _ => Err(ExplorerError::InvalidDesignation(s.to_string())),
    }
}

/// Validate that a parameter lies within `bounds` (inclusive).
pub fn check_range(parameter: &'static str, value: i64, bounds: (u32, u32)) -> Result<u32> {
    let (minimum, maximum) = (i64::from(bounds.0), i64::from(bounds.1));
    if value < minimum || value > maximum {
        return Err(ExplorerError::Limit {
            parameter,
            value,
            minimum,
            maximum,
        });
    }
    Ok(value as u32)
}
