use serde::{Deserialize, Serialize};

use crate::model::MatchAlgorithm;

/// Which cost function the matcher uses to build its cost matrix.
///
/// A tagged variant rather than a pair of independent booleans; the wire
/// format still accepts the two-boolean encoding — see
/// `dispatch_server::wire::AlgorithmConfigMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    Proximity,
    Demand,
    Hybrid,
}

impl MatchMode {
    /// Maps the wire's two independent booleans onto a single mode.
    /// Both `false` maps to proximity-only.
    pub fn from_flags(proximity: bool, supply_demand: bool) -> Self {
        match (proximity, supply_demand) {
            (_, true) if proximity => MatchMode::Hybrid,
            (false, true) => MatchMode::Demand,
            _ => MatchMode::Proximity,
        }
    }

    pub fn uses_demand(self) -> bool {
        matches!(self, MatchMode::Demand | MatchMode::Hybrid)
    }

    /// The label recorded on an [`crate::model::Assignment`] produced
    /// under this mode, on the wire as `algorithm_used`.
    pub fn as_algorithm(self) -> MatchAlgorithm {
        match self {
            MatchMode::Proximity => MatchAlgorithm::Proximity,
            MatchMode::Demand => MatchAlgorithm::Demand,
            MatchMode::Hybrid => MatchAlgorithm::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_false_is_proximity_only() {
        assert_eq!(MatchMode::from_flags(false, false), MatchMode::Proximity);
    }

    #[test]
    fn demand_only_needs_supply_demand_alone() {
        assert_eq!(MatchMode::from_flags(false, true), MatchMode::Demand);
    }

    #[test]
    fn both_true_is_hybrid() {
        assert_eq!(MatchMode::from_flags(true, true), MatchMode::Hybrid);
    }
}
