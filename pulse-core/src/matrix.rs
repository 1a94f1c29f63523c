//! Probability x impact risk matrix
//!
//! Global invariants enforced:
//! - Every risk lands in exactly one cell
//! - Sum of all cells equals the number of risks supplied
//! - Deterministic cell order (probability low -> high, impact low -> critical)

use crate::entity::Risk;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Probability band (rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbabilityBand {
    Low,    // <= 1
    Medium, // <= 3
    High,   // > 3
}

impl ProbabilityBand {
    pub const ALL: [ProbabilityBand; 3] = [
        ProbabilityBand::Low,
        ProbabilityBand::Medium,
        ProbabilityBand::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbabilityBand::Low => "low",
            ProbabilityBand::Medium => "medium",
            ProbabilityBand::High => "high",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Impact band (columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImpactBand {
    Low,      // <= 1
    Medium,   // <= 2
    High,     // <= 3
    Critical, // > 3
}

impl ImpactBand {
    pub const ALL: [ImpactBand; 4] = [
        ImpactBand::Low,
        ImpactBand::Medium,
        ImpactBand::High,
        ImpactBand::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactBand::Low => "low",
            ImpactBand::Medium => "medium",
            ImpactBand::High => "high",
            ImpactBand::Critical => "critical",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Bucket a resolved probability value.
///
/// Values that compare false against every bound (NaN) fall through to the top band,
/// so no risk is ever dropped.
pub fn probability_band(probability: f64) -> ProbabilityBand {
    if probability <= 1.0 {
        ProbabilityBand::Low
    } else if probability <= 3.0 {
        ProbabilityBand::Medium
    } else {
        ProbabilityBand::High
    }
}

/// Bucket a resolved impact value
pub fn impact_band(impact: f64) -> ImpactBand {
    if impact <= 1.0 {
        ImpactBand::Low
    } else if impact <= 2.0 {
        ImpactBand::Medium
    } else if impact <= 3.0 {
        ImpactBand::High
    } else {
        ImpactBand::Critical
    }
}

/// Cell for a single risk, after defaults are applied
pub fn cell_for(risk: &Risk) -> (ProbabilityBand, ImpactBand) {
    (
        probability_band(risk.probability_or_default()),
        impact_band(risk.impact_or_default()),
    )
}

/// Severity tint of a heatmap cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTint {
    Neutral, // 0
    Low,     // 1-2
    Medium,  // 3-4
    High,    // >= 5
}

impl CellTint {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellTint::Neutral => "neutral",
            CellTint::Low => "low",
            CellTint::Medium => "medium",
            CellTint::High => "high",
        }
    }

    /// Background class used by the heatmap
    pub fn color_class(&self) -> &'static str {
        match self {
            CellTint::Neutral => "bg-gray-100",
            CellTint::Low => "bg-green-200",
            CellTint::Medium => "bg-yellow-300",
            CellTint::High => "bg-red-400",
        }
    }
}

/// Tint for a cell count. Depends on the count only, not on the cell's position.
pub fn cell_tint(count: usize) -> CellTint {
    match count {
        0 => CellTint::Neutral,
        1..=2 => CellTint::Low,
        3..=4 => CellTint::Medium,
        _ => CellTint::High,
    }
}

/// Risk counts per (probability, impact) cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskMatrix {
    cells: [[usize; 4]; 3],
}

impl RiskMatrix {
    pub fn count(&self, probability: ProbabilityBand, impact: ImpactBand) -> usize {
        self.cells[probability.index()][impact.index()]
    }

    pub fn tint(&self, probability: ProbabilityBand, impact: ImpactBand) -> CellTint {
        cell_tint(self.count(probability, impact))
    }

    /// Sum over all twelve cells
    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }

    /// All cells in deterministic order
    pub fn cells(&self) -> impl Iterator<Item = (ProbabilityBand, ImpactBand, usize)> + '_ {
        ProbabilityBand::ALL.into_iter().flat_map(move |p| {
            ImpactBand::ALL
                .into_iter()
                .map(move |i| (p, i, self.count(p, i)))
        })
    }

    /// Fullest cell, ties broken toward higher probability then higher impact.
    /// `None` when the matrix is empty.
    pub fn hottest_cell(&self) -> Option<(ProbabilityBand, ImpactBand, usize)> {
        self.cells()
            .filter(|(_, _, count)| *count > 0)
            .max_by(|a, b| a.2.cmp(&b.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))))
    }

    fn increment(&mut self, probability: ProbabilityBand, impact: ImpactBand) {
        self.cells[probability.index()][impact.index()] += 1;
    }
}

/// Bucket risks into the 3x4 probability x impact grid
pub fn build_risk_matrix(risks: &[Risk]) -> RiskMatrix {
    let mut matrix = RiskMatrix::default();
    for risk in risks {
        let (probability, impact) = cell_for(risk);
        matrix.increment(probability, impact);
    }
    matrix
}

/// Serializes as `{"low": {"low": n, "medium": n, "high": n, "critical": n}, ...}`
impl Serialize for RiskMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rows = serializer.serialize_map(Some(ProbabilityBand::ALL.len()))?;
        for probability in ProbabilityBand::ALL {
            rows.serialize_entry(probability.as_str(), &MatrixRow(self, probability))?;
        }
        rows.end()
    }
}

struct MatrixRow<'a>(&'a RiskMatrix, ProbabilityBand);

impl Serialize for MatrixRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_map(Some(ImpactBand::ALL.len()))?;
        for impact in ImpactBand::ALL {
            row.serialize_entry(impact.as_str(), &self.0.count(self.1, impact))?;
        }
        row.end()
    }
}
