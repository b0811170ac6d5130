use std::fmt;

use serde::{Deserialize, Serialize};

use super::options::sorted_unique_case_insensitive;

// ---------------------------------------------------------------------------
// Dimension – a numeric column that can be filtered or plotted
// ---------------------------------------------------------------------------

/// The numeric measurement columns of a blade record, including the two
/// ratios derived at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "Ep")]
    Ep,
    #[serde(rename = "Ec")]
    Ec,
    #[serde(rename = "Vp")]
    Vp,
    #[serde(rename = "Vl")]
    Vl,
    #[serde(rename = "Ec/Ep")]
    EcEp,
    #[serde(rename = "Vl/Vp")]
    VlVp,
}

impl Dimension {
    /// Column label as it appears in the lab sheet.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Ep => "Ep",
            Dimension::Ec => "Ec",
            Dimension::Vp => "Vp",
            Dimension::Vl => "Vl",
            Dimension::EcEp => "Ec/Ep",
            Dimension::VlVp => "Vl/Vp",
        }
    }

    /// Human readable name used on filter controls.
    pub fn title(self) -> &'static str {
        match self {
            Dimension::Ep => "Primary Elasticity (Ep)",
            Dimension::Ec => "Secondary Elasticity (Ec)",
            Dimension::Vp => "Primary Vibration (Vp)",
            Dimension::Vl => "Local Vibration (Vl)",
            Dimension::EcEp => "Linearity (Ec/Ep)",
            Dimension::VlVp => "Feedback Character (Vl/Vp)",
        }
    }

    pub fn value(self, record: &BladeRecord) -> f64 {
        match self {
            Dimension::Ep => record.ep,
            Dimension::Ec => record.ec,
            Dimension::Vp => record.vp,
            Dimension::Vl => record.vl,
            Dimension::EcEp => record.ec_ep,
            Dimension::VlVp => record.vl_vp,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// NumericRange – closed interval on one dimension
// ---------------------------------------------------------------------------

/// A closed interval `[min, max]`. A degenerate range (`min > max`)
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Smallest range covering every finite value, `None` if there is none.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<NumericRange>, v| match acc {
                None => Some(NumericRange::new(v, v)),
                Some(r) => Some(NumericRange::new(r.min.min(v), r.max.max(v))),
            })
    }
}

// ---------------------------------------------------------------------------
// BladeRecord – one row of the lab sheet
// ---------------------------------------------------------------------------

/// One blade's lab measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct BladeRecord {
    pub brand: String,
    pub name: String,
    /// Construction class, e.g. `5-Ply` or `Carbon Inner`.
    pub blade_type: String,
    pub ep: f64,
    pub ec: f64,
    pub vp: f64,
    pub vl: f64,
    /// Linearity, `ec / ep`.
    pub ec_ep: f64,
    /// Feedback character, `vl / vp`.
    pub vl_vp: f64,
}

impl BladeRecord {
    /// Build a record and derive both ratio columns.
    pub fn new(
        brand: impl Into<String>,
        name: impl Into<String>,
        blade_type: impl Into<String>,
        ep: f64,
        ec: f64,
        vp: f64,
        vl: f64,
    ) -> Self {
        Self {
            brand: brand.into(),
            name: name.into(),
            blade_type: blade_type.into(),
            ep,
            ec,
            vp,
            vl,
            ec_ep: ec / ep,
            vl_vp: vl / vp,
        }
    }

    /// False when a zero (or non-finite) divisor made a ratio undefined.
    pub fn has_finite_ratios(&self) -> bool {
        self.ep != 0.0 && self.vp != 0.0 && self.ec_ep.is_finite() && self.vl_vp.is_finite()
    }
}

// ---------------------------------------------------------------------------
// BladeDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Ordered blade records with pre-computed category option lists.
#[derive(Debug, Clone, Default)]
pub struct BladeDataset {
    pub records: Vec<BladeRecord>,
    /// Distinct brands, case-insensitively sorted.
    pub brands: Vec<String>,
    /// Distinct blade types, case-insensitively sorted.
    pub types: Vec<String>,
    /// Rows skipped at load time because a ratio was undefined.
    pub dropped_rows: usize,
}

impl BladeDataset {
    pub fn from_records(records: Vec<BladeRecord>) -> Self {
        let brands = sorted_unique_case_insensitive(records.iter().map(|r| r.brand.as_str()));
        let types = sorted_unique_case_insensitive(records.iter().map(|r| r.blade_type.as_str()));
        BladeDataset {
            records,
            brands,
            types,
            dropped_rows: 0,
        }
    }

    /// Copy of the rows at `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let records = indices
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        Self::from_records(records)
    }

    pub fn column(&self, dim: Dimension) -> Vec<f64> {
        self.records.iter().map(|r| dim.value(r)).collect()
    }

    pub fn range_of(&self, dim: Dimension) -> Option<NumericRange> {
        NumericRange::spanning(self.records.iter().map(|r| dim.value(r)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rows() -> BladeDataset {
        BladeDataset::from_records(vec![
            BladeRecord::new("Stiga", "Clipper", "7-Ply", 1.0, 1.0, 1.0, 1.0),
            BladeRecord::new("Butterfly", "Viscaria", "Carbon Outer", 2.0, 3.0, 0.5, 0.4),
        ])
    }

    #[test]
    fn ratios_are_derived_row_wise() {
        let ds = two_rows();
        assert_eq!(ds.column(Dimension::EcEp), vec![1.0, 1.5]);
        let vl_vp = ds.column(Dimension::VlVp);
        assert!((vl_vp[0] - 1.0).abs() < 1e-12);
        assert!((vl_vp[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn zero_divisor_is_flagged() {
        let rec = BladeRecord::new("X", "Y", "5-Ply", 0.0, 1.0, 1.0, 1.0);
        assert!(!rec.has_finite_ratios());
        let rec = BladeRecord::new("X", "Y", "5-Ply", 1.0, 1.0, 0.0, 0.0);
        assert!(!rec.has_finite_ratios());
    }

    #[test]
    fn option_lists_are_sorted_case_insensitively() {
        let ds = two_rows();
        assert_eq!(ds.brands, vec!["Butterfly", "Stiga"]);
        assert_eq!(ds.types, vec!["7-Ply", "Carbon Outer"]);
    }

    #[test]
    fn range_spans_finite_values() {
        let ds = two_rows();
        assert_eq!(ds.range_of(Dimension::Ep), Some(NumericRange::new(1.0, 2.0)));
        assert_eq!(BladeDataset::default().range_of(Dimension::Ep), None);
    }

    #[test]
    fn subset_keeps_requested_order() {
        let ds = two_rows();
        let sub = ds.subset(&[1, 0]);
        assert_eq!(sub.records[0].name, "Viscaria");
        assert_eq!(sub.records[1].name, "Clipper");
    }

    #[test]
    fn dimension_serializes_as_column_label() {
        let json = serde_json::to_string(&Dimension::VlVp).unwrap();
        assert_eq!(json, "\"Vl/Vp\"");
        let dim: Dimension = serde_json::from_str("\"Ec/Ep\"").unwrap();
        assert_eq!(dim, Dimension::EcEp);
    }
}
