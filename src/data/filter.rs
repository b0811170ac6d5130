use std::collections::BTreeSet;

use super::model::{BladeDataset, BladeRecord, Dimension, NumericRange};

// ---------------------------------------------------------------------------
// Filter selection: four closed ranges plus two category sets
// ---------------------------------------------------------------------------

/// What the sidebar currently allows through.
///
/// An empty `brands` or `types` set means "no restriction" on that column,
/// not "exclude everything".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub ep: NumericRange,
    pub ec_ep: NumericRange,
    pub vp: NumericRange,
    pub vl_vp: NumericRange,
    pub brands: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        let all = NumericRange::new(f64::NEG_INFINITY, f64::INFINITY);
        Self {
            ep: all,
            ec_ep: all,
            vp: all,
            vl_vp: all,
            brands: BTreeSet::new(),
            types: BTreeSet::new(),
        }
    }
}

impl FilterSelection {
    /// The range controls in sidebar order.
    pub const RANGE_DIMENSIONS: [Dimension; 4] =
        [Dimension::Ep, Dimension::EcEp, Dimension::Vp, Dimension::VlVp];

    pub fn range_mut(&mut self, dim: Dimension) -> Option<&mut NumericRange> {
        match dim {
            Dimension::Ep => Some(&mut self.ep),
            Dimension::EcEp => Some(&mut self.ec_ep),
            Dimension::Vp => Some(&mut self.vp),
            Dimension::VlVp => Some(&mut self.vl_vp),
            Dimension::Ec | Dimension::Vl => None,
        }
    }
}

/// Initialise a [`FilterSelection`] spanning the full data (i.e., show everything).
pub fn init_selection(dataset: &BladeDataset) -> FilterSelection {
    let mut selection = FilterSelection::default();
    for dim in FilterSelection::RANGE_DIMENSIONS {
        if let (Some(full), Some(slot)) = (dataset.range_of(dim), selection.range_mut(dim)) {
            *slot = full;
        }
    }
    selection
}

/// Whether a single record passes all six predicates.
pub fn matches(record: &BladeRecord, selection: &FilterSelection) -> bool {
    selection.ep.contains(record.ep)
        && selection.ec_ep.contains(record.ec_ep)
        && selection.vp.contains(record.vp)
        && selection.vl_vp.contains(record.vl_vp)
        && (selection.types.is_empty() || selection.types.contains(&record.blade_type))
        && (selection.brands.is_empty() || selection.brands.contains(&record.brand))
}

/// Return indices of records that pass the selection, in dataset order.
pub fn filtered_indices(dataset: &BladeDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| matches(rec, selection))
        .map(|(i, _)| i)
        .collect()
}

/// The filtered view as its own dataset.
pub fn filter(dataset: &BladeDataset, selection: &FilterSelection) -> BladeDataset {
    dataset.subset(&filtered_indices(dataset, selection))
}
