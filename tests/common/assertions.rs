use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use vcl::interpreter::{Context, CoverageKind, CoverageRegistry};

/// Assert two evaluations ended in the same observable state
pub fn assert_same_outcome(plain: &Context, covered: &Context) {
    let plain_vars: Vec<_> = plain.variables().collect();
    let covered_vars: Vec<_> = covered.variables().collect();
    assert_eq!(plain_vars, covered_vars);
    assert_eq!(plain.return_state, covered.return_state);
    assert_eq!(plain.error, covered.error);
    assert_eq!(plain.logs, covered.logs);
    assert_eq!(plain.response_body, covered.response_body);
    assert_eq!(plain.restarted, covered.restarted);
    assert_eq!(plain.esi, covered.esi);
}

/// Every registered identifier, tagged with its kind
pub fn registered_ids(registry: &CoverageRegistry) -> BTreeSet<(CoverageKind, String)> {
    CoverageKind::ALL
        .iter()
        .flat_map(|kind| registry.ids(*kind).into_iter().map(|id| (*kind, id)))
        .collect()
}

/// Marker identifiers referenced by the printed form of a program
pub fn printed_ids(printed: &str) -> BTreeSet<(CoverageKind, String)> {
    printed
        .split('"')
        .filter_map(|word| {
            let kind = CoverageKind::ALL
                .into_iter()
                .find(|kind| word.starts_with(&format!("{}_", kind.prefix())))?;
            Some((kind, word.to_string()))
        })
        .collect()
}
