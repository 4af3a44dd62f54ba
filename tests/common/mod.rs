use std::sync::Arc;

use macaw::lp::reference::DenseLpSolver;
use macaw::lp::LpSolver;
use macaw::model::reaction::{Bounds, Coefficient};
use macaw::model::{Metabolite, Model, Reaction};
use rustc_hash::FxHashMap as Map;

pub fn solver() -> Arc<dyn LpSolver> {
    Arc::new(DenseLpSolver)
}

pub fn mets(ids: &[&str]) -> Vec<Metabolite> {
    ids.iter().map(|id| Metabolite::new(*id)).collect()
}

/// `terms` is a list of (metabolite_id, signed integer coefficient).
pub fn rxn(id: &str, terms: &[(&str, i64)], bounds: Bounds) -> Reaction {
    let stoich: Map<String, Coefficient> = terms
        .iter()
        .map(|(m, c)| (m.to_string(), Coefficient::from_integer(*c)))
        .collect();
    Reaction::new(id, stoich, bounds)
}

pub const IRREVERSIBLE: Bounds = Bounds { lb: 0.0, ub: 1000.0 };
pub const REVERSIBLE: Bounds = Bounds { lb: -1000.0, ub: 1000.0 };

/// A -> B -> C -> D, all irreversible, no exchanges.
pub fn linear_chain_no_exchanges() -> Model {
    Model::build(
        mets(&["A", "B", "C", "D"]),
        vec![
            rxn("R1", &[("A", -1), ("B", 1)], IRREVERSIBLE),
            rxn("R2", &[("B", -1), ("C", 1)], IRREVERSIBLE),
            rxn("R3", &[("C", -1), ("D", 1)], IRREVERSIBLE),
        ],
    )
    .unwrap()
}

/// A<->B<->C<->A, no exchanges.
pub fn reversible_trio_no_exchanges() -> Model {
    Model::build(
        mets(&["A", "B", "C"]),
        vec![
            rxn("R_ab", &[("A", -1), ("B", 1)], REVERSIBLE),
            rxn("R_bc", &[("B", -1), ("C", 1)], REVERSIBLE),
            rxn("R_ca", &[("C", -1), ("A", 1)], REVERSIBLE),
        ],
    )
    .unwrap()
}

/// R1: A+B->C, R2: A+B->C, both irreversible.
pub fn exact_duplicate_pair() -> Model {
    Model::build(
        mets(&["A", "B", "C"]),
        vec![
            rxn("R1", &[("A", -1), ("B", -1), ("C", 1)], IRREVERSIBLE),
            rxn("R2", &[("A", -1), ("B", -1), ("C", 1)], IRREVERSIBLE),
        ],
    )
    .unwrap()
}

/// R1: X+NAD->Y+NADH+H, R2: X+NADP->Y+NADPH+H.
pub fn redox_duplicate_pair() -> Model {
    Model::build(
        mets(&["X", "Y", "NAD", "NADH", "NADP", "NADPH", "H"]),
        vec![
            rxn(
                "R1",
                &[("X", -1), ("NAD", -1), ("Y", 1), ("NADH", 1), ("H", 1)],
                IRREVERSIBLE,
            ),
            rxn(
                "R2",
                &[("X", -1), ("NADP", -1), ("Y", 1), ("NADPH", 1), ("H", 1)],
                IRREVERSIBLE,
            ),
        ],
    )
    .unwrap()
}

/// R: ATP <-> AMP + PPi, reversible.
pub fn diphosphate_reversible_reaction() -> Model {
    Model::build(
        mets(&["ATP", "AMP", "PPi"]),
        vec![rxn("R", &[("ATP", -1), ("AMP", 1), ("PPi", 1)], REVERSIBLE)],
    )
    .unwrap()
}

/// Pure recycle with no source or sink: A_cycle and B_cycle only ever
/// convert into each other, both irreversible, no exchanges — neither
/// has a free source or sink to supply a dilution drain.
pub fn dilution_blocked_recycle() -> Model {
    Model::build(
        mets(&["A_cycle", "B_cycle"]),
        vec![
            rxn("R1", &[("A_cycle", -1), ("B_cycle", 1)], IRREVERSIBLE),
            rxn("R2", &[("B_cycle", -1), ("A_cycle", 1)], IRREVERSIBLE),
        ],
    )
    .unwrap()
}
