//! Canonical stoichiometric signatures that the four duplicate
//! classifications group reactions by.

use num_traits::Zero;
use rustc_hash::FxHashMap;

use crate::config::RedoxConfig;
use crate::model::reaction::Coefficient;
use crate::model::Reaction;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactSig {
    terms: Vec<(String, i64, i64)>,
    /// `(lb<0, ub>0)` — kept as the pair the spec names rather than
    /// collapsed to `is_reversible()`, so a forward-only, backward-only,
    /// and fully-blocked reaction with identical stoichiometry are three
    /// distinct exact signatures, not one.
    direction: (bool, bool),
}

pub fn exact_signature(r: &Reaction) -> ExactSig {
    let mut terms: Vec<(String, i64, i64)> = r
        .stoichiometry()
        .iter()
        .map(|(m, c)| (m.clone(), *c.numer(), *c.denom()))
        .collect();
    terms.sort();
    ExactSig { terms, direction: (r.bounds.lb < 0.0, r.bounds.ub > 0.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoefficientsSig {
    terms: Vec<(String, i8)>,
}

pub fn coefficients_signature(r: &Reaction) -> CoefficientsSig {
    let mut terms: Vec<(String, i8)> = r
        .stoichiometry()
        .iter()
        .map(|(m, c)| (m.clone(), if *c > Coefficient::zero() { 1 } else { -1 }))
        .collect();
    terms.sort();
    CoefficientsSig { terms }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectionsSig {
    terms: Vec<(String, i64, i64, bool)>,
}

/// Normalizes orientation: the side (reactants or products) whose sorted
/// metabolite-id list is lexicographically larger becomes the canonical
/// `true` side. A reaction and its mirror image (every coefficient
/// negated) always produce the same `DirectionsSig`.
fn directions_signature_of(stoich: &FxHashMap<String, Coefficient>) -> DirectionsSig {
    let mut reactant_ids: Vec<&String> =
        stoich.iter().filter(|(_, c)| **c < Coefficient::zero()).map(|(m, _)| m).collect();
    let mut product_ids: Vec<&String> =
        stoich.iter().filter(|(_, c)| **c > Coefficient::zero()).map(|(m, _)| m).collect();
    reactant_ids.sort();
    product_ids.sort();
    let reactants_are_canonical_side = reactant_ids >= product_ids;

    let mut terms: Vec<(String, i64, i64, bool)> = stoich
        .iter()
        .map(|(m, c)| {
            let is_reactant = *c < Coefficient::zero();
            let side = is_reactant == reactants_are_canonical_side;
            (m.clone(), c.numer().unsigned_abs() as i64, *c.denom(), side)
        })
        .collect();
    terms.sort();
    DirectionsSig { terms }
}

pub fn directions_signature(r: &Reaction) -> DirectionsSig {
    directions_signature_of(r.stoichiometry())
}

/// Strips one oxidized/reduced pair plus every proton ID from each side
/// of `r`'s stoichiometry, returning the index of the pair used (so the
/// caller can require two reactions to have used *different* pairs) and
/// the direction-normalized signature of what remains. `None` if no
/// configured redox pair appears in `r` with opposing signs.
pub fn redox_remainder(r: &Reaction, config: &RedoxConfig) -> Option<(usize, DirectionsSig)> {
    let stoich = r.stoichiometry();
    for (idx, (oxidized, reduced)) in config.redox_pairs.iter().enumerate() {
        let ox = stoich.get(oxidized);
        let red = stoich.get(reduced);
        let (Some(&ox_c), Some(&red_c)) = (ox, red) else { continue };
        let opposing = (ox_c > Coefficient::zero()) != (red_c > Coefficient::zero());
        if !opposing {
            continue;
        }
        let remainder: FxHashMap<String, Coefficient> = stoich
            .iter()
            .filter(|(m, _)| m.as_str() != oxidized && m.as_str() != reduced && !config.proton_ids.contains(*m))
            .map(|(m, c)| (m.clone(), *c))
            .collect();
        return Some((idx, directions_signature_of(&remainder)));
    }
    None
}
