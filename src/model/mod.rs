//! The model view: a read-only adapter over metabolites and reactions,
//! plus the clone-on-write working copy tests mutate. [`ModelView`] is
//! the trait both [`Model`] and [`WorkingModel`] implement for callers
//! that only need to inspect shape.

pub mod metabolite;
pub mod reaction;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

pub use metabolite::Metabolite;
pub use reaction::{Bounds, Coefficient, Reaction};

use crate::error::{MacawError, MacawResult};
use crate::lp::{FbaOutcome, LpSolver};

/// A linear equality constraint over reaction fluxes: `Σ terms[r] * v_r = rhs`.
/// Used only by the dilution test's coupling constraint.
#[derive(Debug, Clone, Default)]
pub struct LinearConstraint {
    pub terms: FxHashMap<String, f64>,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(terms: FxHashMap<String, f64>, rhs: f64) -> Self {
        Self { terms, rhs }
    }
}

/// Shared read-only query surface over metabolites and reactions,
/// implemented by both the immutable `Model` and the `WorkingModel`
/// copy the LP-backed tests mutate. Callers that only need to inspect
/// a network's shape, not construct or mutate it, can take `&dyn
/// ModelView` and accept either.
pub trait ModelView {
    fn reaction_ids_vec(&self) -> Vec<&str>;
    fn metabolite_ids_vec(&self) -> Vec<&str>;
    fn reaction_view(&self, id: &str) -> Option<&Reaction>;
    fn metabolite_view(&self, id: &str) -> Option<&Metabolite>;
    fn reactions_vec(&self) -> Vec<&Reaction>;
    fn reactions_touching_view(&self, metabolite_id: &str) -> Vec<&Reaction>;
}

/// Immutable, sealed metabolic network. Construction validates that
/// every metabolite referenced by a reaction is in the metabolite set,
/// and every reaction's bounds satisfy `lb <= ub`.
#[derive(Debug, Clone)]
pub struct Model {
    metabolites: FxHashMap<String, Metabolite>,
    reactions: IndexMap<String, Reaction>,
}

impl Model {
    pub fn build(
        metabolites: Vec<Metabolite>,
        reactions: Vec<Reaction>,
    ) -> MacawResult<Self> {
        let mut met_map = FxHashMap::default();
        for m in metabolites {
            if met_map.insert(m.id.clone(), m).is_some() {
                return Err(MacawError::InvalidModel(format!(
                    "duplicate metabolite id {}",
                    met_map.len()
                )));
            }
        }
        let mut rxn_map = IndexMap::new();
        for r in reactions {
            if r.bounds.lb > r.bounds.ub {
                return Err(MacawError::InvalidModel(format!(
                    "reaction {} has lb > ub",
                    r.id
                )));
            }
            for (met_id, _) in r.stoichiometry() {
                if !met_map.contains_key(met_id) {
                    return Err(MacawError::InvalidModel(format!(
                        "reaction {} references unknown metabolite {}",
                        r.id, met_id
                    )));
                }
            }
            if rxn_map.insert(r.id.clone(), r).is_some() {
                return Err(MacawError::InvalidModel(
                    "duplicate reaction id".to_string(),
                ));
            }
        }
        Ok(Self { metabolites: met_map, reactions: rxn_map })
    }

    pub fn reaction_ids(&self) -> impl Iterator<Item = &str> {
        self.reactions.keys().map(|s| s.as_str())
    }

    pub fn metabolite_ids(&self) -> impl Iterator<Item = &str> {
        self.metabolites.keys().map(|s| s.as_str())
    }

    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    pub fn metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.get(id)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    pub fn metabolites(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    /// Reactions touching a given metabolite, in a deterministic order.
    pub fn reactions_touching(&self, metabolite_id: &str) -> Vec<&Reaction> {
        self.reactions
            .values()
            .filter(|r| r.participates(metabolite_id))
            .collect()
    }

    /// Independent working copy with zero objective, no extra
    /// constraints, and bounds identical to this model's.
    pub fn cloned(&self) -> WorkingModel {
        WorkingModel {
            metabolites: self.metabolites.clone(),
            reactions: self.reactions.clone(),
            extra_constraints: Vec::new(),
        }
    }
}

impl ModelView for Model {
    fn reaction_ids_vec(&self) -> Vec<&str> {
        self.reaction_ids().collect()
    }

    fn metabolite_ids_vec(&self) -> Vec<&str> {
        self.metabolite_ids().collect()
    }

    fn reaction_view(&self, id: &str) -> Option<&Reaction> {
        self.reaction(id)
    }

    fn metabolite_view(&self, id: &str) -> Option<&Metabolite> {
        self.metabolite(id)
    }

    fn reactions_vec(&self) -> Vec<&Reaction> {
        self.reactions().collect()
    }

    fn reactions_touching_view(&self, metabolite_id: &str) -> Vec<&Reaction> {
        self.reactions_touching(metabolite_id)
    }
}


/// A mutable working copy of a model. Bounds, added metabolites/reactions,
/// and added linear constraints are local to this copy; the source
/// `Model` is never mutated.
#[derive(Debug, Clone)]
pub struct WorkingModel {
    metabolites: FxHashMap<String, Metabolite>,
    reactions: IndexMap<String, Reaction>,
    extra_constraints: Vec<LinearConstraint>,
}

impl WorkingModel {
    pub fn reaction_ids(&self) -> impl Iterator<Item = &str> {
        self.reactions.keys().map(|s| s.as_str())
    }

    pub fn metabolite_ids(&self) -> impl Iterator<Item = &str> {
        self.metabolites.keys().map(|s| s.as_str())
    }

    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.get(id)
    }

    pub fn metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.get(id)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    pub fn reactions_touching(&self, metabolite_id: &str) -> Vec<&Reaction> {
        self.reactions
            .values()
            .filter(|r| r.participates(metabolite_id))
            .collect()
    }

    pub fn extra_constraints(&self) -> &[LinearConstraint] {
        &self.extra_constraints
    }

    pub fn set_bounds(&mut self, reaction_id: &str, bounds: Bounds) -> MacawResult<()> {
        match self.reactions.get_mut(reaction_id) {
            Some(r) => {
                r.bounds = bounds;
                Ok(())
            }
            None => Err(MacawError::InvalidModel(format!(
                "unknown reaction {reaction_id}"
            ))),
        }
    }

    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        self.metabolites.insert(metabolite.id.clone(), metabolite);
    }

    pub fn add_reaction(&mut self, reaction: Reaction) -> MacawResult<()> {
        for (met_id, _) in reaction.stoichiometry() {
            if !self.metabolites.contains_key(met_id) {
                return Err(MacawError::InvalidModel(format!(
                    "reaction {} references unknown metabolite {}",
                    reaction.id, met_id
                )));
            }
        }
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    pub fn add_linear_constraint(&mut self, constraint: LinearConstraint) {
        self.extra_constraints.push(constraint);
    }

    /// Runs FBA: maximize or minimize `objective` (a reaction_id -> weight
    /// map) subject to steady-state mass balance, this copy's bounds, and
    /// any added linear constraints. Suspension may occur only here and
    /// in `run_sampling`.
    pub fn run_fba(
        &self,
        solver: &dyn LpSolver,
        objective: &FxHashMap<String, f64>,
        maximize: bool,
    ) -> MacawResult<FbaOutcome> {
        solver.solve(self, objective, maximize)
    }

    /// Samples `n` flux distributions from the feasible polytope.
    pub fn run_sampling(
        &self,
        solver: &dyn LpSolver,
        n: usize,
        seed: u64,
    ) -> MacawResult<Vec<FxHashMap<String, f64>>> {
        solver.sample(self, n, seed)
    }
}

impl ModelView for WorkingModel {
    fn reaction_ids_vec(&self) -> Vec<&str> {
        self.reaction_ids().collect()
    }

    fn metabolite_ids_vec(&self) -> Vec<&str> {
        self.metabolite_ids().collect()
    }

    fn reaction_view(&self, id: &str) -> Option<&Reaction> {
        self.reaction(id)
    }

    fn metabolite_view(&self, id: &str) -> Option<&Metabolite> {
        self.metabolite(id)
    }

    fn reactions_vec(&self) -> Vec<&Reaction> {
        self.reactions().collect()
    }

    fn reactions_touching_view(&self, metabolite_id: &str) -> Vec<&Reaction> {
        self.reactions_touching(metabolite_id)
    }
}
