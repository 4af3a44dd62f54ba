use num::rational::Ratio;
use num_traits::Zero;
use rustc_hash::FxHashMap;

/// Stoichiometric coefficients are kept as exact rationals so the
/// duplicate test can compare them for equality without floating point
/// tolerance; `as_f64` is the only place a coefficient becomes an
/// `f64`, for handoff to the LP solver.
pub type Coefficient = Ratio<i64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lb: f64,
    pub ub: f64,
}

impl Bounds {
    pub fn new(lb: f64, ub: f64) -> Self {
        debug_assert!(lb <= ub, "lower bound must not exceed upper bound");
        Self { lb, ub }
    }

    /// Reversibility is defined as lb<0 ∧ ub>0.
    pub fn is_reversible(&self) -> bool {
        self.lb < 0.0 && self.ub > 0.0
    }

    pub fn can_go_forward(&self) -> bool {
        self.ub > 0.0
    }

    pub fn can_go_backward(&self) -> bool {
        self.lb < 0.0
    }
}

/// A reaction's identity, stoichiometry, and bounds. The exchange flag is
/// derived from stoichiometry (exactly one participating metabolite),
/// never stored.
#[derive(Debug, Clone)]
pub struct Reaction {
    pub id: String,
    pub equation: Option<String>,
    stoichiometry: FxHashMap<String, Coefficient>,
    pub bounds: Bounds,
    pub gene_annotation: Option<String>,
}

impl Reaction {
    pub fn new(
        id: impl Into<String>,
        stoichiometry: FxHashMap<String, Coefficient>,
        bounds: Bounds,
    ) -> Self {
        Self {
            id: id.into(),
            equation: None,
            stoichiometry,
            bounds,
            gene_annotation: None,
        }
    }

    pub fn with_equation(mut self, equation: impl Into<String>) -> Self {
        self.equation = Some(equation.into());
        self
    }

    pub fn with_gene_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.gene_annotation = Some(annotation.into());
        self
    }

    pub fn stoichiometry(&self) -> &FxHashMap<String, Coefficient> {
        &self.stoichiometry
    }

    pub fn coefficient(&self, metabolite_id: &str) -> Option<Coefficient> {
        self.stoichiometry.get(metabolite_id).copied()
    }

    pub fn coefficient_f64(&self, metabolite_id: &str) -> Option<f64> {
        self.coefficient(metabolite_id).map(ratio_to_f64)
    }

    pub fn participates(&self, metabolite_id: &str) -> bool {
        self.stoichiometry.contains_key(metabolite_id)
    }

    /// A reaction is an exchange reaction iff it has exactly one
    /// participating metabolite.
    pub fn is_exchange(&self) -> bool {
        self.stoichiometry.len() == 1
    }

    pub fn is_reversible(&self) -> bool {
        self.bounds.is_reversible()
    }

    pub fn reactants(&self) -> impl Iterator<Item = (&str, Coefficient)> + '_ {
        self.stoichiometry
            .iter()
            .filter(|(_, c)| **c < Coefficient::zero())
            .map(|(m, c)| (m.as_str(), *c))
    }

    pub fn products(&self) -> impl Iterator<Item = (&str, Coefficient)> + '_ {
        self.stoichiometry
            .iter()
            .filter(|(_, c)| **c > Coefficient::zero())
            .map(|(m, c)| (m.as_str(), *c))
    }
}

pub fn ratio_to_f64(r: Coefficient) -> f64 {
    *r.numer() as f64 / *r.denom() as f64
}
