//! The diphosphate test: a rule over stoichiometry and reversibility,
//! no LP, no edges.

use indexmap::IndexMap;
use num_traits::Zero;

use crate::config::DiphosphateConfig;
use crate::model::reaction::Coefficient;
use crate::model::{Model, Reaction};
use crate::verdict::DiphosphateVerdict;

/// True iff every participating metabolite is a diphosphate, i.e. `r` is
/// nothing but a diphosphate transported between compartments. Two
/// participants is the only shape this can take: the same diphosphate
/// species on each side of a compartment boundary.
fn is_pure_diphosphate_transport(r: &Reaction, ppi_ids: &rustc_hash::FxHashSet<String>) -> bool {
    r.stoichiometry().keys().all(|m| ppi_ids.contains(m))
}

pub fn run(model: &Model, config: &DiphosphateConfig) -> IndexMap<String, DiphosphateVerdict> {
    let mut verdicts = IndexMap::new();

    let (ppi_ids, pi_ids) = match (&config.ppi_ids, &config.pi_ids) {
        (Some(ppi), Some(pi)) => (ppi, pi),
        (Some(_), None) | (None, Some(_)) => {
            // Only one of ppi_ids/pi_ids supplied: not fatal, degrade to
            // all-"ok" and log a warning.
            log::warn!(
                "diphosphate test configured with only one of ppi_ids/pi_ids; \
                 degrading to \"ok\" for every reaction"
            );
            for r in model.reactions() {
                verdicts.insert(r.id.clone(), DiphosphateVerdict::Ok);
            }
            return verdicts;
        }
        (None, None) => {
            for r in model.reactions() {
                verdicts.insert(r.id.clone(), DiphosphateVerdict::Ok);
            }
            return verdicts;
        }
    };
    let _ = pi_ids; // reserved for a future monophosphate-aware refinement

    for r in model.reactions() {
        let touches_ppi = r.stoichiometry().keys().any(|m| ppi_ids.contains(m));
        if !touches_ppi || !r.is_reversible() || is_pure_diphosphate_transport(r, ppi_ids) {
            verdicts.insert(r.id.clone(), DiphosphateVerdict::Ok);
            continue;
        }

        let ppi_is_product = r.stoichiometry().iter().any(|(m, c)| {
            ppi_ids.contains(m) && *c > Coefficient::zero()
        });
        let ppi_is_reactant = r.stoichiometry().iter().any(|(m, c)| {
            ppi_ids.contains(m) && *c < Coefficient::zero()
        });

        let verdict = if ppi_is_product {
            DiphosphateVerdict::ShouldBeIrreversible
        } else if ppi_is_reactant {
            DiphosphateVerdict::ShouldBeFlippedAndIrreversible
        } else {
            DiphosphateVerdict::Ok
        };
        verdicts.insert(r.id.clone(), verdict);
    }

    verdicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reaction::Bounds;
    use crate::model::Metabolite;
    use rustc_hash::{FxHashMap as Map, FxHashSet};

    fn ids(names: &[&str]) -> FxHashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> DiphosphateConfig {
        DiphosphateConfig { ppi_ids: Some(ids(&["ppi_c"])), pi_ids: Some(ids(&["pi_c"])) }
    }

    #[test]
    fn reversible_reaction_producing_ppi_should_be_irreversible() {
        let mets = vec![Metabolite::new("atp_c"), Metabolite::new("amp_c"), Metabolite::new("ppi_c")];
        let mut stoich = Map::default();
        stoich.insert("atp_c".to_string(), Coefficient::from_integer(-1));
        stoich.insert("amp_c".to_string(), Coefficient::from_integer(1));
        stoich.insert("ppi_c".to_string(), Coefficient::from_integer(1));
        let r = Reaction::new("R1", stoich, Bounds::new(-1000.0, 1000.0));
        let model = Model::build(mets, vec![r]).unwrap();

        let verdicts = run(&model, &config());
        assert_eq!(verdicts["R1"], DiphosphateVerdict::ShouldBeIrreversible);
    }

    #[test]
    fn reversible_reaction_consuming_ppi_should_be_flipped() {
        let mets = vec![Metabolite::new("a"), Metabolite::new("b"), Metabolite::new("ppi_c")];
        let mut stoich = Map::default();
        stoich.insert("ppi_c".to_string(), Coefficient::from_integer(-1));
        stoich.insert("a".to_string(), Coefficient::from_integer(-1));
        stoich.insert("b".to_string(), Coefficient::from_integer(1));
        let r = Reaction::new("R1", stoich, Bounds::new(-1000.0, 1000.0));
        let model = Model::build(mets, vec![r]).unwrap();

        let verdicts = run(&model, &config());
        assert_eq!(verdicts["R1"], DiphosphateVerdict::ShouldBeFlippedAndIrreversible);
    }

    #[test]
    fn irreversible_ppi_reaction_is_ok() {
        let mets = vec![Metabolite::new("a"), Metabolite::new("ppi_c")];
        let mut stoich = Map::default();
        stoich.insert("a".to_string(), Coefficient::from_integer(-1));
        stoich.insert("ppi_c".to_string(), Coefficient::from_integer(1));
        let r = Reaction::new("R1", stoich, Bounds::new(0.0, 1000.0));
        let model = Model::build(mets, vec![r]).unwrap();

        let verdicts = run(&model, &config());
        assert_eq!(verdicts["R1"], DiphosphateVerdict::Ok);
    }

    #[test]
    fn pure_transport_is_exempt() {
        let mets = vec![Metabolite::new("ppi_c"), Metabolite::new("ppi_e")];
        let mut stoich = Map::default();
        stoich.insert("ppi_c".to_string(), Coefficient::from_integer(-1));
        stoich.insert("ppi_e".to_string(), Coefficient::from_integer(1));
        let r = Reaction::new("PPIt", stoich, Bounds::new(-1000.0, 1000.0));
        let model = Model::build(mets, vec![r]).unwrap();

        let mut cfg = config();
        cfg.ppi_ids = Some(ids(&["ppi_c", "ppi_e"]));
        let verdicts = run(&model, &cfg);
        assert_eq!(verdicts["PPIt"], DiphosphateVerdict::Ok);
    }

    #[test]
    fn absent_metabolite_lists_yield_ok_for_everything() {
        let mets = vec![Metabolite::new("a"), Metabolite::new("ppi_c")];
        let mut stoich = Map::default();
        stoich.insert("a".to_string(), Coefficient::from_integer(-1));
        stoich.insert("ppi_c".to_string(), Coefficient::from_integer(1));
        let r = Reaction::new("R1", stoich, Bounds::new(-1000.0, 1000.0));
        let model = Model::build(mets, vec![r]).unwrap();

        let verdicts = run(&model, &DiphosphateConfig::default());
        assert_eq!(verdicts["R1"], DiphosphateVerdict::Ok);
    }

    #[test]
    fn only_one_of_ppi_pi_ids_degrades_to_ok_for_everything() {
        let mets = vec![Metabolite::new("a"), Metabolite::new("ppi_c")];
        let mut stoich = Map::default();
        stoich.insert("a".to_string(), Coefficient::from_integer(-1));
        stoich.insert("ppi_c".to_string(), Coefficient::from_integer(1));
        let r = Reaction::new("R1", stoich, Bounds::new(-1000.0, 1000.0));
        let model = Model::build(mets, vec![r]).unwrap();

        let mut cfg = DiphosphateConfig::default();
        cfg.ppi_ids = Some(ids(&["ppi_c"]));
        let verdicts = run(&model, &cfg);
        assert_eq!(verdicts["R1"], DiphosphateVerdict::Ok);
    }
}
