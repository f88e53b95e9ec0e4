//! # Reference Catalogue
//!
//! A small set of calculators that exercise the whole engine contract:
//!
//! | Id | Shape |
//! |----|-------|
//! | `construction-cost` | output bag, lookup tables, report |
//! | `mortgage-payment` | envelope with intermediate steps, cross-field rule, report |
//! | `roi` | envelope with explanation, optional fields, report |
//! | `break-even` | output bag, cross-field rule |
//! | `home-insurance` | enum tables, unmodeled combinations fail, report |
//! | `balanced-scorecard` | stochastic Monte Carlo, dotted field ids |

pub mod balanced_scorecard;
pub mod break_even;
pub mod construction_cost;
pub mod home_insurance;
pub mod mortgage_payment;
pub mod roi;

use crate::calculator::CalculatorDefinition;
use crate::errors::CalcResult;
use crate::registry::Registry;

/// Every catalogue calculator, in registration order.
pub fn definitions() -> Vec<CalculatorDefinition> {
    vec![
        construction_cost::definition(),
        mortgage_payment::definition(),
        roi::definition(),
        break_even::definition(),
        home_insurance::definition(),
        balanced_scorecard::definition(),
    ]
}

/// Register the whole catalogue.
pub fn register_all(registry: &Registry) -> CalcResult<()> {
    for definition in definitions() {
        registry.register(definition)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DuplicatePolicy;
    use crate::schema::{duplicate_ids, required_ids};
    use crate::values::InputBag;

    #[test]
    fn test_register_all() {
        let registry = Registry::with_policy(DuplicatePolicy::Reject);
        register_all(&registry).unwrap();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.list()[0].id, construction_cost::ID);
        assert_eq!(registry.by_category("Business").len(), 3);

        // A second pass collides under the reject policy
        assert_eq!(register_all(&registry).unwrap_err().error_code(), "DUPLICATE_CALCULATOR");
    }

    #[test]
    fn test_definitions_are_well_formed() {
        for definition in definitions() {
            assert!(duplicate_ids(&definition.inputs).is_empty(), "{}", definition.id);
            assert!(duplicate_ids(&definition.outputs).is_empty(), "{}", definition.id);
            assert!(!definition.examples.is_empty(), "{} has no examples", definition.id);
        }
    }

    #[test]
    fn test_empty_bag_fails_only_on_presence() {
        for definition in definitions() {
            let result = definition.validate(&InputBag::new());
            assert!(!result.is_valid());
            let required = required_ids(&definition.inputs);
            assert_eq!(result.errors().len(), required.len(), "{}", definition.id);
            for field in required {
                assert!(result.has_error_for(field), "{} missing {}", definition.id, field);
            }
        }
    }

    #[test]
    fn test_related_ids_exist() {
        let ids: Vec<String> = definitions().into_iter().map(|d| d.id).collect();
        for definition in definitions() {
            for related in &definition.related {
                assert!(ids.contains(related), "{} -> {}", definition.id, related);
            }
        }
    }
}
