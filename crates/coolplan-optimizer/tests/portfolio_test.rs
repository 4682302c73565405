//! End-to-end portfolio optimization from JSON request records

use coolplan_common::{
    AllocationVector, ConfigurationError, Constraints, CoolplanError, InterventionCandidate,
    OptimizationParams, OptimizationRequest, ValidationError,
};
use coolplan_optimizer::{evaluate, optimize, InterventionOptimizer, NeverStop};
use proptest::prelude::*;
use serde_json::{json, Value};

fn three_candidate_request(params: Value) -> OptimizationRequest {
    OptimizationRequest::from_value(json!({
        "interventions": [
            {"id": 1, "cost": 100, "cooling_effect": 1, "feasibility": 0.9, "community_benefit": 0.8,
             "intervention_type": "green_corridor"},
            {"id": 2, "cost": 200, "cooling_effect": 2, "feasibility": 0.5, "community_benefit": 0.6,
             "intervention_type": "cool_roof"},
            {"id": 3, "cost": 300, "cooling_effect": 5, "feasibility": 0.3, "community_benefit": 0.4,
             "intervention_type": "water_body"}
        ],
        "constraints": {"max_budget": 250},
        "optimization_params": params
    }))
    .unwrap()
}

fn scenario_candidates() -> Vec<InterventionCandidate> {
    three_candidate_request(json!({})).validate().unwrap().candidates
}

#[test]
fn test_three_candidate_scenario_respects_budget() {
    let request = three_candidate_request(json!({"population_size": 50, "generations": 100}));
    let result = InterventionOptimizer::default().optimize(&request).unwrap();
    let summary = &result.optimization_summary;

    assert!(summary.total_budget_utilized <= 250.0);
    assert!(!result.optimal_interventions.is_empty());

    // Candidate 3 alone at full allocation would cost 300.
    let water = result
        .optimal_interventions
        .iter()
        .find(|s| s.intervention_id == "3");
    if let Some(water) = water {
        assert!(water.allocation_percentage < 100.0);
    }

    // Beats every affordable full single-candidate portfolio.
    let candidates = scenario_candidates();
    let constraints = Constraints::new(250.0).unwrap();
    for full in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        let single = evaluate(&AllocationVector::from_raw(full), &candidates, &constraints).unwrap();
        assert!(summary.fitness_score > single);
    }
}

#[test]
fn test_tight_budget_still_selects_a_portfolio() {
    let interventions: Vec<Value> = (0..20)
        .map(|i| json!({"id": i, "cost": 100, "cooling_effect": 1, "feasibility": 0.5, "community_benefit": 0.5}))
        .collect();
    let request = OptimizationRequest::from_value(json!({
        "interventions": interventions,
        "constraints": {"max_budget": 150}
    }))
    .unwrap();

    let result = InterventionOptimizer::default().optimize(&request).unwrap();
    let summary = &result.optimization_summary;

    // One candidate at full allocation costs 100 and is affordable.
    let candidates = request.validate().unwrap().candidates;
    let mut full = vec![0.0; 20];
    full[0] = 1.0;
    let single = evaluate(
        &AllocationVector::from_raw(full),
        &candidates,
        &Constraints::new(150.0).unwrap(),
    )
    .unwrap();

    assert!(summary.fitness_score > single);
    assert!(summary.total_budget_utilized <= 150.0);
    assert!(summary.optimization_iterations > 1);
}

#[test]
fn test_identical_inputs_identical_results() {
    let request = three_candidate_request(json!({"population_size": 20, "generations": 60, "seed": 1234}));
    let optimizer = InterventionOptimizer::default();

    let first = optimizer.optimize(&request).unwrap();
    let second = optimizer.optimize(&request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_calls_do_not_interfere() {
    let request = three_candidate_request(json!({"population_size": 16, "generations": 40, "seed": 99}));
    let optimizer = InterventionOptimizer::default();
    let expected = optimizer.optimize(&request).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| optimizer.optimize(&request).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_empty_candidate_list() {
    let request = OptimizationRequest::from_value(json!({
        "interventions": [],
        "constraints": {"max_budget": 1000}
    }))
    .unwrap();

    let result = InterventionOptimizer::default().optimize(&request).unwrap();
    assert!(result.optimal_interventions.is_empty());
    assert_eq!(result.optimization_summary.total_budget_utilized, 0.0);
    assert_eq!(result.optimization_summary.fitness_score, 0.0);
    assert_eq!(result.optimization_summary.optimization_iterations, 0);
}

#[test]
fn test_partial_candidate_rejected() {
    let request = OptimizationRequest::from_value(json!({
        "interventions": [{"id": "a", "cost": 10, "feasibility": 0.5, "community_benefit": 0.5}],
        "constraints": {"max_budget": 100}
    }))
    .unwrap();

    let err = InterventionOptimizer::default().optimize(&request).unwrap_err();
    assert!(matches!(
        err,
        CoolplanError::Validation(ValidationError::MissingField {
            field: "cooling_effect",
            ..
        })
    ));
}

#[test]
fn test_non_positive_budget_rejected() {
    let request = OptimizationRequest::from_value(json!({
        "interventions": [{"id": "a", "cost": 10, "cooling_effect": 1, "feasibility": 0.5, "community_benefit": 0.5}],
        "constraints": {"max_budget": -20}
    }))
    .unwrap();

    assert!(matches!(
        InterventionOptimizer::default().optimize(&request).unwrap_err(),
        CoolplanError::Configuration(ConfigurationError::InvalidBudget { .. })
    ));
}

#[test]
fn test_result_serializes_to_flat_record() {
    let request = three_candidate_request(json!({"population_size": 10, "generations": 20}));
    let result = InterventionOptimizer::default().optimize(&request).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert!(value["optimal_interventions"].is_array());
    assert!(value["optimization_summary"]["convergence_achieved"].is_boolean());
    assert_eq!(value["algorithm_params"]["mutation_rate"], json!(0.1));
    assert_eq!(value["algorithm_params"]["crossover_rate"], json!(0.7));
}

#[test]
fn test_free_function_contract() {
    let candidates = scenario_candidates();
    let constraints = Constraints::new(250.0).unwrap();
    let (alloc, iterations, _) = optimize(&candidates, &constraints, 24, 80, 42).unwrap();
    assert_eq!(alloc.len(), candidates.len());
    assert!(iterations <= 80);
}

fn candidate_strategy() -> impl Strategy<Value = InterventionCandidate> {
    (0.0f64..1000.0, 0.0f64..10.0, 0.0f64..1.0, 0.0f64..1.0)
        .prop_map(|(cost, cooling, feas, comm)| InterventionCandidate::new("c", cost, cooling, feas, comm))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_assembled_budget_never_exceeds_max(
        candidates in prop::collection::vec(candidate_strategy(), 1..6),
        max_budget in 1.0f64..2000.0,
        seed in any::<u64>(),
    ) {
        let constraints = Constraints::new(max_budget).unwrap();
        let params = OptimizationParams::default()
            .with_population_size(8)
            .with_generations(15)
            .with_seed(seed);

        let result = InterventionOptimizer::default()
            .run(&candidates, &constraints, &params, &NeverStop)
            .unwrap();

        prop_assert!(result.optimization_summary.total_budget_utilized <= max_budget);
        prop_assert!(result.optimal_interventions.len() <= candidates.len());
        for selected in &result.optimal_interventions {
            prop_assert!(selected.allocation_percentage >= 10.0);
            prop_assert!(selected.allocation_percentage <= 100.0);
        }
    }
}
