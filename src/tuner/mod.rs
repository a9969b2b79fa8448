pub mod evaluation;
pub mod knobs;
pub mod output;
pub mod search;

pub use evaluation::{
    evaluate_knobs, evaluate_scenario, hill_climb, scenario_grid, EvaluationResult,
    HillClimbConfig, Scenario, ScenarioResult,
};
pub use knobs::{KnobRanges, PolicyKnobs};
pub use output::{print_topk, write_best_policy, write_csv};
pub use search::{run_tuner, TunerConfig, TunerResults};
