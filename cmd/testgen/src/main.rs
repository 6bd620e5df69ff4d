//! testgen - YAML config generator for QA test scenarios.
//!
//! Every scenario registered in [`SCENARIOS`] runs on each invocation
//! and writes its own config file into the current directory. To add a
//! scenario, write a generator function and add one table entry.

use std::fs;

use anyhow::Context;
use clap::Parser;
use serde_json::{Value, json};
use tracing::info;

/// Generate YAML configuration files for profiling test scenarios.
#[derive(Parser)]
#[command(name = "testgen")]
#[command(about = "Generate YAML configs for profiling test scenarios")]
#[command(version)]
struct Args {
    /// Comma-separated list of models used for the test
    #[arg(short = 'm', long = "profile-models", required = true)]
    profile_models: String,
}

struct Scenario {
    name: &'static str,
    /// File written into the current directory
    output: &'static str,
    generate: fn(&[String]) -> Value,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "stability-result",
        output: "config.yaml",
        generate: stability_result,
    },
    Scenario {
        name: "multi-model-profile",
        output: "config.yml",
        generate: multi_model_profile,
    },
];

/// Per-model throughput objectives, keyed by model name.
fn stability_result(models: &[String]) -> Value {
    let mut profile_models = serde_json::Map::new();
    for model in models {
        profile_models.insert(
            model.clone(),
            json!({ "objectives": { "perf_throughput": 10 } }),
        );
    }
    json!({ "profile_models": profile_models })
}

/// Concurrent multi-model profiling over a fixed batch/concurrency grid.
fn multi_model_profile(models: &[String]) -> Value {
    json!({
        "batch_sizes": [1, 2],
        "concurrency": [1, 2],
        "profile_models": models,
        "run_config_search_disable": true,
        "run_config_profile_models_concurrently_enable": true,
    })
}

fn sorted_models(csv: &str) -> Vec<String> {
    let mut models: Vec<String> = csv
        .split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .collect();
    models.sort();
    models
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let models = sorted_models(&args.profile_models);

    for scenario in SCENARIOS {
        let config = (scenario.generate)(&models);
        let yaml = serde_yaml::to_string(&config)?;
        fs::write(scenario.output, yaml)
            .with_context(|| format!("writing {}", scenario.output))?;
        info!(scenario.name, scenario.output, "generated config");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_models() {
        assert_eq!(
            sorted_models("vgg19,resnet50, bert_base"),
            vec!["bert_base", "resnet50", "vgg19"]
        );
        assert_eq!(sorted_models("solo"), vec!["solo"]);
        assert!(sorted_models("").is_empty());
    }

    #[test]
    fn test_stability_result_shape() {
        let models = sorted_models("b_model,a_model");
        let config = stability_result(&models);
        assert_eq!(
            config,
            json!({
                "profile_models": {
                    "a_model": { "objectives": { "perf_throughput": 10 } },
                    "b_model": { "objectives": { "perf_throughput": 10 } },
                }
            })
        );
    }

    #[test]
    fn test_multi_model_profile_shape() {
        let models = sorted_models("m2,m1");
        let config = multi_model_profile(&models);
        assert_eq!(config["batch_sizes"], json!([1, 2]));
        assert_eq!(config["concurrency"], json!([1, 2]));
        assert_eq!(config["profile_models"], json!(["m1", "m2"]));
        assert_eq!(config["run_config_search_disable"], json!(true));
        assert_eq!(
            config["run_config_profile_models_concurrently_enable"],
            json!(true)
        );
    }

    #[test]
    fn test_scenarios_serialize_to_yaml() {
        let models = sorted_models("resnet50");
        for scenario in SCENARIOS {
            let config = (scenario.generate)(&models);
            let yaml = serde_yaml::to_string(&config).unwrap();
            let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(parsed, config, "scenario {} round trip", scenario.name);
        }
    }

    #[test]
    fn test_scenario_outputs_are_distinct() {
        let mut outputs: Vec<&str> = SCENARIOS.iter().map(|s| s.output).collect();
        outputs.sort();
        outputs.dedup();
        assert_eq!(outputs.len(), SCENARIOS.len());
    }
}
