use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn clonevo() -> Command {
    Command::cargo_bin("clonevo").unwrap()
}

/// Write a small configuration and return its path.
fn init_small(dir: &Path, extra: &[&str]) -> std::path::PathBuf {
    let config = dir.join("config.json");
    clonevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .args(["--population-size", "20", "--generations", "30"])
        .args(["--record-every", "10", "--seed", "7"])
        .args(extra)
        .assert()
        .success();
    config
}

#[test]
fn test_init_creates_config() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("test.json");

    clonevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Simulation initialized successfully!",
        ));

    assert!(config.exists());
}

#[test]
fn test_init_population_param() {
    let temp = tempdir().unwrap();

    clonevo()
        .arg("init")
        .arg("--output")
        .arg(temp.path().join("pop.json"))
        .arg("--population-size")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Population size: 10"));
}

#[test]
fn test_init_generations_param() {
    let temp = tempdir().unwrap();

    clonevo()
        .arg("init")
        .arg("--output")
        .arg(temp.path().join("gen.json"))
        .arg("--generations")
        .arg("50")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generations: 50"));
}

#[test]
fn test_init_defaults() {
    let temp = tempdir().unwrap();

    clonevo()
        .current_dir(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Population Size: 1000"));

    assert!(temp.path().join("clonevo.json").exists());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);

    clonevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    clonevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_init_rejects_negative_rate() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("bad.json");

    clonevo()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .arg("--mu-neutral=-0.1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));

    assert!(!config.exists());
}

#[test]
fn test_init_growth_params() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &["--final-size", "80", "--growth", "linear"]);

    clonevo()
        .arg("info")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("linear 20 → 80"));
}

#[test]
fn test_run_execution() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);
    let results = temp.path().join("results.json");

    clonevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&results)
        .arg("--no-progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulation complete!"))
        .stdout(predicate::str::contains("Seed: 7"));

    let text = std::fs::read_to_string(&results).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["generation"], 30);
    assert_eq!(json["population_size"], 20);
    assert_eq!(json["stats"].as_array().unwrap().len(), 3);
}

#[test]
fn test_run_is_reproducible() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);

    let mut outputs = Vec::new();
    for name in ["a.json", "b.json"] {
        let results = temp.path().join(name);
        clonevo()
            .arg("run")
            .arg("-c")
            .arg(&config)
            .arg("-o")
            .arg(&results)
            .arg("--no-progress")
            .assert()
            .success();
        outputs.push(std::fs::read_to_string(&results).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_run_overrides() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);
    let results = temp.path().join("results.json");

    clonevo()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&results)
        .args(["--seed", "99", "--record-every", "1", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seed: 99"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results).unwrap()).unwrap();
    assert_eq!(json["seed"], 99);
    assert_eq!(json["stats"].as_array().unwrap().len(), 30);
}

fn run_to(config: &Path, output: &Path, extra: &[&str]) -> serde_json::Value {
    clonevo()
        .args(["run", "--no-progress", "-c"])
        .arg(config)
        .arg("-o")
        .arg(output)
        .args(extra)
        .assert()
        .success();
    serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap()
}

#[test]
fn test_run_resume_continues_saved_population() {
    let temp = tempdir().unwrap();
    let full_config = init_small(temp.path(), &[]);
    let full = run_to(&full_config, &temp.path().join("full.json"), &[]);

    let half_config = temp.path().join("half.json");
    clonevo()
        .arg("init")
        .arg("--output")
        .arg(&half_config)
        .args(["--population-size", "20", "--generations", "15"])
        .args(["--record-every", "10", "--seed", "7"])
        .assert()
        .success();
    let first_path = temp.path().join("first.json");
    let first = run_to(&half_config, &first_path, &[]);
    assert_eq!(first["generation"], 15);

    let resume_arg = first_path.to_str().unwrap();
    let resumed = run_to(
        &half_config,
        &temp.path().join("resumed.json"),
        &["--resume", resume_arg],
    );

    assert_eq!(resumed["generation"], 30);
    for key in ["population", "rng", "stats", "fixations", "seed"] {
        assert_eq!(resumed[key], full[key], "{key}");
    }
}

#[test]
fn test_run_resume_missing_results() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);

    clonevo()
        .args(["run", "--no-progress", "-c"])
        .arg(&config)
        .arg("--resume")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_run_error_missing_config() {
    let temp = tempdir().unwrap();

    clonevo()
        .arg("run")
        .arg("--config")
        .arg(temp.path().join("non_existent.json"))
        .arg("--no-progress")
        .assert()
        .failure()
        .stderr(predicate::str::contains("clonevo init"));
}

#[test]
fn test_export_stats_csv() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);
    let results = temp.path().join("results.json");

    clonevo()
        .args(["run", "--no-progress", "-c"])
        .arg(&config)
        .arg("-o")
        .arg(&results)
        .assert()
        .success();

    clonevo()
        .arg("export")
        .arg("--input")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("generation,n,mean_fitness"))
        .stdout(predicate::str::contains("neutral_tajimas_d"))
        .stdout(predicate::str::contains("\n30,20,"));

    let fixations = temp.path().join("fixations.json");
    clonevo()
        .arg("export")
        .arg("--input")
        .arg(&results)
        .args(["--data", "fixations", "--format", "json", "--output"])
        .arg(&fixations)
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&fixations).unwrap()).unwrap();
    assert!(json.is_array());
}

#[test]
fn test_generations_lists_recorded() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);
    let results = temp.path().join("results.json");

    clonevo()
        .args(["run", "--no-progress", "-c"])
        .arg(&config)
        .arg("-o")
        .arg(&results)
        .assert()
        .success();

    clonevo()
        .arg("generations")
        .arg("--input")
        .arg(&results)
        .assert()
        .success()
        .stdout(predicate::str::contains("[10, 20, 30]"));
}

#[test]
fn test_validate() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);

    clonevo()
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));

    let bad = temp.path().join("bad.json");
    let text = std::fs::read_to_string(&config)
        .unwrap()
        .replace("\"mu_neutral\": 0.011", "\"mu_neutral\": -0.011");
    std::fs::write(&bad, text).unwrap();

    clonevo()
        .arg("validate")
        .arg("--config")
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Mutation model: FAILED"));
}

#[test]
fn test_verbose_logging() {
    let temp = tempdir().unwrap();
    let config = init_small(temp.path(), &[]);

    clonevo()
        .arg("-v")
        .arg("run")
        .arg("-c")
        .arg(&config)
        .arg("-o")
        .arg(temp.path().join("results.json"))
        .arg("--no-progress")
        .assert()
        .success()
        .stderr(predicate::str::contains("Evolving 30 generations"));
}
