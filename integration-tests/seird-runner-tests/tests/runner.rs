#[cfg(test)]
mod tests {
    use assert_cmd::cargo::CargoError;
    use std::fs;
    use tempfile::tempdir;

    pub fn run_external_runner(runner_name: &str) -> Result<assert_cmd::Command, CargoError> {
        assert_cmd::Command::cargo_bin(runner_name)
    }

    fn stdout_of(args: &[&str]) -> String {
        let output = run_external_runner("runner_test_cli")
            .unwrap()
            .args(args)
            .output()
            .unwrap();
        assert!(output.status.success(), "{output:?}");
        String::from_utf8(output.stdout).unwrap()
    }

    #[test]
    fn runs_default_preset() {
        let stdout = stdout_of(&[]);
        assert!(stdout.contains("Scenario: covid19-seird"));
        assert!(stdout.contains("Countermeasures in effect from day: 57"));
        assert!(stdout.contains("Number of Susceptible at Day 150: "));
        assert!(stdout.contains("Total Number of Population: 10000"));
    }

    #[test]
    fn runs_seirdp_preset_with_adaptive_solver() {
        let stdout = stdout_of(&["--preset", "covid19-seirdp", "--solver", "dopri5"]);
        assert!(stdout.contains("Number of Dead due to natural causes at Day 100: "));
    }

    #[test]
    fn writes_csv_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("trajectory.csv");
        let path_arg = path.to_str().unwrap();
        stdout_of(&["--days", "30", "--output", path_arg]);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(header, ["day", "S", "E", "I", "R", "D"]);
        assert_eq!(reader.records().count(), 30);
    }

    #[test]
    fn info_level_logs_activation_notice() {
        let output = run_external_runner("runner_test_cli")
            .unwrap()
            .args(["--log-level", "info"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("Countermeasures come into effect on day: 57"));
        assert_eq!(
            stderr.matches("Countermeasures come into effect").count(),
            1
        );
    }

    #[test]
    fn rejects_bad_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut scenario: serde_json::Value = serde_json::json!({
            "name": "bad",
            "parameters": {
                "r0": 2.5, "r1": 1.5, "gamma": 0.0, "sigma": 0.37,
                "base_fatality_rate": 0.07, "fatality_rho": 0.8
            },
            "policy": {"threshold_day": 57},
            "population_size": 10000.0,
            "initial_exposed": 1.0,
            "days_to_simulate": 150
        });
        fs::write(&path, scenario.to_string()).unwrap();

        let output = run_external_runner("runner_test_cli")
            .unwrap()
            .args(["--config", path.to_str().unwrap()])
            .output()
            .unwrap();
        assert!(!output.status.success());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("gamma must be positive"), "{stderr}");

        scenario["parameters"] = serde_json::json!("not a record");
        fs::write(&path, scenario.to_string()).unwrap();
        run_external_runner("runner_test_cli")
            .unwrap()
            .args(["--config", path.to_str().unwrap()])
            .assert()
            .failure();
    }

    #[test]
    fn rejects_unknown_preset_and_solver() {
        run_external_runner("runner_test_cli")
            .unwrap()
            .args(["--preset", "measles"])
            .assert()
            .failure();
        run_external_runner("runner_test_cli")
            .unwrap()
            .args(["--solver", "euler"])
            .assert()
            .failure();
    }
}
