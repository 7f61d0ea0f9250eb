mod common;
use common::*;
use predicates::prelude::*;

fn site_names(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.split(',').nth(2).unwrap().to_string())
        .collect()
}

#[test]
fn test_sites_default_radius_sorted_by_distance() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    let lines = sites_test(&sites, &["--format=csv"]).stdout_lines();

    assert_eq!(lines[0], "latitude,longitude,name,category,distance,angle");
    assert_eq!(
        site_names(&lines[1..]),
        vec!["Luckenwalde", "Zossen", "Königs Wusterhausen", "Potsdam"]
    );
    assert_eq!(lines[1], "52.09000,13.17000,Luckenwalde,no entry,18.649,0.18304");
    assert_eq!(
        lines[3],
        "52.30000,13.63000,Königs Wusterhausen,\"Power Plants,Waste\",36.877,0.49788"
    );
}

#[test]
fn test_sites_custom_radius() {
    let sites = TempInput::new("sites.csv", SITES_CSV);

    let lines = sites_test(&sites, &["--format=csv", "--no-headers", "--radius=60"]).stdout_lines();
    assert_eq!(lines.len(), 5);
    assert!(lines[4].contains("Berlin Mitte,Chemicals,57.841"));

    let lines = sites_test(&sites, &["--format=csv", "--no-headers", "--radius=20"]).stdout_lines();
    assert_eq!(site_names(&lines), vec!["Luckenwalde"]);
}

#[test]
fn test_sites_limit_nearest() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    let lines = sites_test(&sites, &["--format=csv", "--no-headers", "--limit=2"]).stdout_lines();
    assert_eq!(site_names(&lines), vec!["Luckenwalde", "Zossen"]);
}

#[test]
fn test_sites_limit_farthest_keeps_ascending_order() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    let lines = sites_test(
        &sites,
        &["--format=csv", "--no-headers", "--limit=2", "--rank=farthest"],
    )
    .stdout_lines();
    assert_eq!(site_names(&lines), vec!["Königs Wusterhausen", "Potsdam"]);
}

#[test]
fn test_sites_category_filter() {
    let sites = TempInput::new("sites.csv", SITES_CSV);

    let lines = sites_test(&sites, &["--format=csv", "--no-headers", "--category=Waste"])
        .stdout_lines();
    assert_eq!(site_names(&lines), vec!["Zossen", "Königs Wusterhausen"]);

    let lines = sites_test(
        &sites,
        &[
            "--format=csv",
            "--no-headers",
            "--radius=100",
            "--category=Chemicals,Power",
        ],
    )
    .stdout_lines();
    assert_eq!(
        site_names(&lines),
        vec!["Königs Wusterhausen", "Potsdam", "Berlin Mitte", "Cottbus"]
    );
}

#[test]
fn test_sites_json_output() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    let lines = sites_test(&sites, &["--format=json", "--limit=1", "--show-inputs"]).stdout_lines();
    assert_eq!(lines.len(), 1);

    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["name"], "Luckenwalde");
    assert!(value["category"].is_null());
    assert_eq!(value["origin_latitude"], 52.0);
    assert!((value["distance"].as_f64().unwrap() - 18.649).abs() < 1e-3);
}

#[test]
fn test_sites_text_table() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    let output = sites_test(&sites, &[]).get_output();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();

    assert!(text.contains("Origin:      52.000000°, 13.400000°"));
    assert!(text.contains("Radius:      50.0 km"));
    assert!(text.contains("Königs Wusterhausen"));
    assert!(text.contains("no entry"));
    assert!(text.contains("18.65 km"));
    assert!(!text.contains("Cottbus"));

    // every table line has the same number of columns
    let table: Vec<&str> = text.lines().filter(|l| l.starts_with('│')).collect();
    assert_eq!(table.len(), 5);
    let bars: Vec<usize> = table.iter().map(|l| l.matches('│').count()).collect();
    assert!(bars.iter().all(|&b| b == 5));
}

#[test]
fn test_sites_empty_selection() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    sites_test(&sites, &["--radius=1"]).assert_success_contains("No sites within 1.0 km.");
}

#[test]
fn test_sites_empty_csv_keeps_header() {
    let sites = TempInput::new("sites.csv", SITES_CSV);
    let lines = sites_test(&sites, &["--format=csv", "--radius=1"]).stdout_lines();
    assert_eq!(lines, vec!["latitude,longitude,name,category,distance,angle"]);

    let lines = sites_test(&sites, &["--format=csv", "--no-headers", "--radius=1"]).stdout_lines();
    assert!(lines.is_empty());
}

#[test]
fn test_sites_whitespace_lines_use_rest_as_name() {
    let sites = TempInput::new("sites.txt", "52.09 13.17 Old Mill\n");
    sites_test(&sites, &["--format=csv", "--no-headers"])
        .assert_success_contains("52.09000,13.17000,Old Mill,no entry,18.649");
}

#[test]
fn test_sites_from_stdin() {
    SitedistTest::new()
        .args(["--format=csv", "--no-headers", "52.0", "13.4", "@-", "sites"])
        .stdin("52.2167,13.45,Zossen,Waste\n")
        .assert_success_contains("Zossen,Waste,24.344,0.33443");
}

#[test]
fn test_sites_bad_line_fails() {
    let sites = TempInput::new("sites.csv", "52.09,13.17,Luckenwalde\n52.1,13.2\n");
    sites_test(&sites, &[])
        .assert_failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "sites.csv:2: expected at least 3 fields (lat lon name), found 2",
        ));
}

#[test]
fn test_sites_empty_name_fails() {
    let sites = TempInput::new("sites.csv", "52.09,13.17, ,Waste\n");
    sites_test(&sites, &[]).assert_error_contains("sites.csv:1: site name must not be empty");
}
