//! CLI and basic command tests

mod common;

use common::{generate_json, json_output, spcgen, write_file};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SPC"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("spcgen"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spcgen"));
}

// ============================================================================
// Generate Command Tests
// ============================================================================

#[test]
fn test_generate_json_count_and_fields() {
    let tmp = TempDir::new().unwrap();
    let records = generate_json(&tmp, 25, 1);
    assert_eq!(records.len(), 25);

    for (i, record) in records.iter().enumerate() {
        let obj = record.as_object().unwrap();
        for key in [
            "fab",
            "generation",
            "product",
            "processEqp",
            "metEqp",
            "lotId",
            "waferId",
            "processTime",
            "target",
            "lcl",
            "ucl",
            "lsl",
            "usl",
            "point",
            "comment",
        ] {
            assert!(obj.contains_key(key), "missing {} in {}", key, record);
        }
        assert_eq!(obj["lotId"], format!("LOT-250601-{:04}", i));
    }
}

#[test]
fn test_generate_zero_records() {
    let tmp = TempDir::new().unwrap();
    assert!(generate_json(&tmp, 0, 1).is_empty());
}

#[test]
fn test_generate_seed_is_reproducible() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(generate_json(&tmp, 40, 99), generate_json(&tmp, 40, 99));
    assert_ne!(generate_json(&tmp, 40, 99), generate_json(&tmp, 40, 100));
}

#[test]
fn test_generate_classification_matches_limits() {
    let tmp = TempDir::new().unwrap();
    for record in generate_json(&tmp, 500, 7) {
        let num = |k: &str| record[k].as_f64().unwrap();
        let point = num("point");
        let oos = point < num("lsl") || point > num("usl");
        let ooc = point < num("lcl") || point > num("ucl");
        let expected = if oos {
            "OOS Detected"
        } else if ooc {
            "OOC Detected"
        } else {
            ""
        };
        assert_eq!(record["comment"], expected, "{}", record);
        assert!(num("lsl") < num("lcl") && num("lcl") < num("target"));
        assert!(num("target") < num("ucl") && num("ucl") < num("usl"));
    }
}

#[test]
fn test_generate_negative_count_fails() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .args(["generate", "--count", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn test_generate_count_only() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .args(["generate", "-n", "10", "--seed", "4", "--count-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total\t10"))
        .stdout(predicate::str::contains("OOC\t"));
}

#[test]
fn test_generate_csv_header() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .args(["generate", "-n", "3", "--seed", "4", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "fab,generation,product,processEqp,metEqp,lotId,waferId,processTime",
        ));
}

#[test]
fn test_generate_table_output() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .args(["generate", "-n", "5", "--seed", "4", "--lot-date", "2025-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LOT-250601-0004"))
        .stdout(predicate::str::contains("5 record(s) generated"));
}

#[test]
fn test_generate_excursions_only() {
    let tmp = TempDir::new().unwrap();
    let records = json_output(spcgen(&tmp).args([
        "generate",
        "-n",
        "400",
        "--seed",
        "12",
        "--excursions",
        "-f",
        "json",
    ]));
    let records = records.as_array().unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r["comment"] != ""));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_explicit_config_overrides_enumerations() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(
        &tmp,
        "custom.yaml",
        "dataset:\n  facilities: [fabX]\n  products: [P9]\n",
    );

    let records = json_output(spcgen(&tmp).args([
        "generate", "-n", "30", "--seed", "2", "-f", "json", "--config", path.as_str(),
    ]));
    for record in records.as_array().unwrap() {
        assert_eq!(record["fab"], "fabX");
        assert_eq!(record["product"], "P9");
    }
}

#[test]
fn test_local_config_sets_default_format_and_count() {
    let tmp = TempDir::new().unwrap();
    write_file(
        &tmp,
        ".spcgen.yaml",
        "output:\n  format: json\n  default_count: 6\n",
    );

    let records = json_output(spcgen(&tmp).args(["generate", "--seed", "2"]));
    assert_eq!(records.as_array().unwrap().len(), 6);
}

#[test]
fn test_missing_explicit_config_fails() {
    let tmp = TempDir::new().unwrap();
    spcgen(&tmp)
        .args(["generate", "--config", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn test_invalid_dataset_config_fails() {
    let tmp = TempDir::new().unwrap();
    let path = write_file(&tmp, "bad.yaml", "dataset:\n  variation_range: [-1.0, 2.0]\n");
    spcgen(&tmp)
        .args(["generate", "--config", path.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("variation_range"));
}

// ============================================================================
// Group Command Tests
// ============================================================================

#[test]
fn test_group_generated_counts_sum_to_total() {
    let tmp = TempDir::new().unwrap();
    let nested = json_output(spcgen(&tmp).args([
        "group", "--by", "fab,product", "-n", "200", "--seed", "3", "-f", "json",
    ]));

    let mut total = 0;
    for (fab, products) in nested.as_object().unwrap() {
        assert!(fab == "fab1" || fab == "fab2");
        for count in products.as_object().unwrap().values() {
            total += count.as_u64().unwrap();
        }
    }
    assert_eq!(total, 200);
}

#[test]
fn test_group_input_list() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(&tmp, "items.json", r#"[{"fab":"a"},{"fab":"b"},{"fab":"a"}]"#);

    let nested = json_output(spcgen(&tmp).args([
        "group", "--by", "fab", "--input", input.as_str(), "--reduce", "list", "-f", "json",
    ]));
    assert_eq!(
        nested,
        json!({"a": [{"fab": "a"}, {"fab": "a"}], "b": [{"fab": "b"}]})
    );
}

#[test]
fn test_group_input_count() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(&tmp, "items.json", r#"[{"fab":"a"},{"fab":"b"},{"fab":"a"}]"#);

    let nested = json_output(spcgen(&tmp).args([
        "group", "--by", "fab", "--input", input.as_str(), "-f", "json",
    ]));
    assert_eq!(nested, json!({"a": 2, "b": 1}));
}

#[test]
fn test_group_missing_key_rejected() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(&tmp, "items.json", r#"[{"fab":"a"},{"tool":"x"}]"#);

    spcgen(&tmp)
        .args(["group", "--by", "fab", "--input", input.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing group key 'fab'"));
}

#[test]
fn test_group_nested_missing_key_points_at_input_row() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        &tmp,
        "items.json",
        r#"[{"fab":"a","product":"p"},{"fab":"b","product":"q"},{"fab":"a"}]"#,
    );

    spcgen(&tmp)
        .args(["group", "--by", "fab,product", "--input", input.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Missing group key 'product' for element at index 2",
        ));
}

#[test]
fn test_group_count_conflicts_with_input() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(&tmp, "items.json", r#"[{"fab":"a"}]"#);

    spcgen(&tmp)
        .args(["group", "--by", "fab", "-n", "5", "--input", input.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_group_missing_key_bucket() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(&tmp, "items.json", r#"[{"fab":"a"},{"tool":"x"}]"#);

    let nested = json_output(spcgen(&tmp).args([
        "group",
        "--by",
        "fab",
        "--input",
        input.as_str(),
        "--missing",
        "bucket",
        "--bucket-name",
        "none",
        "-f",
        "json",
    ]));
    assert_eq!(nested, json!({"a": 1, "none": 1}));
}

#[test]
fn test_group_input_must_be_array() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(&tmp, "items.json", r#"{"fab":"a"}"#);

    spcgen(&tmp)
        .args(["group", "--by", "fab", "--input", input.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON array"));
}

#[test]
fn test_group_summary_reducer() {
    let tmp = TempDir::new().unwrap();
    let nested = json_output(spcgen(&tmp).args([
        "group", "--by", "comment", "-n", "300", "--seed", "5", "--reduce", "summary", "-f",
        "json",
    ]));

    let groups = nested.as_object().unwrap();
    let in_control = &groups[""];
    assert_eq!(in_control["out_of_control"], 0);
    assert_eq!(in_control["out_of_spec"], 0);
    let total: u64 = groups.values().map(|g| g["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 300);
}

#[test]
fn test_group_summary_from_generated_file() {
    let tmp = TempDir::new().unwrap();
    let records = generate_json(&tmp, 50, 8);
    let input = write_file(&tmp, "records.json", &Value::Array(records).to_string());

    let nested = json_output(spcgen(&tmp).args([
        "group", "--by", "fab", "--input", input.as_str(), "--reduce", "summary", "-f", "json",
    ]));
    let total: u64 = nested
        .as_object()
        .unwrap()
        .values()
        .map(|g| g["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 50);
}

#[test]
fn test_group_tree_output() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        &tmp,
        "items.json",
        r#"[{"fab":"a","product":"p1"},{"fab":"a","product":"p2"},{"fab":"b","product":"p1"}]"#,
    );

    spcgen(&tmp)
        .args(["group", "--by", "fab", "--by", "product", "--input", input.as_str(), "-f", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fab=a"))
        .stdout(predicate::str::contains("  product=p2  1"));
}

#[test]
fn test_group_csv_rows() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(
        &tmp,
        "items.json",
        r#"[{"fab":"a","product":"p1"},{"fab":"a","product":"p1"},{"fab":"b","product":"p2"}]"#,
    );

    spcgen(&tmp)
        .args(["group", "--by", "fab,product", "--input", input.as_str(), "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fab,product,value"))
        .stdout(predicate::str::contains("a,p1,2"))
        .stdout(predicate::str::contains("b,p2,1"));
}
