use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

fn write_plan(dir: &Path) -> PathBuf {
    let path = dir.join("plan.png");
    image::RgbImage::from_pixel(400, 300, image::Rgb([250, 250, 245]))
        .save(&path)
        .expect("fixture plan should be written");
    path
}

fn write_script(dir: &Path, steps: Value) -> PathBuf {
    let path = dir.join("script.json");
    fs::write(&path, json!({ "steps": steps }).to_string()).expect("script should be written");
    path
}

fn click(x: f64, y: f64) -> Value {
    json!({ "op": "click", "x": x, "y": y })
}

/// Calibrate 100 px = 10 m, then trace a gravel area, a subtractive
/// gravel area and a fence, followed by one commit with nothing pending.
fn takeoff_steps() -> Value {
    json!([
        { "op": "zoom", "zoom": 1.0 },
        { "op": "mode", "mode": "scale" },
        click(0.0, 0.0),
        click(100.0, 0.0),
        { "op": "calibrate", "length": 10.0 },
        { "op": "mode", "mode": "area" },
        { "op": "item", "label": "Gravel" },
        click(0.0, 0.0),
        click(100.0, 0.0),
        click(100.0, 100.0),
        click(0.0, 100.0),
        { "op": "commit" },
        { "op": "item", "label": "Gravel", "subtraction": true },
        click(10.0, 10.0),
        click(60.0, 10.0),
        click(60.0, 60.0),
        click(10.0, 60.0),
        { "op": "commit" },
        { "op": "mode", "mode": "distance" },
        { "op": "item", "label": "Fence" },
        click(0.0, 200.0),
        click(300.0, 200.0),
        { "op": "commit" },
        { "op": "commit" }
    ])
}

/// `replay` with the platform data directory redirected into `data_home`
fn replay_cmd(data_home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("takeoff-cli");
    cmd.env("XDG_DATA_HOME", data_home).arg("replay");
    cmd
}

fn replay_json(plan: &Path, script: &Path) -> Value {
    let data_home = plan.parent().unwrap_or(plan);
    let output = replay_cmd(data_home)
        .arg(plan)
        .arg(script)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

#[test]
fn info_emits_stable_json_contract() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());

    let output = cargo_bin_cmd!("takeoff-cli")
        .arg("info")
        .arg(&plan)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let mut value: Value =
        serde_json::from_slice(&output).expect("stdout should contain valid json");
    value["path"] = Value::String("<FIXTURE>".to_owned());

    insta::assert_json_snapshot!(value, @r###"
    {
      "format": "png",
      "height": 300,
      "path": "<FIXTURE>",
      "width": 400
    }
    "###);
}

#[test]
fn info_fails_for_missing_file() {
    cargo_bin_cmd!("takeoff-cli")
        .arg("info")
        .arg("/nonexistent/plan.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn info_refuses_vector_plans() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let pdf = temp.path().join("plan.pdf");
    fs::write(&pdf, b"%PDF-1.4\n").expect("pdf should be written");

    cargo_bin_cmd!("takeoff-cli")
        .arg("info")
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be rasterized first"));
}

#[test]
fn replay_reports_net_quantities() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let script = write_script(temp.path(), takeoff_steps());

    let value = replay_json(&plan, &script);

    assert_eq!(value["image"], json!({ "width": 400, "height": 300 }));
    assert_eq!(value["mode"], "distance");
    assert_eq!(value["calibration"]["unit"], "m");
    assert_eq!(value["shape_count"], 3);
    assert_eq!(value["pending_points"], 0);
    assert_eq!(value["copy_sources"], json!([1]));

    let values: Vec<&str> = value["rows"]
        .as_array()
        .expect("rows should be present once calibrated")
        .iter()
        .map(|row| row["formatted_value"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(values, vec!["100.00", "▲ 25.00", "30.00"]);
    assert_eq!(value["rows"][1]["is_subtraction"], true);

    assert_eq!(
        value["totals"],
        json!([
            { "label": "Gravel", "unit": "m²", "total": "75.00" },
            { "label": "Fence", "unit": "m", "total": "30.00" }
        ])
    );

    assert_eq!(value["rejected"][0]["step"], 24);
    assert_eq!(value["rejected"][0]["op"], "commit");
    assert_eq!(value["rejected"][0]["error"], "Distance needs at least 2 points, 0 pending");
}

#[test]
fn replay_without_calibration_has_no_quantities() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let script = write_script(
        temp.path(),
        json!([
            { "op": "mode", "mode": "distance" },
            click(0.0, 0.0),
            click(50.0, 0.0),
            { "op": "commit" }
        ]),
    );

    let value = replay_json(&plan, &script);

    assert_eq!(value["shape_count"], 1);
    assert_eq!(value["calibration"], Value::Null);
    assert_eq!(value["rows"], Value::Null);
    assert_eq!(value["totals"], Value::Null);
}

#[test]
fn replay_writes_overlay_and_csv() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let script = write_script(temp.path(), takeoff_steps());
    let overlay = temp.path().join("out").join("overlay.png");
    let csv = temp.path().join("out").join("takeoff.csv");

    replay_cmd(temp.path())
        .arg(&plan)
        .arg(&script)
        .arg("--overlay")
        .arg(&overlay)
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success();

    let image = image::open(&overlay).expect("overlay should be readable image");
    assert_eq!((image.width(), image.height()), (400, 300));

    let bytes = fs::read(&csv).expect("csv should be written");
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).expect("csv should be utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "No,Item,Value,Unit,Subtraction,Link,Remarks");
    assert_eq!(lines[2], "2,Gravel,▲ 25.00,m²,Yes,,");
    assert_eq!(lines.len(), 4);
}

#[test]
fn csv_export_needs_calibration() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let script = write_script(temp.path(), json!([]));

    replay_cmd(temp.path())
        .arg(&plan)
        .arg(&script)
        .arg("--csv")
        .arg(temp.path().join("takeoff.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scale calibration has been set"));
}

#[test]
fn strict_replay_stops_at_rejected_step() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let script = write_script(temp.path(), takeoff_steps());

    replay_cmd(temp.path())
        .arg(&plan)
        .arg(&script)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("step 24 (commit) was rejected"));
}

#[test]
fn custom_items_are_saved_to_prefs_dir() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let prefs_dir = temp.path().join("prefs");
    let script = write_script(temp.path(), json!([{ "op": "add_item", "name": "Planter" }]));

    replay_cmd(temp.path())
        .arg(&plan)
        .arg(&script)
        .arg("--prefs-dir")
        .arg(&prefs_dir)
        .assert()
        .success();

    let saved = fs::read_to_string(prefs_dir.join("preferences.json"))
        .expect("preferences should be saved");
    assert!(saved.contains("\"Planter\""));
}

#[cfg(target_os = "linux")]
#[test]
fn custom_items_default_to_platform_data_dir() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let plan = write_plan(temp.path());
    let script = write_script(temp.path(), json!([{ "op": "add_item", "name": "Planter" }]));

    replay_cmd(temp.path()).arg(&plan).arg(&script).assert().success();

    let saved = fs::read_to_string(temp.path().join("takeoff").join("preferences.json"))
        .expect("preferences should be saved under the data directory");
    assert!(saved.contains("\"Planter\""));
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("takeoff-cli")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
