use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const GOOGLE_PAYLOAD: &str = r#"{
  "localizedObjectAnnotations": [
    {
      "name": "Dog",
      "score": 0.85,
      "boundingPoly": {"normalizedVertices": [
        {"x": 0.5, "y": 0.5}, {"x": 0.9, "y": 0.5}, {"x": 0.9, "y": 0.9}, {"x": 0.5, "y": 0.9}
      ]}
    },
    {
      "name": "Cat",
      "score": 0.92,
      "boundingPoly": {"normalizedVertices": [
        {"x": 0.1, "y": 0.2}, {"x": 0.6, "y": 0.2}, {"x": 0.6, "y": 0.8}, {"x": 0.1, "y": 0.8}
      ]}
    }
  ],
  "labelAnnotations": [
    {"description": "Whiskers", "score": 0.7}
  ],
  "safeSearchAnnotation": {"adult": 1, "spoof": 2, "medical": 1, "violence": 1, "racy": 5}
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// A command that never picks up the user's own config.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("annolens").unwrap();
        cmd.env("ANNOLENS_CONFIG", self.dir.path().join("absent.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("failed to run annolens");
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).expect("invalid json")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_features_lists_every_kind() {
    Fixture::new()
        .cmd()
        .arg("features")
        .assert()
        .success()
        .stdout(predicate::str::contains("OBJECT_LOCALIZATION"))
        .stdout(predicate::str::contains("LABEL_DETECTION"))
        .stdout(predicate::str::contains("IMAGE_PROPERTIES"))
        .stdout(predicate::str::contains("SAFE_SEARCH_DETECTION"))
        .stdout(predicate::str::contains("FACE_DETECTION"));
}

#[test]
fn test_schema_describes_result() {
    Fixture::new()
        .cmd()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"AnnotationResult\""));
}

#[test]
fn test_normalize_json_from_file() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    let json = stdout_json(fx.cmd().args([
        "normalize",
        path_arg(&input),
        "--features",
        "objects,labels,faces",
        "--json",
    ]));

    assert_eq!(json["objects"][0]["label"], "Dog");
    assert_eq!(json["objects"][1]["confidence"], 0.92);
    assert_eq!(json["objects"][1]["region"]["space"], "normalized");
    assert_eq!(json["labels"][0]["label"], "Whiskers");
    // Requested but absent
    assert_eq!(json["faces"], Value::Array(vec![]));
    // Present in the payload but not requested
    assert!(json.get("safeSearch").is_none());
    assert!(json.get("imageProperties").is_none());
}

#[test]
fn test_normalize_reads_stdin() {
    let fx = Fixture::new();
    let json = stdout_json(
        fx.cmd()
            .args(["normalize", "-", "--features", "LABEL_DETECTION", "--json"])
            .write_stdin(r#"{"labelDetectionResult": {"cat": 0.9, "animal": 0.8}}"#),
    );
    assert_eq!(json["labels"][0]["label"], "cat");
    assert_eq!(json["labels"][1]["label"], "animal");
    assert!(json.get("objects").is_none());
}

#[test]
fn test_normalize_human_output() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    fx.cmd()
        .args(["normalize", path_arg(&input)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Objects:"))
        .stdout(predicate::str::contains(
            "Image is classified as 'Cat' with 92% confidence.",
        ))
        .stdout(predicate::str::contains("No faces detected."))
        .stdout(predicate::str::contains("VERY LIKELY (100%)"))
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn test_normalize_raw_output() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    fx.cmd()
        .args(["normalize", path_arg(&input), "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("objects.1.label = Cat"))
        .stdout(predicate::str::contains("safe_search.racy = 5"))
        .stdout(predicate::str::contains("Objects:").not());
}

#[test]
fn test_unknown_feature_is_usage_error() {
    let fx = Fixture::new();
    let input = fx.write("response.json", "{}");
    fx.cmd()
        .args(["normalize", path_arg(&input), "--features", "labels,TEXT_DETECTION"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error: unknown feature: TEXT_DETECTION"))
        .stderr(predicate::str::contains("Known features:"));
}

#[test]
fn test_non_object_payload_is_malformed() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["normalize", "-"])
        .write_stdin("[1, 2, 3]")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "malformed payload: expected a JSON object, found array",
        ));
}

#[test]
fn test_invalid_json_is_malformed() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["normalize", "-"])
        .write_stdin("{\"labels\": [")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed payload"));
}

#[test]
fn test_missing_input_file() {
    let fx = Fixture::new();
    let missing = fx.dir.path().join("nope.json");
    fx.cmd()
        .args(["normalize", path_arg(&missing)])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_config_selects_default_features() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    let config = fx.write(
        "config.toml",
        "[normalize]\nfeatures = [\"SAFE_SEARCH_DETECTION\"]\n",
    );
    let json = stdout_json(fx.cmd().args([
        "--config",
        path_arg(&config),
        "normalize",
        path_arg(&input),
        "--json",
    ]));
    assert_eq!(json["safeSearch"]["racy"], "VERY_LIKELY");
    assert!(json.get("objects").is_none());
    assert!(json.get("labels").is_none());
}

#[test]
fn test_config_from_env_var() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    let config = fx.write("env.toml", "[normalize]\nfeatures = [\"LABEL_DETECTION\"]\n");
    let json = stdout_json(
        fx.cmd()
            .env("ANNOLENS_CONFIG", &config)
            .args(["normalize", path_arg(&input), "--json"]),
    );
    assert_eq!(json["labels"][0]["label"], "Whiskers");
    assert!(json.get("objects").is_none());
}

#[test]
fn test_broken_explicit_config_is_usage_error() {
    let fx = Fixture::new();
    let config = fx.write("broken.toml", "[output\n");
    fx.cmd()
        .args(["--config", path_arg(&config), "features"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn test_overlay_highlights_selection() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    fx.cmd()
        .args(["overlay", path_arg(&input), "--select", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "* object 0 Cat  left=10.00% top=20.00% width=50.00% height=60.00%",
        ))
        .stdout(predicate::str::contains("  object 1 Dog  left=50.00% top=50.00%"));
}

#[test]
fn test_overlay_rows_follow_config_order() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    let config = fx.write("unsorted.toml", "[output]\nsort_by_confidence = false\n");
    fx.cmd()
        .args(["--config", path_arg(&config), "overlay", path_arg(&input), "--select", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* object 0 Dog  left=50.00% top=50.00%"))
        .stdout(predicate::str::contains("  object 1 Cat  left=10.00% top=20.00%"));
}

#[test]
fn test_normalize_face_rows_match_overlay_rows() {
    let fx = Fixture::new();
    let input = fx.write(
        "faces.json",
        r#"{"faceAnnotations": [
            {"detectionConfidence": 0.4, "boundingPoly": {"normalizedVertices": [
                {"x": 0.0, "y": 0.0}, {"x": 0.2, "y": 0.0}, {"x": 0.2, "y": 0.2}, {"x": 0.0, "y": 0.2}
            ]}},
            {"detectionConfidence": 0.9, "boundingPoly": {"normalizedVertices": [
                {"x": 0.5, "y": 0.5}, {"x": 0.7, "y": 0.5}, {"x": 0.7, "y": 0.7}, {"x": 0.5, "y": 0.7}
            ]}}
        ]}"#,
    );
    fx.cmd()
        .args(["normalize", path_arg(&input), "--features", "faces"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Face 1  0.90"));
    fx.cmd()
        .args(["overlay", path_arg(&input), "--faces", "--select", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* face 0 Face 1  left=50.00% top=50.00%"));
}

#[test]
fn test_overlay_pixel_regions_need_dimensions() {
    let fx = Fixture::new();
    let input = fx.write(
        "pixel.json",
        r#"{"objectDetectionResult": {"objectDetections": [
            {"label": "box", "confidence": 0.5,
             "boundingBox": {"x": 100, "y": 200, "width": 50, "height": 100}}
        ]}}"#,
    );

    fx.cmd()
        .args(["overlay", path_arg(&input)])
        .assert()
        .success()
        .stdout(predicate::str::contains("object 0 box  (no renderable region)"));

    fx.cmd()
        .args(["overlay", path_arg(&input), "--width", "500", "--height", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "object 0 box  left=20.00% top=20.00% width=10.00% height=10.00%",
        ));
}

#[test]
fn test_overlay_json_drops_out_of_range_selection() {
    let fx = Fixture::new();
    let input = fx.write("response.json", GOOGLE_PAYLOAD);
    let json = stdout_json(fx.cmd().args([
        "overlay",
        path_arg(&input),
        "--select",
        "9",
        "--json",
    ]));
    assert_eq!(json["highlight"]["state"], "none");
    assert_eq!(json["order"], serde_json::json!([1, 0]));
    assert_eq!(json["overlays"].as_array().unwrap().len(), 2);
    assert!(
        json["overlays"]
            .as_array()
            .unwrap()
            .iter()
            .all(|b| b["highlighted"] == false)
    );
}

#[test]
fn test_overlay_faces() {
    let fx = Fixture::new();
    let input = fx.write(
        "faces.json",
        r#"{"faceAnnotations": [
            {"detectionConfidence": 0.98, "fdBoundingPoly": {"vertices": [
                {"x": 10, "y": 10}, {"x": 60, "y": 10}, {"x": 60, "y": 60}, {"x": 10, "y": 60}
            ]}}
        ]}"#,
    );
    let json = stdout_json(fx.cmd().args([
        "overlay",
        path_arg(&input),
        "--faces",
        "--width",
        "100",
        "--height",
        "100",
        "--select",
        "0",
        "--json",
    ]));
    assert_eq!(json["highlight"]["state"], "at");
    assert_eq!(json["highlight"]["index"], 0);
    assert_eq!(json["overlays"][0]["kind"], "face");
    let rect = &json["overlays"][0]["rect"];
    assert!((rect["leftPercent"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    assert!((rect["widthPercent"].as_f64().unwrap() - 50.0).abs() < 1e-9);
}
