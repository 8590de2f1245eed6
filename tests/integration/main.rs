//! Integration tests for tsograph
//!
//! These tests drive the binary end to end on small graph files.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn tsograph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsograph"))
        .args(args)
        .output()
        .expect("Failed to execute tsograph")
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Node carrying every attribute, the way upstream exporters write them.
fn node(id: &str, class: &str, system: Option<&str>) -> Value {
    json!({
        "id": id,
        "class": class,
        "type": null,
        "name": null,
        "description": null,
        "system": system.map(|name| json!([name, null])),
        "position": [null, null, null],
        "rds": null,
        "additional_data": null
    })
}

/// A heating run joined to a ventilation run, plus one stray valve.
fn mixed_graph() -> Value {
    json!({
        "nodes": [
            node("H1", "IfcValve", Some("VL_Heizung")),
            node("P1", "IfcPipeSegment", Some("VL_Heizung")),
            node("P2", "IfcPipeSegment", None),
            node("H2", "IfcValve", Some("VL_Heizung")),
            node("V1", "IfcAirTerminal", Some("ZUL_Lueftung")),
            node("S", "IfcValve", Some("Sprinkler")),
        ],
        "links": [
            {"source": "H1", "target": "P1"},
            {"source": "P1", "target": "P2"},
            {"source": "P2", "target": "H2"}
        ]
    })
}

fn systems<'a>(document: &'a Value, rank: &str) -> &'a Vec<Value> {
    document["hierarchy"][rank].as_array().unwrap()
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = tsograph(&["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Enrich building-services component graphs"));
}

#[test]
fn test_enrich_writes_hierarchy() {
    let dir = TempDir::new().unwrap();
    let mut graph = mixed_graph();
    graph["links"]
        .as_array_mut()
        .unwrap()
        .push(json!({"source": "H2", "target": "V1"}));
    let input = write_json(dir.path(), "graph.json", &graph);

    let output = tsograph(&["enrich", input.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_json(&dir.path().join("ENRICHED_graph.json"));
    assert_eq!(systems(&document, "integrated").len(), 1);
    let classes: Vec<&str> = systems(&document, "functional")
        .iter()
        .map(|s| s["classification"].as_str().unwrap())
        .collect();
    assert_eq!(classes, vec!["Ventilation System", "Heating System"]);
    assert_eq!(document["nodes"].as_array().unwrap().len(), 6);
    assert!(document.get("reduced").is_none());

    let stray = document["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "S")
        .unwrap();
    assert_eq!(stray["systems"]["functional"], json!([]));
}

#[test]
fn test_enrich_prunes_reduces_and_adds_edges() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "graph.json", &mixed_graph());
    let edges = write_json(
        dir.path(),
        "edges.json",
        &json!({"links": [{"source": "H2", "target": "V1"}, {"source": "V1", "target": "ghost"}]}),
    );
    let out = dir.path().join("out.json");

    let output = tsograph(&[
        "enrich",
        input.to_str().unwrap(),
        "--add-edges",
        edges.to_str().unwrap(),
        "-r",
        "1",
        "--reduce",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_json(&out);
    // the stray valve is pruned, V1 is kept because of the added edge
    let ids: Vec<&str> = document["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["H1", "P1", "P2", "H2", "V1"]);

    let reduced = &document["reduced"];
    assert_eq!(reduced["nodes"].as_array().unwrap().len(), 3);
    let spliced = reduced["links"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["source"] == "H1")
        .unwrap();
    assert_eq!(spliced["target"], "H2");
    assert_eq!(spliced["aggregated_nodes"], json!(["P1", "P2"]));
}

#[test]
fn test_enrich_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "graph.json", &mixed_graph());
    let config = dir.path().join("tsograph.toml");
    std::fs::write(&config, "prune_threshold = 1\n").unwrap();
    let out = dir.path().join("out.json");

    let output = tsograph(&[
        "enrich",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_json(&out);
    assert_eq!(document["nodes"].as_array().unwrap().len(), 4);
    assert!(systems(&document, "integrated").is_empty());
    assert_eq!(systems(&document, "functional").len(), 1);
}

#[test]
fn test_enrich_merges_input_files() {
    let dir = TempDir::new().unwrap();
    let first = write_json(
        dir.path(),
        "a.json",
        &json!({"nodes": [node("A", "IfcValve", Some("RL_Heizung"))], "links": []}),
    );
    let second = write_json(
        dir.path(),
        "b.json",
        &json!({
            "nodes": [node("B", "IfcValve", Some("RL_Heizung"))],
            "links": [{"source": "A", "target": "B"}]
        }),
    );
    let out = dir.path().join("out.json");

    let output = tsograph(&[
        "enrich",
        first.to_str().unwrap(),
        second.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_json(&out);
    let technical = systems(&document, "technical");
    assert_eq!(technical.len(), 1);
    assert_eq!(technical[0]["classification"], "Return System");
    assert_eq!(technical[0]["components"], json!(["A", "B"]));
}

#[test]
fn test_enrich_rejects_dangling_link() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        dir.path(),
        "graph.json",
        &json!({"nodes": [node("A", "IfcValve", None)], "links": [{"source": "A", "target": "B"}]}),
    );

    let output = tsograph(&["enrich", input.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown component B"));
}

#[test]
fn test_enrich_rejects_node_with_missing_attribute() {
    let dir = TempDir::new().unwrap();
    let input = write_json(
        dir.path(),
        "graph.json",
        &json!({"nodes": [{"id": "A", "class": "IfcValve"}], "links": []}),
    );

    let output = tsograph(&["enrich", input.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing field"));
}

#[test]
fn test_enrich_keeps_unnamed_source_systems() {
    let dir = TempDir::new().unwrap();
    let mut unnamed = node("U", "IfcValve", None);
    unnamed["system"] = json!([null, "NOTDEFINED"]);
    unnamed["position"] = json!(["1.0", "2.0", "3.0"]);
    let input = write_json(
        dir.path(),
        "graph.json",
        &json!({
            "nodes": [node("A", "IfcValve", Some("RL_Heizung")), unnamed],
            "links": [{"source": "A", "target": "U"}]
        }),
    );
    let out = dir.path().join("out.json");

    let output = tsograph(&["enrich", input.to_str().unwrap(), "-o", out.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let document = read_json(&out);
    let written = &document["nodes"][1];
    assert_eq!(written["system"], json!([null, "NOTDEFINED"]));
    assert_eq!(written["position"], json!(["1.0", "2.0", "3.0"]));
    assert_eq!(systems(&document, "technical")[0]["components"], json!(["A"]));
    assert_eq!(written["systems"]["technical"], json!([]));
}

#[test]
fn test_info_prints_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "graph.json", &mixed_graph());

    let output = tsograph(&["info", input.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("6 components, 3 flows, 3 regions"));
    assert!(stdout.contains("[VL_Heizung] 3 components"));

    let output = tsograph(&["info", "--json", input.to_str().unwrap()]);
    let info: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["classes"]["IfcPipeSegment"]["total"], 2);
}
