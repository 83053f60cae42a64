use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use doe_core::ChannelPair;
use doe_params::{MeshCounts, MeshSpacingRecord};
use doe_results::*;
use doe_runner::CaseOutcome;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn record(name: &str, inlet_x: u32) -> CaseRecord {
    let mesh = MeshCounts {
        extrude_cells: 1,
        inlet_x,
        large_inlet_y: 1,
        ..MeshCounts::default()
    };
    let spacing = MeshSpacingRecord::default();
    let outcome = CaseOutcome {
        name: name.to_string(),
        mesh_density: mesh.mesh_density(),
        max_pressures: ChannelPair::new(100.0, 80.0),
        min_pressures: ChannelPair::new(40.0, 30.0),
        pressure_drops: ChannelPair::new(60.0, 50.0),
    };
    let id = compute_case_id(&mesh, &spacing, 10, "scripted");
    CaseRecord::from_outcome(id, &outcome, mesh, spacing, 10)
}

#[test]
fn save_and_load_case() {
    let dir = unique_temp_dir("doe_results_save");
    let store = CaseStore::new(&dir).unwrap();

    let case = record("coarse", 4);
    assert!(!store.has_case(&case.case_id));
    store.save_case(&case).unwrap();
    assert!(store.has_case(&case.case_id));

    let loaded = store.load_case(&case.case_id).unwrap();
    assert_eq!(loaded, case);
    assert_eq!(loaded.to_outcome().pressure_drops.to_array(), [60.0, 50.0]);

    store.delete_case(&case.case_id).unwrap();
    assert!(!store.has_case(&case.case_id));
    assert!(matches!(
        store.load_case(&case.case_id),
        Err(ResultsError::CaseNotFound { .. })
    ));
}

#[test]
fn list_cases_sorted_and_skips_junk() {
    let dir = unique_temp_dir("doe_results_list");
    let store = CaseStore::new(&dir).unwrap();

    store.save_case(&record("medium", 8)).unwrap();
    store.save_case(&record("coarse", 4)).unwrap();
    store.save_case(&record("fine", 16)).unwrap();
    fs::write(dir.join("broken.json"), "{ not json").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let names: Vec<String> = store
        .list_cases()
        .unwrap()
        .into_iter()
        .map(|c| c.case_name)
        .collect();
    assert_eq!(names, vec!["coarse", "fine", "medium"]);
}

#[test]
fn export_csv_writes_header_and_rows() {
    let dir = unique_temp_dir("doe_results_export");
    let store = CaseStore::new(&dir).unwrap();
    let case = record("plate, coarse", 4);
    store.save_case(&case).unwrap();

    let out = dir.join("summary.csv");
    let rows = store.export_csv(&out).unwrap();
    assert_eq!(rows, 1);

    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("case_id,case_name,mesh_density,max_large,max_small,min_large,min_small,drop_large,drop_small")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with(&case.case_id));
    assert!(row.contains("\"plate, coarse\""));
    assert!(row.ends_with(",4,100,80,40,30,60,50"));
    assert!(lines.next().is_none());
}
