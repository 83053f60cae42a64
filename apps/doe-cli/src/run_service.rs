//! Runs a set of mesh cases, serving stored cases from the results cache.

use std::path::{Path, PathBuf};

use doe_params::{InputFormat, ParameterStore, load_mesh_elements, load_mesh_spacing};
use doe_results::{CaseRecord, CaseStore, compute_case_id};
use doe_runner::{
    CaseOutcome, DoePlan, ExperimentRunner, PlanProgressEvent, ScriptedHost,
    run_plan_with_progress,
};
use tracing::info;

use crate::error::CliResult;

pub struct RunRequest<'a> {
    pub mesh_paths: &'a [PathBuf],
    pub spacing_path: &'a Path,
    pub host_script: &'a Path,
    pub iterations: u32,
    pub format: InputFormat,
    pub results_dir: Option<&'a Path>,
    pub use_cache: bool,
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub outcome: CaseOutcome,
    /// Set when a results directory was given.
    pub case_id: Option<String>,
    pub loaded_from_cache: bool,
}

enum Slot {
    Cached(CaseResult),
    Pending { case_id: Option<String> },
}

fn case_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run every mesh in `request` against the scripted host, in order.
///
/// With a results directory, each case gets a content id; cases already
/// stored under that id are loaded instead of run (unless caching is off)
/// and freshly run cases are saved.
pub fn ensure_cases_with_progress(
    request: &RunRequest<'_>,
    progress_cb: Option<&mut dyn FnMut(PlanProgressEvent)>,
) -> CliResult<Vec<CaseResult>> {
    let spacing = load_mesh_spacing(request.spacing_path, request.format)?;

    let script = ParameterStore::from_file(request.host_script)?;
    let host_tag = format!("scripted\n{}", script.to_text());
    let mut runner = ExperimentRunner::new(ScriptedHost::from_store(&script)?)?;

    let store = request.results_dir.map(CaseStore::new).transpose()?;

    let mut plan = DoePlan::new(request.iterations);
    let mut slots = Vec::with_capacity(request.mesh_paths.len());
    for path in request.mesh_paths {
        let mesh = load_mesh_elements(path, request.format)?;
        let name = case_name(path);
        let case_id = store
            .as_ref()
            .map(|_| compute_case_id(mesh.counts(), &spacing, request.iterations, &host_tag));

        if let (true, Some(store), Some(id)) = (request.use_cache, &store, &case_id) {
            if store.has_case(id) {
                let record = store.load_case(id)?;
                info!(case = %name, case_id = %id, "loaded case from cache");
                let mut outcome = record.to_outcome();
                outcome.name = name;
                slots.push(Slot::Cached(CaseResult {
                    outcome,
                    case_id: Some(id.clone()),
                    loaded_from_cache: true,
                }));
                continue;
            }
        }

        plan.push_case(name, mesh, spacing);
        slots.push(Slot::Pending { case_id });
    }

    let outcomes = run_plan_with_progress(&mut runner, &mut plan, progress_cb)?;

    let mut fresh = outcomes.into_iter().zip(plan.cases.iter());
    let mut results = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Cached(result) => results.push(result),
            Slot::Pending { case_id } => {
                let Some((outcome, case)) = fresh.next() else {
                    break;
                };
                if let (Some(store), Some(id)) = (&store, &case_id) {
                    let record = CaseRecord::from_outcome(
                        id.clone(),
                        &outcome,
                        *case.mesh.counts(),
                        case.spacing,
                        request.iterations,
                    );
                    store.save_case(&record)?;
                }
                results.push(CaseResult {
                    outcome,
                    case_id,
                    loaded_from_cache: false,
                });
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const MESH: &str = "\
extrude_cells:integer:1
inlet_x:integer:2
large_inlet_y:integer:3
small_inlet_y:integer:1
plate_inlet_y:integer:1
outlet_x:integer:0
large_outlet_y:integer:0
small_outlet_y:integer:0
plate_outlet_y:integer:0
small_channel_x:integer:4
small_channel_y:integer:2
large_channel_x:integer:0
large_channel_y:integer:0
";

    const SPACING: &str = "\
inlet_spacing_x:float:0.001
inlet_spacing_y:float:0.001
outlet_spacing_x:float:0.001
outlet_spacing_y:float:0.001
small_channel_spacing_x:float:0.0005
small_channel_spacing_y:float:0.0005
large_channel_spacing_x:float:0.0005
large_channel_spacing_y:float:0.0005
";

    const HOST: &str = "\
monitor.MaxPressure_LargeCh:float:100
monitor.MinPressure_LargeCh:float:40
monitor.MaxPressure_SmallCh:float:80
monitor.MinPressure_SmallCh:float:30
";

    #[test]
    fn second_run_is_served_from_cache() {
        let dir = unique_temp_dir("doe_cli_cache");
        let mesh = dir.join("coarse.txt");
        let spacing = dir.join("spacing.txt");
        let host = dir.join("host.txt");
        fs::write(&mesh, MESH).unwrap();
        fs::write(&spacing, SPACING).unwrap();
        fs::write(&host, HOST).unwrap();
        let results = dir.join("results");

        let meshes = [mesh];
        let request = RunRequest {
            mesh_paths: &meshes,
            spacing_path: &spacing,
            host_script: &host,
            iterations: 20,
            format: InputFormat::Typed,
            results_dir: Some(results.as_path()),
            use_cache: true,
        };

        let first = ensure_cases_with_progress(&request, None).unwrap();
        assert_eq!(first.len(), 1);
        assert!(!first[0].loaded_from_cache);
        assert_eq!(first[0].outcome.name, "coarse");
        assert_eq!(first[0].outcome.pressure_drops.to_array(), [60.0, 50.0]);

        let second = ensure_cases_with_progress(&request, None).unwrap();
        assert!(second[0].loaded_from_cache);
        assert_eq!(second[0].case_id, first[0].case_id);
        assert_eq!(second[0].outcome, first[0].outcome);

        let uncached = RunRequest {
            use_cache: false,
            ..request
        };
        let third = ensure_cases_with_progress(&uncached, None).unwrap();
        assert!(!third[0].loaded_from_cache);
    }

    #[test]
    fn without_results_dir_nothing_is_stored() {
        let dir = unique_temp_dir("doe_cli_nostore");
        let mesh = dir.join("m.txt");
        let spacing = dir.join("s.txt");
        let host = dir.join("h.txt");
        fs::write(&mesh, MESH).unwrap();
        fs::write(&spacing, SPACING).unwrap();
        fs::write(&host, HOST).unwrap();

        let meshes = [mesh.clone(), mesh];
        let request = RunRequest {
            mesh_paths: &meshes,
            spacing_path: &spacing,
            host_script: &host,
            iterations: 1,
            format: InputFormat::Typed,
            results_dir: None,
            use_cache: true,
        };
        let results = ensure_cases_with_progress(&request, None).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.case_id.is_none()));
    }
}
