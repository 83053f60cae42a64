//! Case storage API.
//!
//! Each case lives in `<root>/<case_id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::CaseRecord;
use crate::{ResultsError, ResultsResult};

const CSV_HEADER: [&str; 9] = [
    "case_id",
    "case_name",
    "mesh_density",
    "max_large",
    "max_small",
    "min_large",
    "min_small",
    "drop_large",
    "drop_small",
];

#[derive(Clone, Debug)]
pub struct CaseStore {
    root_dir: PathBuf,
}

impl CaseStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> ResultsResult<Self> {
        let root_dir = root_dir.into();
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn case_path(&self, case_id: &str) -> PathBuf {
        self.root_dir.join(format!("{case_id}.json"))
    }

    pub fn has_case(&self, case_id: &str) -> bool {
        self.case_path(case_id).exists()
    }

    pub fn save_case(&self, record: &CaseRecord) -> ResultsResult<()> {
        let path = self.case_path(&record.case_id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        debug!(case_id = %record.case_id, path = %path.display(), "saved case");
        Ok(())
    }

    pub fn load_case(&self, case_id: &str) -> ResultsResult<CaseRecord> {
        let path = self.case_path(case_id);

        if !path.exists() {
            return Err(ResultsError::CaseNotFound {
                case_id: case_id.to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let record = serde_json::from_str(&content)?;
        Ok(record)
    }

    /// All readable cases, sorted by name then id.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn list_cases(&self) -> ResultsResult<Vec<CaseRecord>> {
        let mut cases = Vec::new();

        if !self.root_dir.exists() {
            return Ok(cases);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(case_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load_case(case_id) {
                Ok(record) => cases.push(record),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable case"),
            }
        }

        cases.sort_by(|a, b| {
            a.case_name
                .cmp(&b.case_name)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        Ok(cases)
    }

    pub fn delete_case(&self, case_id: &str) -> ResultsResult<()> {
        let path = self.case_path(case_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Write one summary row per stored case to `path`. Returns the row count.
    pub fn export_csv(&self, path: &Path) -> ResultsResult<usize> {
        let cases = self.list_cases()?;
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(CSV_HEADER)?;
        for case in &cases {
            wtr.write_record([
                case.case_id.clone(),
                case.case_name.clone(),
                case.mesh_density.to_string(),
                case.max_pressures.large.to_string(),
                case.max_pressures.small.to_string(),
                case.min_pressures.large.to_string(),
                case.min_pressures.small.to_string(),
                case.pressure_drops.large.to_string(),
                case.pressure_drops.small.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(cases.len())
    }
}
