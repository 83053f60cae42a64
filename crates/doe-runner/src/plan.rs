//! Design-of-experiments plans: several mesh cases run back to back.

use std::time::Instant;

use doe_core::ChannelPair;
use doe_params::{MeshElementRecord, MeshSpacingRecord, ParamsError};
use tracing::info;

use crate::error::{RunError, RunResult};
use crate::host::ExperimentHost;
use crate::runner::ExperimentRunner;

/// One mesh configuration to run.
#[derive(Clone, Debug)]
pub struct CaseSpec {
    pub name: String,
    pub mesh: MeshElementRecord,
    pub spacing: MeshSpacingRecord,
}

/// Cases sharing one iteration budget.
#[derive(Clone, Debug, Default)]
pub struct DoePlan {
    pub iterations: u32,
    pub cases: Vec<CaseSpec>,
}

impl DoePlan {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations,
            cases: Vec::new(),
        }
    }

    pub fn push_case(
        &mut self,
        name: impl Into<String>,
        mesh: MeshElementRecord,
        spacing: MeshSpacingRecord,
    ) {
        self.cases.push(CaseSpec {
            name: name.into(),
            mesh,
            spacing,
        });
    }

    pub fn with_case(
        mut self,
        name: impl Into<String>,
        mesh: MeshElementRecord,
        spacing: MeshSpacingRecord,
    ) -> Self {
        self.push_case(name, mesh, spacing);
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Pressure results of one completed case.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseOutcome {
    pub name: String,
    pub mesh_density: f64,
    pub max_pressures: ChannelPair,
    pub min_pressures: ChannelPair,
    pub pressure_drops: ChannelPair,
}

impl CaseOutcome {
    /// Collect the results a completed run left in `record`.
    pub fn from_record(name: &str, record: &MeshElementRecord) -> RunResult<Self> {
        let pressure_drops = record.pressure_drops()?;
        let (Some(max_pressures), Some(min_pressures)) =
            (record.max_pressures(), record.min_pressures())
        else {
            return Err(RunError::Params(ParamsError::UninitializedResult {
                what: "case finished without pressure extrema",
            }));
        };
        Ok(Self {
            name: name.to_string(),
            mesh_density: record.mesh_density(),
            max_pressures,
            min_pressures,
            pressure_drops,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStage {
    RunningCase,
    CaseCompleted,
    Finished,
}

impl PlanStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::RunningCase => "running",
            Self::CaseCompleted => "case done",
            Self::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanProgressEvent {
    pub case_index: usize,
    pub case_count: usize,
    pub case_name: Option<String>,
    pub stage: PlanStage,
    pub elapsed_wall_s: f64,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(PlanProgressEvent)>,
    case_index: usize,
    case_count: usize,
    case_name: Option<&str>,
    stage: PlanStage,
    started: Instant,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(PlanProgressEvent {
            case_index,
            case_count,
            case_name: case_name.map(str::to_string),
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
        });
    }
}

/// Run every case of `plan` in order.
pub fn run_plan<H: ExperimentHost>(
    runner: &mut ExperimentRunner<H>,
    plan: &mut DoePlan,
) -> RunResult<Vec<CaseOutcome>> {
    run_plan_with_progress(runner, plan, None)
}

/// Run every case of `plan` in order and stream progress events.
///
/// The first failing case stops the plan; its error is returned and later
/// cases are not started. Records of completed cases keep their results.
pub fn run_plan_with_progress<H: ExperimentHost>(
    runner: &mut ExperimentRunner<H>,
    plan: &mut DoePlan,
    mut progress_cb: Option<&mut dyn FnMut(PlanProgressEvent)>,
) -> RunResult<Vec<CaseOutcome>> {
    let started = Instant::now();
    let case_count = plan.cases.len();
    let iterations = plan.iterations;
    let mut outcomes = Vec::with_capacity(case_count);

    for (idx, case) in plan.cases.iter_mut().enumerate() {
        emit_progress(
            &mut progress_cb,
            idx,
            case_count,
            Some(case.name.as_str()),
            PlanStage::RunningCase,
            started,
        );

        runner.run_case(&mut case.mesh, &case.spacing, iterations)?;
        let outcome = CaseOutcome::from_record(&case.name, &case.mesh)?;
        info!(
            case = %case.name,
            drop_large = outcome.pressure_drops.large,
            drop_small = outcome.pressure_drops.small,
            "case completed"
        );
        outcomes.push(outcome);

        emit_progress(
            &mut progress_cb,
            idx,
            case_count,
            Some(case.name.as_str()),
            PlanStage::CaseCompleted,
            started,
        );
    }

    emit_progress(
        &mut progress_cb,
        case_count,
        case_count,
        None,
        PlanStage::Finished,
        started,
    );
    Ok(outcomes)
}
