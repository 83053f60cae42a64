mod error;
mod run_service;

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use doe_core::ChannelClass;
use doe_params::{
    CouplingSettings, InputFormat, LegacyGeometryReader, ParamType, ParamValue, ParameterStore,
};
use doe_results::CaseStore;
use doe_runner::PlanProgressEvent;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};
use crate::run_service::{RunRequest, ensure_cases_with_progress};

#[derive(Parser)]
#[command(name = "doe-cli")]
#[command(about = "Channel-flow DOE tool - parameter files, mesh studies and stored cases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every parameter in a typed parameter file
    Params {
        /// Path to the parameter file
        file: PathBuf,
    },
    /// Look up one parameter by key and type
    Get {
        /// Path to the parameter file
        file: PathBuf,
        /// Parameter key
        key: String,
        /// Declared type: float, integer or string
        #[arg(long, default_value = "float")]
        kind: ParamType,
    },
    /// Read a fixed-layout legacy input file
    Legacy {
        /// Which layout the file uses
        kind: LegacyKind,
        /// Path to the legacy file
        file: PathBuf,
    },
    /// Validate and show co-simulation settings
    Coupling {
        /// Path to the parameter file holding the cosim.* keys
        file: PathBuf,
    },
    /// Run mesh cases against a scripted host
    Run {
        /// Mesh element files, one case each
        #[arg(long, required = true, num_args = 1..)]
        mesh: Vec<PathBuf>,
        /// Mesh spacing file shared by every case
        #[arg(long)]
        spacing: PathBuf,
        /// Solver iterations per case
        #[arg(long)]
        iterations: u32,
        /// Parameter file with monitor.<Name> values for the scripted host
        #[arg(long)]
        host_script: PathBuf,
        /// Format of the mesh and spacing files
        #[arg(long, default_value = "legacy")]
        format: InputFormat,
        /// Directory where completed cases are stored
        #[arg(long)]
        results: Option<PathBuf>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List stored cases
    Cases {
        /// Results directory
        dir: PathBuf,
    },
    /// Export stored cases as a CSV summary
    Export {
        /// Results directory
        dir: PathBuf,
        /// Output CSV file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LegacyKind {
    Geometry,
    Mesh,
    Spacing,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Params { file } => cmd_params(&file),
        Commands::Get { file, key, kind } => cmd_get(&file, &key, kind),
        Commands::Legacy { kind, file } => cmd_legacy(kind, &file),
        Commands::Coupling { file } => cmd_coupling(&file),
        Commands::Run {
            mesh,
            spacing,
            iterations,
            host_script,
            format,
            results,
            no_cache,
        } => cmd_run(&RunRequest {
            mesh_paths: &mesh,
            spacing_path: &spacing,
            host_script: &host_script,
            iterations,
            format,
            results_dir: results.as_deref(),
            use_cache: !no_cache,
        }),
        Commands::Cases { dir } => cmd_cases(&dir),
        Commands::Export { dir, output } => cmd_export(&dir, &output),
    }
}

fn cmd_params(file: &Path) -> CliResult<()> {
    let store = ParameterStore::from_file(file)?;

    if store.is_empty() {
        println!("No parameters in {}", file.display());
    } else {
        println!("Parameters in {}:", file.display());
        for (key, value) in store.entries() {
            println!("  {} ({}) = {}", key, value.kind(), value);
        }
    }
    Ok(())
}

fn cmd_get(file: &Path, key: &str, kind: ParamType) -> CliResult<()> {
    let store = ParameterStore::from_file(file)?;
    let value = match kind {
        ParamType::Float => ParamValue::Float(store.get_float(key)?),
        ParamType::Integer => ParamValue::Integer(store.get_integer(key)?),
        ParamType::String => ParamValue::String(store.get_string(key)?.to_string()),
    };
    println!("{}", value);
    Ok(())
}

fn cmd_legacy(kind: LegacyKind, file: &Path) -> CliResult<()> {
    let mut reader = LegacyGeometryReader::new();
    match kind {
        LegacyKind::Geometry => {
            let g = reader.read_geometry_data(file)?;
            println!("Geometry from {}:", file.display());
            println!("  Plate:          {} x {} x {}", g.plate_length, g.plate_height, g.plate_width);
            println!("  Small channel:  height {}", g.small_channel_height);
            println!("  Large channel:  height {}", g.large_channel_height);
            println!("  Inlet length:   {}", g.inlet_length);
            println!("  Outlet length:  {}", g.outlet_length);
        }
        LegacyKind::Mesh => {
            let mesh = reader.read_mesh_element_data(file)?;
            let c = mesh.counts();
            println!("Mesh elements from {}:", file.display());
            println!("  Extrusion cells: {}", c.extrude_cells);
            println!(
                "  Inlet:   x={}  y(large/small/plate)={}/{}/{}",
                c.inlet_x, c.large_inlet_y, c.small_inlet_y, c.plate_inlet_y
            );
            println!(
                "  Outlet:  x={}  y(large/small/plate)={}/{}/{}",
                c.outlet_x, c.large_outlet_y, c.small_outlet_y, c.plate_outlet_y
            );
            println!("  Small channel: {} x {}", c.small_channel_x, c.small_channel_y);
            println!("  Large channel: {} x {}", c.large_channel_x, c.large_channel_y);
            println!("  Mesh density:  {}", mesh.mesh_density());
        }
        LegacyKind::Spacing => {
            let s = reader.read_mesh_spacing_data(file)?;
            println!("Mesh spacing from {}:", file.display());
            for (zone, spacing) in [
                ("inlet", s.inlet),
                ("outlet", s.outlet),
                ("small channel", s.small_channel),
                ("large channel", s.large_channel),
            ] {
                println!("  {:<14} x={}  y={}", zone, spacing.x, spacing.y);
            }
        }
    }
    Ok(())
}

fn cmd_coupling(file: &Path) -> CliResult<()> {
    let store = ParameterStore::from_file(file)?;
    let settings = CouplingSettings::from_store(&store)?;

    println!("✓ Coupling settings are valid");
    println!("  Job:        {} ({})", settings.job_name, settings.input_file);
    println!("  Executable: {} on {} cpus", settings.executable, settings.cpus);
    println!("  Scheme:     {}, {} leads", settings.scheme, settings.leader);
    println!("  Step:       {} s", settings.coupling_time_step);
    println!(
        "  Exchanges:  >= {} per step, {} iterations each",
        settings.min_exchanges_per_step, settings.iterations_per_exchange
    );
    println!("  Deflection relaxation: {}", settings.deflection_relaxation);
    Ok(())
}

fn cmd_run(request: &RunRequest<'_>) -> CliResult<()> {
    println!(
        "Running {} case(s), {} iterations each",
        request.mesh_paths.len(),
        request.iterations
    );

    let mut last_emit = Instant::now();
    let mut last_stage = String::new();
    let results = ensure_cases_with_progress(
        request,
        Some(&mut |event| {
            let stage_key = format!("{:?}{}", event.stage, event.case_index);
            let emit_now = stage_key != last_stage || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    let mut header = format!("{:<20} {:>14}", "case", "mesh density");
    for class in ChannelClass::ALL {
        header.push_str(&format!(" {:>14}", format!("drop {}", class)));
    }
    println!("{}", header);
    for result in &results {
        let o = &result.outcome;
        let mut row = format!("{:<20} {:>14}", o.name, o.mesh_density);
        for class in ChannelClass::ALL {
            row.push_str(&format!(" {:>14.6}", o.pressure_drops.get(class)));
        }
        if result.loaded_from_cache {
            row.push_str("  (cached)");
        }
        println!("{}", row);
    }

    if let Some(dir) = request.results_dir {
        println!("✓ Cases stored in {}", dir.display());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PlanProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  case {}/{}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        (event.case_index + 1).min(event.case_count),
        event.case_count,
        event.elapsed_wall_s
    );
    if let Some(name) = &event.case_name {
        line.push_str(&format!("  {}", name));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn open_existing_store(dir: &Path) -> CliResult<CaseStore> {
    if !dir.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "results directory {} does not exist",
            dir.display()
        )));
    }
    Ok(CaseStore::new(dir)?)
}

fn cmd_cases(dir: &Path) -> CliResult<()> {
    let cases = open_existing_store(dir)?.list_cases()?;

    if cases.is_empty() {
        println!("No stored cases in {}", dir.display());
    } else {
        println!("Stored cases in {}:", dir.display());
        for case in cases {
            println!(
                "  {}  {}  density={}  drops={}  ({})",
                case.case_id.chars().take(12).collect::<String>(),
                case.case_name,
                case.mesh_density,
                case.pressure_drops,
                case.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_export(dir: &Path, output: &Path) -> CliResult<()> {
    let rows = open_existing_store(dir)?.export_csv(output)?;
    println!("✓ Exported {} cases to {}", rows, output.display());
    Ok(())
}
