//! Co-simulation partner settings.
//!
//! These values configure the structural partner job. This layer validates
//! and exposes them; launching the partner is up to the host's coupling
//! runtime.

use std::fmt;
use std::str::FromStr;

use doe_core::{ensure_finite, ensure_unit_fraction};

use crate::store::ParameterStore;
use crate::{ParamsError, ParamsResult};

/// How often loads and displacements are exchanged within a coupling step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CouplingScheme {
    /// Exchange once per coupling step.
    Explicit,
    /// Iterate exchanges within each coupling step.
    Implicit,
}

impl FromStr for CouplingScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("explicit") {
            Ok(Self::Explicit)
        } else if s.eq_ignore_ascii_case("implicit") {
            Ok(Self::Implicit)
        } else {
            Err(format!("expected implicit or explicit, found '{s}'"))
        }
    }
}

impl fmt::Display for CouplingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::Implicit => write!(f, "implicit"),
        }
    }
}

/// Which side leads the rendezvous at each coupling step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendezvousLeader {
    Fluid,
    Structure,
}

impl FromStr for RendezvousLeader {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("fluid") {
            Ok(Self::Fluid)
        } else if s.eq_ignore_ascii_case("structure") {
            Ok(Self::Structure)
        } else {
            Err(format!("expected fluid or structure, found '{s}'"))
        }
    }
}

impl fmt::Display for RendezvousLeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fluid => write!(f, "fluid"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CouplingSettings {
    pub job_name: String,
    pub input_file: String,
    pub executable: String,
    pub cpus: u32,
    pub scheme: CouplingScheme,
    pub leader: RendezvousLeader,
    pub coupling_time_step: f64,
    pub min_exchanges_per_step: u32,
    pub iterations_per_exchange: u32,
    pub deflection_relaxation: f64,
}

impl CouplingSettings {
    pub const PREFIX: &'static str = "cosim.";

    pub fn from_store(store: &ParameterStore) -> ParamsResult<Self> {
        let key = |name: &str| format!("{}{}", Self::PREFIX, name);

        let coupling_time_step = ensure_finite(
            store.get_float(&key("coupling_time_step"))?,
            "cosim.coupling_time_step",
        )?;
        if coupling_time_step <= 0.0 {
            return Err(invalid(
                &key("coupling_time_step"),
                format!("{coupling_time_step} must be positive"),
            ));
        }

        Ok(Self {
            job_name: store.get_string(&key("job_name"))?.to_string(),
            input_file: store.get_string(&key("input_file"))?.to_string(),
            executable: store.get_string(&key("executable"))?.to_string(),
            cpus: positive(store, &key("cpus"))?,
            scheme: parse_tag(store, &key("scheme"))?,
            leader: parse_tag(store, &key("leader"))?,
            coupling_time_step,
            min_exchanges_per_step: positive(store, &key("min_exchanges_per_step"))?,
            iterations_per_exchange: positive(store, &key("iterations_per_exchange"))?,
            deflection_relaxation: ensure_unit_fraction(
                store.get_float(&key("deflection_relaxation"))?,
                "cosim.deflection_relaxation",
            )?,
        })
    }
}

fn invalid(key: &str, reason: String) -> ParamsError {
    ParamsError::InvalidValue {
        key: key.to_string(),
        reason,
    }
}

fn positive(store: &ParameterStore, key: &str) -> ParamsResult<u32> {
    let raw = store.get_integer(key)?;
    match u32::try_from(raw) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(invalid(key, format!("{raw} must be a positive integer"))),
    }
}

fn parse_tag<T>(store: &ParameterStore, key: &str) -> ParamsResult<T>
where
    T: FromStr<Err = String>,
{
    store
        .get_string(key)?
        .parse()
        .map_err(|reason| invalid(key, reason))
}
