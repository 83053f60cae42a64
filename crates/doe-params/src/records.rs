//! Geometry and mesh parameter records.

use doe_core::{ChannelPair, ensure_finite};
use serde::{Deserialize, Serialize};

use crate::store::ParameterStore;
use crate::{ParamsError, ParamsResult};

/// Plate, channel and plenum dimensions.
///
/// Lengths are taken as given; the caller owns the unit convention.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub plate_length: f64,
    pub plate_height: f64,
    pub plate_width: f64,
    pub small_channel_height: f64,
    pub large_channel_height: f64,
    pub inlet_length: f64,
    pub outlet_length: f64,
}

impl GeometryRecord {
    /// Check every dimension is finite.
    pub fn validated(self) -> ParamsResult<Self> {
        ensure_finite(self.plate_length, "plate_length")?;
        ensure_finite(self.plate_height, "plate_height")?;
        ensure_finite(self.plate_width, "plate_width")?;
        ensure_finite(self.small_channel_height, "small_channel_height")?;
        ensure_finite(self.large_channel_height, "large_channel_height")?;
        ensure_finite(self.inlet_length, "inlet_length")?;
        ensure_finite(self.outlet_length, "outlet_length")?;
        Ok(self)
    }

    pub fn from_store(store: &ParameterStore) -> ParamsResult<Self> {
        Self {
            plate_length: store.get_float("plate_length")?,
            plate_height: store.get_float("plate_height")?,
            plate_width: store.get_float("plate_width")?,
            small_channel_height: store.get_float("small_channel_height")?,
            large_channel_height: store.get_float("large_channel_height")?,
            inlet_length: store.get_float("inlet_length")?,
            outlet_length: store.get_float("outlet_length")?,
        }
        .validated()
    }
}

/// Mesh division counts per logical zone.
///
/// Each count is the number of cells along one axis of one zone; the
/// extrusion count applies to every zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshCounts {
    pub extrude_cells: u32,
    pub inlet_x: u32,
    pub large_inlet_y: u32,
    pub small_inlet_y: u32,
    pub plate_inlet_y: u32,
    pub outlet_x: u32,
    pub large_outlet_y: u32,
    pub small_outlet_y: u32,
    pub plate_outlet_y: u32,
    pub small_channel_x: u32,
    pub small_channel_y: u32,
    pub large_channel_x: u32,
    pub large_channel_y: u32,
}

impl MeshCounts {
    /// Cell-count proxy: the five cross-sections summed, times the extrusion.
    pub fn mesh_density(&self) -> f64 {
        let n = |v: u32| u128::from(v);
        let inlet = (n(self.large_inlet_y) + n(self.small_inlet_y) + n(self.plate_inlet_y))
            * n(self.inlet_x);
        let outlet = (n(self.large_outlet_y) + n(self.small_outlet_y) + n(self.plate_outlet_y))
            * n(self.outlet_x);
        let small = n(self.small_channel_x) * n(self.small_channel_y);
        let large = n(self.large_channel_x) * n(self.large_channel_y);
        ((inlet + outlet + small + large) * n(self.extrude_cells)) as f64
    }

    pub fn from_store(store: &ParameterStore) -> ParamsResult<Self> {
        Ok(Self {
            extrude_cells: count(store, "extrude_cells")?,
            inlet_x: count(store, "inlet_x")?,
            large_inlet_y: count(store, "large_inlet_y")?,
            small_inlet_y: count(store, "small_inlet_y")?,
            plate_inlet_y: count(store, "plate_inlet_y")?,
            outlet_x: count(store, "outlet_x")?,
            large_outlet_y: count(store, "large_outlet_y")?,
            small_outlet_y: count(store, "small_outlet_y")?,
            plate_outlet_y: count(store, "plate_outlet_y")?,
            small_channel_x: count(store, "small_channel_x")?,
            small_channel_y: count(store, "small_channel_y")?,
            large_channel_x: count(store, "large_channel_x")?,
            large_channel_y: count(store, "large_channel_y")?,
        })
    }
}

fn count(store: &ParameterStore, key: &str) -> ParamsResult<u32> {
    let raw = store.get_integer(key)?;
    u32::try_from(raw).map_err(|_| ParamsError::InvalidValue {
        key: key.to_string(),
        reason: format!("{raw} is not a valid cell count"),
    })
}

/// Mesh counts plus the pressure extrema of the run that used them.
///
/// The counts and the derived mesh density are fixed at construction. The
/// pressure slots start empty and are filled once a run completes.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshElementRecord {
    counts: MeshCounts,
    mesh_density: f64,
    max_pressures: Option<ChannelPair>,
    min_pressures: Option<ChannelPair>,
}

impl MeshElementRecord {
    pub fn new(counts: MeshCounts) -> Self {
        Self {
            mesh_density: counts.mesh_density(),
            counts,
            max_pressures: None,
            min_pressures: None,
        }
    }

    pub fn from_store(store: &ParameterStore) -> ParamsResult<Self> {
        MeshCounts::from_store(store).map(Self::new)
    }

    pub fn counts(&self) -> &MeshCounts {
        &self.counts
    }

    pub fn mesh_density(&self) -> f64 {
        self.mesh_density
    }

    pub fn set_max_pressures(&mut self, large: f64, small: f64) {
        self.max_pressures = Some(ChannelPair::new(large, small));
    }

    pub fn set_min_pressures(&mut self, large: f64, small: f64) {
        self.min_pressures = Some(ChannelPair::new(large, small));
    }

    pub fn max_pressures(&self) -> Option<ChannelPair> {
        self.max_pressures
    }

    pub fn min_pressures(&self) -> Option<ChannelPair> {
        self.min_pressures
    }

    /// Forget any recorded extrema.
    pub fn clear_pressures(&mut self) {
        self.max_pressures = None;
        self.min_pressures = None;
    }

    /// Max minus min pressure per channel class.
    pub fn pressure_drops(&self) -> ParamsResult<ChannelPair> {
        match (self.max_pressures, self.min_pressures) {
            (Some(max), Some(min)) => Ok(max.minus(min)),
            _ => Err(ParamsError::UninitializedResult {
                what: "pressure drops requested before max and min pressures were recorded",
            }),
        }
    }
}

impl From<MeshCounts> for MeshElementRecord {
    fn from(counts: MeshCounts) -> Self {
        Self::new(counts)
    }
}

/// First-cell spacing along both axes of one zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpacing {
    pub x: f64,
    pub y: f64,
}

/// Graded-mesh spacing controls, paired with the counts in [`MeshCounts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSpacingRecord {
    pub inlet: ZoneSpacing,
    pub outlet: ZoneSpacing,
    pub small_channel: ZoneSpacing,
    pub large_channel: ZoneSpacing,
}

impl MeshSpacingRecord {
    pub fn validated(self) -> ParamsResult<Self> {
        ensure_finite(self.inlet.x, "inlet_spacing_x")?;
        ensure_finite(self.inlet.y, "inlet_spacing_y")?;
        ensure_finite(self.outlet.x, "outlet_spacing_x")?;
        ensure_finite(self.outlet.y, "outlet_spacing_y")?;
        ensure_finite(self.small_channel.x, "small_channel_spacing_x")?;
        ensure_finite(self.small_channel.y, "small_channel_spacing_y")?;
        ensure_finite(self.large_channel.x, "large_channel_spacing_x")?;
        ensure_finite(self.large_channel.y, "large_channel_spacing_y")?;
        Ok(self)
    }

    pub fn from_store(store: &ParameterStore) -> ParamsResult<Self> {
        let zone = |prefix: &str| -> ParamsResult<ZoneSpacing> {
            Ok(ZoneSpacing {
                x: store.get_float(&format!("{prefix}_spacing_x"))?,
                y: store.get_float(&format!("{prefix}_spacing_y"))?,
            })
        };
        Self {
            inlet: zone("inlet")?,
            outlet: zone("outlet")?,
            small_channel: zone("small_channel")?,
            large_channel: zone("large_channel")?,
        }
        .validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_counts() -> MeshCounts {
        MeshCounts {
            extrude_cells: 1,
            inlet_x: 2,
            large_inlet_y: 3,
            small_inlet_y: 1,
            plate_inlet_y: 1,
            outlet_x: 0,
            large_outlet_y: 0,
            small_outlet_y: 0,
            plate_outlet_y: 0,
            small_channel_x: 4,
            small_channel_y: 2,
            large_channel_x: 0,
            large_channel_y: 0,
        }
    }

    #[test]
    fn mesh_density_reference_case() {
        let record = MeshElementRecord::new(reference_counts());
        assert_eq!(record.mesh_density(), 18.0);
    }

    #[test]
    fn mesh_density_scales_with_extrusion() {
        let mut counts = reference_counts();
        counts.extrude_cells = 5;
        assert_eq!(counts.mesh_density(), 90.0);
        counts.extrude_cells = 0;
        assert_eq!(counts.mesh_density(), 0.0);
    }

    #[test]
    fn mesh_density_does_not_overflow() {
        let counts = MeshCounts {
            extrude_cells: u32::MAX,
            large_channel_x: u32::MAX,
            large_channel_y: u32::MAX,
            ..MeshCounts::default()
        };
        let expected = (u32::MAX as f64).powi(3);
        let got = counts.mesh_density();
        assert!((got - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn pressure_drops_require_both_extrema() {
        let mut record = MeshElementRecord::new(reference_counts());
        assert!(matches!(
            record.pressure_drops(),
            Err(ParamsError::UninitializedResult { .. })
        ));

        record.set_max_pressures(10.0, 6.0);
        assert!(record.pressure_drops().is_err());

        record.set_min_pressures(2.0, 1.0);
        assert_eq!(record.pressure_drops().unwrap().to_array(), [8.0, 5.0]);

        record.clear_pressures();
        assert!(record.pressure_drops().is_err());
    }

    #[test]
    fn counts_from_store_reject_negative() {
        let store = ParameterStore::parse_str(
            "extrude_cells:integer:-1\ninlet_x:integer:2\n",
            "counts",
        )
        .unwrap();
        let err = MeshCounts::from_store(&store).unwrap_err();
        assert!(matches!(err, ParamsError::InvalidValue { ref key, .. } if key == "extrude_cells"));
    }

    #[test]
    fn geometry_rejects_non_finite() {
        let store = ParameterStore::parse_str(
            "plate_length:float:NaN\nplate_height:float:3\nplate_width:float:1\n\
             small_channel_height:float:0.5\nlarge_channel_height:float:0.8\n\
             inlet_length:float:2\noutlet_length:float:3.5\n",
            "geo",
        )
        .unwrap();
        assert!(matches!(
            GeometryRecord::from_store(&store),
            Err(ParamsError::Core(_))
        ));
    }

    #[test]
    fn spacing_from_store() {
        let store = ParameterStore::parse_str(
            "inlet_spacing_x:float:0.1\ninlet_spacing_y:float:0.2\n\
             outlet_spacing_x:float:0.3\noutlet_spacing_y:float:0.4\n\
             small_channel_spacing_x:float:0.5\nsmall_channel_spacing_y:float:0.6\n\
             large_channel_spacing_x:float:0.7\nlarge_channel_spacing_y:float:0.8\n",
            "spacing",
        )
        .unwrap();
        let spacing = MeshSpacingRecord::from_store(&store).unwrap();
        assert_eq!(spacing.outlet, ZoneSpacing { x: 0.3, y: 0.4 });
        assert_eq!(spacing.large_channel.y, 0.8);
    }
}
