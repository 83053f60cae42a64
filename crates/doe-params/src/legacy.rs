//! Fixed positional input layouts.
//!
//! Each legacy file is read by replaying an ordered list of [`Step`]s over a
//! whitespace-token cursor. Skipping a line advances past the next newline
//! from the current position, so a skip issued straight after a value only
//! consumes the rest of that value's line. Values may span line breaks.

use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::records::{GeometryRecord, MeshCounts, MeshElementRecord, MeshSpacingRecord, ZoneSpacing};
use crate::{ParamsError, ParamsResult};

/// One instruction of a positional layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Skip this many lines.
    Skip(usize),
    /// Read the next token as the named field.
    Read(&'static str),
}

use Step::{Read, Skip};

pub const GEOMETRY_LAYOUT: &[Step] = &[
    Skip(2),
    Read("plate_length"),
    Read("plate_height"),
    Read("plate_width"),
    Skip(4),
    Read("small_channel_height"),
    Read("large_channel_height"),
    Skip(4),
    Read("inlet_length"),
    Read("outlet_length"),
];

pub const MESH_ELEMENT_LAYOUT: &[Step] = &[
    Skip(1),
    Read("extrude_cells"),
    Read("inlet_x"),
    Read("outlet_x"),
    Skip(2),
    Read("large_inlet_y"),
    Read("small_inlet_y"),
    Read("plate_inlet_y"),
    Skip(2),
    Read("large_outlet_y"),
    Read("small_outlet_y"),
    Read("plate_outlet_y"),
    Skip(2),
    Read("small_channel_x"),
    Read("small_channel_y"),
    Skip(2),
    Read("large_channel_x"),
    Read("large_channel_y"),
];

pub const MESH_SPACING_LAYOUT: &[Step] = &[
    Skip(1),
    Read("inlet_spacing_x"),
    Read("inlet_spacing_y"),
    Skip(2),
    Read("outlet_spacing_x"),
    Read("outlet_spacing_y"),
    Skip(2),
    Read("small_channel_spacing_x"),
    Read("small_channel_spacing_y"),
    Skip(2),
    Read("large_channel_spacing_x"),
    Read("large_channel_spacing_y"),
];

struct TokenCursor<'a> {
    text: &'a str,
    origin: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(text: &'a str, origin: &'a str) -> Self {
        Self {
            text,
            origin,
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: String) -> ParamsError {
        ParamsError::Parse {
            origin: self.origin.to_string(),
            line: self.line,
            message,
        }
    }

    fn skip_line(&mut self) -> ParamsResult<()> {
        if self.pos >= self.text.len() {
            return Err(self.error("unexpected end of input while skipping a line".to_string()));
        }
        match self.text[self.pos..].find('\n') {
            Some(offset) => {
                self.pos += offset + 1;
                self.line += 1;
            }
            None => self.pos = self.text.len(),
        }
        Ok(())
    }

    fn next_token(&mut self, field: &str) -> ParamsResult<&'a str> {
        let text = self.text;
        let rest = &text[self.pos..];
        let mut start = None;
        for (i, ch) in rest.char_indices() {
            if !ch.is_whitespace() {
                start = Some(i);
                break;
            }
            if ch == '\n' {
                self.line += 1;
            }
        }
        let Some(start) = start else {
            self.pos = text.len();
            return Err(self.error(format!("unexpected end of input while reading {field}")));
        };
        let token_rest = &rest[start..];
        let end = token_rest
            .find(char::is_whitespace)
            .unwrap_or(token_rest.len());
        self.pos += start + end;
        Ok(&token_rest[..end])
    }
}

/// Values of one layout, in read order, keyed by field name.
struct Scanned<T> {
    origin: String,
    values: Vec<(&'static str, T, usize)>,
}

impl<T: Copy> Scanned<T> {
    fn get(&self, field: &'static str) -> ParamsResult<T> {
        self.values
            .iter()
            .find(|(name, _, _)| *name == field)
            .map(|(_, v, _)| *v)
            .ok_or_else(|| ParamsError::InvalidValue {
                key: field.to_string(),
                reason: "field is not part of the layout".to_string(),
            })
    }
}

fn scan<T>(text: &str, layout: &[Step], origin: &str) -> ParamsResult<Scanned<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let mut cursor = TokenCursor::new(text, origin);
    let mut values = Vec::new();
    for step in layout {
        match *step {
            Skip(lines) => {
                for _ in 0..lines {
                    cursor.skip_line()?;
                }
            }
            Read(field) => {
                let token = cursor.next_token(field)?;
                let value = token.parse::<T>().map_err(|e| {
                    cursor.error(format!("invalid value '{token}' for {field}: {e}"))
                })?;
                values.push((field, value, cursor.line));
            }
        }
    }
    debug!(%origin, fields = values.len(), "scanned positional layout");
    Ok(Scanned {
        origin: origin.to_string(),
        values,
    })
}

fn scan_reals(text: &str, layout: &[Step], origin: &str) -> ParamsResult<Scanned<f64>> {
    let scanned = scan::<f64>(text, layout, origin)?;
    if let Some((field, value, line)) = scanned.values.iter().find(|(_, v, _)| !v.is_finite()) {
        return Err(ParamsError::Parse {
            origin: scanned.origin.clone(),
            line: *line,
            message: format!("non-finite value {value} for {field}"),
        });
    }
    Ok(scanned)
}

pub fn geometry_from_str(text: &str, origin: &str) -> ParamsResult<GeometryRecord> {
    let v = scan_reals(text, GEOMETRY_LAYOUT, origin)?;
    GeometryRecord {
        plate_length: v.get("plate_length")?,
        plate_height: v.get("plate_height")?,
        plate_width: v.get("plate_width")?,
        small_channel_height: v.get("small_channel_height")?,
        large_channel_height: v.get("large_channel_height")?,
        inlet_length: v.get("inlet_length")?,
        outlet_length: v.get("outlet_length")?,
    }
    .validated()
}

pub fn mesh_elements_from_str(text: &str, origin: &str) -> ParamsResult<MeshElementRecord> {
    let v = scan::<u32>(text, MESH_ELEMENT_LAYOUT, origin)?;
    let counts = MeshCounts {
        extrude_cells: v.get("extrude_cells")?,
        inlet_x: v.get("inlet_x")?,
        large_inlet_y: v.get("large_inlet_y")?,
        small_inlet_y: v.get("small_inlet_y")?,
        plate_inlet_y: v.get("plate_inlet_y")?,
        outlet_x: v.get("outlet_x")?,
        large_outlet_y: v.get("large_outlet_y")?,
        small_outlet_y: v.get("small_outlet_y")?,
        plate_outlet_y: v.get("plate_outlet_y")?,
        small_channel_x: v.get("small_channel_x")?,
        small_channel_y: v.get("small_channel_y")?,
        large_channel_x: v.get("large_channel_x")?,
        large_channel_y: v.get("large_channel_y")?,
    };
    Ok(MeshElementRecord::new(counts))
}

pub fn mesh_spacing_from_str(text: &str, origin: &str) -> ParamsResult<MeshSpacingRecord> {
    let v = scan_reals(text, MESH_SPACING_LAYOUT, origin)?;
    MeshSpacingRecord {
        inlet: ZoneSpacing {
            x: v.get("inlet_spacing_x")?,
            y: v.get("inlet_spacing_y")?,
        },
        outlet: ZoneSpacing {
            x: v.get("outlet_spacing_x")?,
            y: v.get("outlet_spacing_y")?,
        },
        small_channel: ZoneSpacing {
            x: v.get("small_channel_spacing_x")?,
            y: v.get("small_channel_spacing_y")?,
        },
        large_channel: ZoneSpacing {
            x: v.get("large_channel_spacing_x")?,
            y: v.get("large_channel_spacing_y")?,
        },
    }
    .validated()
}

pub fn read_geometry(path: &Path) -> ParamsResult<GeometryRecord> {
    geometry_from_str(&crate::read_input(path)?, &path.display().to_string())
}

pub fn read_mesh_elements(path: &Path) -> ParamsResult<MeshElementRecord> {
    mesh_elements_from_str(&crate::read_input(path)?, &path.display().to_string())
}

pub fn read_mesh_spacing(path: &Path) -> ParamsResult<MeshSpacingRecord> {
    mesh_spacing_from_str(&crate::read_input(path)?, &path.display().to_string())
}

/// Holds the last successfully read record of each legacy layout.
///
/// A failed read clears the matching slot, so a stale record is never
/// mistaken for the result of the failed read.
#[derive(Debug, Default)]
pub struct LegacyGeometryReader {
    geometry: Option<GeometryRecord>,
    mesh_elements: Option<MeshElementRecord>,
    mesh_spacing: Option<MeshSpacingRecord>,
}

impl LegacyGeometryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_geometry_data(&mut self, path: &Path) -> ParamsResult<&GeometryRecord> {
        self.geometry = None;
        let record = read_geometry(path)?;
        Ok(self.geometry.insert(record))
    }

    pub fn read_mesh_element_data(&mut self, path: &Path) -> ParamsResult<&mut MeshElementRecord> {
        self.mesh_elements = None;
        let record = read_mesh_elements(path)?;
        Ok(self.mesh_elements.insert(record))
    }

    pub fn read_mesh_spacing_data(&mut self, path: &Path) -> ParamsResult<&MeshSpacingRecord> {
        self.mesh_spacing = None;
        let record = read_mesh_spacing(path)?;
        Ok(self.mesh_spacing.insert(record))
    }

    pub fn geometry(&self) -> Option<&GeometryRecord> {
        self.geometry.as_ref()
    }

    pub fn mesh_elements(&self) -> Option<&MeshElementRecord> {
        self.mesh_elements.as_ref()
    }

    pub fn mesh_spacing(&self) -> Option<&MeshSpacingRecord> {
        self.mesh_spacing.as_ref()
    }
}
