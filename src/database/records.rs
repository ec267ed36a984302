//! Tabular database records.
//!
//! One row per view with columns `Filename`, `X [mm]`, `Y [mm]`,
//! `Heading [degrees]` and, for grids, `Grid X` / `Grid Y`. Fields may carry
//! leading whitespace. Positions are converted to map units by dividing by 10
//! (truncating), headings are quantized to the domain step.

use crate::database::{Grid, Route, StoredView};
use crate::heading::HeadingDomain;
use crate::trace::{trace_event, trace_span};
use crate::util::{HomingError, HomingResult, Missing};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

const MM_PER_MAP_UNIT: f64 = 10.0;

#[derive(Debug, Deserialize)]
struct DatabaseRow {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "X [mm]")]
    x_mm: f64,
    #[serde(rename = "Y [mm]")]
    y_mm: f64,
    #[serde(rename = "Heading [degrees]", default)]
    heading_deg: Option<f64>,
    #[serde(rename = "Grid X", default)]
    grid_x: Option<i32>,
    #[serde(rename = "Grid Y", default)]
    grid_y: Option<i32>,
}

/// Whether a missing heading column is an error.
#[derive(Clone, Copy)]
enum HeadingPolicy {
    Required,
    Optional,
}

fn read_views<R: Read>(
    reader: R,
    source_name: &str,
    domain: &HeadingDomain,
    policy: HeadingPolicy,
) -> HomingResult<Vec<StoredView>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|err| data_error(source_name, &err))?
        .clone();

    let mut views = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|err| data_error(source_name, &err))?;
        let line = record.position().map(|pos| pos.line());
        let row: DatabaseRow = record
            .deserialize(Some(&headers))
            .map_err(|err| data_error(source_name, &err))?;
        let bad = |reason: String| HomingError::Data {
            source_name: source_name.to_owned(),
            line,
            reason,
        };

        if row.filename.is_empty() {
            return Err(bad("empty Filename".to_owned()));
        }
        if !row.x_mm.is_finite() || !row.y_mm.is_finite() {
            return Err(bad(format!("non-finite position for `{}`", row.filename)));
        }
        let heading = match (row.heading_deg, policy) {
            (Some(h), _) if h.is_finite() => domain.quantize(h),
            (Some(_), _) => {
                return Err(bad(format!("non-finite heading for `{}`", row.filename)))
            }
            (None, HeadingPolicy::Required) => {
                return Err(bad(format!("missing Heading for `{}`", row.filename)))
            }
            (None, HeadingPolicy::Optional) => 0,
        };
        let grid_index = match (row.grid_x, row.grid_y) {
            (Some(gx), Some(gy)) => Some((gx, gy)),
            (None, None) => None,
            _ => {
                return Err(bad(format!(
                    "`{}` has only one of Grid X / Grid Y",
                    row.filename
                )))
            }
        };

        views.push(StoredView {
            filename: row.filename,
            x: (row.x_mm / MM_PER_MAP_UNIT).trunc() as i32,
            y: (row.y_mm / MM_PER_MAP_UNIT).trunc() as i32,
            heading,
            grid_index,
        });
    }
    Ok(views)
}

fn data_error(source_name: &str, err: &csv::Error) -> HomingError {
    HomingError::Data {
        source_name: source_name.to_owned(),
        line: err.position().map(|pos| pos.line()),
        reason: err.to_string(),
    }
}

fn open(path: &Path) -> HomingResult<std::fs::File> {
    std::fs::File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => {
            HomingError::NotFound(Missing::File(path.display().to_string()))
        }
        _ => HomingError::Data {
            source_name: path.display().to_string(),
            line: None,
            reason: err.to_string(),
        },
    })
}

/// Reads a route database from CSV text.
pub fn load_route_from_reader<R: Read>(
    reader: R,
    source_name: &str,
    domain: HeadingDomain,
) -> HomingResult<Route> {
    let views = read_views(reader, source_name, &domain, HeadingPolicy::Required)?;
    Ok(Route::new(domain, views))
}

/// Reads a route database file, preserving row order as traversal order.
pub fn load_route<P: AsRef<Path>>(path: P, domain: HeadingDomain) -> HomingResult<Route> {
    let path = path.as_ref();
    let _span = trace_span!("load_database", kind = "route").entered();
    let route = load_route_from_reader(open(path)?, &path.display().to_string(), domain)?;
    trace_event!("route_loaded", views = route.len());
    Ok(route)
}

/// Reads a grid database from CSV text.
pub fn load_grid_from_reader<R: Read>(
    reader: R,
    source_name: &str,
    domain: HeadingDomain,
) -> HomingResult<Grid> {
    let views = read_views(reader, source_name, &domain, HeadingPolicy::Optional)?;
    Grid::new(views)
}

/// Reads a grid database file.
pub fn load_grid<P: AsRef<Path>>(path: P, domain: HeadingDomain) -> HomingResult<Grid> {
    let path = path.as_ref();
    let _span = trace_span!("load_database", kind = "grid").entered();
    let grid = load_grid_from_reader(open(path)?, &path.display().to_string(), domain)?;
    trace_event!("grid_loaded", views = grid.len());
    Ok(grid)
}
