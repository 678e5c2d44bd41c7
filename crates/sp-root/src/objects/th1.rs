//! TH1D / TH1F streamers.
//!
//! ```text
//! TH1D | TH1F            versioned
//!   TH1                  versioned
//!     TNamed             name, title
//!     TAttLine, TAttFill, TAttMarker
//!     fNcells            i32
//!     fXaxis, fYaxis, fZaxis   TAxis
//!     fBarOffset, fBarWidth    i16
//!     fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2   f64
//!     fMaximum, fMinimum (v >= 2), fNormFactor (v >= 3)
//!     fContour, fSumw2   TArrayD
//!     fOption            TString
//!     fFunctions         TList
//!     fBufferSize, fBuffer (v >= 4), fBinStatErrOpt (v >= 7), fStatOverflows (v >= 8)
//!   TArrayD | TArrayF    fNcells contents, under/overflow included
//! ```

use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::rbuffer::RBuffer;

/// Element type of the trailing content array.
#[derive(Debug, Clone, Copy)]
pub enum Storage {
    Double,
    Float,
}

struct Axis {
    n_bins: usize,
    x_min: f64,
    x_max: f64,
    edges: Vec<f64>,
}

struct Th1Base {
    name: String,
    title: String,
    n_cells: usize,
    axis: Axis,
    entries: f64,
    sumw2: Vec<f64>,
}

pub fn read_th1(data: &[u8], storage: Storage) -> Result<Histogram> {
    let mut r = RBuffer::new(data);
    let (version, _) = r.read_version()?;
    if version < 1 {
        return Err(RootError::Deserialization(format!("TH1 subclass version {version}")));
    }

    let base = read_th1_base(&mut r)?;
    let cells = match storage {
        Storage::Double => r.read_tarray_f64()?,
        Storage::Float => r.read_tarray_f32()?,
    };
    if cells.len() != base.n_cells {
        return Err(RootError::Deserialization(format!(
            "'{}': content array has {} cells, fNcells is {}",
            base.name,
            cells.len(),
            base.n_cells
        )));
    }
    build(base, &cells)
}

fn read_th1_base(r: &mut RBuffer<'_>) -> Result<Th1Base> {
    let (version, end) = r.read_version()?;
    let (name, title) = r.read_tnamed()?;
    for _ in 0..3 {
        // TAttLine, TAttFill, TAttMarker
        r.skip_object()?;
    }

    let n_cells = r.read_i32()?;
    let n_cells = usize::try_from(n_cells)
        .map_err(|_| RootError::Deserialization(format!("'{name}': fNcells = {n_cells}")))?;

    let axis = read_taxis(r)?;
    skip_taxis(r)?;
    skip_taxis(r)?;

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    r.skip(4 * 8)?; // fTsumw, fTsumw2, fTsumwx, fTsumwx2
    if version >= 2 {
        r.skip(2 * 8)?; // fMaximum, fMinimum
    }
    if version >= 3 {
        r.skip(8)?; // fNormFactor
    }
    let _contour = r.read_tarray_f64()?;
    let sumw2 = r.read_tarray_f64()?;
    let _option = r.read_string()?;
    r.skip_object()?; // fFunctions

    match end {
        Some(end) => r.seek_forward(end)?,
        None => {
            if version >= 4 {
                let buffer_size = r.read_i32()?.max(0) as usize;
                r.skip(buffer_size * 8)?;
            }
            if version >= 7 {
                let _err_opt = r.read_i32()?;
            }
            if version >= 8 {
                let _stat_overflows = r.read_i32()?;
            }
        }
    }

    Ok(Th1Base { name, title, n_cells, axis, entries, sumw2 })
}

fn read_taxis(r: &mut RBuffer<'_>) -> Result<Axis> {
    let (_, end) = r.read_version()?;
    let end = end.ok_or_else(|| RootError::Deserialization("TAxis without byte count".into()))?;
    r.read_tnamed()?;
    r.skip_object()?; // TAttAxis
    let n_bins = r.read_i32()?;
    let n_bins = usize::try_from(n_bins)
        .map_err(|_| RootError::Deserialization(format!("TAxis fNbins = {n_bins}")))?;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;
    let edges = r.read_tarray_f64()?;
    r.seek_forward(end)?;
    Ok(Axis { n_bins, x_min, x_max, edges })
}

fn skip_taxis(r: &mut RBuffer<'_>) -> Result<()> {
    let (_, end) = r.read_version()?;
    let end = end.ok_or_else(|| RootError::Deserialization("TAxis without byte count".into()))?;
    r.seek_forward(end)
}

fn build(base: Th1Base, cells: &[f64]) -> Result<Histogram> {
    let Th1Base { name, title, n_cells, axis, entries, sumw2 } = base;
    let n = axis.n_bins;
    if n == 0 || n_cells != n + 2 {
        return Err(RootError::Deserialization(format!(
            "'{name}': {n} bins inconsistent with {n_cells} cells"
        )));
    }

    let bin_content = cells[1..=n].to_vec();
    let sumw2 = match sumw2.len() {
        0 => None,
        len if len == n_cells => Some(sumw2[1..=n].to_vec()),
        len => {
            return Err(RootError::Deserialization(format!(
                "'{name}': fSumw2 has {len} entries, expected {n_cells}"
            )));
        }
    };

    let bin_edges = if axis.edges.len() == n + 1 {
        axis.edges
    } else {
        let width = (axis.x_max - axis.x_min) / n as f64;
        (0..=n).map(|i| axis.x_min + i as f64 * width).collect()
    };

    Ok(Histogram { name, title, bin_edges, bin_content, sumw2, entries })
}
