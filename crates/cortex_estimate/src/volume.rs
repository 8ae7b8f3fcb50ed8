//! Volume dimension lookup from image headers.
//!
//! Only the fixed-size header is read: the `dim` field of a NIfTI-1, NIfTI-2
//! or Analyze 7.5 header, plain or gzip-compressed. Voxel data is never
//! touched.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::VolumeError;

const NIFTI1_HEADER_SIZE: i32 = 348;
const NIFTI2_HEADER_SIZE: i32 = 540;
const NIFTI1_DIM_OFFSET: usize = 40;
const NIFTI2_DIM_OFFSET: usize = 16;
/// Enough bytes to cover `dim` in either header version.
const HEADER_PREFIX: usize = NIFTI2_DIM_OFFSET + 8 * 8;

/// Reads the spatial voxel count of an image file.
///
/// Implementations must be safe to share between scheduler threads.
pub trait VolumeReader: Send + Sync {
    /// Returns the product of the first three dimensions of the volume at `path`.
    fn spatial_voxels(&self, path: &Path) -> Result<u64, VolumeError>;
}

/// The dimensions declared by a volume header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeShape {
    dims: Vec<u64>,
}

impl VolumeShape {
    /// Product of the first three dimensions; time and higher axes are ignored.
    pub fn spatial_voxels(&self) -> u64 {
        self.dims
            .iter()
            .take(3)
            .fold(1u64, |acc, &d| acc.saturating_mul(d))
    }

    /// Reads the shape of the image at `path`.
    ///
    /// `.img` files read their sibling `.hdr`.
    pub fn read(path: &Path) -> Result<Self, VolumeError> {
        let (header_path, compressed) = header_location(path)?;
        let file = File::open(&header_path).map_err(|source| VolumeError::Io {
            path: header_path.clone(),
            source,
        })?;

        let mut prefix = [0u8; HEADER_PREFIX];
        let read = if compressed {
            GzDecoder::new(BufReader::new(file)).read_exact(&mut prefix)
        } else {
            BufReader::new(file).read_exact(&mut prefix)
        };
        match read {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(invalid(&header_path, "truncated header"));
            }
            Err(source) => {
                return Err(VolumeError::Io {
                    path: header_path,
                    source,
                })
            }
        }

        parse_dims(&prefix).map_err(|reason| invalid(&header_path, reason))
    }
}

/// The header-only [`VolumeReader`] used by default.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderVolumeReader;

impl VolumeReader for HeaderVolumeReader {
    fn spatial_voxels(&self, path: &Path) -> Result<u64, VolumeError> {
        VolumeShape::read(path).map(|shape| shape.spatial_voxels())
    }
}

fn invalid(path: &Path, reason: impl Into<String>) -> VolumeError {
    VolumeError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Maps an image path to the file holding its header and whether that file is gzipped.
fn header_location(path: &Path) -> Result<(PathBuf, bool), VolumeError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let (suffix, header_suffix, compressed) = if name.ends_with(".nii.gz") {
        (".nii.gz", None, true)
    } else if name.ends_with(".hdr.gz") {
        (".hdr.gz", None, true)
    } else if name.ends_with(".img.gz") {
        (".img.gz", Some(".hdr.gz"), true)
    } else if name.ends_with(".nii") {
        (".nii", None, false)
    } else if name.ends_with(".hdr") {
        (".hdr", None, false)
    } else if name.ends_with(".img") {
        (".img", Some(".hdr"), false)
    } else {
        return Err(VolumeError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    };

    let Some(header_suffix) = header_suffix else {
        return Ok((path.to_path_buf(), compressed));
    };
    let full = path.to_string_lossy();
    let base = &full[..full.len() - suffix.len()];
    Ok((PathBuf::from(format!("{base}{header_suffix}")), compressed))
}

fn parse_dims(prefix: &[u8; HEADER_PREFIX]) -> Result<VolumeShape, String> {
    let size_bytes = [prefix[0], prefix[1], prefix[2], prefix[3]];
    let little = i32::from_le_bytes(size_bytes);
    let big = i32::from_be_bytes(size_bytes);

    let (two, le) = match (little, big) {
        (NIFTI1_HEADER_SIZE, _) => (false, true),
        (_, NIFTI1_HEADER_SIZE) => (false, false),
        (NIFTI2_HEADER_SIZE, _) => (true, true),
        (_, NIFTI2_HEADER_SIZE) => (true, false),
        _ => return Err(format!("unrecognized header size {little}")),
    };

    let dim: Vec<i64> = if two {
        (0..8)
            .map(|i| {
                let at = NIFTI2_DIM_OFFSET + 8 * i;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&prefix[at..at + 8]);
                if le {
                    i64::from_le_bytes(raw)
                } else {
                    i64::from_be_bytes(raw)
                }
            })
            .collect()
    } else {
        (0..8)
            .map(|i| {
                let at = NIFTI1_DIM_OFFSET + 2 * i;
                let raw = [prefix[at], prefix[at + 1]];
                i64::from(if le {
                    i16::from_le_bytes(raw)
                } else {
                    i16::from_be_bytes(raw)
                })
            })
            .collect()
    };

    let ndim = dim[0];
    if !(1..=7).contains(&ndim) {
        return Err(format!("dimension count {ndim} out of range"));
    }
    let dims = dim[1..=ndim as usize]
        .iter()
        .map(|&d| u64::try_from(d).map_err(|_| format!("negative dimension {d}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VolumeShape { dims })
}
