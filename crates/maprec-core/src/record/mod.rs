//! Map records: one raster image georeferenced by ground control points.
//!
//! A [`Record`] is bound to a file location. Its data is read and validated
//! on first access (or supplied up front and validated immediately), and
//! every derived value is computed at most once and cached for the lifetime
//! of the record:
//!
//! - [`Record::gcps`]: control points with ground coordinates in the record
//!   SRS
//! - [`Record::gcp_transform`] / [`Record::inverse_gcp_transform`]: pixel ↔
//!   ground transforms fit from the GCPs
//! - [`Record::projected_cutline`]: the cutline ring in the record SRS
//! - [`Record::fingerprint`]: content hash of georeferencing and image state
//!
//! # Cutline projection
//!
//! The ring is closed first. A cutline already in the record SRS is returned
//! as is. Otherwise it is densified (see [`crate::geometry::densify`]) and
//! then either run through the pixel → ground transform (`RAW` cutlines) or
//! converted point by point with the projection service.
//!
//! # Threading
//!
//! Caches use [`OnceCell`], so a record is not `Sync`. Keep each record on
//! one thread, or build one per thread.

mod file;
mod fingerprint;
mod types;
mod validate;

pub use types::{
    Cutline, CutlineSrs, FormatError, Gcp, RawGcp, RecordData, RecordError, Result,
    MIN_CUTLINE_POINTS, MIN_GCPS, RAW_SRS,
};

use crate::geometry::{close_ring, densify, Point};
use crate::interpolate::{Interpolator, PointTransform, TpsInterpolator};
use crate::path;
use crate::projection::{Proj4Projector, Projector};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Return the cached value, computing it with `init` on first use.
///
/// A failed `init` leaves the cell empty so the next call retries.
fn get_or_try_init<T>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

/// A georeferencing record with lazily derived geometry.
pub struct Record<I: Interpolator = TpsInterpolator, P: Projector = Proj4Projector> {
    path: PathBuf,
    interpolator: I,
    projector: P,
    data: OnceCell<RecordData>,
    image_path: OnceCell<PathBuf>,
    gcps: OnceCell<Vec<Gcp>>,
    gcp_transform: OnceCell<I::Transform>,
    inverse_gcp_transform: OnceCell<I::Transform>,
    projected_cutline: OnceCell<Option<Vec<Point>>>,
    fingerprint: OnceCell<String>,
}

impl Record {
    /// Bind a record to `path`; the file is read on first access.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use maprec_core::Record;
    ///
    /// let record = Record::open("maps/001m--a49.maprec")?;
    /// for point in record.projected_cutline()?.unwrap_or_default() {
    ///     println!("{} {}", point.x, point.y);
    /// }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_services(path, TpsInterpolator, Proj4Projector::default())
    }

    /// Bind already-parsed data to `path`, validating it now.
    pub fn from_data(path: impl AsRef<Path>, data: RecordData) -> Result<Self> {
        Self::from_data_with_services(path, data, TpsInterpolator, Proj4Projector::default())
    }
}

impl<I: Interpolator, P: Projector> Record<I, P> {
    /// Like [`Record::open`], with explicit interpolation and projection
    /// services.
    pub fn with_services(path: impl AsRef<Path>, interpolator: I, projector: P) -> Result<Self> {
        Self::build(path.as_ref(), None, interpolator, projector)
    }

    /// Like [`Record::from_data`], with explicit services.
    pub fn from_data_with_services(
        path: impl AsRef<Path>,
        data: RecordData,
        interpolator: I,
        projector: P,
    ) -> Result<Self> {
        data.validate()?;
        Self::build(path.as_ref(), Some(data), interpolator, projector)
    }

    fn build(path: &Path, data: Option<RecordData>, interpolator: I, projector: P) -> Result<Self> {
        Ok(Self {
            path: path::absolute(path)?,
            interpolator,
            projector,
            data: data.map(OnceCell::from).unwrap_or_default(),
            image_path: OnceCell::new(),
            gcps: OnceCell::new(),
            gcp_transform: OnceCell::new(),
            inverse_gcp_transform: OnceCell::new(),
            projected_cutline: OnceCell::new(),
            fingerprint: OnceCell::new(),
        })
    }

    /// Absolute location of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        path::normalize(&self.base_dir().join(relative))
    }

    /// Validated record data, loading the file on first call.
    pub fn data(&self) -> Result<&RecordData> {
        get_or_try_init(&self.data, || file::read_data(&self.path))
    }

    /// Absolute image path, resolved against the record's directory.
    pub fn image_path(&self) -> Result<&Path> {
        get_or_try_init(&self.image_path, || Ok(self.resolve(&self.data()?.image_path)))
            .map(PathBuf::as_path)
    }

    /// Absolute mask path, if the record has a non-empty one.
    pub fn mask_path(&self) -> Result<Option<PathBuf>> {
        Ok(self
            .data()?
            .mask_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| self.resolve(p)))
    }

    /// The record's working SRS.
    pub fn srs(&self) -> Result<&str> {
        Ok(&self.data()?.srs)
    }

    /// Control points with ground coordinates in the record SRS.
    ///
    /// GCPs not flagged `is_projected` are taken as lon/lat on the record
    /// SRS's own datum and projected into it. Input order is preserved.
    pub fn gcps(&self) -> Result<&[Gcp]> {
        get_or_try_init(&self.gcps, || {
            let data = self.data()?;
            let gcps = data
                .gcps
                .iter()
                .map(|raw| -> Result<Gcp> {
                    let ground = if raw.is_projected {
                        raw.ground
                    } else {
                        self.projector.project(&data.srs, raw.ground)?
                    };
                    Ok(Gcp {
                        pixel: raw.pixel,
                        ground,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            log::debug!(
                "Resolved {} gcps ({} projected from lon/lat)",
                gcps.len(),
                data.gcps.iter().filter(|g| !g.is_projected).count()
            );
            Ok(gcps)
        })
        .map(Vec::as_slice)
    }

    /// Pixel → ground transform.
    pub fn gcp_transform(&self) -> Result<&I::Transform> {
        get_or_try_init(&self.gcp_transform, || {
            let pairs: Vec<_> = self.gcps()?.iter().map(|g| (g.pixel, g.ground)).collect();
            log::debug!("Fitting pixel -> ground transform on {} gcps", pairs.len());
            Ok(self.interpolator.fit(&pairs)?)
        })
    }

    /// Ground → pixel transform, fit independently of the forward one.
    pub fn inverse_gcp_transform(&self) -> Result<&I::Transform> {
        get_or_try_init(&self.inverse_gcp_transform, || {
            let pairs: Vec<_> = self.gcps()?.iter().map(|g| (g.ground, g.pixel)).collect();
            log::debug!("Fitting ground -> pixel transform on {} gcps", pairs.len());
            Ok(self.interpolator.fit(&pairs)?)
        })
    }

    /// Map an image pixel to the record SRS.
    pub fn pixel_to_ground(&self, pixel: Point) -> Result<Point> {
        Ok(self.gcp_transform()?.transform(pixel))
    }

    /// Map a record-SRS coordinate to an image pixel.
    pub fn ground_to_pixel(&self, ground: Point) -> Result<Point> {
        Ok(self.inverse_gcp_transform()?.transform(ground))
    }

    /// The cutline as a closed ring in the record SRS, or `None` when the
    /// record has no cutline.
    pub fn projected_cutline(&self) -> Result<Option<&[Point]>> {
        let cutline = get_or_try_init(&self.projected_cutline, || {
            let data = self.data()?;
            let Some(cutline) = &data.cutline else {
                return Ok(None);
            };

            let ring = close_ring(cutline.points.clone());
            let projected = match &cutline.srs {
                CutlineSrs::Srs(srs) if *srs == data.srs => ring,
                CutlineSrs::Raw => {
                    let dense = densify(&ring);
                    log::debug!("Densified RAW cutline {} -> {} points", ring.len(), dense.len());
                    self.gcp_transform()?.transform_all(&dense)
                }
                CutlineSrs::Srs(srs) => {
                    let dense = densify(&ring);
                    log::debug!("Densified cutline {} -> {} points", ring.len(), dense.len());
                    self.projector.convert(srs, &data.srs, &dense)?
                }
            };
            Ok(Some(projected))
        })?;
        Ok(cutline.as_deref())
    }

    /// Write the record to `target`.
    ///
    /// `image_path` is stored relative to the target's directory when
    /// `image_path_relative` is set, absolute otherwise. The in-memory record
    /// is not modified.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::NonUtf8Path`] when the image path to store
    /// is not valid UTF-8.
    pub fn write(&self, target: impl AsRef<Path>, image_path_relative: bool) -> Result<()> {
        let target = path::absolute(target.as_ref())?;
        let image_path = self.image_path()?;
        let image_path = if image_path_relative {
            let base = target.parent().unwrap_or(Path::new("/"));
            path::relative_to(image_path, base)
        } else {
            image_path.to_path_buf()
        };

        let image_path = match image_path.to_str() {
            Some(text) => text.to_string(),
            None => return Err(RecordError::NonUtf8Path(image_path.clone())),
        };

        let mut data = self.data()?.clone();
        data.image_path = image_path;
        file::write_data(&target, &data)
    }

    /// Hex SHA-1 over the record data (minus `image_path`) and the image's
    /// size and modification time.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordError::Io`] if the image cannot be stat'ed.
    pub fn fingerprint(&self) -> Result<&str> {
        get_or_try_init(&self.fingerprint, || {
            fingerprint::compute(self.data()?, self.image_path()?)
        })
        .map(String::as_str)
    }
}

impl<I: Interpolator, P: Projector> std::fmt::Debug for Record<I, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("path", &self.path)
            .field("loaded", &self.data.get().is_some())
            .finish_non_exhaustive()
    }
}
