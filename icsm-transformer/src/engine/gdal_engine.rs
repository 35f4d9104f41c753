//! Moteur géospatial GDAL/OGR
//!
//! Ce module est disponible uniquement avec le feature `gdal`. L'écriture vecteur
//! passe par `GDALVectorTranslate` (équivalent ogr2ogr), le warp raster par
//! `GDALAutoCreateWarpedVRT` suivi d'une copie GeoTIFF.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::ptr;

use gdal::spatial_ref::SpatialRef;
use gdal::vector::LayerAccess;
use gdal::{Dataset, DatasetOptions, DriverManager, GdalOpenFlags};
use icsm_catalog::CrsSpec;
use tracing::debug;

use super::{DatasetKind, EngineError, GeoEngine, Resampling, WarpOptions};

/// Jeu de données GDAL ouvert, avec le CRS affecté par la session
pub struct GdalHandle {
    path: PathBuf,
    dataset: Dataset,
    assigned: Option<CrsSpec>,
}

impl GdalHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Moteur GDAL
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalEngine;

impl GdalEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Construit la référence spatiale GDAL d'un `CrsSpec`
fn spatial_ref(crs: &CrsSpec) -> Result<SpatialRef, EngineError> {
    let result = match crs {
        CrsSpec::Proj(def) => SpatialRef::from_proj4(def),
        CrsSpec::Epsg(code) => SpatialRef::from_epsg(*code),
    };
    result.map_err(|e| EngineError::InvalidCrs {
        crs: crs.to_string(),
        reason: e.to_string(),
    })
}

/// Dernier message d'erreur CPL
fn last_error_message() -> String {
    // SAFETY: CPLGetLastErrorMsg retourne une chaîne possédée par GDAL, jamais nulle
    unsafe {
        let msg = gdal_sys::CPLGetLastErrorMsg();
        if msg.is_null() {
            return String::new();
        }
        CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

fn c_path(path: &Path) -> Result<CString, EngineError> {
    CString::new(path.to_string_lossy().as_bytes()).map_err(|_| EngineError::Write {
        code: -1,
        message: format!("Invalid output path: {}", path.display()),
    })
}

fn open_with(path: &Path, flags: GdalOpenFlags) -> Option<Dataset> {
    Dataset::open_ex(
        path,
        DatasetOptions {
            open_flags: flags,
            ..Default::default()
        },
    )
    .ok()
}

impl GeoEngine for GdalEngine {
    type Handle = GdalHandle;

    fn open(&self, path: &Path) -> Result<(DatasetKind, GdalHandle), EngineError> {
        let vector = open_with(path, GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY)
            .filter(|ds| ds.layer_count() > 0);
        if let Some(dataset) = vector {
            debug!(path = %path.display(), "Recognised vector layer");
            return Ok((
                DatasetKind::Vector,
                GdalHandle {
                    path: path.to_path_buf(),
                    dataset,
                    assigned: None,
                },
            ));
        }

        let raster = open_with(path, GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_READONLY)
            .filter(|ds| ds.raster_count() > 0);
        if let Some(dataset) = raster {
            debug!(path = %path.display(), "Recognised raster layer");
            return Ok((
                DatasetKind::Raster,
                GdalHandle {
                    path: path.to_path_buf(),
                    dataset,
                    assigned: None,
                },
            ));
        }

        Err(EngineError::Unreadable(path.to_path_buf()))
    }

    fn detect_crs(&self, handle: &GdalHandle) -> Option<String> {
        let mut srs = if handle.dataset.layer_count() > 0 {
            handle.dataset.layer(0).ok()?.spatial_ref()?
        } else {
            handle.dataset.spatial_ref().ok()?
        };

        // Les .prj ESRI ne portent souvent pas d'autorité
        if srs.auth_code().is_err() {
            let _ = srs.auto_identify_epsg();
        }

        let name = srs.auth_name().ok()?;
        let code = srs.auth_code().ok()?;
        Some(format!("{}:{}", name, code))
    }

    fn assign_crs(&self, handle: &mut GdalHandle, crs: &CrsSpec) -> Result<(), EngineError> {
        // Validation seulement: l'affectation est appliquée à l'écriture (-s_srs)
        spatial_ref(crs)?;
        handle.assigned = Some(crs.clone());
        Ok(())
    }

    fn write_vector(&self, handle: &GdalHandle, path: &Path, crs: &CrsSpec) -> Result<(), EngineError> {
        spatial_ref(crs)?;

        let mut args = vec![
            "-f".to_string(),
            "ESRI Shapefile".to_string(),
            "-overwrite".to_string(),
            "-lco".to_string(),
            "ENCODING=UTF-8".to_string(),
            "-t_srs".to_string(),
            crs.to_string(),
        ];
        if let Some(assigned) = &handle.assigned {
            args.push("-s_srs".to_string());
            args.push(assigned.to_string());
        }
        debug!(output = %path.display(), args = ?args, "GDALVectorTranslate");

        let c_args = args
            .iter()
            .map(|a| CString::new(a.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| EngineError::Write {
                code: -1,
                message: e.to_string(),
            })?;
        let mut argv: Vec<*mut c_char> = c_args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
        argv.push(ptr::null_mut());
        let dest = c_path(path)?;

        // SAFETY: argv est terminé par NULL et vit jusqu'à la libération des options;
        // le dataset source reste possédé par le handle pendant l'appel.
        unsafe {
            let options = gdal_sys::GDALVectorTranslateOptionsNew(argv.as_mut_ptr(), ptr::null_mut());
            if options.is_null() {
                return Err(EngineError::Write {
                    code: -1,
                    message: last_error_message(),
                });
            }

            let mut sources = [handle.dataset.c_dataset()];
            let mut usage_error: c_int = 0;
            let out = gdal_sys::GDALVectorTranslate(
                dest.as_ptr(),
                ptr::null_mut(),
                1,
                sources.as_mut_ptr(),
                options,
                &mut usage_error,
            );
            gdal_sys::GDALVectorTranslateOptionsFree(options);

            if out.is_null() {
                return Err(EngineError::Write {
                    code: if usage_error != 0 { usage_error } else { 1 },
                    message: last_error_message(),
                });
            }
            gdal_sys::GDALClose(out);
        }

        Ok(())
    }

    fn warp_raster(
        &self,
        handle: &GdalHandle,
        path: &Path,
        src: &CrsSpec,
        dst: &CrsSpec,
        options: &WarpOptions,
    ) -> Result<(), EngineError> {
        let src_wkt = CString::new(spatial_ref(src)?.to_wkt()?)
            .map_err(|e| EngineError::Warp(e.to_string()))?;
        let dst_wkt = CString::new(spatial_ref(dst)?.to_wkt()?)
            .map_err(|e| EngineError::Warp(e.to_string()))?;
        let resampling = match options.resampling {
            Resampling::NearestNeighbour => gdal_sys::GDALResampleAlg::GRA_NearestNeighbour,
        };
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let dest = c_path(path)?;

        // SAFETY: le VRT est fermé avant la sortie du bloc, la copie aussi
        unsafe {
            let vrt = gdal_sys::GDALAutoCreateWarpedVRT(
                handle.dataset.c_dataset(),
                src_wkt.as_ptr(),
                dst_wkt.as_ptr(),
                resampling,
                options.error_threshold,
                ptr::null(),
            );
            if vrt.is_null() {
                return Err(EngineError::Warp(last_error_message()));
            }

            let out = gdal_sys::GDALCreateCopy(
                driver.c_driver(),
                dest.as_ptr(),
                vrt,
                0,
                ptr::null_mut(),
                None,
                ptr::null_mut(),
            );
            gdal_sys::GDALClose(vrt);

            if out.is_null() {
                return Err(EngineError::Warp(last_error_message()));
            }
            gdal_sys::GDALClose(out);
        }

        Ok(())
    }

    fn stamp_crs(&self, path: &Path, crs: &CrsSpec) -> Result<(), EngineError> {
        let srs = spatial_ref(crs)?;
        let mut dataset = Dataset::open_ex(
            path,
            DatasetOptions {
                open_flags: GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_UPDATE,
                ..Default::default()
            },
        )?;
        dataset.set_spatial_ref(&srs)?;
        Ok(())
    }
}
