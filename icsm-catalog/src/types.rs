//! Types de données pour le crate icsm-catalog

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::CatalogError;

/// Variante d'un datum partageant le même code EPSG de base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Variant {
    /// Définition EPSG standard
    Plain,
    /// GDA94 → GDA2020, composante conforme seule (suffixe `c`)
    ConformalOnly,
    /// GDA94 → GDA2020, conforme + distorsion (suffixe `d`)
    ConformalAndDistortion,
}

impl Variant {
    /// Suffixe textuel de la variante (vide pour `Plain`)
    pub fn suffix(self) -> &'static str {
        match self {
            Variant::Plain => "",
            Variant::ConformalOnly => "c",
            Variant::ConformalAndDistortion => "d",
        }
    }
}

/// Identifiant d'un datum du registre: code EPSG de base + variante
///
/// Pour les datums UTM, `base_code` est le préfixe auquel on concatène le
/// numéro de zone (ex: `283` + `56` = EPSG:28356).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DatumId {
    pub base_code: u32,
    pub variant: Variant,
}

impl DatumId {
    pub const fn plain(base_code: u32) -> Self {
        Self {
            base_code,
            variant: Variant::Plain,
        }
    }

    pub const fn conformal(base_code: u32) -> Self {
        Self {
            base_code,
            variant: Variant::ConformalOnly,
        }
    }

    pub const fn conformal_and_distortion(base_code: u32) -> Self {
        Self {
            base_code,
            variant: Variant::ConformalAndDistortion,
        }
    }

    /// Code numérique complet, avec la zone UTM éventuelle
    pub fn code(&self, zone: Option<u8>) -> u32 {
        match zone {
            // 283 + 56 -> 28356, 78 + 49 -> 7849
            Some(zone) => self.base_code * 100 + u32::from(zone),
            None => self.base_code,
        }
    }
}

impl fmt::Display for DatumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base_code, self.variant.suffix())
    }
}

impl FromStr for DatumId {
    type Err = CatalogError;

    /// Parse la notation courte `283`, `283c`, `283d`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, variant) = match s.as_bytes().last() {
            Some(b'c') => (&s[..s.len() - 1], Variant::ConformalOnly),
            Some(b'd') => (&s[..s.len() - 1], Variant::ConformalAndDistortion),
            _ => (s, Variant::Plain),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CatalogError::InvalidDatumId(s.to_string()));
        }

        let base_code = digits
            .parse()
            .map_err(|_| CatalogError::InvalidDatumId(s.to_string()))?;

        Ok(Self { base_code, variant })
    }
}

/// Grilles NTv2 officielles de l'ICSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GridFile {
    /// AGD66 → GDA94, couverture nationale
    Agd66National,
    /// AGD84 → GDA94 (QLD, SA, WA)
    Agd84National,
    /// GDA94 → GDA2020, conforme seule
    Gda2020Conformal,
    /// GDA94 → GDA2020, conforme + distorsion
    Gda2020ConformalAndDistortion,
}

impl GridFile {
    pub const ALL: [GridFile; 4] = [
        GridFile::Agd66National,
        GridFile::Agd84National,
        GridFile::Gda2020Conformal,
        GridFile::Gda2020ConformalAndDistortion,
    ];

    /// Nom du fichier .gsb (aussi utilisé pour construire l'URL de téléchargement)
    pub fn file_name(self) -> &'static str {
        match self {
            GridFile::Agd66National => "A66_National_13_09_01.gsb",
            GridFile::Agd84National => "National_84_02_07_01.gsb",
            GridFile::Gda2020Conformal => "GDA94_GDA2020_conformal.gsb",
            GridFile::Gda2020ConformalAndDistortion => "GDA94_GDA2020_conformal_and_distortion.gsb",
        }
    }

    /// Avertissement affiché à l'utilisateur (couverture, usage)
    pub fn caveat(self) -> &'static str {
        match self {
            GridFile::Agd66National => concat!(
                "NTv2 transformation grid A66_national_13_09_01.gsb [EPSG:1803] ",
                "<b>provides complete national coverage.</b><br>",
                "See Appendix A of Geocentric Datum of Australia 2020 Technical Manual ",
                "for grid coverage and description."
            ),
            GridFile::Agd84National => concat!(
                "NTv2 transformation grid National_84_02_07_01.gsb [EPSG:1804] ",
                "<b>only has coverage for jurisdictions that adopted AGD84 - QLD, SA and WA.</b><br>",
                "See Appendix A of Geocentric Datum of Australia 2020 Technical Manual ",
                "for grid coverage and description."
            ),
            GridFile::Gda2020Conformal => concat!(
                "<b>WARNING! Currently only covers Tasmania.</b><br>",
                "NTv2 transformation grid GDA94_GDA2020_conformal.gsb ",
                "<b>only applies a conformal transformation between the datums.</b><br>",
                "See Section 3.6.1 of Geocentric Datum of Australia 2020 Technical Manual ",
                "for a description of the grid and when it is appropriate to apply."
            ),
            GridFile::Gda2020ConformalAndDistortion => concat!(
                "<b>WARNING! Currently only covers Tasmania.</b><br>",
                "NTv2 transformation grid GDA94_GDA2020_conformal_and_distortion.gsb ",
                "<b>applies a conformal plus distortion transformation between the datums.</b><br>",
                "See Section 3.6.1 of Geocentric Datum of Australia 2020 Technical Manual ",
                "for a description of the grid and when it is appropriate to apply."
            ),
        }
    }

    /// Retrouve une grille depuis son nom de fichier
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.file_name() == name)
    }
}

impl fmt::Display for GridFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Manière de construire un CRS côté moteur géospatial
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CrsSpec {
    /// Définition PROJ4 personnalisée (avec `+nadgrids=`)
    Proj(String),
    /// Code EPSG numérique
    Epsg(u32),
}

impl fmt::Display for CrsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsSpec::Proj(def) => f.write_str(def),
            CrsSpec::Epsg(code) => write!(f, "EPSG:{}", code),
        }
    }
}

/// Transformation instanciée pour une zone: l'unité de travail sélectionnable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transform {
    /// Nom court (ex: "AGD66 to GDA94")
    pub name: String,

    /// Libellé source (ex: "AGD66 / AMG [EPSG:20256]")
    pub source_name: String,

    /// Libellé cible
    pub target_name: String,

    /// Définition PROJ source, absente si le code EPSG suffit
    pub source_proj: Option<String>,

    /// Définition PROJ cible, absente si le code EPSG suffit
    pub target_proj: Option<String>,

    /// Code EPSG source, zone incluse
    pub source_code: u32,

    /// Code EPSG cible, zone incluse
    pub target_code: u32,

    /// Chemin de la grille NTv2 requise
    pub grid: Option<PathBuf>,

    /// Texte descriptif de la grille (vide sans grille)
    pub grid_text: String,
}

impl Transform {
    /// CRS source: PROJ si présent, sinon EPSG
    pub fn source_crs(&self) -> CrsSpec {
        match &self.source_proj {
            Some(def) => CrsSpec::Proj(def.clone()),
            None => CrsSpec::Epsg(self.source_code),
        }
    }

    /// CRS cible: PROJ si présent, sinon EPSG
    pub fn target_crs(&self) -> CrsSpec {
        match &self.target_proj {
            Some(def) => CrsSpec::Proj(def.clone()),
            None => CrsSpec::Epsg(self.target_code),
        }
    }

    /// CRS final, toujours exprimé par son code EPSG
    pub fn target_epsg(&self) -> CrsSpec {
        CrsSpec::Epsg(self.target_code)
    }

    /// La cible nécessite-t-elle une passe intermédiaire (PROJ personnalisé)?
    pub fn needs_relabel(&self) -> bool {
        self.target_proj.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datum_id() {
        assert_eq!("283".parse::<DatumId>().unwrap(), DatumId::plain(283));
        assert_eq!("283c".parse::<DatumId>().unwrap(), DatumId::conformal(283));
        assert_eq!(
            "4283d".parse::<DatumId>().unwrap(),
            DatumId::conformal_and_distortion(4283)
        );
        assert!("".parse::<DatumId>().is_err());
        assert!("c".parse::<DatumId>().is_err());
        assert!("28x".parse::<DatumId>().is_err());
        assert!("283cd".parse::<DatumId>().is_err());
    }

    #[test]
    fn test_datum_id_display() {
        assert_eq!(DatumId::conformal(4283).to_string(), "4283c");
        assert_eq!(DatumId::plain(78).to_string(), "78");
    }

    #[test]
    fn test_code_with_zone() {
        assert_eq!(DatumId::plain(202).code(Some(49)), 20249);
        assert_eq!(DatumId::plain(78).code(Some(56)), 7856);
        assert_eq!(DatumId::conformal_and_distortion(283).code(Some(55)), 28355);
        assert_eq!(DatumId::plain(4283).code(None), 4283);
    }

    #[test]
    fn test_grid_lookup() {
        for grid in GridFile::ALL {
            assert_eq!(GridFile::from_file_name(grid.file_name()), Some(grid));
            assert!(!grid.caveat().is_empty());
        }
        assert_eq!(GridFile::from_file_name("unknown.gsb"), None);
    }

    #[test]
    fn test_crs_spec_display() {
        assert_eq!(CrsSpec::Epsg(28356).to_string(), "EPSG:28356");
        assert_eq!(
            CrsSpec::Proj("+proj=longlat".into()).to_string(),
            "+proj=longlat"
        );
    }
}
