//! Export formats understood by the deconvolution tool.
//!
//! Each format maps to exactly one file extension. The mapping is not
//! invertible (ICS and ICS2 both write `.ics`, both HDF5 flavours write `.h5`),
//! so never derive a format from an output path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "hdf5")]
    Hdf5,
    #[serde(rename = "hdf5uncompr")]
    Hdf5Uncompressed,
    #[default]
    #[serde(rename = "ics")]
    Ics,
    #[serde(rename = "ics2")]
    Ics2,
    #[serde(rename = "ometiff")]
    OmeTiff,
    #[serde(rename = "ome")]
    OmeXml,
    #[serde(rename = "imaris")]
    Imaris,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 7] = [
        ExportFormat::Hdf5,
        ExportFormat::Hdf5Uncompressed,
        ExportFormat::Ics,
        ExportFormat::Ics2,
        ExportFormat::OmeTiff,
        ExportFormat::OmeXml,
        ExportFormat::Imaris,
    ];

    /// Value string written to `setEnv.exportFormat.type`.
    pub fn value(self) -> &'static str {
        match self {
            ExportFormat::Hdf5 => "hdf5",
            ExportFormat::Hdf5Uncompressed => "hdf5uncompr",
            ExportFormat::Ics => "ics",
            ExportFormat::Ics2 => "ics2",
            ExportFormat::OmeTiff => "ometiff",
            ExportFormat::OmeXml => "ome",
            ExportFormat::Imaris => "imaris",
        }
    }

    /// File extension (with leading dot) of files the tool writes.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Hdf5 | ExportFormat::Hdf5Uncompressed => ".h5",
            ExportFormat::Ics | ExportFormat::Ics2 => ".ics",
            ExportFormat::OmeTiff => ".ome.tiff",
            ExportFormat::OmeXml => ".ome.xml",
            ExportFormat::Imaris => ".ims",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown export format `{0}` (expected one of: hdf5, hdf5uncompr, ics, ics2, ometiff, ome, imaris)")]
pub struct UnknownExportFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.value().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownExportFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_has_an_extension() {
        for f in ExportFormat::ALL {
            let ext = f.extension();
            assert!(ext.starts_with('.') && ext.len() > 1, "{f}: {ext}");
        }
    }

    #[test]
    fn ics_flavours_share_extension() {
        assert_eq!(ExportFormat::Ics.extension(), ExportFormat::Ics2.extension());
        assert_eq!(ExportFormat::Ics.extension(), ".ics");
    }

    #[test]
    fn parses_value_strings() {
        for f in ExportFormat::ALL {
            assert_eq!(f.value().parse::<ExportFormat>(), Ok(f));
        }
        assert_eq!("OME".parse::<ExportFormat>(), Ok(ExportFormat::OmeXml));
    }

    #[test]
    fn rejects_unknown_value() {
        let err = "tiff".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err, UnknownExportFormat("tiff".to_string()));
        assert!(err.to_string().contains("tiff"));
    }

    #[test]
    fn serde_uses_value_strings() {
        let f: ExportFormat = serde_json::from_str(r#""hdf5uncompr""#).unwrap();
        assert_eq!(f, ExportFormat::Hdf5Uncompressed);
        assert_eq!(serde_json::to_string(&ExportFormat::OmeTiff).unwrap(), r#""ometiff""#);
    }
}
