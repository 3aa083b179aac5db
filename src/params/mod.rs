//! Job parameters: typed inputs of the job builder.
//!
//! Parameters can be loaded from a JSON file; omitted fields keep their
//! defaults.

pub mod format;
pub mod imaging;

pub use format::ExportFormat;
pub use imaging::{Deconvolution, Microscopy, MicroscopeType};

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a `--params` JSON file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobParams {
    pub export_format: ExportFormat,
    pub microscopy: Microscopy,
    pub deconvolution: Deconvolution,
}

impl JobParams {
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read params file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse params file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn load_reads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"export_format": "imaris", "deconvolution": {{"q": 0.05}}}}"#
        )
        .unwrap();

        let params = JobParams::load(file.path()).unwrap();
        assert_eq!(params.export_format, ExportFormat::Imaris);
        assert_eq!(params.deconvolution.q, 0.05);
        assert_eq!(params.deconvolution.it, 20);
        assert_eq!(params.microscopy, Microscopy::default());
    }

    #[test]
    fn load_reports_path_on_error() {
        let err = JobParams::load(Path::new("/nonexistent/params.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/params.json"));
    }
}
