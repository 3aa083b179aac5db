//! Imaging and deconvolution parameters.
//!
//! Every field has a default so a parameter file only needs the values that
//! differ from a single-channel spinning-disk acquisition.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MicroscopeType {
    #[default]
    #[serde(rename = "nipkow")]
    SpinningDisk,
    /// Accepted, but the generated `setp` task is tuned for spinning disk.
    #[serde(rename = "confocal")]
    Confocal,
}

impl MicroscopeType {
    pub fn value(self) -> &'static str {
        match self {
            MicroscopeType::SpinningDisk => "nipkow",
            MicroscopeType::Confocal => "confocal",
        }
    }
}

/// PSF estimation mode. Only automatic estimation is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PsfMode {
    #[default]
    #[serde(rename = "auto")]
    Automatic,
}

impl PsfMode {
    pub fn value(self) -> &'static str {
        match self {
            PsfMode::Automatic => "auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImagingDirection {
    #[default]
    #[serde(rename = "upward")]
    Upward,
}

impl ImagingDirection {
    pub fn value(self) -> &'static str {
        match self {
            ImagingDirection::Upward => "upward",
        }
    }
}

/// Microscope and sample parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Microscopy {
    pub micr: MicroscopeType,
    pub n_channels: usize,
    /// Excitation wavelength per channel (nm).
    pub ex: Vec<u32>,
    /// Emission wavelength per channel (nm).
    pub em: Vec<u32>,
    /// Numerical aperture.
    pub na: f64,
    /// Objective lens refractive index.
    pub ril: f64,
    /// Sample medium refractive index.
    pub ri: f64,
    /// Pinhole radius (nm).
    pub pr: f64,
    /// Pinhole spacing (um).
    pub ps: f64,
    pub imaging_dir: ImagingDirection,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub scale_z: Option<f64>,
    pub scale_t: f64,
}

impl Default for Microscopy {
    fn default() -> Self {
        Self {
            micr: MicroscopeType::SpinningDisk,
            n_channels: 1,
            ex: vec![488],
            em: vec![515],
            na: 1.4,
            ril: 1.515,
            ri: 1.443,
            pr: 1250.0,
            ps: 24.98,
            imaging_dir: ImagingDirection::Upward,
            scale_x: None,
            scale_y: None,
            scale_z: None,
            scale_t: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Deconvolution {
    pub psf_mode: PsfMode,
    /// Maximum iterations.
    pub it: u32,
    /// Quality change threshold.
    pub q: f64,
}

impl Default for Deconvolution {
    fn default() -> Self {
        Self {
            psf_mode: PsfMode::Automatic,
            it: 20,
            q: 0.01,
        }
    }
}
