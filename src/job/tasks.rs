//! Per-step task templates of a batch job.
//!
//! Constants here are what the tool writes itself when a template is saved
//! from its batch processor; only the parameterised fields vary.

use crate::params::{Deconvolution, ExportFormat, Microscopy};
use crate::value::{Mapping, Value, mapping};

pub const TEMPLATE_TITLE: &str = "Batch processing template (huygens-batch)";
pub const TEMPLATE_VERSION: &str = "2.6";
pub const TEMPLATE_NAME: &str = "huygens-batch-template";

/// `%a %b %d %H:%M:%S %Y`, e.g. `Fri Feb 03 14:49:24 2023`.
pub const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

const VERIFIED: &str = "verified";

pub fn info(date: String) -> Mapping {
    mapping! {
        "title" => TEMPLATE_TITLE,
        "version" => TEMPLATE_VERSION,
        "templateName" => TEMPLATE_NAME,
        "date" => date,
    }
}

pub fn set_env(result_dir: String, export_format: ExportFormat) -> Mapping {
    mapping! {
        "resultDir" => result_dir,
        "perJobThreadCnt" => "auto",
        "concurrentJobCnt" => "1",
        "OMP_DYNAMIC" => "1",
        "timeOut" => "100000",
        "exportFormat" => mapping! {
            "type" => export_format.value(),
            "multidir" => "0",
            "cmode" => "scale",
        },
        "inputConversion" => "int",
        "attemptGpu" => "0",
        "useMultiGpu" => "0",
        "gpuDevice" => "0",
        "retainProcess" => "false",
    }
}

pub fn workflow_info() -> Mapping {
    mapping! {
        "state" => "readyToRun",
        "tag" => mapping! {
            "setp" => "none",
            "decon" => "none",
        },
        "timeStartAbs" => "0",
        "timeOut" => "100000",
    }
}

pub fn img_open(path: String) -> Mapping {
    mapping! {
        "path" => path,
        "series" => "off",
        "index" => "0",
        "type" => "load",
    }
}

/// Microscopic parameters. Scalars are broadcast once per channel and each
/// gets a `parState,<name>` companion marking it verified.
pub fn setp(params: &Microscopy) -> Mapping {
    let n = params.n_channels;
    let mut m = mapping! {
        "s" => vec![
            Value::from(params.scale_x),
            Value::from(params.scale_y),
            Value::from(params.scale_z),
            Value::from(params.scale_t),
        ],
        "userDefConfidence" => "reported",
    };

    let per_channel: [(&str, Value); 9] = [
        ("micr", Value::broadcast(params.micr.value(), n)),
        ("na", Value::broadcast(params.na, n)),
        ("ex", Value::from(params.ex.clone())),
        ("em", Value::from(params.em.clone())),
        ("ril", Value::broadcast(params.ril, n)),
        ("ri", Value::broadcast(params.ri, n)),
        ("pr", Value::broadcast(params.pr, n)),
        ("ps", Value::broadcast(params.ps, n)),
        ("imaging_dir", Value::broadcast(params.imaging_dir.value(), n)),
    ];
    for (name, value) in per_channel {
        m.insert(name, value);
        m.insert(format!("parState,{name}"), Value::broadcast(VERIFIED, n));
    }
    m
}

/// Classic maximum likelihood estimation task; identical for every channel.
pub fn cmle(params: &Deconvolution) -> Mapping {
    mapping! {
        "psfMode" => params.psf_mode.value(),
        "psfPath" => Mapping::new(),
        "mode" => "fast",
        "it" => params.it,
        "q" => params.q,
        "pad" => "auto",
        "bgMode" => "auto",
        "bgRadius" => "0.7",
        "blMode" => "auto",
        "brMode" => "auto",
        "varPsf" => "auto",
        "varPsfCnt" => "1",
        "reduceMode" => "auto",
        "acuityMode" => "off",
        "acuity" => "0",
        "bg" => "0.0",
        "timeOut" => "10000",
    }
}

pub fn img_save(root_name: String) -> Mapping {
    mapping! {
        "rootName" => vec![root_name],
        "alsoSaveMip" => "0",
        "timeOut" => "10000",
    }
}
