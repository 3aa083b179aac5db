//! Job builder: typed parameters in, a complete batch job description out.
//!
//! Root layout (in order):
//!   info, taskList, setEnv, workflowID:0, workflowID:1, ...
//!
//! Workflow layout (in order):
//!   info, taskList, imgOpen, setp, cmle:0 .. cmle:<n-1>, imgSave

pub mod tasks;

use crate::params::{Deconvolution, ExportFormat, MicroscopeType, Microscopy};
use crate::value::{Mapping, TASK_LIST_KEY, Value};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A complete job description, ready to be written as a template.
pub type JobSpec = Mapping;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("input file {0} has no file name to derive an output name from")]
    MissingStem(PathBuf),
}

/// Build a job stamped with the local time.
pub fn build_job(
    input_files: &[PathBuf],
    result_dir: &Path,
    export_format: ExportFormat,
    microscopy: &Microscopy,
    deconvolution: &Deconvolution,
) -> Result<(Vec<PathBuf>, JobSpec), JobError> {
    build_job_at(
        input_files,
        result_dir,
        export_format,
        microscopy,
        deconvolution,
        Local::now().naive_local(),
    )
}

/// Build a job for `input_files`, returning the expected output path of each
/// input (same order) alongside the job description.
pub fn build_job_at(
    input_files: &[PathBuf],
    result_dir: &Path,
    export_format: ExportFormat,
    microscopy: &Microscopy,
    deconvolution: &Deconvolution,
    now: NaiveDateTime,
) -> Result<(Vec<PathBuf>, JobSpec), JobError> {
    check_microscopy(microscopy);

    let extension = export_format.extension();
    let mut job = Mapping::new();
    job.insert("info", tasks::info(now.format(tasks::DATE_FORMAT).to_string()));
    job.insert(TASK_LIST_KEY, Value::Seq(Vec::new()));
    job.push_task("setEnv");
    job.insert(
        "setEnv",
        tasks::set_env(path_atom(result_dir), export_format),
    );

    let mut output_paths = Vec::with_capacity(input_files.len());
    for (pos, input) in input_files.iter().enumerate() {
        info!("adding image {} to the workflow template", pos + 1);

        let stem = stem(input)?;
        let workflow_id = format!("workflowID:{pos}");
        job.push_task(&workflow_id);
        job.insert(
            workflow_id,
            workflow(input, &stem, microscopy, deconvolution),
        );

        output_paths.push(result_dir.join(format!("{stem}{extension}")));
    }

    Ok((output_paths, job))
}

fn workflow(
    input: &Path,
    stem: &str,
    microscopy: &Microscopy,
    deconvolution: &Deconvolution,
) -> Mapping {
    let mut wf = Mapping::new();
    wf.insert("info", tasks::workflow_info());
    wf.insert(TASK_LIST_KEY, Value::Seq(Vec::new()));
    wf.push_task("imgOpen");
    wf.insert("imgOpen", tasks::img_open(path_atom(input)));
    wf.push_task("setp");
    wf.insert("setp", tasks::setp(microscopy));

    for c in 0..microscopy.n_channels {
        let cmle_id = format!("cmle:{c}");
        wf.push_task(&cmle_id);
        wf.insert(cmle_id, tasks::cmle(deconvolution));
    }

    wf.push_task("imgSave");
    wf.insert("imgSave", tasks::img_save(stem.to_string()));
    wf
}

/// File name without its final extension: `/a/b/image.ome.tif` -> `image.ome`.
fn stem(input: &Path) -> Result<String, JobError> {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| JobError::MissingStem(input.to_path_buf()))
}

fn path_atom(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

/// Inputs the tool accepts but this builder does not tailor the job for.
fn check_microscopy(params: &Microscopy) {
    if params.micr == MicroscopeType::Confocal {
        warn!("confocal microscopes are accepted but setp is generated as for spinning disk");
    }
    for (name, values) in [("ex", &params.ex), ("em", &params.em)] {
        if values.len() != params.n_channels {
            warn!(
                "{} has {} wavelength(s) for {} channel(s); writing as given",
                name,
                values.len(),
                params.n_channels
            );
        }
    }
}
