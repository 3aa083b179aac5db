use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use huygens_batch::Result;
use huygens_batch::params::{ExportFormat, JobParams};
use huygens_batch::template::{self, PromotionRules};
use huygens_batch::value::{self, Value};
use huygens_batch::job;

#[derive(Parser)]
#[command(name = "huygens-batch")]
#[command(about = "Generate and inspect Huygens batch processing templates", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a batch template deconvolving every input image.
    Create {
        /// Directory the tool writes results into.
        #[arg(long)]
        result_dir: PathBuf,

        /// Template file to write.
        #[arg(short = 'o', long)]
        out: PathBuf,

        /// JSON file with export_format / microscopy / deconvolution settings.
        #[arg(long)]
        params: Option<PathBuf>,

        /// Export format (overrides the params file).
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Channel count (overrides the params file).
        #[arg(long)]
        channels: Option<usize>,

        #[arg(long, default_value = template::DEFAULT_COMMENT)]
        comment: String,

        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print a template as JSON.
    Parse {
        template: PathBuf,

        /// Emit the token tree without turning lists into mappings.
        #[arg(long)]
        raw: bool,

        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// List every step of a template in taskList order.
    Tasks { template: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli.cmd)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Create {
            result_dir,
            out,
            params,
            format,
            channels,
            comment,
            inputs,
        } => {
            let mut job_params = match &params {
                Some(path) => JobParams::load(path)?,
                None => JobParams::default(),
            };
            if let Some(format) = format {
                job_params.export_format = format;
            }
            if let Some(n) = channels {
                job_params.microscopy.n_channels = n;
            }

            let (output_paths, spec) = job::build_job(
                &inputs,
                &result_dir,
                job_params.export_format,
                &job_params.microscopy,
                &job_params.deconvolution,
            )?;
            template::write_template(&out, &spec, &comment)?;
            info!("wrote template {} ({} workflows)", out.display(), inputs.len());

            for path in output_paths {
                println!("{}", path.display());
            }
        }

        Commands::Parse { template, raw, out } => {
            let tokens = template::parse_file(&template)?;
            let json = if raw {
                serde_json::to_string_pretty(&tokens)?
            } else {
                let config = template::to_config(tokens)
                    .with_context(|| format!("promote {}", template.display()))?;
                serde_json::to_string_pretty(&config)?
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("write {}", path.display()))?;
                    info!("wrote {}", path.display());
                }
                None => println!("{json}"),
            }
        }

        Commands::Tasks { template } => {
            let config = template::read_config(&template, &PromotionRules::default())?;
            for line in task_lines(&config) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// `<step>` per top-level step, followed by `<step>: <substeps...>` when the
/// step carries its own taskList.
fn task_lines(config: &value::Mapping) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, entry) in config.tasks() {
        let Some(entry) = entry else {
            warn!("taskList names {} but the template has no such entry", name);
            continue;
        };
        match entry.as_map().and_then(|m| m.step_names(value::TASK_LIST_KEY)) {
            Some(steps) => lines.push(format!("{}: {}", name, steps.join(" "))),
            None => lines.push(name.to_string()),
        }
        if let Value::Map(m) = entry {
            for (step, sub) in m.tasks() {
                if sub.is_none() {
                    warn!("{} lists step {} but has no entry for it", name, step);
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_args_parse() {
        let cli = Cli::try_parse_from([
            "huygens-batch",
            "-vv",
            "create",
            "--result-dir",
            "/out",
            "-o",
            "job.hgsb",
            "--format",
            "ome",
            "--channels",
            "2",
            "a.tif",
            "b.tif",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.cmd {
            Commands::Create {
                format,
                channels,
                inputs,
                comment,
                ..
            } => {
                assert_eq!(format, Some(ExportFormat::OmeXml));
                assert_eq!(channels, Some(2));
                assert_eq!(inputs, vec![PathBuf::from("a.tif"), PathBuf::from("b.tif")]);
                assert_eq!(comment, template::DEFAULT_COMMENT);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let res = Cli::try_parse_from([
            "huygens-batch",
            "create",
            "--result-dir",
            "/out",
            "-o",
            "job.hgsb",
            "--format",
            "png",
            "a.tif",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn create_then_parse_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("job.hgsb");
        let params = dir.path().join("params.json");
        std::fs::write(&params, r#"{"microscopy": {"n_channels": 2, "ex": [488, 561], "em": [515, 590]}}"#)
            .unwrap();

        run(Commands::Create {
            result_dir: PathBuf::from("/results"),
            out: out.clone(),
            params: Some(params),
            format: Some(ExportFormat::Hdf5),
            channels: None,
            comment: "test".to_string(),
            inputs: vec![PathBuf::from("/raw/a.ome.tif"), PathBuf::from("/raw/b.tif")],
        })
        .unwrap();

        let config = template::read_config(&out, &PromotionRules::default()).unwrap();
        assert_eq!(
            task_lines(&config),
            vec![
                "setEnv".to_string(),
                "workflowID:0: imgOpen setp cmle:0 cmle:1 imgSave".to_string(),
                "workflowID:1: imgOpen setp cmle:0 cmle:1 imgSave".to_string(),
            ]
        );

        let json_out = dir.path().join("job.json");
        run(Commands::Parse {
            template: out,
            raw: false,
            out: Some(json_out.clone()),
        })
        .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_out).unwrap()).unwrap();
        assert_eq!(json["setEnv"]["exportFormat"]["type"], "hdf5");
        assert_eq!(json["workflowID:1"]["imgSave"]["rootName"][0], "b");
    }

    #[test]
    fn task_lines_skip_missing_entries() {
        let config = template::to_config(
            template::parse("taskList {setEnv gone}\nsetEnv {resultDir /out}").unwrap(),
        )
        .unwrap();
        assert_eq!(task_lines(&config), vec!["setEnv".to_string()]);
    }
}
