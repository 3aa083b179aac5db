//! Generate and parse batch processing templates for the Huygens
//! deconvolution tool.
//!
//! - `job`: typed parameters -> job description (`build_job`)
//! - `template`: job description <-> brace-delimited template text
//! - `value`: the nested value model both sides share

pub mod job;
pub mod params;
pub mod template;
pub mod value;

pub type Result<T> = anyhow::Result<T>;
