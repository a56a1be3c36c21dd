//! `engrave batch`
//!
//! Jobs run one after another through a single session, so every job
//! supersedes the one before it and backgrounds are shared through the
//! session's cache.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use engrave_core::EffectParameters;
use engrave_export::{write_to_file, PngExporter};
use serde::Deserialize;

use crate::cli::BatchArgs;

/// One JSONL line
#[derive(Debug, Deserialize)]
pub struct BatchJob {
    #[serde(flatten)]
    pub params: EffectParameters,
    /// File name inside the output directory
    #[serde(default)]
    pub output: Option<String>,
}

impl BatchJob {
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    fn output_path(&self, args: &BatchArgs, number: usize) -> PathBuf {
        match &self.output {
            Some(name) => args.output_dir.join(name),
            None => args.output_dir.join(args.pattern.replace("{}", &number.to_string())),
        }
    }
}

pub fn run(args: &BatchArgs) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let (mut session, wait) = super::session(&args.session)?;
    let exporter = PngExporter::new();

    let mut jobs = 0;
    let mut failed = 0;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        jobs += 1;

        let job = match BatchJob::parse(&line) {
            Ok(job) => job,
            Err(e) => {
                eprintln!("Line {}: invalid job: {}", index + 1, e);
                failed += 1;
                continue;
            },
        };

        let output = job.output_path(args, jobs);
        log::debug!("Job {}: \"{}\" -> {}", jobs, job.params.text, output.display());

        let result = session
            .render(&job.params, wait)
            .and_then(|image| write_to_file(&exporter, &image, &output));
        if let Err(e) = result {
            eprintln!("Job {}: {}", jobs, e);
            failed += 1;
        }
    }

    eprintln!("Batch complete: {} jobs, {} failed", jobs, failed);
    if failed > 0 {
        bail!("{} of {} jobs failed", failed, jobs);
    }
    Ok(())
}
