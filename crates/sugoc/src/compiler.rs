//! Responsible with turning sugo files into plain syntax trees

use crate::compiler::pipeline::{Pipeline, PipelineReport};
use prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sugo_ast::File;
use sugo_ast_parsing::parse_source;
use sugo_ast_parsing::parser::error::SyntaxError;
use sugo_ast_parsing::parser::Mode;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error_span, info, instrument, warn};

pub mod error;
pub mod hints;
pub mod passes;
pub mod pipeline;

/// Prelude that can be used in inner modules.
mod prelude {
    use super::*;
    pub use error::{SugoCError, SugoCErrorKind, SugoCResult};
}

/// Parses sugo files and runs the transformation pipeline over them.
///
/// Must be configured using an [SugoCBuilder].
#[derive(Debug, Clone)]
pub struct SugoC {
    max_jobs: usize,
    mode: Mode,
    pipeline: Arc<Pipeline>,
}

impl SugoC {
    /// Creates the default SugoCBuilder
    #[inline]
    pub fn builder() -> SugoCBuilder {
        SugoCBuilder::new()
    }

    pub fn jobs(&self) -> usize {
        self.max_jobs
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Compile a file at a given path
    pub async fn compile(&self, path: &Path) -> SugoCResult<Unit> {
        let mut units = self.compile_all(vec![path.to_path_buf()]).await?;
        Ok(units.remove(0))
    }

    /// Compiles every file, running at most [jobs](SugoCBuilder::jobs) at once.
    ///
    /// The units are returned in the order of `paths`. If any file fails, every failure is
    /// returned instead.
    #[instrument(skip_all, fields(files = paths.len(), jobs = self.max_jobs))]
    pub async fn compile_all(&self, paths: Vec<PathBuf>) -> SugoCResult<Vec<Unit>> {
        let total = paths.len();
        let mut results: Vec<Option<SugoCResult<Unit>>> = (0..total).map(|_| None).collect();
        let mut join_set = JoinSet::new();

        for (index, path) in paths.into_iter().enumerate() {
            while join_set.len() >= self.max_jobs {
                if let Some(joined) = join_set.join_next().await {
                    let (index, result) = finished(joined);
                    results[index] = Some(result);
                }
            }
            let mode = self.mode;
            let pipeline = self.pipeline.clone();
            let span = error_span!("compile", path = %path.display());
            join_set.spawn_blocking(move || {
                (index, span.in_scope(|| compile_file(&path, mode, &pipeline)))
            });
        }
        while let Some(joined) = join_set.join_next().await {
            let (index, result) = finished(joined);
            results[index] = Some(result);
        }

        let mut units = Vec::with_capacity(total);
        let mut errors = vec![];
        for result in results.into_iter().flatten() {
            match result {
                Ok(unit) => units.push(unit),
                Err(e) => errors.push(e),
            }
        }
        match errors.len() {
            0 => {
                info!("compiled {} file(s)", units.len());
                Ok(units)
            }
            1 => Err(errors.remove(0)),
            n => {
                warn!("{n} of {total} file(s) failed");
                Err(SugoCError::from(errors))
            }
        }
    }
}

fn finished(
    joined: Result<(usize, SugoCResult<Unit>), tokio::task::JoinError>,
) -> (usize, SugoCResult<Unit>) {
    match joined {
        Ok(finished) => finished,
        Err(e) => std::panic::resume_unwind(e.into_panic()),
    }
}

fn compile_file(path: &Path, mode: Mode, pipeline: &Pipeline) -> SugoCResult<Unit> {
    let src = fs::read(path)?;
    let filename = path.to_string_lossy();
    let mut diagnostics: Vec<SyntaxError> = vec![];
    let mut file = match parse_source(&filename, &src, &mut diagnostics, mode) {
        Ok(file) => file,
        Err(failure) => {
            debug!("{} syntax error(s)", failure.count);
            if diagnostics.is_empty() {
                diagnostics.push(failure.first);
            }
            return Err(SugoCErrorKind::Parse {
                path: path.to_path_buf(),
                diagnostics,
            }
            .into());
        }
    };
    let report = pipeline.run(&mut file);
    debug!("pipeline report: {report:?}");
    Ok(Unit {
        path: path.to_path_buf(),
        file,
        report,
    })
}

/// A successfully compiled file
#[derive(Debug, Clone)]
pub struct Unit {
    pub path: PathBuf,
    pub file: File,
    /// What the pipeline did to `file`
    pub report: PipelineReport,
}

/// Builder for creating a [SugoC] instance.
#[derive(Debug)]
pub struct SugoCBuilder {
    /// Number of jobs to run at once
    pub jobs: usize,
    pub mode: Mode,
    pub pipeline: Arc<Pipeline>,
}

impl SugoCBuilder {
    /// Creates an SugoCBuilder with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of files processed at once
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Sets the checks performed while parsing
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the pipeline the main package goes through
    pub fn pipeline(mut self, pipeline: impl Into<Arc<Pipeline>>) -> Self {
        self.pipeline = pipeline.into();
        self
    }

    /// Builds an [SugoC] instance from this builder
    pub fn build(self) -> Result<SugoC, BuildSugoCError> {
        if self.jobs == 0 {
            return Err(BuildSugoCError::ZeroJobs);
        }
        Ok(SugoC {
            max_jobs: self.jobs,
            mode: self.mode,
            pipeline: self.pipeline,
        })
    }
}

impl Default for SugoCBuilder {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get(),
            mode: Mode::default(),
            pipeline: Arc::new(Pipeline::standard()),
        }
    }
}

/// An error occurred while building an [SugoC] instance
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildSugoCError {
    #[error("Compilation can't occur if no jobs are allowed")]
    ZeroJobs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_jobs() {
        assert_eq!(
            SugoC::builder().jobs(0).build().map(|_| ()),
            Err(BuildSugoCError::ZeroJobs)
        );
    }

    #[test]
    fn test_defaults() {
        let sugoc = SugoC::builder().build().expect("default builder is valid");
        assert_eq!(sugoc.jobs(), num_cpus::get());
        assert_eq!(sugoc.mode(), Mode::default());
        assert_eq!(
            sugoc.pipeline().passes().collect::<Vec<_>>(),
            ["string-coercion"]
        );
    }
}
