//! The ordered list of transformations applied to parsed files.
//!
//! A [Pipeline] is put together once with a [PipelineBuilder] and is read only afterwards, so a
//! single instance can be shared by every worker through an `Arc`.

use crate::compiler::hints::Hints;
use crate::compiler::passes::StringCoercion;
use std::fmt::Debug;
use sugo_ast::File;
use thiserror::Error;
use tracing::{debug, instrument, trace};

/// A named transformation of a whole file
pub trait Pass: Debug + Send + Sync {
    /// The unique name of this pass
    fn name(&self) -> &str;

    /// Whether this pass would change `file`. Must not have side effects.
    fn wants(&self, file: &File, hints: &Hints) -> bool;

    /// Import paths that must be available before [Pass::apply] runs
    fn required_imports(&self) -> &[&str] {
        &[]
    }

    /// Transforms `file` and returns whether anything changed
    fn apply(&self, file: &mut File, hints: &Hints) -> bool;
}

/// Builds a [Pipeline]
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    passes: Vec<Box<dyn Pass>>,
}

impl PipelineBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pass that runs after every pass registered so far
    pub fn register<P: Pass + 'static>(mut self, pass: P) -> Result<Self, PipelineError> {
        if self.passes.iter().any(|p| p.name() == pass.name()) {
            return Err(PipelineError::DuplicatePass(pass.name().to_string()));
        }
        debug!("registered pass {}", pass.name());
        self.passes.push(Box::new(pass));
        Ok(self)
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            passes: self.passes,
        }
    }
}

/// An error while registering passes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("a pass named {0:?} is already registered")]
    DuplicatePass(String),
}

/// Runs passes over the files of package `main`
#[derive(Debug)]
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Pipeline {
    /// Creates the default PipelineBuilder
    #[inline]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// A pipeline that never changes anything
    pub fn empty() -> Self {
        PipelineBuilder::new().build()
    }

    /// The passes every sugo program goes through
    pub fn standard() -> Self {
        Self {
            passes: vec![Box::new(StringCoercion)],
        }
    }

    /// The names of the passes, in the order they run
    pub fn passes(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|p| p.name())
    }

    /// Runs every pass once, in registration order. Files of other packages are left alone.
    #[instrument(skip_all, fields(package = file.pkg_name.value()))]
    pub fn run(&self, file: &mut File) -> PipelineReport {
        let mut report = PipelineReport::default();
        if !file.is_main_package() {
            trace!("not the main package");
            return report;
        }

        for pass in &self.passes {
            // hints are recollected since an earlier pass may have changed the tree
            let hints = Hints::collect(file);
            if !pass.wants(file, &hints) {
                trace!("{} declined", pass.name());
                continue;
            }
            for import in pass.required_imports() {
                if file.add_import(import) {
                    report.imports.push(import.to_string());
                }
            }
            if pass.apply(file, &hints) {
                debug!("{} changed the file", pass.name());
                report.changed.push(pass.name().to_string());
            }
        }
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// What a [Pipeline::run] did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// The passes that changed the file, in the order they ran
    pub changed: Vec<String>,
    /// The import paths that were added
    pub imports: Vec<String>,
}

impl PipelineReport {
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty() && self.imports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use sugo_ast_parsing::parse_source;
    use sugo_ast_parsing::parser::error::SyntaxError;
    use sugo_ast_parsing::parser::Mode;
    use test_log::test;

    fn parse(src: &str) -> File {
        let mut errors: Vec<SyntaxError> = vec![];
        parse_source("pipeline.sugo", src.as_bytes(), &mut errors, Mode::default())
            .expect("no errors")
    }

    /// Records the order passes are asked in
    #[derive(Debug)]
    struct Probe {
        name: &'static str,
        wants: bool,
        asked: Arc<AtomicUsize>,
        order: Arc<AtomicUsize>,
    }

    impl Pass for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn wants(&self, _file: &File, _hints: &Hints) -> bool {
            self.order
                .store(self.asked.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
            self.wants
        }

        fn required_imports(&self) -> &[&str] {
            &["strings"]
        }

        fn apply(&self, _file: &mut File, _hints: &Hints) -> bool {
            true
        }
    }

    fn probe(name: &'static str, wants: bool, asked: &Arc<AtomicUsize>) -> (Probe, Arc<AtomicUsize>) {
        let order = Arc::new(AtomicUsize::new(usize::MAX));
        let probe = Probe {
            name,
            wants,
            asked: asked.clone(),
            order: order.clone(),
        };
        (probe, order)
    }

    #[test]
    fn test_duplicate_pass_is_rejected() {
        let asked = Arc::new(AtomicUsize::new(0));
        let result = Pipeline::builder()
            .register(probe("a", true, &asked).0)
            .and_then(|b| b.register(probe("a", false, &asked).0));
        assert_eq!(
            result.map(|_| ()),
            Err(PipelineError::DuplicatePass("a".to_string()))
        );
    }

    #[test]
    fn test_passes_run_in_registration_order() {
        let asked = Arc::new(AtomicUsize::new(0));
        let (first, first_order) = probe("first", false, &asked);
        let (second, second_order) = probe("second", true, &asked);
        let pipeline = Pipeline::builder()
            .register(first)
            .and_then(|b| b.register(second))
            .expect("unique names")
            .build();
        assert_eq!(pipeline.passes().collect::<Vec<_>>(), ["first", "second"]);

        let mut file = parse("println(1)\n");
        let report = pipeline.run(&mut file);
        assert_eq!(first_order.load(Ordering::SeqCst), 0);
        assert_eq!(second_order.load(Ordering::SeqCst), 1);
        assert_eq!(report.changed, ["second"]);
        assert_eq!(report.imports, ["strings"]);
        assert!(file.imports_path("strings"));
    }

    #[test]
    fn test_other_packages_are_skipped() {
        let asked = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::builder()
            .register(probe("p", true, &asked).0)
            .expect("unique names")
            .build();
        let mut file = parse("package lib\nfunc F() {}\n");
        let before = file.clone();
        assert!(pipeline.run(&mut file).is_unchanged());
        assert_eq!(asked.load(Ordering::SeqCst), 0);
        assert_eq!(file, before);
    }

    #[test]
    fn test_pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
        assert_eq!(Pipeline::default().passes().collect::<Vec<_>>(), ["string-coercion"]);
    }
}
