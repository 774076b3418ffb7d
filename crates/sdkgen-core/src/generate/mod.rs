//! Job planning, concurrent emission and artifact persistence.

pub mod artifact;
pub mod job;
pub mod orchestrator;
pub mod sink;

use std::fmt;

use crate::config::Tables;
use crate::error::GenerateError;
use crate::model::Document;
use crate::transform::{PropertyPolicy, ValidationCompiler};

use artifact::{Artifact, ArtifactMap};
use job::{GenerationJob, plan_jobs};
use orchestrator::Orchestrator;

/// Renders one artifact category for a target language.
///
/// Implementations are shared across worker threads and must not depend on
/// the output of other jobs.
pub trait Emitter: Sync {
    type Error: fmt::Display;

    /// File extension of the target language, without the dot.
    fn extension(&self) -> &str;

    fn emit(&self, job: &GenerationJob<'_>) -> Result<Artifact, Self::Error>;

    /// Literal files emitted verbatim alongside the generated ones.
    fn static_artifacts(&self) -> Vec<Artifact>;
}

/// Compile validation rules, plan the jobs and run them through `orchestrator`.
///
/// Returns every artifact sorted by path, or the collected job failures once
/// all jobs have finished.
pub fn generate<E: Emitter>(
    document: &Document,
    tables: &Tables,
    emitter: &E,
    orchestrator: &Orchestrator,
) -> Result<Vec<Artifact>, GenerateError> {
    let policy = PropertyPolicy::new(&tables.policy);
    let validation = ValidationCompiler::new(&tables.validation, &policy).compile(document);
    log::debug!("compiled {} validation objects", validation.len());

    let artifacts = ArtifactMap::new();
    for artifact in emitter.static_artifacts() {
        artifacts.insert_once(artifact)?;
    }

    let jobs = plan_jobs(document, validation);
    let failures = orchestrator.run(emitter, jobs, &artifacts);
    if !failures.is_empty() {
        return Err(GenerateError::JobsFailed(failures));
    }
    Ok(artifacts.into_sorted())
}
