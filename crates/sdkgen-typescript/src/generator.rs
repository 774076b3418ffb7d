use minijinja::Environment;
use sdkgen_core::{Artifact, ArtifactKind, Emitter, GenerationJob, JobPayload};

use crate::emitters::{self, DEFINITIONS_DIR};
use crate::error::EmitError;

/// File extension handled by this emitter.
pub const EXTENSION: &str = "ts";

/// TypeScript SDK emitter.
///
/// Templates are parsed once at construction and shared by every worker.
pub struct TypescriptEmitter {
    env: Environment<'static>,
}

impl TypescriptEmitter {
    pub fn new() -> Result<Self, EmitError> {
        Ok(Self {
            env: emitters::environment()?,
        })
    }

    /// Whether `extension` (with or without a leading dot) selects this emitter.
    pub fn handles(extension: &str) -> bool {
        extension.strip_prefix('.').unwrap_or(extension) == EXTENSION
    }
}

impl Emitter for TypescriptEmitter {
    type Error = EmitError;

    fn extension(&self) -> &str {
        EXTENSION
    }

    fn emit(&self, job: &GenerationJob<'_>) -> Result<Artifact, EmitError> {
        let env = &self.env;
        let artifact = match &job.payload {
            JobPayload::Client {
                meta,
                host,
                base_path,
                paths,
            } => Artifact::new(
                job.kind,
                "",
                "api-client.ts",
                emitters::client::emit_client(env, meta, host, base_path, paths)?,
            ),
            JobPayload::Models(defs) => definition_file(
                job.kind,
                emitters::models::emit_models(env, defs)?,
            ),
            JobPayload::Enums(defs) => {
                definition_file(job.kind, emitters::enums::emit_enums(env, defs)?)
            }
            JobPayload::Requests { paths, bodies } => definition_file(
                job.kind,
                emitters::requests::emit_requests(env, paths, bodies)?,
            ),
            JobPayload::Responses(defs) => definition_file(
                job.kind,
                emitters::responses::emit_responses(env, defs)?,
            ),
            JobPayload::Validation(objects) => definition_file(
                job.kind,
                emitters::validation::emit_validation(env, objects)?,
            ),
        };
        log::debug!("generated {}", artifact.path());
        Ok(artifact)
    }

    fn static_artifacts(&self) -> Vec<Artifact> {
        emitters::statics::static_artifacts()
    }
}

/// `definitions/<kind>.ts`.
fn definition_file(kind: ArtifactKind, body: String) -> Artifact {
    Artifact::new(kind, DEFINITIONS_DIR, format!("{kind}.{EXTENSION}"), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_extension() {
        assert!(TypescriptEmitter::handles("ts"));
        assert!(TypescriptEmitter::handles(".ts"));
        assert!(!TypescriptEmitter::handles("py"));
        assert!(!TypescriptEmitter::handles("..ts"));
    }

    #[test]
    fn test_definition_file_path() {
        let artifact = definition_file(ArtifactKind::Validation, String::new());
        assert_eq!(artifact.path(), "definitions/validation.ts");
    }
}
