pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod normalize;
pub mod transform;

pub use config::SdkgenConfig;
pub use error::{ArtifactError, ConfigError, GenerateError, JobFailure, ParseError, SinkError};
pub use generate::artifact::{Artifact, ArtifactKind, ArtifactMap};
pub use generate::job::{GenerationJob, JobPayload};
pub use generate::orchestrator::Orchestrator;
pub use generate::sink::{ArtifactSink, DirectorySink};
pub use generate::{Emitter, generate};
pub use normalize::{Normalized, normalize};
