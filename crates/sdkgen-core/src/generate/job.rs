use std::collections::BTreeMap;

use crate::model::{Definition, Document, DocumentMeta, Path};
use crate::transform::ValidationObject;

use super::artifact::ArtifactKind;

const RESPONSE_BODY_MARKER: &str = "ResponseBody";
const REQUEST_BODY_MARKER: &str = "RequestBody";

/// One unit of generation work: an artifact category plus the read-only
/// document slice it renders. Slices are pre-sorted by key.
#[derive(Debug, Clone)]
pub struct GenerationJob<'d> {
    pub kind: ArtifactKind,
    pub payload: JobPayload<'d>,
}

#[derive(Debug, Clone)]
pub enum JobPayload<'d> {
    Client {
        meta: &'d DocumentMeta,
        host: &'d str,
        base_path: &'d str,
        paths: Vec<&'d Path>,
    },
    Models(Vec<&'d Definition>),
    Enums(Vec<&'d Definition>),
    Requests {
        paths: Vec<&'d Path>,
        /// Request body definitions routed out of models.
        bodies: Vec<&'d Definition>,
    },
    Responses(Vec<&'d Definition>),
    Validation(Vec<ValidationObject>),
}

/// Whether a definition is a response wrapper that belongs with responses.
pub fn is_response_body(definition: &Definition) -> bool {
    definition.key.contains(RESPONSE_BODY_MARKER)
}

/// Whether a definition is a request body that belongs with requests.
pub fn is_request_body(definition: &Definition) -> bool {
    definition.key.contains(REQUEST_BODY_MARKER)
}

/// Build the fixed set of jobs for a document, one per category.
///
/// Models are object definitions that are neither request bodies nor
/// response wrappers; enums are every enum definition. Request bodies go to
/// the requests job, and responses are the `responses` section plus the
/// wrapper definitions.
pub fn plan_jobs<'d>(
    document: &'d Document,
    validation: BTreeMap<String, ValidationObject>,
) -> Vec<GenerationJob<'d>> {
    let definitions = document.sorted_definitions();
    let paths = document.sorted_paths();

    let models: Vec<&Definition> = definitions
        .iter()
        .copied()
        .filter(|d| !d.is_enum() && !is_response_body(d) && !is_request_body(d))
        .collect();
    let bodies: Vec<&Definition> = definitions
        .iter()
        .copied()
        .filter(|d| !d.is_enum() && is_request_body(d))
        .collect();
    let enums: Vec<&Definition> = definitions.iter().copied().filter(|d| d.is_enum()).collect();

    let mut responses: Vec<&Definition> = document
        .sorted_responses()
        .into_iter()
        .chain(
            definitions
                .iter()
                .copied()
                .filter(|d| !d.is_enum() && is_response_body(d)),
        )
        .collect();
    responses.sort_by(|a, b| a.key.cmp(&b.key));

    vec![
        GenerationJob {
            kind: ArtifactKind::Client,
            payload: JobPayload::Client {
                meta: &document.meta,
                host: &document.host,
                base_path: &document.base_path,
                paths: paths.clone(),
            },
        },
        GenerationJob {
            kind: ArtifactKind::Models,
            payload: JobPayload::Models(models),
        },
        GenerationJob {
            kind: ArtifactKind::Enums,
            payload: JobPayload::Enums(enums),
        },
        GenerationJob {
            kind: ArtifactKind::Requests,
            payload: JobPayload::Requests { paths, bodies },
        },
        GenerationJob {
            kind: ArtifactKind::Responses,
            payload: JobPayload::Responses(responses),
        },
        GenerationJob {
            kind: ArtifactKind::Validation,
            payload: JobPayload::Validation(validation.into_values().collect()),
        },
    ]
}
