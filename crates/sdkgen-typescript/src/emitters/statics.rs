use sdkgen_core::{Artifact, ArtifactKind};

use super::DEFINITIONS_DIR;

/// Files shipped verbatim with every generated SDK.
pub fn static_artifacts() -> Vec<Artifact> {
    vec![
        Artifact::new(
            ArtifactKind::Static,
            "",
            "index.ts",
            include_str!("../../static/index.ts"),
        ),
        Artifact::new(
            ArtifactKind::Static,
            DEFINITIONS_DIR,
            "index.ts",
            include_str!("../../static/definitions_index.ts"),
        ),
        Artifact::new(
            ArtifactKind::Static,
            DEFINITIONS_DIR,
            "base.ts",
            include_str!("../../static/base.ts"),
        ),
        Artifact::new(
            ArtifactKind::Static,
            DEFINITIONS_DIR,
            "countries.ts",
            include_str!("../../static/countries.ts"),
        ),
    ]
}
