//! CDK cloud assembly manifest
//!
//! CDK names resources by construct path (`/Stack/Handler/Resource`) while
//! the deployed stack knows them by logical ID (`HandlerB2CE1ACF`). The
//! manifest records the mapping under `aws:cdk:logicalId` metadata.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::common::{Error, Result};

const LOGICAL_ID_METADATA: &str = "aws:cdk:logicalId";

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    artifacts: HashMap<String, RawArtifact>,
}

#[derive(Deserialize)]
struct RawArtifact {
    #[serde(default)]
    metadata: HashMap<String, Vec<RawMetadata>>,
}

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Construct ID to logical ID mapping, per stack
#[derive(Debug, Clone, Default)]
pub struct CdkManifest {
    stacks: HashMap<String, HashMap<String, String>>,
}

impl CdkManifest {
    /// Parse a `manifest.json` document
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawManifest =
            serde_json::from_str(json).map_err(|e| Error::ManifestParse(e.to_string()))?;

        let mut stacks = HashMap::new();
        for (stack, artifact) in raw.artifacts {
            let prefix = format!("/{stack}/");
            let mut ids = HashMap::new();

            for (path, entries) in &artifact.metadata {
                let Some(construct) = path
                    .strip_prefix(&prefix)
                    .and_then(|p| p.strip_suffix("/Resource"))
                else {
                    continue;
                };

                for entry in entries.iter().filter(|e| e.kind == LOGICAL_ID_METADATA) {
                    let logical_id = entry.data.as_str().ok_or_else(|| {
                        Error::ManifestParse(format!(
                            "metadata for '{path}' is not a string: {}",
                            entry.data
                        ))
                    })?;
                    ids.insert(construct.to_string(), logical_id.to_string());
                }
            }

            if !ids.is_empty() {
                stacks.insert(stack, ids);
            }
        }

        Ok(Self { stacks })
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Logical ID recorded for `construct_id` within `stack`
    pub fn logical_id(&self, stack: &str, construct_id: &str) -> Option<&str> {
        self.stacks
            .get(stack)
            .and_then(|ids| ids.get(construct_id))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "version": "21.0.0",
        "artifacts": {
            "SampleStack": {
                "type": "aws:cloudformation:stack",
                "environment": "aws://unknown-account/unknown-region",
                "properties": { "templateFile": "SampleStack.template.json" },
                "metadata": {
                    "/SampleStack/Trigger/Resource": [
                        { "type": "aws:cdk:logicalId", "data": "TriggerF3B1A9C2" }
                    ],
                    "/SampleStack/Api/Handler/Resource": [
                        { "type": "aws:cdk:logicalId", "data": "ApiHandler5E7490E8" }
                    ],
                    "/SampleStack/CDKMetadata/Default": [
                        { "type": "aws:cdk:logicalId", "data": "CDKMetadata" }
                    ]
                }
            },
            "Tree": { "type": "cdk:tree" }
        }
    }"#;

    #[test]
    fn test_lookup() {
        let manifest = CdkManifest::parse(MANIFEST).unwrap();
        assert_eq!(
            manifest.logical_id("SampleStack", "Trigger"),
            Some("TriggerF3B1A9C2")
        );
        assert_eq!(
            manifest.logical_id("SampleStack", "Api/Handler"),
            Some("ApiHandler5E7490E8")
        );
        assert_eq!(manifest.logical_id("SampleStack", "CDKMetadata"), None);
        assert_eq!(manifest.logical_id("OtherStack", "Trigger"), None);
    }

    #[test]
    fn test_non_string_data_rejected() {
        let json = r#"{"artifacts":{"S":{"metadata":{"/S/T/Resource":[{"type":"aws:cdk:logicalId","data":42}]}}}}"#;
        let err = CdkManifest::parse(json).unwrap_err();
        assert!(matches!(err, Error::ManifestParse(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CdkManifest::parse("{").unwrap_err(),
            Error::ManifestParse(_)
        ));
    }
}
