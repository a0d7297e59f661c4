//! Stack describers backed by `describe-stack-resources` JSON
//!
//! Both describers consume the document printed by
//! `aws cloudformation describe-stack-resources`; one reads it from a saved
//! file, the other runs the AWS CLI.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use super::registry::{StackDescriber, StackDescription, StackResource};
use crate::common::{Error, Result};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeOutput {
    #[serde(default)]
    stack_resources: Vec<DescribedResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribedResource {
    stack_name: Option<String>,
    stack_id: Option<String>,
    logical_resource_id: String,
    physical_resource_id: Option<String>,
    resource_type: String,
}

impl DescribedResource {
    /// `stack` may be the stack name or its full stack ID
    fn belongs_to(&self, stack: &str) -> bool {
        match self.stack_name.as_deref() {
            None => true,
            Some(name) => name == stack || self.stack_id.as_deref() == Some(stack),
        }
    }
}

/// Parse `describe-stack-resources` output for `stack_name`
pub fn parse_describe_output(json: &str, stack_name: &str, region: &str) -> Result<StackDescription> {
    let output: DescribeOutput =
        serde_json::from_str(json).map_err(|e| Error::stack_describe(stack_name, e))?;

    if output
        .stack_resources
        .iter()
        .any(|r| !r.belongs_to(stack_name))
    {
        return Err(Error::StackNotFound {
            stack: stack_name.to_string(),
            region: region.to_string(),
        });
    }

    let stack_id = output
        .stack_resources
        .iter()
        .find_map(|r| r.stack_id.clone())
        .ok_or_else(|| Error::stack_describe(stack_name, "no stack ID in describe output"))?;

    let mut resources = Vec::with_capacity(output.stack_resources.len());
    for r in output.stack_resources {
        match r.physical_resource_id {
            Some(physical_id) => resources.push(StackResource {
                logical_id: r.logical_resource_id,
                physical_id,
                resource_type: r.resource_type,
            }),
            None => debug!(
                logical_id = %r.logical_resource_id,
                "Skipping resource without physical ID"
            ),
        }
    }

    Ok(StackDescription {
        stack_id,
        resources,
    })
}

/// Reads a saved describe-stack-resources document
#[derive(Debug, Clone)]
pub struct ResourceFile {
    path: PathBuf,
}

impl ResourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StackDescriber for ResourceFile {
    async fn describe(&self, stack_name: &str, region: &str) -> Result<StackDescription> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::FileRead {
                path: self.path.display().to_string(),
                error: e.to_string(),
            })?;
        parse_describe_output(&content, stack_name, region)
    }
}

/// Runs `aws cloudformation describe-stack-resources`
#[derive(Debug, Clone)]
pub struct AwsCliDescriber {
    program: String,
}

impl Default for AwsCliDescriber {
    fn default() -> Self {
        Self {
            program: "aws".to_string(),
        }
    }
}

impl AwsCliDescriber {
    /// Use a different executable in place of `aws`
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl StackDescriber for AwsCliDescriber {
    async fn describe(&self, stack_name: &str, region: &str) -> Result<StackDescription> {
        debug!(program = %self.program, stack = stack_name, region, "Describing stack");

        let output = TokioCommand::new(&self.program)
            .args([
                "cloudformation",
                "describe-stack-resources",
                "--stack-name",
                stack_name,
                "--region",
                region,
                "--output",
                "json",
            ])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::stack_describe(stack_name, format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = ?output.status.code(), stderr = %stderr.trim(), "describe-stack-resources failed");
            if stderr.contains("does not exist") {
                return Err(Error::StackNotFound {
                    stack: stack_name.to_string(),
                    region: region.to_string(),
                });
            }
            return Err(Error::stack_describe(stack_name, stderr.trim()));
        }

        parse_describe_output(&String::from_utf8_lossy(&output.stdout), stack_name, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIBE_JSON: &str = r#"{
        "StackResources": [
            {
                "StackName": "SampleStack",
                "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/SampleStack/6f2c",
                "LogicalResourceId": "ResultStore",
                "PhysicalResourceId": "SampleStack-ResultStore-1ABC",
                "ResourceType": "AWS::DynamoDB::Table",
                "Timestamp": "2024-01-01T00:00:00.000Z",
                "ResourceStatus": "CREATE_COMPLETE"
            },
            {
                "StackName": "SampleStack",
                "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/SampleStack/6f2c",
                "LogicalResourceId": "Pending",
                "ResourceType": "AWS::SQS::Queue",
                "ResourceStatus": "CREATE_FAILED"
            }
        ]
    }"#;

    #[test]
    fn test_parse_describe_output() {
        let description = parse_describe_output(DESCRIBE_JSON, "SampleStack", "us-east-1").unwrap();
        assert!(description.stack_id.ends_with("stack/SampleStack/6f2c"));
        assert_eq!(description.resources.len(), 1);
        assert_eq!(description.resources[0].logical_id, "ResultStore");
    }

    #[test]
    fn test_other_stack_is_not_found() {
        let err = parse_describe_output(DESCRIBE_JSON, "OtherStack", "us-east-1").unwrap_err();
        assert!(matches!(err, Error::StackNotFound { .. }));
    }

    #[test]
    fn test_stack_id_is_accepted_as_stack_name() {
        let stack_id = "arn:aws:cloudformation:us-east-1:123456789012:stack/SampleStack/6f2c";
        let description = parse_describe_output(DESCRIBE_JSON, stack_id, "us-east-1").unwrap();
        assert_eq!(description.stack_id, stack_id);
        assert_eq!(description.resources.len(), 1);

        let other = "arn:aws:cloudformation:us-east-1:123456789012:stack/SampleStack/ffff";
        let err = parse_describe_output(DESCRIBE_JSON, other, "us-east-1").unwrap_err();
        assert!(matches!(err, Error::StackNotFound { .. }));
    }

    #[test]
    fn test_empty_output_is_describe_error() {
        let err = parse_describe_output(r#"{"StackResources": []}"#, "S", "r").unwrap_err();
        assert!(matches!(err, Error::StackDescribe { .. }));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_resource_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        std::fs::write(&path, DESCRIBE_JSON).unwrap();

        let describer = ResourceFile::new(&path);
        let description = describer.describe("SampleStack", "us-east-1").await.unwrap();
        assert_eq!(description.resources.len(), 1);

        let missing = ResourceFile::new(dir.path().join("missing.json"));
        let err = missing.describe("SampleStack", "us-east-1").await.unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_aws_cli_describer_with_stub_program() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("out.json");
        std::fs::write(&json_path, DESCRIBE_JSON).unwrap();

        let script = dir.path().join("fake-aws");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\ncase \"$4\" in\n  SampleStack) cat '{}' ;;\n  *) echo \"Stack with id $4 does not exist\" >&2; exit 254 ;;\nesac\n",
                json_path.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let describer = AwsCliDescriber::with_program(script.display().to_string());
        let description = describer.describe("SampleStack", "us-east-1").await.unwrap();
        assert_eq!(description.resources[0].physical_id, "SampleStack-ResultStore-1ABC");

        let err = describer.describe("Gone", "us-east-1").await.unwrap_err();
        assert!(matches!(err, Error::StackNotFound { .. }));
    }
}
