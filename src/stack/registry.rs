//! Stack resource registry
//!
//! Maps logical IDs to physical resources for one stack. Populated by a
//! single describe call and read-only afterwards: a resource created after
//! the registry was loaded stays invisible for the rest of the run.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use super::arn::Arn;
use super::manifest::CdkManifest;
use crate::common::Result;

/// One resource of a deployed stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackResource {
    pub logical_id: String,
    pub physical_id: String,
    /// Stack resource type, e.g. `AWS::DynamoDB::Table`
    pub resource_type: String,
}

impl StackResource {
    pub fn new(
        logical_id: impl Into<String>,
        physical_id: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            physical_id: physical_id.into(),
            resource_type: resource_type.into(),
        }
    }
}

/// Everything a describe call returns about a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDescription {
    /// ARN of the stack itself; the account ID is read from it
    pub stack_id: String,
    pub resources: Vec<StackResource>,
}

/// Source of stack descriptions
#[async_trait]
pub trait StackDescriber: Send + Sync {
    /// Describe every resource of `stack_name`.
    ///
    /// Fails with [`crate::Error::StackNotFound`] when the stack does not
    /// exist and [`crate::Error::StackDescribe`] for any other failure.
    async fn describe(&self, stack_name: &str, region: &str) -> Result<StackDescription>;
}

/// Cached resource lookup for one stack in one region
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    stack_name: String,
    region: String,
    account: String,
    resources: HashMap<String, StackResource>,
    manifest: Option<CdkManifest>,
}

impl ResourceRegistry {
    /// Describe the stack once and cache the result
    pub async fn load(
        describer: &dyn StackDescriber,
        stack_name: &str,
        region: &str,
    ) -> Result<Self> {
        let description = describer.describe(stack_name, region).await?;
        let registry = Self::from_description(stack_name, region, description)?;
        info!(
            stack = stack_name,
            region,
            resources = registry.resources.len(),
            "Loaded stack resources"
        );
        Ok(registry)
    }

    /// Build a registry from an already fetched description
    pub fn from_description(
        stack_name: &str,
        region: &str,
        description: StackDescription,
    ) -> Result<Self> {
        let account = Arn::parse(&description.stack_id)?.account().to_string();
        let resources = description
            .resources
            .into_iter()
            .map(|r| (r.logical_id.clone(), r))
            .collect();

        Ok(Self {
            stack_name: stack_name.to_string(),
            region: region.to_string(),
            account,
            resources,
            manifest: None,
        })
    }

    /// A registry with no resources, for playbooks that only use ARN targets
    pub fn empty(stack_name: &str, region: &str, account: &str) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resources: HashMap::new(),
            manifest: None,
        }
    }

    /// Translate CDK construct IDs through `manifest` before lookup
    pub fn with_manifest(mut self, manifest: CdkManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Find a resource by logical ID (or CDK construct ID when a manifest is
    /// attached). Never goes back to the network.
    pub fn lookup(&self, id: &str) -> Option<&StackResource> {
        let logical_id = self
            .manifest
            .as_ref()
            .and_then(|m| m.logical_id(&self.stack_name, id))
            .unwrap_or(id);
        if logical_id != id {
            debug!(construct = id, logical_id, "Translated construct ID");
        }
        self.resources.get(logical_id)
    }

    /// All resources, sorted by logical ID
    pub fn resources(&self) -> Vec<&StackResource> {
        let mut resources: Vec<_> = self.resources.values().collect();
        resources.sort_by(|a, b| a.logical_id.cmp(&b.logical_id));
        resources
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}
