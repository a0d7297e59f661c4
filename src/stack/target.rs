//! Resource identities used by scenes
//!
//! Targets never cache what they resolve to. Every call goes back to the
//! registry, so a target's name and ARN are always a function of the
//! registry it is handed.

use std::fmt;

use super::arn::{is_arn_shaped, service_hint, synthesize, Arn};
use super::registry::ResourceRegistry;
use crate::common::{Error, Result};

/// A resource addressed by stack logical ID or by ARN
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Resolved through the registry at every use
    LogicalId(String),
    /// Resolved locally, never touches the registry
    Arn(Arn),
}

impl Target {
    pub fn logical_id(id: impl Into<String>) -> Self {
        Target::LogicalId(id.into())
    }

    /// Validate `arn` now rather than at first use
    pub fn from_arn(arn: &str) -> Result<Self> {
        Ok(Target::Arn(Arn::parse(arn)?))
    }

    /// `arn:`-prefixed text is an ARN target, anything else a logical ID
    pub fn parse(text: &str) -> Result<Self> {
        if text.starts_with("arn:") {
            Self::from_arn(text)
        } else {
            Ok(Self::logical_id(text))
        }
    }

    /// Physical name of the resource
    pub fn name(&self, registry: &ResourceRegistry) -> Result<String> {
        match self {
            Target::LogicalId(id) => registry
                .lookup(id)
                .map(|r| r.physical_id.clone())
                .ok_or_else(|| Error::resource_not_found(id, registry.stack_name())),
            Target::Arn(arn) => Ok(arn.resource_name().to_string()),
        }
    }

    /// ARN of the resource, synthesized from the physical ID if necessary
    pub fn arn(&self, registry: &ResourceRegistry) -> Result<String> {
        match self {
            Target::LogicalId(id) => {
                let resource = registry
                    .lookup(id)
                    .ok_or_else(|| Error::resource_not_found(id, registry.stack_name()))?;

                if is_arn_shaped(&resource.physical_id) {
                    return Ok(resource.physical_id.clone());
                }

                let hint = service_hint(&resource.resource_type)
                    .ok_or_else(|| Error::unsupported_resource_type(id, &resource.resource_type))?;
                Ok(synthesize(
                    hint,
                    registry.region(),
                    registry.account(),
                    &resource.physical_id,
                ))
            }
            Target::Arn(arn) => Ok(arn.as_str().to_string()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::LogicalId(id) => f.write_str(id),
            Target::Arn(arn) => write!(f, "{arn}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{StackDescription, StackResource};

    fn registry() -> ResourceRegistry {
        ResourceRegistry::from_description(
            "SampleStack",
            "ap-northeast-1",
            StackDescription {
                stack_id: "arn:aws:cloudformation:ap-northeast-1:111122223333:stack/SampleStack/x"
                    .to_string(),
                resources: vec![
                    StackResource::new("ResultStore", "SampleStack-Results", "AWS::DynamoDB::Table"),
                    StackResource::new("ResultStream", "SampleStack-Stream", "AWS::Kinesis::Stream"),
                    StackResource::new("Handler", "SampleStack-Handler", "AWS::Lambda::Function"),
                    StackResource::new(
                        "Trigger",
                        "arn:aws:sns:ap-northeast-1:111122223333:SampleStack-Trigger",
                        "AWS::SNS::Topic",
                    ),
                    StackResource::new("Bucket", "samplestack-bucket", "AWS::S3::Bucket"),
                ],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_logical_id_name() {
        let reg = registry();
        assert_eq!(
            Target::logical_id("ResultStore").name(&reg).unwrap(),
            "SampleStack-Results"
        );
    }

    #[test]
    fn test_logical_id_arn_synthesized() {
        let reg = registry();
        assert_eq!(
            Target::logical_id("ResultStore").arn(&reg).unwrap(),
            "arn:aws:dynamodb:ap-northeast-1:111122223333:table/SampleStack-Results"
        );
        assert_eq!(
            Target::logical_id("ResultStream").arn(&reg).unwrap(),
            "arn:aws:kinesis:ap-northeast-1:111122223333:stream/SampleStack-Stream"
        );
        assert_eq!(
            Target::logical_id("Handler").arn(&reg).unwrap(),
            "arn:aws:lambda:ap-northeast-1:111122223333:function:SampleStack-Handler"
        );
    }

    #[test]
    fn test_arn_shaped_physical_id_passes_through() {
        let reg = registry();
        let target = Target::logical_id("Trigger");
        let arn = target.arn(&reg).unwrap();
        assert_eq!(arn, "arn:aws:sns:ap-northeast-1:111122223333:SampleStack-Trigger");
        assert_eq!(target.arn(&reg).unwrap(), arn);
    }

    #[test]
    fn test_missing_logical_id() {
        let reg = registry();
        let target = Target::logical_id("Nope");
        for err in [target.name(&reg).unwrap_err(), target.arn(&reg).unwrap_err()] {
            assert!(matches!(err, Error::ResourceNotFound { .. }));
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_unsupported_type_is_fatal() {
        let reg = registry();
        let target = Target::logical_id("Bucket");
        assert_eq!(target.name(&reg).unwrap(), "samplestack-bucket");
        let err = target.arn(&reg).unwrap_err();
        assert!(matches!(err, Error::UnsupportedResourceType { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_arn_target_ignores_registry() {
        let empty = ResourceRegistry::empty("Other", "us-west-2", "999");
        let table = Target::from_arn("arn:aws:dynamodb:r:a:table/T").unwrap();
        assert_eq!(table.name(&empty).unwrap(), "T");
        assert_eq!(table.arn(&empty).unwrap(), "arn:aws:dynamodb:r:a:table/T");

        let topic = Target::from_arn("arn:aws:sns:r:a:T").unwrap();
        assert_eq!(topic.name(&empty).unwrap(), "T");
    }

    #[test]
    fn test_arn_target_validated_at_construction() {
        assert!(Target::from_arn("arn:aws:sns:r").is_err());
        assert!(Target::from_arn("a:b:c:d:e:f:g:h:i").is_err());
        assert!(Target::parse("arn:aws:sns").is_err());
        assert_eq!(Target::parse("Trigger").unwrap(), Target::logical_id("Trigger"));
    }
}
