//! Stack resource resolution
//!
//! Turns stack-relative identities (logical IDs, CDK construct IDs) and raw
//! ARNs into the names and ARNs that operations need.

mod arn;
mod describer;
mod manifest;
mod registry;
mod target;

pub use arn::{is_arn_shaped, service_hint, synthesize, Arn, ServiceHint};
pub use describer::{parse_describe_output, AwsCliDescriber, ResourceFile};
pub use manifest::CdkManifest;
pub use registry::{ResourceRegistry, StackDescriber, StackDescription, StackResource};
pub use target::Target;
