//! ARN parsing and synthesis

use std::fmt;
use std::str::FromStr;

use crate::common::{colon_segments, Error, Result};

/// Segment count of a canonical `arn:partition:service:region:account:resource`
const ARN_SEGMENTS: usize = 6;
/// Resource parts may contribute up to two more ':'-separated segments
const MAX_ARN_SEGMENTS: usize = 8;

/// A validated Amazon Resource Name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn(String);

impl Arn {
    /// Validate `arn` has 6 to 8 ':'-separated segments
    pub fn parse(arn: &str) -> Result<Self> {
        let segments = colon_segments(arn);
        if !(ARN_SEGMENTS..=MAX_ARN_SEGMENTS).contains(&segments) {
            return Err(Error::InvalidArn {
                arn: arn.to_string(),
                segments,
            });
        }
        Ok(Self(arn.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segment(&self, index: usize) -> &str {
        self.0.split(':').nth(index).unwrap_or("")
    }

    pub fn service(&self) -> &str {
        self.segment(2)
    }

    pub fn region(&self) -> &str {
        self.segment(3)
    }

    pub fn account(&self) -> &str {
        self.segment(4)
    }

    /// Short name of the resource.
    ///
    /// The last ':' segment, minus a `type/` prefix when it contains exactly
    /// one '/': `table/Results` gives `Results`.
    pub fn resource_name(&self) -> &str {
        let last = self.0.rsplit(':').next().unwrap_or("");
        match last.split_once('/') {
            Some((_, name)) if !name.contains('/') => name,
            _ => last,
        }
    }
}

impl FromStr for Arn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a physical ID already is a canonical six-segment ARN
pub fn is_arn_shaped(physical_id: &str) -> bool {
    colon_segments(physical_id) == ARN_SEGMENTS
}

/// Service name and resource prefix used to build an ARN for a stack
/// resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHint {
    pub service: &'static str,
    pub prefix: &'static str,
}

/// Resource types whose ARN can be synthesized from a physical ID
const SERVICE_MAP: &[(&str, ServiceHint)] = &[
    (
        "AWS::Lambda::Function",
        ServiceHint {
            service: "lambda",
            prefix: "function:",
        },
    ),
    (
        "AWS::SNS::Topic",
        ServiceHint {
            service: "sns",
            prefix: "",
        },
    ),
    (
        "AWS::SQS::Queue",
        ServiceHint {
            service: "sqs",
            prefix: "",
        },
    ),
    (
        "AWS::DynamoDB::Table",
        ServiceHint {
            service: "dynamodb",
            prefix: "table/",
        },
    ),
    (
        "AWS::Kinesis::Stream",
        ServiceHint {
            service: "kinesis",
            prefix: "stream/",
        },
    ),
];

/// Look up the ARN building hint for a resource type
pub fn service_hint(resource_type: &str) -> Option<ServiceHint> {
    SERVICE_MAP
        .iter()
        .find(|(ty, _)| *ty == resource_type)
        .map(|(_, hint)| *hint)
}

/// Build `arn:aws:<service>:<region>:<account>:<prefix><name>`.
///
/// URL-shaped physical IDs (SQS queues) contribute their last path segment.
pub fn synthesize(hint: ServiceHint, region: &str, account: &str, physical_id: &str) -> String {
    let name = if physical_id.starts_with("https://") || physical_id.starts_with("http://") {
        physical_id
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(physical_id)
    } else {
        physical_id
    };
    format!(
        "arn:aws:{}:{}:{}:{}{}",
        hint.service, region, account, hint.prefix, name
    )
}
