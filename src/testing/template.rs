//! `{{...}}` placeholders in playbook commands
//!
//! Templates are parsed when the playbook is loaded, so unknown
//! placeholders and malformed ARNs fail before any step runs. Targets are
//! resolved every time the template is rendered.

use regex::Regex;

use crate::common::{Error, Result};
use crate::stack::{ResourceRegistry, Target};

const PLACEHOLDER: &str = r"\{\{\s*([a-z]+)(?::([^}\s]+))?\s*\}\}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Arn(Target),
    Name(Target),
    Region,
    Account,
    Stack,
}

/// Command text with placeholders resolved against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(text: &str) -> Result<Self> {
        let re = Regex::new(PLACEHOLDER).map_err(|e| Error::Config(e.to_string()))?;
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in re.captures_iter(text) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_string()));
            }
            let arg = caps.get(2).map(|m| m.as_str());
            segments.push(match (key.as_str(), arg) {
                ("arn", Some(id)) => Segment::Arn(Target::parse(id)?),
                ("name", Some(id)) => Segment::Name(Target::parse(id)?),
                ("region", None) => Segment::Region,
                ("account", None) => Segment::Account,
                ("stack", None) => Segment::Stack,
                _ => {
                    return Err(Error::Config(format!(
                        "Unknown placeholder '{}' in '{}'",
                        whole.as_str(),
                        text
                    )))
                }
            });
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_string()));
        }

        Ok(Self {
            source: text.to_string(),
            segments,
        })
    }

    pub fn render(&self, registry: &ResourceRegistry) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Arn(target) => out.push_str(&target.arn(registry)?),
                Segment::Name(target) => out.push_str(&target.name(registry)?),
                Segment::Region => out.push_str(registry.region()),
                Segment::Account => out.push_str(registry.account()),
                Segment::Stack => out.push_str(registry.stack_name()),
            }
        }
        Ok(out)
    }

    /// The text as written in the playbook
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::{StackDescription, StackResource};

    fn registry() -> ResourceRegistry {
        ResourceRegistry::from_description(
            "SampleStack",
            "eu-west-1",
            StackDescription {
                stack_id: "arn:aws:cloudformation:eu-west-1:123456789012:stack/SampleStack/x"
                    .to_string(),
                resources: vec![StackResource::new(
                    "Handler",
                    "SampleStack-Handler",
                    "AWS::Lambda::Function",
                )],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_render_placeholders() {
        let template =
            Template::parse("invoke {{arn:Handler}} as {{ name:Handler }} in {{region}}/{{account}} ({{stack}})")
                .unwrap();
        assert_eq!(
            template.render(&registry()).unwrap(),
            "invoke arn:aws:lambda:eu-west-1:123456789012:function:SampleStack-Handler as SampleStack-Handler in eu-west-1/123456789012 (SampleStack)"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        let template = Template::parse("echo '{not a placeholder}'").unwrap();
        assert_eq!(template.render(&registry()).unwrap(), "echo '{not a placeholder}'");
        assert_eq!(template.as_str(), "echo '{not a placeholder}'");
    }

    #[test]
    fn test_unknown_placeholder_rejected_at_parse() {
        assert!(Template::parse("{{bucket:Data}}").is_err());
        assert!(Template::parse("{{region:eu}}").is_err());
        assert!(Template::parse("{{arn}}").is_err());
        assert!(Template::parse("{{arn:arn:aws:sns}}").is_err());
    }

    #[test]
    fn test_missing_resource_fails_render() {
        let template = Template::parse("{{name:Missing}}").unwrap();
        let err = template.render(&registry()).unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound { .. }));
    }
}
