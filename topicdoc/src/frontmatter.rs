//! The YAML block at the top of a topic.
//!
//! Topics only use flat blocks: scalar values and lists of scalars. Keys keep
//! their file order so a parsed block can be rendered back unchanged.

use serde_yaml::{Mapping, Value};

/// A frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterEntry {
    pub key: String,
    pub value: FrontmatterValue,
}

/// Ordered frontmatter entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<FrontmatterEntry>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the YAML between the two `---` delimiters.
    ///
    /// An empty block yields no entries. `null` values become empty scalars,
    /// and nested mappings are skipped.
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let mapping = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            other => serde_yaml::from_value::<Mapping>(other)?,
        };

        let mut fm = Self::new();
        for (key, value) in mapping {
            let Some(key) = scalar_text(&key) else {
                debug!("ignoring frontmatter key {key:?}");
                continue;
            };
            match value {
                Value::Sequence(items) => {
                    fm.push_list(key, items.iter().filter_map(scalar_text));
                }
                value => match scalar_text(&value) {
                    Some(text) => fm.push_scalar(key, text),
                    None => debug!("ignoring frontmatter value of {key}"),
                },
            }
        }
        Ok(fm)
    }

    pub fn entries(&self) -> &[FrontmatterEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    /// Returns the value of a scalar key.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FrontmatterValue::Scalar(s) => Some(s.as_str()),
            FrontmatterValue::List(_) => None,
        }
    }

    /// The `description:` value, if present and non-empty.
    pub fn description(&self) -> Option<&str> {
        self.scalar("description").filter(|s| !s.is_empty())
    }

    /// The `ms.assetid:` value, if present and non-empty.
    pub fn ms_asset_id(&self) -> Option<&str> {
        self.scalar("ms.assetid").filter(|s| !s.is_empty())
    }

    pub fn push_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(FrontmatterEntry {
            key: key.into(),
            value: FrontmatterValue::Scalar(value.into()),
        });
    }

    pub fn push_list<I, S>(&mut self, key: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(FrontmatterEntry {
            key: key.into(),
            value: FrontmatterValue::List(items.into_iter().map(Into::into).collect()),
        });
    }

    /// Renders the block including both `---` delimiters and a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        for entry in &self.entries {
            match &entry.value {
                FrontmatterValue::Scalar(v) if v.is_empty() => {
                    out.push_str(&format!("{}:\n", entry.key));
                }
                FrontmatterValue::Scalar(v) => {
                    out.push_str(&format!("{}: {}\n", entry.key, plain_or_quoted(v)));
                }
                FrontmatterValue::List(items) => {
                    out.push_str(&format!("{}:\n", entry.key));
                    for item in items {
                        out.push_str(&format!("- {}\n", plain_or_quoted(item)));
                    }
                }
            }
        }
        out.push_str("---\n");
        out
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

// Quotes only text that would not read back as the same plain string.
fn plain_or_quoted(text: &str) -> String {
    match serde_yaml::to_string(text) {
        Ok(yaml) if !yaml.trim_end().contains('\n') => yaml.trim_end().to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars_and_lists() {
        let fm = Frontmatter::parse(
            "title: security (MSM) element
description: Contains security settings.
ms.assetid: 8d4d7a5b-1b8a-4bbd-a4d0-3c39bd0b1f2a
topic_type:
- APIRef
- kbSyntax
api_location:
",
        )
        .unwrap();
        assert_eq!(fm.description(), Some("Contains security settings."));
        assert_eq!(
            fm.ms_asset_id(),
            Some("8d4d7a5b-1b8a-4bbd-a4d0-3c39bd0b1f2a")
        );
        assert_eq!(
            fm.get("topic_type"),
            Some(&FrontmatterValue::List(vec![
                "APIRef".to_string(),
                "kbSyntax".to_string()
            ]))
        );
        assert_eq!(fm.scalar("api_location"), Some(""));
        assert_eq!(fm.scalar("topic_type"), None);
        let keys: Vec<&str> = fm.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            ["title", "description", "ms.assetid", "topic_type", "api_location"]
        );
    }

    #[test]
    fn test_empty_description_is_none() {
        let fm = Frontmatter::parse("description:   \n").unwrap();
        assert_eq!(fm.description(), None);
        assert_eq!(fm.ms_asset_id(), None);
        assert!(Frontmatter::parse("").unwrap().entries().is_empty());
    }

    #[test]
    fn test_quoted_and_escaped_values() {
        let fm = Frontmatter::parse(
            r#"description: "Indicates whether: 802.1X is enforced."
title: 'The ''security'' element'
ms.custom: "Tab\there"
ms.date: 2018
robots: true
"#,
        )
        .unwrap();
        assert_eq!(fm.description(), Some("Indicates whether: 802.1X is enforced."));
        assert_eq!(fm.scalar("title"), Some("The 'security' element"));
        assert_eq!(fm.scalar("ms.custom"), Some("Tab\there"));
        assert_eq!(fm.scalar("ms.date"), Some("2018"));
        assert_eq!(fm.scalar("robots"), Some("true"));
    }

    #[test]
    fn test_folded_continuation_line() {
        let fm = Frontmatter::parse("description: Contains the security\n  settings of a network.\n")
            .unwrap();
        assert_eq!(
            fm.description(),
            Some("Contains the security settings of a network.")
        );
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(Frontmatter::parse("description: a: b\n").is_err());
        assert!(Frontmatter::parse("- just\n- a list\n").is_err());
    }

    #[test]
    fn test_render() {
        let mut fm = Frontmatter::new();
        fm.push_scalar("title", "Profile element");
        fm.push_list("api_name", ["Profile"]);
        fm.push_scalar("api_location", "");
        assert_eq!(
            fm.render(),
            "---\ntitle: Profile element\napi_name:\n- Profile\napi_location:\n---\n"
        );
    }

    #[test]
    fn test_render_quotes_ambiguous_values() {
        let mut fm = Frontmatter::new();
        fm.push_scalar("description", "Indicates whether: 802.1X is enforced.");
        fm.push_scalar("ms.date", "01/02/2025");
        let rendered = fm.render();
        assert!(!rendered.contains("description: Indicates"), "{rendered}");
        assert!(rendered.contains("ms.date: 01/02/2025\n"), "{rendered}");

        let yaml = rendered
            .strip_prefix("---\n")
            .and_then(|r| r.strip_suffix("---\n"))
            .unwrap();
        assert_eq!(Frontmatter::parse(yaml).unwrap(), fm);
    }
}
