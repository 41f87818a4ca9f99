//! Hand-written override rules.
//!
//! The sidecar file is a list of records. Each record starts with a
//! `# <Record>` line followed by its fields in a fixed order:
//!
//! ```text
//! // Comment lines and blank lines are ignored.
//! # AppendixElement
//! ## AppendixElement.Element OneX
//! ## AppendixElement.Url https://learn.microsoft.com/windows/win32/nativewifi/onexschema-elements
//! ## AppendixElement.Type OneX
//! ## AppendixElement.Description See OneX schema elements.
//! ## AppendixElement.ComesAfter OneXEnabled (security)
//!
//! # SyntaxComment
//! ## SyntaxComment.Lines Extension point for other namespaces.
//! ## SyntaxComment.ComesAfter OneXEnabled (security)
//!
//! # Uniqueification
//! ## Uniqueification.Element authEncryption (security)
//! ```
//!
//! Keys are qualified element names: `Name` for the root, `Name (Parent)`
//! everywhere else.

use std::{iter::Peekable, path::Path};

use anyhow::Context;

use crate::{
    report::RunReport,
    utils::{CONTENT_INDENT, indent},
};

const APPENDIX_ELEMENT: &str = "AppendixElement";
const SYNTAX_COMMENT: &str = "SyntaxComment";
const UNIQUEIFICATION: &str = "Uniqueification";

/// An extra row appended after a child in tables and the landing page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendixElement {
    pub element: String,
    pub url: String,
    pub type_name: String,
    pub description: String,
    pub comes_after: String,
}

/// An XML comment emitted right after a child's tag in a syntax block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxComment {
    pub lines: Vec<String>,
    pub comes_after: String,
}

impl SyntaxComment {
    /// Renders the comment at `indent_by` columns, one line per text line.
    pub fn render(&self, indent_by: usize) -> String {
        let mut out = format!("{}<!--\n", indent(indent_by));
        for line in &self.lines {
            out.push_str(&indent(indent_by + CONTENT_INDENT));
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("{}-->\n", indent(indent_by)));
        out
    }
}

/// Marks an element whose title needs the schema display name appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uniqueification {
    pub element: String,
}

/// All override records of a run.
#[derive(Debug, Clone, Default)]
pub struct OverrideRegistry {
    appendix_elements: Vec<AppendixElement>,
    syntax_comments: Vec<SyntaxComment>,
    uniqueifications: Vec<Uniqueification>,
}

impl OverrideRegistry {
    /// Loads the sidecar file at `path`.
    ///
    /// A missing file is reported as a warning and yields an empty registry.
    pub fn load(path: &Path, report: &mut RunReport) -> anyhow::Result<Self> {
        if !path.is_file() {
            report.warn(format!(
                "no override file; create {} if this schema needs one",
                path.display()
            ));
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read override file {}", path.display()))?;
        let registry = Self::parse(&text, report);
        info!(
            "{}: {} AppendixElement(s), {} SyntaxComment(s), {} Uniqueification(s)",
            path.display(),
            registry.appendix_elements.len(),
            registry.syntax_comments.len(),
            registry.uniqueifications.len()
        );
        Ok(registry)
    }

    /// Parses override records; malformed records are dropped with a warning.
    pub fn parse(text: &str, report: &mut RunReport) -> Self {
        let mut registry = Self::default();
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(ix, line)| (ix + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with("//"))
            .peekable();

        while let Some((line_no, line)) = lines.next() {
            let Some(record) = line.strip_prefix("# ").map(str::trim) else {
                report.warn(format!("override line {line_no}: unexpected `{line}`"));
                continue;
            };

            let parsed = match record {
                APPENDIX_ELEMENT => parse_appendix(&mut lines).map(|r| {
                    registry.appendix_elements.push(r);
                }),
                SYNTAX_COMMENT => parse_syntax_comment(&mut lines).map(|r| {
                    registry.syntax_comments.push(r);
                }),
                UNIQUEIFICATION => field(&mut lines, UNIQUEIFICATION, "Element").map(|element| {
                    registry.uniqueifications.push(Uniqueification { element });
                }),
                other => Err(format!("unknown record type `{other}`")),
            };

            if let Err(msg) = parsed {
                report.warn(format!("override record at line {line_no} dropped: {msg}"));
            }
        }

        registry
    }

    pub fn appendix_after(&self, key: &str) -> Option<&AppendixElement> {
        self.appendix_elements.iter().find(|a| a.comes_after == key)
    }

    pub fn syntax_comment_after(&self, key: &str) -> Option<&SyntaxComment> {
        self.syntax_comments.iter().find(|c| c.comes_after == key)
    }

    pub fn uniqueification_for(&self, key: &str) -> Option<&Uniqueification> {
        self.uniqueifications.iter().find(|u| u.element == key)
    }

    pub fn is_empty(&self) -> bool {
        self.appendix_elements.is_empty()
            && self.syntax_comments.is_empty()
            && self.uniqueifications.is_empty()
    }
}

/// Consumes `## <record>.<name> <value>` if it is the next line.
///
/// A non-matching line is left in place so the next record header survives.
fn field<'a, I>(lines: &mut Peekable<I>, record: &str, name: &str) -> Result<String, String>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let prefix = format!("## {record}.{name}");
    let value = lines.peek().and_then(|(_, line)| {
        line.strip_prefix(prefix.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            .map(|rest| rest.trim().to_string())
    });
    match value {
        Some(value) => {
            lines.next();
            Ok(value)
        }
        None => Err(format!("expected `{prefix}`")),
    }
}

fn parse_appendix<'a, I>(lines: &mut Peekable<I>) -> Result<AppendixElement, String>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    Ok(AppendixElement {
        element: field(lines, APPENDIX_ELEMENT, "Element")?,
        url: field(lines, APPENDIX_ELEMENT, "Url")?,
        type_name: field(lines, APPENDIX_ELEMENT, "Type")?,
        description: field(lines, APPENDIX_ELEMENT, "Description")?,
        comes_after: field(lines, APPENDIX_ELEMENT, "ComesAfter")?,
    })
}

fn parse_syntax_comment<'a, I>(lines: &mut Peekable<I>) -> Result<SyntaxComment, String>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut text = Vec::new();
    while let Ok(line) = field(lines, SYNTAX_COMMENT, "Lines") {
        text.push(line);
    }
    if text.is_empty() {
        return Err(format!("expected `## {SYNTAX_COMMENT}.Lines`"));
    }
    Ok(SyntaxComment {
        lines: text,
        comes_after: field(lines, SYNTAX_COMMENT, "ComesAfter")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LogKind;

    const SAMPLE: &str = "\
// Overrides for the WLAN profile schema.
# AppendixElement
## AppendixElement.Element OneX
## AppendixElement.Url https://learn.microsoft.com/windows/win32/nativewifi/onexschema-elements
## AppendixElement.Type OneX
## AppendixElement.Description See OneX schema elements.
## AppendixElement.ComesAfter OneXEnabled (security)

# SyntaxComment
## SyntaxComment.Lines Extension point for other namespaces, including the OneX
## SyntaxComment.Lines namespace used for optional IEEE802.1X configuration.
## SyntaxComment.ComesAfter OneXEnabled (security)

# Uniqueification
## Uniqueification.Element authEncryption (security)
";

    #[test]
    fn test_parse_all_record_kinds() {
        let mut report = RunReport::new();
        let registry = OverrideRegistry::parse(SAMPLE, &mut report);
        assert!(report.entries(LogKind::Warning).is_empty());

        let appendix = registry.appendix_after("OneXEnabled (security)").unwrap();
        assert_eq!(appendix.element, "OneX");
        assert_eq!(appendix.type_name, "OneX");
        assert_eq!(appendix.description, "See OneX schema elements.");

        let comment = registry.syntax_comment_after("OneXEnabled (security)").unwrap();
        assert_eq!(comment.lines.len(), 2);

        assert!(registry.uniqueification_for("authEncryption (security)").is_some());
        assert!(registry.uniqueification_for("authEncryption").is_none());
        assert!(registry.appendix_after("OneXEnabled").is_none());
    }

    #[test]
    fn test_malformed_record_keeps_next_header() {
        let text = "\
# AppendixElement
## AppendixElement.Element OneX
## AppendixElement.Type OneX
# Uniqueification
## Uniqueification.Element MSM (WLANProfile)
";
        let mut report = RunReport::new();
        let registry = OverrideRegistry::parse(text, &mut report);

        let warnings = report.entries(LogKind::Warning);
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert!(warnings[0].contains("AppendixElement.Url"));
        assert!(warnings[1].contains("unexpected"));
        assert!(registry.appendix_after("OneX").is_none());
        assert!(registry.uniqueification_for("MSM (WLANProfile)").is_some());
    }

    #[test]
    fn test_first_match_wins() {
        let text = "\
# Uniqueification
## Uniqueification.Element MSM (WLANProfile)
# SyntaxComment
## SyntaxComment.Lines first
## SyntaxComment.ComesAfter MSM (WLANProfile)
# SyntaxComment
## SyntaxComment.Lines second
## SyntaxComment.ComesAfter MSM (WLANProfile)
";
        let mut report = RunReport::new();
        let registry = OverrideRegistry::parse(text, &mut report);
        assert_eq!(
            registry.syntax_comment_after("MSM (WLANProfile)").unwrap().lines,
            ["first"]
        );
    }

    #[test]
    fn test_syntax_comment_render() {
        let comment = SyntaxComment {
            lines: vec!["one".to_string(), "two".to_string()],
            comes_after: "x".to_string(),
        };
        assert_eq!(
            comment.render(8),
            "        <!--\n            one\n            two\n        -->\n"
        );
    }

    #[test]
    fn test_missing_file_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = RunReport::new();
        let registry =
            OverrideRegistry::load(&dir.path().join("none-configuration.txt"), &mut report)
                .unwrap();
        assert!(registry.is_empty());
        assert_eq!(report.entries(LogKind::Warning).len(), 1);
    }
}
