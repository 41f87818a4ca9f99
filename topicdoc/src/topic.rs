//! Mining of existing (legacy) topic files.
//!
//! A topic is read line by line through a small state machine:
//!
//! ~~~text
//! ---                       frontmatter
//! ...
//! ---
//! # Title                   H1
//! Description prose.        description, up to the syntax fence or a heading
//! ```XSD                    syntax block
//! ```
//! ## Child elements         table, then one H3 per documented child
//! ## Remarks                free text
//! ## Examples               free text
//! ## Requirements           table
//! ~~~
//!
//! Headings the miner does not recognise are skipped together with their
//! content.

use std::path::{Path, PathBuf};

use crate::{
    error::TopicError,
    frontmatter::Frontmatter,
    table::{Table, normalize_cell},
};

/// One `### Name` block under `## Child elements`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subsection {
    pub name: String,
    pub lines: Vec<String>,
}

/// Everything reusable that was found in a legacy topic file.
#[derive(Debug, Clone)]
pub struct ExistingTopic {
    path: PathBuf,
    frontmatter: Frontmatter,
    title: Option<String>,
    description: Vec<String>,
    syntax: Vec<String>,
    child_elements: Option<Table>,
    subsections: Vec<Subsection>,
    remarks: Vec<String>,
    examples: Vec<String>,
    requirements: Option<Table>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Frontmatter,
    AfterFrontmatter,
    Description,
    Syntax,
    BetweenSections,
    ChildElements,
    AfterChildTable,
    ChildSubsection,
    Remarks,
    Examples,
    Requirements,
    End,
}

impl ExistingTopic {
    /// Mines the topic at `path`.
    ///
    /// Returns `Ok(None)` when no file exists there.
    pub fn mine(path: impl AsRef<Path>) -> Result<Option<Self>, TopicError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| TopicError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text).map(Some)
    }

    /// Mines topic text that was read from `path`.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, TopicError> {
        let mut topic = Self {
            path: path.into(),
            frontmatter: Frontmatter::new(),
            title: None,
            description: Vec::new(),
            syntax: Vec::new(),
            child_elements: None,
            subsections: Vec::new(),
            remarks: Vec::new(),
            examples: Vec::new(),
            requirements: None,
        };

        let lines: Vec<String> = text
            .trim_start_matches('\u{feff}')
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect();
        let file_name = topic.path.display().to_string();

        let mut state = State::Start;
        let mut frontmatter_lines: Vec<&str> = Vec::new();
        let mut in_fence = false;
        let mut ix = 0;

        while ix < lines.len() {
            let line = lines[ix].as_str();
            let trimmed = line.trim();
            let heading = heading_level(trimmed);

            match state {
                State::Start => {
                    if trimmed != "---" {
                        return Err(TopicError::MissingFrontmatter { path: topic.path });
                    }
                    state = State::Frontmatter;
                }
                State::Frontmatter => {
                    if trimmed == "---" {
                        topic.frontmatter = Frontmatter::parse(&frontmatter_lines.join("\n"))
                            .map_err(|source| TopicError::Frontmatter {
                                path: topic.path.clone(),
                                source,
                            })?;
                        state = State::AfterFrontmatter;
                    } else {
                        frontmatter_lines.push(line);
                    }
                }
                State::AfterFrontmatter => match heading {
                    Some(1) => {
                        topic.title = Some(trimmed[1..].trim().to_string());
                        state = State::Description;
                    }
                    Some(_) => state = section_for(trimmed),
                    None if trimmed.is_empty() => {}
                    None => {
                        return Err(TopicError::ContentBeforeHeading {
                            path: topic.path,
                            line: ix + 1,
                        });
                    }
                },
                State::Description => {
                    if trimmed.starts_with("```") {
                        state = State::Syntax;
                    } else if heading.is_some() {
                        state = section_for(trimmed);
                    } else {
                        topic.description.push(line.to_string());
                    }
                }
                State::Syntax => {
                    if trimmed.starts_with("```") {
                        state = State::BetweenSections;
                    } else {
                        topic.syntax.push(line.to_string());
                    }
                }
                State::BetweenSections => {
                    if heading.is_some() {
                        state = section_for(trimmed);
                    }
                }
                State::ChildElements => match heading {
                    Some(3) => {
                        topic.subsections.push(subsection(trimmed));
                        state = State::ChildSubsection;
                    }
                    Some(_) => state = section_for(trimmed),
                    None if trimmed.is_empty() => {}
                    None => {
                        state = State::AfterChildTable;
                        if let Some(table) = Table::parse_next(&file_name, &lines, &mut ix)? {
                            topic.child_elements = Some(table);
                            continue;
                        }
                    }
                },
                State::AfterChildTable => match heading {
                    Some(3) => {
                        topic.subsections.push(subsection(trimmed));
                        state = State::ChildSubsection;
                    }
                    Some(1 | 2) => state = section_for(trimmed),
                    _ => {}
                },
                State::ChildSubsection => match heading {
                    Some(3) => topic.subsections.push(subsection(trimmed)),
                    Some(1 | 2) => state = section_for(trimmed),
                    _ => {
                        if let Some(current) = topic.subsections.last_mut() {
                            current.lines.push(line.to_string());
                        }
                    }
                },
                State::Remarks | State::Examples => {
                    if trimmed.starts_with("```") {
                        in_fence = !in_fence;
                    }
                    if !in_fence && matches!(heading, Some(1 | 2)) {
                        state = section_for(trimmed);
                    } else if state == State::Remarks {
                        topic.remarks.push(line.to_string());
                    } else {
                        topic.examples.push(line.to_string());
                    }
                }
                State::Requirements => match heading {
                    Some(1 | 2) => state = section_for(trimmed),
                    _ if trimmed.is_empty() => {}
                    _ => {
                        if let Some(table) = Table::parse_next(&file_name, &lines, &mut ix)? {
                            topic.requirements = Some(table);
                            state = State::End;
                            continue;
                        }
                    }
                },
                State::End => {}
            }
            ix += 1;
        }

        if matches!(state, State::Start | State::Frontmatter) && !lines.is_empty() {
            return Err(TopicError::UnterminatedFrontmatter { path: topic.path });
        }
        if state == State::Start {
            return Err(TopicError::MissingFrontmatter { path: topic.path });
        }

        trace!(
            "mined {}: {} subsections, child table: {}",
            topic.path.display(),
            topic.subsections.len(),
            topic.child_elements.is_some()
        );
        Ok(topic)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frontmatter(&self) -> &Frontmatter {
        &self.frontmatter
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The frontmatter `description:`.
    pub fn yaml_description(&self) -> Option<&str> {
        self.frontmatter.description()
    }

    pub fn ms_asset_id(&self) -> Option<&str> {
        self.frontmatter.ms_asset_id()
    }

    /// The prose between the H1 and the syntax block.
    pub fn description(&self) -> Option<String> {
        block(&self.description)
    }

    /// The first paragraph of the description.
    pub fn description_summary(&self) -> Option<String> {
        let text = self.description()?;
        text.split("\n\n").next().map(|p| p.replace('\n', " "))
    }

    pub fn syntax(&self) -> &[String] {
        &self.syntax
    }

    pub fn child_elements(&self) -> Option<&Table> {
        self.child_elements.as_ref()
    }

    /// The `Description` cell of the child-elements row for `name`.
    pub fn child_element_description(&self, name: &str) -> Option<String> {
        let table = self.child_elements.as_ref()?;
        let row = table.find_row("Element", name)?;
        table
            .cell(row, "Description")
            .map(str::to_string)
            .filter(|d| !d.is_empty())
    }

    pub fn subsections(&self) -> &[Subsection] {
        &self.subsections
    }

    /// The body of `### name`, if it exists and has any content.
    pub fn subsection(&self, name: &str) -> Option<String> {
        self.subsections
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| block(&s.lines))
    }

    pub fn remarks(&self) -> Option<String> {
        block(&self.remarks)
    }

    pub fn examples(&self) -> Option<String> {
        block(&self.examples)
    }

    pub fn requirements(&self) -> Option<&Table> {
        self.requirements.as_ref()
    }
}

/// `Some(n)` for an ATX heading of level `n`.
fn heading_level(trimmed: &str) -> Option<usize> {
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    let rest = &trimmed[level..];
    (level > 0 && (rest.is_empty() || rest.starts_with(' '))).then_some(level)
}

fn section_for(heading: &str) -> State {
    let text = heading.trim_start_matches('#').trim();
    if heading_level(heading) != Some(2) {
        return State::BetweenSections;
    }
    match text.to_ascii_lowercase().as_str() {
        "child elements" => State::ChildElements,
        "remarks" => State::Remarks,
        "examples" => State::Examples,
        "requirements" => State::Requirements,
        _ => State::BetweenSections,
    }
}

fn subsection(heading: &str) -> Subsection {
    Subsection {
        name: normalize_cell(heading.trim_start_matches('#')),
        lines: Vec::new(),
    }
}

/// Joins `lines`, dropping blank lines at either end.
fn block(lines: &[String]) -> Option<String> {
    let start = lines.iter().position(|l| !l.trim().is_empty())?;
    let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[start..=end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECURITY: &str = "---
title: security (MSM) element
description: Contains the security settings of a network.
ms.assetid: 0c2d54a5-54b4-4b7e-a0a2-4b35e5b3bd4c
ms.topic: reference
---

# security (MSM) element

Contains the security settings of a network.

Applies to wireless profiles.

```XSD
<xs:element name=\"security\">
```

## Parent elements

* [MSM](wlan-profileschema-msm-element.md)

## Child elements

| Element | Type | Description |
|-|-|-|
| [**OneXEnforced**](#onexenforced) | boolean | Whether 802.1X is enforced. |
| [**OneXEnabled**](#onexenabled) | boolean | Whether 802.1X is enabled. |

### OneXEnforced

Optional.

### OneXEnabled

Use **true** to turn on 802.1X.

#### Notes
Nested heading stays in the subsection.

## Remarks

Keep these remarks.

## Examples

```xml
# not a heading inside a fence
<security/>
```

## See also

Ignored.

## Requirements

| Requirement | Value |
|-|-|
| Minimum supported client | Windows Vista |
";

    #[test]
    fn test_mine_full_topic() {
        let _ = env_logger::builder().is_test(true).try_init();
        let topic = ExistingTopic::parse("security.md", SECURITY).unwrap();

        assert_eq!(topic.title(), Some("security (MSM) element"));
        assert_eq!(
            topic.yaml_description(),
            Some("Contains the security settings of a network.")
        );
        assert_eq!(
            topic.ms_asset_id(),
            Some("0c2d54a5-54b4-4b7e-a0a2-4b35e5b3bd4c")
        );
        assert_eq!(
            topic.description().unwrap(),
            "Contains the security settings of a network.\n\nApplies to wireless profiles."
        );
        assert_eq!(
            topic.description_summary().unwrap(),
            "Contains the security settings of a network."
        );
        assert_eq!(topic.syntax(), ["<xs:element name=\"security\">"]);

        assert_eq!(topic.child_elements().unwrap().row_count(), 2);
        assert_eq!(
            topic.child_element_description("OneXEnabled").unwrap(),
            "Whether 802.1X is enabled."
        );
        assert_eq!(topic.subsections().len(), 2);
        assert_eq!(topic.subsection("OneXEnforced").unwrap(), "Optional.");
        assert_eq!(
            topic.subsection("OneXEnabled").unwrap(),
            "Use **true** to turn on 802.1X.\n\n#### Notes\nNested heading stays in the subsection."
        );

        assert_eq!(topic.remarks().unwrap(), "Keep these remarks.");
        assert_eq!(
            topic.examples().unwrap(),
            "```xml\n# not a heading inside a fence\n<security/>\n```"
        );
        let requirements = topic.requirements().unwrap();
        assert_eq!(requirements.headings(), ["Requirement", "Value"]);
        assert_eq!(requirements.rows()[0][1], "Windows Vista");
    }

    #[test]
    fn test_minimal_topic() {
        let topic = ExistingTopic::parse("msm.md", "---\ntitle: MSM\n---\n\n# MSM element\n").unwrap();
        assert_eq!(topic.title(), Some("MSM element"));
        assert_eq!(topic.description(), None);
        assert_eq!(topic.child_elements(), None);
        assert_eq!(topic.subsection("security"), None);
        assert_eq!(topic.remarks(), None);
        assert_eq!(topic.requirements(), None);
    }

    #[test]
    fn test_missing_frontmatter() {
        let err = ExistingTopic::parse("x.md", "# Title\n").unwrap_err();
        assert!(matches!(err, TopicError::MissingFrontmatter { .. }));
        let err = ExistingTopic::parse("x.md", "").unwrap_err();
        assert!(matches!(err, TopicError::MissingFrontmatter { .. }));
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let err = ExistingTopic::parse("x.md", "---\ntitle: x\n").unwrap_err();
        assert!(matches!(err, TopicError::UnterminatedFrontmatter { .. }));
    }

    #[test]
    fn test_quoted_frontmatter_description() {
        let text = "---\ndescription: \"Indicates whether: 802.1X is enforced.\"\nms.assetid: ''\n---\n\n# OneXEnforced element\n";
        let topic = ExistingTopic::parse("x.md", text).unwrap();
        assert_eq!(
            topic.yaml_description(),
            Some("Indicates whether: 802.1X is enforced.")
        );
        assert_eq!(topic.ms_asset_id(), None);
    }

    #[test]
    fn test_invalid_frontmatter_yaml() {
        let err = ExistingTopic::parse("x.md", "---\ndescription: a: b\n---\n# T\n").unwrap_err();
        assert!(matches!(err, TopicError::Frontmatter { .. }));
    }

    #[test]
    fn test_prose_before_h1() {
        let err = ExistingTopic::parse("x.md", "---\n---\n\nstray text\n# Title\n").unwrap_err();
        assert!(matches!(err, TopicError::ContentBeforeHeading { line: 4, .. }));
    }

    #[test]
    fn test_malformed_child_table() {
        let text = "---\n---\n# T\n## Child elements\n| a | b |\n|-|-|\n| 1 |\n";
        let err = ExistingTopic::parse("x.md", text).unwrap_err();
        assert!(matches!(err, TopicError::Table(_)));
    }

    #[test]
    fn test_mine_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            ExistingTopic::mine(dir.path().join("absent.md"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_mine_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("security.md");
        std::fs::write(&path, SECURITY).unwrap();
        let topic = ExistingTopic::mine(&path).unwrap().unwrap();
        assert_eq!(topic.path(), path);
        assert!(topic.examples().is_some());
    }
}
