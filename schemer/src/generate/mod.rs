//! Generate phase: one topic per tree node plus the landing page.
//!
//! Every file is rendered in memory first and written with `create_new`, so
//! a generated directory is only ever filled by a single run.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use colored::Colorize;
use topicdoc::{ExistingTopic, Frontmatter, Table};

use crate::{
    ctx::AppContext,
    report::{LogKind, RunReport},
    tree::{ChildAdapter, LeafChild, NodeId, TopicTree},
    utils::PLACEHOLDER,
};

pub mod landing;
pub mod syntax;

pub use landing::render_landing;
pub use syntax::render_syntax;

/// A rendered markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// How many values fell back to the placeholder.
    pub placeholders: usize,
}

/// Markdown output buffer that counts placeholder fallbacks.
#[derive(Debug, Default)]
pub(crate) struct Page {
    out: String,
    placeholders: usize,
}

impl Page {
    pub(crate) fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub(crate) fn paragraph(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    pub(crate) fn heading(&mut self, level: usize, text: &str) {
        self.out.push_str(&"#".repeat(level));
        self.out.push(' ');
        self.paragraph(text);
    }

    pub(crate) fn or_placeholder(&mut self, value: Option<String>) -> String {
        value.unwrap_or_else(|| {
            self.placeholders += 1;
            PLACEHOLDER.to_string()
        })
    }

    pub(crate) fn finish(self) -> Rendered {
        let mut text = self.out.trim_end().to_string();
        text.push('\n');
        Rendered {
            text,
            placeholders: self.placeholders,
        }
    }
}

/// `[**name**](target)`
pub(crate) fn link(name: &str, target: &str) -> String {
    format!("[**{name}**]({target})")
}

/// In-page anchor of a leaf's `###` subsection.
pub(crate) fn anchor(name: &str) -> String {
    format!("#{}", name.to_lowercase())
}

/// File name of the generated topic for `id`.
pub(crate) fn node_file_name(ctx: &AppContext, tree: &TopicTree, id: NodeId) -> String {
    ctx.topic_file_name(tree.name(id), tree.parent_name(id))
}

/// Title and H1 of the topic for `id`.
pub fn topic_title(ctx: &AppContext, tree: &TopicTree, id: NodeId) -> String {
    let qualified = tree.qualified_name(id);
    let mut title = format!("{qualified} element");
    if ctx.overrides.uniqueification_for(&qualified).is_some() {
        title.push_str(&format!(" ({})", ctx.run.schema_display_name));
    }
    title
}

/// Renders the topic for node `id`.
pub fn render_topic(ctx: &AppContext, tree: &TopicTree, id: NodeId) -> Rendered {
    let node = tree.node(id);
    let mined = node.mined.as_ref();
    let title = topic_title(ctx, tree, id);
    let mut page = Page::default();

    let description = page.or_placeholder(
        mined
            .and_then(ExistingTopic::yaml_description)
            .map(str::to_string),
    );
    let mut frontmatter = Frontmatter::new();
    frontmatter.push_scalar("title", title.as_str());
    frontmatter.push_scalar("description", description);
    if let Some(asset_id) = mined.and_then(ExistingTopic::ms_asset_id) {
        frontmatter.push_scalar("ms.assetid", asset_id);
    }
    frontmatter.push_scalar("ms.topic", "reference");
    frontmatter.push_scalar("ms.date", ctx.run.date.as_str());
    frontmatter.push_list("topic_type", ["APIRef", "kbSyntax"]);
    frontmatter.push_list("api_name", [tree.name(id)]);
    frontmatter.push_list("api_type", ["Schema"]);
    frontmatter.push_scalar("api_location", "");
    page.raw(&frontmatter.render());
    page.raw("\n");

    page.heading(1, &title);
    let body = page.or_placeholder(mined.and_then(ExistingTopic::description));
    page.paragraph(&body);

    page.paragraph(&format!("```XSD\n{}```", render_syntax(ctx, tree, id)));

    page.heading(2, "Parent elements");
    match node.parent {
        Some(parent) => page.paragraph(&format!(
            "* {}",
            link(tree.name(parent), &node_file_name(ctx, tree, parent))
        )),
        None => page.paragraph("None."),
    }

    if !node.children.is_empty() {
        write_child_elements(ctx, tree, id, &mut page);
    }

    if let Some(remarks) = mined.and_then(ExistingTopic::remarks) {
        page.heading(2, "Remarks");
        page.paragraph(&remarks);
    }
    if let Some(examples) = mined.and_then(ExistingTopic::examples) {
        page.heading(2, "Examples");
        page.paragraph(&examples);
    }

    page.heading(2, "Requirements");
    let requirements = page.or_placeholder(mined.and_then(|m| m.requirements()).map(Table::render));
    page.paragraph(&requirements);

    page.finish()
}

/// Description cell of a leaf row.
fn leaf_description(
    tree: &TopicTree,
    id: NodeId,
    leaf: &LeafChild,
    page: &mut Page,
) -> String {
    let name = &tree.schema().element(leaf.element).name;
    let own = leaf.mined.as_ref().and_then(|m| {
        m.yaml_description()
            .map(str::to_string)
            .or_else(|| m.description_summary())
    });
    let from_parent = || {
        tree.node(id)
            .mined
            .as_ref()
            .and_then(|m| m.child_element_description(name))
    };
    page.or_placeholder(own.or_else(from_parent))
}

/// Text of a leaf's `###` subsection, own topic first.
fn leaf_subsection(tree: &TopicTree, id: NodeId, leaf: &LeafChild) -> Option<String> {
    let name = &tree.schema().element(leaf.element).name;
    leaf.mined
        .as_ref()
        .and_then(ExistingTopic::description)
        .or_else(|| tree.node(id).mined.as_ref()?.subsection(name))
}

fn write_child_elements(ctx: &AppContext, tree: &TopicTree, id: NodeId, page: &mut Page) {
    let schema = tree.schema();
    let mut table = Table::new(["Element", "Type", "Description"]);
    let mut subsections = Vec::new();

    for child in &tree.node(id).children {
        match child {
            ChildAdapter::Topic(child_id) => {
                let placeholder = page.or_placeholder(None);
                table.push_row([
                    link(tree.name(*child_id), &node_file_name(ctx, tree, *child_id)),
                    String::new(),
                    placeholder,
                ]);
            }
            ChildAdapter::Leaf(leaf) => {
                let element = schema.element(leaf.element);
                let description = leaf_description(tree, id, leaf, page);
                table.push_row([
                    link(&element.name, &anchor(&element.name)),
                    element.type_name.clone().unwrap_or_default(),
                    description,
                ]);

                let key = tree.child_qualified_name(id, child);
                if let Some(appendix) = ctx.overrides.appendix_after(&key) {
                    table.push_row([
                        link(&appendix.element, &appendix.url),
                        appendix.type_name.clone(),
                        appendix.description.clone(),
                    ]);
                }

                if let Some(text) = leaf_subsection(tree, id, leaf) {
                    subsections.push((element.name.as_str(), text));
                }
            }
        }
    }

    page.heading(2, "Child elements");
    page.paragraph(&table.render());
    for (name, text) in subsections {
        page.heading(3, name);
        page.paragraph(&text);
    }
}

/// Writes `rendered` to a new file at `path`.
fn write_new(path: &Path, rendered: &Rendered, report: &mut RunReport) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(rendered.text.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("{}", format!("Created {}", path.display()).green());
    if rendered.placeholders > 0 {
        report.add(
            LogKind::Placeholder,
            format!(
                "{} ({} {PLACEHOLDER})",
                path.display(),
                rendered.placeholders
            ),
        );
    }
    Ok(())
}

/// Writes the landing page and every topic of `tree` into the generated directory.
///
/// The directory must not exist yet. Returns the written paths, landing page first.
pub fn generate(
    ctx: &AppContext,
    tree: &TopicTree,
    report: &mut RunReport,
) -> anyhow::Result<Vec<PathBuf>> {
    println!();
    println!("{}", "*** GENERATE PHASE ***".bold());
    println!();

    ctx.prepare_generated_dir()?;
    let mut written = Vec::with_capacity(tree.len() + 1);

    let landing = ctx.generated_landing();
    write_new(&landing, &render_landing(ctx, tree)?, report)?;
    written.push(landing);

    for id in tree.pre_order() {
        let node = tree.node(id);
        if node.mined.is_none() {
            println!(
                "{}",
                format!("{} doesn't exist; nothing to mine.", node.legacy_path.display()).bold()
            );
        }
        write_new(&node.generated_path, &render_topic(ctx, tree, id), report)?;
        written.push(node.generated_path.clone());
    }

    info!(
        "generated {} files in {}",
        written.len(),
        ctx.paths.generated_dir.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        overrides::OverrideRegistry,
        survey::survey,
        testutil::{PROFILE_XSD, SECURITY_TOPIC, context},
    };
    use xsdtree::Schema;

    fn profile_tree(ctx: &AppContext) -> TopicTree {
        survey(ctx, Schema::parse(PROFILE_XSD).unwrap()).unwrap()
    }

    fn with_security_topic(root: &Path) -> AppContext {
        let ctx = context(root);
        std::fs::create_dir_all(&ctx.paths.legacy_dir).unwrap();
        std::fs::write(ctx.legacy_topic("security", Some("MSM")), SECURITY_TOPIC).unwrap();
        ctx
    }

    #[test]
    fn test_security_topic_reuses_mined_content() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = with_security_topic(dir.path());
        let tree = profile_tree(&ctx);
        let security = tree.pre_order()[2];

        let rendered = render_topic(&ctx, &tree, security);
        let expected = format!(
            "---
title: security (MSM) element
description: Contains the security settings of a wireless network.
ms.assetid: 5f1d9b8e-3c2a-4e7f-9d6b-0a1b2c3d4e5f
ms.topic: reference
ms.date: 01/02/2025
topic_type:
- APIRef
- kbSyntax
api_name:
- security
api_type:
- Schema
api_location:
---

# security (MSM) element

Contains the security settings of a wireless network.

```XSD
{}```

## Parent elements

* [**MSM**](wlan-profileschema-msm-profile-element.md)

## Child elements

| Element | Type | Description |
|-|-|-|
| [**OneXEnforced**](#onexenforced) | boolean | Indicates whether 802.1X is enforced. |
| [**OneXEnabled**](#onexenabled) | boolean | Indicates whether 802.1X is enabled. |

### OneXEnabled

Set to **true** to turn on 802.1X authentication.

## Remarks

Security settings apply to the whole profile.

## Requirements

| Requirement | Value |
|-|-|
| Minimum supported client | Windows Vista [desktop apps only] |
",
            render_syntax(&ctx, &tree, security)
        );
        assert_eq!(rendered.text, expected);
        assert_eq!(rendered.placeholders, 0);
    }

    #[test]
    fn test_unmined_topic_uses_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = with_security_topic(dir.path());
        let tree = profile_tree(&ctx);
        let msm = tree.pre_order()[1];

        let rendered = render_topic(&ctx, &tree, msm);
        assert!(rendered.text.contains("description: TBD\n"));
        assert!(rendered.text.contains("# MSM (Profile) element\n\nTBD\n\n```XSD\n"));
        assert!(rendered.text.contains(
            "| [**security**](wlan-profileschema-security-msm-element.md) |  | TBD |"
        ));
        assert!(rendered.text.ends_with("## Requirements\n\nTBD\n"));
        assert!(!rendered.text.contains("ms.assetid"));
        assert!(!rendered.text.contains("## Remarks"));
        // description, body, child row, requirements
        assert_eq!(rendered.placeholders, 4);
    }

    #[test]
    fn test_root_has_no_parent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let tree = profile_tree(&ctx);

        let rendered = render_topic(&ctx, &tree, tree.root());
        assert!(rendered.text.contains("title: Profile element\n"));
        assert!(rendered.text.contains("## Parent elements\n\nNone.\n\n"));
        assert!(rendered.text.contains("| [**name**](#name) | string | TBD |"));
    }

    #[test]
    fn test_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = with_security_topic(dir.path());
        let mut report = RunReport::new();
        ctx.overrides = OverrideRegistry::parse(
            "\
# AppendixElement
## AppendixElement.Element OneX
## AppendixElement.Url https://example.com/onex
## AppendixElement.Type OneX
## AppendixElement.Description See OneX schema elements.
## AppendixElement.ComesAfter OneXEnabled (security)
# Uniqueification
## Uniqueification.Element security (MSM)
",
            &mut report,
        );
        let tree = profile_tree(&ctx);
        let security = tree.pre_order()[2];

        let rendered = render_topic(&ctx, &tree, security);
        assert!(
            rendered
                .text
                .contains("title: security (MSM) element (WLAN_profile)\n")
        );
        assert!(
            rendered
                .text
                .contains("# security (MSM) element (WLAN_profile)\n")
        );
        assert!(rendered.text.contains(
            "| [**OneXEnabled**](#onexenabled) | boolean | Indicates whether 802.1X is enabled. |\n\
             | [**OneX**](https://example.com/onex) | OneX | See OneX schema elements. |\n"
        ));
    }

    #[test]
    fn test_leaf_own_topic_wins() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = with_security_topic(dir.path());
        std::fs::write(
            ctx.legacy_topic("OneXEnforced", Some("security")),
            "---\ntitle: OneXEnforced\n---\n\n# OneXEnforced (security) element\n\nForces 802.1X.\n\nMore detail.\n",
        )
        .unwrap();
        let tree = profile_tree(&ctx);
        let security = tree.pre_order()[2];

        let rendered = render_topic(&ctx, &tree, security);
        assert!(
            rendered
                .text
                .contains("| [**OneXEnforced**](#onexenforced) | boolean | Forces 802.1X. |")
        );
        assert!(
            rendered
                .text
                .contains("### OneXEnforced\n\nForces 802.1X.\n\nMore detail.\n\n### OneXEnabled\n")
        );
    }

    #[test]
    fn test_quoted_leaf_description_is_unquoted() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = with_security_topic(dir.path());
        std::fs::write(
            ctx.legacy_topic("OneXEnforced", Some("security")),
            "---\ndescription: \"Indicates whether: 802.1X is enforced.\"\n---\n\n# OneXEnforced (security) element\n",
        )
        .unwrap();
        let tree = profile_tree(&ctx);
        let security = tree.pre_order()[2];

        let rendered = render_topic(&ctx, &tree, security);
        assert!(rendered.text.contains(
            "| [**OneXEnforced**](#onexenforced) | boolean | Indicates whether: 802.1X is enforced. |"
        ));
        assert!(!rendered.text.contains("\"Indicates"));
    }

    #[test]
    fn test_rendered_frontmatter_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        std::fs::create_dir_all(&ctx.paths.legacy_dir).unwrap();
        std::fs::write(
            ctx.legacy_topic("security", Some("MSM")),
            SECURITY_TOPIC.replace(
                "description: Contains the security settings of a wireless network.",
                "description: 'Security: the settings of a wireless network.'",
            ),
        )
        .unwrap();
        let tree = profile_tree(&ctx);
        let security = tree.pre_order()[2];

        let rendered = render_topic(&ctx, &tree, security);
        let topic = ExistingTopic::parse("security.md", &rendered.text).unwrap();
        assert_eq!(
            topic.yaml_description(),
            Some("Security: the settings of a wireless network.")
        );
    }

    #[test]
    fn test_generate_writes_every_topic_once() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = with_security_topic(dir.path());
        let tree = profile_tree(&ctx);
        let mut report = RunReport::new();

        let written = generate(&ctx, &tree, &mut report).unwrap();
        assert_eq!(written.len(), 4);
        assert_eq!(written[0], ctx.generated_landing());
        assert!(written.iter().all(|p| p.is_file()));

        let placeholders = report.entries(LogKind::Placeholder);
        assert!(placeholders.iter().any(|e| e.contains("msm-profile-element.md")));
        assert!(
            !placeholders
                .iter()
                .any(|e| e.contains("security-msm-element.md"))
        );

        assert!(generate(&ctx, &tree, &mut report).is_err());
    }
}
