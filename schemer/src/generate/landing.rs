//! The "all elements" landing page.

use anyhow::Context;
use topicdoc::{ExistingTopic, Frontmatter};

use super::{Page, Rendered, anchor, link, node_file_name};
use crate::{
    ctx::AppContext,
    tree::{ChildAdapter, NodeId, TopicTree},
    utils::{CONTENT_INDENT, indent},
};

/// Renders the landing page, reusing the legacy page's description and asset id.
pub fn render_landing(ctx: &AppContext, tree: &TopicTree) -> anyhow::Result<Rendered> {
    let legacy = ctx.legacy_landing();
    let mined = ExistingTopic::mine(&legacy)
        .with_context(|| format!("failed to mine {}", legacy.display()))?;
    let mined = mined.as_ref();

    let title = format!("{} schema elements", ctx.run.schema_display_name);
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
    page.raw(&frontmatter.render());
    page.raw("\n");

    page.heading(1, &title);
    let body = page.or_placeholder(mined.and_then(ExistingTopic::description));
    page.paragraph(&body);

    page.heading(2, "All elements");
    let mut list = String::new();
    write_node(ctx, tree, tree.root(), 0, &mut list);
    page.paragraph(list.trim_end());

    Ok(page.finish())
}

fn bullet(out: &mut String, depth: usize, text: &str) {
    out.push_str(&indent(depth * CONTENT_INDENT));
    out.push_str("* ");
    out.push_str(text);
    out.push('\n');
}

fn write_node(ctx: &AppContext, tree: &TopicTree, id: NodeId, depth: usize, out: &mut String) {
    let file = node_file_name(ctx, tree, id);
    bullet(out, depth, &link(tree.name(id), &file));

    for child in &tree.node(id).children {
        match child {
            ChildAdapter::Topic(child_id) => write_node(ctx, tree, *child_id, depth + 1, out),
            ChildAdapter::Leaf(_) => {
                let name = tree.child_name(child);
                bullet(out, depth + 1, &link(name, &format!("{file}{}", anchor(name))));

                let key = tree.child_qualified_name(id, child);
                if let Some(appendix) = ctx.overrides.appendix_after(&key) {
                    bullet(out, depth + 1, &link(&appendix.element, &appendix.url));
                }
            }
        }
    }
}
