//! Commit phase: removal of legacy topics that have been superseded.
//!
//! A legacy file is only deleted once the file that replaces it exists in the
//! generated directory. A leaf's legacy topic is replaced by its parent's
//! topic. Deletion failures are reported, never fatal.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::Context;
use colored::Colorize;

use crate::{
    ctx::AppContext,
    report::{LogKind, RunReport},
    tree::{ChildAdapter, NodeId, TopicTree},
};

struct Walker<'a> {
    report: &'a mut RunReport,
    dry_run: bool,
    removed: BTreeSet<PathBuf>,
}

impl Walker<'_> {
    fn retire(&mut self, legacy: &Path, replacement: &Path) {
        if !legacy.is_file() {
            return;
        }
        if !replacement.is_file() {
            debug!(
                "keeping {}: {} was not generated",
                legacy.display(),
                replacement.display()
            );
            return;
        }

        if self.dry_run {
            println!("{}", format!("Would delete {}", legacy.display()).yellow());
            self.removed.insert(legacy.to_path_buf());
            return;
        }

        match std::fs::remove_file(legacy) {
            Ok(()) => {
                println!("{}", format!("Deleted {}", legacy.display()).green());
                self.report
                    .add(LogKind::Deleted, legacy.display().to_string());
                self.removed.insert(legacy.to_path_buf());
            }
            Err(e) => {
                self.report
                    .add(LogKind::DeleteFailed, format!("{}: {e}", legacy.display()));
            }
        }
    }

    fn visit(&mut self, tree: &TopicTree, id: NodeId) {
        let node = tree.node(id);
        self.retire(&node.legacy_path, &node.generated_path);
        for child in &node.children {
            match child {
                ChildAdapter::Topic(child_id) => self.visit(tree, *child_id),
                ChildAdapter::Leaf(leaf) => self.retire(&leaf.legacy_path, &node.generated_path),
            }
        }
    }
}

/// Deletes every superseded legacy topic and the legacy landing page.
///
/// Remaining `<prefix>-*.md` files in the legacy directory are reported for
/// manual deletion. A legacy directory that cannot be listed is reported as
/// a failed deletion. With `dry_run`, nothing is deleted and the files that
/// would be are listed instead. Returns how many files were (or would be)
/// deleted.
pub fn commit(
    ctx: &AppContext,
    tree: &TopicTree,
    dry_run: bool,
    report: &mut RunReport,
) -> anyhow::Result<usize> {
    println!();
    println!("{}", "*** COMMIT PHASE ***".bold());
    println!();

    let mut walker = Walker {
        report,
        dry_run,
        removed: BTreeSet::new(),
    };
    walker.retire(&ctx.legacy_landing(), &ctx.generated_landing());
    walker.visit(tree, tree.root());

    let Walker {
        report, removed, ..
    } = walker;

    match leftovers(ctx) {
        Ok(found) => {
            for leftover in found.into_iter().filter(|p| !removed.contains(p)) {
                report.add(LogKind::ManualDeletion, leftover.display().to_string());
            }
        }
        Err(e) => report.add(LogKind::DeleteFailed, format!("{e:#}")),
    }

    info!(
        "{} {} legacy topics",
        if dry_run { "would delete" } else { "deleted" },
        removed.len()
    );
    Ok(removed.len())
}

/// Topic files in the legacy directory that belong to this schema, sorted.
fn leftovers(ctx: &AppContext) -> anyhow::Result<Vec<PathBuf>> {
    let dir = &ctx.paths.legacy_dir;
    let prefix = format!("{}-", ctx.run.file_prefix);
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("failed to list {}", dir.display()))?
            .path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".md"));
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generate::generate,
        survey::survey,
        testutil::{PROFILE_XSD, SECURITY_TOPIC, context},
    };
    use xsdtree::Schema;

    fn setup(root: &Path) -> (AppContext, TopicTree) {
        let ctx = context(root);
        std::fs::create_dir_all(&ctx.paths.legacy_dir).unwrap();
        std::fs::write(ctx.legacy_topic("security", Some("MSM")), SECURITY_TOPIC).unwrap();
        std::fs::write(
            ctx.legacy_topic("OneXEnabled", Some("security")),
            "---\n---\n\n# OneXEnabled (security) element\n",
        )
        .unwrap();
        std::fs::write(
            ctx.legacy_topic("retired", Some("MSM")),
            "---\n---\n\n# retired (MSM) element\n",
        )
        .unwrap();
        std::fs::write(ctx.paths.legacy_dir.join("unrelated.md"), "x").unwrap();
        let tree = survey(&ctx, Schema::parse(PROFILE_XSD).unwrap()).unwrap();
        (ctx, tree)
    }

    #[test]
    fn test_nothing_deleted_before_generate() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, tree) = setup(dir.path());
        let mut report = RunReport::new();

        assert_eq!(commit(&ctx, &tree, false, &mut report).unwrap(), 0);
        assert!(ctx.legacy_topic("security", Some("MSM")).is_file());
        assert_eq!(report.entries(LogKind::ManualDeletion).len(), 3);
    }

    #[test]
    fn test_commit_after_generate() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, tree) = setup(dir.path());
        let mut report = RunReport::new();
        generate(&ctx, &tree, &mut report).unwrap();

        assert_eq!(commit(&ctx, &tree, false, &mut report).unwrap(), 2);
        assert!(!ctx.legacy_topic("security", Some("MSM")).exists());
        assert!(!ctx.legacy_topic("OneXEnabled", Some("security")).exists());
        assert!(ctx.paths.legacy_dir.join("unrelated.md").is_file());

        assert_eq!(report.entries(LogKind::Deleted).len(), 2);
        let manual = report.entries(LogKind::ManualDeletion);
        assert_eq!(manual.len(), 1);
        assert!(manual[0].ends_with("wlan-profileschema-retired-msm-element.md"));
        assert!(report.entries(LogKind::DeleteFailed).is_empty());
    }

    #[test]
    fn test_dry_run_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, tree) = setup(dir.path());
        let mut report = RunReport::new();
        generate(&ctx, &tree, &mut report).unwrap();

        assert_eq!(commit(&ctx, &tree, true, &mut report).unwrap(), 2);
        assert!(ctx.legacy_topic("security", Some("MSM")).is_file());
        assert!(report.entries(LogKind::Deleted).is_empty());
        assert_eq!(report.entries(LogKind::ManualDeletion).len(), 1);
    }

    #[test]
    fn test_unlistable_legacy_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, tree) = setup(dir.path());
        let mut report = RunReport::new();
        generate(&ctx, &tree, &mut report).unwrap();
        std::fs::remove_dir_all(&ctx.paths.legacy_dir).unwrap();

        assert_eq!(commit(&ctx, &tree, false, &mut report).unwrap(), 0);
        let failed = report.entries(LogKind::DeleteFailed);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].starts_with("failed to list"), "{}", failed[0]);
        assert!(report.entries(LogKind::ManualDeletion).is_empty());
        assert!(!report.is_clean());
    }
}
