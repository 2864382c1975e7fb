// src/descriptor/contents.rs

//! The `<contents>` subtree of package.xml
//!
//! Files are grouped per installation target and nested in `<dir>` elements
//! mirroring their relative path. The tree is a trie keyed by path segment:
//! directory nodes map a segment to a child directory, leaves carry the
//! file's MD5.

use super::element::Element;
use crate::hash::ContentHash;
use crate::target::ClassifiedPath;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A regular file ready to be recorded in the descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    /// Installation target name
    pub target: String,
    /// `/`-separated path under the target, never starting with `/`
    pub relative_path: String,
    /// MD5 of the file content, lowercase hex
    pub hash: String,
}

impl ClassifiedFile {
    pub fn new(classified: ClassifiedPath, hash: impl Into<String>) -> Self {
        Self {
            target: classified.target,
            relative_path: classified.relative_path,
            hash: hash.into(),
        }
    }
}

/// A directory level in a target's tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    files: BTreeMap<String, String>,
}

impl DirNode {
    /// Child directories, ordered by name
    pub fn dirs(&self) -> &BTreeMap<String, DirNode> {
        &self.dirs
    }

    /// Files directly in this directory (name -> hash), ordered by name
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn dir(&self, name: &str) -> Option<&DirNode> {
        self.dirs.get(name)
    }

    /// Number of file leaves at or below this node
    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.values().map(DirNode::file_count).sum::<usize>()
    }

    /// Visit every file below this node with its path relative to the node
    pub fn walk_files<F: FnMut(&str, &str)>(&self, f: &mut F) {
        self.walk_files_under("", f);
    }

    fn walk_files_under<F: FnMut(&str, &str)>(&self, prefix: &str, f: &mut F) {
        for (name, dir) in &self.dirs {
            dir.walk_files_under(&format!("{}{}/", prefix, name), f);
        }
        for (name, hash) in &self.files {
            f(&format!("{}{}", prefix, name), hash);
        }
    }

    fn write_children(&self, element: &mut Element) {
        for (name, dir) in &self.dirs {
            let child = element.append_child(Element::new("dir").with_attribute("name", name));
            dir.write_children(child);
        }
        for (name, hash) in &self.files {
            element.append_child(
                Element::new("file")
                    .with_attribute("name", name)
                    .with_attribute("hash", hash),
            );
        }
    }

    fn read_children(&mut self, element: &Element) {
        for child in element.children() {
            let Some(name) = child.attribute("name") else {
                warn!("Ignoring <{}> without a name attribute", child.name());
                continue;
            };
            match child.name() {
                "dir" => self
                    .dirs
                    .entry(name.to_string())
                    .or_default()
                    .read_children(child),
                "file" => {
                    let hash = child.attribute("hash").unwrap_or_default();
                    if let Err(e) = ContentHash::parse(hash) {
                        warn!("File {} in metadata skeleton has a bad hash: {}", name, e);
                    }
                    self.files.insert(name.to_string(), hash.to_string());
                }
                other => debug!("Ignoring unknown <{}> in contents", other),
            }
        }
    }
}

/// A top-level installation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNode {
    name: String,
    root: DirNode,
}

impl TargetNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target's own directory level
    pub fn root(&self) -> &DirNode {
        &self.root
    }
}

/// Targets in first-seen order, each owning its directory tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentsTree {
    targets: Vec<TargetNode>,
}

impl ContentsTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[TargetNode] {
        &self.targets
    }

    pub fn target(&self, name: &str) -> Option<&TargetNode> {
        self.targets.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Total number of file leaves across all targets
    pub fn file_count(&self) -> usize {
        self.targets.iter().map(|t| t.root.file_count()).sum()
    }

    /// Record every file, in order
    pub fn build<'a, I>(&mut self, files: I)
    where
        I: IntoIterator<Item = &'a ClassifiedFile>,
    {
        for file in files {
            self.insert(file);
        }
    }

    /// Record a single file, creating its target and directories on demand
    ///
    /// A file already present at the same path is overwritten.
    pub fn insert(&mut self, file: &ClassifiedFile) {
        let (dirs, name) = split_path(&file.relative_path);
        let target = self.target_mut(&file.target);
        let parent = descend(&mut target.root, &dirs);
        if let Some(previous) = parent.files.insert(name.to_string(), file.hash.clone()) {
            warn!(
                "Duplicate file {}/{} in package, replacing hash {}",
                file.target, file.relative_path, previous
            );
        }
    }

    fn target_mut(&mut self, name: &str) -> &mut TargetNode {
        let index = match self.targets.iter().position(|t| t.name == name) {
            Some(index) => index,
            None => {
                debug!("Adding target {}", name);
                self.targets.push(TargetNode {
                    name: name.to_string(),
                    root: DirNode::default(),
                });
                self.targets.len() - 1
            }
        };
        &mut self.targets[index]
    }

    /// Render as a `<contents>` element
    pub fn to_element(&self) -> Element {
        let mut contents = Element::new("contents");
        for target in &self.targets {
            let element =
                contents.append_child(Element::new("target").with_attribute("name", &target.name));
            target.root.write_children(element);
        }
        contents
    }

    /// Load an existing `<contents>` element, e.g. from a metadata skeleton
    pub fn from_element(element: &Element) -> Self {
        let mut tree = Self::new();
        for child in element.children() {
            match (child.name(), child.attribute("name")) {
                ("target", Some(name)) => tree.target_mut(name).root.read_children(child),
                (other, _) => warn!("Ignoring <{}> in contents", other),
            }
        }
        tree
    }
}

/// Split a relative path into its directory segments and file name
///
/// A path without a directory component yields no segments.
fn split_path(path: &str) -> (Vec<&str>, &str) {
    match path.rsplit_once('/') {
        Some((dirs, name)) => (dirs.split('/').collect(), name),
        None => (Vec::new(), path),
    }
}

/// Walk down `segments` from `node`, creating missing directories
fn descend<'a>(node: &'a mut DirNode, segments: &[&str]) -> &'a mut DirNode {
    match segments.split_first() {
        None => node,
        Some((first, rest)) => {
            let child = node.dirs.entry((*first).to_string()).or_default();
            descend(child, rest)
        }
    }
}
