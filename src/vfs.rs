use crate::error::FsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DIR_MODE: &str = "755";
pub const FILE_MODE: &str = "644";

fn dir_mode() -> String {
    DIR_MODE.into()
}
fn file_mode() -> String {
    FILE_MODE.into()
}

/// A node of the simulated filesystem tree.
///
/// Serialises as `{"type": "dir", "children": {..}}` or
/// `{"type": "file", "content": ".."}`, so lesson JSON can describe an
/// initial tree directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileSystemNode {
    Dir {
        #[serde(default)]
        children: BTreeMap<String, FileSystemNode>,
        #[serde(default = "dir_mode")]
        permissions: String,
    },
    File {
        #[serde(default)]
        content: String,
        #[serde(default = "file_mode")]
        permissions: String,
    },
}

impl Default for FileSystemNode {
    fn default() -> Self {
        Self::dir()
    }
}

impl FileSystemNode {
    pub fn dir() -> Self {
        FileSystemNode::Dir {
            children: BTreeMap::new(),
            permissions: dir_mode(),
        }
    }
    pub fn file(content: &str) -> Self {
        FileSystemNode::File {
            content: content.into(),
            permissions: file_mode(),
        }
    }

    /// Builder used to seed fixture trees.
    pub fn with(mut self, name: &str, child: FileSystemNode) -> Self {
        if let FileSystemNode::Dir { children, .. } = &mut self {
            children.insert(name.into(), child);
        }
        self
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FileSystemNode::Dir { .. })
    }

    pub fn children(&self) -> Option<&BTreeMap<String, FileSystemNode>> {
        match self {
            FileSystemNode::Dir { children, .. } => Some(children),
            FileSystemNode::File { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FileSystemNode::File { content, .. } => Some(content),
            FileSystemNode::Dir { .. } => None,
        }
    }

    pub fn permissions(&self) -> &str {
        match self {
            FileSystemNode::Dir { permissions, .. } | FileSystemNode::File { permissions, .. } => {
                permissions
            }
        }
    }

    pub fn set_permissions(&mut self, mode: &str) {
        match self {
            FileSystemNode::Dir { permissions, .. } | FileSystemNode::File { permissions, .. } => {
                *permissions = mode.into()
            }
        }
    }

    /// Byte size as `ls -l` reports it.
    pub fn size(&self) -> usize {
        match self {
            FileSystemNode::Dir { .. } => 4096,
            FileSystemNode::File { content, .. } => content.len(),
        }
    }

    /// `drwxr-xr-x` style rendering of the octal mode.
    pub fn symbolic_permissions(&self) -> String {
        let mut out = String::with_capacity(10);
        out.push(if self.is_dir() { 'd' } else { '-' });
        let mode = format!("{:0>3}", self.permissions());
        for digit in mode.chars().rev().take(3).collect::<Vec<_>>().into_iter().rev() {
            let n = digit.to_digit(8).unwrap_or(0);
            out.push(if n & 4 != 0 { 'r' } else { '-' });
            out.push(if n & 2 != 0 { 'w' } else { '-' });
            out.push(if n & 1 != 0 { 'x' } else { '-' });
        }
        out
    }

    /// Walk to any node (file or directory) by absolute path.
    pub fn lookup(&self, path: &str) -> Option<&FileSystemNode> {
        let mut node = self;
        for part in segments(path) {
            node = node.children()?.get(part)?;
        }
        Some(node)
    }

    pub fn lookup_mut(&mut self, path: &str) -> Option<&mut FileSystemNode> {
        let mut node = self;
        for part in segments(path) {
            node = match node {
                FileSystemNode::Dir { children, .. } => children.get_mut(part)?,
                FileSystemNode::File { .. } => return None,
            };
        }
        Some(node)
    }

    /// Returns the node at `path` only if every segment, including the
    /// last, is a directory.
    pub fn get_directory(&self, path: &str) -> Option<&FileSystemNode> {
        self.lookup(path).filter(|node| node.is_dir())
    }

    fn insert(&mut self, path: &str, node: FileSystemNode) -> Result<(), FsError> {
        let (parent_path, name) = split_parent(path).ok_or(FsError::InvalidPath)?;
        match self.lookup_mut(&parent_path) {
            Some(FileSystemNode::Dir { children, .. }) => {
                // Same-name entries are replaced.
                children.insert(name, node);
                Ok(())
            }
            Some(FileSystemNode::File { .. }) => Err(FsError::NotADirectory),
            None => Err(FsError::ParentNotFound),
        }
    }

    /// Create an empty directory under an existing parent.
    pub fn create_directory(&mut self, path: &str) -> Result<(), FsError> {
        self.insert(path, FileSystemNode::dir())
    }

    /// Create a file under an existing parent.
    pub fn create_file(&mut self, path: &str, content: &str) -> Result<(), FsError> {
        self.insert(path, FileSystemNode::file(content))
    }

    /// `mkdir -p`: create every missing segment, keeping existing directories.
    pub fn create_dir_all(&mut self, path: &str) -> Result<(), FsError> {
        let mut node = self;
        for part in segments(path) {
            let children = match node {
                FileSystemNode::Dir { children, .. } => children,
                FileSystemNode::File { .. } => return Err(FsError::NotADirectory),
            };
            node = children
                .entry(part.to_string())
                .or_insert_with(FileSystemNode::dir);
        }
        if node.is_dir() {
            Ok(())
        } else {
            Err(FsError::NotADirectory)
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Resolve `path` against `current_dir` into an absolute, normalised path.
///
/// `.` and empty segments are dropped, `..` pops (never above `/`), and the
/// result has a leading `/` and no trailing slash except for the root.
pub fn resolve_path(path: &str, current_dir: &str) -> String {
    let raw = if path.starts_with('/') {
        path.to_string()
    } else {
        let base = current_dir.trim_end_matches('/');
        format!("{}/{}", base, path)
    };
    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Split an absolute path into its parent path and final name.
/// Returns `None` for the root.
pub fn split_parent(path: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = segments(path).collect();
    let (name, parent) = parts.split_last()?;
    let parent_path = if parent.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parent.join("/"))
    };
    Some((parent_path, name.to_string()))
}

/// Final component of a path, `/` for the root.
pub fn base_name(path: &str) -> &str {
    segments(path).last().unwrap_or("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> FileSystemNode {
        FileSystemNode::dir()
            .with(
                "home",
                FileSystemNode::dir().with(
                    "user",
                    FileSystemNode::dir().with("notes.txt", FileSystemNode::file("hi")),
                ),
            )
            .with("etc", FileSystemNode::dir())
    }

    #[test]
    fn test_resolve_relative_and_dots() {
        assert_eq!(resolve_path("docs", "/home/user"), "/home/user/docs");
        assert_eq!(resolve_path("../..", "/home/user"), "/");
        assert_eq!(resolve_path("../../..", "/home/user"), "/");
        assert_eq!(resolve_path("./a/./b/", "/"), "/a/b");
        assert_eq!(resolve_path("/var//log/", "/home"), "/var/log");
        assert_eq!(resolve_path("", "/home/user/"), "/home/user");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let paths = ["", ".", "..", "a/b/../c", "/x/./y/..", "../../q", "//", "a//b/"];
        let dirs = ["/", "/home/devops", "/a/b/c"];
        for p in paths {
            for d in dirs {
                let once = resolve_path(p, d);
                for other in dirs {
                    assert_eq!(resolve_path(&once, other), once, "{} from {}", p, d);
                }
            }
        }
    }

    #[test]
    fn test_get_directory_rejects_files_and_missing() {
        let fs = tree();
        assert!(fs.get_directory("/home/user").is_some());
        assert!(fs.get_directory("/").is_some());
        assert!(fs.get_directory("/home/user/notes.txt").is_none());
        assert!(fs.get_directory("/home/nobody").is_none());
        assert!(fs.get_directory("/home/user/notes.txt/x").is_none());
        assert!(fs.lookup("/home/user/notes.txt").is_some());
    }

    #[test]
    fn test_create_in_missing_parent_fails() {
        let mut fs = tree();
        assert_eq!(fs.create_directory("/nope/dir"), Err(FsError::ParentNotFound));
        assert_eq!(
            fs.create_file("/home/user/notes.txt/x", ""),
            Err(FsError::NotADirectory)
        );
        assert_eq!(fs.create_directory("/"), Err(FsError::InvalidPath));
    }

    #[test]
    fn test_duplicate_create_overwrites() {
        let mut fs = tree();
        fs.create_file("/home/user/notes.txt", "").unwrap();
        assert_eq!(fs.lookup("/home/user/notes.txt").unwrap().content(), Some(""));
        fs.create_directory("/home/user").unwrap();
        assert!(fs.lookup("/home/user/notes.txt").is_none());
    }

    #[test]
    fn test_create_dir_all_keeps_existing() {
        let mut fs = tree();
        fs.create_dir_all("/home/user/a/b/c").unwrap();
        assert!(fs.get_directory("/home/user/a/b/c").is_some());
        assert!(fs.lookup("/home/user/notes.txt").is_some());
        assert_eq!(
            fs.create_dir_all("/home/user/notes.txt/x"),
            Err(FsError::NotADirectory)
        );
    }

    #[test]
    fn test_symbolic_permissions() {
        let mut f = FileSystemNode::file("x");
        assert_eq!(f.symbolic_permissions(), "-rw-r--r--");
        f.set_permissions("750");
        assert_eq!(f.symbolic_permissions(), "-rwxr-x---");
        assert_eq!(FileSystemNode::dir().symbolic_permissions(), "drwxr-xr-x");
    }

    #[test]
    fn test_deserialize_tagged_tree() {
        let json = r#"{"type":"dir","children":{"app":{"type":"file","content":"x"}}}"#;
        let fs: FileSystemNode = serde_json::from_str(json).unwrap();
        let app = fs.lookup("/app").unwrap();
        assert_eq!(app.content(), Some("x"));
        assert_eq!(app.permissions(), FILE_MODE);
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("/a"), Some(("/".into(), "a".into())));
        assert_eq!(split_parent("/a/b/c"), Some(("/a/b".into(), "c".into())));
        assert_eq!(split_parent("/"), None);
        assert_eq!(base_name("/a/b"), "b");
        assert_eq!(base_name("/"), "/");
    }
}
