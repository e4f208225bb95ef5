use crate::error::FsError;
use crate::network::NetworkState;
use crate::process::ProcessTable;
use crate::vfs::{resolve_path, FileSystemNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Everything a command handler may read or change.
///
/// Owned by exactly one session and only touched synchronously while a
/// command runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    pub current_dir: String,
    pub environment: BTreeMap<String, String>,
    pub file_system: FileSystemNode,
    pub processes: ProcessTable,
    pub network: NetworkState,
    pub history: Vec<String>,
}

impl CommandContext {
    pub fn new(user: &str, home: &str, file_system: FileSystemNode) -> Self {
        let mut environment = BTreeMap::new();
        environment.insert("USER".into(), user.into());
        environment.insert("HOME".into(), home.into());
        environment.insert("PATH".into(), DEFAULT_PATH.into());
        environment.insert("SHELL".into(), "/bin/bash".into());
        CommandContext {
            current_dir: home.into(),
            environment,
            file_system,
            processes: ProcessTable::new(),
            network: NetworkState::default(),
            history: Vec::new(),
        }
    }

    /// Context for the scripted terminal: a small node project in the home
    /// directory, a web server process and its listening sockets.
    pub fn scripted(user: &str, home: &str) -> Result<Self, FsError> {
        let mut ctx = CommandContext::new(user, home, scripted_tree(home)?);
        ctx.processes.spawn_with_pid(1, "init", "root", "/sbin/init");
        ctx.processes.spawn_with_pid(123, "bash", user, "bash");
        let node = ctx.processes.spawn_with_pid(456, "node", user, "node app.js");
        if let Some(p) = ctx.processes.get_mut(node) {
            p.cpu_time = 5;
            p.cpu = 1.5;
            p.memory = 48_000;
        }
        if let Some(p) = ctx.processes.get_mut(1) {
            p.cpu_time = 1;
        }
        ctx.network = NetworkState::web_host();
        Ok(ctx)
    }

    /// Context for the lab terminal: a nearly empty tree to build in.
    pub fn lab(user: &str, home: &str) -> Result<Self, FsError> {
        let mut fs = FileSystemNode::dir()
            .with("etc", FileSystemNode::dir())
            .with("var", FileSystemNode::dir());
        // `home` may be nested.
        fs.create_dir_all(home)?;
        let mut ctx = CommandContext::new(user, home, fs);
        ctx.processes.spawn_with_pid(1, "init", "root", "/sbin/init");
        ctx.processes.spawn("bash", user, "bash");
        ctx.network.interfaces = NetworkState::web_host().interfaces;
        Ok(ctx)
    }

    pub fn home(&self) -> &str {
        self.environment
            .get("HOME")
            .map(String::as_str)
            .unwrap_or("/")
    }

    pub fn user(&self) -> &str {
        self.environment
            .get("USER")
            .map(String::as_str)
            .unwrap_or("user")
    }

    pub fn resolve(&self, path: &str) -> String {
        resolve_path(path, &self.current_dir)
    }
}

fn scripted_tree(home: &str) -> Result<FileSystemNode, FsError> {
    let project = [
        (
            "app.js",
            FileSystemNode::file("const http = require('http');\nhttp.createServer((req, res) => res.end('ok')).listen(80);\n"),
        ),
        (
            "package.json",
            FileSystemNode::file("{\n  \"name\": \"app\",\n  \"version\": \"1.0.0\",\n  \"main\": \"app.js\"\n}\n"),
        ),
        ("README.md", FileSystemNode::file("# app\n\nSample service used in the terminal drills.\n")),
        ("src", FileSystemNode::dir()),
    ];
    let mut fs = FileSystemNode::dir()
        .with(
            "etc",
            FileSystemNode::dir()
                .with("hostname", FileSystemNode::file("tcs\n"))
                .with("hosts", FileSystemNode::file("127.0.0.1\tlocalhost\n127.0.1.1\ttcs\n")),
        )
        .with(
            "var",
            FileSystemNode::dir().with(
                "log",
                FileSystemNode::dir().with("syslog", FileSystemNode::file("")),
            ),
        )
        .with("tmp", FileSystemNode::dir());
    fs.create_dir_all(home)?;
    if let Some(FileSystemNode::Dir { children, .. }) = fs.lookup_mut(home) {
        for (name, node) in project {
            children.insert(name.into(), node);
        }
    }
    Ok(fs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_context_seeds_home() {
        let ctx = CommandContext::scripted("devops", "/home/devops").unwrap();
        assert_eq!(ctx.current_dir, "/home/devops");
        assert_eq!(ctx.user(), "devops");
        assert!(ctx.file_system.lookup("/home/devops/app.js").is_some());
        assert!(ctx.file_system.get_directory("/home/devops/src").is_some());
        assert_eq!(ctx.processes.list().len(), 3);
        assert_eq!(ctx.network.connections.len(), 2);
    }

    #[test]
    fn test_lab_context_is_empty_home() {
        let ctx = CommandContext::lab("user", "/home/user").unwrap();
        let home = ctx.file_system.get_directory("/home/user").unwrap();
        assert!(home.children().unwrap().is_empty());
        assert_eq!(ctx.home(), "/home/user");
        assert_eq!(ctx.resolve(".."), "/home");
    }

    #[test]
    fn test_home_under_a_file_is_rejected() {
        assert_eq!(
            CommandContext::scripted("devops", "/etc/hostname/devops").err(),
            Some(FsError::NotADirectory)
        );
    }
}
