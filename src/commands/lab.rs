//! Filesystem-backed command set used by the lab terminal.

use super::{Action, CommandOutput, CommandSet, Line, EXIT_FAILURE, EXIT_USAGE};
use crate::context::CommandContext;
use crate::error::FsError;
use crate::vfs::{base_name, FileSystemNode};
use regex::Regex;
use std::sync::OnceLock;

pub const HELP_TEXT: &[&str] = &[
    "Available commands:",
    "  pwd          - print working directory",
    "  ls [-la|-ld] [dir] - list directory contents",
    "    -la        list all files with details",
    "    -ld        list directory itself with details",
    "  cd <dir>     - change directory",
    "  mkdir [-p] <dir> [dir2 ...] - create directory/directories",
    "    -p         create parent directories as needed",
    "  touch <file> - create empty file",
    "  cat <file>   - display file contents",
    "  chmod <mode> <file> - change file permissions",
    "  echo <text>  - display text",
    "  clear        - clear screen",
    "  help         - show this help",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabCommand {
    Pwd,
    Ls,
    Cd,
    Mkdir,
    Touch,
    Cat,
    Chmod,
    Echo,
    Clear,
    Help,
}

impl CommandSet for LabCommand {
    const ALL: &'static [Self] = &[
        LabCommand::Pwd,
        LabCommand::Ls,
        LabCommand::Cd,
        LabCommand::Mkdir,
        LabCommand::Touch,
        LabCommand::Cat,
        LabCommand::Chmod,
        LabCommand::Echo,
        LabCommand::Clear,
        LabCommand::Help,
    ];

    fn name(self) -> &'static str {
        match self {
            LabCommand::Pwd => "pwd",
            LabCommand::Ls => "ls",
            LabCommand::Cd => "cd",
            LabCommand::Mkdir => "mkdir",
            LabCommand::Touch => "touch",
            LabCommand::Cat => "cat",
            LabCommand::Chmod => "chmod",
            LabCommand::Echo => "echo",
            LabCommand::Clear => "clear",
            LabCommand::Help => "help",
        }
    }

    fn run(self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        match self {
            LabCommand::Pwd => CommandOutput::line(ctx.current_dir.clone()),
            LabCommand::Ls => ls(args, ctx),
            LabCommand::Cd => cd(args, ctx),
            LabCommand::Mkdir => mkdir(args, ctx),
            LabCommand::Touch => touch(args, ctx),
            LabCommand::Cat => cat(args, ctx),
            LabCommand::Chmod => chmod(args, ctx),
            LabCommand::Echo => CommandOutput::line(args.join(" ")),
            LabCommand::Clear => CommandOutput::action(Action::Clear),
            LabCommand::Help => CommandOutput::text(HELP_TEXT.iter().copied()),
        }
    }
}

fn long_entry(name: &str, node: &FileSystemNode, owner: &str) -> String {
    format!(
        "{}  1 {} {}  {:>4} Jan 25 12:00 {}",
        node.symbolic_permissions(),
        owner,
        owner,
        node.size(),
        name
    )
}

fn ls(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    let mut details = false;
    let mut show_all = false;
    let mut dir_only = false;
    let mut target = ctx.current_dir.clone();
    for arg in args {
        match *arg {
            "-la" | "-al" => {
                details = true;
                show_all = true;
            }
            "-ld" | "-dl" => {
                details = true;
                dir_only = true;
            }
            "-l" => details = true,
            "-a" => show_all = true,
            a if !a.starts_with('-') => target = ctx.resolve(a),
            _ => {}
        }
    }

    let Some(node) = ctx.file_system.lookup(&target) else {
        return CommandOutput::failure(
            EXIT_USAGE,
            format!("ls: cannot access '{}': No such file or directory", target),
        );
    };
    let owner = ctx.user();

    let children = match node.children() {
        Some(children) if !dir_only => children,
        _ => {
            let name = base_name(&target);
            return if details {
                CommandOutput::line(long_entry(name, node, owner))
            } else {
                CommandOutput::line(name)
            };
        }
    };

    let visible: Vec<(&String, &FileSystemNode)> = children
        .iter()
        .filter(|(name, _)| show_all || !name.starts_with('.'))
        .collect();
    if details {
        return CommandOutput::text(
            visible
                .iter()
                .map(|(name, child)| long_entry(name, child, owner)),
        );
    }
    if visible.is_empty() {
        return CommandOutput::ok();
    }
    let names: Vec<&str> = visible.iter().map(|(name, _)| name.as_str()).collect();
    CommandOutput::line(names.join("  "))
}

fn cd(args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
    let requested = args
        .first()
        .map(|s| s.to_string())
        .unwrap_or_else(|| ctx.home().to_string());
    let resolved = ctx.resolve(&requested);
    if ctx.file_system.get_directory(&resolved).is_some() {
        ctx.current_dir = resolved;
        CommandOutput::ok()
    } else {
        CommandOutput::failure(
            EXIT_FAILURE,
            format!("cd: {}: No such file or directory", requested),
        )
    }
}

fn fs_reason(err: &FsError) -> &'static str {
    match err {
        FsError::NotADirectory => "Not a directory",
        FsError::InvalidPath => "Invalid argument",
        FsError::ParentNotFound => "No such file or directory",
    }
}

fn mkdir(args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
    let mut parents = false;
    let mut dirs = Vec::new();
    for arg in args {
        match arg.strip_prefix('-').filter(|flags| !flags.is_empty()) {
            Some(flags) => {
                // Short options only; report the first one that is not `p`.
                if let Some(bad) = flags.chars().find(|&c| c != 'p') {
                    return CommandOutput::failure(
                        EXIT_FAILURE,
                        format!("mkdir: invalid option -- '{}'", bad),
                    );
                }
                parents = true;
            }
            None => dirs.push(*arg),
        }
    }
    if dirs.is_empty() {
        return CommandOutput::failure(EXIT_FAILURE, "mkdir: missing operand");
    }

    let mut out = CommandOutput::ok();
    for dir in dirs {
        let path = ctx.resolve(dir);
        let result = if parents {
            ctx.file_system.create_dir_all(&path)
        } else {
            ctx.file_system.create_directory(&path)
        };
        if let Err(err) = result {
            out.push(Line::toned(
                format!("mkdir: cannot create directory '{}': {}", dir, fs_reason(&err)),
                super::Tone::Error,
            ));
            out.exit_code = EXIT_FAILURE;
        }
    }
    out
}

fn touch(args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
    if args.is_empty() {
        return CommandOutput::failure(EXIT_FAILURE, "touch: missing file operand");
    }
    let mut out = CommandOutput::ok();
    for file in args {
        let path = ctx.resolve(file);
        if ctx.file_system.lookup(&path).is_some() {
            continue;
        }
        if let Err(err) = ctx.file_system.create_file(&path, "") {
            out.push(Line::toned(
                format!("touch: cannot touch '{}': {}", file, fs_reason(&err)),
                super::Tone::Error,
            ));
            out.exit_code = EXIT_FAILURE;
        }
    }
    out
}

fn cat(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    let Some(file) = args.first() else {
        return CommandOutput::failure(EXIT_FAILURE, "cat: missing file operand");
    };
    match ctx.file_system.lookup(&ctx.resolve(file)).and_then(|n| n.content()) {
        Some(content) => CommandOutput::text(content.lines()),
        None => CommandOutput::failure(
            EXIT_FAILURE,
            format!("cat: {}: No such file or directory", file),
        ),
    }
}

fn numeric_mode() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-7]{3,4}$").expect("numeric mode regex must compile"))
}

fn symbolic_mode() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([ugoa]*)([-+=])([rwx]+)$").expect("symbolic mode regex must compile")
    })
}

/// Apply a numeric or symbolic mode to a three digit octal mode string.
pub fn apply_mode(current: &str, mode: &str) -> Option<String> {
    if numeric_mode().is_match(mode) {
        return Some(mode[mode.len() - 3..].to_string());
    }
    let caps = symbolic_mode().captures(mode)?;
    let who = &caps[1];
    let mut mask = 0u32;
    for (class, shift) in [('u', 6), ('g', 3), ('o', 0)] {
        if who.is_empty() || who.contains('a') || who.contains(class) {
            mask |= 0o7 << shift;
        }
    }
    let mut bits = 0u32;
    for p in caps[3].chars() {
        bits |= match p {
            'r' => 0o444,
            'w' => 0o222,
            _ => 0o111,
        };
    }
    bits &= mask;
    let perms = u32::from_str_radix(current, 8).unwrap_or(0o644);
    let next = match &caps[2] {
        "+" => perms | bits,
        "-" => perms & !bits,
        _ => (perms & !mask) | bits,
    };
    Some(format!("{:03o}", next & 0o777))
}

fn chmod(args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
    let Some((mode, files)) = args.split_first() else {
        return CommandOutput::failure(EXIT_FAILURE, "chmod: missing operand");
    };
    if files.is_empty() {
        let mut out = CommandOutput::failure(
            EXIT_FAILURE,
            format!("chmod: missing operand after '{}'", mode),
        );
        out.push(Line::plain("Try 'chmod MODE FILE'"));
        return out;
    }
    if apply_mode("644", mode).is_none() {
        return CommandOutput::failure(EXIT_FAILURE, format!("chmod: invalid mode: '{}'", mode));
    }
    for file in files {
        let path = ctx.resolve(file);
        let Some(node) = ctx.file_system.lookup_mut(&path) else {
            return CommandOutput::failure(
                EXIT_FAILURE,
                format!("chmod: cannot access '{}': No such file or directory", file),
            );
        };
        if let Some(next) = apply_mode(node.permissions(), mode) {
            node.set_permissions(&next);
        }
    }
    CommandOutput::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dispatch;

    fn ctx() -> CommandContext {
        CommandContext::lab("user", "/home/user").unwrap()
    }

    fn run(line: &str, ctx: &mut CommandContext) -> CommandOutput {
        dispatch::<LabCommand>(line, ctx)
    }

    #[test]
    fn test_mkdir_touch_ls() {
        let mut c = ctx();
        assert!(run("mkdir devops-practice", &mut c).success());
        assert!(run("touch notes.txt .hidden", &mut c).success());
        assert_eq!(run("ls", &mut c).texts(), vec!["devops-practice  notes.txt"]);
        let all = run("ls -a", &mut c).texts();
        assert_eq!(all, vec![".hidden  devops-practice  notes.txt"]);
    }

    #[test]
    fn test_ls_long_format() {
        let mut c = ctx();
        run("mkdir src", &mut c);
        let out = run("ls -l", &mut c).texts();
        assert_eq!(out, vec!["drwxr-xr-x  1 user user  4096 Jan 25 12:00 src"]);
        let dir = run("ls -ld /home", &mut c).texts();
        assert_eq!(dir, vec!["drwxr-xr-x  1 user user  4096 Jan 25 12:00 home"]);
    }

    #[test]
    fn test_ls_la_lists_hidden_in_long_format() {
        let mut c = ctx();
        run("mkdir src", &mut c);
        run("touch .env", &mut c);
        assert_eq!(run("ls -l", &mut c).texts().len(), 1);
        for flags in ["-la", "-al"] {
            let out = run(&format!("ls {}", flags), &mut c).texts();
            assert_eq!(
                out,
                vec![
                    "-rw-r--r--  1 user user     0 Jan 25 12:00 .env",
                    "drwxr-xr-x  1 user user  4096 Jan 25 12:00 src",
                ]
            );
        }
    }

    #[test]
    fn test_ls_missing_target() {
        let out = run("ls nowhere", &mut ctx());
        assert_eq!(out.exit_code, EXIT_USAGE);
        assert_eq!(
            out.texts(),
            vec!["ls: cannot access '/home/user/nowhere': No such file or directory"]
        );
        assert!(run("ls /home/user", &mut ctx()).lines.is_empty());
    }

    #[test]
    fn test_cd_verifies_target() {
        let mut c = ctx();
        let out = run("cd missing", &mut c);
        assert_eq!(out.exit_code, EXIT_FAILURE);
        assert_eq!(out.texts(), vec!["cd: missing: No such file or directory"]);
        assert_eq!(c.current_dir, "/home/user");
        assert!(run("cd ..", &mut c).success());
        assert_eq!(c.current_dir, "/home");
        run("cd", &mut c);
        assert_eq!(c.current_dir, "/home/user");
        run("touch f", &mut c);
        assert!(!run("cd f", &mut c).success());
    }

    #[test]
    fn test_mkdir_errors_and_parents() {
        let mut c = ctx();
        let out = run("mkdir a/b", &mut c);
        assert_eq!(
            out.texts(),
            vec!["mkdir: cannot create directory 'a/b': No such file or directory"]
        );
        assert!(run("mkdir -p a/b/c", &mut c).success());
        assert!(c.file_system.get_directory("/home/user/a/b/c").is_some());
        assert_eq!(run("mkdir -x d", &mut c).texts(), vec!["mkdir: invalid option -- 'x'"]);
        assert_eq!(run("mkdir -px d", &mut c).texts(), vec!["mkdir: invalid option -- 'x'"]);
        assert!(c.file_system.lookup("/home/user/d").is_none());
        assert_eq!(run("mkdir", &mut c).texts(), vec!["mkdir: missing operand"]);
        assert_eq!(run("mkdir -p", &mut c).exit_code, EXIT_FAILURE);
    }

    #[test]
    fn test_touch_keeps_existing_and_reports_missing_parent() {
        let mut c = ctx();
        run("mkdir keep", &mut c);
        run("touch keep", &mut c);
        assert!(c.file_system.get_directory("/home/user/keep").is_some());
        let out = run("touch none/f.txt", &mut c);
        assert_eq!(out.exit_code, EXIT_FAILURE);
        assert_eq!(run("touch", &mut c).texts(), vec!["touch: missing file operand"]);
    }

    #[test]
    fn test_cat() {
        let mut c = ctx();
        c.file_system
            .create_file("/home/user/motd", "hello\nworld")
            .unwrap();
        assert_eq!(run("cat motd", &mut c).texts(), vec!["hello", "world"]);
        assert_eq!(run("cat", &mut c).texts(), vec!["cat: missing file operand"]);
        assert_eq!(
            run("cat /home", &mut c).texts(),
            vec!["cat: /home: No such file or directory"]
        );
    }

    #[test]
    fn test_apply_mode() {
        assert_eq!(apply_mode("644", "755").as_deref(), Some("755"));
        assert_eq!(apply_mode("644", "0700").as_deref(), Some("700"));
        assert_eq!(apply_mode("644", "+x").as_deref(), Some("755"));
        assert_eq!(apply_mode("644", "u+x").as_deref(), Some("744"));
        assert_eq!(apply_mode("755", "go-rx").as_deref(), Some("700"));
        assert_eq!(apply_mode("777", "o=r").as_deref(), Some("774"));
        assert_eq!(apply_mode("644", "999"), None);
        assert_eq!(apply_mode("644", "u+z"), None);
    }

    #[test]
    fn test_chmod() {
        let mut c = ctx();
        run("touch deploy.sh", &mut c);
        assert!(run("chmod +x deploy.sh", &mut c).success());
        assert_eq!(
            c.file_system.lookup("/home/user/deploy.sh").unwrap().permissions(),
            "755"
        );
        assert_eq!(
            run("chmod abc deploy.sh", &mut c).texts(),
            vec!["chmod: invalid mode: 'abc'"]
        );
        assert_eq!(
            run("chmod 600 ghost", &mut c).texts(),
            vec!["chmod: cannot access 'ghost': No such file or directory"]
        );
        assert_eq!(run("chmod 600", &mut c).lines.len(), 2);
    }

    #[test]
    fn test_mode_patterns_compile() {
        assert!(numeric_mode().is_match("0755"));
        assert!(!numeric_mode().is_match("758"));
        assert!(symbolic_mode().is_match("ug+rw"));
        assert!(!symbolic_mode().is_match("+q"));
    }
}
