//! Task validators: a trigger regex over the raw command plus a check run
//! against the command's arguments and the context it left behind.

use crate::context::CommandContext;
use crate::error::Error;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub output: Vec<String>,
    pub exit_code: i32,
}

impl ValidationResult {
    pub fn pass<I, S>(output: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationResult {
            success: true,
            output: output.into_iter().map(Into::into).collect(),
            exit_code: 0,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ValidationResult {
            success: false,
            output: vec![message.into()],
            exit_code: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Linux,
    Docker,
    Kubernetes,
    Git,
    Networking,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Any,
    Dir,
    File,
}

/// Stock validators for the common tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Ls,
    Grep,
    Docker,
    Kubectl,
    Git,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Ls => "ls",
            Tool::Grep => "grep",
            Tool::Docker => "docker",
            Tool::Kubectl => "kubectl",
            Tool::Git => "git",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Tool::Ls | Tool::Grep => Category::Linux,
            Tool::Docker => Category::Docker,
            Tool::Kubectl => Category::Kubernetes,
            Tool::Git => Category::Git,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::Ls => "List directory contents",
            Tool::Grep => "Search text using patterns",
            Tool::Docker => "Docker container management",
            Tool::Kubectl => "Kubernetes cluster management",
            Tool::Git => "Version control with Git",
        }
    }

    fn validate(self, args: &[&str]) -> ValidationResult {
        let sub = args.first();
        match (self, sub) {
            (Tool::Ls, _) => ValidationResult::pass(["file1.txt", "file2.txt", "directory1/"]),
            (Tool::Grep, _) if args.len() < 2 => {
                ValidationResult::fail("grep: missing pattern or file")
            }
            (Tool::Grep, _) => ValidationResult::pass(["matching line 1", "matching line 2"]),
            (Tool::Docker, None) => ValidationResult::fail("Usage: docker [OPTIONS] COMMAND"),
            (Tool::Docker, Some(s)) => ValidationResult::pass([format!("Docker {} executed", s)]),
            (Tool::Kubectl, None) => {
                ValidationResult::fail("kubectl controls the Kubernetes cluster manager")
            }
            (Tool::Kubectl, Some(s)) => {
                ValidationResult::pass([format!("kubectl {} executed", s)])
            }
            (Tool::Git, None) => {
                ValidationResult::fail("usage: git [--version] [--help] <command> [<args>]")
            }
            (Tool::Git, Some(s)) => ValidationResult::pass([format!("git {} executed", s)]),
        }
    }
}

/// The predicate half of a validator, in the form lesson JSON uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    /// Matching the trigger is enough.
    Always,
    MinArgs {
        count: usize,
    },
    ArgEquals {
        index: usize,
        value: String,
    },
    /// The executed command must have exited with `code`.
    ExitCode {
        #[serde(default)]
        code: i32,
    },
    /// The last non-flag argument, resolved against the current directory,
    /// must exist.
    PathExists {
        #[serde(default)]
        node: NodeKind,
    },
    CwdEquals {
        path: String,
    },
    EnvEquals {
        key: String,
        value: String,
    },
    Tool {
        tool: Tool,
    },
}

impl Check {
    fn run(&self, args: &[&str], ctx: &CommandContext, exit_code: i32) -> ValidationResult {
        match self {
            Check::Always => ValidationResult::pass(Vec::<String>::new()),
            Check::MinArgs { count } if args.len() >= *count => {
                ValidationResult::pass(Vec::<String>::new())
            }
            Check::MinArgs { count } => ValidationResult::fail(format!(
                "expected at least {} argument(s), got {}",
                count,
                args.len()
            )),
            Check::ArgEquals { index, value } => match args.get(*index) {
                Some(a) if a == value => ValidationResult::pass(Vec::<String>::new()),
                _ => ValidationResult::fail(format!("argument {} should be `{}`", index + 1, value)),
            },
            Check::ExitCode { code } if exit_code == *code => {
                ValidationResult::pass(Vec::<String>::new())
            }
            Check::ExitCode { code } => {
                ValidationResult::fail(format!("exit code {}, expected {}", exit_code, code))
            }
            Check::PathExists { node } => {
                let Some(target) = args.iter().rev().find(|a| !a.starts_with('-')) else {
                    return ValidationResult::fail("no path given");
                };
                let path = ctx.resolve(target);
                let found = ctx.file_system.lookup(&path).map(|n| n.is_dir());
                match (node, found) {
                    (NodeKind::Any, Some(_))
                    | (NodeKind::Dir, Some(true))
                    | (NodeKind::File, Some(false)) => ValidationResult::pass([path]),
                    _ => ValidationResult::fail(format!("{}: not found", path)),
                }
            }
            Check::CwdEquals { path } if ctx.current_dir == *path => {
                ValidationResult::pass([path.clone()])
            }
            Check::CwdEquals { path } => ValidationResult::fail(format!(
                "working directory is {}, expected {}",
                ctx.current_dir, path
            )),
            Check::EnvEquals { key, value } => match ctx.environment.get(key) {
                Some(v) if v == value => ValidationResult::pass(Vec::<String>::new()),
                _ => ValidationResult::fail(format!("{} is not set to {}", key, value)),
            },
            Check::Tool { tool } => tool.validate(args),
        }
    }
}

/// Serialisable validator definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSpec {
    pub pattern: String,
    #[serde(default = "always")]
    pub check: Check,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
}

fn always() -> Check {
    Check::Always
}

impl ValidatorSpec {
    pub fn new(pattern: &str, check: Check, description: &str, category: Category) -> Self {
        ValidatorSpec {
            pattern: pattern.to_string(),
            check,
            description: description.to_string(),
            category,
        }
    }

    pub fn tool(tool: Tool) -> Self {
        ValidatorSpec::new(
            &format!(r"^{}\b", tool.name()),
            Check::Tool { tool },
            tool.description(),
            tool.category(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    pattern: Regex,
    check: Check,
    pub description: String,
    pub category: Category,
}

impl Validator {
    pub fn from_spec(spec: &ValidatorSpec) -> Result<Self, Error> {
        let pattern = Regex::new(&spec.pattern).map_err(|source| Error::Pattern {
            pattern: spec.pattern.clone(),
            source,
        })?;
        Ok(Validator {
            pattern,
            check: spec.check.clone(),
            description: spec.description.clone(),
            category: spec.category,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }

    /// `args` are the tokens after the command name; `exit_code` is what
    /// the command itself returned.
    pub fn validate(
        &self,
        args: &[&str],
        ctx: &CommandContext,
        exit_code: i32,
    ) -> ValidationResult {
        self.check.run(args, ctx, exit_code)
    }
}
