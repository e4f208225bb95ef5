//! Built-in lab and drill definitions.

use crate::commands::Profile;
use crate::tasks::TaskSpec;
use crate::validator::{Category, Check, NodeKind, Tool, ValidatorSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub id: &'static str,
    pub profile: Profile,
    pub tasks: Vec<TaskSpec>,
}

pub const IDS: [&str; 5] = [
    "w1-lab1",
    "docker-basics",
    "k8s-triage",
    "git-basics",
    "linux-recon",
];

fn task(id: &str, description: &str, hint: &str, points: u32, validators: Vec<ValidatorSpec>) -> TaskSpec {
    TaskSpec {
        id: id.to_string(),
        description: description.to_string(),
        hint: hint.to_string(),
        validators,
        points,
    }
}

fn on(pattern: &str, check: Check, category: Category) -> ValidatorSpec {
    ValidatorSpec::new(pattern, check, "", category)
}

fn tool(pattern: &str, tool: Tool) -> ValidatorSpec {
    ValidatorSpec::new(pattern, Check::Tool { tool }, tool.description(), tool.category())
}

pub fn builtin(id: &str) -> Option<Scenario> {
    let scenario = match id {
        "w1-lab1" => Scenario {
            id: "w1-lab1",
            profile: Profile::Filesystem,
            tasks: vec![
                task(
                    "navigate-home",
                    "Navigate to the /home directory",
                    "Use 'cd /home' to change into the home directory",
                    10,
                    vec![on(r"cd /home", Check::Always, Category::Linux)],
                ),
                task(
                    "create-practice-dir",
                    "Create a directory named devops-practice",
                    "Use 'mkdir devops-practice'",
                    10,
                    vec![on(
                        r"mkdir.*devops-practice",
                        Check::PathExists { node: NodeKind::Dir },
                        Category::Linux,
                    )],
                ),
                task(
                    "create-text-file",
                    "Create a .txt file",
                    "Use 'touch notes.txt'",
                    10,
                    vec![on(
                        r"touch.*\.txt",
                        Check::PathExists { node: NodeKind::File },
                        Category::Linux,
                    )],
                ),
            ],
        },
        "docker-basics" => Scenario {
            id: "docker-basics",
            profile: Profile::Scripted,
            tasks: vec![
                task(
                    "docker-ps",
                    "List the running containers",
                    "docker ps shows running containers",
                    10,
                    vec![tool(r"^docker ps\b", Tool::Docker)],
                ),
                task(
                    "docker-images",
                    "List the local images",
                    "docker images lists what has been pulled",
                    10,
                    vec![tool(r"^docker images\b", Tool::Docker)],
                ),
                task(
                    "docker-version",
                    "Check the Docker client and server version",
                    "Try docker version",
                    5,
                    vec![tool(r"^docker version\b", Tool::Docker)],
                ),
            ],
        },
        "k8s-triage" => Scenario {
            id: "k8s-triage",
            profile: Profile::Scripted,
            tasks: vec![
                task(
                    "pods",
                    "List the pods in the cluster",
                    "kubectl get pods",
                    10,
                    vec![on(
                        r"^kubectl get\b",
                        Check::ArgEquals {
                            index: 1,
                            value: "pods".into(),
                        },
                        Category::Kubernetes,
                    )],
                ),
                task(
                    "nodes",
                    "Check the node status",
                    "kubectl get nodes",
                    10,
                    vec![tool(r"^kubectl get nodes\b", Tool::Kubectl)],
                ),
                task(
                    "services",
                    "List the services",
                    "kubectl get services",
                    10,
                    vec![tool(r"^kubectl get services\b", Tool::Kubectl)],
                ),
                task(
                    "ports",
                    "Find which ports the web server listens on",
                    "netstat or ss show listening sockets",
                    15,
                    vec![on(
                        r"^(netstat|ss)\b",
                        Check::ExitCode { code: 0 },
                        Category::Networking,
                    )],
                ),
            ],
        },
        "git-basics" => Scenario {
            id: "git-basics",
            profile: Profile::Scripted,
            tasks: vec![
                task(
                    "status",
                    "Check the working tree status",
                    "git status",
                    10,
                    vec![tool(r"^git status\b", Tool::Git)],
                ),
                task(
                    "log",
                    "Review the commit history",
                    "git log",
                    10,
                    vec![tool(r"^git log\b", Tool::Git)],
                ),
                task(
                    "branch",
                    "List the branches",
                    "git branch",
                    10,
                    vec![tool(r"^git branch\b", Tool::Git)],
                ),
            ],
        },
        "linux-recon" => Scenario {
            id: "linux-recon",
            profile: Profile::Scripted,
            tasks: vec![
                task(
                    "whoami",
                    "Find out which user you are",
                    "whoami",
                    5,
                    vec![on(r"^whoami$", Check::Always, Category::Linux)],
                ),
                task(
                    "where",
                    "Print the working directory",
                    "pwd",
                    5,
                    vec![on(r"^pwd$", Check::Always, Category::Linux)],
                ),
                task(
                    "processes",
                    "List the running processes",
                    "ps aux",
                    10,
                    vec![on(r"^ps\b", Check::Always, Category::System)],
                ),
                task(
                    "service",
                    "Check the status of the nginx service",
                    "systemctl status nginx",
                    10,
                    vec![on(
                        r"^systemctl status\b",
                        Check::ArgEquals {
                            index: 1,
                            value: "nginx".into(),
                        },
                        Category::System,
                    )],
                ),
            ],
        },
        _ => return None,
    };
    Some(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskEngine;

    #[test]
    fn test_every_builtin_compiles() {
        for id in IDS {
            let scenario = builtin(id).unwrap();
            assert_eq!(scenario.id, id);
            assert!(!scenario.tasks.is_empty());
            assert!(TaskEngine::from_specs(&scenario.tasks).is_ok());
        }
        assert!(builtin("w9-nope").is_none());
    }

    #[test]
    fn test_lab_profile() {
        assert_eq!(builtin("w1-lab1").unwrap().profile, Profile::Filesystem);
        assert_eq!(builtin("git-basics").unwrap().profile, Profile::Scripted);
    }
}
