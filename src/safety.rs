//! Recognises commands that would be dangerous on a real machine so the
//! terminal can warn before running them.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestructiveCommand {
    pub command: &'static str,
    pub severity: Severity,
    pub risks: &'static [&'static str],
    pub checklist: &'static [&'static str],
    pub alternatives: &'static [&'static str],
}

pub static DESTRUCTIVE: [DestructiveCommand; 9] = [
    DestructiveCommand {
        command: "rm -rf",
        severity: Severity::High,
        risks: &[
            "Permanently deletes files and directories",
            "No confirmation prompt - executes immediately",
            "Cannot be undone",
            "Can destroy entire systems if path is wrong",
        ],
        checklist: &[
            "I have verified the exact path I want to delete",
            "I have checked there are no typos in the path",
            "I have a backup of critical data",
            "I am not in the root directory or home directory",
        ],
        alternatives: &[
            "Use rm -i for interactive confirmation",
            "Use rm -r (without -f) to see errors",
            "Move to trash instead of permanent delete",
        ],
    },
    DestructiveCommand {
        command: "docker system prune",
        severity: Severity::High,
        risks: &[
            "Removes all stopped containers",
            "Deletes all dangling images",
            "Removes all unused networks",
            "Can break dependent applications",
        ],
        checklist: &[
            "I have listed all containers (docker ps -a)",
            "I have checked for containers I need to keep",
            "I am not running this on a production server",
        ],
        alternatives: &[
            "Use docker container prune to only remove containers",
            "Use docker image prune to only remove images",
            "Manually remove specific containers with docker rm",
        ],
    },
    DestructiveCommand {
        command: "kubectl delete",
        severity: Severity::High,
        risks: &[
            "Permanently removes Kubernetes resources",
            "Can cause service outages",
            "May delete multiple resources if selector is broad",
        ],
        checklist: &[
            "I have verified the namespace",
            "I have checked which resources will be deleted (--dry-run)",
            "I have confirmed this is not a production cluster",
        ],
        alternatives: &[
            "Use kubectl delete --dry-run=client first",
            "Scale to 0 replicas instead of deleting",
            "Use labels carefully to avoid broad deletions",
        ],
    },
    DestructiveCommand {
        command: "DROP DATABASE",
        severity: Severity::High,
        risks: &[
            "Permanently deletes entire database",
            "All tables, data, and schemas are lost",
            "Will break applications using this database",
        ],
        checklist: &[
            "I have verified the database name",
            "I have a complete backup",
            "This is not a production database",
        ],
        alternatives: &[
            "Create a backup first with mysqldump or pg_dump",
            "Archive the database instead of dropping",
            "Revoke access instead if trying to secure data",
        ],
    },
    DestructiveCommand {
        command: "chmod 777",
        severity: Severity::Medium,
        risks: &[
            "Gives everyone read, write, execute permissions",
            "Can allow unauthorized access",
            "Violates principle of least privilege",
        ],
        checklist: &[
            "I have considered more restrictive permissions",
            "This is temporary for debugging only",
            "This file does not contain sensitive data",
        ],
        alternatives: &[
            "Use chmod 755 for executables",
            "Use chmod 644 for regular files",
            "Set ownership with chown instead",
        ],
    },
    DestructiveCommand {
        command: "dd",
        severity: Severity::High,
        risks: &[
            "Can overwrite entire disks",
            "One wrong parameter destroys data",
            "No confirmation or undo",
        ],
        checklist: &[
            "I have double-checked the if= and of= parameters",
            "I am not writing to my main system disk",
            "I have verified disk identifiers with lsblk",
        ],
        alternatives: &[
            "Use rsync for file copying",
            "Use dedicated disk imaging tools",
            "Verify devices with lsblk before running",
        ],
    },
    DestructiveCommand {
        command: "mkfs",
        severity: Severity::High,
        risks: &[
            "Formats entire disk partition",
            "Destroys all existing data",
            "Wrong device destroys system",
        ],
        checklist: &[
            "I have verified the device name",
            "I have unmounted the partition first",
            "This is not my system partition",
        ],
        alternatives: &[],
    },
    DestructiveCommand {
        command: "git push --force",
        severity: Severity::Medium,
        risks: &[
            "Overwrites remote history",
            "Can lose team members' commits",
            "Breaks others' local repositories",
        ],
        checklist: &[
            "I have communicated with my team",
            "I have considered using --force-with-lease instead",
            "This is not the main/master branch",
        ],
        alternatives: &[
            "Use git push --force-with-lease for safety",
            "Revert commits instead of rewriting history",
        ],
    },
    DestructiveCommand {
        command: "terraform destroy",
        severity: Severity::High,
        risks: &[
            "Destroys all infrastructure managed by Terraform",
            "Can cause major service outages",
        ],
        checklist: &[
            "I have verified the workspace/environment",
            "I have run terraform plan -destroy first",
        ],
        alternatives: &[
            "Use terraform destroy -target to remove specific resources",
            "Use separate workspaces for production",
        ],
    },
];

// Spellings the plain substring table misses, mapped to their entry.
fn variants() -> &'static [(Regex, usize)] {
    static VARIANTS: OnceLock<Vec<(Regex, usize)>> = OnceLock::new();
    VARIANTS.get_or_init(|| {
        [
            (r"rm\s+(-\w*r\w*f\w*|-\w*f\w*r\w*)", 0),
            (r"chmod\s+0?7{3}\b", 4),
            (r"(^|[\s;&|])dd\s", 5),
        ]
        .into_iter()
        .map(|(re, idx)| (Regex::new(re).expect("destructive pattern must compile"), idx))
        .collect()
    })
}

/// Classify `line`, case-insensitively.
pub fn detect(line: &str) -> Option<&'static DestructiveCommand> {
    let normalized = line.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if let Some(hit) = DESTRUCTIVE
        .iter()
        .filter(|d| d.command.len() > 2)
        .find(|d| normalized.contains(&d.command.to_lowercase()))
    {
        return Some(hit);
    }
    variants()
        .iter()
        .find(|(re, _)| re.is_match(&normalized))
        .map(|(_, idx)| &DESTRUCTIVE[*idx])
}

/// The warning block printed ahead of a destructive command.
pub fn warning_lines(cmd: &DestructiveCommand) -> Vec<String> {
    let mut out = vec![format!(
        "WARNING: `{}` is a destructive command (severity: {:?})",
        cmd.command, cmd.severity
    )];
    out.extend(cmd.risks.iter().map(|r| format!("  - {}", r)));
    if !cmd.alternatives.is_empty() {
        out.push("Safer alternatives:".to_string());
        out.extend(cmd.alternatives.iter().map(|a| format!("  * {}", a)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_matches() {
        assert_eq!(detect("sudo rm -rf /var/www").unwrap().command, "rm -rf");
        assert_eq!(detect("docker system prune -a").unwrap().command, "docker system prune");
        assert_eq!(detect("drop database prod;").unwrap().command, "DROP DATABASE");
        assert_eq!(detect("kubectl delete pod x").unwrap().severity, Severity::High);
    }

    #[test]
    fn test_variants() {
        assert_eq!(detect("rm -fr build").unwrap().command, "rm -rf");
        assert_eq!(detect("rm -Rf build").unwrap().command, "rm -rf");
        assert_eq!(detect("chmod 0777 f").unwrap().command, "chmod 777");
        assert_eq!(detect("sudo dd if=/dev/zero of=/dev/sda").unwrap().command, "dd");
    }

    #[test]
    fn test_variant_patterns_compile() {
        let compiled = variants();
        assert_eq!(compiled.len(), 3);
        for (re, idx) in compiled {
            assert!(*idx < DESTRUCTIVE.len(), "{}", re);
        }
    }

    #[test]
    fn test_safe_commands() {
        for line in ["", "ls -la", "rm notes.txt", "chmod 755 run.sh", "echo add", "kubectl get pods"] {
            assert!(detect(line).is_none(), "{}", line);
        }
    }

    #[test]
    fn test_warning_lines() {
        let lines = warning_lines(&DESTRUCTIVE[4]);
        assert!(lines[0].contains("chmod 777"));
        assert!(lines[0].contains("Medium"));
        assert!(lines.contains(&"Safer alternatives:".to_string()));
    }
}
