//! Scripted command set used by the scored TCS terminal.
//!
//! Output is fixed narrative text picked for realism; `ls` and `cat` never
//! consult the filesystem and `cd` does not check its target.

use super::{Action, CommandOutput, CommandSet, Line, Tone, EXIT_FAILURE};
use crate::context::CommandContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedCommand {
    Help,
    Hint,
    Tasks,
    Clear,
    Pwd,
    Whoami,
    Env,
    Echo,
    Ls,
    Cd,
    Cat,
    Grep,
    Ps,
    Netstat,
    Ss,
    Ifconfig,
    Ip,
    Docker,
    Kubectl,
    Git,
    Systemctl,
}

impl CommandSet for ScriptedCommand {
    const ALL: &'static [Self] = &[
        ScriptedCommand::Help,
        ScriptedCommand::Hint,
        ScriptedCommand::Tasks,
        ScriptedCommand::Clear,
        ScriptedCommand::Pwd,
        ScriptedCommand::Whoami,
        ScriptedCommand::Env,
        ScriptedCommand::Echo,
        ScriptedCommand::Ls,
        ScriptedCommand::Cd,
        ScriptedCommand::Cat,
        ScriptedCommand::Grep,
        ScriptedCommand::Ps,
        ScriptedCommand::Netstat,
        ScriptedCommand::Ss,
        ScriptedCommand::Ifconfig,
        ScriptedCommand::Ip,
        ScriptedCommand::Docker,
        ScriptedCommand::Kubectl,
        ScriptedCommand::Git,
        ScriptedCommand::Systemctl,
    ];

    fn name(self) -> &'static str {
        match self {
            ScriptedCommand::Help => "help",
            ScriptedCommand::Hint => "hint",
            ScriptedCommand::Tasks => "tasks",
            ScriptedCommand::Clear => "clear",
            ScriptedCommand::Pwd => "pwd",
            ScriptedCommand::Whoami => "whoami",
            ScriptedCommand::Env => "env",
            ScriptedCommand::Echo => "echo",
            ScriptedCommand::Ls => "ls",
            ScriptedCommand::Cd => "cd",
            ScriptedCommand::Cat => "cat",
            ScriptedCommand::Grep => "grep",
            ScriptedCommand::Ps => "ps",
            ScriptedCommand::Netstat => "netstat",
            ScriptedCommand::Ss => "ss",
            ScriptedCommand::Ifconfig => "ifconfig",
            ScriptedCommand::Ip => "ip",
            ScriptedCommand::Docker => "docker",
            ScriptedCommand::Kubectl => "kubectl",
            ScriptedCommand::Git => "git",
            ScriptedCommand::Systemctl => "systemctl",
        }
    }

    fn run(self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        match self {
            ScriptedCommand::Help => help(),
            ScriptedCommand::Hint => CommandOutput::action(Action::ShowHint),
            ScriptedCommand::Tasks => CommandOutput::action(Action::ShowTasks),
            ScriptedCommand::Clear => CommandOutput::action(Action::Clear),
            ScriptedCommand::Pwd => CommandOutput::line(ctx.current_dir.clone()),
            ScriptedCommand::Whoami => CommandOutput::line(ctx.user()),
            ScriptedCommand::Env => CommandOutput::text(
                ctx.environment.iter().map(|(k, v)| format!("{}={}", k, v)),
            ),
            ScriptedCommand::Echo => CommandOutput::line(args.join(" ")),
            ScriptedCommand::Ls => ls(),
            ScriptedCommand::Cd => cd(args, ctx),
            ScriptedCommand::Cat => cat(args),
            ScriptedCommand::Grep => grep(args),
            ScriptedCommand::Ps => CommandOutput::text(ctx.processes.ps_lines()),
            ScriptedCommand::Netstat | ScriptedCommand::Ss => {
                CommandOutput::text(ctx.network.netstat_lines())
            }
            ScriptedCommand::Ifconfig => CommandOutput::text(ctx.network.ifconfig_lines()),
            ScriptedCommand::Ip => ip(args, ctx),
            ScriptedCommand::Docker => docker(args),
            ScriptedCommand::Kubectl => kubectl(args),
            ScriptedCommand::Git => git(args),
            ScriptedCommand::Systemctl => systemctl(args),
        }
    }
}

fn help() -> CommandOutput {
    let sections: [(&str, &[&str]); 7] = [
        ("Basic:", &["pwd, ls, cd, cat, echo, grep", "whoami, env, ps, clear"]),
        ("Docker:", &["docker ps, docker images, docker run, docker exec"]),
        ("Kubernetes:", &["kubectl get pods, kubectl describe, kubectl logs"]),
        ("Git:", &["git status, git log, git clone, git commit"]),
        ("System:", &["systemctl status, netstat, ss"]),
        ("Networking:", &["ifconfig, ip addr, ip route"]),
        ("TCS Commands:", &["help, hint, tasks"]),
    ];
    let mut out = CommandOutput::ok();
    out.push(Line::toned("Available Commands:", Tone::Heading));
    for (title, rows) in sections {
        out.push(Line::plain(""));
        out.push(Line::toned(title, Tone::Accent));
        for row in rows {
            out.push(Line::plain(format!("  {}", row)));
        }
    }
    out
}

fn ls() -> CommandOutput {
    let mut out = CommandOutput::ok();
    for entry in ["app.js", "package.json", "README.md", "src/"] {
        let tone = if entry.ends_with('/') { Tone::Dir } else { Tone::Plain };
        out.push(Line::toned(entry, tone));
    }
    out
}

fn cd(args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
    ctx.current_dir = match args.first() {
        Some(dir) => dir.to_string(),
        None => ctx.home().to_string(),
    };
    CommandOutput::ok()
}

fn cat(args: &[&str]) -> CommandOutput {
    if args.is_empty() {
        return CommandOutput::failure(EXIT_FAILURE, "cat: missing file operand");
    }
    CommandOutput::line("File content here...")
}

fn grep(args: &[&str]) -> CommandOutput {
    if args.len() < 2 {
        return CommandOutput::failure(EXIT_FAILURE, "Usage: grep [OPTION]... PATTERN [FILE]...");
    }
    CommandOutput::text(["matching line 1", "matching line 2"])
}

fn ip(args: &[&str], ctx: &CommandContext) -> CommandOutput {
    match args.first().copied() {
        None => CommandOutput::failure(
            EXIT_FAILURE,
            "Usage: ip [ OPTIONS ] OBJECT { COMMAND | help }",
        ),
        Some("a" | "addr" | "address") => CommandOutput::text(ctx.network.addr_lines()),
        Some("r" | "route") => CommandOutput::text(ctx.network.route_lines()),
        Some(other) => CommandOutput::failure(
            EXIT_FAILURE,
            format!("Object \"{}\" is unknown, try \"ip help\".", other),
        ),
    }
}

fn docker(args: &[&str]) -> CommandOutput {
    let Some(sub) = args.first().copied() else {
        return CommandOutput::failure(EXIT_FAILURE, "Usage: docker [OPTIONS] COMMAND");
    };
    match sub {
        "ps" => CommandOutput::text([
            "CONTAINER ID   IMAGE          COMMAND       STATUS         PORTS",
            "a1b2c3d4e5f6   nginx:latest   \"nginx\"       Up 2 hours     0.0.0.0:80->80/tcp",
        ]),
        "images" => CommandOutput::text([
            "REPOSITORY   TAG       IMAGE ID       CREATED        SIZE",
            "nginx        latest    abc123def456   2 weeks ago    142MB",
        ]),
        "version" => CommandOutput::text([
            "Client: Docker Engine - Community",
            " Version:           24.0.7",
            "Server: Docker Engine - Community",
            " Engine:",
            "  Version:          24.0.7",
        ]),
        _ => CommandOutput::line(format!("Docker {} executed", sub)),
    }
}

fn kubectl(args: &[&str]) -> CommandOutput {
    let Some(sub) = args.first().copied() else {
        return CommandOutput::failure(
            EXIT_FAILURE,
            "kubectl controls the Kubernetes cluster manager",
        );
    };
    if sub != "get" {
        return CommandOutput::line(format!("kubectl {} executed", sub));
    }
    match args.get(1).copied() {
        Some("pods" | "pod" | "po") => CommandOutput::text([
            "NAME                     READY   STATUS    RESTARTS   AGE",
            "nginx-6799fc88d8-abc12   1/1     Running   0          2h",
        ]),
        Some("nodes" | "node" | "no") => CommandOutput::text([
            "NAME       STATUS   ROLES           AGE   VERSION",
            "worker-1   Ready    <none>          12d   v1.28.2",
            "worker-2   Ready    <none>          12d   v1.28.2",
        ]),
        Some("services" | "service" | "svc") => CommandOutput::text([
            "NAME         TYPE        CLUSTER-IP     EXTERNAL-IP   PORT(S)   AGE",
            "kubernetes   ClusterIP   10.96.0.1      <none>        443/TCP   12d",
            "nginx        NodePort    10.96.120.15   <none>        80:30080/TCP   2h",
        ]),
        Some(other) => CommandOutput::failure(
            EXIT_FAILURE,
            format!("Error: the server doesn't have a resource type \"{}\"", other),
        ),
        None => CommandOutput::failure(
            EXIT_FAILURE,
            "error: You must specify the type of resource to get.",
        ),
    }
}

fn git(args: &[&str]) -> CommandOutput {
    let Some(sub) = args.first().copied() else {
        return CommandOutput::failure(
            EXIT_FAILURE,
            "usage: git [--version] [--help] <command> [<args>]",
        );
    };
    match sub {
        "status" => CommandOutput::text([
            "On branch main",
            "Your branch is up to date with 'origin/main'.",
            "",
            "nothing to commit, working tree clean",
        ]),
        "log" => CommandOutput::text([
            "commit abc123def456 (HEAD -> main)",
            "Author: DevOps User <devops@example.com>",
            "Date:   Fri Dec 6 2025",
            "",
            "    Initial commit",
        ]),
        "branch" => {
            let mut out = CommandOutput::ok();
            out.push(Line::toned("* main", Tone::Success));
            out.push(Line::plain("  feature/healthcheck"));
            out
        }
        _ => CommandOutput::line(format!("git {} executed", sub)),
    }
}

fn systemctl(args: &[&str]) -> CommandOutput {
    let (Some(action), Some(service)) = (args.first().copied(), args.get(1).copied()) else {
        return CommandOutput::failure(EXIT_FAILURE, "Usage: systemctl [COMMAND] [SERVICE]");
    };
    let done = match action {
        "status" => {
            let mut out = CommandOutput::ok();
            out.push(Line::plain(format!("● {}.service - {} Service", service, service)));
            out.push(Line::plain(format!(
                "   Loaded: loaded (/lib/systemd/system/{}.service; enabled)",
                service
            )));
            out.push(Line::toned(
                "   Active: active (running) since Fri 2025-12-06 10:00:00 UTC",
                Tone::Success,
            ));
            return out;
        }
        "start" => "started",
        "stop" => "stopped",
        "restart" => "restarted",
        _ => return CommandOutput::line(format!("systemctl {} {} executed", action, service)),
    };
    CommandOutput::line(format!("Service {} {}", service, done))
}
