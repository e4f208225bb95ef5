use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcStatus {
    Running,
    Stopped,
    Zombie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub pid: u32,
    pub name: String,
    pub user: String,
    pub status: ProcStatus,
    pub cpu: f32,
    pub memory: u32,
    /// Accumulated CPU time in seconds, shown as `m:ss` by `ps`.
    pub cpu_time: u32,
    pub command: String,
}

/// The fake process list a session carries. Nothing here ever runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessTable {
    next_pid: u32,
    procs: Vec<Process>,
}

impl ProcessTable {
    pub fn new() -> Self {
        ProcessTable {
            next_pid: 1,
            procs: Vec::new(),
        }
    }

    pub fn spawn(&mut self, name: &str, user: &str, command: &str) -> u32 {
        let pid = self.next_pid.max(1);
        self.spawn_with_pid(pid, name, user, command)
    }

    /// Insert a process at a fixed pid; later spawns continue after it.
    pub fn spawn_with_pid(&mut self, pid: u32, name: &str, user: &str, command: &str) -> u32 {
        self.procs.retain(|p| p.pid != pid);
        self.procs.push(Process {
            pid,
            name: name.into(),
            user: user.into(),
            status: ProcStatus::Running,
            cpu: 0.0,
            memory: 0,
            cpu_time: 0,
            command: command.into(),
        });
        self.procs.sort_by_key(|p| p.pid);
        self.next_pid = self.next_pid.max(pid + 1);
        pid
    }

    pub fn get_mut(&mut self, pid: u32) -> Option<&mut Process> {
        self.procs.iter_mut().find(|p| p.pid == pid)
    }

    pub fn list(&self) -> &[Process] {
        &self.procs
    }

    /// Rows in `ps` layout, header first.
    pub fn ps_lines(&self) -> Vec<String> {
        let mut out = vec![format!("{:>5}  {:<8} {:>5}  {}", "PID", "USER", "TIME", "COMMAND")];
        for p in &self.procs {
            let st = match p.status {
                ProcStatus::Running => "",
                ProcStatus::Stopped => " (stopped)",
                ProcStatus::Zombie => " <defunct>",
            };
            out.push(format!(
                "{:>5}  {:<8} {:>5}  {}{}",
                p.pid,
                p.user,
                format!("{}:{:02}", p.cpu_time / 60, p.cpu_time % 60),
                p.command,
                st
            ));
        }
        out
    }
}
