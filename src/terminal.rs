//! The interactive session: line editing, dispatch, task evaluation and
//! everything written back to the terminal widget.

use crate::commands::{Action, CommandOutput, Profile, Tone};
use crate::config::{Resolved, TerminalConfig};
use crate::context::CommandContext;
use crate::error::Error;
use crate::safety::{self, DestructiveCommand};
use crate::shell::{self, Completion, History, Key};
use crate::tasks::{Task, TaskEngine};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Output surface the session draws on. xterm.js in the browser, a
/// recording buffer in tests.
pub trait TerminalView {
    fn write(&mut self, data: &str);

    fn write_line(&mut self, line: &str) {
        self.write(line);
        self.write("\r\n");
    }

    fn clear(&mut self);

    fn focus(&mut self) {}
}

/// Callbacks fired as the session progresses. All default to no-ops.
pub trait SessionObserver {
    fn on_task_complete(&mut self, _index: usize, _task: &Task) {}
    fn on_scenario_complete(&mut self) {}
    fn on_command_executed(&mut self, _entry: &CommandHistoryEntry) {}
    fn on_destructive_command(&mut self, _line: &str, _command: &DestructiveCommand) {}
}

impl SessionObserver for () {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandHistoryEntry {
    pub command: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: f64,
    pub success: bool,
    pub output: Vec<String>,
    pub exit_code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMistake {
    pub command: String,
    pub error: String,
    pub hint: Option<String>,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub scenario_id: Option<String>,
    pub started_at: f64,
    pub completed_at: Option<f64>,
    pub score: u32,
    pub tasks_completed: usize,
    pub total_tasks: usize,
    pub command_history: Vec<CommandHistoryEntry>,
    pub mistakes: Vec<CommandMistake>,
    pub time_spent_ms: f64,
}

#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finale {
    Idle,
    Pending,
    Scheduled,
    Done,
}

pub struct Terminal<V, O> {
    profile: Profile,
    user: String,
    host: String,
    scenario_id: Option<String>,
    ctx: CommandContext,
    engine: TaskEngine,
    history: History,
    log: Vec<CommandHistoryEntry>,
    mistakes: Vec<CommandMistake>,
    input: String,
    completion_delay_ms: u32,
    warn_destructive: bool,
    started_at: f64,
    completed_at: Option<f64>,
    finale: Finale,
    view: V,
    observer: O,
}

impl<V: TerminalView, O: SessionObserver> Terminal<V, O> {
    pub fn new(config: &TerminalConfig, view: V, observer: O) -> Result<Self, Error> {
        let Resolved {
            profile,
            scenario_id,
            tasks,
            user,
            host,
            context,
        } = config.resolve()?;
        let engine = TaskEngine::from_specs(&tasks)?;
        info!(
            "session started: profile {:?}, scenario {:?}, {} tasks",
            profile,
            scenario_id,
            engine.total()
        );
        Ok(Terminal {
            profile,
            user,
            host,
            scenario_id,
            ctx: context,
            engine,
            history: History::new(),
            log: Vec::new(),
            mistakes: Vec::new(),
            input: String::new(),
            completion_delay_ms: config.completion_delay_ms,
            warn_destructive: config.warn_destructive,
            started_at: now_ms(),
            completed_at: None,
            finale: Finale::Idle,
            view,
            observer,
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    pub fn engine(&self) -> &TaskEngine {
        &self.engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn entries(&self) -> &[CommandHistoryEntry] {
        &self.log
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn prompt(&self) -> String {
        shell::prompt(&self.user, &self.host, &self.ctx.current_dir, self.ctx.home())
    }

    /// Welcome banner, task list and first prompt.
    pub fn start(&mut self) {
        match self.profile {
            Profile::Filesystem => {
                self.view.write_line("Welcome to DevOps Learning Lab!");
                self.view.write_line("Complete the tasks below to earn XP.");
                self.view.write_line("");
                if self.engine.total() > 0 {
                    self.view.write_line("Tasks:");
                    for (i, task) in self.engine.tasks().iter().enumerate() {
                        self.view
                            .write_line(&format!("  {}. {}", i + 1, task.description));
                    }
                    self.view.write_line("");
                }
                self.view.write_line("Type 'help' for available commands.");
            }
            Profile::Scripted => {
                self.view
                    .write_line(&Tone::Accent.paint("Terminal Command Simulation"));
                self.view.write_line(
                    "Type 'help' for commands, 'tasks' for objectives, 'hint' if stuck.",
                );
                if self.engine.total() > 0 {
                    self.view.write_line("");
                    self.show_tasks();
                }
            }
        }
        self.view.write_line("");
        self.write_prompt();
        self.view.focus();
    }

    fn write_prompt(&mut self) {
        let prompt = self.prompt();
        self.view.write(&prompt);
    }

    fn redraw_input(&mut self) {
        let line = format!("\r\x1b[K{}{}", self.prompt(), self.input);
        self.view.write(&line);
    }

    /// Raw input from the widget: keystrokes, escape sequences or pasted
    /// text.
    pub fn feed(&mut self, data: &str) {
        if data.starts_with('\x1b') {
            self.key(shell::decode(data));
            return;
        }
        let mut prev = None;
        for (i, c) in data.char_indices() {
            if !(c == '\n' && prev == Some('\r')) {
                self.key(shell::decode(&data[i..i + c.len_utf8()]));
            }
            prev = Some(c);
        }
    }

    fn key(&mut self, key: Key<'_>) {
        match key {
            Key::Enter => {
                self.view.write("\r\n");
                let line = std::mem::take(&mut self.input);
                self.execute(&line);
                self.write_prompt();
            }
            Key::Backspace => {
                if self.input.pop().is_some() {
                    self.view.write("\x08 \x08");
                }
            }
            Key::Tab => self.autocomplete(),
            Key::Up => {
                if let Some(line) = self.history.up().map(str::to_string) {
                    self.input = line;
                    self.redraw_input();
                }
            }
            Key::Down => {
                if let Some(line) = self.history.down().map(str::to_string) {
                    self.input = line;
                    self.redraw_input();
                }
            }
            Key::Interrupt => {
                self.view.write("^C\r\n");
                self.input.clear();
                self.history.reset_cursor();
                self.write_prompt();
            }
            Key::Text(text) => {
                self.input.push_str(text);
                self.view.write(text);
            }
            Key::Ignored => {}
        }
    }

    fn autocomplete(&mut self) {
        let names = self.profile.command_names();
        match shell::autocomplete(&self.input, &names) {
            Completion::None => {}
            Completion::Single(name) => {
                let rest = name[self.input.len()..].to_string();
                self.input.push_str(&rest);
                self.view.write(&rest);
            }
            Completion::Many(candidates) => {
                self.view.write("\r\n");
                self.view.write_line(&candidates.join("  "));
                self.write_prompt();
                let partial = self.input.clone();
                self.view.write(&partial);
            }
        }
    }

    /// Run one line as if typed, without touching the input buffer or
    /// writing a prompt. Returns `None` for a blank line.
    pub fn execute(&mut self, line: &str) -> Option<CommandHistoryEntry> {
        let command = line.trim();
        if command.is_empty() {
            return None;
        }
        self.history.push(command);
        self.ctx.history.push(command.to_string());

        if let Some(danger) = safety::detect(command) {
            warn!("destructive command: {}", command);
            if self.warn_destructive {
                for l in safety::warning_lines(danger) {
                    self.view.write_line(&Tone::Heading.paint(&l));
                }
            }
            self.observer.on_destructive_command(command, danger);
        }

        let output = self.profile.execute(command, &mut self.ctx);
        self.render(&output);

        let entry = CommandHistoryEntry {
            command: command.to_string(),
            timestamp: now_ms(),
            success: output.success(),
            output: output.texts(),
            exit_code: output.exit_code,
        };
        if !entry.success {
            self.record_mistake(&entry);
        }
        self.log.push(entry.clone());
        self.observer.on_command_executed(&entry);

        self.evaluate(&entry);
        Some(entry)
    }

    fn render(&mut self, output: &CommandOutput) {
        match output.action {
            Some(Action::Clear) => self.view.clear(),
            Some(Action::ShowHint) => self.show_hint(),
            Some(Action::ShowTasks) => self.show_tasks(),
            None => {}
        }
        for line in &output.lines {
            self.view.write_line(&line.render());
        }
    }

    fn record_mistake(&mut self, entry: &CommandHistoryEntry) {
        let error = entry
            .output
            .first()
            .cloned()
            .unwrap_or_else(|| format!("exit code {}", entry.exit_code));
        let hint = self
            .engine
            .first_pending()
            .map(|t| t.hint.clone())
            .filter(|h| !h.is_empty());
        debug!("mistake recorded for `{}`", entry.command);
        self.mistakes.push(CommandMistake {
            command: entry.command.clone(),
            error,
            hint,
            timestamp: entry.timestamp,
        });
    }

    fn evaluate(&mut self, entry: &CommandHistoryEntry) {
        let eval = self
            .engine
            .evaluate(&entry.command, entry.exit_code, &self.ctx);
        for index in eval.completed {
            let task = &self.engine.tasks()[index];
            let message = match self.profile {
                Profile::Filesystem => format!("✓ Task {} completed!", index + 1),
                Profile::Scripted => format!(
                    "✓ Task completed: {} (+{} pts)",
                    task.description, task.points
                ),
            };
            self.view.write_line("");
            self.view.write_line(&Tone::Success.paint(&message));
            self.view.write_line("");
            self.observer.on_task_complete(index, task);
        }
        if eval.scenario_complete {
            self.completed_at = Some(now_ms());
            self.finale = Finale::Pending;
            if self.completion_delay_ms == 0 {
                self.finish_scenario();
            }
        }
    }

    /// Delay before the completion banner, handed out once so the host can
    /// schedule `finish_scenario`.
    pub fn take_finale_delay(&mut self) -> Option<u32> {
        if self.finale == Finale::Pending {
            self.finale = Finale::Scheduled;
            Some(self.completion_delay_ms)
        } else {
            None
        }
    }

    /// Print the completion banner and fire `on_scenario_complete`. Does
    /// nothing unless every task has just been completed.
    pub fn finish_scenario(&mut self) {
        if !matches!(self.finale, Finale::Pending | Finale::Scheduled) {
            return;
        }
        self.finale = Finale::Done;
        self.view.write_line("");
        match self.profile {
            Profile::Filesystem => {
                self.view
                    .write_line(&Tone::Success.paint("🎉 Congratulations! Lab completed!"));
            }
            Profile::Scripted => {
                let rule = "═══════════════════════════════════════";
                self.view.write_line(&Tone::Success.paint(rule));
                self.view
                    .write_line(&Tone::Success.paint("   🎉 MISSION ACCOMPLISHED! 🎉"));
                self.view.write_line(&Tone::Success.paint(rule));
            }
        }
        self.view.write_line("");
        info!("scenario {:?} complete", self.scenario_id);
        self.observer.on_scenario_complete();
    }

    pub fn show_hint(&mut self) {
        let line = match self.engine.first_pending() {
            Some(task) if !task.hint.is_empty() => format!("💡 Hint: {}", task.hint),
            Some(_) => "No hint available for this task.".to_string(),
            None => "No hints available - all tasks completed!".to_string(),
        };
        self.view.write_line(&Tone::Heading.paint(&line));
    }

    pub fn show_tasks(&mut self) {
        self.view.write_line(&Tone::Heading.paint("Tasks:"));
        let mut lines = Vec::new();
        let mut total_points = 0;
        for (i, task) in self.engine.tasks().iter().enumerate() {
            total_points += task.points;
            let line = format!("  {}. {} ({} pts)", i + 1, task.description, task.points);
            lines.push(if task.is_completed() {
                Tone::Success.paint(&format!("✓{}", line))
            } else {
                format!("○{}", line)
            });
        }
        for line in lines {
            self.view.write_line(&line);
        }
        let score = format!(
            "Progress: {}/{} tasks, {}/{} pts",
            self.engine.completed_count(),
            self.engine.total(),
            self.engine.score(),
            total_points
        );
        self.view.write_line(&Tone::Accent.paint(&score));
    }

    pub fn report(&self) -> SessionReport {
        let end = self.completed_at.unwrap_or_else(now_ms);
        SessionReport {
            scenario_id: self.scenario_id.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
            score: self.engine.score(),
            tasks_completed: self.engine.completed_count(),
            total_tasks: self.engine.total(),
            command_history: self.log.clone(),
            mistakes: self.mistakes.clone(),
            time_spent_ms: (end - self.started_at).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Screen {
        out: String,
        clears: usize,
    }

    impl TerminalView for Screen {
        fn write(&mut self, data: &str) {
            self.out.push_str(data);
        }
        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    fn lab() -> Terminal<Screen, ()> {
        Terminal::new(&TerminalConfig::for_scenario("w1-lab1"), Screen::default(), ()).unwrap()
    }

    #[test]
    fn test_feed_typing_and_backspace() {
        let mut t = lab();
        t.feed("pwdd");
        t.feed("\x7f");
        assert_eq!(t.input(), "pwd");
        t.feed("\r");
        assert_eq!(t.input(), "");
        assert_eq!(t.entries()[0].output, vec!["/home/user"]);
    }

    #[test]
    fn test_pasted_line_with_newline_executes() {
        let mut t = lab();
        t.feed("mkdir a\r");
        assert!(t.context().file_system.get_directory("/home/user/a").is_some());
    }

    #[test]
    fn test_history_keys_restore_input() {
        let mut t = lab();
        t.feed("pwd\r");
        t.feed("\x1b[A");
        assert_eq!(t.input(), "pwd");
        t.feed("\x1b[B");
        assert_eq!(t.input(), "");
    }

    #[test]
    fn test_tab_completion() {
        let mut t = lab();
        t.feed("mk");
        t.feed("\t");
        assert_eq!(t.input(), "mkdir");
        let mut t = lab();
        t.feed("c");
        t.feed("\t");
        assert_eq!(t.input(), "c");
        assert!(t.view().out.contains("cd  cat  chmod  clear"));
    }

    #[test]
    fn test_clear_action() {
        let mut t = lab();
        t.execute("clear");
        assert_eq!(t.view().clears, 1);
    }

    #[test]
    fn test_blank_line_not_recorded() {
        let mut t = lab();
        assert!(t.execute("   ").is_none());
        assert!(t.entries().is_empty());
        assert!(t.history().entries().is_empty());
    }

    #[test]
    fn test_finale_waits_for_host() {
        let mut t = lab();
        t.execute("cd /home");
        t.execute("mkdir devops-practice");
        t.execute("touch devops-practice/notes.txt");
        assert!(!t.view().out.contains("Congratulations"));
        assert_eq!(t.take_finale_delay(), Some(500));
        assert_eq!(t.take_finale_delay(), None);
        t.finish_scenario();
        t.finish_scenario();
        assert_eq!(t.view().out.matches("Congratulations").count(), 1);
        assert!(t.report().completed_at.is_some());
    }

    #[test]
    fn test_mistakes_carry_pending_hint() {
        let mut t = lab();
        t.execute("cat");
        let report = t.report();
        assert_eq!(report.mistakes.len(), 1);
        assert_eq!(report.mistakes[0].error, "cat: missing file operand");
        assert_eq!(
            report.mistakes[0].hint.as_deref(),
            Some("Use 'cd /home' to change into the home directory")
        );
    }
}
