use crate::context::CommandContext;
use crate::error::Error;
use crate::shell::tokenize;
use crate::validator::{Validator, ValidatorSpec};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POINTS: u32 = 10;

fn default_points() -> u32 {
    DEFAULT_POINTS
}

/// Task definition as found in lesson JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub hint: String,
    pub validators: Vec<ValidatorSpec>,
    #[serde(default = "default_points")]
    pub points: u32,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub hint: String,
    pub points: u32,
    validators: Vec<Validator>,
    completed: bool,
}

impl Task {
    pub fn from_spec(spec: &TaskSpec) -> Result<Self, Error> {
        let validators = spec
            .validators
            .iter()
            .map(Validator::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Task {
            id: spec.id.clone(),
            description: spec.description.clone(),
            hint: spec.hint.clone(),
            points: spec.points,
            validators,
            completed: false,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Runs the first validator whose trigger matches. Later validators are
    /// not consulted even if the first one fails.
    fn attempt(&self, command: &str, args: &[&str], ctx: &CommandContext, exit_code: i32) -> bool {
        let Some(validator) = self.validators.iter().find(|v| v.matches(command)) else {
            return false;
        };
        let result = validator.validate(args, ctx, exit_code);
        debug!(
            "task {} validator `{}` -> {}",
            self.id,
            validator.pattern(),
            result.success
        );
        result.success
    }
}

/// What one command changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Indices of tasks completed by this command, in task order.
    pub completed: Vec<usize>,
    /// Set on the single evaluation that completed the last pending task.
    pub scenario_complete: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TaskEngine {
    tasks: Vec<Task>,
    finished: bool,
}

impl TaskEngine {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskEngine {
            tasks,
            finished: false,
        }
    }

    pub fn from_specs(specs: &[TaskSpec]) -> Result<Self, Error> {
        let tasks = specs.iter().map(Task::from_spec).collect::<Result<_, _>>()?;
        Ok(TaskEngine::new(tasks))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn score(&self) -> u32 {
        self.tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.points)
            .sum()
    }

    pub fn first_pending(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| !t.completed)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Check `command` against every pending task. Called after the command
    /// ran, so `ctx` reflects its effects.
    pub fn evaluate(&mut self, command: &str, exit_code: i32, ctx: &CommandContext) -> Evaluation {
        let mut eval = Evaluation::default();
        let command = command.trim();
        let Some((_, args)) = tokenize(command) else {
            return eval;
        };
        for (index, task) in self.tasks.iter_mut().enumerate() {
            if task.completed || !task.attempt(command, &args, ctx, exit_code) {
                continue;
            }
            task.completed = true;
            info!("task {} ({}) completed", index, task.id);
            eval.completed.push(index);
        }
        if !self.finished && !self.tasks.is_empty() && self.tasks.iter().all(|t| t.completed) {
            self.finished = true;
            eval.scenario_complete = true;
            info!("all {} tasks completed", self.tasks.len());
        }
        eval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Category, Check, NodeKind, Tool};

    fn spec(id: &str, validators: Vec<ValidatorSpec>) -> TaskSpec {
        TaskSpec {
            id: id.into(),
            description: format!("do {}", id),
            hint: format!("hint {}", id),
            validators,
            points: 10,
        }
    }

    fn v(pattern: &str, check: Check) -> ValidatorSpec {
        ValidatorSpec::new(pattern, check, "", Category::Linux)
    }

    #[test]
    fn test_one_command_completes_several_tasks() {
        let ctx = CommandContext::scripted("devops", "/home/devops").unwrap();
        let mut engine = TaskEngine::from_specs(&[
            spec("a", vec![v("^docker", Check::Always)]),
            spec("b", vec![ValidatorSpec::tool(Tool::Docker)]),
            spec("c", vec![v("^git", Check::Always)]),
        ])
        .unwrap();
        let eval = engine.evaluate("docker ps", 0, &ctx);
        assert_eq!(eval.completed, vec![0, 1]);
        assert!(!eval.scenario_complete);
        assert_eq!(engine.score(), 20);
        assert_eq!(engine.first_pending().map(|t| t.id.as_str()), Some("c"));
    }

    #[test]
    fn test_only_first_matching_validator_runs() {
        let ctx = CommandContext::scripted("devops", "/home/devops").unwrap();
        let mut engine = TaskEngine::from_specs(&[spec(
            "a",
            vec![
                v("^kubectl", Check::MinArgs { count: 3 }),
                v("^kubectl get", Check::Always),
            ],
        )])
        .unwrap();
        assert!(engine.evaluate("kubectl get pods", 0, &ctx).completed.is_empty());
        assert_eq!(engine.evaluate("kubectl get pods -A", 0, &ctx).completed, vec![0]);
    }

    #[test]
    fn test_completion_is_one_way_and_fires_once() {
        let ctx = CommandContext::scripted("devops", "/home/devops").unwrap();
        let mut engine =
            TaskEngine::from_specs(&[spec("a", vec![v("^pwd$", Check::Always)])]).unwrap();
        let first = engine.evaluate("pwd", 0, &ctx);
        assert!(first.scenario_complete);
        let again = engine.evaluate("pwd", 0, &ctx);
        assert!(again.completed.is_empty());
        assert!(!again.scenario_complete);
        assert!(engine.tasks()[0].is_completed());
        assert!(engine.is_finished());
    }

    #[test]
    fn test_failed_commands_are_still_evaluated() {
        let ctx = CommandContext::scripted("devops", "/home/devops").unwrap();
        let mut engine = TaskEngine::from_specs(&[
            spec("usage", vec![v("^cat$", Check::ExitCode { code: 1 })]),
            spec("never", vec![v("^foobar", Check::ExitCode { code: 0 })]),
        ])
        .unwrap();
        assert_eq!(engine.evaluate("cat", 1, &ctx).completed, vec![0]);
        assert!(engine.evaluate("foobar", 127, &ctx).completed.is_empty());
        assert!(engine.evaluate("   ", 0, &ctx).completed.is_empty());
    }

    #[test]
    fn test_path_check_sees_post_command_state() {
        let mut ctx = CommandContext::lab("user", "/home/user").unwrap();
        let mut engine = TaskEngine::from_specs(&[spec(
            "mkdir",
            vec![v("mkdir", Check::PathExists { node: NodeKind::Dir })],
        )])
        .unwrap();
        assert!(engine.evaluate("mkdir proj", 0, &ctx).completed.is_empty());
        ctx.file_system.create_directory("/home/user/proj").unwrap();
        assert_eq!(engine.evaluate("mkdir proj", 0, &ctx).completed, vec![0]);
    }

    #[test]
    fn test_task_spec_defaults() {
        let spec: TaskSpec = serde_json::from_str(
            r#"{"id":"t","description":"d","validators":[{"pattern":"ls"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.points, DEFAULT_POINTS);
        assert_eq!(spec.hint, "");
    }
}
