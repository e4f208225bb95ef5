use crate::commands::Profile;
use crate::context::CommandContext;
use crate::error::Error;
use crate::scenarios::{self, Scenario};
use crate::tasks::TaskSpec;
use crate::vfs::{resolve_path, FileSystemNode};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_COMPLETION_DELAY_MS: u32 = 500;

fn default_delay() -> u32 {
    DEFAULT_COMPLETION_DELAY_MS
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Session configuration, usually handed over from JavaScript as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminalConfig {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub tasks: Option<Vec<TaskSpec>>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub filesystem: Option<FileSystemNode>,
    #[serde(default = "default_delay")]
    pub completion_delay_ms: u32,
    #[serde(default = "default_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub warn_destructive: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            profile: None,
            scenario: None,
            tasks: None,
            user: None,
            host: None,
            home: None,
            cwd: None,
            environment: BTreeMap::new(),
            filesystem: None,
            completion_delay_ms: DEFAULT_COMPLETION_DELAY_MS,
            log_level: default_level(),
            warn_destructive: true,
        }
    }
}

/// A config with every default filled in.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub profile: Profile,
    pub scenario_id: Option<String>,
    pub tasks: Vec<TaskSpec>,
    pub user: String,
    pub host: String,
    pub context: CommandContext,
}

/// Absolute paths come back normalised.
fn absolute(field: &'static str, value: &str) -> Result<String, Error> {
    if value.starts_with('/') {
        Ok(resolve_path(value, "/"))
    } else {
        Err(Error::RelativePath {
            field,
            value: value.to_string(),
        })
    }
}

impl TerminalConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn for_scenario(id: &str) -> Self {
        TerminalConfig {
            scenario: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn log_level(&self) -> Result<log::LevelFilter, Error> {
        self.log_level
            .parse()
            .map_err(|_| Error::LogLevel(self.log_level.clone()))
    }

    /// Fill in defaults from the profile and scenario, then build the
    /// initial context.
    pub fn resolve(&self) -> Result<Resolved, Error> {
        self.build().map_err(|err| {
            warn!("rejected configuration: {}", err);
            err
        })
    }

    fn build(&self) -> Result<Resolved, Error> {
        self.log_level()?;
        let scenario: Option<Scenario> = match &self.scenario {
            Some(id) => Some(
                scenarios::builtin(id).ok_or_else(|| Error::UnknownScenario(id.clone()))?,
            ),
            None => None,
        };
        let profile = self
            .profile
            .or(scenario.as_ref().map(|s| s.profile))
            .unwrap_or_default();

        let tasks = match (&self.tasks, &scenario) {
            (Some(tasks), _) => tasks.clone(),
            (None, Some(s)) => s.tasks.clone(),
            (None, None) => Vec::new(),
        };
        if let (Some(id), true) = (&self.scenario, tasks.is_empty()) {
            return Err(Error::EmptyScenario(id.clone()));
        }

        let user = self.user.clone().unwrap_or_else(|| profile.default_user().to_string());
        let host = self.host.clone().unwrap_or_else(|| profile.default_host().to_string());
        let home = absolute("home", self.home.as_deref().unwrap_or(profile.default_home()))?;
        let home_error = |source| Error::Home {
            path: home.clone(),
            source,
        };

        let mut context = match &self.filesystem {
            Some(fs) => {
                let mut ctx = CommandContext::new(&user, &home, fs.clone());
                ctx.file_system.create_dir_all(&home).map_err(home_error)?;
                ctx
            }
            None => profile.initial_context(&user, &home).map_err(home_error)?,
        };
        if let Some(cwd) = &self.cwd {
            let cwd = absolute("cwd", cwd)?;
            if profile == Profile::Filesystem && context.file_system.get_directory(&cwd).is_none() {
                return Err(Error::Cwd(cwd));
            }
            context.current_dir = cwd;
        }
        context
            .environment
            .extend(self.environment.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(Resolved {
            profile,
            scenario_id: self.scenario.clone(),
            tasks,
            user,
            host,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;

    #[test]
    fn test_empty_json_is_default() {
        let cfg = TerminalConfig::from_json("").unwrap();
        assert_eq!(cfg, TerminalConfig::default());
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.profile, Profile::Scripted);
        assert_eq!(resolved.user, "devops");
        assert_eq!(resolved.context.current_dir, "/home/devops");
        assert!(resolved.tasks.is_empty());
    }

    #[test]
    fn test_scenario_picks_profile() {
        let resolved = TerminalConfig::for_scenario("w1-lab1").resolve().unwrap();
        assert_eq!(resolved.profile, Profile::Filesystem);
        assert_eq!(resolved.host, "devops");
        assert_eq!(resolved.tasks.len(), 3);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(matches!(
            TerminalConfig::from_json(r#"{"profil":"lab"}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            TerminalConfig::for_scenario("nope").resolve(),
            Err(Error::UnknownScenario(_))
        ));
        let cfg = TerminalConfig::from_json(r#"{"home":"home/u"}"#).unwrap();
        assert!(matches!(cfg.resolve(), Err(Error::RelativePath { field: "home", .. })));
        let cfg = TerminalConfig::from_json(r#"{"scenario":"git-basics","tasks":[]}"#).unwrap();
        assert!(matches!(cfg.resolve(), Err(Error::EmptyScenario(_))));
    }

    #[test]
    fn test_overrides() {
        let cfg = TerminalConfig::from_json(
            r#"{
                "profile": "filesystem",
                "user": "ana",
                "home": "/home/ana",
                "cwd": "/",
                "environment": {"EDITOR": "vi"},
                "filesystem": {"type": "dir", "children": {"srv": {"type": "dir", "children": {}}}},
                "log_level": "debug",
                "completion_delay_ms": 0
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.log_level().unwrap(), log::LevelFilter::Debug);
        let r = cfg.resolve().unwrap();
        assert_eq!(r.context.current_dir, "/");
        assert_eq!(r.context.environment.get("EDITOR").map(String::as_str), Some("vi"));
        assert_eq!(r.context.user(), "ana");
        assert!(r.context.file_system.get_directory("/srv").is_some());
        assert!(r.context.file_system.get_directory("/home/ana").is_some());
    }

    #[test]
    fn test_home_blocked_by_file() {
        let cfg = TerminalConfig::from_json(
            r#"{"profile":"filesystem","filesystem":{"type":"dir","children":{"home":{"type":"file"}}}}"#,
        )
        .unwrap();
        assert!(matches!(
            cfg.resolve(),
            Err(Error::Home { source: FsError::NotADirectory, .. })
        ));
        let cfg = TerminalConfig::from_json(r#"{"home":"/etc/hostname/devops"}"#).unwrap();
        assert!(matches!(cfg.resolve(), Err(Error::Home { .. })));
    }

    #[test]
    fn test_lab_cwd_must_be_directory() {
        let cfg = TerminalConfig::from_json(r#"{"profile":"filesystem","cwd":"/nowhere"}"#).unwrap();
        assert!(matches!(cfg.resolve(), Err(Error::Cwd(path)) if path == "/nowhere"));
        let cfg = TerminalConfig::from_json(r#"{"profile":"filesystem","cwd":"/etc"}"#).unwrap();
        assert_eq!(cfg.resolve().unwrap().context.current_dir, "/etc");
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let cfg = TerminalConfig::from_json(r#"{"log_level":"verbose"}"#).unwrap();
        assert!(matches!(cfg.log_level(), Err(Error::LogLevel(_))));
        assert!(matches!(cfg.resolve(), Err(Error::LogLevel(level)) if level == "verbose"));
    }

    #[test]
    fn test_paths_are_normalised() {
        let cfg = TerminalConfig::from_json(r#"{"cwd":"/home/devops/"}"#).unwrap();
        assert_eq!(cfg.resolve().unwrap().context.current_dir, "/home/devops");
        let cfg = TerminalConfig::from_json(r#"{"profile":"filesystem","home":"/home//ana/"}"#)
            .unwrap();
        let r = cfg.resolve().unwrap();
        assert_eq!(r.context.current_dir, "/home/ana");
        assert_eq!(r.context.home(), "/home/ana");
    }
}
