// ABOUTME: Lifecycle hook commands configured per branch.
// ABOUTME: Each hook is one shell command or a non-empty list run in order.

use nonempty::NonEmpty;
use serde::Deserialize;

/// Hook execution points in the checkout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before any build step.
    BeforeBuild,
    /// The main build step.
    Build,
    /// After builders and the build step.
    AfterBuild,
    /// Inside the maintenance window, against the new checkout.
    Maintenance,
}

impl HookPoint {
    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::BeforeBuild => "before_build",
            HookPoint::Build => "build",
            HookPoint::AfterBuild => "after_build",
            HookPoint::Maintenance => "maintenance",
        }
    }

    /// Command used when the hook is not configured.
    pub fn default_command(&self) -> Option<&'static str> {
        match self {
            HookPoint::Build => Some("if [ -f ./.build.sh ]; then ./.build.sh; fi"),
            _ => None,
        }
    }
}

/// One or more shell commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HookEntry")]
pub struct HookCommands(NonEmpty<String>);

impl HookCommands {
    pub fn single(command: impl Into<String>) -> Self {
        Self(NonEmpty::new(command.into()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HookEntry {
    Single(String),
    List(Vec<String>),
}

impl TryFrom<HookEntry> for HookCommands {
    type Error = String;

    fn try_from(entry: HookEntry) -> Result<Self, Self::Error> {
        match entry {
            HookEntry::Single(s) => Ok(Self::single(s)),
            HookEntry::List(list) => NonEmpty::from_vec(list)
                .map(Self)
                .ok_or_else(|| "hook command list cannot be empty".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hooks {
    #[serde(default)]
    pub before_build: Option<HookCommands>,
    #[serde(default)]
    pub build: Option<HookCommands>,
    #[serde(default)]
    pub after_build: Option<HookCommands>,
    #[serde(default)]
    pub maintenance: Option<HookCommands>,
}

impl Hooks {
    /// Commands to run at `point`, falling back to the point's default.
    pub fn commands(&self, point: HookPoint) -> Option<HookCommands> {
        let configured = match point {
            HookPoint::BeforeBuild => &self.before_build,
            HookPoint::Build => &self.build,
            HookPoint::AfterBuild => &self.after_build,
            HookPoint::Maintenance => &self.maintenance,
        };
        configured
            .clone()
            .or_else(|| point.default_command().map(HookCommands::single))
    }
}
