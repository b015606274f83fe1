//! Platform identification from host-provided environment variables.

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

use exos_cli_common::{CliError, CliResult};

/// Platform family variable: `"1"` Summit, `"2"` chassis.
pub const PLATFORM_TYPE_VAR: &str = "EXOS_PLATFORM_TYPE";

/// Stacking variable: `"1"` when stacking is enabled.
pub const STACK_MODE_VAR: &str = "EXOS_STACK_MODE";

/// Chassis model variable.
pub const SWITCH_PLATFORM_VAR: &str = "EXOS_SWITCH_PLATFORM";

/// Device platform type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Standalone Summit switch
    #[serde(rename = "Summit")]
    Summit,
    /// Summit switches in a stack
    #[serde(rename = "SummitStack")]
    SummitStack,
    /// BlackDiamond 8800 chassis
    #[serde(rename = "BD8800")]
    Bd8800,
    /// BlackDiamond X8 chassis
    #[serde(rename = "BDX8")]
    Bdx8,
}

impl Platform {
    /// Returns the platform name as reported to scripts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Summit => "Summit",
            Platform::SummitStack => "SummitStack",
            Platform::Bd8800 => "BD8800",
            Platform::Bdx8 => "BDX8",
        }
    }

    /// Determines the platform from the host variables.
    ///
    /// Any chassis other than `everest` is taken to be a BD8800.
    pub fn from_vars(vars: &PlatformVars) -> CliResult<Self> {
        match vars.platform_type.as_deref() {
            Some("1") => {
                if vars.stack_mode.as_deref() == Some("1") {
                    Ok(Platform::SummitStack)
                } else {
                    Ok(Platform::Summit)
                }
            }
            Some("2") => {
                if vars.switch_platform.as_deref() == Some("everest") {
                    Ok(Platform::Bdx8)
                } else {
                    Ok(Platform::Bd8800)
                }
            }
            other => Err(CliError::UnknownPlatform {
                value: other.map(str::to_string),
            }),
        }
    }

    /// Determines the platform from the process environment.
    pub fn detect() -> CliResult<Self> {
        Self::from_vars(&PlatformVars::from_env())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the platform variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformVars {
    /// Value of `EXOS_PLATFORM_TYPE`
    pub platform_type: Option<String>,
    /// Value of `EXOS_STACK_MODE`
    pub stack_mode: Option<String>,
    /// Value of `EXOS_SWITCH_PLATFORM`
    pub switch_platform: Option<String>,
}

impl PlatformVars {
    /// Reads the variables from the process environment.
    pub fn from_env() -> Self {
        Self {
            platform_type: env::var(PLATFORM_TYPE_VAR).ok(),
            stack_mode: env::var(STACK_MODE_VAR).ok(),
            switch_platform: env::var(SWITCH_PLATFORM_VAR).ok(),
        }
    }

    /// Standalone Summit.
    pub fn summit() -> Self {
        Self {
            platform_type: Some("1".to_string()),
            ..Default::default()
        }
    }

    /// Stacked Summit.
    pub fn summit_stack() -> Self {
        Self {
            platform_type: Some("1".to_string()),
            stack_mode: Some("1".to_string()),
            ..Default::default()
        }
    }

    /// Chassis of the given model.
    pub fn chassis(model: impl Into<String>) -> Self {
        Self {
            platform_type: Some("2".to_string()),
            switch_platform: Some(model.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summit() {
        assert_eq!(
            Platform::from_vars(&PlatformVars::summit()).unwrap(),
            Platform::Summit
        );
        let vars = PlatformVars {
            stack_mode: Some("0".to_string()),
            ..PlatformVars::summit()
        };
        assert_eq!(Platform::from_vars(&vars).unwrap(), Platform::Summit);
    }

    #[test]
    fn test_summit_stack() {
        assert_eq!(
            Platform::from_vars(&PlatformVars::summit_stack()).unwrap(),
            Platform::SummitStack
        );
    }

    #[test]
    fn test_chassis() {
        assert_eq!(
            Platform::from_vars(&PlatformVars::chassis("everest")).unwrap(),
            Platform::Bdx8
        );
        assert_eq!(
            Platform::from_vars(&PlatformVars::chassis("aspen")).unwrap(),
            Platform::Bd8800
        );
        let vars = PlatformVars {
            platform_type: Some("2".to_string()),
            ..Default::default()
        };
        assert_eq!(Platform::from_vars(&vars).unwrap(), Platform::Bd8800);
    }

    #[test]
    fn test_unknown_platform() {
        let vars = PlatformVars {
            platform_type: Some("3".to_string()),
            ..Default::default()
        };
        match Platform::from_vars(&vars) {
            Err(CliError::UnknownPlatform { value }) => assert_eq!(value.as_deref(), Some("3")),
            other => panic!("Expected UnknownPlatform error, got {:?}", other),
        }

        assert!(matches!(
            Platform::from_vars(&PlatformVars::default()),
            Err(CliError::UnknownPlatform { value: None })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Platform::Bd8800.to_string(), "BD8800");
        assert_eq!(Platform::SummitStack.to_string(), "SummitStack");
        assert_eq!(
            serde_json::to_string(&Platform::Bdx8).unwrap(),
            "\"BDX8\""
        );
    }
}
