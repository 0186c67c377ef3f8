use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed storefront identities, each with a stable deviation from nominal behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Standard,
    LockedOut,
    Problem,
    PerformanceGlitch,
    Error,
    Visual,
}

impl Persona {
    pub const ALL: [Persona; 6] = [
        Persona::Standard,
        Persona::LockedOut,
        Persona::Problem,
        Persona::PerformanceGlitch,
        Persona::Error,
        Persona::Visual,
    ];

    pub fn username(&self) -> &'static str {
        match self {
            Persona::Standard => "standard_user",
            Persona::LockedOut => "locked_out_user",
            Persona::Problem => "problem_user",
            Persona::PerformanceGlitch => "performance_glitch_user",
            Persona::Error => "error_user",
            Persona::Visual => "visual_user",
        }
    }

    pub fn from_username(username: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.username() == username)
    }

    /// Whether a correct password lands on the catalog.
    pub fn can_login(&self) -> bool {
        !matches!(self, Persona::LockedOut)
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.username())
    }
}
