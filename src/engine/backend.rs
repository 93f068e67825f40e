// Code generators the engine can be asked to run.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    PolyorbHiAda,
    PolyorbHiC,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::PolyorbHiAda, Backend::PolyorbHiC];

    /// Backend name as the engine's command line spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::PolyorbHiAda => "polyorb_hi_ada",
            Backend::PolyorbHiC => "polyorb_hi_c",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.as_str() == value)
            .ok_or_else(|| {
                let known = Backend::ALL.map(Backend::as_str).join(", ");
                Error::new(ErrorKind::Usage)
                    .with_message(format!("unknown backend `{value}`"))
                    .with_hint(format!("Use one of: {known}."))
            })
    }
}
