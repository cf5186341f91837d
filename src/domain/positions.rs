use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::RosterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    Defenders,
    Midfielders,
    Forwards,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 3] = [
        PositionGroup::Defenders,
        PositionGroup::Midfielders,
        PositionGroup::Forwards,
    ];
}

/// On-field role code. Stored and serialized upper-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionCode {
    Cb,
    Rb,
    Lb,
    Lwb,
    Rwb,
    Cdm,
    Cm,
    Cam,
    Rm,
    Lm,
    Rf,
    Lf,
    Cf,
    St,
    Lw,
    Rw,
}

impl PositionCode {
    pub const ALL: [PositionCode; 16] = [
        PositionCode::Cb,
        PositionCode::Rb,
        PositionCode::Lb,
        PositionCode::Lwb,
        PositionCode::Rwb,
        PositionCode::Cdm,
        PositionCode::Cm,
        PositionCode::Cam,
        PositionCode::Rm,
        PositionCode::Lm,
        PositionCode::Rf,
        PositionCode::Lf,
        PositionCode::Cf,
        PositionCode::St,
        PositionCode::Lw,
        PositionCode::Rw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionCode::Cb => "CB",
            PositionCode::Rb => "RB",
            PositionCode::Lb => "LB",
            PositionCode::Lwb => "LWB",
            PositionCode::Rwb => "RWB",
            PositionCode::Cdm => "CDM",
            PositionCode::Cm => "CM",
            PositionCode::Cam => "CAM",
            PositionCode::Rm => "RM",
            PositionCode::Lm => "LM",
            PositionCode::Rf => "RF",
            PositionCode::Lf => "LF",
            PositionCode::Cf => "CF",
            PositionCode::St => "ST",
            PositionCode::Lw => "LW",
            PositionCode::Rw => "RW",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            PositionCode::Cb => "Centre-Back",
            PositionCode::Rb => "Right-Back",
            PositionCode::Lb => "Left-Back",
            PositionCode::Lwb => "Left Wing-Back",
            PositionCode::Rwb => "Right Wing-Back",
            PositionCode::Cdm => "Defensive Midfielder",
            PositionCode::Cm => "Centre Midfielder",
            PositionCode::Cam => "Central Attacking Midfielder",
            PositionCode::Rm => "Right Midfielder",
            PositionCode::Lm => "Left Midfielder",
            PositionCode::Rf => "Right Forward",
            PositionCode::Lf => "Left Forward",
            PositionCode::Cf => "Centre Forward",
            PositionCode::St => "Striker",
            PositionCode::Lw => "Left Wing",
            PositionCode::Rw => "Right Wing",
        }
    }

    pub fn group(&self) -> PositionGroup {
        match self {
            PositionCode::Cb
            | PositionCode::Rb
            | PositionCode::Lb
            | PositionCode::Lwb
            | PositionCode::Rwb => PositionGroup::Defenders,
            PositionCode::Cdm
            | PositionCode::Cm
            | PositionCode::Cam
            | PositionCode::Rm
            | PositionCode::Lm => PositionGroup::Midfielders,
            PositionCode::Rf
            | PositionCode::Lf
            | PositionCode::Cf
            | PositionCode::St
            | PositionCode::Lw
            | PositionCode::Rw => PositionGroup::Forwards,
        }
    }
}

impl fmt::Display for PositionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionCode {
    type Err = RosterError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let code = code.trim();
        PositionCode::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| RosterError::Validation(format!("Unknown position code: {}", code)))
    }
}

/// Resolves a raw code to the group it belongs to.
pub fn resolve_position_group(code: &str) -> Result<PositionGroup, RosterError> {
    code.parse::<PositionCode>().map(|position| position.group())
}

/// Startup check over the static code table.
pub fn verify_position_table() -> Result<(), RosterError> {
    for code in PositionCode::ALL {
        let parsed: PositionCode = code.as_str().parse()?;
        if parsed != code {
            return Err(RosterError::Config(format!(
                "position code {} resolves to {}",
                code.as_str(),
                parsed.as_str()
            )));
        }
    }

    for group in PositionGroup::ALL {
        if !PositionCode::ALL.iter().any(|code| code.group() == group) {
            return Err(RosterError::Config(format!("position group {:?} has no codes", group)));
        }
    }

    Ok(())
}
