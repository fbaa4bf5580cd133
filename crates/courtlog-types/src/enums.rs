use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Final placing in a competition, ordered from worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompetitionResult {
    #[serde(rename = "GROUP_NOT_QUALIFIED")]
    GroupNotQualified,
    #[serde(rename = "GROUP_QUALIFIED")]
    GroupQualified,
    #[serde(rename = "TOP_32")]
    Top32,
    #[serde(rename = "TOP_16")]
    Top16,
    #[serde(rename = "TOP_8")]
    Top8,
    #[serde(rename = "TOP_4")]
    Top4,
    #[serde(rename = "THIRD_PLACE")]
    ThirdPlace,
    #[serde(rename = "SECOND_PLACE")]
    SecondPlace,
    #[serde(rename = "CHAMPION")]
    Champion,
}

impl CompetitionResult {
    pub const LADDER: [CompetitionResult; 9] = [
        Self::GroupNotQualified,
        Self::GroupQualified,
        Self::Top32,
        Self::Top16,
        Self::Top8,
        Self::Top4,
        Self::ThirdPlace,
        Self::SecondPlace,
        Self::Champion,
    ];

    /// Position on the ladder, 0 for "not qualified" up to 8 for champion.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::GroupNotQualified => "GROUP_NOT_QUALIFIED",
            Self::GroupQualified => "GROUP_QUALIFIED",
            Self::Top32 => "TOP_32",
            Self::Top16 => "TOP_16",
            Self::Top8 => "TOP_8",
            Self::Top4 => "TOP_4",
            Self::ThirdPlace => "THIRD_PLACE",
            Self::SecondPlace => "SECOND_PLACE",
            Self::Champion => "CHAMPION",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GroupNotQualified => "Group stage, not qualified",
            Self::GroupQualified => "Group stage, qualified",
            Self::Top32 => "Top 32",
            Self::Top16 => "Top 16",
            Self::Top8 => "Top 8",
            Self::Top4 => "Top 4",
            Self::ThirdPlace => "Third place",
            Self::SecondPlace => "Runner-up",
            Self::Champion => "Champion",
        }
    }
}

/// Round in which a match was played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "GROUP_STAGE")]
    GroupStage,
    #[serde(rename = "GROUP_STAGE_1")]
    GroupStage1,
    #[serde(rename = "GROUP_STAGE_2")]
    GroupStage2,
    #[serde(rename = "GROUP_STAGE_3")]
    GroupStage3,
    #[serde(rename = "KNOCKOUT_1")]
    Knockout1,
    #[serde(rename = "KNOCKOUT_2")]
    Knockout2,
    #[serde(rename = "KNOCKOUT_3")]
    Knockout3,
    #[serde(rename = "KNOCKOUT_4")]
    Knockout4,
    #[serde(rename = "KNOCKOUT_5")]
    Knockout5,
}

impl MatchType {
    pub const ALL: [MatchType; 9] = [
        Self::GroupStage,
        Self::GroupStage1,
        Self::GroupStage2,
        Self::GroupStage3,
        Self::Knockout1,
        Self::Knockout2,
        Self::Knockout3,
        Self::Knockout4,
        Self::Knockout5,
    ];

    pub fn is_knockout(&self) -> bool {
        matches!(
            self,
            Self::Knockout1 | Self::Knockout2 | Self::Knockout3 | Self::Knockout4 | Self::Knockout5
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::GroupStage => "GROUP_STAGE",
            Self::GroupStage1 => "GROUP_STAGE_1",
            Self::GroupStage2 => "GROUP_STAGE_2",
            Self::GroupStage3 => "GROUP_STAGE_3",
            Self::Knockout1 => "KNOCKOUT_1",
            Self::Knockout2 => "KNOCKOUT_2",
            Self::Knockout3 => "KNOCKOUT_3",
            Self::Knockout4 => "KNOCKOUT_4",
            Self::Knockout5 => "KNOCKOUT_5",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GroupStage => "Group stage",
            Self::GroupStage1 => "Group stage 1",
            Self::GroupStage2 => "Group stage 2",
            Self::GroupStage3 => "Group stage 3",
            Self::Knockout1 => "Knockout round 1",
            Self::Knockout2 => "Knockout round 2",
            Self::Knockout3 => "Knockout round 3",
            Self::Knockout4 => "Knockout round 4",
            Self::Knockout5 => "Knockout round 5",
        }
    }
}

/// Win or loss of a match or a single game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Win => "WIN",
            Self::Lose => "LOSE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Win => "Win",
            Self::Lose => "Loss",
        }
    }
}

macro_rules! code_parse {
    ($ty:ty, $kind:literal, $all:expr) => {
        impl FromStr for $ty {
            type Err = TypeError;

            /// Parse the upper-snake code, case-insensitively.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('-', "_");
                $all.into_iter()
                    .find(|v| v.code().eq_ignore_ascii_case(&wanted))
                    .ok_or_else(|| TypeError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

code_parse!(CompetitionResult, "competition result", CompetitionResult::LADDER);
code_parse!(MatchType, "match type", MatchType::ALL);
code_parse!(Outcome, "outcome", [Outcome::Win, Outcome::Lose]);
