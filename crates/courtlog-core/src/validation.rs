//! Input validation for create and update operations.
//!
//! Checks run before any row is read or written and stop at the first
//! failure. Length limits follow the column sizes of the journal schema.

use courtlog_types::{
    CompetitionDetails, GameDetails, MatchDetails, MediaCategory, MediaReference, NewUser,
    NodeKind,
};

use crate::error::{HierarchyError, HierarchyResult};

const NAME_MAX: usize = 100;
const CITY_MAX: usize = 50;
const VENUE_MAX: usize = 200;
const OPPONENT_MAX: usize = 50;
const CLUB_MAX: usize = 100;
const SCORE_MAX: usize = 20;
const USERNAME_MAX: usize = 50;
const EMAIL_MAX: usize = 100;
const PHONE_MAX: usize = 20;
const NICKNAME_MAX: usize = 50;

/// Input that can be checked before it reaches storage.
pub trait Validate {
    fn validate(&self) -> HierarchyResult<()>;
}

fn required(field: &str, value: &str, max: usize) -> HierarchyResult<()> {
    if value.trim().is_empty() {
        return Err(HierarchyError::validation(format!("{field} must not be blank")));
    }
    bounded(field, value, max)
}

fn bounded(field: &str, value: &str, max: usize) -> HierarchyResult<()> {
    if value.chars().count() > max {
        return Err(HierarchyError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn optional(field: &str, value: &Option<String>, max: usize) -> HierarchyResult<()> {
    match value {
        Some(v) => bounded(field, v, max),
        None => Ok(()),
    }
}

impl Validate for CompetitionDetails {
    fn validate(&self) -> HierarchyResult<()> {
        required("competition name", &self.name, NAME_MAX)?;
        required("competition city", &self.city, CITY_MAX)?;
        optional("venue", &self.venue, VENUE_MAX)?;
        if self.end_date < self.start_date {
            return Err(HierarchyError::validation(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }
}

impl Validate for MatchDetails {
    fn validate(&self) -> HierarchyResult<()> {
        required("opponent name", &self.opponent_name, OPPONENT_MAX)?;
        required("opponent city", &self.opponent_city, OPPONENT_MAX)?;
        optional("opponent club", &self.opponent_club, CLUB_MAX)?;
        optional("match score", &self.score, SCORE_MAX)
    }
}

impl Validate for GameDetails {
    fn validate(&self) -> HierarchyResult<()> {
        if self.game_number == 0 {
            return Err(HierarchyError::validation("game number must be at least 1"));
        }
        required("game score", &self.score, SCORE_MAX)
    }
}

impl Validate for NewUser {
    fn validate(&self) -> HierarchyResult<()> {
        required("username", &self.username, USERNAME_MAX)?;
        required("email", &self.email, EMAIL_MAX)?;
        if !self.email.contains('@') {
            return Err(HierarchyError::validation(format!(
                "email {:?} is not an address",
                self.email
            )));
        }
        optional("phone number", &self.phone_number, PHONE_MAX)?;
        optional("nickname", &self.nickname, NICKNAME_MAX)
    }
}

/// The media category a node kind holds, if any.
pub fn media_category(kind: NodeKind) -> Option<MediaCategory> {
    match kind {
        NodeKind::Competition => Some(MediaCategory::Photos),
        NodeKind::Match => None,
        NodeKind::Game => Some(MediaCategory::Videos),
    }
}

/// Check that every reference belongs in a node of `kind`.
pub fn check_media(
    kind: NodeKind,
    references: &[MediaReference],
) -> HierarchyResult<MediaCategory> {
    let category = media_category(kind)
        .ok_or_else(|| HierarchyError::validation(format!("a {kind} does not hold media")))?;
    if let Some(wrong) = references.iter().find(|r| r.category() != category) {
        return Err(HierarchyError::validation(format!(
            "{wrong} is not in {category}, which a {kind} holds"
        )));
    }
    Ok(category)
}
