use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{CompetitionResult, MatchType, Outcome};
use crate::ids::{CompetitionId, GameId, MatchId, UserId};
use crate::media::MediaReference;

// ---------------------------------------------------------------------------
// MediaList
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free list of media references owned by one node.
///
/// The list only changes through [`MediaList::attach`] and
/// [`MediaList::detach`]; both report what actually changed so the caller
/// knows which backing files it has taken over or must clean up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaList(Vec<MediaReference>);

impl MediaList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append references that are not already present.
    ///
    /// Returns the references that were actually added, in order.
    pub fn attach<I>(&mut self, references: I) -> Vec<MediaReference>
    where
        I: IntoIterator<Item = MediaReference>,
    {
        let mut added = Vec::new();
        for reference in references {
            if !self.0.contains(&reference) {
                self.0.push(reference.clone());
                added.push(reference);
            }
        }
        added
    }

    /// Remove the given references. Absent ones are ignored.
    ///
    /// Returns the references that were actually removed, each once.
    pub fn detach(&mut self, references: &[MediaReference]) -> Vec<MediaReference> {
        let mut removed = Vec::new();
        self.0.retain(|existing| {
            if references.contains(existing) {
                removed.push(existing.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn contains(&self, reference: &MediaReference) -> bool {
        self.0.contains(reference)
    }

    pub fn as_slice(&self) -> &[MediaReference] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaReference> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a MediaList {
    type Item = &'a MediaReference;
    type IntoIter = std::slice::Iter<'a, MediaReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Competition
// ---------------------------------------------------------------------------

/// The mutable fields of a competition.
///
/// Used both to create a competition and as the full replacement on update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionDetails {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub city: String,
    pub venue: Option<String>,
    pub result: Option<CompetitionResult>,
    pub coach_comment: Option<String>,
    pub self_summary: Option<String>,
}

impl CompetitionDetails {
    /// Minimal details with only the required fields set.
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            city: city.into(),
            venue: None,
            result: None,
            coach_comment: None,
            self_summary: None,
        }
    }
}

/// Root of an ownership tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    id: CompetitionId,
    owner: UserId,
    pub details: CompetitionDetails,
    photos: MediaList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    pub fn new(owner: UserId, details: CompetitionDetails) -> Self {
        let now = Utc::now();
        Self {
            id: CompetitionId::new(),
            owner,
            details,
            photos: MediaList::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> CompetitionId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn photos(&self) -> &MediaList {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut MediaList {
        &mut self.photos
    }

    /// Replace every mutable field. Id, owner and photos are untouched.
    pub fn apply(&mut self, details: CompetitionDetails) {
        self.details = details;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub match_type: MatchType,
    pub opponent_name: String,
    pub opponent_city: String,
    pub opponent_club: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Match score in games, e.g. "2:1".
    pub score: Option<String>,
    pub result: Outcome,
    pub coach_comment: Option<String>,
    pub self_summary: Option<String>,
}

impl MatchDetails {
    pub fn new(
        match_type: MatchType,
        opponent_name: impl Into<String>,
        opponent_city: impl Into<String>,
        result: Outcome,
    ) -> Self {
        Self {
            match_type,
            opponent_name: opponent_name.into(),
            opponent_city: opponent_city.into(),
            opponent_club: None,
            scheduled_at: None,
            score: None,
            result,
            coach_comment: None,
            self_summary: None,
        }
    }
}

/// A match played inside a competition. The parent link never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    id: MatchId,
    competition: CompetitionId,
    pub details: MatchDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn new(competition: CompetitionId, details: MatchDetails) -> Self {
        let now = Utc::now();
        Self {
            id: MatchId::new(),
            competition,
            details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn competition(&self) -> CompetitionId {
        self.competition
    }

    pub fn apply(&mut self, details: MatchDetails) {
        self.details = details;
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    /// 1-based position of the game within its match.
    pub game_number: u32,
    /// Point score, e.g. "21:19".
    pub score: String,
    pub result: Option<Outcome>,
    pub coach_comment: Option<String>,
    pub self_summary: Option<String>,
}

impl GameDetails {
    pub fn new(game_number: u32, score: impl Into<String>, result: Option<Outcome>) -> Self {
        Self {
            game_number,
            score: score.into(),
            result,
            coach_comment: None,
            self_summary: None,
        }
    }
}

/// A single game of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    match_id: MatchId,
    pub details: GameDetails,
    videos: MediaList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    pub fn new(match_id: MatchId, details: GameDetails) -> Self {
        let now = Utc::now();
        Self {
            id: GameId::new(),
            match_id,
            details,
            videos: MediaList::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn videos(&self) -> &MediaList {
        &self.videos
    }

    pub fn videos_mut(&mut self) -> &mut MediaList {
        &mut self.videos
    }

    /// Replace every mutable field. Id, parent and videos are untouched.
    pub fn apply(&mut self, details: GameDetails) {
        self.details = details;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Registration input for a user account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub nickname: Option<String>,
    /// Opaque hash produced by the authentication layer.
    pub credential_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub nickname: Option<String>,
    pub credential_hash: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(input: NewUser) -> Self {
        Self {
            id: UserId::new(),
            username: input.username,
            email: input.email,
            phone_number: input.phone_number,
            nickname: input.nickname,
            credential_hash: input.credential_hash,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> MediaReference {
        MediaReference::parse(&format!("photos/{name}.jpg")).unwrap()
    }

    fn details() -> CompetitionDetails {
        CompetitionDetails::new(
            "City Open",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            "Leiden",
        )
    }

    #[test]
    fn attach_skips_duplicates() {
        let mut list = MediaList::new();
        let added = list.attach(vec![photo("a"), photo("b"), photo("a")]);
        assert_eq!(added, vec![photo("a"), photo("b")]);
        let added = list.attach(vec![photo("b")]);
        assert!(added.is_empty());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn detach_reports_only_present() {
        let mut list = MediaList::new();
        list.attach(vec![photo("a"), photo("b")]);
        let removed = list.detach(&[photo("a"), photo("missing"), photo("a")]);
        assert_eq!(removed, vec![photo("a")]);
        assert_eq!(list.as_slice(), &[photo("b")]);
    }

    #[test]
    fn detach_then_attach_leaves_single_entry() {
        let mut list = MediaList::new();
        list.attach(vec![photo("a")]);
        list.detach(&[photo("a")]);
        list.attach(vec![photo("a")]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn apply_keeps_identity_and_media() {
        let owner = UserId::new();
        let mut c = Competition::new(owner, details());
        c.photos_mut().attach(vec![photo("keep")]);
        let id = c.id();

        let mut changed = details();
        changed.name = "Renamed".into();
        c.apply(changed);

        assert_eq!(c.id(), id);
        assert_eq!(c.owner(), owner);
        assert_eq!(c.details.name, "Renamed");
        assert!(c.photos().contains(&photo("keep")));
    }

    #[test]
    fn game_update_keeps_videos() {
        let video = MediaReference::parse("videos/v1.mp4").unwrap();
        let mut g = Game::new(MatchId::new(), GameDetails::new(1, "21:19", Some(Outcome::Win)));
        g.videos_mut().attach(vec![video.clone()]);
        g.apply(GameDetails::new(1, "21:17", Some(Outcome::Win)));
        assert_eq!(g.videos().as_slice(), &[video]);
        assert_eq!(g.details.score, "21:17");
    }

    #[test]
    fn new_user_is_enabled() {
        let u = User::new(NewUser {
            username: "ann".into(),
            email: "ann@example.com".into(),
            phone_number: None,
            nickname: None,
            credential_hash: "!".into(),
        });
        assert!(u.enabled);
    }
}
