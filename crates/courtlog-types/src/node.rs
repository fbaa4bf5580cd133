use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::{Competition, Game, Match};
use crate::ids::{CompetitionId, GameId, MatchId, UserId};
use crate::media::MediaReference;

/// The three levels of the journal tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Competition,
    Match,
    Game,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Competition => write!(f, "competition"),
            Self::Match => write!(f, "match"),
            Self::Game => write!(f, "game"),
        }
    }
}

/// Typed address of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKey {
    Competition(CompetitionId),
    Match(MatchId),
    Game(GameId),
}

impl NodeKey {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Competition(_) => NodeKind::Competition,
            Self::Match(_) => NodeKind::Match,
            Self::Game(_) => NodeKind::Game,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Competition(id) => write!(f, "competition {id}"),
            Self::Match(id) => write!(f, "match {id}"),
            Self::Game(id) => write!(f, "game {id}"),
        }
    }
}

impl From<CompetitionId> for NodeKey {
    fn from(id: CompetitionId) -> Self {
        Self::Competition(id)
    }
}

impl From<MatchId> for NodeKey {
    fn from(id: MatchId) -> Self {
        Self::Match(id)
    }
}

impl From<GameId> for NodeKey {
    fn from(id: GameId) -> Self {
        Self::Game(id)
    }
}

/// What a node hangs off. A competition's parent is its owning user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentKey {
    Owner(UserId),
    Competition(CompetitionId),
    Match(MatchId),
}

/// A stored node of any kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Competition(Competition),
    Match(Match),
    Game(Game),
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Self::Competition(c) => NodeKey::Competition(c.id()),
            Self::Match(m) => NodeKey::Match(m.id()),
            Self::Game(g) => NodeKey::Game(g.id()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.key().kind()
    }

    pub fn parent(&self) -> ParentKey {
        match self {
            Self::Competition(c) => ParentKey::Owner(c.owner()),
            Self::Match(m) => ParentKey::Competition(m.competition()),
            Self::Game(g) => ParentKey::Match(g.match_id()),
        }
    }

    /// Media references owned directly by this node (not its descendants).
    pub fn media(&self) -> &[MediaReference] {
        match self {
            Self::Competition(c) => c.photos().as_slice(),
            Self::Match(_) => &[],
            Self::Game(g) => g.videos().as_slice(),
        }
    }

    pub fn into_competition(self) -> Option<Competition> {
        match self {
            Self::Competition(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_match(self) -> Option<Match> {
        match self {
            Self::Match(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_game(self) -> Option<Game> {
        match self {
            Self::Game(g) => Some(g),
            _ => None,
        }
    }
}

impl From<Competition> for Node {
    fn from(c: Competition) -> Self {
        Self::Competition(c)
    }
}

impl From<Match> for Node {
    fn from(m: Match) -> Self {
        Self::Match(m)
    }
}

impl From<Game> for Node {
    fn from(g: Game) -> Self {
        Self::Game(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GameDetails, MatchDetails};
    use crate::enums::{MatchType, Outcome};

    #[test]
    fn parent_links_follow_the_tree() {
        let competition = CompetitionId::new();
        let m = Match::new(
            competition,
            MatchDetails::new(MatchType::GroupStage, "Bo", "Delft", Outcome::Win),
        );
        let g = Game::new(m.id(), GameDetails::new(1, "21:10", None));

        assert_eq!(Node::from(m.clone()).parent(), ParentKey::Competition(competition));
        assert_eq!(Node::from(g.clone()).parent(), ParentKey::Match(m.id()));
        assert_eq!(Node::from(g).kind(), NodeKind::Game);
    }

    #[test]
    fn match_owns_no_media() {
        let m = Match::new(
            CompetitionId::new(),
            MatchDetails::new(MatchType::Knockout1, "Cy", "Gouda", Outcome::Lose),
        );
        assert!(Node::from(m).media().is_empty());
    }

    #[test]
    fn key_display_names_kind() {
        let id = GameId::new();
        assert_eq!(NodeKey::from(id).to_string(), format!("game {id}"));
    }
}
