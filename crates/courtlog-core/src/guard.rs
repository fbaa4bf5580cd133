//! Ownership checks.
//!
//! Only a competition stores its owner. A match is owned by the owner of its
//! competition, and a game by the owner of its match's competition, so every
//! check walks the parent chain up to the root. The walk is repeated on every
//! call against the view the caller is about to act on; nothing is cached.

use courtlog_store::StoreView;
use courtlog_types::{
    Competition, CompetitionId, Game, GameId, Match, MatchId, Node, NodeKey, UserId,
};

use crate::error::{HierarchyError, HierarchyResult};

/// Outcome of an ownership check on an existing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny { owner: UserId },
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }
}

/// Resolves owners and enforces that the acting user owns a node.
///
/// Works against any [`StoreView`], including the transaction a mutation is
/// staged in, so the check and the write see the same rows.
pub struct OwnershipGuard<'a, V: StoreView + ?Sized> {
    view: &'a V,
}

impl<'a, V: StoreView + ?Sized> OwnershipGuard<'a, V> {
    pub fn new(view: &'a V) -> Self {
        Self { view }
    }

    /// Walk from `node` up to its competition and return the owner.
    ///
    /// A parent link pointing at a missing row is reported as `NotFound`
    /// for that parent.
    pub fn resolve_owner(&self, node: &Node) -> HierarchyResult<UserId> {
        match node {
            Node::Competition(competition) => Ok(competition.owner()),
            Node::Match(record) => Ok(self.parent_competition(record)?.owner()),
            Node::Game(game) => {
                let record = self
                    .view
                    .match_record(game.match_id())?
                    .ok_or(HierarchyError::NotFound(NodeKey::Match(game.match_id())))?;
                Ok(self.parent_competition(&record)?.owner())
            }
        }
    }

    pub fn authorize(&self, actor: UserId, node: &Node) -> HierarchyResult<Access> {
        let owner = self.resolve_owner(node)?;
        if owner == actor {
            Ok(Access::Allow)
        } else {
            Ok(Access::Deny { owner })
        }
    }

    /// Like [`authorize`](Self::authorize), but a denial becomes
    /// [`HierarchyError::Unauthorized`].
    pub fn require(&self, actor: UserId, node: &Node) -> HierarchyResult<()> {
        match self.authorize(actor, node)? {
            Access::Allow => Ok(()),
            Access::Deny { .. } => Err(HierarchyError::Unauthorized {
                key: node.key(),
                actor,
            }),
        }
    }

    /// Load a node and require that `actor` owns it.
    pub fn load(&self, actor: UserId, key: NodeKey) -> HierarchyResult<Node> {
        let node = self.view.get(key)?.ok_or(HierarchyError::NotFound(key))?;
        self.require(actor, &node)?;
        Ok(node)
    }

    pub fn competition(&self, actor: UserId, id: CompetitionId) -> HierarchyResult<Competition> {
        let competition = self
            .view
            .competition(id)?
            .ok_or(HierarchyError::NotFound(id.into()))?;
        if competition.owner() != actor {
            return Err(HierarchyError::Unauthorized {
                key: id.into(),
                actor,
            });
        }
        Ok(competition)
    }

    pub fn match_record(&self, actor: UserId, id: MatchId) -> HierarchyResult<Match> {
        let record = self
            .view
            .match_record(id)?
            .ok_or(HierarchyError::NotFound(id.into()))?;
        if self.parent_competition(&record)?.owner() != actor {
            return Err(HierarchyError::Unauthorized {
                key: id.into(),
                actor,
            });
        }
        Ok(record)
    }

    pub fn game(&self, actor: UserId, id: GameId) -> HierarchyResult<Game> {
        let game = self.view.game(id)?.ok_or(HierarchyError::NotFound(id.into()))?;
        self.require(actor, &Node::Game(game.clone()))?;
        Ok(game)
    }

    fn parent_competition(&self, record: &Match) -> HierarchyResult<Competition> {
        self.view
            .competition(record.competition())?
            .ok_or(HierarchyError::NotFound(NodeKey::Competition(record.competition())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{game_details, match_details, seed_tree, Fixture};
    use courtlog_store::{EntityStore, StoreResult};
    use courtlog_types::{ParentKey, User};

    /// A view holding rows whose parents are gone.
    struct OrphanView {
        orphan_match: Match,
        orphan_game: Game,
    }

    impl OrphanView {
        fn new() -> Self {
            Self {
                orphan_match: Match::new(CompetitionId::new(), match_details("Lee")),
                orphan_game: Game::new(MatchId::new(), game_details(1)),
            }
        }
    }

    impl StoreView for OrphanView {
        fn get(&self, key: NodeKey) -> StoreResult<Option<Node>> {
            Ok(match key {
                NodeKey::Match(id) if id == self.orphan_match.id() => {
                    Some(self.orphan_match.clone().into())
                }
                NodeKey::Game(id) if id == self.orphan_game.id() => {
                    Some(self.orphan_game.clone().into())
                }
                _ => None,
            })
        }

        fn list_children(&self, _parent: ParentKey) -> StoreResult<Vec<Node>> {
            Ok(Vec::new())
        }

        fn user(&self, _id: UserId) -> StoreResult<Option<User>> {
            Ok(None)
        }

        fn user_by_username(&self, _username: &str) -> StoreResult<Option<User>> {
            Ok(None)
        }
    }

    #[test]
    fn owner_resolves_through_every_level() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);
        fx.store
            .read(|view| {
                let guard = OwnershipGuard::new(view);
                let keys = [
                    NodeKey::from(tree.competition),
                    NodeKey::from(tree.matches[0]),
                    NodeKey::from(tree.games[0]),
                ];
                for key in keys {
                    let node = view.get(key)?.unwrap();
                    assert_eq!(guard.resolve_owner(&node)?, fx.ann);
                    assert!(guard.authorize(fx.ann, &node)?.is_allowed());
                    assert_eq!(
                        guard.authorize(fx.bob, &node)?,
                        Access::Deny { owner: fx.ann }
                    );
                }
                Ok::<_, HierarchyError>(())
            })
            .unwrap();
    }

    #[test]
    fn load_distinguishes_missing_from_foreign() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);
        fx.store
            .read(|view| {
                let guard = OwnershipGuard::new(view);
                let missing = NodeKey::Game(GameId::new());
                assert!(matches!(
                    guard.load(fx.ann, missing),
                    Err(HierarchyError::NotFound(k)) if k == missing
                ));
                assert!(matches!(
                    guard.game(fx.bob, tree.games[0]),
                    Err(HierarchyError::Unauthorized { actor, .. }) if actor == fx.bob
                ));
                assert!(guard.game(fx.ann, tree.games[0]).is_ok());
                Ok::<_, HierarchyError>(())
            })
            .unwrap();
    }

    #[test]
    fn dangling_parent_link_is_not_found() {
        let view = OrphanView::new();
        let guard = OwnershipGuard::new(&view);
        let actor = UserId::new();
        let m = view.orphan_match.clone();
        let g = view.orphan_game.clone();
        let lost_competition = NodeKey::Competition(m.competition());
        let lost_match = NodeKey::Match(g.match_id());

        assert!(matches!(
            guard.match_record(actor, m.id()),
            Err(HierarchyError::NotFound(k)) if k == lost_competition
        ));
        assert!(matches!(
            guard.resolve_owner(&Node::Match(m.clone())),
            Err(HierarchyError::NotFound(k)) if k == lost_competition
        ));
        assert!(matches!(
            guard.load(actor, m.id().into()),
            Err(HierarchyError::NotFound(k)) if k == lost_competition
        ));

        assert!(matches!(
            guard.game(actor, g.id()),
            Err(HierarchyError::NotFound(k)) if k == lost_match
        ));
        assert!(matches!(
            guard.resolve_owner(&Node::Game(g.clone())),
            Err(HierarchyError::NotFound(k)) if k == lost_match
        ));
        assert!(matches!(
            guard.load(actor, g.id().into()),
            Err(HierarchyError::NotFound(k)) if k == lost_match
        ));
    }
}
