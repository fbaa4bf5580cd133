//! Create, read, update and delete for the journal tree.
//!
//! Every operation runs its ownership check and its writes inside one
//! storage transaction, so a node cannot change hands or vanish between the
//! check and the write. Deletes remove the whole subtree children-first in
//! that transaction and only then release the subtree's media files.

use std::sync::Arc;

use courtlog_media::MediaStore;
use courtlog_store::{EntityStore, Transaction};
use courtlog_types::{
    Competition, CompetitionDetails, CompetitionId, Game, GameDetails, GameId, Match,
    MatchDetails, MatchId, MediaReference, Node, NodeKey, ParentKey, UserId,
};
use tracing::{debug, info, warn};

use crate::cleanup::remove_files;
use crate::error::{HierarchyError, HierarchyResult};
use crate::guard::OwnershipGuard;
use crate::outcome::{CompetitionSummary, DeleteOutcome, MatchSummary, RemovedRows};
use crate::validation::Validate;

/// Journal operations on behalf of an authenticated user.
///
/// The caller supplies the acting user's id on every call; the service never
/// authenticates. A node owned by someone else is reported as
/// [`HierarchyError::Unauthorized`], a node that does not exist as
/// [`HierarchyError::NotFound`].
pub struct HierarchyService<S, M: ?Sized> {
    pub(crate) store: Arc<S>,
    pub(crate) media: Arc<M>,
}

impl<S, M: ?Sized> Clone for HierarchyService<S, M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            media: Arc::clone(&self.media),
        }
    }
}

/// Rows and files collected while staging a subtree delete.
#[derive(Default)]
struct DeletePlan {
    removed: RemovedRows,
    media: Vec<MediaReference>,
}

impl<S, M> HierarchyService<S, M>
where
    S: EntityStore,
    M: MediaStore + ?Sized,
{
    pub fn new(store: Arc<S>, media: Arc<M>) -> Self {
        Self { store, media }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    // -----------------------------------------------------------------------
    // Competitions
    // -----------------------------------------------------------------------

    /// Create a competition owned by `owner`.
    pub fn create_competition(
        &self,
        owner: UserId,
        details: CompetitionDetails,
    ) -> HierarchyResult<Competition> {
        details.validate()?;
        let competition = self.store.transaction(|tx| -> HierarchyResult<Competition> {
            tx.user(owner)?.ok_or(HierarchyError::UserNotFound(owner))?;
            let competition = Competition::new(owner, details);
            tx.save(competition.clone().into())?;
            Ok(competition)
        })?;
        debug!(id = %competition.id(), %owner, "created competition");
        Ok(competition)
    }

    pub fn get_competition(
        &self,
        actor: UserId,
        id: CompetitionId,
    ) -> HierarchyResult<Competition> {
        self.store
            .read(|view| OwnershipGuard::new(view).competition(actor, id))
    }

    /// All competitions of `actor`, newest start date first.
    pub fn list_competitions(&self, actor: UserId) -> HierarchyResult<Vec<CompetitionSummary>> {
        self.store.read(|view| -> HierarchyResult<Vec<CompetitionSummary>> {
            view.user(actor)?.ok_or(HierarchyError::UserNotFound(actor))?;
            let mut summaries = Vec::new();
            for node in view.list_children(ParentKey::Owner(actor))? {
                if let Node::Competition(competition) = node {
                    let match_count =
                        view.count_children(ParentKey::Competition(competition.id()))?;
                    summaries.push(CompetitionSummary {
                        competition,
                        match_count,
                    });
                }
            }
            Ok(summaries)
        })
    }

    /// Replace the details of a competition. Owner and photos are kept.
    pub fn update_competition(
        &self,
        actor: UserId,
        id: CompetitionId,
        details: CompetitionDetails,
    ) -> HierarchyResult<Competition> {
        details.validate()?;
        let competition = self.store.transaction(|tx| -> HierarchyResult<Competition> {
            let mut competition = OwnershipGuard::new(&*tx).competition(actor, id)?;
            competition.apply(details);
            tx.save(competition.clone().into())?;
            Ok(competition)
        })?;
        debug!(%id, "updated competition");
        Ok(competition)
    }

    /// Delete a competition with all its matches and games.
    pub fn delete_competition(
        &self,
        actor: UserId,
        id: CompetitionId,
    ) -> HierarchyResult<DeleteOutcome> {
        let plan = self.store.transaction(|tx| -> HierarchyResult<DeletePlan> {
            let competition = OwnershipGuard::new(&*tx).competition(actor, id)?;
            let mut plan = DeletePlan::default();
            stage_competition_delete(tx, &competition, &mut plan)?;
            Ok(plan)
        })?;
        Ok(self.release(id.into(), plan))
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    pub fn create_match(
        &self,
        actor: UserId,
        competition: CompetitionId,
        details: MatchDetails,
    ) -> HierarchyResult<Match> {
        details.validate()?;
        let record = self.store.transaction(|tx| -> HierarchyResult<Match> {
            OwnershipGuard::new(&*tx).competition(actor, competition)?;
            let record = Match::new(competition, details);
            tx.save(record.clone().into())?;
            Ok(record)
        })?;
        debug!(id = %record.id(), %competition, "created match");
        Ok(record)
    }

    pub fn get_match(&self, actor: UserId, id: MatchId) -> HierarchyResult<Match> {
        self.store
            .read(|view| OwnershipGuard::new(view).match_record(actor, id))
    }

    /// Matches of a competition in creation order.
    pub fn list_matches(
        &self,
        actor: UserId,
        competition: CompetitionId,
    ) -> HierarchyResult<Vec<MatchSummary>> {
        self.store.read(|view| -> HierarchyResult<Vec<MatchSummary>> {
            OwnershipGuard::new(view).competition(actor, competition)?;
            let mut summaries = Vec::new();
            for node in view.list_children(ParentKey::Competition(competition))? {
                if let Node::Match(record) = node {
                    let game_count = view.count_children(ParentKey::Match(record.id()))?;
                    summaries.push(MatchSummary { record, game_count });
                }
            }
            Ok(summaries)
        })
    }

    pub fn update_match(
        &self,
        actor: UserId,
        id: MatchId,
        details: MatchDetails,
    ) -> HierarchyResult<Match> {
        details.validate()?;
        let record = self.store.transaction(|tx| -> HierarchyResult<Match> {
            let mut record = OwnershipGuard::new(&*tx).match_record(actor, id)?;
            record.apply(details);
            tx.save(record.clone().into())?;
            Ok(record)
        })?;
        debug!(%id, "updated match");
        Ok(record)
    }

    /// Delete a match with all its games.
    pub fn delete_match(&self, actor: UserId, id: MatchId) -> HierarchyResult<DeleteOutcome> {
        let plan = self.store.transaction(|tx| -> HierarchyResult<DeletePlan> {
            let record = OwnershipGuard::new(&*tx).match_record(actor, id)?;
            let mut plan = DeletePlan::default();
            stage_match_delete(tx, &record, &mut plan)?;
            Ok(plan)
        })?;
        Ok(self.release(id.into(), plan))
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    /// Record a game under a match.
    ///
    /// Game numbers are expected to be unique within a match; a repeated
    /// number is logged but accepted.
    pub fn create_game(
        &self,
        actor: UserId,
        match_id: MatchId,
        details: GameDetails,
    ) -> HierarchyResult<Game> {
        details.validate()?;
        let game = self.store.transaction(|tx| -> HierarchyResult<Game> {
            OwnershipGuard::new(&*tx).match_record(actor, match_id)?;
            let taken = tx
                .list_children(ParentKey::Match(match_id))?
                .into_iter()
                .filter_map(Node::into_game)
                .any(|g| g.details.game_number == details.game_number);
            if taken {
                warn!(
                    %match_id,
                    game_number = details.game_number,
                    "game number already used in match"
                );
            }
            let game = Game::new(match_id, details);
            tx.save(game.clone().into())?;
            Ok(game)
        })?;
        debug!(id = %game.id(), %match_id, "created game");
        Ok(game)
    }

    pub fn get_game(&self, actor: UserId, id: GameId) -> HierarchyResult<Game> {
        self.store.read(|view| OwnershipGuard::new(view).game(actor, id))
    }

    /// Games of a match ordered by game number.
    pub fn list_games(&self, actor: UserId, match_id: MatchId) -> HierarchyResult<Vec<Game>> {
        self.store.read(|view| -> HierarchyResult<Vec<Game>> {
            OwnershipGuard::new(view).match_record(actor, match_id)?;
            Ok(view
                .list_children(ParentKey::Match(match_id))?
                .into_iter()
                .filter_map(Node::into_game)
                .collect())
        })
    }

    /// The number after the highest game number recorded in a match.
    pub fn next_game_number(&self, actor: UserId, match_id: MatchId) -> HierarchyResult<u32> {
        let games = self.list_games(actor, match_id)?;
        Ok(games
            .iter()
            .map(|g| g.details.game_number)
            .max()
            .map_or(1, |n| n.saturating_add(1)))
    }

    /// Replace the details of a game. The video list is kept.
    pub fn update_game(
        &self,
        actor: UserId,
        id: GameId,
        details: GameDetails,
    ) -> HierarchyResult<Game> {
        details.validate()?;
        let game = self.store.transaction(|tx| -> HierarchyResult<Game> {
            let mut game = OwnershipGuard::new(&*tx).game(actor, id)?;
            game.apply(details);
            tx.save(game.clone().into())?;
            Ok(game)
        })?;
        debug!(%id, "updated game");
        Ok(game)
    }

    pub fn delete_game(&self, actor: UserId, id: GameId) -> HierarchyResult<DeleteOutcome> {
        let plan = self.store.transaction(|tx| -> HierarchyResult<DeletePlan> {
            let game = OwnershipGuard::new(&*tx).game(actor, id)?;
            let mut plan = DeletePlan::default();
            stage_game_delete(tx, &game, &mut plan)?;
            Ok(plan)
        })?;
        Ok(self.release(id.into(), plan))
    }

    // -----------------------------------------------------------------------
    // Any level
    // -----------------------------------------------------------------------

    /// Read any node the actor owns.
    pub fn get_node(&self, actor: UserId, key: NodeKey) -> HierarchyResult<Node> {
        self.store.read(|view| OwnershipGuard::new(view).load(actor, key))
    }

    /// Delete any node the actor owns, with its subtree.
    pub fn delete_node(&self, actor: UserId, key: NodeKey) -> HierarchyResult<DeleteOutcome> {
        match key {
            NodeKey::Competition(id) => self.delete_competition(actor, id),
            NodeKey::Match(id) => self.delete_match(actor, id),
            NodeKey::Game(id) => self.delete_game(actor, id),
        }
    }

    /// Release the media of a committed delete.
    fn release(&self, key: NodeKey, plan: DeletePlan) -> DeleteOutcome {
        let cleanup = remove_files(&*self.media, &plan.media);
        info!(
            %key,
            competitions = plan.removed.competitions,
            matches = plan.removed.matches,
            games = plan.removed.games,
            files = cleanup.attempted.len(),
            failed = cleanup.failures.len(),
            "deleted subtree"
        );
        DeleteOutcome {
            removed: plan.removed,
            cleanup,
        }
    }
}

fn stage_game_delete(
    tx: &mut dyn Transaction,
    game: &Game,
    plan: &mut DeletePlan,
) -> HierarchyResult<()> {
    plan.media.extend(game.videos().iter().cloned());
    tx.delete(game.id().into())?;
    plan.removed.games += 1;
    Ok(())
}

fn stage_match_delete(
    tx: &mut dyn Transaction,
    record: &Match,
    plan: &mut DeletePlan,
) -> HierarchyResult<()> {
    for node in tx.list_children(ParentKey::Match(record.id()))? {
        if let Node::Game(game) = node {
            stage_game_delete(tx, &game, plan)?;
        }
    }
    tx.delete(record.id().into())?;
    plan.removed.matches += 1;
    Ok(())
}

fn stage_competition_delete(
    tx: &mut dyn Transaction,
    competition: &Competition,
    plan: &mut DeletePlan,
) -> HierarchyResult<()> {
    for node in tx.list_children(ParentKey::Competition(competition.id()))? {
        if let Node::Match(record) = node {
            stage_match_delete(tx, &record, plan)?;
        }
    }
    plan.media.extend(competition.photos().iter().cloned());
    tx.delete(competition.id().into())?;
    plan.removed.competitions += 1;
    Ok(())
}
