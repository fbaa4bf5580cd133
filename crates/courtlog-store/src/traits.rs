//! The storage interface: read views, transactions and the store itself.
//!
//! Every service operation runs as one closure passed to
//! [`EntityStore::transaction`]. The closure sees a consistent view, stages
//! its writes, and either commits all of them (closure returned `Ok`) or
//! none of them (closure returned `Err`, or the backend failed to commit).

use courtlog_types::{
    Competition, CompetitionId, Game, GameId, Match, MatchId, Node, NodeKey, ParentKey, User,
    UserId,
};

use crate::error::StoreResult;

/// Read access to rows.
///
/// Children are always returned in their stable order:
/// - competitions of an owner: newest start date first
/// - matches of a competition: creation order
/// - games of a match: game number, then creation order
pub trait StoreView {
    /// Read a node by key. Returns `Ok(None)` if the row does not exist.
    fn get(&self, key: NodeKey) -> StoreResult<Option<Node>>;

    /// List the direct children of `parent` in stable order.
    fn list_children(&self, parent: ParentKey) -> StoreResult<Vec<Node>>;

    fn user(&self, id: UserId) -> StoreResult<Option<User>>;

    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    fn count_children(&self, parent: ParentKey) -> StoreResult<usize> {
        Ok(self.list_children(parent)?.len())
    }

    fn competition(&self, id: CompetitionId) -> StoreResult<Option<Competition>> {
        Ok(self.get(id.into())?.and_then(Node::into_competition))
    }

    fn match_record(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.get(id.into())?.and_then(Node::into_match))
    }

    fn game(&self, id: GameId) -> StoreResult<Option<Game>> {
        Ok(self.get(id.into())?.and_then(Node::into_game))
    }
}

/// A staged set of writes on top of a consistent view.
///
/// Writes are checked eagerly: a save whose parent row is missing, a save
/// that changes an existing row's parent, or a delete of a row that still
/// has children fails immediately. Deletes must therefore run
/// children-before-parent.
pub trait Transaction: StoreView {
    /// Insert or replace a node row.
    fn save(&mut self, node: Node) -> StoreResult<()>;

    /// Delete a node row. Fails if the row is missing or has children.
    fn delete(&mut self, key: NodeKey) -> StoreResult<()>;

    /// Insert or replace a user row, enforcing unique columns.
    fn save_user(&mut self, user: User) -> StoreResult<()>;
}

/// Transactional storage for users and journal nodes.
pub trait EntityStore: Send + Sync {
    /// Run `f` against a consistent read-only view.
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreView) -> Result<T, E>,
        E: From<crate::error::StoreError>;

    /// Run `f` as one all-or-nothing transaction.
    ///
    /// If `f` returns `Err`, or the backend cannot make the staged writes
    /// durable, no write from `f` is visible afterwards.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E>,
        E: From<crate::error::StoreError>;

    /// Read a single node.
    fn get(&self, key: NodeKey) -> StoreResult<Option<Node>> {
        self.read(|view| view.get(key))
    }

    /// List children of a parent in stable order.
    fn list_children(&self, parent: ParentKey) -> StoreResult<Vec<Node>> {
        self.read(|view| view.list_children(parent))
    }

    /// Save a single node in its own transaction.
    fn save(&self, node: Node) -> StoreResult<Node> {
        self.transaction(|tx| {
            tx.save(node.clone())?;
            Ok(node)
        })
    }

    /// Delete a single node in its own transaction.
    fn delete(&self, key: NodeKey) -> StoreResult<()> {
        self.transaction(|tx| tx.delete(key))
    }
}
