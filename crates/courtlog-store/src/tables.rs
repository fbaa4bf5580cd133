//! Row tables shared by the in-memory and file-backed stores.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use courtlog_types::{
    Competition, CompetitionId, Game, GameId, Match, MatchId, Node, NodeKey, ParentKey, User,
    UserId,
};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::traits::{StoreView, Transaction};

/// A stored row plus its insertion sequence number.
///
/// The sequence number gives children a stable creation order that does not
/// depend on clock resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Row<T> {
    seq: u64,
    value: T,
}

/// All tables of one store.
///
/// A transaction clones the tables, mutates the clone, and swaps it in on
/// success; dropping the clone is the rollback.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    next_seq: u64,
    users: BTreeMap<UserId, User>,
    competitions: BTreeMap<CompetitionId, Row<Competition>>,
    matches: BTreeMap<MatchId, Row<Match>>,
    games: BTreeMap<GameId, Row<Game>>,
}

impl Tables {
    fn take_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Number of node rows of each kind: (competitions, matches, games).
    pub(crate) fn row_counts(&self) -> (usize, usize, usize) {
        (
            self.competitions.len(),
            self.matches.len(),
            self.games.len(),
        )
    }

    pub(crate) fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl StoreView for Tables {
    fn get(&self, key: NodeKey) -> StoreResult<Option<Node>> {
        Ok(match key {
            NodeKey::Competition(id) => self
                .competitions
                .get(&id)
                .map(|row| Node::Competition(row.value.clone())),
            NodeKey::Match(id) => self.matches.get(&id).map(|row| Node::Match(row.value.clone())),
            NodeKey::Game(id) => self.games.get(&id).map(|row| Node::Game(row.value.clone())),
        })
    }

    fn list_children(&self, parent: ParentKey) -> StoreResult<Vec<Node>> {
        Ok(match parent {
            ParentKey::Owner(owner) => {
                let mut rows: Vec<&Row<Competition>> = self
                    .competitions
                    .values()
                    .filter(|row| row.value.owner() == owner)
                    .collect();
                rows.sort_by_key(|row| (Reverse(row.value.details.start_date), row.seq));
                rows.into_iter()
                    .map(|row| Node::Competition(row.value.clone()))
                    .collect()
            }
            ParentKey::Competition(competition) => {
                let mut rows: Vec<&Row<Match>> = self
                    .matches
                    .values()
                    .filter(|row| row.value.competition() == competition)
                    .collect();
                rows.sort_by_key(|row| row.seq);
                rows.into_iter()
                    .map(|row| Node::Match(row.value.clone()))
                    .collect()
            }
            ParentKey::Match(match_id) => {
                let mut rows: Vec<&Row<Game>> = self
                    .games
                    .values()
                    .filter(|row| row.value.match_id() == match_id)
                    .collect();
                rows.sort_by_key(|row| (row.value.details.game_number, row.seq));
                rows.into_iter()
                    .map(|row| Node::Game(row.value.clone()))
                    .collect()
            }
        })
    }

    fn count_children(&self, parent: ParentKey) -> StoreResult<usize> {
        Ok(match parent {
            ParentKey::Owner(owner) => self
                .competitions
                .values()
                .filter(|row| row.value.owner() == owner)
                .count(),
            ParentKey::Competition(competition) => self
                .matches
                .values()
                .filter(|row| row.value.competition() == competition)
                .count(),
            ParentKey::Match(match_id) => self
                .games
                .values()
                .filter(|row| row.value.match_id() == match_id)
                .count(),
        })
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

impl Transaction for Tables {
    fn save(&mut self, node: Node) -> StoreResult<()> {
        let key = node.key();
        let parent = node.parent();
        let parent_exists = match parent {
            ParentKey::Owner(owner) => self.users.contains_key(&owner),
            ParentKey::Competition(id) => self.competitions.contains_key(&id),
            ParentKey::Match(id) => self.matches.contains_key(&id),
        };
        if !parent_exists {
            return Err(StoreError::DanglingParent { child: key, parent });
        }

        match node {
            Node::Competition(c) => {
                let seq = match self.competitions.get(&c.id()) {
                    Some(row) if row.value.owner() != c.owner() => {
                        return Err(StoreError::ParentChanged { key })
                    }
                    Some(row) => row.seq,
                    None => self.take_seq(),
                };
                self.competitions.insert(c.id(), Row { seq, value: c });
            }
            Node::Match(m) => {
                let seq = match self.matches.get(&m.id()) {
                    Some(row) if row.value.competition() != m.competition() => {
                        return Err(StoreError::ParentChanged { key })
                    }
                    Some(row) => row.seq,
                    None => self.take_seq(),
                };
                self.matches.insert(m.id(), Row { seq, value: m });
            }
            Node::Game(g) => {
                let seq = match self.games.get(&g.id()) {
                    Some(row) if row.value.match_id() != g.match_id() => {
                        return Err(StoreError::ParentChanged { key })
                    }
                    Some(row) => row.seq,
                    None => self.take_seq(),
                };
                self.games.insert(g.id(), Row { seq, value: g });
            }
        }
        Ok(())
    }

    fn delete(&mut self, key: NodeKey) -> StoreResult<()> {
        let removed = match key {
            NodeKey::Competition(id) => {
                if self.matches.values().any(|row| row.value.competition() == id) {
                    return Err(StoreError::HasChildren { key });
                }
                self.competitions.remove(&id).is_some()
            }
            NodeKey::Match(id) => {
                if self.games.values().any(|row| row.value.match_id() == id) {
                    return Err(StoreError::HasChildren { key });
                }
                self.matches.remove(&id).is_some()
            }
            NodeKey::Game(id) => self.games.remove(&id).is_some(),
        };
        if removed {
            Ok(())
        } else {
            Err(StoreError::RowNotFound { key })
        }
    }

    fn save_user(&mut self, user: User) -> StoreResult<()> {
        for other in self.users.values().filter(|u| u.id() != user.id()) {
            if other.username == user.username {
                return Err(StoreError::Conflict {
                    field: "username",
                    value: user.username,
                });
            }
            if other.email.eq_ignore_ascii_case(&user.email) {
                return Err(StoreError::Conflict {
                    field: "email",
                    value: user.email,
                });
            }
            if let (Some(a), Some(b)) = (&other.phone_number, &user.phone_number) {
                if a == b {
                    return Err(StoreError::Conflict {
                        field: "phone_number",
                        value: b.clone(),
                    });
                }
            }
        }
        self.users.insert(user.id(), user);
        Ok(())
    }
}
