//! Values returned by journal operations.

use courtlog_types::{Competition, Match, MediaReference};
use serde::Serialize;

use crate::cleanup::CleanupReport;

/// Rows removed by one delete, per level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemovedRows {
    pub competitions: usize,
    pub matches: usize,
    pub games: usize,
}

impl RemovedRows {
    pub fn total(&self) -> usize {
        self.competitions + self.matches + self.games
    }
}

/// Result of deleting a node and its subtree.
///
/// The rows are gone once this is returned. `cleanup` says which of the
/// released media files could not be removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub removed: RemovedRows,
    pub cleanup: CleanupReport,
}

/// Result of detaching media from a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MediaRemoval<T> {
    /// The node as committed.
    pub node: T,
    /// References that were in the list and are now gone from it.
    pub removed: Vec<MediaReference>,
    pub cleanup: CleanupReport,
}

impl<T> MediaRemoval<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MediaRemoval<U> {
        MediaRemoval {
            node: f(self.node),
            removed: self.removed,
            cleanup: self.cleanup,
        }
    }
}

/// A competition with the number of matches recorded under it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompetitionSummary {
    #[serde(flatten)]
    pub competition: Competition,
    pub match_count: usize,
}

/// A match with the number of games recorded under it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    #[serde(flatten)]
    pub record: Match,
    pub game_count: usize,
}

/// A client file to be stored and attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Bytes of an attached media file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaContent {
    pub reference: MediaReference,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{competition_details, Fixture};

    #[test]
    fn summary_serializes_flat() {
        let fx = Fixture::new();
        let competition = fx
            .service
            .create_competition(fx.ann, competition_details("Open", 1))
            .unwrap();
        let summary = CompetitionSummary {
            competition,
            match_count: 3,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["details"]["name"], "Open");
        assert_eq!(json["match_count"], 3);
        assert!(json["photos"].as_array().unwrap().is_empty());
    }

    #[test]
    fn removed_rows_total() {
        let rows = RemovedRows {
            competitions: 1,
            matches: 2,
            games: 5,
        };
        assert_eq!(rows.total(), 8);
    }
}
