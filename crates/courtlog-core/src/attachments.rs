//! Photo and video lists of competitions and games.
//!
//! Attaching only edits the node's list; the files are expected to have been
//! stored already. Detaching edits the list in a transaction and then deletes
//! the files of the references that were actually removed, best-effort.

use courtlog_media::MediaStore;
use courtlog_store::EntityStore;
use courtlog_types::{
    Competition, CompetitionId, Game, GameId, MediaCategory, MediaReference, Node, NodeKey,
    NodeKind, UserId,
};
use tracing::debug;

use crate::cleanup::remove_files;
use crate::error::{HierarchyError, HierarchyResult};
use crate::guard::OwnershipGuard;
use crate::outcome::{MediaContent, MediaRemoval, Upload};
use crate::service::HierarchyService;
use crate::validation::check_media;

impl<S, M> HierarchyService<S, M>
where
    S: EntityStore,
    M: MediaStore + ?Sized,
{
    /// Append photo references to a competition, skipping ones it already has.
    pub fn add_photos(
        &self,
        actor: UserId,
        id: CompetitionId,
        references: Vec<MediaReference>,
    ) -> HierarchyResult<Competition> {
        check_media(NodeKind::Competition, &references)?;
        self.store.transaction(|tx| -> HierarchyResult<Competition> {
            let mut competition = OwnershipGuard::new(&*tx).competition(actor, id)?;
            let added = competition.photos_mut().attach(references);
            if !added.is_empty() {
                competition.touch();
                tx.save(competition.clone().into())?;
                debug!(%id, count = added.len(), "attached photos");
            }
            Ok(competition)
        })
    }

    /// Remove photo references and delete the files of those that were present.
    pub fn remove_photos(
        &self,
        actor: UserId,
        id: CompetitionId,
        references: &[MediaReference],
    ) -> HierarchyResult<MediaRemoval<Competition>> {
        let (competition, removed) =
            self.store
                .transaction(|tx| -> HierarchyResult<(Competition, Vec<MediaReference>)> {
                    let mut competition = OwnershipGuard::new(&*tx).competition(actor, id)?;
                    let removed = competition.photos_mut().detach(references);
                    if !removed.is_empty() {
                        competition.touch();
                        tx.save(competition.clone().into())?;
                    }
                    Ok((competition, removed))
                })?;
        let cleanup = remove_files(&*self.media, &removed);
        Ok(MediaRemoval {
            node: competition,
            removed,
            cleanup,
        })
    }

    pub fn add_videos(
        &self,
        actor: UserId,
        id: GameId,
        references: Vec<MediaReference>,
    ) -> HierarchyResult<Game> {
        check_media(NodeKind::Game, &references)?;
        self.store.transaction(|tx| -> HierarchyResult<Game> {
            let mut game = OwnershipGuard::new(&*tx).game(actor, id)?;
            let added = game.videos_mut().attach(references);
            if !added.is_empty() {
                game.touch();
                tx.save(game.clone().into())?;
                debug!(%id, count = added.len(), "attached videos");
            }
            Ok(game)
        })
    }

    pub fn remove_videos(
        &self,
        actor: UserId,
        id: GameId,
        references: &[MediaReference],
    ) -> HierarchyResult<MediaRemoval<Game>> {
        let (game, removed) = self
            .store
            .transaction(|tx| -> HierarchyResult<(Game, Vec<MediaReference>)> {
                let mut game = OwnershipGuard::new(&*tx).game(actor, id)?;
                let removed = game.videos_mut().detach(references);
                if !removed.is_empty() {
                    game.touch();
                    tx.save(game.clone().into())?;
                }
                Ok((game, removed))
            })?;
        let cleanup = remove_files(&*self.media, &removed);
        Ok(MediaRemoval {
            node: game,
            removed,
            cleanup,
        })
    }

    /// Attach references to whichever node `key` names.
    pub fn add_media(
        &self,
        actor: UserId,
        key: NodeKey,
        references: Vec<MediaReference>,
    ) -> HierarchyResult<Node> {
        match key {
            NodeKey::Competition(id) => self.add_photos(actor, id, references).map(Node::from),
            NodeKey::Game(id) => self.add_videos(actor, id, references).map(Node::from),
            NodeKey::Match(_) => Err(HierarchyError::validation("a match does not hold media")),
        }
    }

    /// Detach references from whichever node `key` names.
    pub fn remove_media(
        &self,
        actor: UserId,
        key: NodeKey,
        references: &[MediaReference],
    ) -> HierarchyResult<MediaRemoval<Node>> {
        match key {
            NodeKey::Competition(id) => {
                Ok(self.remove_photos(actor, id, references)?.map(Node::from))
            }
            NodeKey::Game(id) => Ok(self.remove_videos(actor, id, references)?.map(Node::from)),
            NodeKey::Match(_) => Err(HierarchyError::validation("a match does not hold media")),
        }
    }

    /// Store uploaded photos and attach them to a competition.
    ///
    /// Ownership is checked before any file is written. If storing or
    /// attaching fails, the files written by this call are deleted again.
    pub fn upload_photos(
        &self,
        actor: UserId,
        id: CompetitionId,
        uploads: &[Upload],
    ) -> HierarchyResult<Competition> {
        if uploads.is_empty() {
            return Err(HierarchyError::validation("no photos to upload"));
        }
        self.store.read(|view| -> HierarchyResult<()> {
            OwnershipGuard::new(view).competition(actor, id)?;
            Ok(())
        })?;
        let stored = self.store_files(uploads, MediaCategory::Photos)?;
        self.add_photos(actor, id, stored.clone())
            .inspect_err(|_| self.discard(&stored))
    }

    /// Store an uploaded video and attach it to a game.
    pub fn upload_video(
        &self,
        actor: UserId,
        id: GameId,
        upload: &Upload,
    ) -> HierarchyResult<Game> {
        self.store.read(|view| -> HierarchyResult<()> {
            OwnershipGuard::new(view).game(actor, id)?;
            Ok(())
        })?;
        let stored = self.store_files(std::slice::from_ref(upload), MediaCategory::Videos)?;
        self.add_videos(actor, id, stored.clone())
            .inspect_err(|_| self.discard(&stored))
    }

    /// Read an attached file.
    ///
    /// The reference must be in the media list of a node the actor owns.
    pub fn load_media(
        &self,
        actor: UserId,
        key: NodeKey,
        reference: &MediaReference,
    ) -> HierarchyResult<MediaContent> {
        self.store.read(|view| -> HierarchyResult<()> {
            let node = OwnershipGuard::new(view).load(actor, key)?;
            if !node.media().contains(reference) {
                return Err(HierarchyError::MediaNotAttached {
                    key,
                    reference: reference.clone(),
                });
            }
            Ok(())
        })?;
        let data = self.media.load(reference)?;
        Ok(MediaContent {
            reference: reference.clone(),
            content_type: reference.content_type(),
            data,
        })
    }

    fn store_files(
        &self,
        uploads: &[Upload],
        category: MediaCategory,
    ) -> HierarchyResult<Vec<MediaReference>> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.media.store(&upload.data, &upload.file_name, category) {
                Ok(reference) => stored.push(reference),
                Err(e) => {
                    self.discard(&stored);
                    return Err(e.into());
                }
            }
        }
        Ok(stored)
    }

    /// Delete files stored by an upload that did not get attached.
    fn discard(&self, stored: &[MediaReference]) {
        if stored.is_empty() {
            return;
        }
        let report = remove_files(&*self.media, stored);
        debug!(
            files = report.attempted.len(),
            failed = report.failures.len(),
            "discarded unattached uploads"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{competition_details, game_details, match_details, seed_tree, Fixture};

    fn photo(name: &str) -> MediaReference {
        MediaReference::parse(&format!("photos/{name}.jpg")).unwrap()
    }

    #[test]
    fn add_is_idempotent_per_reference() {
        let fx = Fixture::new();
        let c = fx
            .service
            .create_competition(fx.ann, competition_details("Open", 1))
            .unwrap();
        let abc = photo("abc");
        fx.service.add_photos(fx.ann, c.id(), vec![abc.clone()]).unwrap();
        let c = fx
            .service
            .add_photos(fx.ann, c.id(), vec![abc.clone(), abc.clone()])
            .unwrap();
        assert_eq!(c.photos().as_slice(), [abc]);
        assert!(fx.media.delete_attempts().is_empty());
    }

    #[test]
    fn remove_then_add_leaves_one_reference() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);
        let target = tree.photos[0].clone();

        let removal = fx
            .service
            .remove_photos(fx.ann, tree.competition, &[target.clone()])
            .unwrap();
        assert_eq!(removal.removed, vec![target.clone()]);
        assert_eq!(removal.cleanup.deleted, vec![target.clone()]);
        assert!(!fx.media.holds(&target));

        let c = fx
            .service
            .add_photos(fx.ann, tree.competition, vec![target.clone()])
            .unwrap();
        assert_eq!(c.photos().iter().filter(|r| **r == target).count(), 1);
        // the reference is back but the file is not
        assert!(matches!(
            fx.service.load_media(fx.ann, tree.competition.into(), &target),
            Err(HierarchyError::Media(_))
        ));
    }

    #[test]
    fn batch_remove_attempts_only_present_references() {
        let fx = Fixture::new();
        let c = fx
            .service
            .create_competition(fx.ann, competition_details("C1", 1))
            .unwrap();
        let abc = photo("abc");
        let missing = photo("missing");
        fx.service.add_photos(fx.ann, c.id(), vec![abc.clone()]).unwrap();

        let removal = fx
            .service
            .remove_media(fx.ann, c.id().into(), &[abc.clone(), missing.clone()])
            .unwrap();
        assert!(!removal.node.media().contains(&abc));
        assert!(!removal.node.media().contains(&missing));
        assert_eq!(fx.media.delete_attempts(), vec![abc.clone()]);
        // no file was ever stored for it
        assert_eq!(removal.cleanup.missing, vec![abc]);
    }

    #[test]
    fn failed_file_delete_still_detaches() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);
        fx.media.set_fail_deletes(true);
        let video = tree.videos[1].clone();

        let removal = fx
            .service
            .remove_videos(fx.ann, tree.games[1], &[video.clone()])
            .unwrap();
        assert!(removal.node.videos().is_empty());
        assert_eq!(removal.cleanup.failures.len(), 1);
        assert_eq!(removal.cleanup.failures[0].reference, video);
        assert!(fx.media.holds(&video));
    }

    #[test]
    fn media_category_must_fit_the_node() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);
        let video = MediaReference::parse("videos/x.mp4").unwrap();

        let err = fx
            .service
            .add_photos(fx.ann, tree.competition, vec![video])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = fx
            .service
            .add_videos(fx.ann, tree.games[0], vec![photo("p")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = fx
            .service
            .add_media(fx.ann, tree.matches[0].into(), vec![])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn media_ops_check_ownership() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);
        let files_before = fx.media.file_count();

        let err = fx
            .service
            .upload_photos(fx.bob, tree.competition, &[Upload::new("x.jpg", b"x".to_vec())])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(fx.media.file_count(), files_before);

        let err = fx
            .service
            .remove_videos(fx.bob, tree.games[0], &tree.videos[..1])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(fx.media.delete_attempts().is_empty());

        let err = fx
            .service
            .load_media(fx.bob, tree.games[0].into(), &tree.videos[0])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn failed_upload_leaves_no_files() {
        let fx = Fixture::new();
        let c = fx
            .service
            .create_competition(fx.ann, competition_details("Open", 1))
            .unwrap();
        fx.media.fail_stores_after(1);

        let uploads = [
            Upload::new("one.jpg", b"1".to_vec()),
            Upload::new("two.jpg", b"2".to_vec()),
        ];
        let err = fx.service.upload_photos(fx.ann, c.id(), &uploads).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Media);
        assert_eq!(fx.media.file_count(), 0);
        assert_eq!(fx.media.delete_attempts().len(), 1);
        assert!(fx.service.get_competition(fx.ann, c.id()).unwrap().photos().is_empty());
    }

    #[test]
    fn upload_is_discarded_when_attach_fails() {
        let fx = Fixture::new();
        let c = fx
            .service
            .create_competition(fx.ann, competition_details("Open", 1))
            .unwrap();
        let m = fx.service.create_match(fx.ann, c.id(), match_details("Lee")).unwrap();
        let g = fx.service.create_game(fx.ann, m.id(), game_details(1)).unwrap();
        fx.store.fail_commits(true);

        let err = fx
            .service
            .upload_video(fx.ann, g.id(), &Upload::new("clip.mov", b"v".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(fx.media.file_count(), 0);
    }

    #[test]
    fn rejected_upload_names() {
        let fx = Fixture::new();
        let c = fx
            .service
            .create_competition(fx.ann, competition_details("Open", 1))
            .unwrap();
        for name in ["../evil.jpg", "notes.txt", ""] {
            let err = fx
                .service
                .upload_photos(fx.ann, c.id(), &[Upload::new(name, b"x".to_vec())])
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Media, "{name}");
        }
        let err = fx.service.upload_photos(fx.ann, c.id(), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fx.media.file_count(), 0);
    }

    #[test]
    fn load_requires_attachment() {
        let fx = Fixture::new();
        let tree = seed_tree(&fx, fx.ann);

        let content = fx
            .service
            .load_media(fx.ann, tree.games[1].into(), &tree.videos[1])
            .unwrap();
        assert_eq!(content.content_type, "video/mp4");
        assert_eq!(content.data, vec![2u8; 4]);

        let photo = fx
            .service
            .load_media(fx.ann, tree.competition.into(), &tree.photos[1])
            .unwrap();
        assert_eq!(photo.content_type, "image/png");
        assert_eq!(photo.data, b"b");

        // attached elsewhere in the same tree
        let err = fx
            .service
            .load_media(fx.ann, tree.games[0].into(), &tree.videos[1])
            .unwrap_err();
        assert!(matches!(err, HierarchyError::MediaNotAttached { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
