//! Test doubles and fixtures for the service tests.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use courtlog_media::{InMemoryMediaStore, MediaError, MediaResult, MediaStore};
use courtlog_store::{
    EntityStore, InMemoryEntityStore, StoreError, StoreResult, StoreView, Transaction,
};
use courtlog_types::{
    CompetitionDetails, CompetitionId, GameDetails, GameId, MatchDetails, MatchId, MatchType,
    MediaCategory, MediaReference, NewUser, Node, NodeKey, Outcome, ParentKey, User, UserId,
};

use crate::accounts::AccountService;
use crate::outcome::Upload;
use crate::service::HierarchyService;

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// In-memory media store that records delete attempts and can be told to fail.
#[derive(Debug)]
pub struct RecordingMediaStore {
    inner: InMemoryMediaStore,
    deletes: Mutex<Vec<MediaReference>>,
    fail_deletes: AtomicBool,
    stores_left: AtomicUsize,
}

impl RecordingMediaStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryMediaStore::new(),
            deletes: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
            stores_left: AtomicUsize::new(usize::MAX),
        }
    }

    /// A store whose every delete fails.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_fail_deletes(true);
        store
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Let `n` more stores succeed, then fail.
    pub fn fail_stores_after(&self, n: usize) {
        self.stores_left.store(n, Ordering::SeqCst);
    }

    pub fn delete_attempts(&self) -> Vec<MediaReference> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn file_count(&self) -> usize {
        self.inner.len()
    }

    pub fn holds(&self, reference: &MediaReference) -> bool {
        self.inner.exists(reference).unwrap()
    }
}

impl MediaStore for RecordingMediaStore {
    fn store(
        &self,
        data: &[u8],
        file_name: &str,
        category: MediaCategory,
    ) -> MediaResult<MediaReference> {
        if self.stores_left.load(Ordering::SeqCst) == 0 {
            return Err(MediaError::Io(io::Error::other("disk full")));
        }
        self.stores_left.fetch_sub(1, Ordering::SeqCst);
        self.inner.store(data, file_name, category)
    }

    fn load(&self, reference: &MediaReference) -> MediaResult<Vec<u8>> {
        self.inner.load(reference)
    }

    fn delete(&self, reference: &MediaReference) -> MediaResult<bool> {
        self.deletes.lock().unwrap().push(reference.clone());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MediaError::Io(io::Error::other("permission denied")));
        }
        self.inner.delete(reference)
    }

    fn exists(&self, reference: &MediaReference) -> MediaResult<bool> {
        self.inner.exists(reference)
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Entity store that can fail part-way through a transaction.
#[derive(Debug, Default)]
pub struct FlakyEntityStore {
    inner: InMemoryEntityStore,
    delete_budget: Mutex<Option<usize>>,
    fail_commits: AtomicBool,
}

impl FlakyEntityStore {
    /// In later transactions, fail the delete after the first `n`.
    pub fn fail_after_deletes(&self, n: usize) {
        *self.delete_budget.lock().unwrap() = Some(n);
    }

    /// Fail every transaction after its closure has succeeded.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn row_counts(&self) -> (usize, usize, usize) {
        self.inner.row_counts()
    }
}

struct FlakyTransaction<'a> {
    inner: &'a mut dyn Transaction,
    deletes_left: Option<usize>,
}

impl StoreView for FlakyTransaction<'_> {
    fn get(&self, key: NodeKey) -> StoreResult<Option<Node>> {
        self.inner.get(key)
    }

    fn list_children(&self, parent: ParentKey) -> StoreResult<Vec<Node>> {
        self.inner.list_children(parent)
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.inner.user(id)
    }

    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.inner.user_by_username(username)
    }
}

impl Transaction for FlakyTransaction<'_> {
    fn save(&mut self, node: Node) -> StoreResult<()> {
        self.inner.save(node)
    }

    fn delete(&mut self, key: NodeKey) -> StoreResult<()> {
        if let Some(left) = self.deletes_left.as_mut() {
            if *left == 0 {
                return Err(StoreError::Backend(format!("injected failure deleting {key}")));
            }
            *left -= 1;
        }
        self.inner.delete(key)
    }

    fn save_user(&mut self, user: User) -> StoreResult<()> {
        self.inner.save_user(user)
    }
}

impl EntityStore for FlakyEntityStore {
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreView) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.inner.read(f)
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let deletes_left = *self.delete_budget.lock().unwrap();
        let fail_commit = self.fail_commits.load(Ordering::SeqCst);
        self.inner.transaction(|tx| {
            let mut flaky = FlakyTransaction {
                inner: tx,
                deletes_left,
            };
            let out = f(&mut flaky)?;
            if fail_commit {
                return Err(StoreError::Backend("injected commit failure".into()).into());
            }
            Ok(out)
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub type TestService = HierarchyService<FlakyEntityStore, RecordingMediaStore>;

pub struct Fixture {
    pub store: Arc<FlakyEntityStore>,
    pub media: Arc<RecordingMediaStore>,
    pub service: TestService,
    pub ann: UserId,
    pub bob: UserId,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(FlakyEntityStore::default());
        let media = Arc::new(RecordingMediaStore::new());
        let service = HierarchyService::new(Arc::clone(&store), Arc::clone(&media));
        let accounts = AccountService::new(Arc::clone(&store));
        let ann = accounts.register(new_user("ann")).unwrap().id();
        let bob = accounts.register(new_user("bob")).unwrap().id();
        Self {
            store,
            media,
            service,
            ann,
            bob,
        }
    }
}

pub fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.into(),
        email: format!("{name}@example.com"),
        phone_number: None,
        nickname: None,
        credential_hash: "!".into(),
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

pub fn competition_details(name: &str, start_day: u32) -> CompetitionDetails {
    CompetitionDetails::new(name, day(start_day), day(start_day + 1), "Oslo")
}

pub fn match_details(opponent: &str) -> MatchDetails {
    MatchDetails::new(MatchType::GroupStage, opponent, "Bergen", Outcome::Win)
}

pub fn game_details(number: u32) -> GameDetails {
    GameDetails::new(number, "21-17", Some(Outcome::Win))
}

/// Ids and media of a seeded competition.
pub struct Tree {
    pub competition: CompetitionId,
    pub matches: Vec<MatchId>,
    /// Games of every match, match by match.
    pub games: Vec<GameId>,
    pub photos: Vec<MediaReference>,
    pub videos: Vec<MediaReference>,
}

/// One competition with two photos, two matches and two games per match,
/// each game holding one video.
pub fn seed_tree(fx: &Fixture, owner: UserId) -> Tree {
    let svc = &fx.service;
    let competition = svc
        .create_competition(owner, competition_details("Summer Cup", 10))
        .unwrap();
    let competition = svc
        .upload_photos(
            owner,
            competition.id(),
            &[Upload::new("a.jpg", b"a".to_vec()), Upload::new("b.png", b"b".to_vec())],
        )
        .unwrap();

    let mut tree = Tree {
        competition: competition.id(),
        matches: Vec::new(),
        games: Vec::new(),
        photos: competition.photos().as_slice().to_vec(),
        videos: Vec::new(),
    };
    for opponent in ["Lee", "Kim"] {
        let record = svc
            .create_match(owner, competition.id(), match_details(opponent))
            .unwrap();
        for n in 1..=2 {
            let game = svc.create_game(owner, record.id(), game_details(n)).unwrap();
            let game = svc
                .upload_video(owner, game.id(), &Upload::new("g.mp4", vec![n as u8; 4]))
                .unwrap();
            tree.videos.extend(game.videos().iter().cloned());
            tree.games.push(game.id());
        }
        tree.matches.push(record.id());
    }
    tree
}
