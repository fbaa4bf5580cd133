use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use courtlog_types::{
    CompetitionId, CompetitionResult, GameId, MatchId, MatchType, MediaReference, NodeKey,
    Outcome,
};

#[derive(Parser)]
#[command(
    name = "courtlog",
    about = "Courtlog: a journal of your competitions, matches and games",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Config file (default: ./courtlog.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Username to act as
    #[arg(short, long, global = true)]
    pub user: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage user accounts
    User(UserArgs),
    /// Record and browse competitions
    Competition(CompetitionArgs),
    /// Record and browse matches of a competition
    Match(MatchArgs),
    /// Record and browse games of a match
    Game(GameArgs),
    /// Upload, attach, detach and fetch photos and videos
    Media(MediaArgs),
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Show a user
    Show { username: String },
    /// Allow a user to act again
    Enable { username: String },
    /// Stop a user from acting
    Disable { username: String },
}

// ---------------------------------------------------------------------------
// Competitions
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CompetitionArgs {
    #[command(subcommand)]
    pub action: CompetitionAction,
}

#[derive(Subcommand)]
pub enum CompetitionAction {
    /// Record a competition (needs --name, --start and --city)
    Create(CompetitionFields),
    /// List your competitions, newest first
    List,
    Show { id: CompetitionId },
    /// Change fields of a competition; unset flags keep their value
    Update {
        id: CompetitionId,
        #[command(flatten)]
        fields: CompetitionFields,
    },
    /// Delete a competition with its matches, games and media
    Delete { id: CompetitionId },
}

#[derive(Args, Default)]
pub struct CompetitionFields {
    #[arg(long)]
    pub name: Option<String>,
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD, default: the start day)
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub venue: Option<String>,
    /// Final placing, e.g. TOP_8 or champion
    #[arg(long)]
    pub result: Option<CompetitionResult>,
    #[arg(long)]
    pub coach_comment: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MatchArgs {
    #[command(subcommand)]
    pub action: MatchAction,
}

#[derive(Subcommand)]
pub enum MatchAction {
    /// Record a match (needs --opponent, --opponent-city and --result)
    Create {
        competition: CompetitionId,
        #[command(flatten)]
        fields: MatchFields,
    },
    /// List the matches of a competition
    List { competition: CompetitionId },
    Show { id: MatchId },
    Update {
        id: MatchId,
        #[command(flatten)]
        fields: MatchFields,
    },
    /// Delete a match with its games and videos
    Delete { id: MatchId },
}

#[derive(Args, Default)]
pub struct MatchFields {
    /// Stage, e.g. GROUP_STAGE or knockout-1 (default: GROUP_STAGE)
    #[arg(long = "type")]
    pub match_type: Option<MatchType>,
    #[arg(long)]
    pub opponent: Option<String>,
    #[arg(long)]
    pub opponent_city: Option<String>,
    #[arg(long)]
    pub club: Option<String>,
    /// Start time (RFC 3339)
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
    #[arg(long)]
    pub score: Option<String>,
    /// WIN or LOSE
    #[arg(long)]
    pub result: Option<Outcome>,
    #[arg(long)]
    pub coach_comment: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct GameArgs {
    #[command(subcommand)]
    pub action: GameAction,
}

#[derive(Subcommand)]
pub enum GameAction {
    /// Record a game (needs --score; number defaults to the next free one)
    Create {
        #[arg(value_name = "MATCH")]
        match_id: MatchId,
        #[command(flatten)]
        fields: GameFields,
    },
    /// List the games of a match
    List {
        #[arg(value_name = "MATCH")]
        match_id: MatchId,
    },
    Show { id: GameId },
    Update {
        id: GameId,
        #[command(flatten)]
        fields: GameFields,
    },
    /// Delete a game and its videos
    Delete { id: GameId },
}

#[derive(Args, Default)]
pub struct GameFields {
    #[arg(long)]
    pub number: Option<u32>,
    #[arg(long)]
    pub score: Option<String>,
    #[arg(long)]
    pub result: Option<Outcome>,
    #[arg(long)]
    pub coach_comment: Option<String>,
    #[arg(long)]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MediaArgs {
    #[command(subcommand)]
    pub action: MediaAction,
}

#[derive(Subcommand)]
pub enum MediaAction {
    /// Store files and attach them (photos to a competition, videos to a game)
    Upload {
        #[command(flatten)]
        target: NodeTarget,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Attach already stored references
    Attach {
        #[command(flatten)]
        target: NodeTarget,
        #[arg(required = true)]
        references: Vec<MediaReference>,
    },
    /// Detach references and delete their files
    Detach {
        #[command(flatten)]
        target: NodeTarget,
        #[arg(required = true)]
        references: Vec<MediaReference>,
    },
    /// Copy an attached file out of the journal
    Load {
        #[command(flatten)]
        target: NodeTarget,
        reference: MediaReference,
        /// Destination (default: the stored file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// The node a media command applies to.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct NodeTarget {
    #[arg(long)]
    pub competition: Option<CompetitionId>,
    #[arg(long)]
    pub game: Option<GameId>,
}

impl NodeTarget {
    pub fn key(&self) -> Option<NodeKey> {
        match (self.competition, self.game) {
            (Some(id), None) => Some(id.into()),
            (None, Some(id)) => Some(id.into()),
            _ => None,
        }
    }
}
