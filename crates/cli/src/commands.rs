use clap::{Args, Parser, Subcommand};
use domain::{ArticleId, CommentId, PostId, UserId};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foro", version, about = "Terminal client for the Foro forum")]
pub struct Cli {
    /// Configuration file, replaces foro.toml / foro.{RUN_MODE}.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in with it.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FORO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Login {
        username: String,
        #[arg(long, env = "FORO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Whoami,

    /// List posts, newest first.
    Feed {
        /// Only posts written by this user.
        #[arg(long)]
        author: Option<UserId>,
    },
    /// Publish a post.
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Like or unlike a post.
    Like { post_id: PostId },
    /// Show the comments of a post.
    Comments { post_id: PostId },
    Comment { post_id: PostId, text: String },
    Reply {
        post_id: PostId,
        parent_id: CommentId,
        text: String,
    },
    DeleteComment {
        post_id: PostId,
        comment_id: CommentId,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Posts a user has liked (yourself by default).
    Liked { user_id: Option<UserId> },
    /// Comments a user has written (yourself by default).
    Activity { user_id: Option<UserId> },

    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Articles(ArticleCommand),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show { user_id: Option<UserId> },
    Edit(ProfileEdit),
    /// Upload a new profile picture.
    Avatar { path: PathBuf },
}

#[derive(Args, Debug)]
pub struct ProfileEdit {
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub occupation: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ArticleCommand {
    List {
        #[arg(long)]
        category: Option<String>,
    },
    Show { id: ArticleId },
    Categories,
    /// Publish an article (administrators only).
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        category: String,
        /// File holding the article body (HTML).
        #[arg(long)]
        content_file: PathBuf,
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    Delete {
        id: ArticleId,
        #[arg(short, long)]
        yes: bool,
    },
}
