use anyhow::{bail, Context as _};
use domain::{
    NewArticle, NewPost, Outcome, PostId, ProfileUpdate, Upload, UserId, ViewEvent, Viewer,
};
use remote::Api;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use viewmodel::Controller;

use crate::commands::{ArticleCommand, Command, ProfileCommand, ProfileEdit};
use crate::render;
use crate::session::SessionFile;

pub struct Context {
    pub api: Api,
    pub session: SessionFile,
}

impl Context {
    fn viewer(&self) -> anyhow::Result<Option<Viewer>> {
        self.session.load()
    }

    fn require_viewer(&self) -> anyhow::Result<Viewer> {
        self.viewer()?
            .context("You need to sign in first (foro login <username>).")
    }

    fn controller(&self) -> Controller {
        let controller = Controller::new(Arc::new(self.api.clone()));
        tokio::spawn(log_events(controller.subscribe()));
        controller
    }
}

async fn log_events(mut rx: broadcast::Receiver<ViewEvent>) {
    while let Ok(event) = rx.recv().await {
        debug!(?event, "view updated");
    }
}

pub async fn run(command: Command, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let profile = ctx.api.register(&username, &email, &password).await?;
            ctx.session.save(&Viewer::from(&profile))?;
            println!("Welcome, {}!", profile.username);
        }
        Command::Login { username, password } => {
            let password = password_or_prompt(password)?;
            let profile = ctx.api.login(&username, &password).await?;
            ctx.session.save(&Viewer::from(&profile))?;
            println!("Signed in as {}.", profile.username);
        }
        Command::Logout => {
            if ctx.session.clear()? {
                println!("Signed out.");
            } else {
                println!("Not signed in.");
            }
        }
        Command::Whoami => match ctx.viewer()? {
            Some(v) => println!("{} (#{})", v.username, v.id),
            None => println!("Not signed in."),
        },

        Command::Feed { author } => {
            let viewer = ctx.viewer()?;
            let controller = ctx.controller();
            match author {
                Some(a) => controller.load_author_feed(&a, viewer.as_ref()).await?,
                None => controller.load_feed(viewer.as_ref()).await?,
            };
            render::posts(&controller.posts());
        }
        Command::Post {
            title,
            content,
            image,
        } => {
            let viewer = ctx.viewer()?;
            let image = match image {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let controller = ctx.controller();
            let new_post = NewPost {
                title,
                content,
                image,
            };
            match controller.create_post(viewer.as_ref(), new_post).await? {
                Outcome::Applied(p) => render::post(&p),
                Outcome::Skipped(reason) => render::skipped(reason),
            }
        }
        Command::Like { post_id } => {
            let viewer = ctx.viewer()?;
            let controller = ctx.controller();
            controller.load_feed(viewer.as_ref()).await?;
            match controller.toggle_like(viewer.as_ref(), &post_id).await? {
                Outcome::Applied(_) => show_post(&controller, &post_id),
                Outcome::Skipped(reason) => render::skipped(reason),
            }
        }
        Command::Comments { post_id } => {
            let viewer = ctx.viewer()?;
            let controller = ctx.controller();
            controller.load_feed(viewer.as_ref()).await?;
            controller.open_comments(&post_id).await?;
            show_post(&controller, &post_id);
            println!();
            render::comments(&controller.comments(&post_id).unwrap_or_default());
        }
        Command::Comment { post_id, text } => {
            let viewer = ctx.viewer()?;
            let controller = ctx.controller();
            controller.open_comments(&post_id).await?;
            match controller.add_comment(viewer.as_ref(), &post_id, &text).await? {
                Outcome::Applied(c) => println!("Comment {} added.", c.id),
                Outcome::Skipped(reason) => render::skipped(reason),
            }
        }
        Command::Reply {
            post_id,
            parent_id,
            text,
        } => {
            let viewer = ctx.viewer()?;
            let controller = ctx.controller();
            controller.open_comments(&post_id).await?;
            match controller
                .add_reply(viewer.as_ref(), &post_id, &parent_id, &text)
                .await?
            {
                Outcome::Applied(r) => println!("Reply {} added under {}.", r.id, r.parent_id),
                Outcome::Skipped(reason) => render::skipped(reason),
            }
        }
        Command::DeleteComment {
            post_id,
            comment_id,
            yes,
        } => {
            let viewer = ctx.viewer()?;
            let controller = ctx.controller();
            controller.open_comments(&post_id).await?;
            let confirm = |prompt: &str| yes || ask(prompt);
            match controller
                .delete_comment(viewer.as_ref(), &post_id, &comment_id, &confirm)
                .await?
            {
                Outcome::Applied(n) if n > 1 => {
                    println!("Deleted comment {} and {} replies.", comment_id, n - 1)
                }
                Outcome::Applied(_) => println!("Deleted comment {}.", comment_id),
                Outcome::Skipped(reason) => render::skipped(reason),
            }
        }
        Command::Liked { user_id } => {
            let viewer = ctx.viewer()?;
            let id = user_or_self(ctx, user_id)?;
            let posts = ctx.api.liked_posts(&id, viewer.as_ref().map(|v| &v.id)).await?;
            render::posts(&posts);
        }
        Command::Activity { user_id } => {
            let id = user_or_self(ctx, user_id)?;
            render::user_comments(&ctx.api.user_comments(&id).await?);
        }

        Command::Profile(cmd) => run_profile(cmd, ctx).await?,
        Command::Articles(cmd) => run_articles(cmd, ctx).await?,
    }
    Ok(())
}

async fn run_profile(cmd: ProfileCommand, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        ProfileCommand::Show { user_id } => {
            let id = user_or_self(ctx, user_id)?;
            render::profile(&ctx.api.get_user(&id).await?);
        }
        ProfileCommand::Edit(edit) => {
            let viewer = ctx.require_viewer()?;
            let update = profile_update(edit);
            if update.is_empty() {
                bail!("Nothing to change, pass at least one field.");
            }
            let profile = ctx.api.update_user(&viewer.id, &update).await?;
            ctx.session.save(&Viewer::from(&profile))?;
            render::profile(&profile);
        }
        ProfileCommand::Avatar { path } => {
            let viewer = ctx.require_viewer()?;
            let upload = read_upload(&path).await?;
            let profile = ctx.api.upload_avatar(&viewer.id, &upload).await?;
            render::profile(&profile);
        }
    }
    Ok(())
}

async fn run_articles(cmd: ArticleCommand, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        ArticleCommand::List { category } => {
            render::article_previews(&ctx.api.list_articles(category.as_deref()).await?);
        }
        ArticleCommand::Show { id } => render::article(&ctx.api.get_article(&id).await?),
        ArticleCommand::Categories => {
            for c in ctx.api.article_categories().await? {
                println!("{}", c);
            }
        }
        ArticleCommand::Publish {
            title,
            summary,
            category,
            content_file,
            cover,
        } => {
            let viewer = ctx.require_viewer()?;
            let content = tokio::fs::read_to_string(&content_file)
                .await
                .with_context(|| format!("Failed to read {}", content_file.display()))?;
            if title.trim().is_empty() || content.trim().is_empty() {
                bail!("Title and content cannot be empty.");
            }
            let cover_image = match cover {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let article = NewArticle {
                title,
                summary,
                content,
                category,
                cover_image,
            };
            let created = ctx.api.create_article(&article, &viewer.id).await?;
            println!("Published article #{}.", created.preview.id);
        }
        ArticleCommand::Delete { id, yes } => {
            let viewer = ctx.require_viewer()?;
            if !yes && !ask("Delete this article?") {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.api.delete_article(&id, &viewer.id).await?;
            println!("Deleted article #{}.", id);
        }
    }
    Ok(())
}

fn show_post(controller: &Controller, post_id: &PostId) {
    match controller.post(post_id) {
        Some(p) => render::post(&p),
        None => println!("Post #{} is not in the feed.", post_id),
    }
}

fn user_or_self(ctx: &Context, user_id: Option<UserId>) -> anyhow::Result<UserId> {
    match user_id {
        Some(id) => Ok(id),
        None => Ok(ctx.require_viewer()?.id),
    }
}

fn profile_update(edit: ProfileEdit) -> ProfileUpdate {
    ProfileUpdate {
        display_name: edit.display_name,
        bio: edit.bio,
        location: edit.location,
        occupation: edit.occupation,
        avatar: None,
    }
}

async fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Upload path has no file name")?;
    Ok(Upload { file_name, bytes })
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let entered = read_line("Password: ")?;
    if entered.is_empty() {
        bail!("Password cannot be empty.");
    }
    Ok(entered)
}

fn ask(prompt: &str) -> bool {
    match read_line(&format!("{} [y/N] ", prompt)) {
        Ok(answer) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

// block_in_place 需要多线程运行时，#[tokio::main] 默认即是
fn read_line(prompt: &str) -> anyhow::Result<String> {
    tokio::task::block_in_place(|| prompt_line(&mut io::stdin().lock(), &mut io::stdout(), prompt))
}

fn prompt_line(
    input: &mut impl BufRead,
    out: &mut impl Write,
    prompt: &str,
) -> anyhow::Result<String> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
