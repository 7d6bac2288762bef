use chrono::NaiveDateTime;
use domain::{
    Article, ArticlePreview, Author, Post, SkipReason, TopLevelComment, UserComment, UserProfile,
};

fn when(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn by(author: Option<&Author>) -> &str {
    author.map(Author::display).unwrap_or("[unknown]")
}

pub fn post(p: &Post) {
    let heart = if p.liked_by_viewer { "♥" } else { "♡" };
    println!("#{} {}", p.id, p.title);
    if let Some(a) = &p.author {
        println!("   by {}", a.display());
    }
    println!("   {}", p.content);
    if let Some(img) = &p.image_url {
        println!("   [image] {}", img);
    }
    println!("   {} {}   💬 {}", heart, p.like_count, p.comment_count);
}

pub fn posts(list: &[Post]) {
    if list.is_empty() {
        println!("No posts yet.");
        return;
    }
    for p in list {
        post(p);
        println!();
    }
}

pub fn comments(list: &[TopLevelComment]) {
    if list.is_empty() {
        println!("No comments yet.");
        return;
    }
    for c in list {
        println!(
            "[{}] {} · {}",
            c.id,
            by(c.author.as_ref()),
            when(&c.created_at)
        );
        println!("    {}", c.content);
        for r in &c.replies {
            println!(
                "    ↳ [{}] {} · {}",
                r.id,
                by(r.author.as_ref()),
                when(&r.created_at)
            );
            println!("        {}", r.content);
        }
    }
}

pub fn user_comments(list: &[UserComment]) {
    if list.is_empty() {
        println!("No comments yet.");
        return;
    }
    for c in list {
        let on = match (&c.post_id, &c.post_title) {
            (Some(id), Some(title)) => format!(" on #{} {}", id, title),
            (Some(id), None) => format!(" on #{}", id),
            _ => String::new(),
        };
        println!("[{}] {}{}", c.id, when(&c.created_at), on);
        println!("    {}", c.content);
    }
}

pub fn profile(p: &UserProfile) {
    match &p.display_name {
        Some(name) => println!("{} (@{}) #{}", name, p.username, p.id),
        None => println!("@{} #{}", p.username, p.id),
    }
    for (label, value) in [
        ("Bio", &p.bio),
        ("Location", &p.location),
        ("Occupation", &p.occupation),
        ("Avatar", &p.avatar),
    ] {
        if let Some(v) = value {
            println!("  {}: {}", label, v);
        }
    }
    println!(
        "  {} posts · {} followers · {} following",
        p.post_count, p.followers, p.following
    );
}

pub fn article_previews(list: &[ArticlePreview]) {
    if list.is_empty() {
        println!("No articles found.");
        return;
    }
    for a in list {
        println!("#{} [{}] {}", a.id, a.category, a.title);
        println!(
            "    {} · {}",
            a.author_name.as_deref().unwrap_or("Foro"),
            when(&a.created_at)
        );
        println!("    {}", a.summary);
    }
}

pub fn article(a: &Article) {
    article_previews(std::slice::from_ref(&a.preview));
    if let Some(cover) = &a.preview.cover_image {
        println!("    [cover] {}", cover);
    }
    println!();
    println!("{}", a.content);
}

pub fn skipped(reason: SkipReason) {
    let msg = match reason {
        SkipReason::InFlight => "Still waiting on the previous request for this post.",
        SkipReason::ParentMissing => "That comment no longer exists, reply was not added.",
        SkipReason::NotLoaded => "Comment not found on this post.",
        SkipReason::Declined => "Cancelled.",
        SkipReason::Detached => "View closed before the response arrived.",
        SkipReason::Superseded => "A newer load replaced this one.",
    };
    println!("{}", msg);
}
