mod articles;
mod comments;
mod posts;
mod users;
