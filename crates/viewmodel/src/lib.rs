mod controller;
mod feed;
mod flight;
mod state;
mod traits;
mod tree;

pub use controller::{Confirm, Controller};
pub use feed::PostList;
pub use flight::{FlightGuard, InFlight};
pub use state::ViewState;
pub use traits::PostStore;
pub use tree::{CommentRef, CommentTree};
