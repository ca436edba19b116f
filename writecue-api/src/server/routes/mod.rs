use crate::server::ServerRouter;
use axum::Router;

mod comments;
mod likes;
mod notifications;
mod posts;
mod users;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(likes::routes())
        .merge(comments::routes())
        .merge(notifications::routes())
        .merge(posts::routes())
        .merge(users::routes())
}
