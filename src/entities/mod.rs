pub mod actor;
pub mod director;
pub mod genre;
pub mod movie;
pub mod movie_actor;
pub mod movie_genre;
pub mod rating;
pub mod review;
pub mod session;
pub mod user;
