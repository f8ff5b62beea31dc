pub mod captions;
pub mod games;
pub mod memes;
pub mod prelude;
pub mod rounds;
pub mod users;
