pub mod content_repository;
pub mod game_repository;
pub mod round_repository;
pub mod user_repository;

pub use content_repository::ContentRepository;
pub use game_repository::GameRepository;
pub use round_repository::RoundRepository;
pub use user_repository::UserRepository;
