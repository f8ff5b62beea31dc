pub use super::captions::Entity as Captions;
pub use super::games::Entity as Games;
pub use super::memes::Entity as Memes;
pub use super::rounds::Entity as Rounds;
pub use super::users::Entity as Users;
