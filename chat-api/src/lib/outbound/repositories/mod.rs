pub mod message;
pub mod user;

pub use message::PostgresMessageRepository;
pub use user::PostgresUserRepository;
