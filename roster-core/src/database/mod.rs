//! Persistence ports and adapters for the user directory.

pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod postgres;

pub use memory::InMemoryUsersRepository;
pub use ports::users::{RepositoryError, UsersRepository};
#[cfg(feature = "database")]
pub use postgres::PostgresUsersRepository;
