pub use super::file::Entity as File;
pub use super::song::Entity as Song;
