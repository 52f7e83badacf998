pub mod codec;
mod filter;
pub mod memory;
pub mod sqlite;
pub mod statements;
pub mod traits;

pub use codec::RowCodec;
pub use filter::Filter;
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;
pub use statements::Statements;
pub use traits::Repository;
