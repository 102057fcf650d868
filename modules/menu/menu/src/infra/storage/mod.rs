mod memory_repo;
mod pg_repo;

pub use memory_repo::InMemoryMenuRepository;
pub use pg_repo::PgMenuRepository;
