//! Repository layer: the record store behind the catalog
//!
//! Each table family is reached through a trait so the services can run
//! against PostgreSQL in production and an in-memory store in tests.

pub mod authors;
pub mod books;
pub mod genres;
pub mod instances;
pub mod memory;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use authors::AuthorsRepository;
pub use books::BooksRepository;
pub use genres::GenresRepository;
pub use instances::InstancesRepository;
pub use memory::MemoryStore;

/// Main repository struct holding one handle per table family
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BooksRepository>,
    pub authors: Arc<dyn AuthorsRepository>,
    pub genres: Arc<dyn GenresRepository>,
    pub instances: Arc<dyn InstancesRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            authors: Arc::new(authors::PgAuthorsRepository::new(pool.clone())),
            genres: Arc::new(genres::PgGenresRepository::new(pool.clone())),
            instances: Arc::new(instances::PgInstancesRepository::new(pool)),
        }
    }

    /// Create a repository backed entirely by the given in-memory store
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            books: store.clone(),
            authors: store.clone(),
            genres: store.clone(),
            instances: store,
        }
    }
}
