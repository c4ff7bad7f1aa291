//! In-memory record store
//!
//! Mirrors the PostgreSQL repositories row for row, including the RESTRICT
//! rules on deletion and ISBN uniqueness. Used by tests and by
//! `storage.backend = "memory"` for local runs without a database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthorsRepository, BooksRepository, GenresRepository, InstancesRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorForm},
        book::{Book, BookForm, BookShort},
        genre::Genre,
        instance::{BookInstance, LoanStatus, LoanedInstance},
    },
};

#[derive(Default)]
struct Tables {
    authors: BTreeMap<i32, Author>,
    genres: BTreeMap<i32, Genre>,
    books: BTreeMap<i32, Book>,
    instances: HashMap<Uuid, BookInstance>,
    last_author_id: i32,
    last_genre_id: i32,
    last_book_id: i32,
}

impl Tables {
    fn book_short(&self, book: &Book) -> BookShort {
        BookShort {
            id: book.id,
            title: book.title.clone(),
            author_id: book.author_id,
            author_name: book
                .author_id
                .and_then(|id| self.authors.get(&id))
                .map(Author::display_name),
            isbn: book.isbn.clone(),
        }
    }

    fn isbn_taken(&self, isbn: &str, except: Option<i32>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != except)
    }

    fn on_loan(&self, borrower_id: Option<i32>) -> Vec<&BookInstance> {
        let mut loans: Vec<&BookInstance> = self
            .instances
            .values()
            .filter(|i| i.status == LoanStatus::OnLoan)
            .filter(|i| borrower_id.map_or(true, |b| i.borrower_id == Some(b)))
            .collect();
        loans.sort_by_key(|i| (i.due_back.is_none(), i.due_back, i.id));
        loans
    }
}

fn page<T>(rows: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a genre (genres have no management endpoint)
    pub async fn add_genre(&self, name: &str) -> Genre {
        let mut tables = self.tables.write().await;
        tables.last_genre_id += 1;
        let genre = Genre {
            id: tables.last_genre_id,
            name: name.to_string(),
        };
        tables.genres.insert(genre.id, genre.clone());
        genre
    }

    /// Add a copy of an existing book (copies have no management endpoint)
    pub async fn add_instance(
        &self,
        book_id: i32,
        imprint: &str,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i32>,
    ) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&book_id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book_id,
            imprint: imprint.to_string(),
            due_back,
            status,
            borrower_id,
        };
        tables.instances.insert(instance.id, instance.clone());
        Ok(instance)
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.books.len() as i64)
    }

    async fn count_title_containing(&self, word: &str) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.books.values().filter(|b| b.title.contains(word)).count() as i64)
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<BookShort>> {
        let tables = self.tables.read().await;
        let mut books: Vec<&Book> = tables.books.values().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        let rows: Vec<BookShort> = books.into_iter().map(|b| tables.book_short(b)).collect();
        Ok(page(rows, offset, limit))
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let tables = self.tables.read().await;
        let mut books: Vec<&Book> = tables
            .books
            .values()
            .filter(|b| b.author_id == Some(author_id))
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(books.into_iter().map(|b| tables.book_short(b)).collect())
    }

    async fn count_by_author(&self, author_id: i32) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|b| b.author_id == Some(author_id))
            .count() as i64)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.tables
            .read()
            .await
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if tables.isbn_taken(&form.isbn, None) {
            return Err(AppError::Conflict("A book with this ISBN already exists".to_string()));
        }
        tables.last_book_id += 1;
        let mut genre_ids = form.genre_ids.clone();
        genre_ids.sort_unstable();
        genre_ids.dedup();
        let book = Book {
            id: tables.last_book_id,
            title: form.title.clone(),
            author_id: form.author_id,
            summary: form.summary.clone(),
            isbn: form.isbn.clone(),
            language: form.language.clone(),
            genre_ids,
        };
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        if tables.isbn_taken(&form.isbn, Some(id)) {
            return Err(AppError::Conflict("A book with this ISBN already exists".to_string()));
        }
        let mut genre_ids = form.genre_ids.clone();
        genre_ids.sort_unstable();
        genre_ids.dedup();
        let book = Book {
            id,
            title: form.title.clone(),
            author_id: form.author_id,
            summary: form.summary.clone(),
            isbn: form.isbn.clone(),
            language: form.language.clone(),
            genre_ids,
        };
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        let dependents = tables.instances.values().filter(|i| i.book_id == id).count() as i64;
        if dependents > 0 {
            return Err(AppError::ReferentialDelete {
                resource: "book",
                id,
                dependents,
            });
        }
        tables.books.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AuthorsRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.authors.len() as i64)
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables.authors.values().cloned().collect();
        authors.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(page(authors, offset, limit))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        self.tables
            .read()
            .await
            .authors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn create(&self, form: &AuthorForm) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        tables.last_author_id += 1;
        let author = Author {
            id: tables.last_author_id,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            date_of_birth: form.date_of_birth,
            date_of_death: form.date_of_death,
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        let mut tables = self.tables.write().await;
        let author = tables
            .authors
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        author.first_name = form.first_name.clone();
        author.last_name = form.last_name.clone();
        author.date_of_birth = form.date_of_birth;
        author.date_of_death = form.date_of_death;
        Ok(author.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&id) {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        let dependents = tables
            .books
            .values()
            .filter(|b| b.author_id == Some(id))
            .count() as i64;
        if dependents > 0 {
            return Err(AppError::ReferentialDelete {
                resource: "author",
                id,
                dependents,
            });
        }
        tables.authors.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl GenresRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.genres.len() as i64)
    }

    async fn list(&self) -> AppResult<Vec<Genre>> {
        let mut genres: Vec<Genre> = self.tables.read().await.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>> {
        let tables = self.tables.read().await;
        let mut genres: Vec<Genre> = tables
            .genres
            .values()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }
}

#[async_trait]
impl InstancesRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.instances.len() as i64)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.instances.values().filter(|i| i.status == status).count() as i64)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        self.tables
            .read()
            .await
            .instances
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let tables = self.tables.read().await;
        let mut copies: Vec<BookInstance> = tables
            .instances
            .values()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect();
        copies.sort_by_key(|i| (i.due_back.is_none(), i.due_back, i.id));
        Ok(copies)
    }

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.instances.values().filter(|i| i.book_id == book_id).count() as i64)
    }

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        Ok(self.tables.read().await.on_loan(borrower_id).len() as i64)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<LoanedInstance>> {
        let tables = self.tables.read().await;
        let rows: Vec<LoanedInstance> = tables
            .on_loan(borrower_id)
            .into_iter()
            .map(|i| LoanedInstance {
                id: i.id,
                book_id: i.book_id,
                book_title: tables
                    .books
                    .get(&i.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default(),
                imprint: i.imprint.clone(),
                due_back: i.due_back,
                status: i.status,
                borrower_id: i.borrower_id,
                is_overdue: false,
            })
            .collect();
        Ok(page(rows, offset, limit))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let mut tables = self.tables.write().await;
        let instance = tables
            .instances
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        instance.due_back = Some(due_back);
        Ok(instance.clone())
    }
}
