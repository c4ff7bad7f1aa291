//! Catalog service: books, authors and genres

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        book::{Book, BookDetails, BookForm, BookShort},
        genre::Genre,
        pagination::{PageWindow, Paginated, AUTHORS_PER_PAGE, BOOKS_PER_PAGE},
        DeleteConfirmation,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // Books

    pub async fn list_books(&self, page: Option<i64>) -> AppResult<Paginated<BookShort>> {
        let total = self.repository.books.count().await?;
        let window = PageWindow::resolve(page, BOOKS_PER_PAGE, total)?;
        let books = self
            .repository
            .books
            .list(window.offset, window.per_page)
            .await?;
        Ok(window.wrap(books, total))
    }

    /// Get book with its author, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => match self.repository.authors.get_by_id(author_id).await {
                Ok(author) => Some(author),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        let genres = self.repository.genres.get_many(&book.genre_ids).await?;
        let copies = self.repository.instances.list_for_book(id).await?;

        Ok(BookDetails {
            book,
            author,
            genres,
            copies,
        })
    }

    pub async fn book_form(&self, id: i32) -> AppResult<BookForm> {
        let book = self.repository.books.get_by_id(id).await?;
        Ok(BookForm::from(&book))
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        self.check_book_form(&form).await?;
        let book = self.repository.books.create(&form).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Book> {
        self.check_book_form(&form).await?;
        let book = self.repository.books.update(id, &form).await?;
        tracing::info!(book_id = book.id, "Book updated");
        Ok(book)
    }

    pub async fn book_delete_confirmation(&self, id: i32) -> AppResult<DeleteConfirmation> {
        let book = self.repository.books.get_by_id(id).await?;
        let dependents = self.repository.instances.count_for_book(id).await?;
        Ok(DeleteConfirmation {
            id,
            label: book.title,
            dependents,
        })
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        match self.repository.books.delete(id).await {
            Ok(()) => {
                tracing::info!(book_id = id, "Book deleted");
                Ok(())
            }
            Err(e @ AppError::ReferentialDelete { .. }) => {
                tracing::warn!(book_id = id, "Book deletion blocked: {}", e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Field rules plus the references a book form points at
    async fn check_book_form(&self, form: &BookForm) -> AppResult<()> {
        form.validate()?;

        if let Some(author_id) = form.author_id {
            match self.repository.authors.get_by_id(author_id).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    return Err(AppError::field(
                        "author_id",
                        "unknown_author",
                        format!("Author {} does not exist", author_id),
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        let known = self.repository.genres.get_many(&form.genre_ids).await?;
        if let Some(missing) = form
            .genre_ids
            .iter()
            .find(|id| !known.iter().any(|g| g.id == **id))
        {
            return Err(AppError::field(
                "genre_ids",
                "unknown_genre",
                format!("Genre {} does not exist", missing),
            ));
        }

        Ok(())
    }

    // Authors

    pub async fn list_authors(&self, page: Option<i64>) -> AppResult<Paginated<Author>> {
        let total = self.repository.authors.count().await?;
        let window = PageWindow::resolve(page, AUTHORS_PER_PAGE, total)?;
        let authors = self
            .repository
            .authors
            .list(window.offset, window.per_page)
            .await?;
        Ok(window.wrap(authors, total))
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn author_form(&self, id: i32) -> AppResult<AuthorForm> {
        let author = self.repository.authors.get_by_id(id).await?;
        Ok(AuthorForm::from(&author))
    }

    pub async fn create_author(&self, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.create(&form).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: AuthorForm) -> AppResult<Author> {
        form.validate()?;
        let author = self.repository.authors.update(id, &form).await?;
        tracing::info!(author_id = author.id, "Author updated");
        Ok(author)
    }

    pub async fn author_delete_confirmation(&self, id: i32) -> AppResult<DeleteConfirmation> {
        let author = self.repository.authors.get_by_id(id).await?;
        let dependents = self.repository.books.count_by_author(id).await?;
        Ok(DeleteConfirmation {
            id,
            label: author.display_name(),
            dependents,
        })
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        match self.repository.authors.delete(id).await {
            Ok(()) => {
                tracing::info!(author_id = id, "Author deleted");
                Ok(())
            }
            Err(e @ AppError::ReferentialDelete { .. }) => {
                tracing::warn!(author_id = id, "Author deletion blocked: {}", e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    // Genres

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }
}
