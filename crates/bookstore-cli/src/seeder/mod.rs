//! Demo catalogue seeding.

use fake::Fake;
use fake::faker::lorem::en::Words;
use fake::faker::name::en::Name;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use bookstore_models::BookId;

pub struct BookSeed {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub stock: i32,
}

// 4 params per book
const BATCH_SIZE: usize = 1000;

pub fn generate_books(count: usize) -> Vec<BookSeed> {
    (0..count)
        .map(|_| {
            let words: Vec<String> = Words(2..5).fake();
            let title = words
                .iter()
                .map(|word| capitalize(word))
                .collect::<Vec<_>>()
                .join(" ");

            BookSeed {
                title,
                author: Name().fake(),
                price: Decimal::new((499..6000).fake::<i64>(), 2),
                stock: (0..40).fake::<i32>(),
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn insert_books(db: &PgPool, books: &[BookSeed]) -> Result<Vec<BookId>, sqlx::Error> {
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(books.len());

    for chunk in books.chunks(BATCH_SIZE) {
        ids.extend(insert_books_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;
    Ok(ids)
}

async fn insert_books_chunk(
    tx: &mut Transaction<'_, Postgres>,
    books: &[BookSeed],
) -> Result<Vec<BookId>, sqlx::Error> {
    if books.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO books (title, author, price, stock) VALUES ");
    for i in 0..books.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let idx = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", idx + 1, idx + 2, idx + 3, idx + 4));
    }
    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for book in books {
        q = q
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.price)
            .bind(book.stock);
    }

    q.fetch_all(&mut **tx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_books_within_bounds() {
        let books = generate_books(50);
        assert_eq!(books.len(), 50);
        for book in &books {
            assert!(!book.title.is_empty());
            assert!(book.price >= Decimal::new(499, 2));
            assert!(book.price < Decimal::new(6000, 2));
            assert!((0..40).contains(&book.stock));
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("rust"), "Rust");
        assert_eq!(capitalize(""), "");
    }
}
