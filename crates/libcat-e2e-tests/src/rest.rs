use anyhow::{Result, anyhow};
use libcat_dal::{author::Author, book::Book, genre::Genre};
use libcat_transfer::{
    COLUMNS,
    sheet::{self, Cell},
};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

async fn create<T: DeserializeOwned>(
    client: &reqwest::Client,
    api_url: Url,
    payload: serde_json::Value,
) -> Result<T> {
    let response = client.post(api_url).json(&payload).send().await?;
    info!("Response: {:#?}", response);
    if response.status() != StatusCode::CREATED {
        return Err(anyhow!("Create failed with status {}", response.status()));
    }
    Ok(response.json().await?)
}

pub async fn create_author(
    client: &reqwest::Client,
    base_url: &Url,
    name: &str,
    surname: &str,
) -> Result<Author> {
    let payload = json!({"name": name, "surname": surname});
    create(client, base_url.join("api/author")?, payload).await
}

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<Genre> {
    let payload = json!({"name": name});
    create(client, base_url.join("api/genre")?, payload).await
}

pub async fn create_book(
    client: &reqwest::Client,
    base_url: &Url,
    title: &str,
    isbn: &str,
    author_id: Option<i64>,
    genres: &[i64],
) -> Result<Book> {
    let payload = json!({"title": title, "isbn": isbn, "author_id": author_id, "genres": genres});
    create(client, base_url.join("api/book")?, payload).await
}

/// Spreadsheet in import layout, empty strings become empty cells
pub fn catalog_sheet(rows: &[[&str; 10]]) -> Vec<u8> {
    let rows = rows.iter().map(|row| {
        row.iter()
            .map(|c| if c.is_empty() { Cell::Empty } else { Cell::text(*c) })
            .collect::<Vec<_>>()
    });
    sheet::write_sheet("Data", &COLUMNS, rows).expect("valid sheet")
}
