//! Small in-memory catalogs shared by the tests in this crate.

use gutendex_catalog::{BookId, CatalogEntry, Database, FormatEntry, PersonEntry, Repository};

pub(crate) const ALL_IDS: &[BookId] = &[84, 158, 1342, 2701, 9999, 17489];
pub(crate) const FRANKENSTEIN_TXT_OLD: &str = "https://www.gutenberg.org/files/84/84.txt";
pub(crate) const FRANKENSTEIN_TXT_NEW: &str = "https://www.gutenberg.org/ebooks/84.txt.utf-8";

fn book(id: BookId, downloads: u64, title: Option<&str>) -> CatalogEntry {
    CatalogEntry {
        id: Some(id),
        gutenberg_id: id,
        download_count: Some(downloads),
        media_type: "Text".to_string(),
        title: title.map(str::to_string),
        ..CatalogEntry::default()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Six books with a spread of relations:
///
/// | id    | downloads | author   | lang | topic hits for "fiction" |
/// |-------|-----------|----------|------|--------------------------|
/// | 84    | 51 000    | Shelley  | en   | bookshelf                |
/// | 1342  | 48 000    | Austen   | en   | subject                  |
/// | 2701  | 30 000    | Melville | en   | subject                  |
/// | 158   | 9 000     | Austen   | en   | -                        |
/// | 9999  | 900       | -        | -    | -                        |
/// | 17489 | 900       | Hugo     | fr   | -                        |
pub(crate) fn entries() -> Vec<CatalogEntry> {
    let austen = PersonEntry::new("Austen, Jane", Some(1775), Some(1817));
    vec![
        CatalogEntry {
            authors: vec![austen.clone()],
            languages: strings(&["en"]),
            subjects: strings(&["Courtship -- Fiction", "England -- Social life and customs"]),
            bookshelves: strings(&["Best Books Ever Listings"]),
            formats: vec![
                FormatEntry::new("text/plain", "https://www.gutenberg.org/ebooks/1342.txt.utf-8"),
                FormatEntry::new("text/html", "https://www.gutenberg.org/ebooks/1342.html.images"),
            ],
            ..book(1342, 48_000, Some("Pride and Prejudice"))
        },
        CatalogEntry {
            authors: vec![austen],
            languages: strings(&["en"]),
            subjects: strings(&["Young women -- Drama"]),
            bookshelves: strings(&["Harvard Classics"]),
            formats: vec![FormatEntry::new("application/epub+zip", "https://www.gutenberg.org/ebooks/158.epub3.images")],
            ..book(158, 9_000, Some("Emma"))
        },
        CatalogEntry {
            authors: vec![PersonEntry::new("Shelley, Mary Wollstonecraft", Some(1797), Some(1851))],
            languages: strings(&["en"]),
            subjects: strings(&["Monsters -- Drama"]),
            bookshelves: strings(&["Gothic Fiction", "Movie Books"]),
            formats: vec![
                FormatEntry::new("text/plain", FRANKENSTEIN_TXT_OLD),
                FormatEntry::new("image/jpeg", "https://www.gutenberg.org/cache/epub/84/pg84.cover.medium.jpg"),
                FormatEntry::new("text/plain", FRANKENSTEIN_TXT_NEW),
            ],
            ..book(84, 51_000, Some("Frankenstein; Or, The Modern Prometheus"))
        },
        CatalogEntry {
            authors: vec![PersonEntry::new("Melville, Herman", Some(1819), Some(1891))],
            languages: strings(&["en"]),
            subjects: strings(&["Whaling -- Fiction"]),
            formats: vec![FormatEntry::new("text/html", "https://www.gutenberg.org/ebooks/2701.html.images")],
            ..book(2701, 30_000, Some("Moby Dick; Or, The Whale"))
        },
        CatalogEntry {
            authors: vec![PersonEntry::new("Hugo, Victor", Some(1802), Some(1885))],
            languages: strings(&["fr"]),
            subjects: strings(&["Revolutions -- France"]),
            formats: vec![FormatEntry::new("text/plain", "https://www.gutenberg.org/ebooks/17489.txt.utf-8")],
            ..book(17489, 900, Some("Les Misérables, Tome I"))
        },
        book(9999, 900, None),
    ]
}

pub(crate) async fn library() -> (Database, Repository) {
    seeded(&entries()).await
}

/// `count` bare books whose popularity repeats every seven ids, so that the
/// ordering has to fall back to ids for ties.
pub(crate) async fn shelf_of(count: i64) -> (Database, Repository) {
    let entries = (1..=count)
        .map(|id| CatalogEntry {
            languages: strings(&["en"]),
            ..book(id, u64::try_from(id % 7).unwrap() * 100, Some(&format!("Volume {id}")))
        })
        .collect::<Vec<_>>();
    seeded(&entries).await
}

pub(crate) async fn seeded(entries: &[CatalogEntry]) -> (Database, Repository) {
    let db = Database::connect_in_memory().await.unwrap();
    let repo = Repository::from(&db);
    repo.import(entries).await.unwrap();
    (db, repo)
}
