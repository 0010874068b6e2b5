//! Operations on the music schema: users, artists and songs.
//!
//! Each operation is a single parameterized statement. Writes return the
//! number of rows they touched so callers can tell a miss from a hit.

use rusqlite::{params, Connection, Result};

use crate::render::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Artist,
    Song,
}

impl Entity {
    pub fn table(self) -> &'static str {
        match self {
            Entity::User => "User",
            Entity::Artist => "Artist",
            Entity::Song => "Song",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Entity::User => "UserID",
            Entity::Artist => "ArtistID",
            Entity::Song => "SongID",
        }
    }
}

pub fn view(conn: &Connection, entity: Entity) -> crate::Result<ResultTable> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", entity.table()))?;
    ResultTable::from_query(&mut stmt, [])
}

pub fn delete(conn: &Connection, entity: Entity, id: i64) -> Result<usize> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", entity.table(), entity.key());
    tracing::debug!(id, "{sql}");
    conn.execute(&sql, [id])
}

pub fn insert_user(conn: &Connection, username: &str, email: Option<&str>) -> Result<usize> {
    conn.execute(
        "INSERT INTO User (Username, Email) VALUES (?1, ?2)",
        params![username, email],
    )
}

pub fn insert_artist(conn: &Connection, name: &str, country: Option<&str>) -> Result<usize> {
    conn.execute(
        "INSERT INTO Artist (Name, Country) VALUES (?1, ?2)",
        params![name, country],
    )
}

pub fn insert_song(
    conn: &Connection,
    title: &str,
    artist_id: i64,
    duration_seconds: Option<i64>,
) -> Result<usize> {
    conn.execute(
        "INSERT INTO Song (Title, ArtistID, DurationSeconds) VALUES (?1, ?2, ?3)",
        params![title, artist_id, duration_seconds],
    )
}

pub fn update_user(
    conn: &Connection,
    id: i64,
    username: &str,
    email: Option<&str>,
) -> Result<usize> {
    conn.execute(
        "UPDATE User SET Username = ?2, Email = ?3 WHERE UserID = ?1",
        params![id, username, email],
    )
}

pub fn update_artist(
    conn: &Connection,
    id: i64,
    name: &str,
    country: Option<&str>,
) -> Result<usize> {
    conn.execute(
        "UPDATE Artist SET Name = ?2, Country = ?3 WHERE ArtistID = ?1",
        params![id, name, country],
    )
}

pub fn update_song_times_played(conn: &Connection, id: i64, times_played: i64) -> Result<usize> {
    conn.execute(
        "UPDATE Song SET TimesPlayed = ?2 WHERE SongID = ?1",
        params![id, times_played],
    )
}

pub fn song_catalog(conn: &Connection) -> crate::Result<ResultTable> {
    let mut stmt = conn.prepare("SELECT * FROM SongCatalog")?;
    ResultTable::from_query(&mut stmt, [])
}

/// SQLite has no stored procedures; this named query stands in for one.
pub fn most_played_songs(conn: &Connection, limit: i64) -> crate::Result<ResultTable> {
    let mut stmt = conn.prepare(
        "SELECT Title, Artist, TimesPlayed FROM SongCatalog \
         ORDER BY TimesPlayed DESC, SongID LIMIT ?1",
    )?;
    ResultTable::from_query(&mut stmt, [limit])
}

/// Opens an empty transaction and commits it. Dropping an uncommitted
/// transaction rolls it back.
pub fn transaction_demo(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.commit()
}
