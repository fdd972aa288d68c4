use rusqlite::{params, Connection, OptionalExtension};

// ── Local storage ──

pub fn get_item(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM local_storage WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO local_storage (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_missing_item_is_none() {
        let conn = db::init_db(":memory:").unwrap();
        assert_eq!(get_item(&conn, "studioBookings").unwrap(), None);
    }

    #[test]
    fn test_set_item_overwrites() {
        let conn = db::init_db(":memory:").unwrap();
        set_item(&conn, "k", "first").unwrap();
        set_item(&conn, "k", "second").unwrap();
        assert_eq!(get_item(&conn, "k").unwrap().as_deref(), Some("second"));
    }
}
