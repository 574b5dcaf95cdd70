use crate::util::{decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, to_rfc3339};
use registrar_core::error::RegistrarError;
use registrar_core::changes::ChangeRepository;
use registrar_feed::types::{ChangeRecord, ChangeTable};
use rusqlite::Connection;
use ulid::Ulid;

pub struct ChangeRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ChangeRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> ChangeRepository for ChangeRepo<'a> {
    fn append(&self, mut change: ChangeRecord) -> Result<ChangeRecord, RegistrarError> {
        change.seq = next_seq(self.conn)?;
        change.id = format!("chg_{}", Ulid::new());
        let sql = "INSERT INTO changes (id, seq, at, correlation_id, source, tbl, op, body_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
        let params = (
            change.id.clone(),
            change.seq,
            to_rfc3339(&change.at),
            change.correlation_id.clone(),
            encode_enum(&change.source).map_err(internal)?,
            encode_enum(&change.table).map_err(internal)?,
            encode_enum(&change.op).map_err(internal)?,
            encode_json(&change.body).map_err(internal)?,
        );
        self.conn.execute(sql, params).map_err(internal)?;
        Ok(change)
    }

    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
        table: Option<ChangeTable>,
    ) -> Result<Vec<ChangeRecord>, RegistrarError> {
        let mut sql =
            String::from("SELECT id, seq, at, correlation_id, source, tbl, op, body_json FROM changes");
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        if let Some(after_seq) = after {
            params.push(after_seq.into());
            clauses.push(format!("seq > ?{}", params.len()));
        }
        if let Some(table) = table {
            params.push(encode_enum(&table).map_err(internal)?.into());
            clauses.push(format!("tbl = ?{}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            params.push(i64::from(limit).into());
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        let mut stmt = self.conn.prepare(&sql).map_err(internal)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(internal)?;
        let mut changes = Vec::new();
        while let Some(row) = rows.next().map_err(internal)? {
            changes.push(map_change_row(row)?);
        }
        Ok(changes)
    }
}

fn next_seq(conn: &Connection) -> Result<i64, RegistrarError> {
    let mut stmt = conn
        .prepare("SELECT COALESCE(MAX(seq), 0) FROM changes")
        .map_err(internal)?;
    let seq: i64 = stmt.query_row([], |row| row.get(0)).map_err(internal)?;
    Ok(seq + 1)
}

fn internal(err: impl std::fmt::Display) -> RegistrarError {
    RegistrarError::Internal {
        message: err.to_string(),
    }
}

fn map_change_row(row: &rusqlite::Row<'_>) -> Result<ChangeRecord, RegistrarError> {
    let id: String = row.get(0).map_err(internal)?;
    let seq: i64 = row.get(1).map_err(internal)?;
    let at: String = row.get(2).map_err(internal)?;
    let correlation_id: Option<String> = row.get(3).map_err(internal)?;
    let source: String = row.get(4).map_err(internal)?;
    let table: String = row.get(5).map_err(internal)?;
    let op: String = row.get(6).map_err(internal)?;
    let body_json: String = row.get(7).map_err(internal)?;

    Ok(ChangeRecord {
        id,
        seq,
        at: from_rfc3339(&at).map_err(internal)?,
        correlation_id,
        source: decode_enum(&source).map_err(internal)?,
        table: decode_enum(&table).map_err(internal)?,
        op: decode_enum(&op).map_err(internal)?,
        body: decode_json(&body_json).map_err(internal)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use chrono::Utc;
    use registrar_feed::types::{ChangeOp, ChangeSource};

    fn record(table: ChangeTable, op: ChangeOp) -> ChangeRecord {
        ChangeRecord {
            id: String::new(),
            seq: 0,
            at: Utc::now(),
            correlation_id: Some("corr_test".to_string()),
            source: ChangeSource::Api,
            table,
            op,
            body: serde_json::json!({ "id": "evt_x" }),
        }
    }

    #[test]
    fn append_assigns_monotonic_seq_and_id() {
        let conn = with_test_db().unwrap();
        let repo = ChangeRepo::new(&conn);
        let first = repo
            .append(record(ChangeTable::Events, ChangeOp::Created))
            .unwrap();
        let second = repo
            .append(record(ChangeTable::Events, ChangeOp::Updated))
            .unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert!(first.id.starts_with("chg_"));
    }

    #[test]
    fn list_filters_by_table_and_after() {
        let conn = with_test_db().unwrap();
        let repo = ChangeRepo::new(&conn);
        repo.append(record(ChangeTable::Events, ChangeOp::Created))
            .unwrap();
        repo.append(record(ChangeTable::Registrations, ChangeOp::Created))
            .unwrap();
        repo.append(record(ChangeTable::Events, ChangeOp::Deleted))
            .unwrap();

        let events_only = repo.list(None, None, Some(ChangeTable::Events)).unwrap();
        assert_eq!(events_only.len(), 2);
        assert!(events_only.iter().all(|c| c.table == ChangeTable::Events));

        let tail = repo.list(Some(2), None, None).unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].op, ChangeOp::Deleted);
    }
}
