//! Row stream/cursor (C9) and query executor glue (C8).
//!
//! A buffered cursor: `execute` reads an entire result set's rows eagerly
//! (spec.md Non-goals rule out server-side prepared-statement pagination),
//! then `fetchone`/`fetchmany`/`fetchall` drain the buffer.

use crate::connection::{CommandResponse, Connection, MySqlStream};
use crate::error::{Error, Result};
use crate::local_infile::{LocalInfileHandler, RefusingHandler};
use crate::params::{self, Params};
use crate::protocol::{ColumnDefinition, TypeId};
use crate::value::{self, Value};

/// The PEP-249-shaped column metadata projection spec.md's distillation
/// summarized as "ColumnDefinition exposed to the cursor" (SPEC_FULL.md §4).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    pub name: Box<str>,
    pub type_id: TypeId,
    pub display_size: u32,
    pub internal_size: u32,
    pub precision: u8,
    pub scale: u8,
    pub null_ok: bool,
}

fn describe(column: &ColumnDefinition) -> ColumnDescription {
    ColumnDescription {
        name: column.name().into(),
        type_id: column.type_id,
        display_size: column.column_length,
        internal_size: column.column_length,
        precision: column.column_length.min(u8::MAX as u32) as u8,
        scale: column.decimals,
        null_ok: !column.flags.contains(crate::protocol::FieldFlags::NOT_NULL),
    }
}

/// A statement executor and row stream over a single [`Connection`]
/// borrow. Only one `Cursor` may be alive per connection at a time; the
/// borrow checker enforces that statically (SPEC_FULL.md §5).
pub struct Cursor<'c, S> {
    connection: &'c mut Connection<S>,
    columns: Vec<ColumnDefinition>,
    description: Option<Vec<ColumnDescription>>,
    rows: std::vec::IntoIter<Vec<u8>>,
    rowcount: i64,
    last_insert_id: u64,
    last_executed: Option<Box<str>>,
}

impl<'c, S> Cursor<'c, S>
where
    S: MySqlStream,
{
    pub fn new(connection: &'c mut Connection<S>) -> Self {
        Cursor {
            connection,
            columns: Vec::new(),
            description: None,
            rows: Vec::new().into_iter(),
            // spec.md §8 invariant / SPEC_FULL.md §4: -1 until a command runs.
            rowcount: -1,
            last_insert_id: 0,
            last_executed: None,
        }
    }

    pub fn description(&self) -> Option<&[ColumnDescription]> {
        self.description.as_deref()
    }

    pub fn rowcount(&self) -> i64 {
        self.rowcount
    }

    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    pub fn last_executed(&self) -> Option<&str> {
        self.last_executed.as_deref()
    }

    /// Render `params` into `sql` and run it, rejecting a server
    /// `LOAD DATA LOCAL INFILE` request (use [`Cursor::execute_with_local_infile`]
    /// to honor one).
    pub async fn execute(&mut self, sql: &str, params: &Params) -> Result<u64> {
        self.execute_with_local_infile(sql, params, &RefusingHandler).await
    }

    pub async fn execute_with_local_infile(
        &mut self,
        sql: &str,
        params: &Params,
        local_infile: &dyn LocalInfileHandler,
    ) -> Result<u64> {
        let rendered = params::format(sql.as_bytes(), params, &self.connection.charset)?;
        self.run(&rendered, local_infile).await
    }

    /// Run `sql` once per row of `rows`, splicing into a single bulk
    /// `INSERT ... VALUES (...)[, (...)]` statement when it matches that
    /// shape and falling back to one execution per row otherwise (spec.md
    /// §4.3/§9). An empty `rows` is a no-op returning `0`
    /// (SPEC_FULL.md §4 supplement).
    pub async fn executemany(&mut self, sql: &str, rows: &[Params]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let charset = self.connection.charset.clone();
        let max_allowed_packet = self.connection.max_allowed_packet;

        if let Some((prefix, template, suffix)) = params::split_insert_values(sql) {
            let statements =
                params::render_bulk_insert(&prefix, &template, &suffix, rows, &charset, max_allowed_packet)?;
            let mut total = 0u64;
            for statement in statements {
                total += self.run(&statement, &RefusingHandler).await?;
            }
            return Ok(total);
        }

        let mut total = 0u64;
        for row in rows {
            total += self.execute(sql, row).await?;
        }
        Ok(total)
    }

    async fn run(&mut self, sql: &[u8], local_infile: &dyn LocalInfileHandler) -> Result<u64> {
        self.last_executed = Some(String::from_utf8_lossy(sql).into_owned().into_boxed_str());
        self.description = None;
        self.columns.clear();
        self.rows = Vec::new().into_iter();

        match self.connection.query(sql).await? {
            CommandResponse::Ok(ok) => {
                self.rowcount = ok.affected_rows as i64;
                self.last_insert_id = ok.last_insert_id;
                Ok(ok.affected_rows)
            }
            CommandResponse::ResultSet { columns } => {
                self.description = Some(columns.iter().map(describe).collect());
                self.columns = columns;

                let mut rows = Vec::new();
                while let Some(row) = self.connection.read_row().await? {
                    rows.push(row);
                }
                self.rowcount = rows.len() as i64;
                self.rows = rows.into_iter();
                Ok(self.rowcount as u64)
            }
            CommandResponse::LocalInfile { filename } => {
                if self.connection.local_infile_enabled() {
                    crate::local_infile::send_local_infile(
                        self.connection.framer_mut(),
                        local_infile,
                        &filename,
                    )
                    .await?;
                } else {
                    crate::local_infile::send_local_infile(
                        self.connection.framer_mut(),
                        &RefusingHandler,
                        &filename,
                    )
                    .await?;
                }
                let ok = self.connection.finish_local_infile().await?;
                self.rowcount = ok.affected_rows as i64;
                self.last_insert_id = ok.last_insert_id;
                Ok(ok.affected_rows)
            }
        }
    }

    /// Advance to the next result set of a multi-statement command
    /// (spec.md §4.8). Returns `false` once there are none left; the
    /// current description/rows are replaced when it returns `true`.
    pub async fn nextset(&mut self) -> Result<bool> {
        if !self.rows.as_slice().is_empty() {
            return Err(Error::interface(
                "nextset() called with unread rows still pending in the current result set",
            ));
        }

        match self.connection.next_result().await? {
            None => Ok(false),
            Some(CommandResponse::Ok(ok)) => {
                self.description = None;
                self.columns.clear();
                self.rows = Vec::new().into_iter();
                self.rowcount = ok.affected_rows as i64;
                self.last_insert_id = ok.last_insert_id;
                Ok(true)
            }
            Some(CommandResponse::ResultSet { columns }) => {
                self.description = Some(columns.iter().map(describe).collect());
                self.columns = columns;
                let mut rows = Vec::new();
                while let Some(row) = self.connection.read_row().await? {
                    rows.push(row);
                }
                self.rowcount = rows.len() as i64;
                self.rows = rows.into_iter();
                Ok(true)
            }
            Some(CommandResponse::LocalInfile { filename }) => {
                crate::local_infile::send_local_infile(
                    self.connection.framer_mut(),
                    &RefusingHandler,
                    &filename,
                )
                .await?;
                self.connection.finish_local_infile().await?;
                Ok(true)
            }
        }
    }

    fn decode_row(&self, raw: &[u8]) -> Result<Vec<Value>> {
        let fields = crate::protocol::decode_text_row(raw, self.columns.len())?;
        fields
            .into_iter()
            .zip(self.columns.iter())
            .map(|(field, column)| value::decode_text(field, column))
            .collect()
    }

    pub fn fetchone(&mut self) -> Result<Option<Vec<Value>>> {
        match self.rows.next() {
            Some(raw) => self.decode_row(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn fetchmany(&mut self, size: usize) -> Result<Vec<Vec<Value>>> {
        let mut out = Vec::with_capacity(size);
        for _ in 0..size {
            match self.fetchone()? {
                Some(row) => out.push(row),
                None => break,
            }
        }
        Ok(out)
    }

    pub fn fetchall(&mut self) -> Result<Vec<Vec<Value>>> {
        let mut out = Vec::new();
        while let Some(row) = self.fetchone()? {
            out.push(row);
        }
        Ok(out)
    }

    /// Close the cursor, discarding any unread rows of the current result
    /// set without requiring the caller to fetch them first.
    pub fn close(mut self) {
        self.rows = Vec::new().into_iter();
    }
}
