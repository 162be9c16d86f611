//! Live SQL Server introspection over a caller-supplied Tiberius client.
//!
//! Each trait method issues exactly one query, so a timeout the caller places
//! on the connection bounds every call.

use async_trait::async_trait;
use tiberius::{Client, Query};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::Compat;
use tracing::debug;

use crate::core::schema::{Column, ForeignKey, PrimaryKey, Table, TriggerHeader};
use crate::core::traits::Introspector;
use crate::error::Result;

/// Tiberius client type used by the introspector.
pub type MssqlClient = Client<Compat<TcpStream>>;

/// SQL Server schema reader.
///
/// The client is owned for the duration of the run and used strictly in
/// sequence; the mutex only satisfies `&self` trait methods.
pub struct MssqlIntrospector {
    client: Mutex<MssqlClient>,
}

impl MssqlIntrospector {
    /// Wrap an already connected client.
    pub fn new(client: MssqlClient) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Give the client back to the caller.
    pub fn into_inner(self) -> MssqlClient {
        self.client.into_inner()
    }
}

#[async_trait]
impl Introspector for MssqlIntrospector {
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<Table>> {
        let query = r#"
            SELECT
                c.TABLE_SCHEMA,
                c.TABLE_NAME,
                c.COLUMN_NAME,
                c.DATA_TYPE,
                CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END,
                pk.CONSTRAINT_NAME,
                CAST(ISNULL(pk.ORDINAL_POSITION, 0) AS INT)
            FROM INFORMATION_SCHEMA.COLUMNS c
            JOIN INFORMATION_SCHEMA.TABLES t
                ON t.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND t.TABLE_NAME = c.TABLE_NAME
                AND t.TABLE_TYPE = 'BASE TABLE'
            LEFT JOIN (
                SELECT kcu.TABLE_SCHEMA, kcu.TABLE_NAME, kcu.COLUMN_NAME,
                       kcu.ORDINAL_POSITION, tc.CONSTRAINT_NAME
                FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
                JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
                    ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
                    AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA
                    AND kcu.TABLE_NAME = tc.TABLE_NAME
                WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
            ) pk
                ON pk.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND pk.TABLE_NAME = c.TABLE_NAME
                AND pk.COLUMN_NAME = c.COLUMN_NAME
            WHERE c.TABLE_SCHEMA = COALESCE(@P1, SCHEMA_NAME())
            ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION
        "#;

        let mut q = Query::new(query);
        q.bind(schema);

        let mut client = self.client.lock().await;
        let stream = q.query(&mut *client).await?;
        let rows = stream.into_first_result().await?;

        let mut tables: Vec<Table> = Vec::new();
        let mut pk_columns: Vec<Vec<(i32, String)>> = Vec::new();

        for row in rows {
            let table_schema = row.get::<&str, _>(0).unwrap_or_default();
            let table_name = row.get::<&str, _>(1).unwrap_or_default();

            let is_new = tables
                .last()
                .map_or(true, |t: &Table| t.name != table_name || t.schema != table_schema);
            if is_new {
                tables.push(Table::new(table_schema, table_name));
                pk_columns.push(Vec::new());
            }
            let idx = tables.len() - 1;

            let column = Column {
                name: row.get::<&str, _>(2).unwrap_or_default().to_string(),
                data_type: row.get::<&str, _>(3).unwrap_or_default().to_string(),
                is_nullable: row.get::<i32, _>(4).unwrap_or(0) == 1,
            };

            if let Some(pk_name) = row.get::<&str, _>(5) {
                let ordinal = row.get::<i32, _>(6).unwrap_or(0);
                pk_columns[idx].push((ordinal, column.name.clone()));
                if tables[idx].primary_key.is_none() {
                    tables[idx].primary_key = Some(PrimaryKey {
                        name: pk_name.to_string(),
                        columns: Vec::new(),
                    });
                }
            }

            tables[idx].columns.push(column);
        }

        for (table, mut keyed) in tables.iter_mut().zip(pk_columns) {
            keyed.sort_by_key(|(ordinal, _)| *ordinal);
            if let Some(pk) = table.primary_key.as_mut() {
                pk.columns = keyed.into_iter().map(|(_, name)| name).collect();
            }
        }

        debug!("Loaded {} tables from MSSQL", tables.len());
        Ok(tables)
    }

    async fn foreign_keys(&self, table: &Table) -> Result<Vec<ForeignKey>> {
        let query = r#"
            SELECT
                fk.name AS fk_name,
                STUFF((
                    SELECT ',' + pc2.name
                    FROM sys.foreign_key_columns fkc2
                    JOIN sys.columns pc2 ON fkc2.parent_object_id = pc2.object_id AND fkc2.parent_column_id = pc2.column_id
                    WHERE fkc2.constraint_object_id = fk.object_id
                    ORDER BY fkc2.constraint_column_id
                    FOR XML PATH('')
                ), 1, 1, '') AS parent_columns,
                rt.name AS ref_table,
                STUFF((
                    SELECT ',' + rc2.name
                    FROM sys.foreign_key_columns fkc2
                    JOIN sys.columns rc2 ON fkc2.referenced_object_id = rc2.object_id AND fkc2.referenced_column_id = rc2.column_id
                    WHERE fkc2.constraint_object_id = fk.object_id
                    ORDER BY fkc2.constraint_column_id
                    FOR XML PATH('')
                ), 1, 1, '') AS ref_columns
            FROM sys.foreign_keys fk
            JOIN sys.tables pt ON fk.parent_object_id = pt.object_id
            JOIN sys.schemas ps ON pt.schema_id = ps.schema_id
            JOIN sys.tables rt ON fk.referenced_object_id = rt.object_id
            WHERE ps.name = @P1 AND pt.name = @P2
            ORDER BY fk.name
        "#;

        let mut q = Query::new(query);
        q.bind(table.schema.as_str());
        q.bind(table.name.as_str());

        let mut client = self.client.lock().await;
        let stream = q.query(&mut *client).await?;
        let rows = stream.into_first_result().await?;

        let foreign_keys: Vec<ForeignKey> = rows
            .iter()
            .map(|row| ForeignKey {
                name: row.get::<&str, _>(0).unwrap_or_default().to_string(),
                owning_table: table.name.clone(),
                owning_columns: split_columns(row.get::<&str, _>(1).unwrap_or_default()),
                referenced_table: row.get::<&str, _>(2).unwrap_or_default().to_string(),
                referenced_columns: split_columns(row.get::<&str, _>(3).unwrap_or_default()),
            })
            .collect();

        debug!(
            "Loaded {} foreign keys for {}",
            foreign_keys.len(),
            table.full_name()
        );
        Ok(foreign_keys)
    }

    async fn list_triggers(&self) -> Result<Vec<TriggerHeader>> {
        let query = "select name as 'Trigger', object_name(parent_obj) as 'Table' \
                     from sysobjects where xtype = 'TR' order by name";

        let mut client = self.client.lock().await;
        let stream = client.simple_query(query).await?;
        let rows = stream.into_first_result().await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = row.get::<&str, _>(0)?;
                let table = row.get::<&str, _>(1)?;
                Some(TriggerHeader {
                    name: name.to_string(),
                    table: table.to_string(),
                })
            })
            .collect())
    }

    async fn trigger_text_lines(&self, trigger_name: &str) -> Result<Vec<String>> {
        let mut q = Query::new("EXEC sp_helptext @objname = @P1");
        q.bind(trigger_name);

        let mut client = self.client.lock().await;
        let stream = q.query(&mut *client).await?;
        let rows = stream.into_first_result().await?;

        Ok(rows
            .iter()
            .map(|row| row.get::<&str, _>(0).unwrap_or_default().to_string())
            .collect())
    }
}

fn split_columns(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
