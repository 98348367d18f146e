use crate::{
    error::{ConnectorError, DbError},
    postgres::{
        encoder::{CopyValueEncoder, PgCopyTextEncoder},
        params::PgParamStore,
        row::to_row,
        utils::connect_client,
    },
};
use bytes::Bytes;
use futures_util::{SinkExt, pin_mut};
use model::{core::value::Value, records::row::Row};
use tokio_postgres::{Client, Transaction};
use tracing::debug;

/// Thin wrapper over one `tokio_postgres` connection. The loader is a
/// single-threaded sequence of transactions, so the adapter owns the
/// client outright and hands out transactions through `&mut self`.
pub struct PgAdapter {
    client: Client,
}

impl PgAdapter {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(PgAdapter { client })
    }

    pub fn new(client: Client) -> Self {
        PgAdapter { client }
    }

    pub async fn transaction(&mut self) -> Result<Transaction<'_>, DbError> {
        Ok(self.client.transaction().await?)
    }

    pub async fn exec(&self, query: &str) -> Result<(), DbError> {
        self.client.batch_execute(query).await?;
        Ok(())
    }

    pub async fn exec_params(&self, query: &str, params: Vec<Value>) -> Result<u64, DbError> {
        let bindings = PgParamStore::from_values(params);
        Ok(self.client.execute(query, &bindings.as_refs()).await?)
    }

    pub async fn query_opt(
        &self,
        query: &str,
        params: Vec<Value>,
    ) -> Result<Option<tokio_postgres::Row>, DbError> {
        let bindings = PgParamStore::from_values(params);
        Ok(self.client.query_opt(query, &bindings.as_refs()).await?)
    }

    pub async fn query_rows(&self, query: &str, params: Vec<Value>) -> Result<Vec<Row>, DbError> {
        let bindings = PgParamStore::from_values(params);
        let rows = self.client.query(query, &bindings.as_refs()).await?;
        rows.iter().map(|row| to_row("", row)).collect()
    }
}

pub async fn exec_tx(tx: &Transaction<'_>, query: &str) -> Result<(), DbError> {
    tx.batch_execute(query).await?;
    Ok(())
}

pub async fn exec_params_tx(
    tx: &Transaction<'_>,
    query: &str,
    params: Vec<Value>,
) -> Result<u64, DbError> {
    let bindings = PgParamStore::from_values(params);
    Ok(tx.execute(query, &bindings.as_refs()).await?)
}

/// Streams a batch into `statement`'s target through the COPY protocol,
/// one TEXT-format line per row. `columns` fixes both the projection and
/// the field order; values are encoded (and strings NUL-stripped) by the
/// TEXT encoder.
pub async fn copy_rows(
    tx: &Transaction<'_>,
    statement: &str,
    columns: &[String],
    rows: &[Row],
) -> Result<(), DbError> {
    if rows.is_empty() {
        return Ok(());
    }

    let encoder = PgCopyTextEncoder::new();
    debug!("COPY statement: {}", statement);

    let sink = tx.copy_in(statement).await?;
    pin_mut!(sink);

    for row in rows {
        let mut line = String::new();
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            line.push_str(&encoder.encode_value(&row.value(column)));
        }
        line.push('\n');
        sink.as_mut().send(Bytes::from(line)).await?;
    }

    let copied = sink.as_mut().finish().await?;
    debug!("COPY loaded {} rows", copied);
    Ok(())
}
