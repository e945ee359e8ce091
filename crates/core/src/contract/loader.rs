//! CSV loader for contract batches.
//!
//! The input must have a header row containing `encode` (the contract
//! address) and `origin_key` columns. Column names are matched after trimming
//! and lowercasing; other columns are ignored.

use csv_async::{AsyncReaderBuilder, StringRecord};
use thiserror::Error;
use tokio::io::AsyncRead;
use tracing::debug;

use super::ContractRecord;

const ADDRESS_COLUMN: &str = "encode";
const ORIGIN_COLUMN: &str = "origin_key";

/// Errors produced while reading an input table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read CSV header: {0}")]
    Header(String),

    #[error(
        "CSV must contain 'encode' and 'origin_key' columns. Found indices: encode={encode:?}, origin_key={origin_key:?}"
    )]
    MissingColumns {
        encode: Option<usize>,
        origin_key: Option<usize>,
    },

    #[error("invalid record at line {line}: {fields:?}")]
    InvalidRow { line: usize, fields: Vec<String> },

    #[error("failed to read CSV at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv_async::Error,
    },
}

/// Read every row of `reader` into an unenriched [`ContractRecord`].
pub async fn load_records<R>(reader: R) -> Result<Vec<ContractRecord>, LoadError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut rdr = AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .create_reader(reader);

    let headers = rdr
        .headers()
        .await
        .map_err(|e| LoadError::Header(e.to_string()))?
        .clone();
    debug!("CSV headers: {:?}", headers);

    let (address_idx, origin_idx) = find_columns(&headers)?;

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    // Line 1 is the header.
    let mut line = 1;
    loop {
        line += 1;
        let more = rdr
            .read_record(&mut row)
            .await
            .map_err(|source| LoadError::Csv { line, source })?;
        if !more {
            break;
        }

        let (Some(address), Some(origin_key)) = (row.get(address_idx), row.get(origin_idx)) else {
            return Err(LoadError::InvalidRow {
                line,
                fields: row.iter().map(str::to_string).collect(),
            });
        };

        records.push(ContractRecord::new(normalize_address(address), origin_key));
    }

    Ok(records)
}

fn find_columns(headers: &StringRecord) -> Result<(usize, usize), LoadError> {
    let mut encode = None;
    let mut origin_key = None;
    for (idx, column) in headers.iter().enumerate() {
        match column.trim().to_lowercase().as_str() {
            ADDRESS_COLUMN => encode = Some(idx),
            ORIGIN_COLUMN => origin_key = Some(idx),
            _ => {}
        }
    }

    match (encode, origin_key) {
        (Some(e), Some(o)) => Ok((e, o)),
        _ => Err(LoadError::MissingColumns { encode, origin_key }),
    }
}

fn normalize_address(raw: &str) -> String {
    if raw.starts_with("0x") {
        raw.to_string()
    } else {
        format!("0x{}", raw)
    }
}
