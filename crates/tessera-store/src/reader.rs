//! Typed content readers
//!
//! `ObjectStore::open` wraps a payload in the reader its file type
//! calls for: record-batch file, record-batch stream, or raw bytes.

use std::io::{Cursor, Read};

use arrow::datatypes::SchemaRef;
use arrow::ipc::reader::{FileReader, StreamReader};
use arrow::record_batch::RecordBatch;

use tessera_errors::{Result, TessError};

/// Reader over a fetched payload
#[derive(Debug)]
pub enum ContentReader {
    /// Arrow record-batch file (type 5); batch count known up front
    ArrowFile(FileReader<Cursor<Vec<u8>>>),
    /// Arrow record-batch stream (type 6)
    ArrowStream(StreamReader<Cursor<Vec<u8>>>),
    /// Anything else: raw bytes
    Raw(Cursor<Vec<u8>>),
}

impl ContentReader {
    pub(crate) fn arrow_file(id: &str, bytes: Vec<u8>) -> Result<Self> {
        let reader = FileReader::try_new(Cursor::new(bytes), None).map_err(|e| {
            TessError::Decode {
                subject: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(ContentReader::ArrowFile(reader))
    }

    pub(crate) fn arrow_stream(id: &str, bytes: Vec<u8>) -> Result<Self> {
        let reader = StreamReader::try_new(Cursor::new(bytes), None).map_err(|e| {
            TessError::Decode {
                subject: id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(ContentReader::ArrowStream(reader))
    }

    /// Number of record batches, known only for the file format
    pub fn num_record_batches(&self) -> Option<usize> {
        match self {
            ContentReader::ArrowFile(reader) => Some(reader.num_batches()),
            _ => None,
        }
    }

    /// Schema of the tabular payload, if there is one
    pub fn schema(&self) -> Option<SchemaRef> {
        match self {
            ContentReader::ArrowFile(reader) => Some(reader.schema()),
            ContentReader::ArrowStream(reader) => Some(reader.schema()),
            ContentReader::Raw(_) => None,
        }
    }

    /// Pull the next record batch; `None` once exhausted or for raw payloads
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        let next = match self {
            ContentReader::ArrowFile(reader) => reader.next(),
            ContentReader::ArrowStream(reader) => reader.next(),
            ContentReader::Raw(_) => return Ok(None),
        };
        next.transpose().map_err(|e| TessError::Decode {
            subject: "record batch".into(),
            reason: e.to_string(),
        })
    }

    /// Drain the payload as raw bytes
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            ContentReader::Raw(mut cursor) => {
                let mut out = Vec::new();
                cursor
                    .read_to_end(&mut out)
                    .map_err(|e| tessera_errors::io_error("read_raw", "<payload>", e))?;
                Ok(out)
            }
            _ => Err(TessError::Decode {
                subject: "payload".into(),
                reason: "record-batch payloads are read by batch, not by byte".into(),
            }),
        }
    }
}
