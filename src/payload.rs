//! CSV payload encoding.
//!
//! Records are comma separated and terminated by CRLF. Fields are quoted only
//! when they contain a delimiter, a quote or a line break.

use bytes::Bytes;

use crate::drive::{DriveResult, Error};

/// Encodes string rows as CSV bytes. Every row must have the same number of fields.
pub fn encode<I, R, F>(rows: I) -> DriveResult<Bytes>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row)
            .map_err(Error::PayloadEncodingError)?;
    }

    writer
        .into_inner()
        .map(Bytes::from)
        .map_err(|err| Error::PayloadEncodingError(csv::Error::from(err.into_error())))
}
