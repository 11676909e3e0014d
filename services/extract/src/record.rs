//! TFRecord container reader.
//!
//! A shard is a flat sequence of records, each framed as:
//!
//! ```text
//! u64 length (LE) | u32 masked crc32c(length) | data[length] | u32 masked crc32c(data)
//! ```

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::path::Path;
use thiserror::Error;

const MASK_DELTA: u32 = 0xa282_ead8;

/// Errors that can occur while reading a record stream.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error reading record: {0}")]
    Io(#[from] io::Error),

    #[error("Truncated record {index}: expected {expected} bytes of {section}")]
    Truncated {
        index: u64,
        section: &'static str,
        expected: usize,
    },

    #[error("Checksum mismatch in {section} of record {index}")]
    ChecksumMismatch { index: u64, section: &'static str },

    #[error("Record {index} length {length} exceeds addressable memory")]
    TooLarge { index: u64, length: u64 },
}

/// Masked CRC32C as used by the TFRecord format.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// Lazy reader over the records of one container file.
///
/// Records are yielded in on-disk order. Reading restarts only by opening
/// the file again.
pub struct RecordReader<R> {
    inner: R,
    verify_checksums: bool,
    index: u64,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a shard file for reading.
    pub fn open(path: impl AsRef<Path>, verify_checksums: bool) -> Result<Self, RecordError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), verify_checksums))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R, verify_checksums: bool) -> Self {
        Self {
            inner,
            verify_checksums,
            index: 0,
            done: false,
        }
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.index
    }

    fn read_record(&mut self) -> Result<Option<Vec<u8>>, RecordError> {
        let mut header = [0u8; 12];
        match read_full(&mut self.inner, &mut header)? {
            0 => return Ok(None),
            n if n < header.len() => {
                return Err(RecordError::Truncated {
                    index: self.index,
                    section: "header",
                    expected: header.len(),
                })
            }
            _ => {}
        }

        let (length_bytes, length_crc) = header.split_at(8);
        if self.verify_checksums && masked_crc32c(length_bytes) != le_u32(length_crc) {
            return Err(RecordError::ChecksumMismatch {
                index: self.index,
                section: "length",
            });
        }

        let length = u64::from_le_bytes(length_bytes.try_into().unwrap_or_default());
        let length = usize::try_from(length).map_err(|_| RecordError::TooLarge {
            index: self.index,
            length,
        })?;

        // Body is read through `take` so a corrupt length cannot force a huge allocation.
        let mut data = Vec::new();
        let read = (&mut self.inner).take(length as u64).read_to_end(&mut data)?;
        if read < length {
            return Err(RecordError::Truncated {
                index: self.index,
                section: "data",
                expected: length,
            });
        }

        let mut footer = [0u8; 4];
        if read_full(&mut self.inner, &mut footer)? < footer.len() {
            return Err(RecordError::Truncated {
                index: self.index,
                section: "data checksum",
                expected: footer.len(),
            });
        }
        if self.verify_checksums && masked_crc32c(&data) != u32::from_le_bytes(footer) {
            return Err(RecordError::ChecksumMismatch {
                index: self.index,
                section: "data",
            });
        }

        self.index += 1;
        Ok(Some(data))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Append one framed record to `out`.
pub fn write_record<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    let length = (data.len() as u64).to_le_bytes();
    out.write_all(&length)?;
    out.write_all(&masked_crc32c(&length).to_le_bytes())?;
    out.write_all(data)?;
    out.write_all(&masked_crc32c(data).to_le_bytes())?;
    Ok(())
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes.try_into().unwrap_or_default())
}

/// Fill `buf` as far as the reader allows; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(records: &[&[u8]]) -> Vec<u8> {
        let mut buf = Vec::new();
        for record in records {
            write_record(&mut buf, record).unwrap();
        }
        buf
    }

    #[test]
    fn test_masked_crc_known_value() {
        // crc32c("123456789") = 0xe3069283
        let crc: u32 = 0xe306_9283;
        let expected = ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA);
        assert_eq!(masked_crc32c(b"123456789"), expected);
    }

    #[test]
    fn test_reads_records_in_order() {
        let buf = encode(&[b"first", b"", b"third record"]);
        let records: Vec<_> = RecordReader::new(Cursor::new(buf), true)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            records,
            vec![b"first".to_vec(), Vec::new(), b"third record".to_vec()]
        );
    }

    #[test]
    fn test_empty_stream_has_no_records() {
        let mut reader = RecordReader::new(Cursor::new(Vec::new()), true);
        assert!(reader.next().is_none());
        assert_eq!(reader.records_read(), 0);
    }

    #[test]
    fn test_truncated_header() {
        let mut buf = encode(&[b"abc"]);
        buf.extend_from_slice(&[1, 2, 3]);

        let mut reader = RecordReader::new(Cursor::new(buf), true);
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next(),
            Some(Err(RecordError::Truncated { index: 1, section: "header", .. }))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_data() {
        let mut buf = encode(&[b"abcdef"]);
        buf.truncate(buf.len() - 6);

        let mut reader = RecordReader::new(Cursor::new(buf), false);
        assert!(matches!(
            reader.next(),
            Some(Err(RecordError::Truncated { section: "data", .. }))
        ));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut buf = encode(&[b"payload"]);
        let data_start = 12;
        buf[data_start] ^= 0xff;

        let mut strict = RecordReader::new(Cursor::new(buf.clone()), true);
        assert!(matches!(
            strict.next(),
            Some(Err(RecordError::ChecksumMismatch { index: 0, section: "data" }))
        ));

        let mut lenient = RecordReader::new(Cursor::new(buf), false);
        assert!(lenient.next().unwrap().is_ok());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecordReader::open(dir.path().join("missing.tfrecord"), true);
        assert!(matches!(result, Err(RecordError::Io(_))));
    }
}
