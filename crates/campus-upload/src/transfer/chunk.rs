use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::TransferError;

/// Reads a file in fixed-size chunks starting at any offset.
pub struct ChunkReader {
    file: File,
    chunk_size: usize,
    offset: u64,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading. A `chunk_size` of 0 reads the whole
    /// remainder in one chunk.
    pub async fn open(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = File::open(path).await?;
        let file_size = file.metadata().await?.len();
        Ok(Self {
            file,
            chunk_size,
            offset: 0,
            file_size,
        })
    }

    /// Seeks to the given byte offset (for resume).
    pub async fn seek_to(&mut self, offset: u64) -> Result<(), TransferError> {
        self.file.seek(SeekFrom::Start(offset)).await?;
        self.offset = offset;
        Ok(())
    }

    /// Reads the next chunk. Returns `None` at EOF.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
        let remaining = self.file_size.saturating_sub(self.offset);
        if remaining == 0 {
            return Ok(None);
        }

        let read_size = if self.chunk_size == 0 {
            remaining
        } else {
            remaining.min(self.chunk_size as u64)
        } as usize;

        let mut buf = vec![0u8; read_size];
        let mut filled = 0;
        while filled < read_size {
            let n = self.file.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        self.offset += filled as u64;
        Ok(Some(buf))
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_chunks_and_resumes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abcdefghijkl").unwrap();

        let mut reader = ChunkReader::open(tmp.path(), 5).await.unwrap();
        assert_eq!(reader.file_size(), 12);
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), b"abcde");
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), b"fghij");
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), b"kl");
        assert!(reader.next_chunk().await.unwrap().is_none());

        reader.seek_to(3).await.unwrap();
        assert_eq!(reader.offset(), 3);
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), b"defgh");
    }

    #[tokio::test]
    async fn test_zero_chunk_size_reads_remainder() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789").unwrap();

        let mut reader = ChunkReader::open(tmp.path(), 0).await.unwrap();
        reader.seek_to(4).await.unwrap();
        assert_eq!(reader.next_chunk().await.unwrap().unwrap(), b"456789");
    }
}
