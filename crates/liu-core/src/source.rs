//! 字节源抽象层.
//!
//! 为位流缓冲区提供统一的数据来源接口, 支持文件、内存缓冲区和
//! 任意 `io::Read` 后端. 可定位 (seekable) 的源是解封装器按时间
//! seek 和重绕 (rewind) 的前提.

use std::io::{self, Read, Seek, SeekFrom};

/// 字节源 trait
///
/// 实现此 trait 以支持不同的数据来源 (文件、内存、网络流等).
/// 不可定位的源 (如网络流) 对 `seek_start` 返回错误, 并从
/// `is_seekable` 返回 false.
pub trait ByteSource: Send {
    /// 读取数据到缓冲区, 返回实际读取的字节数 (0 表示流结束)
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// 定位到距流起点 `pos` 字节处
    fn seek_start(&mut self, pos: u64) -> io::Result<u64>;

    /// 获取当前读取位置
    fn position(&mut self) -> io::Result<u64>;

    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;

    /// 是否支持随机访问
    fn is_seekable(&self) -> bool;
}

/// 文件字节源
pub struct FileSource {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileSource {
    /// 从文件路径打开 (只读)
    pub fn open(path: impl AsRef<std::path::Path>) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata().ok().map(|m| m.len());
        Ok(Self { file, size })
    }
}

impl ByteSource for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek_start(&mut self, pos: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(pos))
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 内存字节源
///
/// 用于测试和内存中解码.
pub struct MemorySource {
    data: Vec<u8>,
    pos: usize,
}

impl MemorySource {
    /// 从已有数据创建
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 获取内部数据的引用
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let to_read = buf.len().min(available);
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn seek_start(&mut self, pos: u64) -> io::Result<u64> {
        self.pos = (pos as usize).min(self.data.len());
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 任意 `io::Read` 的适配器 (不可定位)
///
/// 适用于网络流等只进不退的数据源. 内部统计已消耗的字节数,
/// 以便缓冲区计算绝对偏移.
pub struct ReadSource<R: Read + Send> {
    reader: R,
    consumed: u64,
}

impl<R: Read + Send> ReadSource<R> {
    /// 包装一个 `io::Read`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            consumed: 0,
        }
    }
}

impl<R: Read + Send> ByteSource for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }

    fn seek_start(&mut self, _pos: u64) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "数据源不支持定位",
        ))
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.consumed)
    }

    fn size(&self) -> Option<u64> {
        None
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_read_seek() {
        let mut src = MemorySource::from_data(vec![1, 2, 3, 4, 5]);
        assert!(src.is_seekable());
        assert_eq!(src.size(), Some(5));

        let mut buf = [0u8; 3];
        assert_eq!(src.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(src.position().unwrap(), 3);

        src.seek_start(1).unwrap();
        assert_eq!(src.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [2, 3, 4]);

        // 末尾之后读取返回 0
        src.seek_start(5).unwrap();
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_source_不可定位() {
        let mut src = ReadSource::new(std::io::Cursor::new(vec![9u8; 8]));
        assert!(!src.is_seekable());
        assert_eq!(src.size(), None);

        let mut buf = [0u8; 4];
        src.read(&mut buf).unwrap();
        assert_eq!(src.position().unwrap(), 4);
        assert!(src.seek_start(0).is_err());
    }
}
