//! 素材编码：图片内联为 base64 + md5，文件和语音通过上传换取 media_id。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::RobotError;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// 读取文件时的分块大小
pub const CHUNK_SIZE: usize = 4096;

/// 图片消息体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineMedia {
    pub base64: String,
    pub md5: String,
}

/// 分块计算 md5，返回小写十六进制
pub fn hash_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// 文件内容的 md5
pub fn hash_content(path: impl AsRef<Path>) -> Result<String, RobotError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RobotError::io(path, e))?;
    hash_reader(file, CHUNK_SIZE).map_err(|e| RobotError::io(path, e))
}

/// 编码已读入内存的图片
pub fn encode_bytes(data: &[u8]) -> InlineMedia {
    InlineMedia {
        base64: STANDARD.encode(data),
        md5: format!("{:x}", Md5::digest(data)),
    }
}

/// 读取整个文件并编码为图片消息体。不做大小检查，图片上限 (2M) 由调用方保证。
pub fn encode_inline(path: impl AsRef<Path>) -> Result<InlineMedia, RobotError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| RobotError::io(path, e))?;
    Ok(encode_bytes(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_hash_content_known_digest() {
        let file = fixture(b"hello world");
        assert_eq!(
            hash_content(file.path()).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
        assert_eq!(
            hash_content(file.path()).unwrap(),
            hash_content(file.path()).unwrap()
        );
    }

    #[test]
    fn test_hash_is_chunk_size_invariant() {
        let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let whole = hash_reader(content.as_slice(), content.len()).unwrap();
        for chunk_size in [1, 7, 4096, 65536] {
            assert_eq!(hash_reader(content.as_slice(), chunk_size).unwrap(), whole);
        }
        assert_eq!(hash_content(fixture(&content).path()).unwrap(), whole);
    }

    #[test]
    fn test_hash_empty_file() {
        let file = fixture(b"");
        assert_eq!(
            hash_content(file.path()).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_encode_inline_round_trip() {
        let file = fixture(b"\x89PNG\r\n\x1a\nnot really an image");
        let media = encode_inline(file.path()).unwrap();
        assert_eq!(media.md5, hash_content(file.path()).unwrap());

        let decoded = STANDARD.decode(&media.base64).unwrap();
        assert_eq!(hash_reader(decoded.as_slice(), CHUNK_SIZE).unwrap(), media.md5);
    }

    #[test]
    fn test_encode_bytes_matches_file() {
        let file = fixture(b"hello world");
        let media = encode_bytes(b"hello world");
        assert_eq!(media, encode_inline(file.path()).unwrap());
        assert_eq!(media.base64, "aGVsbG8gd29ybGQ=");
        assert_eq!(media.md5, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(matches!(
            hash_content(&missing),
            Err(RobotError::Io { ref path, .. }) if *path == missing
        ));
        assert!(matches!(encode_inline(&missing), Err(RobotError::Io { .. })));
    }
}
