//! File and stdin helpers shared by the commands.
//!
//! Round logs may be plain JSONL or Zstandard-compressed (`.zst`); readers
//! decompress transparently and strip a leading UTF-8 BOM.

use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Reads one trimmed line; `None` on EOF or a read error.
///
/// ```rust
/// use std::io::Cursor;
/// # use alea_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new("  hold 2 \n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("hold 2"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

/// Reads a text file, decompressing it first when the name ends in `.zst`.
pub fn read_text_auto(path: &Path) -> Result<String, String> {
    let is_zst = path.extension().is_some_and(|e| e == "zst");
    let mut content = if is_zst {
        let comp = std::fs::read(path).map_err(|e| e.to_string())?;
        let dec = zstd::stream::decode_all(comp.as_slice()).map_err(|e| e.to_string())?;
        String::from_utf8(dec).map_err(|e| e.to_string())?
    } else {
        std::fs::read_to_string(path).map_err(|e| e.to_string())?
    };
    strip_utf8_bom(&mut content);
    Ok(content)
}

/// Creates the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

/// All `.jsonl` and `.jsonl.zst` files below `dir`, sorted by path.
pub fn round_log_files(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        let Ok(rd) = std::fs::read_dir(&d) else {
            continue;
        };
        for entry in rd.filter_map(Result::ok) {
            let p = entry.path();
            if p.is_dir() {
                stack.push(p);
            } else if let Some(name) = p.file_name().and_then(|f| f.to_str())
                && (name.ends_with(".jsonl") || name.ends_with(".jsonl.zst"))
            {
                found.push(p);
            }
        }
    }
    found.sort();
    found
}

fn strip_utf8_bom(s: &mut String) {
    const UTF8_BOM: &str = "\u{feff}";
    if s.starts_with(UTF8_BOM) {
        s.drain(..UTF8_BOM.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_stdin_line_trims_and_stops_at_eof() {
        let mut cursor = Cursor::new(b"  roll 0.5  \n   \n".to_vec());
        assert_eq!(read_stdin_line(&mut cursor), Some("roll 0.5".to_string()));
        assert_eq!(read_stdin_line(&mut cursor), Some(String::new()));
        assert_eq!(read_stdin_line(&mut cursor), None);
    }

    #[test]
    fn test_strip_utf8_bom() {
        let mut s = "\u{feff}{}".to_string();
        strip_utf8_bom(&mut s);
        assert_eq!(s, "{}");
    }

    #[test]
    fn test_zst_files_are_decompressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rounds.jsonl.zst");
        let packed = zstd::stream::encode_all("{\"a\":1}\n".as_bytes(), 3).unwrap();
        std::fs::write(&path, packed).unwrap();
        assert_eq!(read_text_auto(&path).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn test_round_log_files_walks_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b.jsonl");
        ensure_parent_dir(&nested).unwrap();
        std::fs::write(&nested, "").unwrap();
        std::fs::write(dir.path().join("c.jsonl.zst"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let files = round_log_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| !p.ends_with("notes.txt")));
    }
}
