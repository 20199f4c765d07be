//! Line splitting shared by the chunk reader and the up-front line count.
//!
//! A line ends at `\n`, `\r\n` or a lone `\r`. A final line without a terminator still
//! counts as a line.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads UTF-8 lines with their terminators removed.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// The previous line ended at `\r`; a `\n` right after it belongs to that terminator.
    pending_cr: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pending_cr: false,
        }
    }

    /// Replaces `line` with the next line. Returns `false` at end of input.
    ///
    /// Invalid UTF-8 is an [`io::ErrorKind::InvalidData`] error.
    pub fn read_line(&mut self, line: &mut String) -> io::Result<bool> {
        line.clear();
        self.buf.clear();

        if !self.read_raw()? {
            return Ok(false);
        }

        let text = std::str::from_utf8(&self.buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        line.push_str(text);
        Ok(true)
    }

    fn read_raw(&mut self) -> io::Result<bool> {
        if self.pending_cr {
            self.pending_cr = false;
            if self.inner.fill_buf()?.first() == Some(&b'\n') {
                self.inner.consume(1);
            }
        }

        let mut read_any = false;
        loop {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                return Ok(read_any);
            }
            read_any = true;

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    self.pending_cr = available[i] == b'\r';
                    self.buf.extend_from_slice(&available[..i]);
                    self.inner.consume(i + 1);
                    return Ok(true);
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.inner.consume(len);
                }
            }
        }
    }
}

/// Counts the lines [`LineReader`] would yield for the file at `path`, without decoding them.
pub fn count_lines(path: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut count = 0u64;
    let mut prev = None;

    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        for &b in buf {
            match b {
                b'\n' if prev == Some(b'\r') => {}
                b'\n' | b'\r' => count += 1,
                _ => {}
            }
            prev = Some(b);
        }
        let len = buf.len();
        reader.consume(len);
    }

    if matches!(prev, Some(b) if b != b'\n' && b != b'\r') {
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines_of(bytes: &[u8]) -> Vec<String> {
        let mut reader = LineReader::new(bytes);
        let mut line = String::new();
        let mut lines = Vec::new();
        while reader.read_line(&mut line).unwrap() {
            lines.push(line.clone());
        }
        lines
    }

    fn count_of(bytes: &[u8]) -> u64 {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        std::fs::write(&path, bytes).unwrap();
        count_lines(&path).unwrap()
    }

    #[test]
    fn test_all_terminators_end_a_line() {
        let input = b"lf\ncrlf\r\ncr\rlast";
        assert_eq!(lines_of(input), vec!["lf", "crlf", "cr", "last"]);
        assert_eq!(count_of(input), 4);
    }

    #[test]
    fn test_carriage_return_only_file() {
        let input = b"4111111111111111\rnope\r5555555555554444\r";
        assert_eq!(
            lines_of(input),
            vec!["4111111111111111", "nope", "5555555555554444"]
        );
        assert_eq!(count_of(input), 3);
    }

    #[test]
    fn test_blank_lines_are_kept() {
        assert_eq!(lines_of(b"\n\r\n\r\r"), vec!["", "", "", ""]);
        assert_eq!(count_of(b"\n\r\n\r\r"), 4);
        assert_eq!(count_of(b"\n\n"), 2);
    }

    #[test]
    fn test_trailing_terminator_does_not_add_a_line() {
        assert_eq!(lines_of(b"one\ntwo\nthree\n").len(), 3);
        assert_eq!(count_of(b"one\ntwo\nthree\n"), 3);
        assert_eq!(count_of(b"one\r\ntwo\r\nthree"), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(lines_of(b"").is_empty());
        assert_eq!(count_of(b""), 0);
    }

    #[test]
    fn test_crlf_split_across_buffer_refills() {
        let data: &[u8] = b"ab\r\ncd\r\n";
        let reader = BufReader::with_capacity(3, data);
        let mut lines = LineReader::new(reader);
        let mut line = String::new();

        assert!(lines.read_line(&mut line).unwrap());
        assert_eq!(line, "ab");
        assert!(lines.read_line(&mut line).unwrap());
        assert_eq!(line, "cd");
        assert!(!lines.read_line(&mut line).unwrap());
    }

    #[test]
    fn test_invalid_utf8_is_invalid_data() {
        let mut reader = LineReader::new(&b"ok\n\xff\xfe\n"[..]);
        let mut line = String::new();

        assert!(reader.read_line(&mut line).unwrap());
        let err = reader.read_line(&mut line).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_count_lines_missing_file() {
        assert!(count_lines(Path::new("/no/such/file.csv")).is_err());
    }
}
