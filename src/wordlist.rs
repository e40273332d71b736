//! Wordlist reader
//!
//! Streams words from a line-oriented file without loading it into memory,
//! decoding each line to UTF-8 on the way.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Read buffer and detection sample size (64KB)
const BUFFER_SIZE: usize = 64 * 1024;

/// What happens to the line terminator before a word is hashed and stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEndings {
    /// Drop the terminator and skip blank lines
    #[default]
    Strip,
    /// Keep every line, blank ones included, ending in a single `\n`
    ///
    /// `\r\n` and `\r` terminators are normalized to `\n`; a final line
    /// without a terminator is kept as is.
    Keep,
}

/// How wordlist bytes are turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEncoding {
    /// Sniff the encoding from the start of the file
    Auto,
    /// Decode with a fixed encoding
    Fixed(&'static Encoding),
}

impl Default for InputEncoding {
    fn default() -> Self {
        Self::Fixed(encoding_rs::UTF_8)
    }
}

impl InputEncoding {
    /// Parse `auto` or a WHATWG encoding label (`utf-8`, `latin1`, ...)
    ///
    /// Lines are split on `\n` and `\r` bytes, so only ASCII-compatible
    /// encodings are accepted.
    pub fn from_label(label: &str) -> Result<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }

        Encoding::for_label(label.as_bytes())
            .filter(|encoding| encoding.is_ascii_compatible())
            .map(Self::Fixed)
            .ok_or_else(|| Error::UnsupportedEncoding(label.to_string()))
    }
}

/// One line of the wordlist, ready to hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    /// 1-based line number in the source file
    pub line: u64,
    pub word: String,
}

/// Detect the encoding of a file by sampling its content
pub fn detect_encoding(path: &Path) -> Result<&'static Encoding> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(BUFFER_SIZE);
    file.take(BUFFER_SIZE as u64).read_to_end(&mut sample)?;

    if sample.is_empty() {
        return Ok(encoding_rs::UTF_8);
    }

    if let Some((encoding, _)) = Encoding::for_bom(&sample) {
        return Ok(encoding);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&sample, sample.len() < BUFFER_SIZE);
    Ok(detector.guess(None, true))
}

/// Line-by-line word source
///
/// Owns the file handle; it is closed when the reader is dropped, whether
/// the caller ran it to the end or not.
pub struct WordlistReader {
    reader: BufReader<File>,
    path: PathBuf,
    encoding: &'static Encoding,
    line_endings: LineEndings,
    line_buffer: Vec<u8>,
    line: u64,
    bytes_read: u64,
    size: u64,
}

impl WordlistReader {
    /// Open a UTF-8 wordlist, stripping line terminators
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_options(path, LineEndings::default(), InputEncoding::default())
    }

    pub fn with_options(path: &Path, line_endings: LineEndings, encoding: InputEncoding) -> Result<Self> {
        let not_found = |source| Error::SourceNotFound {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(not_found)?;
        if !metadata.is_file() {
            return Err(not_found(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let encoding = match encoding {
            InputEncoding::Fixed(encoding) => encoding,
            InputEncoding::Auto => detect_encoding(path).map_err(|e| match e {
                Error::Io(source) => not_found(source),
                other => other,
            })?,
        };
        if !encoding.is_ascii_compatible() {
            return Err(Error::UnsupportedEncoding(encoding.name().to_string()));
        }

        let file = File::open(path).map_err(not_found)?;
        log::debug!("Reading {:?} as {}", path, encoding.name());

        Ok(Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, file),
            path: path.to_path_buf(),
            encoding,
            line_endings,
            line_buffer: Vec::with_capacity(256),
            line: 0,
            bytes_read: 0,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding lines are decoded with
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// File size in bytes at open time
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of the last line read
    pub fn line(&self) -> u64 {
        self.line
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        let invalid = || Error::Encoding {
            line: self.line,
            encoding: self.encoding.name(),
        };

        if self.encoding == encoding_rs::UTF_8 {
            return String::from_utf8(bytes.to_vec()).map_err(|_| invalid());
        }

        let (decoded, had_errors) = self.encoding.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(invalid());
        }
        Ok(decoded.into_owned())
    }
}

impl WordlistReader {
    /// Read the next line into `line_buffer`, terminator excluded
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line. Returns whether the line
    /// had a terminator, or `None` at end of file.
    fn read_line(&mut self) -> std::io::Result<Option<bool>> {
        self.line_buffer.clear();
        let mut consumed = false;

        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(consumed.then_some(false));
            }
            consumed = true;

            match memchr::memchr2(b'\n', b'\r', available) {
                Some(i) => {
                    let terminator = available[i];
                    self.line_buffer.extend_from_slice(&available[..i]);
                    self.reader.consume(i + 1);
                    self.bytes_read += (i + 1) as u64;

                    // the \n of a \r\n pair may sit at the start of the next buffer
                    if terminator == b'\r' && self.reader.fill_buf()?.first() == Some(&b'\n') {
                        self.reader.consume(1);
                        self.bytes_read += 1;
                    }
                    return Ok(Some(true));
                }
                None => {
                    let len = available.len();
                    self.line_buffer.extend_from_slice(available);
                    self.reader.consume(len);
                    self.bytes_read += len as u64;
                }
            }
        }
    }
}

impl Iterator for WordlistReader {
    type Item = Result<WordRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let terminated = match self.read_line() {
                Ok(None) => return None,
                Ok(Some(terminated)) => terminated,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            let mut content = &self.line_buffer[..];
            if self.line == 1 {
                content = strip_bom(content, self.encoding);
            }

            let word = match self.line_endings {
                LineEndings::Strip if content.is_empty() => continue,
                LineEndings::Strip => self.decode(content),
                LineEndings::Keep => self.decode(content).map(|mut word| {
                    if terminated {
                        word.push('\n');
                    }
                    word
                }),
            };

            return Some(word.map(|word| WordRecord {
                line: self.line,
                word,
            }));
        }
    }
}

fn strip_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, len)) if bom_encoding == encoding => &bytes[len..],
        _ => bytes,
    }
}
