//! Media records, content detection, and blob addressing.
//!
//! A media record's bytes live in the blob store under
//! `{ownerId}/{recordId}.{extension}`; the same triple, prefixed with the
//! public base URL and media directory, forms the record's `reference`.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

use super::AccountId;

/// Number of leading bytes inspected when classifying content.
pub const SNIFF_LEN: u64 = 512;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xff\xd8\xff";

/// Store-assigned media record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaId(i64);

impl MediaId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MediaId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Accepted image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Png,
    Jpeg,
}

impl MediaType {
    /// MIME type string stored as the record's encoding.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension, taken from the MIME subtype.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// Parse a path extension; `jpg` is accepted for JPEG.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Parse a stored encoding.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Classify content from its leading bytes.
    ///
    /// # Examples
    /// ```
    /// use pixbin::domain::MediaType;
    ///
    /// assert_eq!(MediaType::detect(b"\x89PNG\r\n\x1a\n\0\0"), Some(MediaType::Png));
    /// assert_eq!(MediaType::detect(b"GIF89a"), None);
    /// ```
    #[must_use]
    pub fn detect(prefix: &[u8]) -> Option<Self> {
        if prefix.starts_with(PNG_SIGNATURE) {
            Some(Self::Png)
        } else if prefix.starts_with(JPEG_SIGNATURE) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Read at most [`SNIFF_LEN`] bytes, classify them, and rewind the
    /// reader to where it started.
    ///
    /// # Errors
    /// Propagates read and seek failures.
    pub fn sniff<R>(reader: &mut R) -> io::Result<Option<Self>>
    where
        R: Read + Seek,
    {
        let start = reader.stream_position()?;
        let mut prefix = Vec::new();
        reader.by_ref().take(SNIFF_LEN).read_to_end(&mut prefix)?;
        reader.seek(SeekFrom::Start(start))?;
        Ok(Self::detect(&prefix))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Title stored for an upload or rename.
///
/// Everything from the first `.` onwards is replaced by the detected
/// extension, so a client-supplied extension never contradicts the content.
///
/// # Examples
/// ```
/// use pixbin::domain::{normalise_title, MediaType};
///
/// assert_eq!(normalise_title("a.bin", MediaType::Png), "a.png");
/// assert_eq!(normalise_title("holiday", MediaType::Jpeg), "holiday.jpeg");
/// ```
#[must_use]
pub fn normalise_title(raw: &str, media_type: MediaType) -> String {
    let stem = raw.trim().split('.').next().unwrap_or_default();
    let stem = if stem.is_empty() { "untitled" } else { stem };
    format!("{stem}.{}", media_type.extension())
}

/// Persisted media record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    pub id: MediaId,
    pub owner: AccountId,
    pub title: String,
    pub reference: String,
    pub size: u64,
    pub media_type: MediaType,
    pub shareable: bool,
}

impl MediaRecord {
    /// Blob-store key for this record's bytes.
    #[must_use]
    pub fn blob_key(&self) -> BlobKey {
        BlobKey {
            owner: self.owner,
            id: self.id,
            media_type: self.media_type,
        }
    }
}

/// Record fields prior to insertion; the reference is filled in afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMediaRecord {
    pub owner: AccountId,
    pub title: String,
    pub size: u64,
    pub media_type: MediaType,
    pub shareable: bool,
}

impl NewMediaRecord {
    /// Attach the store-assigned identifier, leaving the reference empty.
    #[must_use]
    pub fn into_record(self, id: MediaId) -> MediaRecord {
        MediaRecord {
            id,
            owner: self.owner,
            title: self.title,
            reference: String::new(),
            size: self.size,
            media_type: self.media_type,
            shareable: self.shareable,
        }
    }
}

/// Blob-store address of a record's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobKey {
    pub owner: AccountId,
    pub id: MediaId,
    pub media_type: MediaType,
}

impl BlobKey {
    /// `{recordId}.{extension}`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.media_type.extension())
    }

    /// `{ownerId}/{recordId}.{extension}` relative to the blob root.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.owner.to_string()).join(self.file_name())
    }
}

/// Public prefix used to build record references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBase {
    base_url: String,
    media_dir: String,
}

impl ReferenceBase {
    /// Trailing slashes are dropped from both parts.
    pub fn new(base_url: impl Into<String>, media_dir: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let media_dir = media_dir.into().trim_matches('/').to_owned();
        Self {
            base_url,
            media_dir,
        }
    }

    /// `{base}/{mediaDir}/{ownerId}/{recordId}.{extension}`
    ///
    /// # Examples
    /// ```
    /// use pixbin::domain::{AccountId, BlobKey, MediaId, MediaType, ReferenceBase};
    ///
    /// let base = ReferenceBase::new("localhost:8000", "image");
    /// let key = BlobKey { owner: AccountId::new(3), id: MediaId::new(9), media_type: MediaType::Png };
    /// assert_eq!(base.reference_for(&key), "localhost:8000/image/3/9.png");
    /// ```
    #[must_use]
    pub fn reference_for(&self, key: &BlobKey) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.media_dir,
            key.owner,
            key.file_name()
        )
    }
}

/// Rejections for the `{ownerId}/{ref}` path pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MediaLocatorError {
    #[error("owner id must be an integer")]
    InvalidOwner,
    #[error("image reference must be <id> or <id>.<ext>")]
    InvalidReference,
    #[error("image extension must be png or jpeg")]
    UnsupportedExtension,
}

/// Record addressed by an image path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaLocator {
    pub owner: AccountId,
    pub id: MediaId,
    /// Encoding named by the reference extension, if one was given.
    pub media_type: Option<MediaType>,
}

impl MediaLocator {
    /// Parse the owner segment and a reference such as `12` or `12.png`.
    ///
    /// Only the final extension is stripped, so `12.png.png` is rejected.
    ///
    /// # Errors
    /// Returns [`MediaLocatorError`] when either segment is not numeric or
    /// the extension names an encoding other than PNG or JPEG.
    pub fn parse(owner: &str, reference: &str) -> Result<Self, MediaLocatorError> {
        let owner = owner
            .parse::<AccountId>()
            .map_err(|_| MediaLocatorError::InvalidOwner)?;
        let (stem, media_type) = match reference.rsplit_once('.') {
            Some((stem, ext)) => (
                stem,
                Some(MediaType::from_extension(ext).ok_or(MediaLocatorError::UnsupportedExtension)?),
            ),
            None => (reference, None),
        };
        let id = stem
            .parse::<MediaId>()
            .map_err(|_| MediaLocatorError::InvalidReference)?;
        Ok(Self {
            owner,
            id,
            media_type,
        })
    }

    /// Address a record by owner and id alone.
    #[must_use]
    pub const fn new(owner: AccountId, id: MediaId) -> Self {
        Self {
            owner,
            id,
            media_type: None,
        }
    }
}

/// Partial metadata update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPatch {
    /// New title; empty strings mean "no change".
    pub title: Option<String>,
    pub shareable: Option<bool>,
}

impl MediaPatch {
    /// Apply the patch in place, normalising any new title.
    pub fn apply(self, record: &mut MediaRecord) {
        if let Some(title) = self.title.filter(|title| !title.trim().is_empty()) {
            record.title = normalise_title(&title, record.media_type);
        }
        if let Some(shareable) = self.shareable {
            record.shareable = shareable;
        }
    }
}

/// Bytes of a record together with their encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContent {
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}
