//! Play log decoding.
//!
//! The log is a short header followed by fixed-size little-endian records:
//!
//! ```text
//! header   magic "PDLG" | u16 version | u16 record size
//! record   u8 kind | u8 sub-kind | 6 reserved | u128 account
//!          | u64 application | u64 wall secs | u64 steady secs
//! ```
//!
//! Loading is all-or-nothing: a single undecodable record fails the whole
//! load, since sessions reconstructed after a corrupt record cannot be trusted.

use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::event::Event;
use crate::event_type::{EventKind, SubKind};
use crate::types::{AccountId, ApplicationId};

/// Leading bytes of every play log.
pub const MAGIC: [u8; 4] = *b"PDLG";

/// The only record layout this loader understands.
pub const FORMAT_VERSION: u16 = 1;

/// Header size in bytes.
pub const HEADER_LEN: usize = 8;

/// Record size in bytes for [`FORMAT_VERSION`].
pub const RECORD_LEN: usize = 48;

/// How many records are decoded between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 4096;

/// Errors from loading a play log.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The header is unreadable or describes an unsupported layout.
    #[error("log corrupt: {0}")]
    Header(CorruptReason),
    /// A record could not be decoded.
    #[error("log corrupt at record {index}: {reason}")]
    Corrupt { index: usize, reason: CorruptReason },
    /// The caller's deadline passed before decoding finished.
    #[error("log load timed out after {decoded} records")]
    Timeout { decoded: usize },
}

impl LoadError {
    /// Whether the log bytes themselves are bad, as opposed to I/O or timing.
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Header(_) | Self::Corrupt { .. })
    }
}

/// Why a header or record failed to decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorruptReason {
    #[error("header truncated to {0} bytes")]
    TruncatedHeader(usize),
    #[error("bad magic {0:02X?}")]
    BadMagic([u8; 4]),
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("record size {found} does not match {expected}")]
    RecordSize { found: u16, expected: usize },
    #[error("truncated record of {0} bytes")]
    TruncatedRecord(usize),
    #[error("unknown kind tag {0}")]
    UnknownKind(u8),
    #[error("unknown sub-kind tag {0}")]
    UnknownSubKind(u8),
    #[error("{sub_kind} is not valid for {kind} records")]
    MismatchedSubKind { kind: EventKind, sub_kind: SubKind },
}

/// Options for a single load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Give up with [`LoadError::Timeout`] once this instant has passed.
    pub deadline: Option<Instant>,
}

impl LoadOptions {
    /// Options with a deadline `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() > d)
    }
}

/// Decodes a play log with default options.
pub fn decode(bytes: &[u8]) -> Result<Vec<Event>, LoadError> {
    decode_with(bytes, &LoadOptions::default())
}

/// Decodes a play log into events in log order.
///
/// An empty input is an empty log. Anything else must start with a valid
/// header and contain only whole records.
pub fn decode_with(bytes: &[u8], options: &LoadOptions) -> Result<Vec<Event>, LoadError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let body = parse_header(bytes).map_err(LoadError::Header)?;

    let trailing = body.len() % RECORD_LEN;
    if trailing != 0 {
        return Err(LoadError::Corrupt {
            index: body.len() / RECORD_LEN,
            reason: CorruptReason::TruncatedRecord(trailing),
        });
    }

    decode_records(body, || options.deadline_passed())
}

/// Decodes whole records, polling `deadline_passed` every
/// [`DEADLINE_CHECK_INTERVAL`] records.
fn decode_records(
    body: &[u8],
    mut deadline_passed: impl FnMut() -> bool,
) -> Result<Vec<Event>, LoadError> {
    let mut events = Vec::with_capacity(body.len() / RECORD_LEN);
    for (index, record) in body.chunks_exact(RECORD_LEN).enumerate() {
        if index % DEADLINE_CHECK_INTERVAL == 0 && deadline_passed() {
            tracing::warn!(decoded = index, "play log load hit its deadline");
            return Err(LoadError::Timeout { decoded: index });
        }
        let event = decode_record(record).map_err(|reason| LoadError::Corrupt { index, reason })?;
        events.push(event);
    }

    Ok(events)
}

/// Reads and decodes a play log file.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Vec<Event>, LoadError> {
    let bytes = std::fs::read(path)?;
    let started = Instant::now();
    let events = decode_with(&bytes, options)?;
    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        events = events.len(),
        elapsed = ?started.elapsed(),
        "loaded play log"
    );
    Ok(events)
}

/// Validates the header and returns the record area.
fn parse_header(bytes: &[u8]) -> Result<&[u8], CorruptReason> {
    if bytes.len() < HEADER_LEN {
        return Err(CorruptReason::TruncatedHeader(bytes.len()));
    }
    let (header, body) = bytes.split_at(HEADER_LEN);

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&header[..4]);
    if magic != MAGIC {
        return Err(CorruptReason::BadMagic(magic));
    }

    let version = le_u16(header, 4);
    if version != FORMAT_VERSION {
        return Err(CorruptReason::UnsupportedVersion(version));
    }

    let record_len = le_u16(header, 6);
    if usize::from(record_len) != RECORD_LEN {
        return Err(CorruptReason::RecordSize {
            found: record_len,
            expected: RECORD_LEN,
        });
    }

    Ok(body)
}

/// Decodes one `RECORD_LEN`-byte record.
fn decode_record(record: &[u8]) -> Result<Event, CorruptReason> {
    let kind = EventKind::from_tag(record[0]).ok_or(CorruptReason::UnknownKind(record[0]))?;
    let sub_kind =
        SubKind::from_tag(record[1]).ok_or(CorruptReason::UnknownSubKind(record[1]))?;
    if sub_kind.kind() != kind {
        return Err(CorruptReason::MismatchedSubKind { kind, sub_kind });
    }

    let mut account = [0u8; 16];
    account.copy_from_slice(&record[8..24]);

    Ok(Event {
        kind,
        account: AccountId::new(u128::from_le_bytes(account)),
        application_id: ApplicationId::new(le_u64(record, 24)),
        sub_kind,
        wall_timestamp: le_u64(record, 32),
        steady_timestamp: le_u64(record, 40),
    })
}

fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn le_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}


#[cfg(test)]
mod tests {
    use super::testing::{encode, header, record};
    use super::*;

    const ALICE: AccountId = AccountId::new(0x0123_4567_89AB_CDEF_0011_2233_4455_6677);
    const GAME: ApplicationId = ApplicationId::new(0x0100_0000_0001_0000);

    fn sample_events() -> Vec<Event> {
        vec![
            Event::account(ALICE, SubKind::AccountActive, 990, 990),
            Event::application(ALICE, GAME, SubKind::Launch, 1000, 1000),
            Event::application(ALICE, GAME, SubKind::Exit, 1600, 1600),
        ]
    }

    #[test]
    fn empty_input_is_an_empty_log() {
        assert!(decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn header_only_is_an_empty_log() {
        assert!(decode(&header()).unwrap().is_empty());
    }

    #[test]
    fn decodes_records_in_log_order() {
        let events = sample_events();
        let decoded = decode(&encode(&events)).unwrap();
        assert_eq!(decoded, events);
    }

    #[test]
    fn reserved_bytes_are_ignored() {
        let event = Event::application(ALICE, GAME, SubKind::Launch, 5, 5);
        let mut bytes = header();
        let mut raw = record(&event);
        raw[2..8].copy_from_slice(&[0xFF; 6]);
        bytes.extend(raw);
        assert_eq!(decode(&bytes).unwrap(), vec![event]);
    }

    #[test]
    fn short_header_is_corrupt() {
        let err = decode(b"PDL").unwrap_err();
        assert!(err.is_corrupt());
        assert!(matches!(
            err,
            LoadError::Header(CorruptReason::TruncatedHeader(3))
        ));
    }

    #[test]
    fn bad_magic_is_corrupt() {
        let mut bytes = encode(&sample_events());
        bytes[0] = b'X';
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            LoadError::Header(CorruptReason::BadMagic(_))
        ));
    }

    #[test]
    fn unsupported_version_is_corrupt() {
        let mut bytes = encode(&sample_events());
        bytes[4..6].copy_from_slice(&2u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            LoadError::Header(CorruptReason::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn record_size_mismatch_is_corrupt() {
        let mut bytes = encode(&sample_events());
        bytes[6..8].copy_from_slice(&56u16.to_le_bytes());
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            LoadError::Header(CorruptReason::RecordSize { found: 56, .. })
        ));
    }

    #[test]
    fn truncated_trailing_record_fails_whole_load() {
        let mut bytes = encode(&sample_events());
        bytes.truncate(bytes.len() - 10);
        match decode(&bytes).unwrap_err() {
            LoadError::Corrupt { index, reason } => {
                assert_eq!(index, 2);
                assert_eq!(reason, CorruptReason::TruncatedRecord(RECORD_LEN - 10));
            }
            other => panic!("expected corrupt record, got {other:?}"),
        }
    }

    #[test]
    fn invalid_sub_kind_at_later_record_returns_no_events() {
        let mut bytes = encode(&sample_events());
        bytes[HEADER_LEN + 2 * RECORD_LEN + 1] = 9;
        let err = decode(&bytes).unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(
            err.to_string(),
            "log corrupt at record 2: unknown sub-kind tag 9"
        );
    }

    #[test]
    fn unknown_kind_is_corrupt() {
        let mut bytes = encode(&sample_events());
        bytes[HEADER_LEN + RECORD_LEN] = 7;
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            LoadError::Corrupt {
                index: 1,
                reason: CorruptReason::UnknownKind(7)
            }
        ));
    }

    #[test]
    fn sub_kind_must_match_kind() {
        let mut bytes = encode(&sample_events());
        // Launch tag on an account record.
        bytes[HEADER_LEN + 1] = 0;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "log corrupt at record 0: launch is not valid for account records"
        );
    }

    #[test]
    fn expired_deadline_times_out() {
        let options = LoadOptions {
            deadline: Some(Instant::now().checked_sub(Duration::from_secs(1)).unwrap()),
        };
        let err = decode_with(&encode(&sample_events()), &options).unwrap_err();
        assert!(matches!(err, LoadError::Timeout { decoded: 0 }));
        assert!(!err.is_corrupt());
    }

    #[test]
    fn deadline_passing_mid_load_discards_partial_events() {
        let events = vec![sample_events()[1]; DEADLINE_CHECK_INTERVAL * 2 + 1];
        let bytes = encode(&events);

        let mut checks = 0;
        let err = decode_records(&bytes[HEADER_LEN..], || {
            checks += 1;
            checks > 1
        })
        .unwrap_err();

        assert_eq!(checks, 2);
        assert!(matches!(err, LoadError::Timeout { decoded } if decoded == DEADLINE_CHECK_INTERVAL));
    }

    #[test]
    fn generous_deadline_loads_normally() {
        let options = LoadOptions::with_timeout(Duration::from_secs(60));
        assert_eq!(
            decode_with(&encode(&sample_events()), &options).unwrap().len(),
            3
        );
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PlayEvent.dat");
        std::fs::write(&path, encode(&sample_events())).unwrap();

        let events = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(events, sample_events());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("missing.dat"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
