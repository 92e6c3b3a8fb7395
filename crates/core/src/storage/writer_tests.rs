//! Tests for the upload writer.
//!
//! Faults are injected through the source reader; directory failures through
//! a regular file sitting where the root's parent should be.

use std::fs;
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::Path;
use std::sync::Barrier;
use std::thread;

use proptest::prelude::*;
use tempfile::TempDir;

use super::*;
use crate::storage::{FailureKind, InvalidName, MAX_NAME_LEN, UnexpectedCause};

/// Yields `good` bytes, then fails with `kind`.
struct FailingReader {
    good: Cursor<Vec<u8>>,
    kind: ErrorKind,
}

impl FailingReader {
    fn new(good: Vec<u8>, kind: ErrorKind) -> Self {
        Self {
            good: Cursor::new(good),
            kind,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.good.read(buf)? {
            0 => Err(io::Error::new(self.kind, "injected fault")),
            n => Ok(n),
        }
    }
}

/// Fails once with `Interrupted` before every chunk.
struct StutteringReader {
    inner: Cursor<Vec<u8>>,
    stutter: bool,
}

impl Read for StutteringReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stutter = !self.stutter;
        if self.stutter {
            return Err(io::Error::from(ErrorKind::Interrupted));
        }
        self.inner.read(buf)
    }
}

/// Must never be read.
struct UntouchableReader;

impl Read for UntouchableReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        panic!("transfer must not be attempted");
    }
}

fn writer_in(tmp: &TempDir) -> UploadWriter {
    UploadWriter::new(
        StorageRoot::new(tmp.path().join("up")),
        NamingStrategy::Declared,
    )
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_report_scenario() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let payload = pattern(1024, 7);

    let stored = writer
        .write(UploadRequest::new(Cursor::new(payload.clone()), "report.pdf"))
        .expect("upload should succeed");

    assert_eq!(stored.stored_path, tmp.path().join("up").join("report.pdf"));
    assert_eq!(stored.declared_name, "report.pdf");
    assert_eq!(stored.storage_key, "report.pdf");
    assert_eq!(stored.size, 1024);
    assert_eq!(fs::read(&stored.stored_path).expect("read back"), payload);
}

#[test]
fn test_empty_stream_creates_empty_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);

    let stored = writer
        .write(UploadRequest::new(io::empty(), "empty.txt"))
        .expect("empty upload is still an upload");

    assert_eq!(stored.size, 0);
    assert!(fs::read(&stored.stored_path).expect("read").is_empty());
}

#[test]
fn test_second_upload_overwrites_first() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);

    writer
        .write(UploadRequest::new(&b"first payload"[..], "notes.txt"))
        .expect("first upload");
    writer
        .write(UploadRequest::new(&b"second"[..], "notes.txt"))
        .expect("second upload");

    let root = tmp.path().join("up");
    assert_eq!(entries(&root), vec!["notes.txt"]);
    assert_eq!(fs::read(root.join("notes.txt")).expect("read"), b"second");
}

#[test]
fn test_empty_name_does_not_touch_filesystem() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);

    let err = writer
        .write(UploadRequest::new(UntouchableReader, ""))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::UnexpectedError);
    assert!(matches!(
        err,
        UploadError::Unexpected {
            cause: UnexpectedCause::InvalidName(InvalidName::Empty),
            ..
        }
    ));
    assert!(!writer.root().path().exists());
}

#[test]
fn test_traversal_name_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);

    let err = writer
        .write(UploadRequest::new(UntouchableReader, "../escape.txt"))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::UnexpectedError);
    assert_eq!(err.declared_name(), "../escape.txt");
    assert!(!tmp.path().join("escape.txt").exists());
}

#[test]
fn test_unavailable_root_skips_transfer() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let blocker = tmp.path().join("readonly");
    fs::write(&blocker, b"a file, not a directory").expect("blocker");
    let writer = UploadWriter::new(
        StorageRoot::new(blocker.join("up")),
        NamingStrategy::Declared,
    );

    assert!(DirectoryProvisioner::ensure(writer.root()).is_err());

    let err = writer
        .write(UploadRequest::new(UntouchableReader, "report.pdf"))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::DirectoryUnavailable);
    assert_eq!(err.declared_name(), "report.pdf");
}

#[test]
fn test_mid_transfer_failure_is_write_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let source = FailingReader::new(pattern(200_000, 1), ErrorKind::ConnectionReset);

    let err = writer
        .write(UploadRequest::new(source, "big.bin"))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::WriteError);
    // Neither the destination nor a leftover part file.
    assert!(entries(&tmp.path().join("up")).is_empty());
}

#[test]
fn test_malformed_stream_is_unexpected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let source = FailingReader::new(b"--boundary garbage".to_vec(), ErrorKind::InvalidData);

    let err = writer
        .write(UploadRequest::new(source, "form.txt"))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::UnexpectedError);
    assert!(matches!(
        err,
        UploadError::Unexpected {
            cause: UnexpectedCause::MalformedStream(_),
            ..
        }
    ));
    assert!(entries(&tmp.path().join("up")).is_empty());
}

#[test]
fn test_failed_overwrite_keeps_previous_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    writer
        .write(UploadRequest::new(&b"original"[..], "keep.txt"))
        .expect("first upload");

    let source = FailingReader::new(b"half of the repla".to_vec(), ErrorKind::BrokenPipe);
    let err = writer
        .write(UploadRequest::new(source, "keep.txt"))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::WriteError);

    let root = tmp.path().join("up");
    assert_eq!(entries(&root), vec!["keep.txt"]);
    assert_eq!(fs::read(root.join("keep.txt")).expect("read"), b"original");
}

#[test]
fn test_interrupted_reads_are_retried() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let payload = pattern(4096, 3);
    let source = StutteringReader {
        inner: Cursor::new(payload.clone()),
        stutter: false,
    };

    let stored = writer
        .write(UploadRequest::new(source, "stutter.bin"))
        .expect("interrupts are not failures");

    assert_eq!(fs::read(stored.stored_path).expect("read"), payload);
}

#[test]
fn test_destination_directory_is_write_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    fs::create_dir_all(tmp.path().join("up").join("taken")).expect("dir in the way");

    let err = writer
        .write(UploadRequest::new(&b"data"[..], "taken"))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::WriteError);
    assert_eq!(entries(&tmp.path().join("up")), vec!["taken"]);
}

#[test]
fn test_generated_naming_keeps_declared_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = UploadWriter::new(
        StorageRoot::new(tmp.path().join("up")),
        NamingStrategy::Generated,
    );

    let first = writer
        .write(UploadRequest::new(&b"one"[..], "invoice.pdf"))
        .expect("first");
    let second = writer
        .write(UploadRequest::new(&b"two"[..], "invoice.pdf"))
        .expect("second");

    assert_eq!(first.declared_name, "invoice.pdf");
    assert!(first.storage_key.ends_with("_invoice.pdf"));
    assert_ne!(first.storage_key, second.storage_key);
    assert_eq!(entries(&tmp.path().join("up")).len(), 2);
    assert_eq!(fs::read(first.stored_path).expect("read"), b"one");
    assert_eq!(fs::read(second.stored_path).expect("read"), b"two");
}

#[test]
fn test_generated_key_over_limit_is_invalid_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = UploadWriter::new(
        StorageRoot::new(tmp.path().join("up")),
        NamingStrategy::Generated,
    );
    // Valid on its own, too long once the UUID prefix is added.
    let name = format!("{}.txt", "a".repeat(MAX_NAME_LEN - 24));

    let err = writer
        .write(UploadRequest::new(UntouchableReader, name.as_str()))
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::UnexpectedError);
    assert!(matches!(
        err,
        UploadError::Unexpected {
            cause: UnexpectedCause::InvalidName(InvalidName::TooLong),
            ..
        }
    ));
    assert_eq!(err.declared_name(), name);
    assert!(!writer.root().path().exists());
}

#[test]
fn test_longest_declared_name_is_stored() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let name = "b".repeat(MAX_NAME_LEN);

    let stored = writer
        .write(UploadRequest::new(&b"edge"[..], name.as_str()))
        .expect("upload should succeed");

    assert_eq!(stored.storage_key, name);
    assert_eq!(fs::read(stored.stored_path).expect("read"), b"edge");
}

#[test]
fn test_transfer_file_name_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let root = tmp.path().join("up");
    fs::create_dir_all(&root).expect("root");
    let in_flight = root.join(".intake-x7Yz.part");
    fs::write(&in_flight, b"partial").expect("in-flight file");

    let err = writer
        .write(UploadRequest::new(UntouchableReader, ".intake-x7Yz.part"))
        .unwrap_err();

    assert!(matches!(
        err,
        UploadError::Unexpected {
            cause: UnexpectedCause::InvalidName(InvalidName::TransferPattern),
            ..
        }
    ));
    assert_eq!(fs::read(&in_flight).expect("untouched"), b"partial");
}

#[test]
fn test_concurrent_same_name_never_interleaves() {
    const WRITERS: u8 = 8;
    const LEN: usize = 256 * 1024;

    let tmp = tempfile::tempdir().expect("tempdir");
    let writer = writer_in(&tmp);
    let barrier = Barrier::new(usize::from(WRITERS));

    thread::scope(|s| {
        for id in 0..WRITERS {
            let writer = &writer;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                writer
                    .write(UploadRequest::new(Cursor::new(vec![id; LEN]), "race.bin"))
                    .expect("every writer succeeds");
            });
        }
    });

    let root = tmp.path().join("up");
    assert_eq!(entries(&root), vec!["race.bin"]);

    let content = fs::read(root.join("race.bin")).expect("read");
    assert_eq!(content.len(), LEN);
    let winner = content[0];
    assert!(winner < WRITERS);
    assert!(content.iter().all(|b| *b == winner), "bytes from two writers");
}

// Stored bytes are identical to the uploaded bytes for any plain name.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(
        name in "[a-zA-Z0-9 _-]{1,40}\\.[a-z]{2,4}",
        payload in prop::collection::vec(any::<u8>(), 1..8192),
    ) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let writer = writer_in(&tmp);

        let stored = writer
            .write(UploadRequest::new(Cursor::new(payload.clone()), name.clone()))
            .expect("valid upload");

        prop_assert_eq!(&stored.declared_name, &name);
        prop_assert_eq!(stored.size, payload.len() as u64);
        prop_assert_eq!(fs::read(&stored.stored_path).expect("read back"), payload);
    }
}
