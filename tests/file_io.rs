//! File I/O through the ring, including linked entries

use std::fs::{File, OpenOptions};
use std::io::{Read as IoRead, Write as IoWrite};
use std::os::unix::io::AsRawFd;
use uring_core::{ops::*, Ring, Result, SqeFlags};

const TEST_DATA: &[u8] = b"Hello, io_uring world! This is test data for read/write operations.";

#[test]
fn test_read_single_buffer() -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(TEST_DATA).unwrap();
    tmp.flush().unwrap();

    let file = File::open(tmp.path()).unwrap();
    let mut ring = Ring::new(8)?;
    let mut buffer = vec![0u8; TEST_DATA.len()];

    ring.push(&Read::from_slice(file.as_raw_fd(), &mut buffer, 0), 1)?;
    ring.submit()?;

    let bytes_read = ring.wait_for_completion(None)?.into_result()?;
    assert_eq!(bytes_read as usize, TEST_DATA.len());
    assert_eq!(&buffer[..], TEST_DATA);

    Ok(())
}

#[test]
fn test_write_single_buffer() -> Result<()> {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let file = OpenOptions::new().write(true).open(tmp.path()).unwrap();
    let mut ring = Ring::new(8)?;

    ring.push(&Write::from_slice(file.as_raw_fd(), TEST_DATA, 0), 2)?;
    ring.submit()?;

    let bytes_written = ring.wait_for_completion(None)?.into_result()?;
    assert_eq!(bytes_written as usize, TEST_DATA.len());

    drop(file);
    let mut verify_buf = Vec::new();
    File::open(tmp.path())
        .unwrap()
        .read_to_end(&mut verify_buf)
        .unwrap();
    assert_eq!(&verify_buf[..], TEST_DATA);

    Ok(())
}

#[test]
fn test_read_at_offset() -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(TEST_DATA).unwrap();
    tmp.flush().unwrap();

    let file = File::open(tmp.path()).unwrap();
    let mut ring = Ring::new(4)?;
    let mut buffer = vec![0u8; 8];

    ring.push(&Read::from_slice(file.as_raw_fd(), &mut buffer, 7), 3)?;
    ring.submit()?;

    let n = ring.wait_for_completion(None)?.into_result()?;
    assert_eq!(n, 8);
    assert_eq!(&buffer[..], &TEST_DATA[7..15]);

    Ok(())
}

#[test]
fn test_linked_write_fsync_read() -> Result<()> {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(tmp.path())
        .unwrap();
    let fd = file.as_raw_fd();

    let mut ring = Ring::new(4)?;
    let mut buffer = vec![0u8; TEST_DATA.len()];

    // The chain runs strictly in order: write, then fsync, then read back
    ring.get_next_submission_slot()?
        .prepare(&Write::from_slice(fd, TEST_DATA, 0))
        .set_flags(SqeFlags::IO_LINK)
        .set_user_data(1);
    ring.get_next_submission_slot()?
        .prepare(&Fsync::new(fd))
        .set_flags(SqeFlags::IO_LINK)
        .set_user_data(2);
    ring.push(&Read::from_slice(fd, &mut buffer, 0), 3)?;

    assert_eq!(ring.submit()?, 3);

    let mut results = [0i32; 3];
    for _ in 0..3 {
        let cqe = ring.wait_for_completion(None)?;
        results[cqe.user_data() as usize - 1] = cqe.result();
        cqe.mark_seen();
    }

    assert_eq!(results[0] as usize, TEST_DATA.len());
    assert_eq!(results[1], 0);
    assert_eq!(results[2] as usize, TEST_DATA.len());
    assert_eq!(&buffer[..], TEST_DATA);

    Ok(())
}

#[test]
fn test_failed_link_cancels_rest_of_chain() -> Result<()> {
    let mut ring = Ring::new(4)?;
    let mut buffer = vec![0u8; 16];

    ring.get_next_submission_slot()?
        .prepare(&Fsync::new(-1))
        .set_flags(SqeFlags::IO_LINK)
        .set_user_data(1);
    ring.push(&Read::from_slice(-1, &mut buffer, 0), 2)?;
    ring.submit()?;

    let mut results = [0i32; 2];
    for _ in 0..2 {
        let cqe = ring.wait_for_completion(None)?;
        results[cqe.user_data() as usize - 1] = cqe.result();
        cqe.mark_seen();
    }

    assert_eq!(results[0], -libc::EBADF);
    assert_eq!(results[1], -libc::ECANCELED);

    Ok(())
}
