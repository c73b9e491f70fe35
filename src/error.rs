//! Error types for ring operations

use std::fmt;
use std::io;

/// Result type for ring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when working with a [`Ring`](crate::Ring)
#[derive(Debug)]
pub enum Error {
    /// Ring creation or registration with the kernel failed
    ///
    /// Fatal for that ring instance.
    Init(io::Error),

    /// No free submission slot
    ///
    /// Submit pending entries or drain completions, then retry.
    QueueFull,

    /// The kernel rejected the submission batch; nothing was consumed
    Submit(io::Error),

    /// The wait was interrupted by a signal
    Interrupted,

    /// The wait timeout elapsed before a completion arrived
    TimedOut,

    /// Unexpected failure reported by the kernel
    ///
    /// The ring may or may not be usable afterwards.
    Ring(io::Error),

    /// Configuration rejected before reaching the kernel
    InvalidConfig(String),
}

impl Error {
    /// Whether the caller can simply retry the same call later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::QueueFull | Error::Interrupted | Error::TimedOut)
    }

    /// The underlying OS error, if any
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Init(e) | Error::Submit(e) | Error::Ring(e) => e.raw_os_error(),
            Error::Interrupted => Some(libc::EINTR),
            Error::TimedOut => Some(libc::ETIME),
            Error::QueueFull | Error::InvalidConfig(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Init(e) => write!(f, "ring setup failed: {}", e),
            Error::QueueFull => write!(f, "submission queue is full"),
            Error::Submit(e) => write!(f, "submission rejected: {}", e),
            Error::Interrupted => write!(f, "wait interrupted by a signal"),
            Error::TimedOut => write!(f, "timed out waiting for a completion"),
            Error::Ring(e) => write!(f, "ring error: {}", e),
            Error::InvalidConfig(msg) => write!(f, "invalid ring configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Init(e) | Error::Submit(e) | Error::Ring(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Ring(err)
    }
}

/// Convert a negative return code to an io::Error
pub(crate) fn from_ret_code(ret: i32) -> io::Error {
    io::Error::from_raw_os_error(-ret)
}

/// Check a return code and convert to Result
pub(crate) fn check_ret(ret: i32) -> io::Result<i32> {
    if ret < 0 {
        Err(from_ret_code(ret))
    } else {
        Ok(ret)
    }
}

/// Map a failed wait onto the wait-specific variants
pub(crate) fn wait_error(ret: i32) -> Error {
    match -ret {
        libc::EINTR => Error::Interrupted,
        libc::ETIME => Error::TimedOut,
        _ => Error::Ring(from_ret_code(ret)),
    }
}

/// Map a failed peek; an empty queue is not an error
pub(crate) fn peek_error(ret: i32) -> Option<Error> {
    match -ret {
        libc::EAGAIN => None,
        _ => Some(wait_error(ret)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_ret() {
        assert_eq!(check_ret(3).unwrap(), 3);
        let err = check_ret(-libc::EBADF).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn test_wait_error_mapping() {
        assert!(matches!(wait_error(-libc::EINTR), Error::Interrupted));
        assert!(matches!(wait_error(-libc::ETIME), Error::TimedOut));
        match wait_error(-libc::EBADF) {
            Error::Ring(e) => assert_eq!(e.raw_os_error(), Some(libc::EBADF)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_peek_error_mapping() {
        assert!(peek_error(-libc::EAGAIN).is_none());
        match peek_error(-libc::EBADR) {
            Some(Error::Ring(e)) => assert_eq!(e.raw_os_error(), Some(libc::EBADR)),
            other => panic!("unexpected mapping: {other:?}"),
        }
        assert!(matches!(peek_error(-libc::EINTR), Some(Error::Interrupted)));
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::QueueFull.is_recoverable());
        assert!(Error::Interrupted.is_recoverable());
        assert!(Error::TimedOut.is_recoverable());
        assert!(!Error::Init(io::Error::from_raw_os_error(libc::ENOMEM)).is_recoverable());
        assert!(!Error::Submit(io::Error::from_raw_os_error(libc::EBUSY)).is_recoverable());
    }

    #[test]
    fn test_io_error_becomes_ring_error() {
        let err: Error = io::Error::from_raw_os_error(libc::EIO).into();
        assert!(matches!(err, Error::Ring(_)));
        assert_eq!(err.raw_os_error(), Some(libc::EIO));
    }
}
