use core::fmt;

/// Errors reported by [`RBTreeMap`](crate::RBTreeMap) operations whose preconditions
/// were not met.
///
/// A key that is simply absent is never an error; lookups return `None` instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Error {
    /// An argument was rejected, e.g. a key range whose low end exceeds its high end.
    InvalidArgument { operation: &'static str },
    /// The operation needs at least one entry.
    EmptyCollection { operation: &'static str },
    /// A rank outside `0..len` was requested.
    OutOfRange { rank: usize, len: usize },
}

/// `Result` alias for this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument { operation } => {
                write!(f, "invalid argument to `{operation}()`: range start is greater than range end")
            }
            Error::EmptyCollection { operation } => write!(f, "called `{operation}()` on an empty map"),
            Error::OutOfRange { rank, len } => write!(f, "rank {rank} is out of range for a map of {len} entries"),
        }
    }
}

impl core::error::Error for Error {}
