//! Matches a command line against several candidate handlers.
//!
//! Every handler declares its parameters as flags, options, prefixes,
//! positionals and optional tails. The [`Resolver`] tries the handlers in
//! priority order against the same arguments and returns the values for the
//! first one that consumes the whole command line:
//!
//! ```
//! use optmatch::{Handler, Resolver};
//!
//! let mut resolver = Resolver::builder()
//!     .handler(Handler::new("build").flag("release").positional("target"))
//!     .handler(Handler::new("clean").flag("all"))
//!     .build()?;
//!
//! let matched = resolver.process(["prog", "--release", "x86"])?;
//! assert_eq!(matched.invocation.handler, "build");
//! # Ok::<(), optmatch::Error>(())
//! ```
//!
//! With the default `--` prefix, getopt style short options are enabled as
//! well: `-vo` is `-v -o`, and option values may be given as the next
//! argument.
use std::process;

macro_rules! format_err {
    ($kind:ident, $($tt:tt)*) => {
        $crate::Error::new($crate::ErrorKind::$kind, format!($($tt)*))
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

mod mode;
mod cursor;
mod handler;
mod state;
mod resolver;
mod usage;

pub use crate::{
    cursor::{Cursor, Position},
    handler::{Convert, Handler, HandlerSpec, Role, Slot, Value},
    mode::Mode,
    resolver::{Invocation, Matched, Resolver, ResolverBuilder},
    state::{HandlerState, Outcome},
    usage::Usage,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No candidate matched; the message is the one of the deepest failure.
    Usage,
    /// The command line is malformed regardless of the candidate.
    Fatal,
    /// The handlers or the mode were declared incorrectly.
    Config,
    /// The built-in help handler matched; the message is the usage text.
    Help,
}

#[derive(Debug, thiserror::Error)]
#[error("{msg}")]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: String) -> Error {
        Error { msg, kind }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_help(&self) -> bool {
        self.kind == ErrorKind::Help
    }

    /// True for errors caused by the user's command line.
    pub fn is_usage(&self) -> bool {
        matches!(self.kind, ErrorKind::Usage | ErrorKind::Fatal)
    }

    pub fn exit(self) -> ! {
        if self.is_help() {
            println!("{self}");
            process::exit(0)
        } else {
            eprintln!("{self}");
            process::exit(2)
        }
    }
}
