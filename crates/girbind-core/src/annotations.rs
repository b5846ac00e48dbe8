//! Ownership, direction and lifetime annotations.
//!
//! These are shared between the raw IDL tree (where they are optional
//! attributes) and resolved parameters (where defaults have been applied).

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

/// Data-flow direction of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    In,
    Out,
    /// Accepted in the IDL but never resolvable.
    InOut,
    /// The return value of a callable.
    Return,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
            Direction::Return => "return",
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "inout" => Ok(Direction::InOut),
            "return" => Ok(Direction::Return),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership transfer across the native boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transfer {
    #[default]
    None,
    Full,
    /// Only the container is owned by the receiver, not its elements.
    Container,
    /// The value borrows from another parameter, usually the instance.
    Borrow,
}

impl Transfer {
    pub fn as_str(self) -> &'static str {
        match self {
            Transfer::None => "none",
            Transfer::Full => "full",
            Transfer::Container => "container",
            Transfer::Borrow => "borrow",
        }
    }
}

impl FromStr for Transfer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Transfer::None),
            "full" => Ok(Transfer::Full),
            "container" => Ok(Transfer::Container),
            "borrow" => Ok(Transfer::Borrow),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a callback argument stays valid on the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallbackScope {
    /// Valid only for the duration of the call.
    #[default]
    Call,
    /// Invoked exactly once, some time after the call returns.
    Async,
    /// Valid until the paired destroy notification fires.
    Notified,
    /// Never released.
    Forever,
}

impl CallbackScope {
    pub fn as_str(self) -> &'static str {
        match self {
            CallbackScope::Call => "call",
            CallbackScope::Async => "async",
            CallbackScope::Notified => "notified",
            CallbackScope::Forever => "forever",
        }
    }
}

impl FromStr for CallbackScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(CallbackScope::Call),
            "async" => Ok(CallbackScope::Async),
            "notified" => Ok(CallbackScope::Notified),
            "forever" => Ok(CallbackScope::Forever),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CallbackScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the boundary initiates the call.
///
/// Legality checks swap the transfer capability they require depending on the
/// mode: a callable hands inputs to native code, while a callback receives
/// them from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterMode {
    /// Outer code calls into the native library.
    #[default]
    Callable,
    /// The native library calls back into outer code through a trampoline.
    Callback,
}

bitflags! {
    /// Boolean parameter annotations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParamFlags: u8 {
        /// The value may be null.
        const NULLABLE = 1 << 0;
        /// An out parameter the caller may pass as null.
        const OPTIONAL = 1 << 1;
        /// The caller allocates storage for an out parameter.
        const CALLER_ALLOCATES = 1 << 2;
        /// Not exposed to outer code.
        const SKIP = 1 << 3;
    }
}
