use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;

/// Handle to a host capability: a symbolic name plus the argument tuple `A`
/// and return type `R` the caller expects.
pub struct Capability<A, R> {
    name: &'static str,
    _signature: PhantomData<fn(A) -> R>,
}

impl<A, R> Capability<A, R> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _signature: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<A: 'static, R: 'static> Capability<A, R> {
    pub fn signature(&self) -> Signature {
        Signature::of::<A, R>()
    }

    pub fn requirement(&self) -> Requirement {
        Requirement {
            name: self.name,
            signature: self.signature(),
        }
    }
}

// Manual impls: a derive would put `Clone`/`Copy` bounds on `A` and `R`.
impl<A, R> Clone for Capability<A, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, R> Copy for Capability<A, R> {}

impl<A, R> fmt::Debug for Capability<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("args", &type_name::<A>())
            .field("ret", &type_name::<R>())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    args: TypeId,
    ret: TypeId,
    args_name: &'static str,
    ret_name: &'static str,
}

impl Signature {
    pub fn of<A: 'static, R: 'static>() -> Self {
        Self {
            args: TypeId::of::<A>(),
            ret: TypeId::of::<R>(),
            args_name: type_name::<A>(),
            ret_name: type_name::<R>(),
        }
    }

    /// Type identity only; the readable names are for diagnostics.
    pub fn matches(&self, other: &Signature) -> bool {
        self.args == other.args && self.ret == other.ret
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{} -> {}", self.args_name, self.ret_name)
    }
}

/// Type-erased capability a caller depends on, checked at startup.
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    pub name: &'static str,
    pub signature: Signature,
}

/// Capabilities the host exposes to the UI.
pub mod capabilities {
    use super::Capability;

    /// Writes a test line to the application log.
    pub const LOG_TEST_MSG: Capability<(), ()> = Capability::new("log_test_msg");

    /// Adds two numbers on the host side.
    pub const CALL_ME: Capability<(f64, f64), f64> = Capability::new("call_me");
}
