//! Typed channel options.

use std::fmt;
use std::marker::PhantomData;

/// A named, typed channel option.
///
/// Local channels recognise no options; the type exists so they satisfy
/// the same capability surface as network-backed channels.
pub struct ChannelOption<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ChannelOption<T> {
    /// Declares an option called `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The option's name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ChannelOption<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ChannelOption<T> {}

impl<T> fmt::Debug for ChannelOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChannelOption").field(&self.name).finish()
    }
}
