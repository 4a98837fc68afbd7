//! Identifiers for things placed on the page.
//!
//! All identifiers use Arc<str> so markers, stops and overlays can share them cheaply.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

macro_rules! page_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(name: impl AsRef<str>) -> Self {
                Self(Arc::from(name.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // Lets maps keyed by identifier be queried with a plain `&str`
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.into())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name.into())
            }
        }
    };
}

page_identifier!(
    /// A bus stop, `bus-stop-1` and up.
    StopIdentifier
);
page_identifier!(
    /// A marker on the map; stop markers reuse their stop's name.
    MarkerIdentifier
);

impl MarkerIdentifier {
    /// The marker showing the device's own position.
    pub fn you_are_here() -> Self {
        Self::new("you-are-here")
    }
}

impl From<&StopIdentifier> for MarkerIdentifier {
    fn from(stop: &StopIdentifier) -> Self {
        Self(Arc::clone(&stop.0))
    }
}
