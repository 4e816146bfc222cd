//! Contains logic for identifying the active application in different
//! environments. [GenericProbe] is the main artifact of this module that
//! abstracts the operations.

#[cfg(feature = "mac")]
pub mod mac;
#[cfg(feature = "win")]
pub mod win;
#[cfg(feature = "x11")]
pub mod x11;

#[cfg(feature = "win")]
extern crate windows;

#[cfg(feature = "x11")]
extern crate xcb;

use std::sync::Arc;

use anyhow::Result;

/// Sentinel reported when the active application cannot be determined.
///
/// The sentinel is tracked like any other application, so probe outages show
/// up in the report as "Unknown" time instead of crashing the tracker.
pub const UNKNOWN_APP: &str = "Unknown";

/// Intended to serve as a contract platform probes must implement.
///
/// A probe is a single synchronous query with no retained observation state
/// between calls.
#[cfg_attr(test, mockall::automock)]
pub trait ActiveAppProbe {
    /// Name of the application owning the foreground/focused window.
    fn current_app(&mut self) -> Result<Arc<str>>;
}

/// Serves as a cross-compatible probe implementation.
pub struct GenericProbe {
    inner: Box<dyn ActiveAppProbe>,
}

impl GenericProbe {
    pub fn new() -> Result<Self> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "win")] {
                use win::WindowsProbe;
                Ok(Self {
                    inner: Box::new(WindowsProbe::new()),
                })
            }
            else if #[cfg(feature = "x11")] {
                use x11::X11Probe;
                Ok(Self {
                    inner: Box::new(X11Probe::new()?),
                })
            }
            else if #[cfg(feature = "mac")] {
                use mac::MacProbe;
                Ok(Self {
                    inner: Box::new(MacProbe::new()),
                })
            }
            else {
                // This runtime error is needed to allow the project to be compiled for during testing.
                unimplemented!("No active-app probe was specified")
            }
        }
    }
}

impl ActiveAppProbe for GenericProbe {
    fn current_app(&mut self) -> Result<Arc<str>> {
        self.inner.current_app()
    }
}
