//! Poll-until-predicate-or-timeout
//!
//! Browser downloads complete asynchronously and expose no callback to the
//! controlling process, so the only completion signal is the appearance of
//! the expected file. This module factors that wait into a generic utility
//! so it can be tested with an injected predicate instead of a real browser.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Repeatedly evaluate `predicate` until it returns true or `deadline`
/// elapses. Returns whether the predicate ever held.
///
/// The predicate is always evaluated at least once, so a zero deadline
/// still observes an already-true condition.
pub fn wait_until<F>(mut predicate: F, interval: Duration, deadline: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    loop {
        if predicate() {
            return true;
        }
        if start.elapsed() >= deadline {
            return false;
        }
        thread::sleep(interval);
    }
}

/// Wait for `path` to exist, failing with [`Error::Timeout`] once `deadline`
/// elapses.
pub fn wait_for_file(path: &Path, interval: Duration, deadline: Duration) -> Result<()> {
    if wait_until(|| path.exists(), interval, deadline) {
        Ok(())
    } else {
        Err(Error::Timeout(
            deadline.as_millis() as u64,
            path.display().to_string(),
        ))
    }
}
