//! # Standard Input Probe
//!
//! Decides once, at startup, whether standard input carries piped data.
//!
//! A terminal is never treated as piped. Otherwise a zero-timeout `poll(2)`
//! checks for readable data (or a closed pipe) without blocking. The check
//! is a single snapshot: a producer that has not written anything yet when
//! the shell starts is indistinguishable from an idle terminal, and the
//! shell falls back to interactive mode.
//!
//! Platforms without `poll` always report interactive input.

use std::io::{self, IsTerminal};

pub fn stdin_has_piped_data() -> bool {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return false;
    }
    poll_ready(&stdin)
}

#[cfg(unix)]
fn poll_ready(stdin: &io::Stdin) -> bool {
    use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
    use std::os::fd::AsFd;

    let mut fds = [PollFd::new(stdin.as_fd(), PollFlags::POLLIN)];
    match poll(&mut fds, PollTimeout::ZERO) {
        Ok(ready) if ready > 0 => fds[0]
            .revents()
            .is_some_and(|events| events.intersects(PollFlags::POLLIN | PollFlags::POLLHUP)),
        Ok(_) => false,
        Err(err) => {
            tracing::debug!(%err, "stdin poll failed, assuming interactive input");
            false
        }
    }
}

#[cfg(not(unix))]
fn poll_ready(_stdin: &io::Stdin) -> bool {
    false
}
