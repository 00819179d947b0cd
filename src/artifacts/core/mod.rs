//! Shared utilities
//!
//! Human-readable command output goes through a pager when stdout is a
//! terminal and `NO_PAGER` is unset; otherwise it is written straight out.

use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{self, Write};

pub const NO_PAGER_ENV: &str = "NO_PAGER";

/// Adapter giving the minus pager a `Write` implementation
///
/// Bytes are forwarded as text; a UTF-8 sequence split across two writes is
/// held back until it is complete.
pub struct PagerWriter {
    pager: Pager,
    pending: Vec<u8>,
}

impl PagerWriter {
    pub fn new(pager: Pager) -> Self {
        PagerWriter {
            pager,
            pending: Vec::new(),
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                self.pending.clear();
                return Err(io::Error::new(io::ErrorKind::InvalidData, e));
            }
        };

        let text = String::from_utf8_lossy(&self.pending[..valid_up_to]).into_owned();
        self.pager.push_str(text).map_err(io::Error::other)?;
        self.pending.drain(..valid_up_to);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where a command's human-readable output ends up
pub struct Output {
    pager: Option<Pager>,
}

impl Output {
    /// Page when stdout is an interactive terminal and paging isn't disabled
    pub fn detect() -> Self {
        let page = io::stdout().is_terminal() && std::env::var_os(NO_PAGER_ENV).is_none();
        Output {
            pager: page.then(Pager::new),
        }
    }

    pub fn writer(&self) -> Box<dyn Write> {
        match &self.pager {
            Some(pager) => Box::new(PagerWriter::new(pager.clone())),
            None => Box::new(io::stdout()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.pager.is_some() || io::stdout().is_terminal()
    }

    /// Show everything written so far; returns once the user quits the pager
    pub fn finish(self) -> anyhow::Result<()> {
        if let Some(pager) = self.pager {
            minus::page_all(pager)?;
        }
        Ok(())
    }
}
