//! Background line reader.
//!
//! The reader owns a blocking [`BufRead`] and has no way to be interrupted
//! mid-read. Nothing joins it at shutdown: the process exits around it.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::context::LogContext;

/// Name given to the reader thread.
pub const READER_THREAD_NAME: &str = "conlog-reader";

pub(crate) fn spawn<R>(ctx: Arc<LogContext>, input: R) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name(READER_THREAD_NAME.to_string())
        .spawn(move || read_loop(&ctx, input))
}

fn read_loop<R: BufRead>(ctx: &LogContext, mut input: R) {
    tracing::debug!("Console reader started");
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                tracing::debug!("Console input closed, reader exiting");
                break;
            }
            Ok(_) => {
                ctx.submit_line(&line);
                ctx.write_prompt();
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::InvalidData | io::ErrorKind::Interrupted) => {
                tracing::debug!(error = %e, "Skipping unreadable console line");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Console input failed, reader exiting");
                break;
            }
        }
    }
}
