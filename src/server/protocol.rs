//! Line-oriented request protocol.
//!
//! Each request is one newline-terminated line. Replies are raw line bytes for a
//! successful `GET`, or a single `Error: ...` line.

use crate::error::{LineServeError, Result};
use bstr::ByteSlice;

pub const GET_CMD: &str = "GET";
pub const QUIT_CMD: &str = "QUIT";
pub const SHUTDOWN_CMD: &str = "SHUTDOWN";

/// Longest request line accepted, excluding its newline
pub const MAX_REQUEST_LEN: usize = 64 * 1024;

/// A parsed client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a 1-based line number
    Get(i64),
    /// Close this connection
    Quit,
    /// Stop accepting connections, then close this connection
    Shutdown,
}

impl Command {
    /// Parse one raw request line
    ///
    /// Surrounding whitespace (including the newline) is ignored and the remainder
    /// is split on single spaces. Command words are case-sensitive.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let line = raw.trim().to_str_lossy();
        let parts: Vec<&str> = line.split(' ').collect();

        match parts.as_slice() {
            [QUIT_CMD] => Ok(Command::Quit),
            [SHUTDOWN_CMD] => Ok(Command::Shutdown),
            [GET_CMD, token] => token
                .parse::<i64>()
                .map(Command::Get)
                .map_err(|_| LineServeError::InvalidLineNumber {
                    token: (*token).to_string(),
                }),
            _ => Err(LineServeError::InvalidRequest {
                request: line.to_string(),
            }),
        }
    }
}

/// Reply for a request that could not be parsed
pub fn error_reply(err: &LineServeError) -> Vec<u8> {
    format!("Error: {err}\n").into_bytes()
}

/// Reply for a `GET` whose lookup failed
pub fn lookup_failed_reply(line_number: i64, err: &LineServeError) -> Vec<u8> {
    format!("Error: lookup failed for '{line_number}': {err}\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(b"GET 42\n").unwrap(), Command::Get(42));
        assert_eq!(Command::parse(b"GET -1\r\n").unwrap(), Command::Get(-1));
        assert_eq!(Command::parse(b"  QUIT  \n").unwrap(), Command::Quit);
        assert_eq!(Command::parse(b"SHUTDOWN").unwrap(), Command::Shutdown);
    }

    #[test]
    fn test_parse_invalid_line_number() {
        match Command::parse(b"GET seven\n") {
            Err(LineServeError::InvalidLineNumber { token }) => assert_eq!(token, "seven"),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_requests() {
        for raw in [
            &b"get 1\n"[..],
            b"GET\n",
            b"GET 1 2\n",
            b"GET  1\n",
            b"QUIT now\n",
            b"\n",
            b"HELLO\n",
        ] {
            assert!(
                matches!(Command::parse(raw), Err(LineServeError::InvalidRequest { .. })),
                "{:?} should be invalid",
                raw.as_bstr()
            );
        }
    }

    #[test]
    fn test_invalid_request_keeps_trimmed_line() {
        let err = Command::parse(b"  PUT 3 \r\n").unwrap_err();
        assert_eq!(error_reply(&err), b"Error: invalid request: 'PUT 3'\n".to_vec());
    }

    #[test]
    fn test_lookup_failed_reply() {
        let err = LineServeError::LineOutOfRange {
            line_number: 0,
            total_lines: 5,
        };
        assert_eq!(
            lookup_failed_reply(0, &err),
            b"Error: lookup failed for '0': invalid requested line number '0': 5 lines in file\n"
                .to_vec()
        );
    }
}
