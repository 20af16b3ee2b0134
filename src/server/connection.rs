use crate::error::{LineServeError, Result};
use crate::index::LineLookup;
use crate::server::protocol::{error_reply, lookup_failed_reply, Command, MAX_REQUEST_LEN};
use crate::server::state::ShutdownHandle;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Serve requests from one client until it quits, disconnects or fails.
///
/// Commands are handled strictly in arrival order, with at most one reply each.
/// Lookup and protocol failures are reported to the client and the loop continues;
/// only transport errors and requests longer than [`MAX_REQUEST_LEN`] end it early.
pub async fn handle_connection<S>(
    stream: S,
    lookup: Arc<dyn LineLookup>,
    shutdown: ShutdownHandle,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut state = ConnectionState::new(lookup, shutdown);
    let mut request = Vec::new();

    loop {
        request.clear();
        // One extra byte leaves room for the newline of a request at the limit
        let read = (&mut reader)
            .take(MAX_REQUEST_LEN as u64 + 1)
            .read_until(b'\n', &mut request)
            .await
            .map_err(|e| LineServeError::server("Connection read failed", e))?;
        if read == 0 {
            break;
        }

        if request.len() > MAX_REQUEST_LEN && request.last() != Some(&b'\n') {
            log::warn!("Closing connection after a request over {MAX_REQUEST_LEN} bytes");
            let error = LineServeError::RequestTooLong {
                limit: MAX_REQUEST_LEN,
            };
            writer
                .write_all(&error_reply(&error))
                .await
                .map_err(|e| LineServeError::server("Connection write failed", e))?;
            break;
        }

        let outcome = state.handle_request(&request).await;
        if let Some(response) = outcome.response {
            writer
                .write_all(&response)
                .await
                .map_err(|e| LineServeError::server("Connection write failed", e))?;
        }

        if outcome.done {
            break;
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| LineServeError::server("Connection flush failed", e))?;
    Ok(())
}

struct ConnectionState {
    lookup: Arc<dyn LineLookup>,
    shutdown: ShutdownHandle,
}

impl ConnectionState {
    fn new(lookup: Arc<dyn LineLookup>, shutdown: ShutdownHandle) -> Self {
        Self { lookup, shutdown }
    }

    async fn handle_request(&mut self, raw: &[u8]) -> HandlerOutcome {
        match Command::parse(raw) {
            Ok(Command::Get(line_number)) => match self.lookup.lookup(line_number).await {
                Ok(line) => HandlerOutcome::respond(line),
                Err(error) => {
                    if !error.is_client_error() {
                        log::warn!("Lookup of line {line_number} failed: {error}");
                    }
                    HandlerOutcome::respond(lookup_failed_reply(line_number, &error))
                }
            },
            Ok(Command::Quit) => HandlerOutcome::exit(),
            Ok(Command::Shutdown) => {
                if self.shutdown.trigger() {
                    log::info!("Shutdown requested by client");
                }
                HandlerOutcome::exit()
            }
            Err(error) => HandlerOutcome::respond(error_reply(&error)),
        }
    }
}

struct HandlerOutcome {
    response: Option<Vec<u8>>,
    done: bool,
}

impl HandlerOutcome {
    fn respond(response: Vec<u8>) -> Self {
        Self {
            response: Some(response),
            done: false,
        }
    }

    fn exit() -> Self {
        Self {
            response: None,
            done: true,
        }
    }
}
