use converse_model::{ErrorKind, Message};
use mime::Mime;
use reqwest::{Response, StatusCode, header};

use crate::Error;

/// Maps a non-successful status to the kind of error it represents.
///
/// The backend answers `403 Forbidden` when the caller is out of free
/// completions and has no subscription; everything else is a plain
/// failure.
#[inline]
pub fn classify_status(status: StatusCode) -> ErrorKind {
    if status == StatusCode::FORBIDDEN {
        ErrorKind::QuotaExceeded
    } else {
        ErrorKind::Other
    }
}

/// Reads the assistant message out of a backend response.
pub async fn read_reply(resp: Response) -> Result<Message, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        debug!("backend answered {status}: {body}");
        return Err(Error::with_status(
            format!("backend answered {status}"),
            classify_status(status),
            status,
        ));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    if let Some(content_type) = &content_type {
        if !is_json(content_type) {
            return Err(Error::new(
                format!("Unexpected content type: {content_type:?}"),
                ErrorKind::Other,
            ));
        }
    }

    let body = resp
        .bytes()
        .await
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    decode_reply(&body)
}

/// Decodes a successful response body into the assistant message.
pub fn decode_reply(body: &[u8]) -> Result<Message, Error> {
    let msg = serde_json::from_slice::<Message>(body)
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
    trace!("got reply: {msg:?}");
    match msg {
        Message::Assistant { .. } => Ok(msg),
        Message::User { .. } => Err(Error::new(
            "backend replied with a user message",
            ErrorKind::Other,
        )),
    }
}

#[inline]
fn is_json(content_type: &str) -> bool {
    content_type
        .parse()
        .map(|m: Mime| {
            m.type_() == mime::APPLICATION
                && (m.subtype() == mime::JSON
                    || m.suffix().is_some_and(|s| s == mime::JSON))
        })
        .unwrap_or(false)
}
