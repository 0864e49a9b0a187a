#[cfg(test)]
use std::collections::VecDeque;

use bytes::Bytes;
use reqwest::Response;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Transport,
    InvalidPayload,
}

/// Source of raw byte chunks for the SSE reader.
pub enum ByteStream {
    Response(Response),
    #[cfg(test)]
    Canned(VecDeque<Bytes>),
}

impl ByteStream {
    #[inline]
    pub fn from_response(response: Response) -> Self {
        ByteStream::Response(response)
    }

    #[cfg(test)]
    pub fn from_chunks<I: IntoIterator<Item = Bytes>>(chunks: I) -> Self {
        ByteStream::Canned(chunks.into_iter().collect())
    }

    async fn next_chunk(&mut self) -> Result<Option<Bytes>, Error> {
        match self {
            ByteStream::Response(response) => {
                response.chunk().await.map_err(|_| Error::Transport)
            }
            #[cfg(test)]
            ByteStream::Canned(chunks) => Ok(chunks.pop_front()),
        }
    }
}

/// Reads server-sent events off a chunked byte stream.
///
/// Only the subset the chat-completions endpoint emits is handled: `data`
/// fields terminated by a blank line. Comments and other field names are
/// rejected as invalid.
pub struct SseReader {
    buf: String,
    stream: ByteStream,
}

impl SseReader {
    #[inline]
    pub fn new(stream: ByteStream) -> Self {
        Self {
            buf: String::new(),
            stream,
        }
    }

    /// Returns the payload of the next `data` event, or `None` when the
    /// stream is exhausted.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(data) = self.take_buffered_event()? {
                return Ok(Some(data));
            }

            // Not enough buffered bytes for a full event, pull more.
            let Some(bytes) = self.stream.next_chunk().await? else {
                return Ok(None);
            };
            let Ok(s) = str::from_utf8(&bytes) else {
                return Err(Error::InvalidPayload);
            };
            self.buf.push_str(s);
        }
    }

    fn take_buffered_event(&mut self) -> Result<Option<String>, Error> {
        // An event is one `data` field line followed by a blank line. Only
        // line feeds are handled as end-of-line.
        let Some(end) = self.buf.find("\n\n") else {
            return Ok(None);
        };

        let line = &self.buf[..end];
        let Some(data) = line.strip_prefix("data:") else {
            return Err(Error::InvalidPayload);
        };
        let data = data.trim_start_matches(' ').to_owned();

        self.buf.drain(..end + 2);
        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_whole_events() {
        let stream = ByteStream::from_chunks([
            Bytes::from_static(b"data: hello\n\n"),
            Bytes::from_static(b"data: bye\n\n"),
        ]);
        let mut sse = SseReader::new(stream);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_event_split_across_chunks() {
        let stream = ByteStream::from_chunks([
            Bytes::from_static(b"data:"),
            Bytes::from_static(b" hello\n"),
            Bytes::from_static(b"\n"),
        ]);
        let mut sse = SseReader::new(stream);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let stream =
            ByteStream::from_chunks([Bytes::from_static(b"xxxxxx\n\n")]);
        let mut sse = SseReader::new(stream);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);

        // A field without its blank line never completes.
        let stream =
            ByteStream::from_chunks([Bytes::from_static(b"data: hello\n")]);
        let mut sse = SseReader::new(stream);
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
