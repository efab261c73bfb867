use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt};
use reqwest::Response;

#[derive(Debug, PartialEq, Eq)]
pub struct Error(pub String);

/// An adapter for streaming byte chunks of a response body.
pub struct Chunks {
    inner: BoxStream<'static, Result<Bytes, Error>>,
}

impl Chunks {
    pub fn from_response(response: Response) -> Self {
        let inner = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| Error(err.to_string())))
            .boxed();
        Self { inner }
    }

    #[cfg(test)]
    pub fn from_static(chunks: &[&'static [u8]]) -> Self {
        let chunks: Vec<_> = chunks
            .iter()
            .map(|chunk| Ok(Bytes::from_static(chunk)))
            .collect();
        Self {
            inner: futures_util::stream::iter(chunks).boxed(),
        }
    }

    #[inline]
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, Error> {
        self.inner.next().await.transpose()
    }
}
