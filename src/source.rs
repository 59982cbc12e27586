//! Coordinate sources.
//!
//! A source stands in for a device location sensor: each call to
//! [`CoordinateSource::locate`] is one location request that either yields
//! a [`Coordinate`] or a typed [`LocationError`]. The proximity core is only
//! ever called with the success value.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::models::{Coordinate, CoordinateParseError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("location request timed out")]
    Timeout,
    #[error("no more positions")]
    Exhausted,
}

#[allow(async_fn_in_trait)]
pub trait CoordinateSource {
    async fn locate(&mut self) -> Result<Coordinate, LocationError>;
}

/// Always answers with the same coordinate (manual entry)
#[derive(Debug, Clone, Copy)]
pub struct FixedSource {
    coordinate: Coordinate,
}

impl FixedSource {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

impl CoordinateSource for FixedSource {
    async fn locate(&mut self) -> Result<Coordinate, LocationError> {
        Ok(self.coordinate)
    }
}

/// Reads one `lat,lon` position per line, skipping blank lines.
///
/// Unparsable lines surface as [`LocationError::Unavailable`]; end of input
/// is [`LocationError::Exhausted`].
pub struct LineSource<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: AsyncBufRead + Unpin> CoordinateSource for LineSource<R> {
    async fn locate(&mut self) -> Result<Coordinate, LocationError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| LocationError::Unavailable(e.to_string()))?
                .ok_or(LocationError::Exhausted)?;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("Read position line {:?}", line);
            return line
                .parse()
                .map_err(|e: CoordinateParseError| LocationError::Unavailable(e.to_string()));
        }
    }
}

/// Fails a request with [`LocationError::Timeout`] when the inner source
/// takes longer than `limit`
pub struct TimeoutSource<S> {
    inner: S,
    limit: Duration,
}

impl<S: CoordinateSource> TimeoutSource<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

impl<S: CoordinateSource> CoordinateSource for TimeoutSource<S> {
    async fn locate(&mut self) -> Result<Coordinate, LocationError> {
        match tokio::time::timeout(self.limit, self.inner.locate()).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    struct NeverSource;

    impl CoordinateSource for NeverSource {
        async fn locate(&mut self) -> Result<Coordinate, LocationError> {
            std::future::pending().await
        }
    }

    struct DeniedSource;

    impl CoordinateSource for DeniedSource {
        async fn locate(&mut self) -> Result<Coordinate, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn test_fixed_source_repeats() {
        let mut source = FixedSource::new(Coordinate::new(52.52, 13.405));
        assert_eq!(source.locate().await, Ok(Coordinate::new(52.52, 13.405)));
        assert_eq!(source.locate().await, Ok(Coordinate::new(52.52, 13.405)));
    }

    #[tokio::test]
    async fn test_line_source() {
        let input = "52.52,13.405\n\n  48.8566 , 2.3522 \nsomewhere\n";
        let mut source = LineSource::new(BufReader::new(input.as_bytes()));

        assert_eq!(source.locate().await, Ok(Coordinate::new(52.52, 13.405)));
        assert_eq!(source.locate().await, Ok(Coordinate::new(48.8566, 2.3522)));
        assert!(matches!(
            source.locate().await,
            Err(LocationError::Unavailable(_))
        ));
        assert_eq!(source.locate().await, Err(LocationError::Exhausted));
    }

    #[tokio::test]
    async fn test_timeout_source() {
        let mut source = TimeoutSource::new(NeverSource, Duration::from_millis(10));
        assert_eq!(source.locate().await, Err(LocationError::Timeout));
    }

    #[tokio::test]
    async fn test_timeout_passes_errors_through() {
        let mut source = TimeoutSource::new(DeniedSource, Duration::from_secs(1));
        assert_eq!(source.locate().await, Err(LocationError::PermissionDenied));
    }
}
