use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, ToSocketAddrs};

use thiserror::Error;

use crate::delivery::{TilesRequest, TilesService};
use crate::error::TilesError;

pub type DriverResult<T> = std::result::Result<T, SocketDriverError>;

#[derive(Debug, Error)]
pub enum SocketDriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("engine error: {0}")]
    Engine(#[from] TilesError),
}

/// Minimal line-delimited JSON transport for tiles requests.
///
/// Each inbound line is one [`TilesRequest`]; each outbound line is the
/// serialized [`Response`](crate::delivery::Response). Parse failures are
/// transport errors — the container layer's silent-defaulting contract only
/// applies to well-formed JSON with missing fields.
pub struct SocketDriver {
    listener: TcpListener,
    service: TilesService,
}

impl SocketDriver {
    pub fn bind<A>(addr: A, service: TilesService) -> DriverResult<Self>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener, service })
    }

    pub fn local_addr(&self) -> DriverResult<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn run(self) -> DriverResult<()> {
        for stream in self.listener.incoming() {
            let stream = stream?;
            stream.set_nodelay(true).ok();

            let reader = BufReader::new(stream.try_clone()?);
            let mut writer = stream;
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let request: TilesRequest = serde_json::from_str(&line)
                    .map_err(|err| SocketDriverError::Decode(err.to_string()))?;
                let response = self.service.handle(request)?;
                let encoded = serde_json::to_string(&response)
                    .map_err(|err| SocketDriverError::Decode(err.to_string()))?;
                writer.write_all(encoded.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            break;
        }
        Ok(())
    }
}
