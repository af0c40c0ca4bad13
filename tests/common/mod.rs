//! Local fixtures: a canned HTTP server and a bare SOCKS5 relay

#![allow(dead_code)]

use parking_lot::Mutex;
use proxy_harvester::progress::ProgressSink;
use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serve fixed `(status, body)` responses keyed by request path
pub async fn serve(routes: &[(&str, u16, &str)]) -> SocketAddr {
    let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
        routes
            .iter()
            .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
            .collect(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let _ = respond(stream, &routes).await;
            });
        }
    });

    addr
}

async fn respond(mut stream: TcpStream, routes: &HashMap<String, (u16, String)>) -> io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body) = routes
        .get(path)
        .cloned()
        .unwrap_or((404, "not found".to_string()));

    let response = format!(
        "HTTP/1.1 {} Fixture\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Accept SOCKS5 CONNECT requests without authentication and relay them
pub async fn socks5_relay() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = relay(stream).await;
            });
        }
    });

    addr
}

/// Complete the SOCKS5 handshake, then hold the tunnel open without
/// forwarding anything
pub async fn socks5_blackhole() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                if handshake(&mut stream).await.is_ok()
                    && stream.write_all(&[5, 0, 0, 1, 0, 0, 0, 0, 0, 0]).await.is_ok()
                {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
            });
        }
    });

    addr
}

async fn relay(mut inbound: TcpStream) -> io::Result<()> {
    let (host, port) = handshake(&mut inbound).await?;
    let mut outbound = TcpStream::connect((host.as_str(), port)).await?;
    inbound.write_all(&[5, 0, 0, 1, 0, 0, 0, 0, 0, 0]).await?;
    tokio::io::copy_bidirectional(&mut inbound, &mut outbound).await?;
    Ok(())
}

/// Read the greeting and CONNECT request, returning the requested target
async fn handshake(inbound: &mut TcpStream) -> io::Result<(String, u16)> {
    let mut greeting = [0u8; 2];
    inbound.read_exact(&mut greeting).await?;
    let mut methods = vec![0u8; greeting[1] as usize];
    inbound.read_exact(&mut methods).await?;
    inbound.write_all(&[5, 0]).await?;

    let mut request = [0u8; 4];
    inbound.read_exact(&mut request).await?;
    let host = match request[3] {
        1 => {
            let mut ip = [0u8; 4];
            inbound.read_exact(&mut ip).await?;
            Ipv4Addr::from(ip).to_string()
        }
        3 => {
            let mut len = [0u8; 1];
            inbound.read_exact(&mut len).await?;
            let mut name = vec![0u8; len[0] as usize];
            inbound.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).into_owned()
        }
        4 => {
            let mut ip = [0u8; 16];
            inbound.read_exact(&mut ip).await?;
            Ipv6Addr::from(ip).to_string()
        }
        _ => return Err(io::Error::new(io::ErrorKind::InvalidData, "address type")),
    };
    let mut port = [0u8; 2];
    inbound.read_exact(&mut port).await?;

    Ok((host, u16::from_be_bytes(port)))
}

/// Records every progress update
#[derive(Clone, Default)]
pub struct Recorder {
    pub updates: Arc<Mutex<Vec<(usize, usize)>>>,
    pub finished: Arc<Mutex<bool>>,
}

impl ProgressSink for Recorder {
    fn update(&mut self, current: usize, total: usize) {
        self.updates.lock().push((current, total));
    }

    fn finish(&mut self) {
        *self.finished.lock() = true;
    }
}

pub fn read_file(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
