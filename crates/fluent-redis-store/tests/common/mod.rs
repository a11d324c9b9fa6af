//! Loopback RESP2 server that stands in for Redis.
//!
//! Answers the handful of commands a client sends while connecting, records
//! every `HSET` it accepts and can be scripted to fail specific ones.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the server answers one `HSET`.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Store the fields and answer with the field count.
    Stored,
    /// Answer with this error line.
    Error(&'static str),
    /// Close the socket without answering.
    Hangup,
}

/// A running fake server. Stops accepting when dropped.
pub struct FakeRedis {
    addr: SocketAddr,
    hsets: Arc<Mutex<Vec<Vec<Vec<u8>>>>>,
    connections: Arc<AtomicUsize>,
    accept: JoinHandle<()>,
}

impl FakeRedis {
    /// Listen on an ephemeral loopback port.
    ///
    /// `script[i]` answers the `i`-th `HSET` (0-based, counted across all
    /// connections); `HSET`s past the end of the script are stored.
    pub async fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hsets = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let accept = {
            let script = Arc::new(script);
            let seen = Arc::new(AtomicUsize::new(0));
            let hsets = Arc::clone(&hsets);
            let connections = Arc::clone(&connections);
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve(
                        socket,
                        Arc::clone(&script),
                        Arc::clone(&seen),
                        Arc::clone(&hsets),
                    ));
                }
            })
        };

        Self {
            addr,
            hsets,
            connections,
            accept,
        }
    }

    /// `host:port` to hand to `RedisConnector::new`.
    pub fn server(&self) -> String {
        self.addr.to_string()
    }

    /// Arguments of every stored `HSET`, command name excluded.
    pub fn hsets(&self) -> Vec<Vec<Vec<u8>>> {
        self.hsets.lock().unwrap().clone()
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FakeRedis {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

async fn serve(
    socket: TcpStream,
    script: Arc<Vec<Reply>>,
    seen: Arc<AtomicUsize>,
    hsets: Arc<Mutex<Vec<Vec<Vec<u8>>>>>,
) {
    let mut stream = BufReader::new(socket);
    while let Some(command) = read_command(&mut stream).await {
        let Some((name, args)) = command.split_first() else {
            continue;
        };
        let reply = match name.to_ascii_uppercase().as_slice() {
            b"HSET" => {
                let attempt = seen.fetch_add(1, Ordering::SeqCst);
                match script.get(attempt).copied().unwrap_or(Reply::Stored) {
                    Reply::Stored => {
                        hsets.lock().unwrap().push(args.to_vec());
                        format!(":{}\r\n", args.len().saturating_sub(1) / 2).into_bytes()
                    }
                    Reply::Error(text) => format!("-{text}\r\n").into_bytes(),
                    Reply::Hangup => return,
                }
            }
            b"PING" => b"+PONG\r\n".to_vec(),
            b"CLIENT" if args.first().is_some_and(|a| a.eq_ignore_ascii_case(b"ID")) => {
                b":1\r\n".to_vec()
            }
            b"INFO" => {
                let body = "# Server\r\nredis_version:7.2.0\r\n";
                format!("${}\r\n{body}\r\n", body.len()).into_bytes()
            }
            b"QUIT" => {
                let _ = stream.write_all(b"+OK\r\n").await;
                return;
            }
            _ => b"+OK\r\n".to_vec(),
        };
        if stream.write_all(&reply).await.is_err() {
            return;
        }
    }
}

/// Read one `*N` array of bulk strings. `None` on EOF or garbage.
async fn read_command(stream: &mut BufReader<TcpStream>) -> Option<Vec<Vec<u8>>> {
    let count = read_header(stream, b'*').await?;
    let mut parts = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_header(stream, b'$').await?;
        let mut data = vec![0; len + 2];
        stream.read_exact(&mut data).await.ok()?;
        data.truncate(len);
        parts.push(data);
    }
    Some(parts)
}

async fn read_header(stream: &mut BufReader<TcpStream>, marker: u8) -> Option<usize> {
    let mut line = Vec::new();
    if stream.read_until(b'\n', &mut line).await.ok()? == 0 {
        return None;
    }
    let digits = line.strip_prefix(&[marker])?.strip_suffix(b"\r\n")?;
    std::str::from_utf8(digits).ok()?.parse().ok()
}
