//! Minimal RESP2 server used to exercise the Redis store in tests.
//!
//! Understands the handful of commands the store sends. It can be told to go
//! silent: connections stay open but no command is answered again, which is
//! what a stalled server or a half-open socket looks like to the client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct Shared {
    data: Mutex<HashMap<String, String>>,
    silent: AtomicBool,
}

pub(crate) struct FakeRedis {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl FakeRedis {
    pub(crate) async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared::default());

        let accept_shared = shared.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket, accept_shared.clone()));
            }
        });

        Self { addr, shared }
    }

    pub(crate) fn url(&self) -> String {
        format!("redis://{}/", self.addr)
    }

    /// Stop answering while keeping every connection open.
    pub(crate) fn go_silent(&self) {
        self.shared.silent.store(true, Ordering::SeqCst);
    }

    /// The raw payload stored under a fully qualified key.
    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.shared.data.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn insert_raw(&self, key: &str, payload: &str) {
        self.shared
            .data
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.shared.data.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

async fn serve(mut socket: TcpStream, shared: Arc<Shared>) {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        while let Some((args, used)) = parse_command(&buf) {
            buf.drain(..used);
            if shared.silent.load(Ordering::SeqCst) {
                continue;
            }
            let reply = execute(&shared, &args);
            if socket.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

/// Parse one `*N\r\n$len\r\narg\r\n...` command, returning it and the bytes used.
fn parse_command(buf: &[u8]) -> Option<(Vec<String>, usize)> {
    if buf.first() != Some(&b'*') {
        return None;
    }
    let (count, mut pos) = read_number(buf, 1)?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        if buf.get(pos) != Some(&b'$') {
            return None;
        }
        let (len, start) = read_number(buf, pos + 1)?;
        let end = start + len;
        if buf.len() < end + 2 {
            return None;
        }
        args.push(String::from_utf8_lossy(&buf[start..end]).into_owned());
        pos = end + 2;
    }
    Some((args, pos))
}

fn read_number(buf: &[u8], start: usize) -> Option<(usize, usize)> {
    let rest = buf.get(start..)?;
    let line_end = rest.windows(2).position(|w| w == b"\r\n")?;
    let number = std::str::from_utf8(&rest[..line_end]).ok()?.parse().ok()?;
    Some((number, start + line_end + 2))
}

fn bulk(value: &str) -> String {
    format!("${}\r\n{}\r\n", value.len(), value)
}

fn execute(shared: &Shared, args: &[String]) -> String {
    let command = args
        .first()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_default();
    let mut data = shared.data.lock().unwrap();

    match command.as_str() {
        "PING" => "+PONG\r\n".to_string(),
        "GET" => match data.get(&args[1]) {
            Some(value) => bulk(value),
            None => "$-1\r\n".to_string(),
        },
        // PSETEX key milliseconds value
        "PSETEX" => {
            data.insert(args[1].clone(), args[3].clone());
            "+OK\r\n".to_string()
        }
        "DEL" => {
            let removed = args[1..].iter().filter(|k| data.remove(*k).is_some()).count();
            format!(":{}\r\n", removed)
        }
        // SCAN cursor MATCH pattern: everything comes back in one page.
        "SCAN" => {
            let pattern = args
                .iter()
                .position(|a| a.eq_ignore_ascii_case("MATCH"))
                .and_then(|i| args.get(i + 1))
                .cloned()
                .unwrap_or_else(|| "*".to_string());
            let prefix = pattern.trim_end_matches('*').replace('\\', "");
            let keys: Vec<&String> = data.keys().filter(|k| k.starts_with(&prefix)).collect();
            let mut reply = format!("*2\r\n$1\r\n0\r\n*{}\r\n", keys.len());
            for key in keys {
                reply.push_str(&bulk(key));
            }
            reply
        }
        "FLUSHDB" => {
            data.clear();
            "+OK\r\n".to_string()
        }
        "CLIENT" | "SELECT" => "+OK\r\n".to_string(),
        _ => format!("-ERR unknown command '{}'\r\n", command),
    }
}
