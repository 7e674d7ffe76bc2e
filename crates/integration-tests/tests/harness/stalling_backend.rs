//! Raw TCP backend that accepts synthesis requests and never answers them

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use super::mock_backend::{HEALTH_PATH, SPEECH_PATH};

#[derive(Default)]
struct SpeechState {
    received: AtomicBool,
    closed: AtomicBool,
}

/// Healthy backend whose speech endpoint holds the connection open
///
/// Records when the worker hangs up on a pending synthesis request.
pub struct StallingBackend {
    addr: SocketAddr,
    speech: Arc<SpeechState>,
}

impl StallingBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let speech = Arc::new(SpeechState::default());

        let state = Arc::clone(&speech);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, Arc::clone(&state)));
            }
        });

        Ok(Self { addr, speech })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A synthesis request arrived
    pub fn speech_received(&self) -> bool {
        self.speech.received.load(Ordering::SeqCst)
    }

    /// The worker closed its synthesis connection
    pub fn speech_closed(&self) -> bool {
        self.speech.closed.load(Ordering::SeqCst)
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<SpeechState>) {
    let mut head = Vec::new();
    let mut chunk = [0u8; 4096];

    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }

    let request_line = String::from_utf8_lossy(&head).lines().next().unwrap_or_default().to_string();

    if request_line.starts_with(&format!("GET {HEALTH_PATH} ")) {
        let _ = stream
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
            .await;
        return;
    }

    if request_line.starts_with(&format!("POST {SPEECH_PATH} ")) {
        state.received.store(true, Ordering::SeqCst);

        // drain until the peer hangs up
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }

        state.closed.store(true, Ordering::SeqCst);
    }
}
