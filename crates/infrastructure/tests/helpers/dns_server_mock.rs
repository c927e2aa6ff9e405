#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// Address every mock answer points at.
pub const MOCK_ANSWER_IP: [u8; 4] = [93, 184, 216, 34];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockUpstreamMode {
    /// Reply with one A record.
    Answer,
    /// Swallow every query.
    Silent,
    /// Send a reply with the wrong transaction id first, then the real one.
    WrongIdFirst,
    /// Reply with one A record after the given delay.
    Delayed(Duration),
}

/// Upstream resolver stand-in on an ephemeral loopback port.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(mode: MockUpstreamMode) -> Result<Self, std::io::Error> {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await?);
        let addr = socket.local_addr()?;
        let received = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&received);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let response = Self::build_mock_response(&buf[..len]);

                        match mode {
                            MockUpstreamMode::Answer => {
                                let _ = socket.send_to(&response, peer).await;
                            }
                            MockUpstreamMode::Silent => {}
                            MockUpstreamMode::WrongIdFirst => {
                                let mut wrong = response.clone();
                                if wrong.len() >= 2 {
                                    wrong[0] ^= 0xFF;
                                }
                                let _ = socket.send_to(&wrong, peer).await;
                                let _ = socket.send_to(&response, peer).await;
                            }
                            MockUpstreamMode::Delayed(delay) => {
                                let socket = Arc::clone(&socket);
                                tokio::spawn(async move {
                                    tokio::time::sleep(delay).await;
                                    let _ = socket.send_to(&response, peer).await;
                                });
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    /// Echoes the header id and question, adds one A record pointing at
    /// [`MOCK_ANSWER_IP`].
    pub fn build_mock_response(query: &[u8]) -> Vec<u8> {
        if query.len() < 12 {
            return vec![];
        }

        let mut response = Vec::with_capacity(512);
        response.extend_from_slice(&query[0..2]);
        response.push(0x81);
        response.push(0x80);
        response.extend_from_slice(&query[4..6]);
        response.extend_from_slice(&[0x00, 0x01]);
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&query[12..]);
        response.extend_from_slice(&[
            0xc0, 0x0c, // name pointer
            0x00, 0x01, // A
            0x00, 0x01, // IN
            0x00, 0x00, 0x01, 0x2c, // TTL 300
            0x00, 0x04,
        ]);
        response.extend_from_slice(&MOCK_ANSWER_IP);
        response
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
