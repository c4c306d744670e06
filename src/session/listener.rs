//! Loopback listener that receives the identity provider redirect

use super::callback::{location_path, CallbackError};
use regex::Regex;
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const MAX_HEADER_LINES: usize = 100;
/// Upper bound on bytes read from one connection
const MAX_REQUEST_BYTES: u64 = 16 * 1024;
/// How long a single connection may take to send its request
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

const SIGNED_IN_PAGE: &str = "<!doctype html><html><body>\
<h2>Signing you in...</h2>\
<p>Please wait while we complete your authentication. You can close this window.</p>\
</body></html>";

fn request_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:GET|POST) (\S+) HTTP/1\.[01]\r?\n?$").expect("request line pattern is valid")
    })
}

/// One-shot HTTP listener for the sign-in callback
pub struct CallbackListener {
    listener: TcpListener,
}

impl CallbackListener {
    /// Bind the listener to a loopback address such as `127.0.0.1:8765`
    pub async fn bind(address: &str) -> Result<Self, CallbackError> {
        let listener = TcpListener::bind(address).await?;
        Ok(CallbackListener { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, CallbackError> {
        Ok(self.listener.local_addr()?)
    }

    /// URL the identity provider should redirect back to
    pub fn redirect_url(&self, callback_path: &str) -> Result<String, CallbackError> {
        Ok(format!("http://{}{}", self.local_addr()?, callback_path))
    }

    /// Wait for a request to `callback_path` and return its request target.
    ///
    /// Each connection is served on its own task, so an idle connection
    /// (browsers open spare ones) cannot hold up the callback. Requests for
    /// other paths (favicons, health checks) get a 404 and the wait continues.
    pub async fn accept_callback(&self, callback_path: &str) -> Result<String, CallbackError> {
        let (tx, mut rx) = mpsc::channel::<String>(1);

        loop {
            tokio::select! {
                Some(target) = rx.recv() => return Ok(target),
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    log::debug!("Callback connection from {}", peer);

                    let tx = tx.clone();
                    let callback_path = callback_path.to_string();
                    tokio::spawn(async move {
                        let handled = tokio::time::timeout(
                            CONNECTION_TIMEOUT,
                            Self::handle_connection(stream, &callback_path),
                        )
                        .await;

                        match handled {
                            Ok(Ok(Some(target))) => {
                                let _ = tx.send(target).await;
                            }
                            Ok(Ok(None)) => {}
                            Ok(Err(e)) => log::warn!("Dropping callback connection from {}: {}", peer, e),
                            Err(_) => log::debug!("Closing idle callback connection from {}", peer),
                        }
                    });
                }
            }
        }
    }

    /// Same as [`accept_callback`](Self::accept_callback), bounded by `timeout`
    pub async fn accept_callback_within(
        &self,
        callback_path: &str,
        timeout: Duration,
    ) -> Result<String, CallbackError> {
        tokio::time::timeout(timeout, self.accept_callback(callback_path))
            .await
            .map_err(|_| CallbackError::TimedOut)?
    }

    async fn handle_connection(
        stream: TcpStream,
        callback_path: &str,
    ) -> Result<Option<String>, CallbackError> {
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half.take(MAX_REQUEST_BYTES));
        let mut first_line = String::new();
        reader.read_line(&mut first_line).await?;

        // Drain the headers so closing the socket does not reset the peer
        let mut header = String::new();
        for _ in 0..MAX_HEADER_LINES {
            header.clear();
            let read = reader.read_line(&mut header).await?;
            if read == 0 || header == "\r\n" || header == "\n" {
                break;
            }
        }

        let target = request_line()
            .captures(&first_line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        let target = match target {
            Some(target) if location_path(&target)? == callback_path => target,
            _ => {
                Self::respond(&mut write_half, "404 Not Found", "Not Found").await?;
                return Ok(None);
            }
        };

        Self::respond(&mut write_half, "200 OK", SIGNED_IN_PAGE).await?;
        Ok(Some(target))
    }

    async fn respond<W>(writer: &mut W, status: &str, body: &str) -> Result<(), CallbackError>
    where
        W: AsyncWrite + Unpin,
    {
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        writer.write_all(response.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn send(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_request_line_pattern() {
        let caps = request_line()
            .captures("GET /auth/callback?token=abc HTTP/1.1\r\n")
            .unwrap();
        assert_eq!(&caps[1], "/auth/callback?token=abc");
        assert!(request_line().captures("garbage\r\n").is_none());
    }

    #[tokio::test]
    async fn test_accepts_callback_after_unrelated_request() {
        let listener = CallbackListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let miss = send(addr, "GET /favicon.ico HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
            let hit = send(addr, "GET /auth/callback?token=tok-1 HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
            (miss, hit)
        });

        let target = listener
            .accept_callback_within("/auth/callback", Duration::from_secs(5))
            .await
            .unwrap();
        let (miss, hit) = client.await.unwrap();

        assert_eq!(target, "/auth/callback?token=tok-1");
        assert!(miss.starts_with("HTTP/1.1 404"));
        assert!(hit.starts_with("HTTP/1.1 200"));
        assert!(hit.contains("Signing you in"));
    }

    #[tokio::test]
    async fn test_times_out_without_callback() {
        let listener = CallbackListener::bind("127.0.0.1:0").await.unwrap();
        let result = listener
            .accept_callback_within("/auth/callback", Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(CallbackError::TimedOut)));
    }

    #[tokio::test]
    async fn test_redirect_url() {
        let listener = CallbackListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert_eq!(
            listener.redirect_url("/auth/callback").unwrap(),
            format!("http://127.0.0.1:{}/auth/callback", port)
        );
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_callback() {
        let listener = CallbackListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            // Opened first and never written to, like a browser's spare socket
            let idle = TcpStream::connect(addr).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
            let hit = send(addr, "GET /auth/callback?token=tok HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
            drop(idle);
            hit
        });

        let target = listener
            .accept_callback_within("/auth/callback", Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(target, "/auth/callback?token=tok");
        assert!(client.await.unwrap().starts_with("HTTP/1.1 200"));
    }

    #[tokio::test]
    async fn test_request_without_newline_is_capped() {
        let listener = CallbackListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            // No newline in sight; the server stops reading at its cap and
            // may reset the socket, so errors here are expected
            let mut flood = TcpStream::connect(addr).await.unwrap();
            let _ = flood.write_all("a".repeat(64 * 1024).as_bytes()).await;
            let mut ignored = Vec::new();
            let _ = flood.read_to_end(&mut ignored).await;

            send(addr, "GET /auth/callback?token=ok HTTP/1.1\r\n\r\n").await
        });

        let target = listener
            .accept_callback_within("/auth/callback", Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(target, "/auth/callback?token=ok");
        assert!(client.await.unwrap().starts_with("HTTP/1.1 200"));
    }
}
