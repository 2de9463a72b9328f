//! Plain-HTTP health endpoint.
//!
//! Phones scanning the LAN probe `GET /health` and read back the address
//! the receiver is reachable on. Nothing else is served.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

/// Longest request head we bother reading.
const MAX_REQUEST: usize = 2048;

/// The address other LAN hosts reach this machine on.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface.
pub fn lan_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

fn response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Connection: close\r\n\
         \r\n\
         {body}",
        body.len()
    )
}

/// Build the reply for a request head.
pub fn route(request: &str, ip: IpAddr) -> String {
    let mut parts = request.lines().next().unwrap_or_default().split_whitespace();
    let method = parts.next();
    let path = parts.next().map(|p| p.split('?').next().unwrap_or(p));

    match (method, path) {
        (Some("GET"), Some("/health")) => {
            let body = serde_json::json!({ "ip": ip.to_string() }).to_string();
            response("200 OK", "application/json", &body)
        }
        _ => response("404 Not Found", "text/plain", "Not found"),
    }
}

async fn serve_one(mut stream: TcpStream, ip: IpAddr) -> std::io::Result<()> {
    let mut buf = vec![0u8; MAX_REQUEST];
    let mut len = 0;
    while len < buf.len() {
        let n = stream.read(&mut buf[len..]).await?;
        if n == 0 {
            break;
        }
        len += n;
        if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let request = String::from_utf8_lossy(&buf[..len]);
    stream.write_all(route(&request, ip).as_bytes()).await?;
    stream.shutdown().await
}

/// Answer health probes on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, ip: IpAddr) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, %ip, "health endpoint listening");
    }
    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(e) = serve_one(stream, ip).await {
                debug!(%peer, error = %e, "health request failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

    #[test]
    fn health_reports_the_address() {
        let reply = route("GET /health HTTP/1.1\r\nHost: desk\r\n\r\n", IP);
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(reply.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(reply.ends_with(r#"{"ip":"192.168.1.20"}"#));
    }

    #[test]
    fn query_string_is_ignored() {
        let reply = route("GET /health?t=1 HTTP/1.1\r\n\r\n", IP);
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
    }

    #[test]
    fn everything_else_is_not_found() {
        for request in [
            "GET / HTTP/1.1\r\n\r\n",
            "POST /health HTTP/1.1\r\n\r\n",
            "GET /healthz HTTP/1.1\r\n\r\n",
            "",
        ] {
            assert!(route(request, IP).starts_with("HTTP/1.1 404 Not Found"), "{request:?}");
        }
    }

    #[tokio::test]
    async fn serves_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(listener, IP));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).await.unwrap();
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
        assert!(reply.contains(r#""ip":"192.168.1.20""#));

        server.abort();
    }
}
