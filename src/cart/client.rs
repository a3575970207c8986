use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use std::thread::JoinHandle;
use std::time::Duration;

use super::Cart;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the shop's cart endpoint.
#[derive(Debug, Clone)]
pub struct CartClient {
    endpoint: Url,
    client: Client,
}

impl CartClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).with_context(|| format!("Invalid cart endpoint {endpoint}"))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Replaces the remote cart with `cart`. The response body is ignored.
    pub fn replace(&self, cart: &Cart) -> Result<()> {
        let response = self
            .client
            .put(self.endpoint.clone())
            .json(cart)
            .send()
            .with_context(|| format!("PUT {} failed", self.endpoint))?;
        response
            .error_for_status()
            .with_context(|| format!("PUT {} rejected", self.endpoint))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.replace(&Cart::empty())
    }

    /// Clears the cart on a worker thread. Failures are logged and dropped.
    pub fn clear_in_background(&self) -> JoinHandle<()> {
        let client = self.clone();
        std::thread::spawn(move || match client.clear() {
            Ok(()) => info!("Cleared cart at {}", client.endpoint),
            Err(e) => warn!("Cart clear failed: {:#}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Accepts one request, answers with `status` and hands back the raw
    /// request text.
    fn one_shot_server(status: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/cart", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let body_len = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + body_len {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-length: 12\r\nconnection: close\r\n\r\n{{\"items\":[]}}"
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        });
        (url, handle)
    }

    #[test]
    fn clear_puts_empty_item_list() {
        let (url, server) = one_shot_server("200 OK");
        let client = CartClient::new(&url).unwrap();
        client.clear().unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("PUT /cart HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"items":[]}"#));
    }

    #[test]
    fn clear_rejects_server_error() {
        let (url, server) = one_shot_server("500 Internal Server Error");
        let client = CartClient::new(&url).unwrap();
        assert!(client.clear().is_err());
        assert!(server.join().unwrap().starts_with("PUT /cart"));
    }

    #[test]
    fn unreachable_endpoint_is_logged_not_fatal() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = CartClient::new(&format!("http://127.0.0.1:{port}/cart")).unwrap();
        assert!(client.clear().is_err());
        client.clear_in_background().join().unwrap();
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(CartClient::new("not a url").is_err());
    }
}
