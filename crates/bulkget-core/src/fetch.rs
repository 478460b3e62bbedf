//! HTTP GET transport.
//!
//! [`Transport`] is the seam between a worker and the network: it performs
//! one GET and streams the body into a caller-supplied writer. [`CurlTransport`]
//! is the production implementation, one blocking Easy handle per request.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::FetchError;

/// Maximum redirects followed when redirects are enabled.
const MAX_REDIRECTS: u32 = 10;

/// Performs a single GET, writing the response body to `sink` as it arrives.
///
/// Returns the final HTTP status code. The status is not interpreted: a 404
/// body is streamed to `sink` like any other.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, sink: &mut dyn Write) -> Result<u32, FetchError>;
}

/// libcurl-backed transport.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    http: HttpConfig,
}

impl CurlTransport {
    pub fn new(http: HttpConfig) -> Self {
        Self { http }
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.follow_location(self.http.follow_redirects)?;
        if self.http.follow_redirects {
            easy.max_redirections(MAX_REDIRECTS)?;
        }
        if let Some(secs) = self.http.connect_timeout_secs {
            easy.connect_timeout(Duration::from_secs(secs))?;
        }
        easy.useragent(&self.http.user_agent)?;
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &str, sink: &mut dyn Write) -> Result<u32, FetchError> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url).map_err(FetchError::Setup)?;

        let mut sink_error: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match sink.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error = Some(e);
                        // Short count makes libcurl abort the transfer.
                        Ok(0)
                    }
                })
                .map_err(FetchError::Setup)?;
            transfer.perform()
        };

        if let Some(e) = sink_error {
            return Err(FetchError::Sink(e));
        }
        performed.map_err(FetchError::Transport)?;
        easy.response_code().map_err(FetchError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let transport = CurlTransport::default();
        let mut body = Vec::new();
        let err = transport
            .get(&format!("http://127.0.0.1:{}/a.txt", port), &mut body)
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
        assert!(body.is_empty());
    }

    #[test]
    fn unsupported_scheme_is_a_transport_error() {
        let transport = CurlTransport::default();
        let mut body = Vec::new();
        let err = transport.get("nosuchscheme://x/a.txt", &mut body).unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
    }
}
