// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Getting files off of servers.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    time::Duration,
};

use log::debug;
use serde::{Deserialize, Serialize};

use super::IonexError;

const REQUEST_TIMEOUT_SECONDS: u64 = 120;

/// Puts the file at a URL onto disk.
pub trait IonexFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), IonexError>;
}

/// Proxy settings for [`HttpFetcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub server: String,
    pub port: Option<u16>,
    /// The proxy's URL scheme, e.g. "http" or "socks5". Defaults to "http".
    #[serde(rename = "type")]
    pub proxy_type: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl ProxyConfig {
    pub(crate) fn url(&self) -> String {
        let server = match self.server.split_once("://") {
            Some((_, rest)) => rest,
            None => self.server.as_str(),
        };
        let scheme = match (self.proxy_type.as_deref(), self.server.split_once("://")) {
            (Some(t), _) => t,
            (None, Some((scheme, _))) => scheme,
            (None, None) => "http",
        };
        match self.port {
            Some(port) => format!("{scheme}://{server}:{port}"),
            None => format!("{scheme}://{server}"),
        }
    }
}

/// Fetches over HTTP(S) with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(proxy: Option<&ProxyConfig>) -> Result<HttpFetcher, IonexError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(concat!("lofar-steps/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = proxy {
            let url = proxy.url();
            debug!("Using proxy {url}");
            let mut p = reqwest::Proxy::all(&url)
                .map_err(|err| IonexError::Proxy { proxy: url, err })?;
            if let Some(user) = proxy.user.as_deref() {
                p = p.basic_auth(user, proxy.pass.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(p);
        }
        let client = builder.build().map_err(IonexError::Client)?;
        Ok(HttpFetcher { client })
    }
}

impl IonexFetcher for HttpFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), IonexError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(IonexError::UnsupportedScheme(url.to_string()));
        }

        let http_err = |err| IonexError::Http {
            url: url.to_string(),
            err,
        };
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;

        // The destination only appears once the transfer is complete.
        let partial = destination.with_extension("part");
        let write_err = |err| IonexError::Write {
            path: partial.clone(),
            err,
        };
        let mut file = BufWriter::new(File::create(&partial).map_err(write_err)?);
        let num_bytes = response.copy_to(&mut file).map_err(|err| {
            let _ = std::fs::remove_file(&partial);
            http_err(err)
        })?;
        file.flush().map_err(write_err)?;
        drop(file);
        std::fs::rename(&partial, destination).map_err(|err| IonexError::Write {
            path: destination.to_path_buf(),
            err,
        })?;
        debug!("Wrote {num_bytes} bytes to {}", destination.display());
        Ok(())
    }
}
