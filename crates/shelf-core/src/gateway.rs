//! Network gateway
//!
//! Every backend call goes through the [`Backend`] trait. Implementations
//! are fail-soft: transport errors, timeouts, non-2xx statuses, malformed
//! payloads and `success: false` all collapse into the call's single
//! failure value (`None` or `false`). Callers never see the cause.
//!
//! [`HttpGateway`] is the blocking HTTP implementation. Mutations use the
//! mutation timeout; every other call uses the read timeout.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{GatewayError, GatewayResult};
use crate::models::BookEntry;
use crate::session::Credentials;
use crate::wire::{
    decode_entries, AddBookRequest, AuthRequest, AuthResponse, CatalogDoc, CatalogResponse,
    LibraryBook, LibraryRequest, LibraryResponse, MutationResponse, RawBook, RemoveBookRequest,
};

/// Successful login or registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthReply {
    pub user_id: String,
    pub message: Option<String>,
}

/// Backend calls made by the client
pub trait Backend {
    fn login(&self, username: &str, password: &str) -> Option<AuthReply>;

    fn register(&self, username: &str, password: &str) -> Option<AuthReply>;

    /// Public catalog search. `None` on failure, distinct from no results.
    fn search_catalog(&self, query: &str) -> Option<Vec<RawBook>>;

    /// Personal library search. An empty query returns the whole library.
    fn search_library(&self, credentials: &Credentials, query: &str) -> Option<Vec<RawBook>>;

    fn add_book(&self, credentials: &Credentials, book: &BookEntry) -> bool;

    fn remove_book(&self, credentials: &Credentials, key: &str) -> bool;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn login(&self, username: &str, password: &str) -> Option<AuthReply> {
        (**self).login(username, password)
    }

    fn register(&self, username: &str, password: &str) -> Option<AuthReply> {
        (**self).register(username, password)
    }

    fn search_catalog(&self, query: &str) -> Option<Vec<RawBook>> {
        (**self).search_catalog(query)
    }

    fn search_library(&self, credentials: &Credentials, query: &str) -> Option<Vec<RawBook>> {
        (**self).search_library(credentials, query)
    }

    fn add_book(&self, credentials: &Credentials, book: &BookEntry) -> bool {
        (**self).add_book(credentials, book)
    }

    fn remove_book(&self, credentials: &Credentials, key: &str) -> bool {
        (**self).remove_book(credentials, key)
    }
}

/// Blocking HTTP backend
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    backend_url: String,
    catalog_url: String,
    read_timeout: Duration,
    mutation_timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway from configuration
    pub fn new(config: &Config) -> GatewayResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GatewayError::Client)?;

        let mut backend_url = config.backend_url.clone();
        if !backend_url.ends_with('/') {
            backend_url.push('/');
        }

        Ok(Self {
            client,
            backend_url,
            catalog_url: config.catalog_url.clone(),
            read_timeout: config.read_timeout(),
            mutation_timeout: config.mutation_timeout(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
        timeout: Duration,
    ) -> GatewayResult<Resp> {
        let url = self.endpoint(path);
        let request = self.client.post(&url).json(body).timeout(timeout);
        send(path, request)
    }

    fn authenticate(&self, path: &str, username: &str, password: &str) -> GatewayResult<AuthReply> {
        let response: AuthResponse = self.post(
            path,
            &AuthRequest { username, password },
            self.read_timeout,
        )?;

        match (response.success, response.userid) {
            (true, Some(user_id)) => Ok(AuthReply {
                user_id: user_id.0,
                message: response.message,
            }),
            // success without a user id cannot be used for later calls
            (true, None) => Err(GatewayError::rejected(
                path,
                Some("response has no user id".to_string()),
            )),
            (false, _) => Err(GatewayError::rejected(path, response.message)),
        }
    }

    fn fetch_catalog(&self, query: &str) -> GatewayResult<Vec<RawBook>> {
        let request = self
            .client
            .get(&self.catalog_url)
            .query(&[("q", query)])
            .timeout(self.read_timeout);
        let response: CatalogResponse = send("catalog", request)?;

        Ok(decode_entries::<CatalogDoc>(response.docs)
            .into_iter()
            .map(RawBook::Catalog)
            .collect())
    }

    fn fetch_library(&self, credentials: &Credentials, query: &str) -> GatewayResult<Vec<RawBook>> {
        let body = LibraryRequest {
            userid: credentials.user_id(),
            password: credentials.password(),
            query,
        };
        let response: LibraryResponse = self.post("lib", &body, self.read_timeout)?;
        if !response.success {
            return Err(GatewayError::rejected("lib", response.message));
        }

        Ok(decode_entries::<LibraryBook>(response.books)
            .into_iter()
            .map(RawBook::Library)
            .collect())
    }

    fn mutate<Req: Serialize>(&self, path: &str, body: &Req) -> GatewayResult<()> {
        let response: MutationResponse = self.post(path, body, self.mutation_timeout)?;
        if response.success {
            Ok(())
        } else {
            Err(GatewayError::rejected(path, response.message))
        }
    }
}

impl Backend for HttpGateway {
    fn login(&self, username: &str, password: &str) -> Option<AuthReply> {
        collapse("login", self.authenticate("login", username, password))
    }

    fn register(&self, username: &str, password: &str) -> Option<AuthReply> {
        collapse("register", self.authenticate("register", username, password))
    }

    fn search_catalog(&self, query: &str) -> Option<Vec<RawBook>> {
        collapse("catalog", self.fetch_catalog(query))
    }

    fn search_library(&self, credentials: &Credentials, query: &str) -> Option<Vec<RawBook>> {
        collapse("lib", self.fetch_library(credentials, query))
    }

    fn add_book(&self, credentials: &Credentials, book: &BookEntry) -> bool {
        let body = AddBookRequest {
            userid: credentials.user_id(),
            password: credentials.password(),
            cover_i: book.cover_id(),
            first_year_publish: book.year(),
            key: book.key(),
            language: book.language(),
            title: book.title(),
        };
        collapse("lib/addbook", self.mutate("lib/addbook", &body)).is_some()
    }

    fn remove_book(&self, credentials: &Credentials, key: &str) -> bool {
        let body = RemoveBookRequest {
            userid: credentials.user_id(),
            password: credentials.password(),
            key,
        };
        collapse("lib/removebook", self.mutate("lib/removebook", &body)).is_some()
    }
}

/// Send a request and decode a 2xx JSON body
fn send<Resp: DeserializeOwned>(endpoint: &str, request: RequestBuilder) -> GatewayResult<Resp> {
    let transport = |source| GatewayError::Transport {
        endpoint: endpoint.to_string(),
        source,
    };

    let response = request.send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }

    let body = response.bytes().map_err(transport)?;
    serde_json::from_slice(&body).map_err(|source| GatewayError::Malformed {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Log the cause and reduce to the call's failure value
fn collapse<T>(call: &str, result: GatewayResult<T>) -> Option<T> {
    match result {
        Ok(value) => {
            debug!("Backend call '{}' succeeded", call);
            Some(value)
        }
        Err(e) if e.is_transport() => {
            warn!("Backend call '{}' failed: {}", call, e);
            None
        }
        Err(e) => {
            debug!("Backend call '{}' was refused: {}", call, e);
            None
        }
    }
}
