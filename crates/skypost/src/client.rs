//! The API client: login, profile lookup and posting.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::Result;
use crate::auth::{AccessToken, AuthSession, Credentials, RefreshToken};
use crate::codec;
use crate::config::ClientConfig;
use crate::error::{Error, InvalidInputError, StoreError, TransportError};
use crate::model::{PostDraft, Profile};
use crate::store::{self, CredentialStore, StoredSession};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::xrpc::{
    CREATE_RECORD, CREATE_SESSION, CreateRecordRequest, CreateSessionRequest,
    CreateSessionResponse, GET_PROFILE, POST_COLLECTION, REFRESH_SESSION, RefreshSessionResponse,
    XrpcErrorResponse,
};

/// A client for one user's session against one service.
///
/// Construct it once and share it (behind an `Arc`) with everything that
/// needs to talk to the service. The credential store is the only session
/// state: each authenticated call reads the session from it, and login,
/// refresh and logout replace it as a unit under an internal guard.
///
/// # Example
///
/// ```no_run
/// use skypost::{ApiClient, ClientConfig, Credentials, MemoryStore};
///
/// # async fn example() -> Result<(), skypost::Error> {
/// let client = ApiClient::connect(ClientConfig::default(), MemoryStore::new())?;
/// let session = client
///     .authenticate(Credentials::new("alice.bsky.social", "app-password"))
///     .await?;
///
/// let profile = client.fetch_profile(session.handle()).await?;
/// println!("Logged in as {}", profile.name());
///
/// client.create_post("hello from skypost").await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient<T, S> {
    config: ClientConfig,
    transport: T,
    store: Mutex<S>,
    cancel: CancellationToken,
}

impl<S: CredentialStore> ApiClient<HttpTransport, S> {
    /// Create a client that talks HTTP through reqwest.
    pub fn connect(config: ClientConfig, store: S) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::new(config, transport, store))
    }
}

impl<T: Transport, S: CredentialStore> ApiClient<T, S> {
    /// Create a client from its collaborators.
    pub fn new(config: ClientConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport,
            store: Mutex::new(store),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a handle that cancels this client's requests.
    ///
    /// Once cancelled, in-flight and later calls fail with
    /// [`Error::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run `f` with exclusive access to the credential store.
    ///
    /// Session writes by the client hold the same guard, so `f` never
    /// observes a half-written session.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R> {
        let mut guard = self.store.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut *guard))
    }

    /// Returns the stored session, if it was issued by the configured
    /// service.
    pub fn current_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.stored_session()?.map(|stored| stored.session))
    }

    /// True when the credential store holds a complete session.
    pub fn is_logged_in(&self) -> Result<bool> {
        Ok(self.current_session()?.is_some())
    }

    /// Log in with `com.atproto.server.createSession` and persist the session.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the identifier or password is empty; no
    ///   request is made.
    /// - [`Error::AuthenticationFailed`] on a non-2xx response; the stored
    ///   session is left untouched.
    #[instrument(skip(self, credentials), fields(service = %self.config.service, identifier = %credentials.identifier()))]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<AuthSession> {
        if credentials.identifier().trim().is_empty() {
            return Err(InvalidInputError::Empty { field: "identifier" }.into());
        }
        if credentials.password().is_empty() {
            return Err(InvalidInputError::Empty { field: "password" }.into());
        }

        info!("Creating new session");

        let body = codec::encode(&CreateSessionRequest {
            identifier: credentials.identifier(),
            password: credentials.password(),
        })?;
        let request = HttpRequest::post(self.config.service.xrpc_url(CREATE_SESSION), Some(body));

        let response = self.dispatch(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "Login rejected");
            return Err(Error::AuthenticationFailed {
                status: response.status,
                message: server_message(&response),
            });
        }

        let response: CreateSessionResponse = codec::decode(&response.body, "session")?;
        let stored = StoredSession {
            session: AuthSession::new(
                AccessToken::new(response.access_jwt),
                response.did,
                response.handle,
                self.config.service.clone(),
            ),
            refresh_token: response.refresh_jwt.map(RefreshToken::new),
        };
        self.with_store(|store| store::save_session(store, &stored))??;

        debug!(did = %stored.session.user_id(), "Session created successfully");
        Ok(stored.session)
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// Never called implicitly; callers decide when a session is stale.
    #[instrument(skip(self), fields(service = %self.config.service))]
    pub async fn refresh_session(&self) -> Result<AuthSession> {
        let stored = self.require_session()?;
        let refresh_token = stored.refresh_token.ok_or(Error::NotAuthenticated)?;

        info!(did = %stored.session.user_id(), "Refreshing session");

        let request = HttpRequest::post(self.config.service.xrpc_url(REFRESH_SESSION), None)
            .bearer(refresh_token.as_str());

        let response = self.dispatch(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "Refresh rejected");
            return Err(Error::AuthenticationFailed {
                status: response.status,
                message: server_message(&response),
            });
        }

        let response: RefreshSessionResponse = codec::decode(&response.body, "session")?;
        let stored = StoredSession {
            session: AuthSession::new(
                AccessToken::new(response.access_jwt),
                response.did,
                response.handle,
                self.config.service.clone(),
            ),
            refresh_token: Some(RefreshToken::new(response.refresh_jwt)),
        };
        self.with_store(|store| store::save_session(store, &stored))??;

        debug!("Session refreshed successfully");
        Ok(stored.session)
    }

    /// Forget the stored session.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.with_store(|store| store::clear_session(store))??;
        info!("Logged out");
        Ok(())
    }

    /// Fetch a profile with `app.bsky.actor.getProfile`.
    ///
    /// `actor` is a handle or DID. Transient network failures are retried
    /// according to [`ClientConfig::retry`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] without a stored session; no request is
    ///   made.
    /// - [`Error::ProfileFetchFailed`] on a non-2xx response.
    /// - [`Error::Decode`] if `did` or `handle` is missing from the response.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self, actor: &str) -> Result<Profile> {
        let stored = self.require_session()?;
        if actor.trim().is_empty() {
            return Err(InvalidInputError::Empty { field: "actor" }.into());
        }

        let token = stored.session.access_token();
        let policy = self.config.retry;
        let mut retry = 0;
        loop {
            match self.fetch_profile_once(actor, token).await {
                Err(e) if e.is_transient() && retry < policy.max_retries => {
                    retry += 1;
                    let delay = policy.backoff(retry);
                    warn!(error = %e, retry, delay_ms = delay.as_millis() as u64, "Profile fetch failed, retrying");
                    tokio::select! {
                        _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                result => return result,
            }
        }
    }

    async fn fetch_profile_once(&self, actor: &str, token: &AccessToken) -> Result<Profile> {
        let request = HttpRequest::get(self.config.service.xrpc_url(GET_PROFILE))
            .query("actor", actor)
            .bearer(token.as_str());

        let response = self.dispatch(request).await?;
        if !response.is_success() {
            return Err(Error::ProfileFetchFailed {
                status: response.status,
            });
        }

        Ok(codec::decode(&response.body, "profile")?)
    }

    /// Publish a text post to the logged-in user's feed.
    ///
    /// The post is stamped with the current time. It is sent exactly once.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAuthenticated`] without a stored session, and
    ///   [`Error::InvalidInput`] for blank text; no request is made in
    ///   either case.
    /// - [`Error::PostFailed`] on a non-2xx response.
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn create_post(&self, text: &str) -> Result<()> {
        let stored = self.require_session()?;
        if text.trim().is_empty() {
            return Err(InvalidInputError::Empty { field: "text" }.into());
        }

        let draft = PostDraft::new(text, stored.session.user_id().clone());
        let body = codec::encode(&CreateRecordRequest {
            repo: draft.author_id.as_str(),
            collection: POST_COLLECTION,
            record: draft.record(),
        })?;
        let request = HttpRequest::post(self.config.service.xrpc_url(CREATE_RECORD), Some(body))
            .bearer(stored.session.access_token().as_str());

        let response = self.dispatch(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "Post rejected");
            return Err(Error::PostFailed {
                status: response.status,
            });
        }

        debug!(created_at = %draft.created_at_rfc3339(), "Post created");
        Ok(())
    }

    fn require_session(&self) -> Result<StoredSession> {
        self.stored_session()?.ok_or(Error::NotAuthenticated)
    }

    /// The stored session, unless it belongs to another service. Its tokens
    /// must never be sent anywhere else.
    fn stored_session(&self) -> Result<Option<StoredSession>> {
        let stored = self.with_store(|store| store::load_session(&*store))??;
        Ok(stored.filter(|stored| {
            let issuer = stored.session.service();
            if issuer != &self.config.service {
                debug!(%issuer, service = %self.config.service, "Stored session belongs to another service");
                return false;
            }
            true
        }))
    }

    /// Send one request, bounded by the configured timeout and the
    /// cancellation token.
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        debug!(method = %request.method, url = %request.url, "XRPC request");

        let timeout = self.config.timeout;
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = tokio::time::timeout(timeout, self.transport.send(request)) => match result {
                Ok(response) => response?,
                Err(_) => {
                    return Err(TransportError::Timeout {
                        duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    }
                    .into());
                }
            },
        };

        trace!(status = response.status, body = %codec::redacted(&response.body), "XRPC response");
        Ok(response)
    }
}

/// The server's explanation for a failed call, if it sent one.
fn server_message(response: &HttpResponse) -> Option<String> {
    codec::decode::<XrpcErrorResponse>(&response.body, "error")
        .ok()
        .and_then(|body| body.message.or(body.error))
}
