use crate::SessionError;
use client::{wallet::WalletProvider, Transport};
use serde::Serialize;
use std::fmt;
use token::{ConnectedData, ServiceError, TokenService};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Wallet connection lifecycle.
///
/// `Disconnected -> Connecting -> Connected`, and back to `Disconnected`
/// from either of the other two. Nothing else is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Connected)
                | (Self::Connecting, Self::Disconnected)
                | (Self::Connected, Self::Disconnected)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Everything observers see about the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub connection: ConnectionState,
    /// Active account, only set while connected
    pub account: Option<String>,
    /// Data of the active account, cleared on every transition
    pub data: Option<ConnectedData>,
}

/// Owner of the connection state. Changes are published to subscribers.
pub struct Session {
    state: watch::Sender<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn connection(&self) -> ConnectionState {
        self.state.borrow().connection
    }

    pub fn account(&self) -> Option<String> {
        self.state.borrow().account.clone()
    }

    pub fn data(&self) -> Option<ConnectedData> {
        self.state.borrow().data.clone()
    }

    /// Mark a user-initiated connect as in progress.
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        self.transition(ConnectionState::Connecting, None)
    }

    /// Ask the wallet for account access and adopt its first account.
    ///
    /// Starts the connect itself unless [`Session::begin_connect`] already
    /// did. Any failure leaves the session disconnected.
    pub async fn connect<W: WalletProvider>(&mut self, wallet: &W) -> Result<String, SessionError> {
        if self.connection() != ConnectionState::Connecting {
            self.begin_connect()?;
        }

        let granted = match wallet.connect().await {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, "Wallet connection failed");
                self.transition(ConnectionState::Disconnected, None)?;
                return Err(SessionError::Connect(err));
            }
        };

        let Some(account) = granted.account().map(str::to_string) else {
            warn!("Wallet granted no accounts");
            self.transition(ConnectionState::Disconnected, None)?;
            return Err(SessionError::NoAccounts);
        };

        self.transition(ConnectionState::Connected, Some(account.clone()))?;
        info!(%account, chain_id = ?granted.chain_id, "Wallet connected");
        Ok(account)
    }

    /// Drop the wallet session. The local state is cleared even when the
    /// wallet reports an error.
    pub async fn disconnect<W: WalletProvider>(&mut self, wallet: &W) -> Result<(), SessionError> {
        if self.connection() == ConnectionState::Disconnected {
            return Ok(());
        }

        let result = wallet.disconnect().await;
        self.transition(ConnectionState::Disconnected, None)?;
        info!("Wallet disconnected");

        result.map_err(SessionError::Disconnect)
    }

    /// Apply an account change pushed by the wallet.
    ///
    /// `None` (or an empty account) disconnects. A new account while
    /// connected replaces the old one and drops its data.
    pub fn account_changed(&mut self, account: Option<String>) -> Result<(), SessionError> {
        let account = account.filter(|account| !account.is_empty());

        match (account, self.connection()) {
            (None, ConnectionState::Disconnected) => Ok(()),
            (None, _) => self.transition(ConnectionState::Disconnected, None),
            (Some(account), ConnectionState::Connected) => {
                self.state.send_if_modified(|state| {
                    if state.account.as_deref() == Some(account.as_str()) {
                        return false;
                    }
                    debug!(%account, "Active account changed");
                    state.account = Some(account);
                    state.data = None;
                    true
                });
                Ok(())
            }
            (Some(account), _) => self.transition(ConnectionState::Connected, Some(account)),
        }
    }

    /// Load data for the active account.
    ///
    /// Does nothing and returns `None` without an active account, so data
    /// is never loaded for a disconnected session.
    pub async fn refresh<T: Transport>(
        &mut self,
        service: &TokenService<T>,
    ) -> Result<Option<ConnectedData>, ServiceError> {
        let Some(account) = self.account() else {
            debug!("No active account, skipping refresh");
            return Ok(None);
        };

        let data = service.get_connected_data(Some(&account)).await?;
        self.state.send_modify(|state| {
            if state.account.as_deref() == Some(account.as_str()) {
                state.data = Some(data.clone());
            }
        });

        Ok(Some(data))
    }

    fn transition(
        &mut self,
        next: ConnectionState,
        account: Option<String>,
    ) -> Result<(), SessionError> {
        let from = self.connection();
        if !from.can_transition_to(next) {
            return Err(SessionError::InvalidTransition { from, to: next });
        }

        debug!(%from, to = %next, "Connection state changed");
        self.state.send_replace(SessionState {
            connection: next,
            account,
            data: None,
        });
        Ok(())
    }
}
