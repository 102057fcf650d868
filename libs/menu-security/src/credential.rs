//! Task-local slot for the delegated data-store credential.
//!
//! A request handler establishes the slot once with [`with_request_scope`],
//! then installs the caller's credential with [`begin_scope`]. Anything that
//! opens a data-store connection while the scope is active reads the value
//! through [`current`]. Dropping (or [`CredentialScope::end`]ing) the returned
//! guard restores whatever value was installed before, including when the
//! wrapped operation fails or panics.
//!
//! The slot lives in tokio task-local storage, so concurrently handled
//! requests never observe each other's credential. Tasks spawned from inside
//! a request do not inherit the slot.
//!
//! ```ignore
//! use menu_security::credential;
//!
//! credential::with_request_scope(async {
//!     let scope = credential::begin_scope(token)?;
//!     let rows = repo.list().await; // connections see `credential::current()`
//!     scope.end();
//!     rows
//! })
//! .await
//! ```

use std::cell::RefCell;
use std::future::Future;

use secrecy::SecretString;

tokio::task_local! {
    static DELEGATED_CREDENTIAL: RefCell<Option<SecretString>>;
}

/// Errors raised when the slot is used outside a request scope.
#[derive(Debug, thiserror::Error)]
pub enum CredentialScopeError {
    #[error("no request scope is active on this task")]
    NoRequestScope,
}

/// Run `fut` with a fresh, empty credential slot.
pub async fn with_request_scope<F>(fut: F) -> F::Output
where
    F: Future,
{
    DELEGATED_CREDENTIAL.scope(RefCell::new(None), fut).await
}

/// Synchronous counterpart of [`with_request_scope`].
pub fn sync_request_scope<R>(f: impl FnOnce() -> R) -> R {
    DELEGATED_CREDENTIAL.sync_scope(RefCell::new(None), f)
}

/// Install `credential` for the rest of the enclosing scope.
///
/// Passing `None` installs "no delegated credential", which makes connections
/// fall back to the service identity.
///
/// # Errors
///
/// Returns [`CredentialScopeError::NoRequestScope`] when called outside
/// [`with_request_scope`] / [`sync_request_scope`].
pub fn begin_scope(credential: Option<SecretString>) -> Result<CredentialScope, CredentialScopeError> {
    let delegated = credential.is_some();
    let previous = DELEGATED_CREDENTIAL
        .try_with(|slot| slot.replace(credential))
        .map_err(|_| CredentialScopeError::NoRequestScope)?;

    tracing::debug!(delegated, "delegated credential scope started");

    Ok(CredentialScope {
        previous: Some(previous),
    })
}

/// The credential installed on this task, if any.
///
/// Always `None` outside a request scope.
#[must_use]
pub fn current() -> Option<SecretString> {
    DELEGATED_CREDENTIAL
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Guard restoring the previously installed credential when dropped.
///
/// Guards must be released in reverse order of creation.
#[must_use = "dropping the guard immediately ends the credential scope"]
pub struct CredentialScope {
    // `None` once restored.
    previous: Option<Option<SecretString>>,
}

impl CredentialScope {
    /// End the scope explicitly. Equivalent to dropping the guard.
    pub fn end(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        let restored = DELEGATED_CREDENTIAL.try_with(|slot| {
            slot.replace(previous);
        });
        if restored.is_err() {
            tracing::warn!("credential scope outlived its request scope");
        } else {
            tracing::debug!("delegated credential scope ended");
        }
    }
}

impl Drop for CredentialScope {
    fn drop(&mut self) {
        self.restore();
    }
}

impl std::fmt::Debug for CredentialScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialScope")
            .field("active", &self.previous.is_some())
            .finish()
    }
}
