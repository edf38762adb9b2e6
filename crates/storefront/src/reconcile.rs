//! Guest-to-account reconciliation.
//!
//! When a shopper signs in, whatever they collected as a guest is replayed
//! into their server-side cart and wishlist exactly once:
//!
//! 1. The `(domain, email)` state moves `Pending -> Replaying`. Any other
//!    starting state means this login was already handled and the call is
//!    skipped, so a duplicate `userLogin` event cannot double quantities.
//! 2. The `guest` bucket and the shopper's own `<email>` bucket are read and
//!    merged.
//! 3. Both buckets are cleared *before* any request goes out. The local copy
//!    is consumed; from here on the server is the source of truth.
//! 4. Every entry becomes one independent "add" request. Failures are
//!    reported and logged but not retried or restored.
//!
//! [`Reconciler::reset`] puts every domain back to `Pending` on logout.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lindo_core::{CartLines, Email, ProductId, Wishlist};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::auth::Credentials;
use crate::error::add_breadcrumb;
use crate::local::LocalStore;
use crate::remote::{CartRemote, WishlistRemote};
use crate::storage::{Scope, StorageError};

/// Collection being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Cart,
    Wishlist,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cart => f.write_str("cart"),
            Self::Wishlist => f.write_str("wishlist"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Replaying,
    Done,
}

/// What one reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub domain: Domain,
    /// Entries the backend accepted.
    pub replayed: Vec<ProductId>,
    /// Entries the backend rejected. They are gone from local storage too.
    pub failed: Vec<ProductId>,
    /// This login had already been reconciled; nothing was read or sent.
    pub skipped: bool,
}

impl ReconcileReport {
    const fn new(domain: Domain) -> Self {
        Self {
            domain,
            replayed: Vec::new(),
            failed: Vec::new(),
            skipped: false,
        }
    }

    const fn skipped(domain: Domain) -> Self {
        Self {
            domain,
            replayed: Vec::new(),
            failed: Vec::new(),
            skipped: true,
        }
    }

    /// Whether every entry made it to the server.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-session reconciliation state. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct Reconciler {
    phases: Arc<Mutex<HashMap<(Domain, Email), Phase>>>,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to replay, or report that someone already did.
    async fn begin(&self, domain: Domain, email: &Email) -> bool {
        let mut phases = self.phases.lock().await;
        let phase = phases
            .entry((domain, email.clone()))
            .or_insert(Phase::Pending);
        if *phase != Phase::Pending {
            return false;
        }
        *phase = Phase::Replaying;
        true
    }

    async fn set(&self, domain: Domain, email: &Email, phase: Phase) {
        self.phases
            .lock()
            .await
            .insert((domain, email.clone()), phase);
    }

    /// Whether `domain` has finished replaying for `email` this session.
    pub async fn is_done(&self, domain: Domain, email: &Email) -> bool {
        self.phases.lock().await.get(&(domain, email.clone())) == Some(&Phase::Done)
    }

    /// Forget every login; the next one reconciles again.
    pub async fn reset(&self) {
        self.phases.lock().await.clear();
    }

    /// Replay the guest cart into the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local buckets cannot be cleared, in which
    /// case nothing was sent and the next login tries again. Remote failures
    /// are reported in [`ReconcileReport::failed`].
    #[instrument(skip(self, backend, local, auth), fields(email = %auth.email))]
    pub async fn reconcile_cart<B: CartRemote>(
        &self,
        backend: &B,
        local: &LocalStore,
        auth: &Credentials,
    ) -> Result<ReconcileReport, StorageError> {
        let email = &auth.email;
        if !self.begin(Domain::Cart, email).await {
            info!("Cart already reconciled for this login");
            return Ok(ReconcileReport::skipped(Domain::Cart));
        }

        let user_scope = auth.scope();
        let mut pending = local.get_local_cart(&Scope::Guest);
        pending.merge(local.get_local_cart(&user_scope));

        if let Err(e) = clear_cart_buckets(local, &user_scope) {
            self.set(Domain::Cart, email, Phase::Pending).await;
            return Err(e);
        }

        let report = replay_cart(backend, auth, pending).await;
        self.set(Domain::Cart, email, Phase::Done).await;
        log_report(&report);
        Ok(report)
    }

    /// Replay the guest wishlist into the server wishlist, adding only ids
    /// the server does not already have.
    ///
    /// # Errors
    ///
    /// Same as [`Reconciler::reconcile_cart`].
    #[instrument(skip(self, backend, local, auth), fields(email = %auth.email))]
    pub async fn reconcile_wishlist<B: WishlistRemote>(
        &self,
        backend: &B,
        local: &LocalStore,
        auth: &Credentials,
    ) -> Result<ReconcileReport, StorageError> {
        let email = &auth.email;
        if !self.begin(Domain::Wishlist, email).await {
            info!("Wishlist already reconciled for this login");
            return Ok(ReconcileReport::skipped(Domain::Wishlist));
        }

        let user_scope = auth.scope();
        let mut pending = local.get_local_wishlist(&Scope::Guest);
        pending.merge(local.get_local_wishlist(&user_scope));

        if let Err(e) = clear_wishlist_buckets(local, &user_scope) {
            self.set(Domain::Wishlist, email, Phase::Pending).await;
            return Err(e);
        }

        let report = replay_wishlist(backend, auth, pending).await;
        self.set(Domain::Wishlist, email, Phase::Done).await;
        log_report(&report);
        Ok(report)
    }
}

fn clear_cart_buckets(local: &LocalStore, user_scope: &Scope) -> Result<(), StorageError> {
    local.clear_local_cart(&Scope::Guest)?;
    local.clear_local_cart(user_scope)
}

fn clear_wishlist_buckets(local: &LocalStore, user_scope: &Scope) -> Result<(), StorageError> {
    local.clear_local_wishlist(&Scope::Guest)?;
    local.clear_local_wishlist(user_scope)
}

async fn replay_cart<B: CartRemote>(
    backend: &B,
    auth: &Credentials,
    pending: CartLines,
) -> ReconcileReport {
    let mut report = ReconcileReport::new(Domain::Cart);
    for item in pending {
        match backend.add_to_cart_server(auth, &item).await {
            Ok(()) => report.replayed.push(item.product_id),
            Err(e) => {
                warn!(product_id = %item.product_id, error = %e, "Failed to replay cart line");
                report.failed.push(item.product_id);
            }
        }
    }
    report
}

async fn replay_wishlist<B: WishlistRemote>(
    backend: &B,
    auth: &Credentials,
    pending: Wishlist,
) -> ReconcileReport {
    let mut report = ReconcileReport::new(Domain::Wishlist);
    if pending.is_empty() {
        return report;
    }

    let existing = match backend.fetch_user_wishlist(auth).await {
        Ok(wishlist) => wishlist,
        Err(e) => {
            warn!(error = %e, "Could not fetch server wishlist, replaying every entry");
            Wishlist::new()
        }
    };

    for product_id in pending {
        if existing.contains(&product_id) {
            continue;
        }
        match backend.add_to_wishlist_server(auth, &product_id).await {
            Ok(()) => report.replayed.push(product_id),
            Err(e) => {
                warn!(product_id = %product_id, error = %e, "Failed to replay wishlist entry");
                report.failed.push(product_id);
            }
        }
    }
    report
}

fn log_report(report: &ReconcileReport) {
    let replayed = report.replayed.len().to_string();
    let failed = report.failed.len().to_string();
    add_breadcrumb(
        "reconcile",
        &format!("Reconciled guest {}", report.domain),
        Some(&[("replayed", replayed.as_str()), ("failed", failed.as_str())]),
    );
    info!(
        domain = %report.domain,
        replayed = report.replayed.len(),
        failed = report.failed.len(),
        "Reconciled guest collection"
    );
}
