//! State-transition broadcaster.
//!
//! Serializes a signed transition, hands it to the network and waits for the
//! verdict. A rejection becomes a [`StateTransitionBroadcastError`] carrying
//! the network's `code` and `log` unchanged. Nothing is retried.
//!
//! [`StateTransitionBroadcastError`]: crate::error::StateTransitionBroadcastError

use std::sync::Arc;

use tracing::{debug, info, warn};

use assetlock_common::{sha256d, ProtocolError, StateTransition, TransitionHash};

use crate::error::Result;
use crate::network::{PlatformNetwork, StateTransitionOutcome};
use crate::pipeline::{BroadcastReceipt, Submitted};

pub struct StateTransitionBroadcaster<N: ?Sized> {
    network: Arc<N>,
}

impl<N: ?Sized> Clone for StateTransitionBroadcaster<N> {
    fn clone(&self) -> Self {
        Self {
            network: Arc::clone(&self.network),
        }
    }
}

impl<N: PlatformNetwork + ?Sized> StateTransitionBroadcaster<N> {
    pub fn new(network: Arc<N>) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    /// Serialize and broadcast. Unsigned transitions never leave the process.
    pub async fn send(&self, transition: StateTransition) -> Result<Submitted> {
        if !transition.is_signed() {
            return Err(ProtocolError::MissingSignature.into());
        }

        let bytes = transition.to_bytes()?;
        let hash = TransitionHash(sha256d(&bytes));
        debug!(
            kind = %transition.transition_type(),
            %hash,
            size = bytes.len(),
            "broadcasting state transition"
        );

        self.network.broadcast_state_transition(&bytes).await?;

        Ok(Submitted { transition, hash })
    }

    /// Wait for the verdict on a sent transition.
    pub async fn confirm(&self, submitted: Submitted) -> Result<BroadcastReceipt> {
        let response = self
            .network
            .wait_for_state_transition_result(&submitted.hash)
            .await?;

        let outcome = StateTransitionOutcome::try_from(response)?;
        let stage = outcome.stage();
        match outcome.into_result() {
            Ok(proof) => {
                info!(
                    kind = %submitted.transition.transition_type(),
                    hash = %submitted.hash,
                    %stage,
                    "state transition confirmed"
                );
                Ok(BroadcastReceipt {
                    transition_hash: submitted.hash,
                    proof,
                })
            }
            Err(rejection) => {
                warn!(
                    kind = %submitted.transition.transition_type(),
                    hash = %submitted.hash,
                    %stage,
                    code = rejection.code,
                    log = %rejection.message,
                    "state transition rejected"
                );
                Err(rejection.into())
            }
        }
    }

    /// [`send`](Self::send) then [`confirm`](Self::confirm).
    #[tracing::instrument(skip_all, fields(kind = %transition.transition_type()))]
    pub async fn submit(&self, transition: StateTransition) -> Result<BroadcastReceipt> {
        let submitted = self.send(transition).await?;
        self.confirm(submitted).await
    }
}
