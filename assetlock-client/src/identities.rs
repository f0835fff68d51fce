//! Identity creation and top-up.
//!
//! Both operations run the same strictly ordered pipeline:
//!
//! 1. ask the account for a funding transaction
//! 2. submit it to the base layer
//! 3. wait for its instant lock
//! 4. build the asset-lock proof
//! 5. build and sign the state transition
//! 6. broadcast it and wait for the verdict
//!
//! The account commits the funding transaction once the base layer has
//! accepted it, since its inputs are spent from then on. Registration records
//! the new identity in the account only after the platform accepted the
//! transition.

use std::sync::Arc;

use tracing::{debug, info};

use assetlock_common::{AssetLockPurpose, Identifier, Identity, LockProofBuilder, StateTransition};

use crate::broadcaster::StateTransitionBroadcaster;
use crate::config::FundingConfig;
use crate::error::{Result, TransportError, UnauthorizedSignerError};
use crate::network::PlatformNetwork;
use crate::pipeline::{BroadcastReceipt, Funded, Locked};
use crate::wallet::WalletAccount;

/// Key index that signs identity transitions.
const SIGNING_KEY_ID: u32 = 0;

pub struct IdentityLifecycleOrchestrator<N: ?Sized> {
    broadcaster: StateTransitionBroadcaster<N>,
    funding: FundingConfig,
}

impl<N: PlatformNetwork + ?Sized> IdentityLifecycleOrchestrator<N> {
    pub fn new(network: Arc<N>, funding: FundingConfig) -> Self {
        Self::with_broadcaster(StateTransitionBroadcaster::new(network), funding)
    }

    pub fn with_broadcaster(
        broadcaster: StateTransitionBroadcaster<N>,
        funding: FundingConfig,
    ) -> Self {
        Self {
            broadcaster,
            funding,
        }
    }

    pub fn funding(&self) -> &FundingConfig {
        &self.funding
    }

    pub fn builder(&self, purpose: AssetLockPurpose) -> LockProofBuilder {
        let min_value = match purpose {
            AssetLockPurpose::IdentityCreate => self.funding.min_identity_create_value,
            AssetLockPurpose::IdentityTopUp => self.funding.min_top_up_value,
        };
        LockProofBuilder::new(purpose).with_min_value(min_value)
    }

    /// Steps 1 and 2: build a funding transaction and submit it. The account
    /// only commits the transaction once the node accepted it.
    pub async fn fund<A>(&self, account: &mut A, amount: u64) -> Result<Funded>
    where
        A: WalletAccount + ?Sized,
    {
        let transaction = account.create_funding_transaction(amount).await?;
        let expected = transaction.hash();

        let tx_hash = self
            .broadcaster
            .network()
            .send_transaction(&transaction.to_bytes())
            .await?;
        if tx_hash != expected {
            return Err(TransportError::MalformedResponse(format!(
                "node reported hash {} for transaction {}",
                tx_hash, expected
            ))
            .into());
        }

        account.commit_funding(&transaction);
        debug!(%tx_hash, amount, "funding transaction submitted");
        Ok(Funded {
            transaction,
            tx_hash,
        })
    }

    /// Steps 3 and 4: wait for the instant lock and build the proof.
    pub async fn lock(&self, funded: Funded, builder: &LockProofBuilder) -> Result<Locked> {
        let confirmation = self
            .broadcaster
            .network()
            .get_instant_lock(&funded.tx_hash)
            .await?;
        let proof = builder.build(funded.transaction, confirmation)?;

        debug!(
            tx_hash = %funded.tx_hash,
            output_index = proof.output_index,
            "asset lock confirmed"
        );
        Ok(Locked { proof })
    }

    /// Create a new identity funded by the account.
    ///
    /// On success the identity id is appended to the account. On any failure
    /// the account's identity set is unchanged.
    #[tracing::instrument(skip_all)]
    pub async fn register_identity<A>(&self, account: &mut A) -> Result<Identity>
    where
        A: WalletAccount + ?Sized,
    {
        let amount = self.funding.identity_registration_amount;
        let builder = self.builder(AssetLockPurpose::IdentityCreate);
        builder.check_amount(amount)?;

        let funded = self.fund(account, amount).await?;
        let locked = self.lock(funded, &builder).await?;

        let identity_index = account.next_identity_index();
        let signer = account.identity_signer(identity_index, SIGNING_KEY_ID)?;
        let public_key = signer.identity_public_key();

        let mut transition =
            StateTransition::identity_create(locked.proof, vec![public_key.clone()]);
        transition.sign(&signer)?;
        let identity_id = transition.owner_id();

        self.broadcaster.submit(transition).await?;

        account.import_identity(identity_id)?;
        info!(%identity_id, identity_index, "identity registered");

        Ok(Identity::new(identity_id, vec![public_key]))
    }

    /// Add `amount` duffs of credit to an identity held by the account.
    ///
    /// Never changes the account's identity set.
    #[tracing::instrument(skip(self, account))]
    pub async fn top_up<A>(
        &self,
        account: &mut A,
        identity_id: Identifier,
        amount: u64,
    ) -> Result<BroadcastReceipt>
    where
        A: WalletAccount + ?Sized,
    {
        let identity_index = account.identity_index(&identity_id).ok_or_else(|| {
            UnauthorizedSignerError::new(identity_id, "identity is not held by this account")
        })?;
        let builder = self.builder(AssetLockPurpose::IdentityTopUp);
        builder.check_amount(amount)?;
        let signer = account.identity_signer(identity_index, SIGNING_KEY_ID)?;

        let funded = self.fund(account, amount).await?;
        let locked = self.lock(funded, &builder).await?;

        let mut transition = StateTransition::identity_top_up(locked.proof, identity_id);
        transition.sign(&signer)?;

        let receipt = self.broadcaster.submit(transition).await?;
        info!(%identity_id, amount, "identity topped up");
        Ok(receipt)
    }
}
