//! Client facade.

use std::sync::Arc;

use assetlock_common::{DataContract, Identifier, Identity};

use crate::broadcaster::StateTransitionBroadcaster;
use crate::config::{ClientConfig, Network};
use crate::error::{ClientError, Result, TransportError};
use crate::identities::IdentityLifecycleOrchestrator;
use crate::network::PlatformNetwork;
use crate::pipeline::BroadcastReceipt;
use crate::submitter::{DocumentAndContractSubmitter, DocumentsBatch};
use crate::wallet::{InMemoryAccount, WalletAccount};

/// Entry point bundling configuration, network and the pipeline components.
pub struct Client<N: ?Sized> {
    config: ClientConfig,
    network: Arc<N>,
    identities: IdentityLifecycleOrchestrator<N>,
    documents: DocumentAndContractSubmitter<N>,
}

impl<N: PlatformNetwork + ?Sized> Client<N> {
    /// Fails if the wallet options name a network other than the client's.
    pub fn new(config: ClientConfig, network: Arc<N>) -> Result<Self, ClientError> {
        if let Some(wallet_network) = config.wallet.as_ref().and_then(|w| w.network) {
            if wallet_network != config.network {
                return Err(ClientError::NetworkMismatch);
            }
        }

        let broadcaster = StateTransitionBroadcaster::new(Arc::clone(&network));
        let identities = IdentityLifecycleOrchestrator::with_broadcaster(
            broadcaster.clone(),
            config.funding.clone(),
        );
        let documents = DocumentAndContractSubmitter::with_broadcaster(broadcaster);

        tracing::debug!(
            network = %config.network,
            wallet = config.wallet.is_some(),
            "client created"
        );
        Ok(Self {
            config,
            network,
            identities,
            documents,
        })
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_wallet(&self) -> bool {
        self.config.wallet.is_some()
    }

    /// Account derived from the configured seed phrase.
    pub fn wallet_account(&self) -> Result<InMemoryAccount, ClientError> {
        let wallet = self
            .config
            .wallet
            .as_ref()
            .ok_or(ClientError::WalletNotConfigured)?;
        Ok(InMemoryAccount::from_seed_phrase(
            &wallet.seed_phrase,
            wallet.network.unwrap_or(self.config.network),
        ))
    }

    pub fn identities(&self) -> &IdentityLifecycleOrchestrator<N> {
        &self.identities
    }

    pub fn documents(&self) -> &DocumentAndContractSubmitter<N> {
        &self.documents
    }

    fn check_account<A: WalletAccount + ?Sized>(&self, account: &A) -> Result<(), ClientError> {
        if account.network() != self.config.network {
            return Err(ClientError::NetworkMismatch);
        }
        Ok(())
    }

    pub async fn register_identity<A>(&self, account: &mut A) -> Result<Identity>
    where
        A: WalletAccount + ?Sized,
    {
        self.check_account(account)?;
        self.identities.register_identity(account).await
    }

    pub async fn top_up<A>(
        &self,
        account: &mut A,
        identity_id: Identifier,
        amount: u64,
    ) -> Result<BroadcastReceipt>
    where
        A: WalletAccount + ?Sized,
    {
        self.check_account(account)?;
        self.identities.top_up(account, identity_id, amount).await
    }

    pub async fn broadcast_documents<A>(
        &self,
        account: &A,
        batch: DocumentsBatch,
        identity: &Identity,
    ) -> Result<BroadcastReceipt>
    where
        A: WalletAccount + ?Sized,
    {
        self.check_account(account)?;
        self.documents.broadcast_documents(account, batch, identity).await
    }

    pub async fn broadcast_contract<A>(
        &self,
        account: &A,
        contract: DataContract,
        identity: &Identity,
    ) -> Result<BroadcastReceipt>
    where
        A: WalletAccount + ?Sized,
    {
        self.check_account(account)?;
        self.documents.broadcast_contract(account, contract, identity).await
    }

    /// Fetch and decode an identity.
    pub async fn get_identity(&self, id: &Identifier) -> Result<Identity> {
        let bytes = self.network.get_identity(id).await?;
        let identity = Identity::from_bytes(&bytes)?;
        if identity.id != *id {
            return Err(TransportError::MalformedResponse(format!(
                "requested identity {}, received {}",
                id, identity.id
            ))
            .into());
        }
        Ok(identity)
    }

    /// Fetch and decode a data contract.
    pub async fn get_data_contract(&self, id: &Identifier) -> Result<DataContract> {
        let bytes = self.network.get_data_contract(id).await?;
        let contract = DataContract::from_bytes(&bytes)?;
        if contract.id != *id {
            return Err(TransportError::MalformedResponse(format!(
                "requested contract {}, received {}",
                id, contract.id
            ))
            .into());
        }
        Ok(contract)
    }
}
