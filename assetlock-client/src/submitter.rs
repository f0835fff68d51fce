//! Document-batch and data-contract-create broadcasts.
//!
//! These transitions carry no asset lock. They are signed with key 0 of the
//! acting identity and go through the shared broadcaster. Nothing local is
//! mutated, on success or failure.

use std::sync::Arc;

use tracing::info;

use assetlock_common::{
    DataContract, Document, DocumentTransition, Identity, IdentitySigner, StateTransition,
};

use crate::broadcaster::StateTransitionBroadcaster;
use crate::error::{PlatformError, Result, UnauthorizedSignerError};
use crate::network::PlatformNetwork;
use crate::pipeline::BroadcastReceipt;
use crate::wallet::WalletAccount;

const SIGNING_KEY_ID: u32 = 0;

/// Documents to create, replace and delete in one transition.
#[derive(Clone, Debug, Default)]
pub struct DocumentsBatch {
    pub create: Vec<Document>,
    pub replace: Vec<Document>,
    pub delete: Vec<Document>,
}

impl DocumentsBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(mut self, document: Document) -> Self {
        self.create.push(document);
        self
    }

    pub fn replace(mut self, document: Document) -> Self {
        self.replace.push(document);
        self
    }

    pub fn delete(mut self, document: Document) -> Self {
        self.delete.push(document);
        self
    }

    pub fn len(&self) -> usize {
        self.create.len() + self.replace.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn documents(&self) -> impl Iterator<Item = &Document> {
        self.create.iter().chain(&self.replace).chain(&self.delete)
    }

    /// Creates first, then replaces, then deletes.
    pub fn into_transitions(self) -> Vec<DocumentTransition> {
        let creates = self.create.into_iter().map(DocumentTransition::Create);
        let replaces = self.replace.into_iter().map(|mut d| {
            d.revision = d.revision.saturating_add(1);
            DocumentTransition::Replace(d)
        });
        let deletes = self.delete.into_iter().map(|d| DocumentTransition::Delete {
            id: d.id,
            document_type: d.document_type,
            data_contract_id: d.data_contract_id,
        });
        creates.chain(replaces).chain(deletes).collect()
    }
}

pub struct DocumentAndContractSubmitter<N: ?Sized> {
    broadcaster: StateTransitionBroadcaster<N>,
}

impl<N: PlatformNetwork + ?Sized> DocumentAndContractSubmitter<N> {
    pub fn new(network: Arc<N>) -> Self {
        Self::with_broadcaster(StateTransitionBroadcaster::new(network))
    }

    pub fn with_broadcaster(broadcaster: StateTransitionBroadcaster<N>) -> Self {
        Self { broadcaster }
    }

    /// Sign and broadcast `batch` on behalf of `identity`.
    #[tracing::instrument(skip_all, fields(identity_id = %identity.id, documents = batch.len()))]
    pub async fn broadcast_documents<A>(
        &self,
        account: &A,
        batch: DocumentsBatch,
        identity: &Identity,
    ) -> Result<BroadcastReceipt>
    where
        A: WalletAccount + ?Sized,
    {
        if batch.is_empty() {
            return Err(PlatformError::InvalidInput("documents batch is empty".into()));
        }
        if let Some(foreign) = batch.documents().find(|d| d.owner_id != identity.id) {
            return Err(UnauthorizedSignerError::new(
                identity.id,
                format!("document {} is owned by {}", foreign.id, foreign.owner_id),
            )
            .into());
        }

        let signer = self.signer_for(account, identity)?;
        let mut transition = StateTransition::documents_batch(identity.id, batch.into_transitions());
        self.sign(&mut transition, &signer, identity)?;

        let receipt = self.broadcaster.submit(transition).await?;
        info!(identity_id = %identity.id, "documents batch confirmed");
        Ok(receipt)
    }

    /// Sign and broadcast the creation of `contract` on behalf of `identity`.
    #[tracing::instrument(skip_all, fields(identity_id = %identity.id, contract_id = %contract.id))]
    pub async fn broadcast_contract<A>(
        &self,
        account: &A,
        contract: DataContract,
        identity: &Identity,
    ) -> Result<BroadcastReceipt>
    where
        A: WalletAccount + ?Sized,
    {
        if contract.owner_id != identity.id {
            return Err(UnauthorizedSignerError::new(
                identity.id,
                format!("contract {} is owned by {}", contract.id, contract.owner_id),
            )
            .into());
        }

        let signer = self.signer_for(account, identity)?;
        let contract_id = contract.id;
        let mut transition = StateTransition::data_contract_create(contract);
        self.sign(&mut transition, &signer, identity)?;

        let receipt = self.broadcaster.submit(transition).await?;
        info!(identity_id = %identity.id, %contract_id, "data contract confirmed");
        Ok(receipt)
    }

    /// Key-0 signer of `identity`, checked against the key the identity
    /// registered.
    fn signer_for<A>(&self, account: &A, identity: &Identity) -> Result<IdentitySigner>
    where
        A: WalletAccount + ?Sized,
    {
        let index = account.identity_index(&identity.id).ok_or_else(|| {
            UnauthorizedSignerError::new(identity.id, "identity is not held by this account")
        })?;
        let registered = identity.public_key_by_id(SIGNING_KEY_ID).ok_or_else(|| {
            UnauthorizedSignerError::new(identity.id, "identity has no key 0")
        })?;
        let signer = account.identity_signer(index, SIGNING_KEY_ID)?;
        if signer.identity_public_key().data != registered.data {
            return Err(UnauthorizedSignerError::new(
                identity.id,
                "key 0 does not match the account's derived key",
            )
            .into());
        }
        Ok(signer)
    }

    fn sign(
        &self,
        transition: &mut StateTransition,
        signer: &IdentitySigner,
        identity: &Identity,
    ) -> Result<()> {
        transition.sign(signer)?;
        if let Some(key) = identity.public_key_by_id(SIGNING_KEY_ID) {
            transition.verify_signature(key)?;
        }
        Ok(())
    }
}
