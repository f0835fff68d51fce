//! Base-layer objects: funding transactions and their lock confirmations.
//!
//! Both carry a hand-written raw layout. The transaction hash is the double
//! SHA-256 of that layout, so the layout must stay byte-stable.

use serde::{Deserialize, Serialize};

use crate::encoding::{ByteReader, ByteWriter};
use crate::error::ProtocolError;
use crate::hash::{sha256d, Identifier, TxHash};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPOINTS & SCRIPTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Reference to a transaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: TxHash,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: TxHash, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// `txid || vout` (little-endian), the preimage of derived identity ids.
    pub fn to_bytes(&self) -> [u8; 36] {
        let mut out = [0u8; 36];
        out[..32].copy_from_slice(self.txid.as_bytes());
        out[32..].copy_from_slice(&self.vout.to_le_bytes());
        out
    }

    /// Identifier of the identity funded by this outpoint.
    pub fn identity_id(&self) -> Identifier {
        Identifier(sha256d(&self.to_bytes()))
    }
}

const SCRIPT_P2PKH: u8 = 0x00;
const SCRIPT_ASSET_LOCK: u8 = 0x01;
const SCRIPT_OP_RETURN: u8 = 0x02;

/// Recognized output scripts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputScript {
    /// Ordinary payment to a key hash.
    PayToPubkeyHash([u8; 20]),
    /// Burns the value into platform credits for the holder of the key.
    AssetLock { credit_pubkey_hash: [u8; 20] },
    /// Unspendable data carrier.
    OpReturn(Vec<u8>),
}

impl OutputScript {
    pub fn is_asset_lock(&self) -> bool {
        matches!(self, OutputScript::AssetLock { .. })
    }

    fn write(&self, w: &mut ByteWriter) {
        match self {
            OutputScript::PayToPubkeyHash(h) => {
                w.u8(SCRIPT_P2PKH).raw(h);
            }
            OutputScript::AssetLock { credit_pubkey_hash } => {
                w.u8(SCRIPT_ASSET_LOCK).raw(credit_pubkey_hash);
            }
            OutputScript::OpReturn(data) => {
                w.u8(SCRIPT_OP_RETURN).bytes(data);
            }
        }
    }

    fn read(r: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        match r.u8()? {
            SCRIPT_P2PKH => Ok(OutputScript::PayToPubkeyHash(r.fixed()?)),
            SCRIPT_ASSET_LOCK => Ok(OutputScript::AssetLock {
                credit_pubkey_hash: r.fixed()?,
            }),
            SCRIPT_OP_RETURN => Ok(OutputScript::OpReturn(r.bytes()?)),
            tag => Err(ProtocolError::Decoding(format!("unknown script tag {:#04x}", tag))),
        }
    }
}

/// A transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in duffs.
    pub value: u64,
    pub script: OutputScript,
}

// ═══════════════════════════════════════════════════════════════════════════════
// FUNDING TRANSACTION
// ═══════════════════════════════════════════════════════════════════════════════

/// A chain transaction with at least one asset-lock output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingTransaction {
    pub version: u16,
    pub inputs: Vec<OutPoint>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl FundingTransaction {
    pub const VERSION: u16 = 3;

    pub fn new(inputs: Vec<OutPoint>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: Self::VERSION,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Raw wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.u16(self.version).varint(self.inputs.len() as u64);
        for input in &self.inputs {
            w.raw(input.txid.as_bytes()).u32(input.vout);
        }
        w.varint(self.outputs.len() as u64);
        for output in &self.outputs {
            w.u64(output.value);
            output.script.write(&mut w);
        }
        w.u32(self.lock_time);
        w.into_inner()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ByteReader::new(bytes);
        let version = r.u16()?;
        let n_in = r.count()?;
        let mut inputs = Vec::with_capacity(n_in);
        for _ in 0..n_in {
            let txid = TxHash(r.hash()?);
            let vout = r.u32()?;
            inputs.push(OutPoint { txid, vout });
        }
        let n_out = r.count()?;
        let mut outputs = Vec::with_capacity(n_out);
        for _ in 0..n_out {
            let value = r.u64()?;
            let script = OutputScript::read(&mut r)?;
            outputs.push(TxOutput { value, script });
        }
        let lock_time = r.u32()?;
        r.finish()?;
        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn hash(&self) -> TxHash {
        TxHash(sha256d(&self.to_bytes()))
    }

    /// Asset-lock outputs with their indices.
    pub fn asset_lock_outputs(&self) -> impl Iterator<Item = (u32, &TxOutput)> {
        self.outputs
            .iter()
            .enumerate()
            .filter(|(_, o)| o.script.is_asset_lock())
            .map(|(i, o)| (i as u32, o))
    }

    /// Sum of all asset-lock output values.
    pub fn locked_value(&self) -> u64 {
        self.asset_lock_outputs().map(|(_, o)| o.value).sum()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOCK CONFIRMATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Instant-lock evidence that a transaction's inputs cannot be double-spent.
///
/// The quorum signature is carried opaquely; verifying it is the network's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfirmation {
    pub version: u8,
    /// Inputs of the locked transaction.
    pub inputs: Vec<OutPoint>,
    /// Hash of the locked transaction.
    pub txid: TxHash,
    pub cycle_hash: [u8; 32],
    pub signature: Vec<u8>,
}

impl LockConfirmation {
    pub const VERSION: u8 = 1;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.u8(self.version).varint(self.inputs.len() as u64);
        for input in &self.inputs {
            w.raw(input.txid.as_bytes()).u32(input.vout);
        }
        w.raw(self.txid.as_bytes())
            .raw(&self.cycle_hash)
            .bytes(&self.signature);
        w.into_inner()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = ByteReader::new(bytes);
        let version = r.u8()?;
        let n = r.count()?;
        let mut inputs = Vec::with_capacity(n);
        for _ in 0..n {
            let txid = TxHash(r.hash()?);
            let vout = r.u32()?;
            inputs.push(OutPoint { txid, vout });
        }
        let txid = TxHash(r.hash()?);
        let cycle_hash = r.hash()?;
        let signature = r.bytes()?;
        r.finish()?;
        Ok(Self {
            version,
            inputs,
            txid,
            cycle_hash,
            signature,
        })
    }

    /// Whether this confirmation locks `tx`.
    pub fn locks(&self, tx: &FundingTransaction) -> bool {
        self.txid == tx.hash()
    }
}
