use crate::{asset, ledger, Secret, SecretHash};
use bitcoin::{
    consensus::encode, Address, PackedLockTime, Script, Sequence, TxIn, TxOut, Txid, Witness,
    Wtxid,
};
use serde::{Deserialize, Serialize};

pub use bitcoin::OutPoint;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("raw transaction is not valid hex")]
    Hex(#[from] hex::FromHexError),
    #[error("failed to deserialize bytes as transaction")]
    Consensus(#[from] encode::Error),
}

/// A bitcoin transaction decoded into a canonical, chain-agnostic record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The legacy transaction id, excluding witness data.
    pub id: Txid,
    /// The hash including witness data.
    pub hash: Wtxid,
    pub version: i32,
    pub locktime: u32,
    pub size: usize,
    pub vsize: usize,
    pub weight: usize,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    #[serde(with = "hex")]
    pub raw: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub previous_output: OutPoint,
    pub script_sig: ScriptSig,
    #[serde(with = "hex_items")]
    pub witness: Vec<Vec<u8>>,
    pub sequence: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptSig {
    pub asm: String,
    #[serde(rename = "hex", with = "hex")]
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(with = "::bitcoin::util::amount::serde::as_btc")]
    pub value: asset::Bitcoin,
    pub index: u32,
    pub script_pubkey: ScriptPubKey,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    pub asm: String,
    #[serde(rename = "hex", with = "hex")]
    pub bytes: Vec<u8>,
    #[serde(rename = "type")]
    pub kind: ScriptType,
    /// Empty if the script doesn't correspond to an address.
    pub addresses: Vec<Address>,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScriptType {
    Pubkey,
    Pubkeyhash,
    Scripthash,
    WitnessV0Keyhash,
    WitnessV0Scripthash,
    WitnessV1Taproot,
    Nulldata,
    Nonstandard,
}

impl ScriptType {
    pub fn classify(script: &Script) -> Self {
        if script.is_p2pkh() {
            ScriptType::Pubkeyhash
        } else if script.is_p2sh() {
            ScriptType::Scripthash
        } else if script.is_v0_p2wpkh() {
            ScriptType::WitnessV0Keyhash
        } else if script.is_v0_p2wsh() {
            ScriptType::WitnessV0Scripthash
        } else if script.is_v1_p2tr() {
            ScriptType::WitnessV1Taproot
        } else if script.is_p2pk() {
            ScriptType::Pubkey
        } else if script.is_op_return() {
            ScriptType::Nulldata
        } else {
            ScriptType::Nonstandard
        }
    }
}

/// Decodes a serialized transaction.
///
/// Addresses are derived for the outputs using the parameters of `network`.
/// Outputs whose script has no address representation keep an empty address
/// list; decoding carries on with the rest of the transaction.
pub fn decode(raw: &[u8], network: ledger::Bitcoin) -> Result<Transaction, DecodeError> {
    let transaction = encode::deserialize::<bitcoin::Transaction>(raw)?;

    Ok(Transaction::from_consensus(transaction, raw.to_vec(), network))
}

impl Transaction {
    pub fn decode_hex(hex: &str, network: ledger::Bitcoin) -> Result<Self, DecodeError> {
        let raw = hex::decode(hex.trim())?;

        decode(&raw, network)
    }

    fn from_consensus(transaction: bitcoin::Transaction, raw: Vec<u8>, network: ledger::Bitcoin) -> Self {
        let network = network.into();

        let inputs = transaction
            .input
            .iter()
            .map(|txin| Input {
                previous_output: txin.previous_output,
                script_sig: ScriptSig {
                    asm: txin.script_sig.asm(),
                    bytes: txin.script_sig.to_bytes(),
                },
                witness: txin.witness.to_vec(),
                sequence: txin.sequence.0,
            })
            .collect();

        let outputs = transaction
            .output
            .iter()
            .enumerate()
            .map(|(index, txout)| {
                let kind = ScriptType::classify(&txout.script_pubkey);
                let addresses = Address::from_script(&txout.script_pubkey, network)
                    .into_iter()
                    .collect::<Vec<_>>();

                if addresses.is_empty() {
                    tracing::trace!("no address for {} output {}", kind, index);
                }

                // Bitcoin limits the number of outputs to u32 anyway.
                #[allow(clippy::cast_possible_truncation)]
                let index = index as u32;

                Output {
                    value: asset::Bitcoin::from_sat(txout.value),
                    index,
                    script_pubkey: ScriptPubKey {
                        asm: txout.script_pubkey.asm(),
                        bytes: txout.script_pubkey.to_bytes(),
                        kind,
                        addresses,
                    },
                }
            })
            .collect();

        Transaction {
            id: transaction.txid(),
            hash: transaction.wtxid(),
            version: transaction.version,
            locktime: transaction.lock_time.0,
            size: transaction.size(),
            vsize: transaction.vsize(),
            weight: transaction.weight(),
            inputs,
            outputs,
            raw,
        }
    }

    /// Re-assembles the consensus representation from the decoded fields.
    pub fn to_consensus(&self) -> bitcoin::Transaction {
        bitcoin::Transaction {
            version: self.version,
            lock_time: PackedLockTime(self.locktime),
            input: self
                .inputs
                .iter()
                .map(|input| TxIn {
                    previous_output: input.previous_output,
                    script_sig: Script::from(input.script_sig.bytes.clone()),
                    sequence: Sequence(input.sequence),
                    witness: Witness::from_vec(input.witness.clone()),
                })
                .collect(),
            output: self
                .outputs
                .iter()
                .map(|output| TxOut {
                    value: output.value.to_sat(),
                    script_pubkey: Script::from(output.script_pubkey.bytes.clone()),
                })
                .collect(),
        }
    }

    pub fn output_total(&self) -> asset::Bitcoin {
        asset::Bitcoin::from_sat(self.outputs.iter().map(|output| output.value.to_sat()).sum())
    }

    /// The fee paid, given the values of the outputs spent by each input in
    /// order.
    ///
    /// Returns `None` if the number of values doesn't match the number of
    /// inputs or if the outputs spend more than the inputs provide.
    pub fn fee(&self, prevout_values: &[asset::Bitcoin]) -> Option<asset::Bitcoin> {
        if prevout_values.len() != self.inputs.len() {
            return None;
        }

        let input_total = prevout_values
            .iter()
            .try_fold(0u64, |acc, value| acc.checked_add(value.to_sat()))?;

        input_total
            .checked_sub(self.output_total().to_sat())
            .map(asset::Bitcoin::from_sat)
    }

    /// Looks for the preimage of `secret_hash` in the witness stacks of the
    /// inputs, where claiming a hash-locked output reveals it.
    pub fn find_secret(&self, secret_hash: &SecretHash) -> Option<Secret> {
        self.inputs.iter().find_map(|input| {
            input
                .witness
                .iter()
                .find_map(|item| match Secret::from_vec(item) {
                    Ok(secret) if SecretHash::new(secret) == *secret_hash => Some(secret),
                    Ok(_) => None,
                    Err(_) => None,
                })
        })
    }
}

mod hex_items {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(items.iter().map(hex::encode))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(hex::decode)
            .collect::<Result<_, _>>()
            .map_err(D::Error::custom)
    }
}
