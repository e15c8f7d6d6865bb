//! Transaction payloads of account-based ledgers, where a swap lives in a
//! program account and every phase is an instruction sent to that account.

use crate::swap::{Instruction, SwapPayload};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction<A> {
    pub signature: String,
    /// The swap account the instruction was sent to.
    pub program_id: A,
    /// `None` for transactions that don't carry a swap instruction.
    #[serde(default)]
    pub instruction: Option<Instruction<A>>,
}

impl<A> SwapPayload for Transaction<A> {
    type Address = A;

    fn instruction(&self) -> Option<&Instruction<A>> {
        self.instruction.as_ref()
    }

    fn swap_account(&self) -> Option<&A> {
        Some(&self.program_id)
    }
}
