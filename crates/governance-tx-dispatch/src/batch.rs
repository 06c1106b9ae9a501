use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};
use std::{fmt, sync::Arc, time::Duration};

/// How a batch's transactions are ordered relative to the others during submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceType {
    /// Strict order; each transaction waits for the previous one
    Sequential,
    /// No ordering constraint
    Parallel,
    /// Like `Sequential`, but remaining transactions are abandoned on the first failure
    StopOnFailure,
}

/// One instruction plus the extra keypairs that must sign for it
#[derive(Clone)]
pub struct InstructionSetWithSigners {
    pub transaction_instruction: Instruction,
    pub signers: Vec<Arc<Keypair>>,
}

impl InstructionSetWithSigners {
    pub fn new(transaction_instruction: Instruction) -> Self {
        Self {
            transaction_instruction,
            signers: vec![],
        }
    }

    pub fn signer_pubkeys(&self) -> Vec<Pubkey> {
        self.signers.iter().map(|s| s.pubkey()).collect()
    }
}

impl fmt::Debug for InstructionSetWithSigners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionSetWithSigners")
            .field("transaction_instruction", &self.transaction_instruction)
            .field("signers", &self.signer_pubkeys())
            .finish()
    }
}

impl PartialEq for InstructionSetWithSigners {
    fn eq(&self, other: &Self) -> bool {
        self.transaction_instruction == other.transaction_instruction
            && self.signer_pubkeys() == other.signer_pubkeys()
    }
}

/// A group of instruction sets submitted under one sequencing mode
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionBatch {
    pub instructions_set: Vec<InstructionSetWithSigners>,
    pub sequence_type: SequenceType,
}

impl InstructionBatch {
    pub fn new(instructions_set: Vec<InstructionSetWithSigners>, sequence_type: SequenceType) -> Self {
        Self {
            instructions_set,
            sequence_type,
        }
    }

    pub fn sequential(instructions_set: Vec<InstructionSetWithSigners>) -> Self {
        Self::new(instructions_set, SequenceType::Sequential)
    }

    pub fn parallel(instructions_set: Vec<InstructionSetWithSigners>) -> Self {
        Self::new(instructions_set, SequenceType::Parallel)
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions_set
            .iter()
            .map(|set| &set.transaction_instruction)
    }
}

/// How long the sign-and-confirm primitive waits on each transaction.
///
/// Opaque to the dispatcher; it is handed to the primitive as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeoutStrategy {
    Time {
        timeout: Duration,
        status_poll_interval: Duration,
    },
    BlockHeight {
        blockhash: Hash,
        last_valid_block_height: u64,
        start_block_check_after: Duration,
        status_poll_interval: Duration,
    },
}

impl Default for TimeoutStrategy {
    fn default() -> Self {
        Self::Time {
            timeout: Duration::from_secs(90),
            status_poll_interval: Duration::from_secs(4),
        }
    }
}

/// Pair each instruction with its signer from `signer_batches[batch_idx][tx_idx]`.
///
/// Missing rows or columns, and a missing `batch_idx`, give an empty signer list.
pub fn attach_signers(
    tx_batch: &[Instruction],
    signer_batches: &[Vec<Arc<Keypair>>],
    batch_idx: Option<usize>,
) -> Vec<InstructionSetWithSigners> {
    let row = batch_idx.and_then(|idx| signer_batches.get(idx));

    tx_batch
        .iter()
        .enumerate()
        .map(|(tx_idx, ix)| InstructionSetWithSigners {
            transaction_instruction: ix.clone(),
            signers: row
                .and_then(|signers| signers.get(tx_idx))
                .map(|signer| vec![Arc::clone(signer)])
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    fn ix(n: u8) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[n],
            vec![AccountMeta::new(Pubkey::new_unique(), false)],
        )
    }

    #[test]
    fn test_attach_signers_positional() {
        let a = Arc::new(Keypair::new());
        let b = Arc::new(Keypair::new());
        let c = Arc::new(Keypair::new());
        let matrix = vec![vec![a.clone()], vec![b.clone(), c.clone()]];
        let batch = vec![ix(0), ix(1), ix(2)];

        let sets = attach_signers(&batch, &matrix, Some(1));

        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].signer_pubkeys(), vec![b.pubkey()]);
        assert_eq!(sets[1].signer_pubkeys(), vec![c.pubkey()]);
        assert!(sets[2].signers.is_empty());
        for (set, ix) in sets.iter().zip(&batch) {
            assert_eq!(&set.transaction_instruction, ix);
        }
    }

    #[test]
    fn test_attach_signers_without_batch_index() {
        let matrix = vec![vec![Arc::new(Keypair::new())]];
        let sets = attach_signers(&[ix(0), ix(1)], &matrix, None);
        assert!(sets.iter().all(|set| set.signers.is_empty()));
    }

    #[test]
    fn test_attach_signers_out_of_range_row() {
        let matrix = vec![vec![Arc::new(Keypair::new())]];
        let sets = attach_signers(&[ix(0)], &matrix, Some(5));
        assert!(sets[0].signers.is_empty());

        let sets = attach_signers(&[ix(0)], &[], Some(0));
        assert!(sets[0].signers.is_empty());
    }

    #[test]
    fn test_batch_instructions_iter() {
        let batch = InstructionBatch::parallel(vec![
            InstructionSetWithSigners::new(ix(1)),
            InstructionSetWithSigners::new(ix(2)),
        ]);
        assert_eq!(batch.instructions().count(), 2);
        assert_eq!(batch.sequence_type, SequenceType::Parallel);
    }
}
