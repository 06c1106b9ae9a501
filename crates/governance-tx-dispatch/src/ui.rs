use crate::RetryAction;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};
use tracing::{info, warn};

/// Progress indicator surface
pub trait TransactionProgressUi: Send + Sync {
    /// Show the "N transactions queued" indicator
    fn show_transactions_process(&self, total: usize);

    fn increment_processed_transactions(&self);

    fn close_transaction_process(&self);

    /// Show the error panel with a retry affordance
    fn show_transaction_error(
        &self,
        retry: RetryAction,
        message: Option<String>,
        txid: Option<Signature>,
    );
}

/// Cached on-chain account state keyed by the instructions that touch it
pub trait InstructionAccountCache: Send + Sync {
    fn invalidate_instruction_accounts(&self, instruction: &Instruction);
}

/// Headless progress UI that reports through `tracing`
#[derive(Default)]
pub struct TracingProgressUi {
    total: AtomicUsize,
    processed: AtomicUsize,
    open: AtomicBool,
    pending_retry: Mutex<Option<RetryAction>>,
}

impl TracingProgressUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Take the retry offered by the last error, if any
    pub fn take_retry(&self) -> Option<RetryAction> {
        self.pending_retry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl TransactionProgressUi for TracingProgressUi {
    fn show_transactions_process(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.processed.store(0, Ordering::SeqCst);
        self.open.store(true, Ordering::SeqCst);
        info!("{} transactions queued", total);
    }

    fn increment_processed_transactions(&self) {
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Processed {} of {} transactions", processed, self.total());
    }

    fn close_transaction_process(&self) {
        self.open.store(false, Ordering::SeqCst);
        info!("All transactions confirmed");
    }

    fn show_transaction_error(
        &self,
        retry: RetryAction,
        message: Option<String>,
        txid: Option<Signature>,
    ) {
        self.open.store(false, Ordering::SeqCst);
        match txid {
            Some(txid) => warn!(
                "Transaction {} failed: {}",
                txid,
                message.as_deref().unwrap_or("unknown error")
            ),
            None => warn!(
                "Transaction failed: {}",
                message.as_deref().unwrap_or("unknown error")
            ),
        }
        *self
            .pending_retry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(retry);
    }
}

/// Records accounts whose cached state is stale until the cache layer drains them
#[derive(Debug, Default)]
pub struct StaleAccountSet {
    stale: Mutex<HashSet<Pubkey>>,
    invalidations: AtomicUsize,
}

impl StaleAccountSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stale(&self, account: &Pubkey) -> bool {
        self.stale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(account)
    }

    /// Number of instruction invalidations seen so far
    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn take_stale(&self) -> HashSet<Pubkey> {
        std::mem::take(
            &mut *self
                .stale
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl InstructionAccountCache for StaleAccountSet {
    fn invalidate_instruction_accounts(&self, instruction: &Instruction) {
        let mut stale = self
            .stale
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stale.insert(instruction.program_id);
        stale.extend(instruction.accounts.iter().map(|meta| meta.pubkey));
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::instruction::AccountMeta;

    #[test]
    fn test_progress_counts() {
        let ui = TracingProgressUi::new();
        ui.show_transactions_process(3);
        ui.increment_processed_transactions();
        ui.increment_processed_transactions();
        assert!(ui.is_open());
        assert_eq!(ui.total(), 3);
        assert_eq!(ui.processed(), 2);

        ui.close_transaction_process();
        assert!(!ui.is_open());
    }

    #[test]
    fn test_error_keeps_retry() {
        let ui = TracingProgressUi::new();
        assert!(ui.take_retry().is_none());

        ui.show_transaction_error(
            RetryAction::new(|| Box::pin(async { None })),
            Some("boom".to_string()),
            None,
        );
        assert!(ui.take_retry().is_some());
        assert!(ui.take_retry().is_none());
    }

    #[test]
    fn test_stale_account_set() {
        let cache = StaleAccountSet::new();
        let program = Pubkey::new_unique();
        let account = Pubkey::new_unique();
        let ix = Instruction::new_with_bytes(program, &[], vec![AccountMeta::new(account, false)]);

        cache.invalidate_instruction_accounts(&ix);
        cache.invalidate_instruction_accounts(&ix);

        assert_eq!(cache.invalidations(), 2);
        assert!(cache.is_stale(&account));
        assert!(cache.is_stale(&program));
        assert_eq!(cache.take_stale().len(), 2);
        assert!(!cache.is_stale(&account));
    }
}
