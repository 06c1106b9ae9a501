use crate::{DispatchError, DispatchResult};
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

/// The slice of a wallet adapter the dispatcher needs
pub trait WalletSigner: Send + Sync {
    /// `None` while the wallet is disconnected
    fn public_key(&self) -> Option<Pubkey>;

    fn sign_transaction(&self, transaction: Transaction) -> DispatchResult<Transaction>;

    fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> DispatchResult<Vec<Transaction>> {
        transactions
            .into_iter()
            .map(|tx| self.sign_transaction(tx))
            .collect()
    }
}

/// A local keypair acts as an always-connected wallet
impl WalletSigner for Keypair {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.pubkey())
    }

    fn sign_transaction(&self, mut transaction: Transaction) -> DispatchResult<Transaction> {
        let recent_blockhash = transaction.message.recent_blockhash;
        transaction.try_partial_sign(&[self], recent_blockhash)?;
        Ok(transaction)
    }
}

/// Public key of a connected wallet, or [`DispatchError::WalletNotConnected`]
pub fn wallet_public_key(wallet: &dyn WalletSigner) -> DispatchResult<Pubkey> {
    wallet.public_key().ok_or(DispatchError::WalletNotConnected)
}
