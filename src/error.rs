use thiserror::Error;

/// Failure classes for a mint attempt. The class tells the caller how far
/// the attempt got: `Input` means nothing left the process, `Wallet` means
/// no transaction was sent, `Submission` means the chain (or the path to
/// it) rejected the broadcast.
#[derive(Debug, Error)]
pub enum MintError {
    #[error("invalid mint request: {0}")]
    Input(String),

    #[error("wallet signing failed: {0}")]
    Wallet(String),

    #[error("submission failed: {0}")]
    Submission(String),
}

impl MintError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn wallet(msg: impl Into<String>) -> Self {
        Self::Wallet(msg.into())
    }

    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }
}
