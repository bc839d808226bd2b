use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkError {
    #[error("work search cancelled; resume at nonce {next_nonce}")]
    Cancelled { next_nonce: u64 },

    #[error("work budget exhausted; resume at nonce {next_nonce}")]
    BudgetExhausted { next_nonce: u64 },

    #[error("nonce space exhausted without meeting difficulty")]
    NonceSpaceExhausted,

    #[error("difficulty {zeros} exceeds the maximum of {max}")]
    DifficultyOutOfRange { zeros: u32, max: u32 },
}
