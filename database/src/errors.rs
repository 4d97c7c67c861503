use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("login already taken")]
    DuplicateLogin,
    #[error(transparent)]
    Other(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum WithdrawError {
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error(transparent)]
    Other(#[from] sqlx::Error),
}
