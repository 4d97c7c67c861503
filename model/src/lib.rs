pub mod balance;
pub mod decimal_as_number;
pub mod luhn;
pub mod order;
pub mod session;
pub mod user;
pub mod withdrawal;

pub use balance::Balance;
pub use order::{Order, OrderStatus, UserOrderView};
pub use session::Session;
pub use user::User;
pub use withdrawal::{Withdrawal, WithdrawalView, WithdrawRequest};
