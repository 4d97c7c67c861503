pub mod arguments;
pub mod maintenance;
pub mod password;
pub mod token;

use std::time::Duration;

/// The standard http client used by the accrual client and anywhere else
/// an outbound request needs a bounded timeout.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::ClientBuilder::new()
        .timeout(timeout)
        .user_agent("gophermart/1.0")
        .build()
        .unwrap()
}
