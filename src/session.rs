use log::info;
use std::fmt;
use std::thread::JoinHandle;

use crate::cart::client::CartClient;

pub const DEFAULT_CUSTOMER: &str = "C1001";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    /// Uses the trimmed input, or `default` when the input is missing or blank.
    pub fn resolve(input: Option<&str>, default: &str) -> Self {
        let id = input.map(str::trim).filter(|s| !s.is_empty());
        match id {
            Some(id) => Self(id.to_string()),
            None => Self(default.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self(DEFAULT_CUSTOMER.to_string())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-run context handed to whatever needs to know who is shopping.
#[derive(Debug, Clone)]
pub struct Session {
    pub customer: CustomerId,
    pub cart: Option<CartClient>,
}

impl Session {
    pub fn new(customer: CustomerId, cart: Option<CartClient>) -> Self {
        Self { customer, cart }
    }

    /// Clears the remote cart so a new customer does not inherit items.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        info!("Starting session for customer {}", self.customer);
        match &self.cart {
            Some(cart) => Some(cart.clear_in_background()),
            None => {
                info!("Leaving the remote cart untouched");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_falls_back_to_default() {
        assert_eq!(CustomerId::resolve(None, DEFAULT_CUSTOMER).as_str(), "C1001");
        assert_eq!(CustomerId::resolve(Some(""), DEFAULT_CUSTOMER).as_str(), "C1001");
        assert_eq!(CustomerId::resolve(Some("   \t"), DEFAULT_CUSTOMER).as_str(), "C1001");
    }

    #[test]
    fn input_is_trimmed() {
        assert_eq!(CustomerId::resolve(Some(" C1002 "), DEFAULT_CUSTOMER).as_str(), "C1002");
        assert_eq!(CustomerId::resolve(Some("C1002"), "C9999").to_string(), "C1002");
    }

    #[test]
    fn session_without_cart_starts_quietly() {
        let session = Session::new(CustomerId::default(), None);
        assert!(session.start().is_none());
        assert_eq!(session.customer.as_str(), DEFAULT_CUSTOMER);
    }
}
