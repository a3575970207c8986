pub mod client;
pub mod drawer;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Body of `PUT /cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_body() {
        assert_eq!(serde_json::to_string(&Cart::empty()).unwrap(), r#"{"items":[]}"#);
    }

    #[test]
    fn items_use_backend_field_names() {
        let cart: Cart =
            serde_json::from_str(r#"{"items":[{"productId":"P100","quantity":2}]}"#).unwrap();
        assert_eq!(
            cart.items,
            vec![CartItem {
                product_id: "P100".into(),
                quantity: 2
            }]
        );
    }
}
