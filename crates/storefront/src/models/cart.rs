//! Session cart contents.

use serde::{Deserialize, Serialize};

use fashion_store_core::{ProductId, Size};

/// One cart line: a product in a size, with a positive quantity.
///
/// Orders store these verbatim as their item snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub size: Size,
    pub quantity: u32,
}

/// The ordered list of entries kept in a shopper's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `product_id` in `size`.
    ///
    /// An existing line for the same product and size is topped up instead of
    /// a second line being appended. Zero quantities are ignored.
    pub fn add(&mut self, product_id: ProductId, size: Size, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.product_id == product_id && entry.size == size)
        {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(CartEntry {
                product_id,
                size,
                quantity,
            }),
        }
    }

    /// Remove the line at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Option<CartEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<CartEntry> {
        self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .fold(0, |total, entry| total.saturating_add(entry.quantity))
    }
}

impl From<Vec<CartEntry>> for Cart {
    fn from(entries: Vec<CartEntry>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_same_product_and_size_accumulates() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(7), Size::M, 1);
        cart.add(ProductId::new(7), Size::M, 2);
        cart.add(ProductId::new(7), Size::L, 1);

        assert_eq!(cart.entries().len(), 2);
        assert_eq!(cart.entries()[0].quantity, 3);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), Size::S, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_by_index() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1), Size::S, 1);
        cart.add(ProductId::new(2), Size::XL, 1);

        assert!(cart.remove(5).is_none());
        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.product_id, ProductId::new(1));
        assert_eq!(cart.entries()[0].product_id, ProductId::new(2));
    }

    #[test]
    fn test_session_encoding_is_a_plain_list() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(3), Size::XL, 2);
        assert_eq!(
            serde_json::to_string(&cart).unwrap(),
            r#"[{"product_id":3,"size":"XL","quantity":2}]"#
        );
    }
}
