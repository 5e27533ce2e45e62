use std::collections::HashMap;

use crate::models::Product;

/// ProductIndex holds a loaded product list and answers lookups by id
/// for the side-by-side comparison view.
pub struct ProductIndex {
    products: Vec<Product>,
    by_id: HashMap<i64, usize>, // id -> position in `products`
}

/// Two looked-up products; either side is `None` when its id is unknown.
#[derive(Debug, Clone, Copy)]
pub struct Comparison<'a> {
    pub left: Option<&'a Product>,
    pub right: Option<&'a Product>,
}

impl ProductIndex {
    /// Build the index from a listing. On duplicate ids the first entry wins,
    /// matching a front-to-back scan of the list.
    pub fn build(products: Vec<Product>) -> Self {
        let mut by_id = HashMap::with_capacity(products.len());
        for (pos, product) in products.iter().enumerate() {
            by_id.entry(product.id).or_insert(pos);
        }
        Self { products, by_id }
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.by_id.get(&id).map(|&pos| &self.products[pos])
    }

    pub fn compare(&self, left: i64, right: i64) -> Comparison<'_> {
        Comparison {
            left: self.get(left),
            right: self.get(right),
        }
    }

    /// `(id, name)` pairs in listing order, for choosing what to compare.
    pub fn choices(&self) -> impl Iterator<Item = (i64, &str)> {
        self.products.iter().map(|p| (p.id, p.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
