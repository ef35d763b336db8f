use rust_decimal::Decimal;

use catalog_products::{Product, ProductPage};

use super::r#trait::{ProductStore, StoreError};

/// In-memory product list.
///
/// Intended for tests/dev and as the default catalogue of the binary. The
/// list is fixed at construction, so reads need no locking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
    products: Vec<Product>,
}

impl InMemoryProductStore {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The eight-item sample catalogue.
    pub fn seeded() -> Self {
        let items = [
            ("Sausage Roll", Decimal::new(100, 2)),
            ("Vegan Sausage Roll", Decimal::new(110, 2)),
            ("Steak Bake", Decimal::new(120, 2)),
            ("Yum Yum", Decimal::new(70, 2)),
            ("Pink Jammie", Decimal::new(50, 2)),
            ("Mexican Baguette", Decimal::new(210, 2)),
            ("Bacon Sandwich", Decimal::new(195, 2)),
            ("Coca Cola", Decimal::new(120, 2)),
        ];
        Self::new(
            items
                .into_iter()
                .map(|(name, price)| Product::new(name, price))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn fetch(
        &self,
        page_start: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<ProductPage, StoreError> {
        let start = page_start.unwrap_or(0) as usize;
        let remaining = self.products.iter().skip(start);
        let products: Vec<Product> = match page_size {
            Some(size) => remaining.take(size as usize).cloned().collect(),
            None => remaining.cloned().collect(),
        };

        Ok(ProductPage::new(products, self.products.len() as u64))
    }
}
