use crate::domain::{CollaborationRecord, CollaborationStatus, PartyRecord, ProductRecord};

/// Builds backend-shaped collaboration records for tests.
pub struct CollaborationRecordBuilder {
    record: CollaborationRecord,
}

impl CollaborationRecordBuilder {
    pub fn pending(id: &str) -> Self {
        Self {
            record: CollaborationRecord {
                id: Some(id.to_string()),
                merchant: Some(PartyRecord {
                    id: Some("merchant-1".to_string()),
                    name: Some("Glow Cosmetics".to_string()),
                    email: Some("partners@glow.example".to_string()),
                }),
                influencer: Some(PartyRecord {
                    id: Some("influencer-1".to_string()),
                    name: Some("Sam Rivera".to_string()),
                    email: None,
                }),
                products: vec![ProductRecord {
                    id: Some("product-1".to_string()),
                    name: Some("Vitamin C Serum".to_string()),
                    image_url: None,
                    price: Some(29.9),
                }],
                proposed_commission: Some(15.0),
                message: Some("Would love to work together".to_string()),
                status: Some(CollaborationStatus::Pending),
                ..Default::default()
            },
        }
    }

    pub fn commission(mut self, value: f64) -> Self {
        self.record.proposed_commission = Some(value);
        self
    }

    pub fn status(mut self, status: CollaborationStatus) -> Self {
        self.record.status = Some(status);
        self
    }

    pub fn without_status(mut self) -> Self {
        self.record.status = None;
        self
    }

    pub fn without_products(mut self) -> Self {
        self.record.products.clear();
        self
    }

    pub fn without_product_name(mut self) -> Self {
        for product in &mut self.record.products {
            product.name = None;
        }
        self
    }

    pub fn build(self) -> CollaborationRecord {
        self.record
    }
}
