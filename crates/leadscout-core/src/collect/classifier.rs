//! Lead classification

use crate::models::{has_website, BusinessLead};

/// Splits leads by website presence
#[derive(Debug, Default, Clone, Copy)]
pub struct LeadClassifier;

impl LeadClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns (with_website, without_website), each in input order
    pub fn split_by_website(
        &self,
        leads: Vec<BusinessLead>,
    ) -> (Vec<BusinessLead>, Vec<BusinessLead>) {
        leads.into_iter().partition(has_website)
    }
}
