use std::sync::Arc;

use crate::model::{ForestClassifier, RiskClassifier};
use crate::service::AttritionService;

pub struct HandlerState<C: RiskClassifier + 'static = ForestClassifier> {
    pub service: Arc<AttritionService<C>>,
}

impl<C: RiskClassifier + 'static> HandlerState<C> {
    pub fn new(service: AttritionService<C>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn from_shared(service: Arc<AttritionService<C>>) -> Self {
        Self { service }
    }
}

// Manual impl: `C` itself need not be `Clone`.
impl<C: RiskClassifier + 'static> Clone for HandlerState<C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
