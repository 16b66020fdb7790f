use crate::date_filter::DateFilter;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub filter: Arc<Mutex<Option<DateFilter>>>,
    pub alerts: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(filter: Option<DateFilter>, alerts: Vec<String>) -> Self {
        Self {
            filter: Arc::new(Mutex::new(filter)),
            alerts: Arc::new(alerts),
        }
    }
}
