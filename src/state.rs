use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::models::BookingEvent;
use crate::services::booking::BookingService;
use crate::services::draft::DraftService;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub bookings: BookingService,
    pub drafts: DraftService,
    pub events_tx: broadcast::Sender<BookingEvent>,
}
