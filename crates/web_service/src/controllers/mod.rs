pub mod events_controller;
pub mod page_controller;
pub mod party_controller;
pub mod system_controller;
