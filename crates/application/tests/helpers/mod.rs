
pub use mock_triggers::MockAdminTriggers;
