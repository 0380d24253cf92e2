pub mod mock_server;

pub use mock_server::MockServer;

use squeezebox_controller::config::Config;
use squeezebox_controller::players::NameCleanup;
use squeezebox_controller::SqueezeBoxController;
use std::sync::Arc;

pub const SERVER_IP: &str = "192.168.0.1";

pub fn test_config() -> Config {
    Config {
        server_ip: SERVER_IP.to_string(),
        ..Config::default()
    }
}

/// Controller wired to a fresh mock server with players "a" (mac 1) and "b" (mac 2)
pub async fn controller_with(server: Arc<MockServer>) -> SqueezeBoxController {
    controller_with_cleanup(server, None).await
}

pub async fn controller_with_cleanup(
    server: Arc<MockServer>,
    cleanup: Option<NameCleanup>,
) -> SqueezeBoxController {
    SqueezeBoxController::with_transport(&test_config(), server, cleanup)
        .await
        .expect("Failed to create controller")
}
