pub mod connection;
pub mod cookies;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_browser;
