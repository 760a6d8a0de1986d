//! console-panel: a line-oriented console drawn as a terminal panel.
//!
//! A host program prints lines of light markup and asks for single lines of
//! typed input, while the panel handles editing, focus, wrapping and
//! scrolling. Two presentations share one state machine: a full-screen
//! `App` panel that ends on its own once the host goes idle, and a
//! collapsible `Inline` side panel that the host ends explicitly.
//!
//! # Quick start
//!
//! ```no_run
//! use console_panel::driver::run_until_ended;
//! use console_panel::panel::TerminalSurface;
//! use console_panel::session::{Console, PanelVariant};
//! use crossterm::event::EventStream;
//!
//! # async fn example() -> Result<(), console_panel::error::ConsoleError> {
//! let console = Console::new(PanelVariant::App);
//! console.mount(TerminalSurface::new())?;
//!
//! let host = console.clone();
//! tokio::spawn(async move {
//!     host.output(["What's your name?"])?;
//!     if let Some(name) = host.input().await? {
//!         host.output([format!("Hello, {}!", console_panel::panel::markup::escape(&name))])?;
//!     }
//!     Ok::<_, console_panel::error::ConsoleError>(())
//! });
//!
//! run_until_ended(&console, &mut EventStream::new()).await?;
//! console.unmount()
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod panel;
pub mod session;

pub use error::ConsoleError;
pub use panel::{MemorySurface, TerminalSurface};
pub use session::{Console, PanelEvent, PanelVariant};
