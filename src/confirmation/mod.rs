//! Confirmation page.
//!
//! Shows the booking stored by the booking flow and exposes the export
//! actions (QR code, PDF ticket, calendar link, sharing). Rendering and
//! exporting are delegated to outside capabilities; when one is missing the
//! page degrades to a plain-text or notification fallback and keeps working.

use std::time::Duration;

use tokio::time;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::notify::{Level, Notifications};
use crate::storage::SessionStore;

mod document;
pub use document::{PrintDocument, TextItem};

mod error;
pub use error::{Capability, CapabilityError, ConfirmationError, ExportError};

mod view;
pub use view::{Breakdown, BreakdownLine, ConfirmationView, ShareLinks};

/// Side length of the rendered QR code, in pixels.
pub const CODE_SIZE: u32 = 120;

/// Draws a visual code for a text payload.
pub trait CodeRenderer {
    fn render(&mut self, payload: &str, size: u32) -> Result<(), CapabilityError>;
}

/// Produces a downloadable file from a laid-out document.
pub trait DocumentExporter {
    fn export(&mut self, document: &PrintDocument) -> Result<(), CapabilityError>;
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError>;
}

/// Native share sheet.
pub trait ShareTarget {
    fn share(&mut self, title: &str, text: &str, url: &str) -> Result<(), CapabilityError>;
}

/// Capabilities present in the current environment.
#[derive(Default)]
pub struct Capabilities {
    pub code: Option<Box<dyn CodeRenderer>>,
    pub document: Option<Box<dyn DocumentExporter>>,
    pub clipboard: Option<Box<dyn Clipboard>>,
    pub share: Option<Box<dyn ShareTarget>>,
}

/// What ended up in the QR code slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeArtifact {
    Rendered,
    /// Plain label drawn instead of a code.
    PlainText(&'static str),
}

/// How a share request was fulfilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
    /// Nothing worked; show this text and these links for manual sharing.
    Manual { text: String, links: ShareLinks },
}

pub struct ConfirmationPage {
    view: ConfirmationView,
    catalog: Catalog,
    capabilities: Capabilities,
    notifications: Notifications,
    origin: String,
}

impl ConfirmationPage {
    pub fn new(
        view: ConfirmationView,
        capabilities: Capabilities,
        notifications: Notifications,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            view,
            catalog: Catalog::builtin(),
            capabilities,
            notifications,
            origin: origin.into(),
        }
    }

    /// Open the page for whatever booking the session holds.
    pub fn open(
        store: &impl SessionStore,
        capabilities: Capabilities,
        notifications: Notifications,
        origin: impl Into<String>,
    ) -> Self {
        Self::new(ConfirmationView::load(store), capabilities, notifications, origin)
    }

    pub fn view(&self) -> &ConfirmationView {
        &self.view
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn breakdown(&self) -> Breakdown {
        self.view.breakdown(&self.catalog)
    }

    pub fn render_code(&mut self) -> CodeArtifact {
        match self.try_render_code() {
            Ok(()) => CodeArtifact::Rendered,
            Err(e) => {
                warn!(reason = %e, "QR code unavailable, drawing text label");
                CodeArtifact::PlainText("QR Code")
            }
        }
    }

    /// Export the printable ticket. Returns the file name on success.
    pub fn download_pdf(&mut self) -> Result<String, ExportError> {
        let document = self.view.print_document(&self.catalog);
        let result = match self.capabilities.document.as_mut() {
            None => Err(ExportError::Unavailable(Capability::DocumentExport)),
            Some(exporter) => exporter.export(&document).map_err(|source| ExportError::Failed {
                capability: Capability::DocumentExport,
                source,
            }),
        };
        match result {
            Ok(()) => {
                info!(file = %document.file_name, "ticket exported");
                self.notifications
                    .show(Level::Success, "PDF ticket downloaded successfully!");
                Ok(document.file_name)
            }
            Err(e) => {
                warn!(reason = %e, "ticket export failed");
                self.notifications.show(Level::Error, e.to_string());
                Err(e)
            }
        }
    }

    pub fn copy_reference(&mut self) -> Result<(), ExportError> {
        let reference = self.view.reference().to_string();
        match self.write_clipboard(&reference) {
            Ok(()) => {
                self.notifications
                    .show(Level::Success, "Booking reference copied to clipboard!");
                Ok(())
            }
            Err(e) => {
                warn!(reason = %e, "copy reference failed");
                Err(e)
            }
        }
    }

    /// Calendar link to open in a new tab.
    pub fn add_to_calendar(&mut self) -> Result<String, ConfirmationError> {
        let url = self.view.calendar_url()?;
        self.notifications.show(Level::Info, "Opening Google Calendar...");
        Ok(url)
    }

    /// Native share, then clipboard, then a manual share prompt.
    pub fn share(&mut self) -> ShareOutcome {
        let text = self.view.share_text();
        let title = self.view.record().event.title.clone();

        let shared = match self.capabilities.share.as_mut() {
            Some(target) => target.share(&title, &text, &self.origin),
            None => Err(CapabilityError(format!("{} not available", Capability::NativeShare))),
        };
        match shared {
            Ok(()) => {
                self.notifications.show(Level::Success, "Thanks for sharing!");
                return ShareOutcome::Shared;
            }
            Err(e) => info!(reason = %e, "native share unavailable, falling back"),
        }

        let modal_text = self.view.share_modal_text(&self.origin);
        match self.write_clipboard(&modal_text) {
            Ok(()) => {
                self.notifications
                    .show(Level::Success, "Share text copied to clipboard!");
                ShareOutcome::CopiedToClipboard
            }
            Err(e) => {
                info!(reason = %e, "clipboard unavailable, showing share prompt");
                ShareOutcome::Manual {
                    text: modal_text,
                    links: self.view.share_links(&self.origin),
                }
            }
        }
    }

    /// Simulated confirmation e-mail: announces itself after `delay`.
    pub async fn send_confirmation_email(&mut self, delay: Duration) {
        time::sleep(delay).await;
        info!(to = %self.view.record().customer.email, "confirmation email sent");
        self.notifications
            .show(Level::Success, "Confirmation email sent! Check your inbox.");
    }

    fn try_render_code(&mut self) -> Result<(), ExportError> {
        let payload = self.view.code_payload()?;
        let renderer = self
            .capabilities
            .code
            .as_mut()
            .ok_or(ExportError::Unavailable(Capability::VisualCode))?;
        renderer
            .render(&payload, CODE_SIZE)
            .map_err(|source| ExportError::Failed {
                capability: Capability::VisualCode,
                source,
            })
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), ExportError> {
        let clipboard = self
            .capabilities
            .clipboard
            .as_mut()
            .ok_or(ExportError::Unavailable(Capability::Clipboard))?;
        clipboard.write_text(text).map_err(|source| ExportError::Failed {
            capability: Capability::Clipboard,
            source,
        })
    }
}
