//! Inbound port. The upstream dispatcher calls into a notifier.

use crate::domain::{DeliveryResult, DomainError, Message, OutputBundle, ViewMode};
use crate::shared::config::NotifierOptions;

/// A delivery method for rendered messages (email, SMS, ...).
///
/// Stateless: all per-delivery context is passed in explicitly.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Short machine name, e.g. "email".
    fn name(&self) -> &'static str;

    /// View modes the dispatcher must render before calling [`Notifier::deliver`].
    fn view_modes(&self) -> Vec<ViewMode>;

    /// Deliver one rendered message. `output` must hold every view mode from
    /// [`Notifier::view_modes`].
    async fn deliver(
        &self,
        message: &Message,
        options: &NotifierOptions,
        output: OutputBundle,
    ) -> Result<DeliveryResult, DomainError>;
}
