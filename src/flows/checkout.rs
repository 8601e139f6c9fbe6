//! Checkout outcome classification.

use crate::config::FlowsConfig;
use crate::ingest::Event;
use crate::sessions::Session;

/// A checkout event that places an order: on the checkout path, no failure
/// marker in css or text, and the success phrase in text (all case-folded).
pub fn is_order_placement(event: &Event, config: &FlowsConfig) -> bool {
    if event.path != config.checkout_path {
        return false;
    }
    let css = event.css_folded();
    let text = event.text_folded();
    let failed = config
        .failure_markers
        .iter()
        .any(|m| css.contains(m.as_str()) || text.contains(m.as_str()));
    !failed && text.contains(config.success_phrase.as_str())
}

/// One qualifying checkout event is enough; anything else is abandoned.
pub fn is_successful_checkout(session: &Session<'_>, config: &FlowsConfig) -> bool {
    session.events().any(|e| is_order_placement(e, config))
}
