//! Ordered fallback chains for contact details on a detail page.
//!
//! Coordinates and phone are resolved independently. Every strategy returns
//! an optional result; a failing or empty strategy hands over to the next one
//! and never aborts the pipeline.

use super::coordinates::resolve_coordinates;
use super::phone::{find_phone_in_text, normalize_phone};
use leadscout_browser::{pacing, PageActions};
use leadscout_core::{Coordinates, DelayRange};
use leadscout_sites::DetailSelectors;
use std::time::Duration;
use tracing::{debug, trace};

/// What the pipeline managed to resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub address: Option<String>,
}

/// Ways of obtaining a phone number, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneStrategy {
    /// Click the reveal control, then read the revealed number. Skipped when
    /// the page shows no control.
    RevealControl,
    /// Scan the listing description with the Spanish number pattern
    DescriptionScan,
}

impl PhoneStrategy {
    fn name(self) -> &'static str {
        match self {
            Self::RevealControl => "reveal-control",
            Self::DescriptionScan => "description-scan",
        }
    }
}

pub struct ContactExtractionPipeline<'a> {
    detail: &'a DetailSelectors,
    visibility_timeout: Duration,
    reveal_settle: DelayRange,
}

impl<'a> ContactExtractionPipeline<'a> {
    pub fn new(
        detail: &'a DetailSelectors,
        visibility_timeout: Duration,
        reveal_settle: DelayRange,
    ) -> Self {
        Self {
            detail,
            visibility_timeout,
            reveal_settle,
        }
    }

    /// Phone strategies enabled for this site.
    pub fn phone_strategies(&self) -> Vec<PhoneStrategy> {
        let mut strategies = vec![PhoneStrategy::RevealControl];
        if self.detail.scan_description_for_phone {
            strategies.push(PhoneStrategy::DescriptionScan);
        }
        strategies
    }

    /// Resolve everything the page offers.
    pub async fn extract(&self, page: &dyn PageActions) -> ContactDetails {
        let phone = self.resolve_phone(page).await;
        let coordinates = self.resolve_coordinates(page).await;
        let address = self.resolve_address(page).await;

        ContactDetails {
            phone,
            coordinates,
            address,
        }
    }

    pub async fn resolve_phone(&self, page: &dyn PageActions) -> Option<String> {
        for strategy in self.phone_strategies() {
            let found = match strategy {
                PhoneStrategy::RevealControl => self.reveal_phone(page).await,
                PhoneStrategy::DescriptionScan => self.scan_description(page).await,
            };
            if let Some(phone) = found {
                trace!(strategy = strategy.name(), "phone resolved");
                return Some(phone);
            }
        }
        None
    }

    async fn reveal_phone(&self, page: &dyn PageActions) -> Option<String> {
        if self.detail.phone_reveal.is_empty() || self.detail.phone_value.is_empty() {
            return None;
        }

        match page
            .click_visible(&self.detail.phone_reveal, self.visibility_timeout)
            .await
        {
            Ok(true) => pacing::random_delay(self.reveal_settle).await,
            // Whatever sits in the phone slot before the reveal is masked.
            Ok(false) => {
                trace!("no phone reveal control visible");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "phone reveal click failed");
                return None;
            }
        }

        match page
            .wait_visible_text(&self.detail.phone_value, self.visibility_timeout)
            .await
        {
            Ok(text) => text.as_deref().and_then(normalize_phone),
            Err(e) => {
                debug!(error = %e, "reading revealed phone failed");
                None
            }
        }
    }

    async fn scan_description(&self, page: &dyn PageActions) -> Option<String> {
        if self.detail.description.is_empty() {
            return None;
        }
        match page.text_of(&self.detail.description).await {
            Ok(text) => text.as_deref().and_then(find_phone_in_text),
            Err(e) => {
                debug!(error = %e, "reading description failed");
                None
            }
        }
    }

    pub async fn resolve_coordinates(&self, page: &dyn PageActions) -> Option<Coordinates> {
        match page.content().await {
            Ok(html) => resolve_coordinates(&html),
            Err(e) => {
                debug!(error = %e, "reading page content failed");
                None
            }
        }
    }

    async fn resolve_address(&self, page: &dyn PageActions) -> Option<String> {
        if self.detail.address.is_empty() {
            return None;
        }
        match page.text_of(&self.detail.address).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "reading address failed");
                None
            }
        }
    }
}
