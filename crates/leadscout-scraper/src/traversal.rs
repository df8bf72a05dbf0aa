//! Shared listing traversal engine.
//!
//! Every site is crawled with the same two-level loop: categories on the
//! outside, result pages on the inside. What differs between sites comes from
//! its [`SiteDefinition`].

use crate::error::{Result, ScrapeError};
use crate::extract::ContactExtractionPipeline;
use crate::parser::{external_id, CardParser, ListingCard};
use leadscout_browser::{pacing, BrowserError, BrowserSession, PageActions};
use leadscout_core::{AppConfig, GeoFilter, Lead, LeadDraft, LeadError, PacingConfig, SourceId};
use leadscout_sites::{Category, SiteDefinition};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A per-site scraper: identifies itself and produces up to N leads from a
/// browser session.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Site tag of this adapter.
    fn source(&self) -> SourceId;

    /// Crawl the site and return at most `max_leads` leads, in traversal order.
    async fn scrape(&self, session: &dyn BrowserSession, max_leads: usize) -> Result<Vec<Lead>>;
}

/// Timeouts, pacing and the radius filter shared by all sites.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub geo: GeoFilter,
    pub navigation_timeout: Duration,
    pub detail_timeout: Duration,
    pub visibility_timeout: Duration,
    pub pacing: PacingConfig,
}

impl ScrapeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            geo: config.geo.filter(),
            navigation_timeout: config.browser.navigation_timeout(),
            detail_timeout: config.browser.detail_timeout(),
            visibility_timeout: config.browser.visibility_timeout(),
            pacing: config.pacing.clone(),
        }
    }
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Why a category's page loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEnd {
    /// The per-call budget was used up
    BudgetExhausted,
    /// A results page had no cards
    NoCards,
    /// No next-page control on the last page
    LastPage,
    /// An anti-bot challenge was shown
    Challenge,
    /// The listing page did not load in time
    NavigationTimeout,
    /// The listing page could not be loaded or read
    PageFailed(String),
}

/// What happened to one listing card.
#[derive(Debug)]
pub enum CardOutcome {
    Accepted(Box<Lead>),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No detail link could be resolved
    NoLink,
    /// Already collected earlier in this run
    Duplicate,
    /// Failed the private-seller keyword screening
    Screened,
    /// Lead construction refused the candidate (no phone, out of radius)
    Rejected(LeadError),
}

/// The traversal engine bound to one site definition.
pub struct SiteScraper {
    definition: SiteDefinition,
    settings: ScrapeSettings,
}

impl SiteScraper {
    pub fn new(definition: SiteDefinition, settings: ScrapeSettings) -> Self {
        Self {
            definition,
            settings,
        }
    }

    pub fn definition(&self) -> &SiteDefinition {
        &self.definition
    }

    async fn scrape_category(
        &self,
        session: &dyn BrowserSession,
        category: &Category,
        max_leads: usize,
        seen: &mut HashSet<String>,
    ) -> Result<(Vec<Lead>, SectionEnd)> {
        let page = session.new_page().await?;
        let mut leads = Vec::new();

        let end = self
            .walk_pages(session, page.as_ref(), category, max_leads, seen, &mut leads)
            .await;

        if let Err(e) = page.close().await {
            debug!(source = %self.source(), error = %e, "closing listing page failed");
        }

        Ok((leads, end))
    }

    async fn walk_pages(
        &self,
        session: &dyn BrowserSession,
        page: &dyn PageActions,
        category: &Category,
        max_leads: usize,
        seen: &mut HashSet<String>,
        leads: &mut Vec<Lead>,
    ) -> SectionEnd {
        let source = self.source();
        let pacing_cfg = &self.settings.pacing;

        if let Err(e) = page.block_resources(&self.definition.blocked_resources).await {
            debug!(source = %source, error = %e, "resource blocking unavailable");
        }

        if let Err(e) = page
            .navigate(&category.url, self.settings.navigation_timeout)
            .await
        {
            return section_end_for(&e);
        }
        pacing::random_delay(pacing_cfg.listing_settle).await;
        self.dismiss_consent(page).await;

        let mut page_number = 1u32;
        loop {
            if leads.len() >= max_leads {
                return SectionEnd::BudgetExhausted;
            }

            info!(
                source = %source,
                category = %category.name,
                page = page_number,
                "scraping results page"
            );

            match page.body_text().await {
                Ok(text) if self.definition.screening.is_challenge(&text) => {
                    return SectionEnd::Challenge;
                }
                Ok(_) => {}
                Err(e) => return SectionEnd::PageFailed(e.to_string()),
            }

            if let Err(e) = page
                .scroll_through(
                    pacing_cfg.scroll_step_px,
                    Duration::from_millis(pacing_cfg.scroll_step_delay_ms),
                )
                .await
            {
                debug!(source = %source, error = %e, "scroll failed");
            }
            pacing::random_delay(pacing_cfg.scroll_settle).await;

            let cards = match page.outer_html_all(&self.definition.listing.cards).await {
                Ok(cards) => cards,
                Err(e) => return SectionEnd::PageFailed(e.to_string()),
            };
            if cards.is_empty() {
                return SectionEnd::NoCards;
            }
            debug!(source = %source, page = page_number, cards = cards.len(), "cards found");

            for card_html in &cards {
                if leads.len() >= max_leads {
                    return SectionEnd::BudgetExhausted;
                }

                let card = CardParser::new(&self.definition).parse(card_html);
                match self.process_card(session, &card, seen).await {
                    Ok(CardOutcome::Accepted(lead)) => {
                        info!(
                            source = %source,
                            external_id = %lead.external_id(),
                            distance_km = lead.distance_km(),
                            "lead accepted"
                        );
                        leads.push(*lead);
                    }
                    Ok(CardOutcome::Skipped(SkipReason::Rejected(LeadError::OutOfRadius {
                        distance_km,
                    }))) => {
                        info!(source = %source, url = ?card.link, distance_km, "listing outside radius");
                    }
                    Ok(CardOutcome::Skipped(reason)) => {
                        debug!(source = %source, url = ?card.link, reason = ?reason, "card skipped");
                    }
                    Err(ScrapeError::ChallengeDetected { .. }) => return SectionEnd::Challenge,
                    Err(e) => {
                        warn!(source = %source, url = ?card.link, error = %e, "card failed, skipping");
                    }
                }
            }

            if leads.len() >= max_leads {
                return SectionEnd::BudgetExhausted;
            }

            match page
                .click_visible(&self.definition.pagination.next, self.settings.visibility_timeout)
                .await
            {
                Ok(true) => {
                    pacing::random_delay(pacing_cfg.next_page_settle).await;
                    page_number += 1;
                }
                Ok(false) => return SectionEnd::LastPage,
                Err(e) => return SectionEnd::PageFailed(e.to_string()),
            }
        }
    }

    async fn dismiss_consent(&self, page: &dyn PageActions) {
        if self.definition.consent.is_empty() {
            return;
        }
        match page
            .click_visible(&self.definition.consent, self.settings.visibility_timeout)
            .await
        {
            Ok(true) => {
                debug!(source = %self.source(), "cookie banner dismissed");
                pacing::random_delay(self.settings.pacing.consent_settle).await;
            }
            Ok(false) => {}
            Err(e) => debug!(source = %self.source(), error = %e, "cookie banner click failed"),
        }
    }

    /// Inspect one card: open its detail page in a fresh tab, screen it and
    /// resolve the contact details.
    pub async fn process_card(
        &self,
        session: &dyn BrowserSession,
        card: &ListingCard,
        seen: &mut HashSet<String>,
    ) -> Result<CardOutcome> {
        let Some(link) = card.link.as_deref() else {
            return Ok(CardOutcome::Skipped(SkipReason::NoLink));
        };

        let id = external_id(self.source(), link);
        if seen.contains(&id) {
            return Ok(CardOutcome::Skipped(SkipReason::Duplicate));
        }

        let detail = session.new_page().await?;
        let outcome = self.inspect_detail(detail.as_ref(), card, link, &id).await;
        if let Err(e) = detail.close().await {
            debug!(source = %self.source(), error = %e, "closing detail page failed");
        }

        // Any verdict is final for this crawl; only failed loads may be retried.
        if outcome.is_ok() {
            seen.insert(id);
        }
        outcome
    }

    async fn inspect_detail(
        &self,
        detail: &dyn PageActions,
        card: &ListingCard,
        link: &str,
        id: &str,
    ) -> Result<CardOutcome> {
        if let Err(e) = detail.block_resources(&self.definition.blocked_resources).await {
            debug!(source = %self.source(), error = %e, "resource blocking unavailable");
        }
        detail.navigate(link, self.settings.detail_timeout).await?;
        pacing::random_delay(self.settings.pacing.detail_settle).await;

        let text = detail.body_text().await?;
        let screening = &self.definition.screening;
        if screening.is_challenge(&text) {
            return Err(ScrapeError::ChallengeDetected {
                site: self.source(),
                stage: "detail page".to_string(),
            });
        }
        if !screening.accepts(&text) {
            return Ok(CardOutcome::Skipped(SkipReason::Screened));
        }

        let pipeline = ContactExtractionPipeline::new(
            &self.definition.detail,
            self.settings.visibility_timeout,
            self.settings.pacing.reveal_settle,
        );
        let contact = pipeline.extract(detail).await;

        let Some(phone) = contact.phone else {
            return Ok(CardOutcome::Skipped(SkipReason::Rejected(LeadError::EmptyPhone)));
        };

        let verdict = self.settings.geo.check(contact.coordinates);
        let address = contact
            .address
            .or_else(|| card.location.clone())
            .unwrap_or_else(|| card.title.clone());

        let draft = LeadDraft {
            external_id: id.to_string(),
            title: card.title.clone(),
            price: card.price,
            phone,
            address,
            source: self.source(),
        };

        Ok(match Lead::new(draft, verdict) {
            Ok(lead) => CardOutcome::Accepted(Box::new(lead)),
            Err(reason) => CardOutcome::Skipped(SkipReason::Rejected(reason)),
        })
    }
}

fn section_end_for(err: &BrowserError) -> SectionEnd {
    if err.is_navigation_timeout() {
        SectionEnd::NavigationTimeout
    } else {
        SectionEnd::PageFailed(err.to_string())
    }
}

#[async_trait::async_trait]
impl SourceAdapter for SiteScraper {
    fn source(&self) -> SourceId {
        self.definition.id()
    }

    async fn scrape(&self, session: &dyn BrowserSession, max_leads: usize) -> Result<Vec<Lead>> {
        let source = self.source();
        let mut leads = Vec::new();
        let mut seen = HashSet::new();

        for category in &self.definition.categories {
            let remaining = max_leads.saturating_sub(leads.len());
            if remaining == 0 {
                break;
            }

            info!(source = %source, category = %category.name, remaining, "scraping category");
            let (found, end) = self
                .scrape_category(session, category, remaining, &mut seen)
                .await?;

            match &end {
                SectionEnd::Challenge => {
                    warn!(source = %source, category = %category.name, "anti-bot challenge, abandoning category");
                }
                SectionEnd::NavigationTimeout => {
                    warn!(source = %source, category = %category.name, "listing navigation timed out");
                }
                SectionEnd::PageFailed(error) => {
                    warn!(source = %source, category = %category.name, error = %error, "listing page failed");
                }
                SectionEnd::NoCards => {
                    info!(source = %source, category = %category.name, "no more listings");
                }
                SectionEnd::LastPage | SectionEnd::BudgetExhausted => {
                    debug!(source = %source, category = %category.name, end = ?end, "category finished");
                }
            }

            info!(source = %source, category = %category.name, leads = found.len(), "category done");
            leads.extend(found);
        }

        leads.truncate(max_leads);
        info!(source = %source, leads = leads.len(), "source finished");
        Ok(leads)
    }
}
