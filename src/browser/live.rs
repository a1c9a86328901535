use serde_json::Value;
use tracing::{debug, info};

use crate::autofill::{build_enrichment_request, scan_page, select_form, AutofillOptions};
use crate::browser::session::BrowserSession;
use crate::dom::{Document, HeadlessDocument, NodeId};
use crate::enrich::enricher::Enricher;
use crate::error::AutofillError;
use crate::form::form_model::{EnrichedFieldValue, FormLocator, ScanOutcome};
use crate::form::fulfill::{fulfill_report, FillReport};
use crate::form::highlight::highlight_form;

/// `:nth-child` path from the document element to `node`, resolvable with
/// `document.querySelector` on the page the snapshot was taken from.
pub fn structural_path<D: Document + ?Sized>(doc: &D, node: NodeId) -> String {
    let mut segments = Vec::new();
    let mut cursor = node;

    while let Some(parent) = doc.parent_element(cursor) {
        let position = doc
            .children(parent)
            .into_iter()
            .filter(|c| doc.is_element(*c))
            .position(|c| c == cursor)
            .map_or(1, |p| p + 1);
        segments.push(format!(
            "{}:nth-child({})",
            doc.tag_name(cursor).unwrap_or("*"),
            position
        ));
        cursor = parent;
    }
    segments.push(doc.tag_name(cursor).unwrap_or("html").to_string());

    segments.reverse();
    segments.join(" > ")
}

/// Scan / fulfil / highlight against the page currently open in a browser
/// session. Every pass works on a fresh snapshot, so nothing is carried over
/// between a scan and a later fulfillment.
pub struct LivePage<'s> {
    session: &'s mut BrowserSession,
    options: AutofillOptions,
}

impl<'s> LivePage<'s> {
    pub fn new(session: &'s mut BrowserSession, options: AutofillOptions) -> Self {
        Self { session, options }
    }

    /// Snapshot the current page into a headless document.
    pub fn load(&mut self) -> Result<HeadlessDocument, AutofillError> {
        let snapshot = self.session.snapshot()?;
        debug!(url = %snapshot.url, bytes = snapshot.html.len(), "page snapshot taken");
        Ok(HeadlessDocument::parse_with_url(&snapshot.html, &snapshot.url))
    }

    pub fn scan(&mut self) -> Result<ScanOutcome, AutofillError> {
        let doc = self.load()?;
        Ok(scan_page(&doc, &self.options))
    }

    /// Resolve against the current page, then apply every recorded write to
    /// the real elements.
    pub fn fulfill(
        &mut self,
        locator: &FormLocator,
        fields: &[EnrichedFieldValue],
    ) -> Result<FillReport, AutofillError> {
        let mut doc = self.load()?;
        let report = fulfill_report(&mut doc, locator, fields);

        for write in doc.value_writes() {
            let path = structural_path(&doc, write.node);
            self.session.fill(&path, &write.value)?;
        }

        Ok(report)
    }

    /// Scan, enrich and fill one form of the current page. The form is
    /// located again on a fresh snapshot before writing, by fingerprint first.
    pub fn autofill(
        &mut self,
        form_id: Option<&str>,
        profile: Value,
        enricher: &dyn Enricher,
    ) -> Result<FillReport, AutofillError> {
        let doc = self.load()?;
        let outcome = scan_page(&doc, &self.options);
        let form = select_form(&outcome, form_id)?;
        let request = build_enrichment_request(&doc, form, profile, &self.options);

        let enriched = enricher.enrich(&request)?;
        info!(form_id = %form.id, values = enriched.form_fields.len(), "applying enriched values");

        let report = self.fulfill(&FormLocator::from(form), &enriched.form_fields)?;
        if !report.form_found() {
            return Err(AutofillError::FormNotFound(form.id.clone()));
        }
        Ok(report)
    }

    /// `true` when the form was found and scrolled to.
    pub fn highlight(&mut self, locator: &FormLocator) -> Result<bool, AutofillError> {
        let mut doc = self.load()?;
        let target = highlight_form(&mut doc, locator).map(|form| structural_path(&doc, form));
        self.session.highlight(target.as_deref())?;
        Ok(target.is_some())
    }
}
