use serde_json::Value;
use tracing::{info, warn};

use crate::autofill::{autofill_form, scan_page, select_form, AutofillOptions};
use crate::browser::live::LivePage;
use crate::browser::session::BrowserSession;
use crate::cli::config::{AppConfig, EnrichSettings};
use crate::dom::HeadlessDocument;
use crate::enrich::enricher::{Enricher, ProfileEnricher};
use crate::enrich::ollama::{OllamaEnricher, DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL};
use crate::error::AutofillError;
use crate::form::form_model::{EnrichedFieldValue, EnrichedFields, FormLocator, ScanOutcome};
use crate::form::fulfill::{fulfill_report, FillReport};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{PassKind, TraceEvent};

// ============================================================================
// scan subcommand
// ============================================================================

pub fn cmd_scan(
    html_path: &str,
    url: Option<&str>,
    format: &str,
    options: &AutofillOptions,
    tracer: &TraceLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_html(html_path, url)?;
    let outcome = scan_page(&doc, options);
    tracer.log_scan(&outcome);

    if outcome == ScanOutcome::NoFormsDetected {
        eprintln!("No forms detected in {}", html_path);
    }

    let rendered = match format {
        "yaml" => serde_yaml::to_string(outcome.forms())?,
        _ => serde_json::to_string_pretty(outcome.forms())?,
    };
    println!("{}", rendered);
    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

/// Fill a form from a values file and return whether the pass succeeded.
pub fn cmd_fill(
    html_path: &str,
    form_id: &str,
    fingerprint: Option<&str>,
    values_path: &str,
    output: Option<&str>,
    tracer: &TraceLogger,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut doc = load_html(html_path, None)?;
    let values = load_enriched_values(values_path)?;

    let locator = FormLocator::from_id(form_id).with_fingerprint(fingerprint.unwrap_or(""));
    let report = fulfill_report(&mut doc, &locator, &values);
    tracer.log_fill(&report);
    print_fill_summary(&report);

    write_output(output, &doc.to_html())?;
    Ok(report.success())
}

// ============================================================================
// autofill subcommand
// ============================================================================

pub fn cmd_autofill(
    html_path: Option<&str>,
    url: Option<&str>,
    profile_path: &str,
    form_id: Option<&str>,
    output: Option<&str>,
    settings: &EnrichSettings,
    config: &AppConfig,
    tracer: &TraceLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = load_profile(profile_path)?;
    let enricher = build_enricher(settings, config.enrich.page_text_budget);
    let options = config.autofill_options();

    let report = match (html_path, url) {
        (Some(path), _) => {
            let mut doc = load_html(path, None)?;
            let outcome = scan_page(&doc, &options);
            tracer.log_scan(&outcome);

            let form = select_form(&outcome, form_id)?.clone();
            let report = autofill_form(&mut doc, &form, profile, enricher.as_ref(), &options)?;
            write_output(output, &doc.to_html())?;
            report
        }
        (None, Some(url)) => {
            let mut session = BrowserSession::launch(&config.browser.server_script)?;
            session.navigate(url)?;
            let report = LivePage::new(&mut session, options).autofill(
                form_id,
                profile,
                enricher.as_ref(),
            );
            session.quit()?;
            report?
        }
        (None, None) => {
            return Err(AutofillError::Input("either --html or --url is required".into()).into());
        }
    };

    tracer.log_fill(&report);
    print_fill_summary(&report);
    Ok(())
}

// ============================================================================
// highlight subcommand
// ============================================================================

pub fn cmd_highlight(
    url: &str,
    form_id: &str,
    config: &AppConfig,
    tracer: &TraceLogger,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = BrowserSession::launch(&config.browser.server_script)?;
    session.navigate(url)?;

    let found = LivePage::new(&mut session, config.autofill_options())
        .highlight(&FormLocator::from_id(form_id))?;
    session.quit()?;

    let outcome = if found { "highlighted" } else { "form_not_found" };
    tracer.log(&TraceEvent::now(PassKind::Highlight, outcome).with_form(form_id));

    if found {
        println!("Form '{}' scrolled into view", form_id);
    } else {
        warn!(form_id, "form not found; nothing highlighted");
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the value source named by `settings.analyzer`.
pub fn build_enricher(settings: &EnrichSettings, page_text_budget: usize) -> Box<dyn Enricher> {
    match settings.analyzer.as_str() {
        "llm" => {
            let endpoint = settings
                .ollama_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let model = settings.ollama_model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            let mut enricher = OllamaEnricher::new(endpoint, model);
            enricher.context_budget = page_text_budget;
            Box::new(enricher)
        }
        _ => Box::new(ProfileEnricher),
    }
}

pub fn load_html(path: &str, url: Option<&str>) -> Result<HeadlessDocument, Box<dyn std::error::Error>> {
    let html = std::fs::read_to_string(path)?;
    Ok(match url {
        Some(url) => HeadlessDocument::parse_with_url(&html, url),
        None => HeadlessDocument::parse(&html),
    })
}

/// Profiles are free-form. YAML is a superset of JSON, so one parser covers both.
pub fn load_profile(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let profile: Value = serde_yaml::from_str(&content)?;
    Ok(profile)
}

/// Values as returned by the enrichment service (`formFields: [...]`) or as a
/// bare list.
pub fn load_enriched_values(path: &str) -> Result<Vec<EnrichedFieldValue>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    parse_enriched_values(&content)
}

pub fn parse_enriched_values(content: &str) -> Result<Vec<EnrichedFieldValue>, Box<dyn std::error::Error>> {
    if let Ok(list) = serde_yaml::from_str::<Vec<EnrichedFieldValue>>(content) {
        return Ok(list);
    }
    let wrapped: EnrichedFields = serde_yaml::from_str(content)?;
    Ok(wrapped.form_fields)
}

fn write_output(output: Option<&str>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => print!("{}", content),
    }
    Ok(())
}

fn print_fill_summary(report: &FillReport) {
    if !report.form_found() {
        eprintln!("Form '{}' not found; nothing was written", report.form_id);
        return;
    }
    info!(
        form_id = %report.form_id,
        applied = report.applied_count(),
        unresolved = report.unresolved_count(),
        "fill pass finished"
    );
    eprintln!(
        "Form '{}': {} applied, {} unresolved",
        report.form_id,
        report.applied_count(),
        report.unresolved_count()
    );
    if let Some(error) = &report.error {
        eprintln!("Error filling form: {}", error);
    }
}
