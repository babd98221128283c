//! Tests for IntegrationService: form configuration, submission and log

mod common;

use std::sync::Arc;

use hirepass::application::services::IntegrationService;
use hirepass::application::ApplicationError;
use hirepass::domain::{DomainError, FormField, HireRecord, SubmissionStatus};

use common::{MemoryStore, MockSubmitter};

const PREFILL: &str = "https://docs.google.com/forms/d/e/abc/viewform?usp=pp_url&entry.10=a&entry.20=b&entry.30=c&entry.40=d&entry.50=e&entry.60=f&entry.70=g&entry.80=h";

fn open(store: &Arc<MemoryStore>, submitter: &Arc<MockSubmitter>) -> IntegrationService {
    IntegrationService::open(store.clone(), submitter.clone()).expect("open")
}

fn record() -> HireRecord {
    HireRecord {
        hire_type: "Trailer".into(),
        price: "40".into(),
        phone: "0400 000 000".into(),
        ..Default::default()
    }
}

#[test]
fn given_prefill_link_when_applied_then_maps_seven_fields_and_persists() {
    // Arrange
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::new());
    let mut integrations = open(&store, &submitter);

    // Act
    let found = integrations.apply_prefill_link(PREFILL).unwrap();

    // Assert: eight entries, seven fields
    assert_eq!(found, 7);
    let form = store.stored_integrations().google_form.unwrap();
    assert_eq!(form.form_url, "https://docs.google.com/forms/d/e/abc/formResponse");
    assert_eq!(form.field_mappings.hire_type, "entry.10");
    assert_eq!(form.field_mappings.phone, "entry.70");
}

#[test]
fn given_invalid_link_when_applied_then_domain_error_and_nothing_saved() {
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::new());
    let mut integrations = open(&store, &submitter);

    let err = integrations.apply_prefill_link("not a url").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidFormLink(_))
    ));
    assert_eq!(store.integration_writes(), 0);
}

#[test]
fn given_configured_form_when_submit_then_sends_mapped_fields_and_logs_success() {
    // Arrange
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::new());
    let mut integrations = open(&store, &submitter);
    integrations.apply_prefill_link(PREFILL).unwrap();

    // Act
    integrations.submit(&record(), "(G) Trailer").unwrap();

    // Assert
    let requests = submitter.requests();
    assert_eq!(requests.len(), 1);
    let (url, params) = &requests[0];
    assert!(url.ends_with("/formResponse"));
    assert_eq!(
        params,
        &vec![
            ("entry.10".to_string(), "Trailer".to_string()),
            ("entry.20".to_string(), "40".to_string()),
            ("entry.70".to_string(), "0400 000 000".to_string()),
        ]
    );
    let log = store.stored_integrations().submissions;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, SubmissionStatus::Success);
    assert_eq!(log[0].service_name, "(G) Trailer");
}

#[test]
fn given_failing_endpoint_when_submit_then_logs_error_and_returns_error() {
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::failing());
    let mut integrations = open(&store, &submitter);
    integrations
        .update_form_url("https://example.com/formResponse")
        .unwrap();

    let result = integrations.submit(&record(), "Van");

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
    let log = store.stored_integrations().submissions;
    assert_eq!(log[0].status, SubmissionStatus::Error);
    assert_eq!(log[0].service_name, "Van");
}

#[test]
fn given_no_form_when_submit_then_not_configured_and_not_logged() {
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::new());
    let mut integrations = open(&store, &submitter);

    let result = integrations.submit(&record(), "Van");

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::FormNotConfigured))
    ));
    assert!(submitter.requests().is_empty());
    assert!(integrations.settings().submissions.is_empty());
}

#[test]
fn given_single_mapping_when_set_then_other_mappings_kept() {
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::new());
    let mut integrations = open(&store, &submitter);
    integrations.apply_prefill_link(PREFILL).unwrap();

    integrations
        .set_field_mapping(FormField::Price, "entry.999")
        .unwrap();

    let form = integrations.settings().google_form.clone().unwrap();
    assert_eq!(form.field_mappings.price, "entry.999");
    assert_eq!(form.field_mappings.hire_type, "entry.10");
}

#[test]
fn given_saved_settings_when_reopened_then_loaded() {
    let store = Arc::new(MemoryStore::new());
    let submitter = Arc::new(MockSubmitter::new());
    {
        let mut integrations = open(&store, &submitter);
        integrations
            .update_info_sheet_url("https://docs.google.com/spreadsheets/d/1")
            .unwrap();
        integrations
            .log_submission(SubmissionStatus::Success, "(G) Trailer")
            .unwrap();
    }

    let reopened = open(&store, &submitter);

    assert_eq!(
        reopened.settings().info_sheet_url.as_deref(),
        Some("https://docs.google.com/spreadsheets/d/1")
    );
    assert_eq!(reopened.settings().submissions.len(), 1);
}
