//! Integration ledger: outbound form configuration and submission log.
//!
//! Independent of the password state machine; it only consumes a service
//! name when logging.

use chrono::{DateTime, Utc};
use url::Url;

use super::entities::{
    FieldMappings, FormField, GoogleFormConfig, HireRecord, IntegrationSettings, SubmissionRecord,
    SubmissionStatus, SUBMISSION_LOG_LIMIT,
};
use super::error::DomainError;

const FORM_RESPONSE: &str = "/formResponse";
const GOOGLE_FORMS_HOST: &str = "docs.google.com/forms";
const GOOGLE_SHEETS_HOST: &str = "docs.google.com/spreadsheets";
/// Path segments replaced (with everything after them in the path) by `/formResponse`.
const VIEW_SEGMENTS: [&str; 2] = ["/viewform", "/prefill"];

impl IntegrationSettings {
    /// Prepend a submission outcome, keeping the newest [`SUBMISSION_LOG_LIMIT`].
    pub fn log_submission(
        &mut self,
        status: SubmissionStatus,
        service_name: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.submissions.insert(
            0,
            SubmissionRecord {
                timestamp: now,
                status,
                service_name: service_name.into(),
            },
        );
        self.submissions.truncate(SUBMISSION_LOG_LIMIT);
    }

    pub fn update_google_form_config(&mut self, config: GoogleFormConfig) {
        self.google_form = Some(config);
    }

    pub fn update_info_sheet_url(&mut self, url: impl Into<String>) {
        self.info_sheet_url = Some(url.into());
    }

    /// Set the form action URL, keeping existing field mappings.
    pub fn update_form_url(&mut self, url: impl Into<String>) {
        self.google_form.get_or_insert_with(Default::default).form_url = url.into();
    }

    pub fn set_field_mapping(&mut self, field: FormField, entry: impl Into<String>) {
        self.google_form
            .get_or_insert_with(Default::default)
            .field_mappings
            .set(field, entry);
    }

    /// Query parameters for submitting `record`, validated against the
    /// configured form. Returns the form URL and the parameters.
    pub fn submission_request(
        &self,
        record: &HireRecord,
    ) -> Result<(String, Vec<(String, String)>), DomainError> {
        let config = self
            .google_form
            .as_ref()
            .filter(|c| !c.form_url.trim().is_empty())
            .ok_or(DomainError::FormNotConfigured)?;
        if record.hire_type.is_empty() {
            return Err(DomainError::MissingField("hire type"));
        }
        Ok((config.form_url.clone(), config.query_pairs(record)))
    }

    /// Google Sheets app link for the info sheet, if it is a Sheets URL.
    pub fn info_sheet_deep_link(&self) -> Option<String> {
        self.info_sheet_url
            .as_deref()
            .filter(|url| url.contains(GOOGLE_SHEETS_HOST))
            .map(|url| url.replace("https://", "googlesheets://"))
    }
}

impl GoogleFormConfig {
    /// Non-empty record fields whose mapping is set, in field order.
    pub fn query_pairs(&self, record: &HireRecord) -> Vec<(String, String)> {
        FormField::ALL
            .into_iter()
            .filter_map(|field| {
                let entry = self.field_mappings.get(field);
                let value = record.get(field);
                (!entry.is_empty() && !value.is_empty())
                    .then(|| (entry.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Derive a config from a pre-filled form link.
    ///
    /// `entry.*` query keys are assigned to fields in declaration order;
    /// fields without a key keep their value from `current`. Returns the
    /// config and the number of fields found.
    pub fn from_prefill_link(
        link: &str,
        current: &FieldMappings,
    ) -> Result<(GoogleFormConfig, usize), DomainError> {
        let invalid = || DomainError::InvalidFormLink(link.to_string());
        let parsed = Url::parse(link.trim()).map_err(|_| invalid())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid());
        }

        let entries: Vec<String> = parsed
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .filter(|key| key.starts_with("entry."))
            .collect();

        let path = parsed.path();
        let view = VIEW_SEGMENTS.iter().filter_map(|seg| path.find(seg)).min();
        let path = match view {
            Some(pos) => format!("{}{FORM_RESPONSE}", &path[..pos]),
            None => path.to_string(),
        };
        let mut base = parsed;
        base.set_query(None);
        base.set_fragment(None);
        base.set_path(&path);

        let mut form_url = String::from(base);
        if !form_url.ends_with(FORM_RESPONSE) && form_url.contains(GOOGLE_FORMS_HOST) {
            if !form_url.ends_with('/') {
                form_url.push('/');
            }
            form_url.push_str(&FORM_RESPONSE[1..]);
        }

        let mut field_mappings = current.clone();
        let mut found = 0;
        for (field, entry) in FormField::ALL.into_iter().zip(entries) {
            field_mappings.set(field, entry);
            found += 1;
        }

        Ok((
            GoogleFormConfig {
                form_url,
                field_mappings,
            },
            found,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::now;

    const PREFILL: &str = "https://docs.google.com/forms/d/e/1FAIpQ/viewform?usp=pp_url&entry.111=Trailer&entry.222=40&entry.333=x";

    #[test]
    fn given_full_log_when_log_submission_then_keeps_twenty_newest() {
        let mut settings = IntegrationSettings::default();
        for i in 0..25 {
            settings.log_submission(SubmissionStatus::Success, format!("svc-{i}"), now());
        }

        assert_eq!(settings.submissions.len(), SUBMISSION_LOG_LIMIT);
        assert_eq!(settings.submissions[0].service_name, "svc-24");
        assert_eq!(settings.submissions[19].service_name, "svc-5");
    }

    #[test]
    fn given_prefill_link_when_parsed_then_maps_entries_in_order() {
        let (config, found) =
            GoogleFormConfig::from_prefill_link(PREFILL, &FieldMappings::default()).unwrap();

        assert_eq!(
            config.form_url,
            "https://docs.google.com/forms/d/e/1FAIpQ/formResponse"
        );
        assert_eq!(found, 3);
        assert_eq!(config.field_mappings.hire_type, "entry.111");
        assert_eq!(config.field_mappings.price, "entry.222");
        assert_eq!(config.field_mappings.description, "entry.333");
        assert_eq!(config.field_mappings.phone, "");
    }

    #[test]
    fn given_existing_mappings_when_parsed_then_unfound_fields_are_kept() {
        let current = FieldMappings {
            phone: "entry.999".into(),
            ..Default::default()
        };

        let (config, _) = GoogleFormConfig::from_prefill_link(PREFILL, &current).unwrap();

        assert_eq!(config.field_mappings.phone, "entry.999");
    }

    #[test]
    fn given_bare_form_link_when_parsed_then_appends_form_response() {
        let (config, found) = GoogleFormConfig::from_prefill_link(
            "https://docs.google.com/forms/d/e/abc",
            &FieldMappings::default(),
        )
        .unwrap();

        assert_eq!(config.form_url, "https://docs.google.com/forms/d/e/abc/formResponse");
        assert_eq!(found, 0);
    }

    #[test]
    fn given_relative_link_when_parsed_then_invalid() {
        let err = GoogleFormConfig::from_prefill_link("forms/viewform", &FieldMappings::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormLink(_)));
    }

    #[test]
    fn given_malformed_host_when_parsed_then_invalid() {
        let err = GoogleFormConfig::from_prefill_link(
            "https://docs.goo gle.com/forms/d/e/X/viewform?entry.1=a",
            &FieldMappings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormLink(_)));
    }

    #[test]
    fn given_bad_port_when_parsed_then_invalid() {
        let err = GoogleFormConfig::from_prefill_link(
            "https://docs.google.com:notaport/forms/d/e/X/viewform?entry.1=a",
            &FieldMappings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormLink(_)));
    }

    #[test]
    fn given_non_http_scheme_when_parsed_then_invalid() {
        let err = GoogleFormConfig::from_prefill_link(
            "mailto:someone@example.com?entry.1=a",
            &FieldMappings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormLink(_)));
    }

    #[test]
    fn given_percent_encoded_key_when_parsed_then_decoded() {
        let (config, found) = GoogleFormConfig::from_prefill_link(
            "https://docs.google.com/forms/d/e/X/viewform?entry%2E111=a&entry.222=b",
            &FieldMappings::default(),
        )
        .unwrap();

        assert_eq!(found, 2);
        assert_eq!(config.field_mappings.hire_type, "entry.111");
        assert_eq!(config.field_mappings.price, "entry.222");
    }

    #[test]
    fn given_fragment_and_query_when_parsed_then_form_url_has_neither() {
        let (config, _) = GoogleFormConfig::from_prefill_link(
            "https://docs.google.com/forms/d/e/X/viewform?usp=pp_url&entry.1=a#top",
            &FieldMappings::default(),
        )
        .unwrap();

        assert_eq!(
            config.form_url,
            "https://docs.google.com/forms/d/e/X/formResponse"
        );
    }

    #[test]
    fn given_whitespace_hire_type_when_submission_request_then_accepted() {
        let mut settings = IntegrationSettings::default();
        settings.update_form_url("https://example.com/formResponse");
        settings.set_field_mapping(FormField::HireType, "entry.1");
        let record = HireRecord {
            hire_type: " ".into(),
            ..Default::default()
        };

        let (_, params) = settings.submission_request(&record).unwrap();

        assert_eq!(params, vec![("entry.1".to_string(), " ".to_string())]);
    }

    #[test]
    fn given_unconfigured_form_when_submission_request_then_error() {
        let record = HireRecord {
            hire_type: "Trailer".into(),
            ..Default::default()
        };
        assert_eq!(
            IntegrationSettings::default().submission_request(&record),
            Err(DomainError::FormNotConfigured)
        );
    }

    #[test]
    fn given_record_when_submission_request_then_skips_empty_values_and_mappings() {
        let mut settings = IntegrationSettings::default();
        settings.update_form_url("https://example.com/formResponse");
        settings.set_field_mapping(FormField::HireType, "entry.1");
        settings.set_field_mapping(FormField::Phone, "entry.7");
        let record = HireRecord {
            hire_type: "Trailer".into(),
            price: "40".into(),
            phone: "".into(),
            ..Default::default()
        };

        let (url, params) = settings.submission_request(&record).unwrap();

        assert_eq!(url, "https://example.com/formResponse");
        assert_eq!(params, vec![("entry.1".to_string(), "Trailer".to_string())]);
    }

    #[test]
    fn given_missing_hire_type_when_submission_request_then_error() {
        let mut settings = IntegrationSettings::default();
        settings.update_form_url("https://example.com/formResponse");

        assert_eq!(
            settings.submission_request(&HireRecord::default()),
            Err(DomainError::MissingField("hire type"))
        );
    }

    #[test]
    fn given_sheets_url_when_deep_link_then_uses_app_scheme() {
        let mut settings = IntegrationSettings::default();
        settings.update_info_sheet_url("https://docs.google.com/spreadsheets/d/xyz");

        assert_eq!(
            settings.info_sheet_deep_link().as_deref(),
            Some("googlesheets://docs.google.com/spreadsheets/d/xyz")
        );
    }
}
