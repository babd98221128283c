//! Integration service
//!
//! Holds the outbound form configuration and submission log, persisted
//! independently of the password state.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    now, FormField, GoogleFormConfig, HireRecord, IntegrationSettings, SubmissionStatus,
};
use crate::infrastructure::traits::{FormSubmitter, StateStore};

pub struct IntegrationService {
    store: Arc<dyn StateStore>,
    submitter: Arc<dyn FormSubmitter>,
    settings: IntegrationSettings,
}

impl IntegrationService {
    /// Load integration settings, starting empty when none are stored.
    pub fn open(
        store: Arc<dyn StateStore>,
        submitter: Arc<dyn FormSubmitter>,
    ) -> ApplicationResult<Self> {
        let settings = store
            .load_integrations()
            .with_context("load integration settings")?
            .unwrap_or_default();
        debug!("open: {} logged submissions", settings.submissions.len());
        Ok(Self {
            store,
            submitter,
            settings,
        })
    }

    pub fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    fn save(&self) -> ApplicationResult<()> {
        self.store
            .save_integrations(&self.settings)
            .with_context("save integration settings")
    }

    pub fn log_submission(
        &mut self,
        status: SubmissionStatus,
        service_name: &str,
    ) -> ApplicationResult<()> {
        self.settings.log_submission(status, service_name, now());
        self.save()
    }

    pub fn update_google_form_config(&mut self, config: GoogleFormConfig) -> ApplicationResult<()> {
        self.settings.update_google_form_config(config);
        self.save()
    }

    pub fn update_info_sheet_url(&mut self, url: &str) -> ApplicationResult<()> {
        self.settings.update_info_sheet_url(url);
        self.save()
    }

    pub fn update_form_url(&mut self, url: &str) -> ApplicationResult<()> {
        self.settings.update_form_url(url);
        self.save()
    }

    pub fn set_field_mapping(&mut self, field: FormField, entry: &str) -> ApplicationResult<()> {
        self.settings.set_field_mapping(field, entry);
        self.save()
    }

    /// Configure the form from a pre-filled link. Returns the number of
    /// fields found.
    #[instrument(skip(self))]
    pub fn apply_prefill_link(&mut self, link: &str) -> ApplicationResult<usize> {
        let current = self
            .settings
            .google_form
            .as_ref()
            .map(|c| c.field_mappings.clone())
            .unwrap_or_default();
        let (config, found) = GoogleFormConfig::from_prefill_link(link, &current)?;
        info!("apply_prefill_link: form_url={} fields={}", config.form_url, found);
        self.update_google_form_config(config)?;
        Ok(found)
    }

    /// Submit a hire record and log the outcome under `service_name`.
    ///
    /// Validation failures are returned without logging; a failed send is
    /// logged as `error` before the error is returned.
    #[instrument(skip(self, record))]
    pub fn submit(&mut self, record: &HireRecord, service_name: &str) -> ApplicationResult<()> {
        let (url, params) = self.settings.submission_request(record)?;
        debug!("submit: {} params to {}", params.len(), url);

        match self.submitter.submit(&url, &params) {
            Ok(()) => self.log_submission(SubmissionStatus::Success, service_name),
            Err(e) => {
                warn!("submit failed: {e}");
                self.log_submission(SubmissionStatus::Error, service_name)?;
                Err::<(), _>(e).with_context("submit form")
            }
        }
    }
}
