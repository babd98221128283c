//! Command dispatch
//!
//! Each command opens the services it needs from the container, applies one
//! operation and prints the result.

use std::io::{self, BufRead};

use chrono::Local;
use clap::CommandFactory;
use tracing::debug;

use crate::application::services::{IntegrationService, PasswordService};
use crate::cli::args::{Cli, Commands, ConfigCommands, IntegrationCommands, ServiceCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{
    DomainError, FormField, HireRecord, NewService, Outcome, Refusal, Service, ServiceId,
    ServiceUpdate,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        None | Some(Commands::Show) => cmd_show(container),
        Some(Commands::Generate) => cmd_generate(container),
        Some(Commands::Undo) => cmd_undo(container),
        Some(Commands::History { limit }) => cmd_history(container, *limit),
        Some(Commands::Restore {
            index,
            password,
            yes,
        }) => cmd_restore(container, *index, *password, *yes),
        Some(Commands::Set { index, password }) => cmd_set(container, *index, *password),
        Some(Commands::ResetHistory { yes }) => cmd_reset_history(container, *yes),
        Some(Commands::Service { command }) => cmd_service(container, command),
        Some(Commands::Integration { command }) => cmd_integration(container, command),
        Some(Commands::Config { command }) => cmd_config(&container.settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Turn a refusal into a `CliError::Refused`.
fn applied<T>(outcome: Outcome<T>) -> CliResult<T> {
    match outcome {
        Outcome::Applied(v) => Ok(v),
        Outcome::Refused(refusal) => Err(CliError::Refused(refusal)),
    }
}

/// Resolve a service reference (id or unique name).
fn resolve_id(passwords: &PasswordService, reference: &str) -> CliResult<ServiceId> {
    passwords
        .resolve(reference)
        .map(|s| s.id.clone())
        .ok_or_else(|| CliError::Refused(Refusal::UnknownService(ServiceId::from(reference))))
}

/// Ask a yes/no question on stdin. Anything but y/yes is a no.
fn confirm(question: &str) -> CliResult<bool> {
    output::prompt(&format!("{question} [y/N]"));
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| InfraError::io("read confirmation", e))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_service(service: &Service) {
    output::header(&service.name);
    output::password(service.current_index, service.current_password);
    output::detail(&format!(
        "next = (current * {} + {}) mod {}",
        service.multiplier, service.addend, service.modulus
    ));
    output::detail(&format!(
        "history: {} entries{}",
        service.history.len(),
        if service.can_undo() { "" } else { " (undo unavailable)" }
    ));
}

// ============================================================
// PASSWORD COMMANDS
// ============================================================

fn cmd_show(container: &ServiceContainer) -> CliResult<()> {
    let passwords = container.password_service()?;
    print_service(passwords.active());
    Ok(())
}

fn cmd_generate(container: &ServiceContainer) -> CliResult<()> {
    let mut passwords = container.password_service()?;
    let id = passwords.active().id.clone();
    let service = applied(passwords.generate(&id)?)?;
    output::success(&format!(
        "Password generated for {} (index {})",
        service.name, service.current_index
    ));
    output::password(service.current_index, service.current_password);
    Ok(())
}

fn cmd_undo(container: &ServiceContainer) -> CliResult<()> {
    let mut passwords = container.password_service()?;
    let id = passwords.active().id.clone();
    let service = applied(passwords.undo(&id)?)?;
    output::success(&format!("Reverted to index {}", service.current_index));
    output::password(service.current_index, service.current_password);
    Ok(())
}

fn cmd_history(container: &ServiceContainer, limit: usize) -> CliResult<()> {
    let passwords = container.password_service()?;
    let service = passwords.active();
    output::header(&format!("{} history", service.name));
    if service.history.is_empty() {
        output::detail(&"(empty)");
    }
    for entry in service.history.iter().take(limit) {
        let marker = if entry.matches(service.current_index, service.current_password) {
            "*"
        } else {
            " "
        };
        output::info(&format!(
            "{marker} {:>6}  {:>10}  {}",
            entry.index,
            entry.password,
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));
    }
    Ok(())
}

fn cmd_restore(
    container: &ServiceContainer,
    index: u64,
    password: i64,
    yes: bool,
) -> CliResult<()> {
    let mut passwords = container.password_service()?;
    let id = passwords.active().id.clone();
    if !yes && !confirm(&format!("Restore index {index}? Newer history is discarded."))? {
        output::info(&"Aborted");
        return Ok(());
    }
    let service = applied(passwords.restore_from_history(&id, index, password)?)?;
    output::success(&format!("Restored to index {}", service.current_index));
    output::password(service.current_index, service.current_password);
    Ok(())
}

fn cmd_set(container: &ServiceContainer, index: u64, password: i64) -> CliResult<()> {
    let mut passwords = container.password_service()?;
    let id = passwords.active().id.clone();
    let service = applied(passwords.set_manual_state(&id, index, password)?)?;
    if service.modulus > 0 && !(0..service.modulus).contains(&password) {
        output::warning(&format!(
            "password {password} is outside [0, {}); the next generation normalizes it",
            service.modulus
        ));
    }
    output::success(&format!("State set to index {index}"));
    output::password(service.current_index, service.current_password);
    Ok(())
}

fn cmd_reset_history(container: &ServiceContainer, yes: bool) -> CliResult<()> {
    let mut passwords = container.password_service()?;
    let active = passwords.active();
    let id = active.id.clone();
    if !yes && !confirm(&format!("Clear history of {}?", active.name))? {
        output::info(&"Aborted");
        return Ok(());
    }
    applied(passwords.reset_history(&id)?)?;
    output::success(&"History cleared");
    Ok(())
}

// ============================================================
// SERVICE COMMANDS
// ============================================================

fn cmd_service(container: &ServiceContainer, command: &ServiceCommands) -> CliResult<()> {
    let mut passwords = container.password_service()?;
    match command {
        ServiceCommands::List => {
            let active = passwords.registry().active_id();
            for service in passwords.registry().services() {
                let marker = if &service.id == active { "*" } else { " " };
                output::info(&format!(
                    "{marker} {}  {}  #{} {}",
                    service.id, service.name, service.current_index, service.current_password
                ));
            }
        }
        ServiceCommands::Show { service } => {
            let shown = match service {
                Some(reference) => {
                    let id = resolve_id(&passwords, reference)?;
                    passwords.registry().get(&id).cloned()
                }
                None => Some(passwords.active().clone()),
            };
            if let Some(service) = shown {
                output::action("id", &service.id);
                print_service(&service);
            }
        }
        ServiceCommands::Add {
            name,
            seed,
            multiplier,
            addend,
            modulus,
        } => {
            let added = passwords.add_service(NewService {
                name: name.clone(),
                seed: *seed,
                multiplier: *multiplier,
                addend: *addend,
                modulus: *modulus,
            })?;
            output::success(&format!("Service created: {} ({})", added.name, added.id));
        }
        ServiceCommands::Select { service } => {
            let id = resolve_id(&passwords, service)?;
            let selected = applied(passwords.select(&id)?)?;
            output::success(&format!("Active service: {}", selected.name));
        }
        ServiceCommands::Delete { service, yes } => {
            let id = resolve_id(&passwords, service)?;
            if passwords.registry().services().len() <= 1 {
                return Err(CliError::Refused(Refusal::LastService));
            }
            if !*yes && !confirm(&format!("Delete service {service}?"))? {
                output::info(&"Aborted");
                return Ok(());
            }
            let removed = applied(passwords.delete_service(&id)?)?;
            output::success(&format!("Service deleted: {}", removed.name));
            output::action("Active service", &passwords.active().name);
        }
        ServiceCommands::Update {
            service,
            name,
            password,
            index,
            multiplier,
            addend,
            modulus,
        } => {
            let id = resolve_id(&passwords, service)?;
            let update = ServiceUpdate {
                name: name.clone(),
                current_password: *password,
                current_index: *index,
                multiplier: *multiplier,
                addend: *addend,
                modulus: *modulus,
            };
            if update.is_empty() {
                return Err(CliError::InvalidArgs("nothing to update".into()));
            }
            if matches!(update.modulus, Some(m) if m <= 0) {
                output::warning(&"modulus <= 0: generation is refused until it is changed");
            }
            let updated = applied(passwords.update_service_settings(&id, &update)?)?;
            output::success(&"Settings updated");
            print_service(&updated);
        }
    }
    Ok(())
}

// ============================================================
// INTEGRATION COMMANDS
// ============================================================

fn cmd_integration(container: &ServiceContainer, command: &IntegrationCommands) -> CliResult<()> {
    let mut integrations = container.integration_service()?;
    match command {
        IntegrationCommands::Show => print_integrations(&integrations),
        IntegrationCommands::Log => {
            let log = &integrations.settings().submissions;
            if log.is_empty() {
                output::info(&"No submissions logged");
            }
            for record in log {
                output::info(&format!(
                    "{}  {:<7}  {}",
                    record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                    record.status,
                    record.service_name
                ));
            }
        }
        IntegrationCommands::FormUrl { url } => {
            integrations.update_form_url(url)?;
            output::success(&"Google Form URL updated");
        }
        IntegrationCommands::FormLink { link } => {
            let found = integrations.apply_prefill_link(link)?;
            output::success(&format!(
                "Link parsed: found {found} fields. Please verify mappings."
            ));
            print_integrations(&integrations);
        }
        IntegrationCommands::Map { field, entry } => {
            let field: FormField = field
                .parse()
                .map_err(|e: DomainError| CliError::InvalidArgs(e.to_string()))?;
            integrations.set_field_mapping(field, entry)?;
            output::success(&format!("{field} -> {entry}"));
        }
        IntegrationCommands::SheetUrl { url } => {
            integrations.update_info_sheet_url(url)?;
            output::success(&"Info sheet URL updated");
        }
        IntegrationCommands::Sheet => match &integrations.settings().info_sheet_url {
            Some(url) => {
                output::action("Info sheet", url);
                if let Some(deep_link) = integrations.settings().info_sheet_deep_link() {
                    output::action("App link", &deep_link);
                }
            }
            None => output::warning(&"Info sheet URL not configured (integration sheet-url <URL>)"),
        },
        IntegrationCommands::Submit {
            hire_type,
            price,
            description,
            date,
            time,
            days,
            phone,
        } => {
            let record = HireRecord {
                hire_type: hire_type.clone(),
                price: price.clone().unwrap_or_default(),
                description: description.clone().unwrap_or_default(),
                date_of_hire: date.clone().unwrap_or_default(),
                time_of_hire: time.clone().unwrap_or_default(),
                number_of_days: days.clone().unwrap_or_default(),
                phone: phone.clone().unwrap_or_default(),
            };
            let passwords = container.password_service()?;
            let service_name = passwords.active().name.clone();
            debug!("submit for service {service_name}");
            integrations.submit(&record, &service_name)?;
            output::success(&"Record sent to Google Form");
        }
    }
    Ok(())
}

fn print_integrations(integrations: &IntegrationService) {
    let settings = integrations.settings();
    output::header(&"Google Form");
    match &settings.google_form {
        Some(form) => {
            output::action("form_url", &form.form_url);
            for field in FormField::ALL {
                let entry = form.field_mappings.get(field);
                output::detail(&format!(
                    "{:<15} {}",
                    field,
                    if entry.is_empty() { "-" } else { entry }
                ));
            }
        }
        None => output::detail(&"not configured"),
    }
    output::header(&"Info sheet");
    output::detail(&settings.info_sheet_url.as_deref().unwrap_or("not configured"));
    output::action("Submissions logged", &settings.submissions.len());
}

// ============================================================
// CONFIG COMMANDS
// ============================================================

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::Usage(
                    "cannot determine config directory".into(),
                ))
            }
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
