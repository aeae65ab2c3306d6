// src/modules/auth/user_interface.rs
use itertools::Itertools;
use serde_json::Value;
use std::error::Error;

use super::registration::{AccountRole, RegisterRequest};
use super::session::REGISTER_SUCCESS;
use crate::modules::context::UrbanClient;
use crate::modules::http::{ApiError, Method};
use crate::modules::notifications::{Notification, NotificationKind};
use crate::modules::resources::Resource;
use crate::modules::routing::{Navigation, HOME};
use crate::modules::utils::io::{prompt, prompt_password};
use crate::modules::utils::time::{format_duration, get_current_timestamp, utc_to_local};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Log in, prompting for whatever was not given on the command line
pub async fn handle_login(
    client: &UrbanClient,
    username: Option<String>,
    password: Option<String>,
) -> CliResult {
    let username = match username {
        Some(username) => username,
        None => prompt("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    match client.session().login(&username, &password).await {
        Ok(info) => {
            let role = info.role.as_deref().unwrap_or("no role");
            println!("Logged in as {} ({})", info.username, role);
            client.router().open(HOME.path());
            Ok(())
        }
        Err(e) => {
            client
                .session()
                .show_message(format!("Login failed: {}", e), NotificationKind::Error);
            Err(e.into())
        }
    }
}

pub async fn handle_register(
    client: &UrbanClient,
    username: Option<String>,
    password: Option<String>,
    role: AccountRole,
    linked_id: Option<u64>,
) -> CliResult {
    let username = match username {
        Some(username) => username,
        None => prompt("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let request = RegisterRequest::new(username, password, role).with_linked_entity(linked_id);
    match client.session().register(&request).await {
        Ok(()) => {
            client
                .session()
                .show_message(REGISTER_SUCCESS, NotificationKind::Success);
            client.router().open("/login");
            Ok(())
        }
        Err(e) => {
            client
                .session()
                .show_message(format!("Registration failed: {}", e), NotificationKind::Error);
            Err(e.into())
        }
    }
}

pub fn handle_logout(client: &UrbanClient) -> CliResult {
    client.session().logout();
    Ok(())
}

pub fn handle_whoami(client: &UrbanClient) -> CliResult {
    match client.session().current_session() {
        Some(info) => {
            println!("Username: {}", info.username);
            println!("Role:     {}", info.role.as_deref().unwrap_or("-"));
            if let Some(exp) = info.expires_at {
                let local = utc_to_local(exp).unwrap_or_else(|| exp.to_string());
                let remaining = format_duration(exp - get_current_timestamp());
                println!("Expires:  {} ({})", local, remaining);
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Navigate to a screen through the route guard
pub fn handle_open(client: &UrbanClient, path: &str) -> CliResult {
    match client.router().open(path) {
        Navigation::Entered(route) => println!("Opened {}", route),
        Navigation::Redirected { from, to } => println!("{} requires a session; redirected to {}", from, to),
    }
    Ok(())
}

/// Send an arbitrary request through the authenticated pipeline
pub async fn handle_raw(client: &UrbanClient, method: Method, path: &str, body: Option<&str>) -> CliResult {
    let body: Value = match body {
        Some(text) => serde_json::from_str(text)
            .map_err(|e| ApiError::invalid_input(format!("Body is not valid JSON: {}", e)))?,
        None => Value::Null,
    };

    let pipeline = client.pipeline();
    let result: Value = match method {
        Method::Get => pipeline.get(path).await?,
        Method::Post => pipeline.post(path, &body).await?,
        Method::Put => pipeline.put(path, &body).await?,
        Method::Patch => pipeline.patch(path, &body).await?,
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn handle_list(client: &UrbanClient, resource: Resource) -> CliResult {
    if !enter_screen(client, resource) {
        return Ok(());
    }
    let rows = client.resource(resource).list_all().await?;
    if rows.is_empty() {
        println!("No {} found.", resource);
    } else {
        println!("{}", render_rows(&rows));
    }
    Ok(())
}

pub async fn handle_show(client: &UrbanClient, resource: Resource, id: &str) -> CliResult {
    if !enter_screen(client, resource) {
        return Ok(());
    }
    let record = client.resource(resource).get_by_id(id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub async fn handle_set_active(client: &UrbanClient, resource: Resource, id: &str, active: bool) -> CliResult {
    if !enter_screen(client, resource) {
        return Ok(());
    }
    client.resource(resource).set_active(id, active).await?;
    let state = if active { "activated" } else { "deactivated" };
    client.session().show_message(
        format!("{} {} {}", resource, id, state),
        NotificationKind::Success,
    );
    Ok(())
}

// Screens load their data only once the guard lets them in
fn enter_screen(client: &UrbanClient, resource: Resource) -> bool {
    matches!(
        client.router().open(resource.route().path()),
        Navigation::Entered(_)
    )
}

/// One line per record, fields sorted by name
pub fn render_rows(rows: &[Value]) -> String {
    rows.iter()
        .map(|row| match row.as_object() {
            Some(fields) => fields
                .iter()
                .sorted_by(|a, b| a.0.cmp(b.0))
                .map(|(key, value)| format!("{}={}", key, render_scalar(value)))
                .join(", "),
            None => render_scalar(row),
        })
        .join("\n")
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Banner text for the latest notification, if any
pub fn format_notification(notification: &Notification) -> Option<String> {
    let message = notification.message.as_deref()?;
    let label = match notification.kind {
        NotificationKind::Success => "OK",
        NotificationKind::Error => "ERROR",
        NotificationKind::Info => "INFO",
    };
    Some(format!("[{}] {}", label, message))
}
