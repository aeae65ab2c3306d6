use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role as the backend names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountRole {
    Admin,
    Conductor,
    Cliente,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountRole::Admin => "ADMIN",
            AccountRole::Conductor => "CONDUCTOR",
            AccountRole::Cliente => "CLIENTE",
        };
        f.write_str(name)
    }
}

impl FromStr for AccountRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(AccountRole::Admin),
            "CONDUCTOR" => Ok(AccountRole::Conductor),
            "CLIENTE" => Ok(AccountRole::Cliente),
            other => Err(format!(
                "unknown role '{}' (expected ADMIN, CONDUCTOR or CLIENTE)",
                other
            )),
        }
    }
}

/// Body of `POST /v1/auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub rol: AccountRole,
    #[serde(rename = "conductorId", skip_serializing_if = "Option::is_none")]
    pub conductor_id: Option<u64>,
    #[serde(rename = "clienteId", skip_serializing_if = "Option::is_none")]
    pub cliente_id: Option<u64>,
}

impl RegisterRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>, rol: AccountRole) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            rol,
            conductor_id: None,
            cliente_id: None,
        }
    }

    /// Link the account to a driver or customer record.
    ///
    /// The id lands in `conductorId` for drivers and `clienteId` for
    /// customers; admins are never linked and the id is dropped. An id of
    /// 0 means "no record" and is left out.
    pub fn with_linked_entity(mut self, id: Option<u64>) -> Self {
        let id = id.filter(|id| *id != 0);
        self.conductor_id = None;
        self.cliente_id = None;
        match self.rol {
            AccountRole::Conductor => self.conductor_id = id,
            AccountRole::Cliente => self.cliente_id = id,
            AccountRole::Admin => {}
        }
        self
    }

    /// Required-field check run before anything is sent
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required".to_string());
        }
        Ok(())
    }
}
