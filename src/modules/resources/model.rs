use std::fmt;
use std::str::FromStr;

use crate::modules::routing::Route;

/// Backend collections, named as the API names them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Conductores,
    Usuarios,
    Clientes,
    Vehiculos,
    Pedidos,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Conductores,
        Resource::Usuarios,
        Resource::Clientes,
        Resource::Vehiculos,
        Resource::Pedidos,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Conductores => "conductores",
            Resource::Usuarios => "usuarios",
            Resource::Clientes => "clientes",
            Resource::Vehiculos => "vehiculos",
            Resource::Pedidos => "pedidos",
        }
    }

    /// Collection root, e.g. `/v1/conductores`
    pub fn base_path(&self) -> String {
        format!("/v1/{}", self.name())
    }

    /// Screen that manages this resource
    pub fn route(&self) -> Route {
        match self {
            Resource::Conductores => Route::Conductores,
            Resource::Usuarios => Route::Usuarios,
            Resource::Clientes => Route::Clientes,
            Resource::Vehiculos => Route::Vehiculos,
            Resource::Pedidos => Route::Pedidos,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Resource::ALL.iter().map(|r| r.name()).collect();
                format!("unknown resource '{}' (expected one of: {})", value, names.join(", "))
            })
    }
}
