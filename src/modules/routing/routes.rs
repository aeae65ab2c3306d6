use std::fmt;

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Pedidos,
    Clientes,
    Usuarios,
    Conductores,
    Vehiculos,
}

/// Landing screen for the empty path
pub const HOME: Route = Route::Pedidos;

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Register,
        Route::Pedidos,
        Route::Clientes,
        Route::Usuarios,
        Route::Conductores,
        Route::Vehiculos,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Pedidos => "/pedidos",
            Route::Clientes => "/clientes",
            Route::Usuarios => "/usuarios",
            Route::Conductores => "/conductores",
            Route::Vehiculos => "/vehiculos",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }

    /// Resolve a path: `""`/`"/"` go home, unknown paths go to login
    pub fn resolve(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim().trim_matches('/');
        if trimmed.is_empty() {
            return HOME;
        }
        Route::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == trimmed)
            .unwrap_or(Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives navigation requests issued by the session layer (e.g. after logout)
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
