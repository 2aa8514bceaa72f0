#![allow(non_snake_case)]

#[cfg(feature = "ssr")]
mod config {
    use arena_api::Account;
    use arena_gateway::GatewayConfig;
    use arena_types::Role;
    use serde::Deserialize;

    #[derive(Deserialize, Clone, Debug)]
    #[serde(default)]
    pub struct Config {
        pub server: ServerConfig,
        pub api: ApiConfig,
        pub gateway: GatewayConfig,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct ServerConfig {
        pub bind: String,
        pub port: u16,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct ApiConfig {
        pub access_ttl_secs: u64,
        pub refresh_ttl_secs: u64,
        pub secure_cookies: bool,
        pub accounts: Vec<Account>,
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                server: ServerConfig::default(),
                api: ApiConfig::default(),
                gateway: GatewayConfig::default(),
            }
        }
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                bind: "0.0.0.0".into(),
                port: 3000,
            }
        }
    }

    impl Default for ApiConfig {
        fn default() -> Self {
            let demoAccount = |role: Role| Account {
                id: format!("{role}-demo"),
                email: format!("{role}@arena.local"),
                password: "change-me-on-first-run".into(),
                role,
            };

            Self {
                access_ttl_secs: 900,
                refresh_ttl_secs: 7 * 24 * 3600,
                secure_cookies: true,
                accounts: Role::ALL.into_iter().map(demoAccount).collect(),
            }
        }
    }

    pub fn load(path: &str) -> Config {
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to parse config {path}: {e}, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("failed to read config {path}: {e}, using defaults");
                Config::default()
            }
        };

        Config {
            gateway: config.gateway.clone().with_env_overrides(),
            ..config
        }
    }
}

/// Signs in through the gateway and fetches the profile, exercising the
/// refresh path of a running API.
#[cfg(feature = "ssr")]
mod probe {
    use std::sync::Arc;

    use arena_gateway::{ApiClient, GatewayConfig, GatewayResult, MemorySessionStore};
    use arena_types::{AccountSummary, LoginRequest, Role};

    pub struct ProbeArgs {
        pub role: Role,
        pub credentials: LoginRequest,
    }

    impl ProbeArgs {
        /// Parses `--probe <role> <email> <password>`.
        pub fn from_args(args: &[String]) -> Option<Result<Self, String>> {
            let idx = args.iter().position(|a| a == "--probe")?;
            let rest = &args[idx + 1..];
            let [role, email, password, ..] = rest else {
                return Some(Err("usage: --probe <role> <email> <password>".into()));
            };

            Some(role.parse::<Role>().map_err(|e| e.to_string()).map(|role| Self {
                role,
                credentials: LoginRequest {
                    email: email.clone(),
                    password: password.clone(),
                },
            }))
        }
    }

    pub async fn run(config: &GatewayConfig, args: &ProbeArgs) -> GatewayResult<AccountSummary> {
        let session = MemorySessionStore::new();
        let client = ApiClient::from_config(config, Arc::new(session.clone()))?;

        let account = client.login(args.role, &args.credentials).await?;
        session.login(account.role);

        client
            .get(&format!("/{}/profile", args.role.path_segment()))
            .await
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use std::time::Duration;

    use arena_api::{AppState, TokenStore};
    use arena_ui::{shell, App};
    use axum::Router;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::trace::TraceLayer;
    use tracing_subscriber::{fmt, EnvFilter};

    // Initialize tracing
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse config path from args
    let args: Vec<String> = std::env::args().collect();
    let configPath = if let Some(idx) = args.iter().position(|a| a == "--config") {
        args.get(idx + 1)
            .cloned()
            .unwrap_or_else(|| "config.example.toml".into())
    } else {
        "config.example.toml".into()
    };

    let appConfig = config::load(&configPath);
    tracing::info!(
        "loaded config from {configPath}: bind={}:{}",
        appConfig.server.bind,
        appConfig.server.port
    );

    if let Some(probeArgs) = probe::ProbeArgs::from_args(&args) {
        let outcome = match probeArgs {
            Ok(probeArgs) => probe::run(&appConfig.gateway, &probeArgs)
                .await
                .map_err(|e| e.to_string()),
            Err(usage) => Err(usage),
        };
        match outcome {
            Ok(profile) => {
                tracing::info!(role = %profile.role, email = %profile.email, "probe succeeded");
                return;
            }
            Err(e) => {
                tracing::error!("probe failed: {e}");
                std::process::exit(1);
            }
        }
    }

    let appState = AppState::new(
        appConfig.api.accounts.clone(),
        TokenStore::new(
            Duration::from_secs(appConfig.api.access_ttl_secs),
            Duration::from_secs(appConfig.api.refresh_ttl_secs),
        ),
        appConfig.api.secure_cookies,
    );

    // Get Leptos configuration
    let conf = get_configuration(None).expect("failed to load Leptos configuration");
    let leptosOptions = conf.leptos_options;
    let addr = leptosOptions.site_addr;

    let routes = generate_route_list(App);

    // The stub API carries its own AppState; server functions reach the same
    // state, and the gateway settings for calling it, through context.
    let apiRouter = arena_api::api_router(appState.clone());
    let gatewayConfig = appConfig.gateway.clone();

    let app = Router::new()
        .leptos_routes_with_context(
            &leptosOptions,
            routes,
            {
                let appState = appState.clone();
                move || {
                    leptos::prelude::provide_context(appState.clone());
                    leptos::prelude::provide_context(gatewayConfig.clone());
                }
            },
            {
                let leptosOptions = leptosOptions.clone();
                move || shell(leptosOptions.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptosOptions)
        .nest("/api/v1", apiRouter)
        .layer(TraceLayer::new_for_http());

    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    axum::serve(listener, app.into_make_service())
        .await
        .expect("server exited with error");
}

#[cfg(not(feature = "ssr"))]
fn main() {}
