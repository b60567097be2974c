use std::sync::Arc;

use authforge::prelude::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

const CONFIG: &str = r#"{
    "remote_config_enabled": true,
    "anonymous_login_enabled": false
}"#;

struct Chat {
    handler: AuthenticationHandler,
    bus: Arc<BroadcastEventBus>,
}

fn build(config: AuthConfig) -> Result<Chat, AuthError> {
    let remote = Arc::new(MemoryRemoteConfig::new());
    let mut motd = ConfigMap::new();
    motd.insert("motd".into(), json!("welcome to #general"));
    remote.publish(motd);

    let hooks = Arc::new(HookRegistry::new());
    hooks.register(HookEvent::DidAuthenticate, |payload: HookPayload| async move {
        if let Some(user) = payload.user {
            tracing::info!(user = %user.entity_id, "joining #general");
        }
        Ok::<(), ServiceError>(())
    });
    hooks.register(HookEvent::WillLogout, |_| async {
        tracing::info!("leaving #general");
        Ok::<(), ServiceError>(())
    });

    let bus = Arc::new(BroadcastEventBus::new());

    let handler = AuthenticationHandler::builder()
        .config(config)
        .identity_provider(Arc::new(MemoryIdentityProvider::new()))
        .user_cache(Arc::new(MemoryUserCache::new()))
        .profile_store(Arc::new(MemoryProfileStore::new()))
        .remote_config_store(remote)
        .event_bus(bus.clone())
        .presence(Arc::new(MemoryPresence::new()))
        .hook_dispatcher(hooks)
        .build()?;

    Ok(Chat { handler, bus })
}

// ---------------------------------------------------------------------------
// Session script
// ---------------------------------------------------------------------------

async fn run(chat: &Chat) -> Result<(), AuthError> {
    let handler = &chat.handler;

    handler
        .authenticate_with(AccountDetails::register("ada@example.com", "hunter22"))
        .await?;
    if let Some(motd) = handler.config().remote_value("motd") {
        tracing::info!(%motd, "message of the day");
    }
    handler.logout().await?;

    if !handler.account_type_enabled(AccountType::Anonymous) {
        tracing::info!("anonymous login is disabled, skipping guest session");
    }

    handler
        .authenticate_with(AccountDetails::username("ada@example.com", "hunter22"))
        .await?;
    tracing::info!(user = ?handler.current_user_id(), "signed back in");
    handler.logout().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config: AuthConfig = serde_json::from_str(CONFIG)?;
    let chat = build(config)?;

    let mut events = chat.bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(?event, "event");
        }
    });

    run(&chat).await?;
    Ok(())
}
