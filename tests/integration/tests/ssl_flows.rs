//! SSL enable/disable scenarios.

use ely_cli::cli::{SecurityCommand, SslArgs};
use ely_model::{op, Address, ResourceType};
use ely_security::elytron::{KeyStoreFile, PLACEHOLDER};
use ely_security::{
    service, GeneratedKeyStore, KeyStorePath, KeyStoreSource, ScriptedPrompter, SecurityError,
    SslBindingOptions, SslEndpoint, SslSecurityBuilder,
};
use serde_json::json;

use crate::common::{http_interface, https_listener, TestEnv};

fn path_args() -> SslArgs {
    SslArgs {
        key_store_path: Some("server.jks".into()),
        key_store_password: Some("secret".into()),
        protocols: Some("TLSv1.2".into()),
        no_reload: true,
        ..SslArgs::default()
    }
}

fn enable_management(ssl: SslArgs) -> SecurityCommand {
    SecurityCommand::EnableSslManagement {
        management_interface: None,
        http_secure_socket_binding: None,
        ssl,
    }
}

fn disable_management() -> SecurityCommand {
    SecurityCommand::DisableSslManagement {
        management_interface: None,
        no_reload: true,
    }
}

fn generated(interactive: bool) -> KeyStoreSource {
    KeyStoreSource::Generated(GeneratedKeyStore {
        default_file: "management.keystore".into(),
        interactive,
    })
}

/// Enabling with the same key store file twice reuses the whole chain.
#[tokio::test]
async fn enabling_twice_reuses_every_resource() -> anyhow::Result<()> {
    let env = TestEnv::new();

    env.run(enable_management(path_args())).await?;
    let first = env.string_attribute(&http_interface(), "ssl-context");
    assert_eq!(
        env.executed_adds(),
        vec![
            "/subsystem=elytron/key-store=key-store-server.jks",
            "/subsystem=elytron/key-manager=key-manager-key-store-server.jks",
            "/subsystem=elytron/server-ssl-context=ssl-context-key-store-server.jks",
        ]
    );
    assert_eq!(
        env.string_attribute(&http_interface(), "secure-socket-binding").as_deref(),
        Some("management-https")
    );

    env.run(disable_management()).await?;
    assert_eq!(env.string_attribute(&http_interface(), "ssl-context"), None);

    env.store.clear_executed();
    env.run(enable_management(path_args())).await?;
    assert!(env.executed_adds().is_empty(), "second run should only reuse");
    assert_eq!(env.string_attribute(&http_interface(), "ssl-context"), first);
    assert_eq!(env.store.reload_count(), 0);
    Ok(())
}

/// A second enable on an interface that has SSL is refused.
#[tokio::test]
async fn enabling_enabled_ssl_is_refused() -> anyhow::Result<()> {
    let env = TestEnv::new().with_key_store("ks", "a.jks", "secret");
    let named = || SslArgs {
        key_store_name: Some("ks".into()),
        no_reload: true,
        ..SslArgs::default()
    };

    env.run(enable_management(named())).await?;
    let err = env.run(enable_management(named())).await.unwrap_err();
    assert_eq!(err.to_string(), "SSL is already enabled for management http-interface");
    Ok(())
}

/// The HTTPS listener drops its legacy realm unless told otherwise, and
/// gets it back when SSL is disabled.
#[tokio::test]
async fn http_server_security_realm_handling() -> anyhow::Result<()> {
    let env = TestEnv::new().with_key_store("ks", "a.jks", "secret");
    let listener = https_listener("default-server");
    let enable = |no_override_security_realm| SecurityCommand::EnableSslHttpServer {
        server_name: None,
        no_override_security_realm,
        ssl: SslArgs {
            key_store_name: Some("ks".into()),
            no_reload: true,
            ..SslArgs::default()
        },
    };
    let disable = || SecurityCommand::DisableSslHttpServer {
        server_name: None,
        no_reload: true,
    };

    env.run(enable(false)).await?;
    assert_eq!(env.string_attribute(&listener, "ssl-context").as_deref(), Some("ssl-context-ks"));
    assert_eq!(env.string_attribute(&listener, "security-realm"), None);

    env.run(disable()).await?;
    assert_eq!(env.string_attribute(&listener, "ssl-context"), None);
    assert_eq!(env.string_attribute(&listener, "security-realm").as_deref(), Some("ApplicationRealm"));

    env.run(enable(true)).await?;
    assert_eq!(env.string_attribute(&listener, "ssl-context").as_deref(), Some("ssl-context-ks"));
    assert_eq!(env.string_attribute(&listener, "security-realm").as_deref(), Some("ApplicationRealm"));
    Ok(())
}

/// An unreadable key store list degrades to creating a new key store.
#[tokio::test]
async fn unreadable_candidates_lead_to_creation() -> anyhow::Result<()> {
    let env = TestEnv::new().with_key_store("existing", "server.jks", "secret");
    let endpoint = SslEndpoint::management(None);
    let builder = SslSecurityBuilder::new(KeyStoreSource::Path(KeyStorePath {
        file: KeyStoreFile {
            password: Some("secret".into()),
            ..KeyStoreFile::new("server.jks")
        },
        new_name: None,
    }));

    let reused = service::plan_enable_ssl(
        env.store.as_ref(),
        &endpoint,
        &builder,
        &SslBindingOptions::default(),
        None,
    )
    .await?;
    assert_eq!(reused.ssl_context.key_manager.key_store.name, "existing");

    env.store.fail_reads_of(ResourceType::KeyStore);
    let created = service::plan_enable_ssl(
        env.store.as_ref(),
        &endpoint,
        &builder,
        &SslBindingOptions::default(),
        None,
    )
    .await?;
    assert_eq!(created.ssl_context.key_manager.key_store.name, "key-store-server.jks");
    assert_eq!(created.plan.steps()[0].name, op::ADD);
    Ok(())
}

/// A printed request stages the generated key store instead of creating it.
#[tokio::test]
async fn dry_run_stages_generated_key_store() -> anyhow::Result<()> {
    let env = TestEnv::new();

    let outcome = service::plan_enable_ssl(
        env.store.as_ref(),
        &SslEndpoint::management(None),
        &SslSecurityBuilder::new(generated(false)),
        &SslBindingOptions::default(),
        None,
    )
    .await?;
    let steps = outcome.plan.steps();
    assert_eq!(steps[0].name, op::ADD);
    assert_eq!(steps[0].param_str("path"), Some(PLACEHOLDER));
    assert_eq!(steps[1].name, op::GENERATE_KEY_PAIR);
    assert_eq!(steps.last().map(|s| s.name.as_str()), Some(op::WRITE_ATTRIBUTE));
    assert!(outcome.compensation.is_none());

    let session = env.session_with(true);
    ely_cli::commands::run_security(enable_management(SslArgs::default()), &session).await?;
    assert!(env.store.executed_writes().is_empty());
    Ok(())
}

/// A failing composite removes the key store generated before it.
#[tokio::test]
async fn failed_enable_removes_generated_key_store() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut prompter = ScriptedPrompter::new(["", "secret", "CN=localhost", "30", "server", "y"]);

    let outcome = service::plan_enable_ssl(
        env.store.as_ref(),
        &SslEndpoint::management(None),
        &SslSecurityBuilder::new(generated(true)),
        &SslBindingOptions::default(),
        Some(&mut prompter),
    )
    .await?;
    let key_store = Address::elytron_resource(
        ResourceType::KeyStore,
        &outcome.ssl_context.key_manager.key_store.name,
    );
    assert!(env.store.contains(&key_store));

    env.store
        .fail_operation(op::WRITE_ATTRIBUTE, http_interface(), "interface is read-only");
    let err = outcome.apply(env.store.as_ref(), false).await.unwrap_err();
    assert!(err.to_string().contains("interface is read-only"));
    assert!(!env.store.contains(&key_store));
    assert_eq!(env.string_attribute(&http_interface(), "ssl-context"), None);
    Ok(())
}

/// A failing compensation is reported along with the original failure.
#[tokio::test]
async fn failed_compensation_is_reported() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut prompter = ScriptedPrompter::new(["", "secret", "CN=localhost", "", "server", "y"]);

    let outcome = service::plan_enable_ssl(
        env.store.as_ref(),
        &SslEndpoint::management(None),
        &SslSecurityBuilder::new(generated(true)),
        &SslBindingOptions::default(),
        Some(&mut prompter),
    )
    .await?;
    let key_store = Address::elytron_resource(
        ResourceType::KeyStore,
        &outcome.ssl_context.key_manager.key_store.name,
    );

    env.store
        .fail_operation(op::WRITE_ATTRIBUTE, http_interface(), "interface is read-only");
    env.store.fail_operation(op::REMOVE, key_store.clone(), "key store is locked");
    let err = outcome.apply(env.store.as_ref(), false).await.unwrap_err();
    assert!(matches!(err, SecurityError::RollbackFailed { .. }));
    assert!(err.primary().to_string().contains("interface is read-only"));
    assert!(err.to_string().contains("key store is locked"));
    assert!(env.store.contains(&key_store));
    Ok(())
}

/// Declining the summary aborts without leaving anything behind.
#[tokio::test]
async fn declined_generation_aborts() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut prompter = ScriptedPrompter::new(["", "secret", "CN=localhost", "", "server", "n"]);

    let err = service::plan_enable_ssl(
        env.store.as_ref(),
        &SslEndpoint::management(None),
        &SslSecurityBuilder::new(generated(true)),
        &SslBindingOptions::default(),
        Some(&mut prompter),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SecurityError::Aborted));
    assert!(env.store.security_resources(ResourceType::KeyStore).is_empty());
    assert_eq!(
        env.store.attribute(&http_interface(), "socket-binding"),
        Some(json!("management-http"))
    );
    Ok(())
}
